//! Application state machine
//!
//! Logged out, the app shows the login form. Signing in creates the
//! [`Session`] and a navigator rooted at Home; logging out drops both, which
//! releases every mounted subscription.

use std::sync::Arc;

use natter_core::{Error, Result};
use tracing::{debug, info, warn};

use crate::navigator::{Navigator, Screen};
use crate::session::Session;
use crate::state::AppContext;
use crate::viewmodel::{
    AddFriendView, ChatSessionView, FriendRosterView, HomeView, LoginView, MembershipEditor,
    QrCodeView, UserDetailView,
};

/// A view mounted in a navigator frame
pub enum MountedScreen {
    Home(HomeView),
    Chat(ChatSessionView),
    User(UserDetailView),
    Friends(FriendRosterView),
    QrCode(QrCodeView),
    AddFriend(AddFriendView),
    Members(MembershipEditor),
    /// Frame pushed without its required parameter; renders nothing
    Unmounted,
}

impl MountedScreen {
    /// Build the view for `screen` and run its one-shot reads
    pub async fn mount(ctx: &Arc<AppContext>, session: &Session, screen: Screen) -> Self {
        match screen {
            Screen::Home => {
                let mut view = HomeView::mount(ctx.clone(), session.clone());
                view.load().await;
                MountedScreen::Home(view)
            }
            Screen::ChatDetail(chat_id) => {
                let mut view = ChatSessionView::mount(ctx.clone(), session.clone(), chat_id);
                view.load().await;
                MountedScreen::Chat(view)
            }
            Screen::UserDetail => {
                let mut view = UserDetailView::new(ctx.clone(), session.clone());
                view.load().await;
                MountedScreen::User(view)
            }
            Screen::FriendsList => {
                MountedScreen::Friends(FriendRosterView::mount(ctx.clone(), session.clone()))
            }
            Screen::QrCode => MountedScreen::QrCode(QrCodeView::new(&ctx.config, session)),
            Screen::AddFriend(friend) => {
                let mut view = AddFriendView::new(ctx.clone(), session.clone(), friend);
                view.load().await;
                MountedScreen::AddFriend(view)
            }
            Screen::AddFriendToChat(chat_id) => {
                let mut editor = MembershipEditor::new(ctx.clone(), session.clone(), chat_id);
                editor.load().await;
                MountedScreen::Members(editor)
            }
        }
    }

    /// Apply queued snapshots
    pub fn pump(&mut self) -> bool {
        match self {
            MountedScreen::Home(view) => view.pump(),
            MountedScreen::Chat(view) => view.pump(),
            MountedScreen::Friends(view) => view.pump(),
            MountedScreen::Members(view) => view.pump(),
            MountedScreen::User(_)
            | MountedScreen::QrCode(_)
            | MountedScreen::AddFriend(_)
            | MountedScreen::Unmounted => false,
        }
    }
}

pub struct SignedIn {
    session: Session,
    navigator: Navigator<MountedScreen>,
}

impl SignedIn {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn navigator(&self) -> &Navigator<MountedScreen> {
        &self.navigator
    }
}

pub enum Phase {
    LoggedOut(LoginView),
    LoggedIn(SignedIn),
}

pub struct App {
    ctx: Arc<AppContext>,
    phase: Phase,
    notice: Option<String>,
}

impl App {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            phase: Phase::LoggedOut(LoginView::new()),
            notice: None,
        }
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.phase {
            Phase::LoggedIn(signed_in) => Some(&signed_in.session),
            Phase::LoggedOut(_) => None,
        }
    }

    /// Transient message, cleared once taken
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    fn login_form(&mut self, email: &str, password: &str) -> Result<&mut LoginView> {
        match &mut self.phase {
            Phase::LoggedOut(form) => {
                form.email = email.to_string();
                form.password = password.to_string();
                Ok(form)
            }
            Phase::LoggedIn(_) => Err(Error::InvalidOperation("already signed in".to_string())),
        }
    }

    pub async fn sign_up(&mut self, email: &str, password: &str) -> Result<bool> {
        let ctx = self.ctx.clone();
        let form = self.login_form(email, password)?;
        let session = form.sign_up(&ctx).await;
        let notice = form.take_notice();
        self.notice = notice;
        Ok(self.enter_home(session).await)
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<bool> {
        let ctx = self.ctx.clone();
        let form = self.login_form(email, password)?;
        let session = form.sign_in(&ctx).await;
        let notice = form.take_notice();
        self.notice = notice;
        Ok(self.enter_home(session).await)
    }

    async fn enter_home(&mut self, session: Option<Session>) -> bool {
        let Some(session) = session else {
            return false;
        };
        let home = MountedScreen::mount(&self.ctx, &session, Screen::Home).await;
        info!(uid = %session.user_id(), "Entered home");
        self.phase = Phase::LoggedIn(SignedIn {
            session,
            navigator: Navigator::new(Screen::Home.route(), home),
        });
        true
    }

    fn signed_in(&mut self) -> Result<&mut SignedIn> {
        match &mut self.phase {
            Phase::LoggedIn(signed_in) => Ok(signed_in),
            Phase::LoggedOut(_) => Err(Error::InvalidOperation("not signed in".to_string())),
        }
    }

    /// Push the screen for `route`.
    ///
    /// A route missing its parameter still pushes a frame, with nothing
    /// mounted. Unknown routes leave the stack unchanged.
    pub async fn navigate(&mut self, route: &str) -> Result<()> {
        let ctx = self.ctx.clone();
        let signed_in = self.signed_in()?;

        match Screen::parse(route) {
            Ok(screen) => {
                let route = screen.route();
                let view = MountedScreen::mount(&ctx, &signed_in.session, screen).await;
                debug!(%route, "Screen pushed");
                signed_in.navigator.push(route, view);
                Ok(())
            }
            Err(e @ Error::MissingNavigationParameter(_)) => {
                warn!(%route, error = %e, "Screen pushed without its data");
                signed_in.navigator.push(route.trim(), MountedScreen::Unmounted);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Pop to the previous screen; false at Home or when logged out
    pub fn back(&mut self) -> bool {
        match &mut self.phase {
            Phase::LoggedIn(signed_in) => signed_in.navigator.pop().is_some(),
            Phase::LoggedOut(_) => false,
        }
    }

    pub async fn logout(&mut self) {
        if let Phase::LoggedIn(signed_in) = &self.phase {
            info!(uid = %signed_in.session.user_id(), "Logging out");
            self.ctx.auth.sign_out().await;
            self.phase = Phase::LoggedOut(LoginView::new());
        }
    }

    /// Apply queued snapshots on every mounted frame
    pub fn pump(&mut self) -> bool {
        let Phase::LoggedIn(signed_in) = &mut self.phase else {
            return false;
        };
        let mut replaced = false;
        for frame in signed_in.navigator.frames_mut() {
            replaced |= frame.view.pump();
        }
        replaced
    }

    pub fn top(&self) -> Option<&MountedScreen> {
        match &self.phase {
            Phase::LoggedIn(signed_in) => Some(&signed_in.navigator.top().view),
            Phase::LoggedOut(_) => None,
        }
    }

    pub fn top_mut(&mut self) -> Option<&mut MountedScreen> {
        match &mut self.phase {
            Phase::LoggedIn(signed_in) => Some(&mut signed_in.navigator.top_mut().view),
            Phase::LoggedOut(_) => None,
        }
    }

    /// Create a chat from Home and open it
    pub async fn create_chat(&mut self) -> Result<()> {
        let Some(MountedScreen::Home(home)) = self.top() else {
            return Err(Error::InvalidOperation("new chat is only available on home".to_string()));
        };
        let created = home.create_chat().await;
        match created {
            Some(chat_id) => self.navigate(&Screen::ChatDetail(chat_id).route()).await,
            None => Ok(()),
        }
    }

    /// Handle a scanner result from the friends screen
    pub async fn scan(&mut self, payload: Option<&str>) -> Result<()> {
        if !matches!(self.top(), Some(MountedScreen::Friends(_))) {
            return Err(Error::InvalidOperation("scan is only available on friends".to_string()));
        }
        let outcome = FriendRosterView::scan_result(payload);
        self.notice = Some(outcome.notice());
        match outcome.next_screen() {
            Some(screen) => self.navigate(&screen.route()).await,
            None => Ok(()),
        }
    }

    /// Confirm the add-friend screen and leave it without waiting for the write
    pub fn add_pending_friend(&mut self) -> Result<()> {
        let Some(MountedScreen::AddFriend(view)) = self.top() else {
            return Err(Error::InvalidOperation("no friend to add".to_string()));
        };
        // Not awaited; the write outlives the screen
        drop(view.add());
        self.back();
        Ok(())
    }
}
