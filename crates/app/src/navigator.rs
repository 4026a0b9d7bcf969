//! Screen routes and the navigation stack

use std::fmt;

use natter_core::{ChatId, Error, Result, UserId};

/// Every screen reachable after login
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Home,
    ChatDetail(ChatId),
    UserDetail,
    FriendsList,
    QrCode,
    AddFriend(UserId),
    AddFriendToChat(ChatId),
}

impl Screen {
    /// Route string carrying the screen's parameter
    pub fn route(&self) -> String {
        match self {
            Screen::Home => "home".to_string(),
            Screen::ChatDetail(id) => format!("details/{}", id),
            Screen::UserDetail => "user".to_string(),
            Screen::FriendsList => "friends".to_string(),
            Screen::QrCode => "qrcode".to_string(),
            Screen::AddFriend(id) => format!("addFriend/{}", id),
            Screen::AddFriendToChat(id) => format!("addFriendToChat/{}", id),
        }
    }

    /// Parse a route. Parameterized routes without a parameter fail with
    /// [`Error::MissingNavigationParameter`].
    pub fn parse(route: &str) -> Result<Screen> {
        let route = route.trim();
        let (name, param) = match route.split_once('/') {
            Some((name, param)) => (name, Some(param.trim()).filter(|p| !p.is_empty())),
            None => (route, None),
        };

        let require = |key: &'static str| param.ok_or(Error::MissingNavigationParameter(key));

        match name {
            "home" if param.is_none() => Ok(Screen::Home),
            "user" if param.is_none() => Ok(Screen::UserDetail),
            "friends" if param.is_none() => Ok(Screen::FriendsList),
            "qrcode" if param.is_none() => Ok(Screen::QrCode),
            "details" => Ok(Screen::ChatDetail(ChatId::from(require("chatId")?))),
            "addFriend" => Ok(Screen::AddFriend(UserId::from(require("friendId")?))),
            "addFriendToChat" => Ok(Screen::AddFriendToChat(ChatId::from(require("chatId")?))),
            _ => Err(Error::UnknownRoute(route.to_string())),
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.route())
    }
}

/// One entry of the back stack
pub struct Frame<F> {
    route: String,
    pub view: F,
}

impl<F> Frame<F> {
    pub fn route(&self) -> &str {
        &self.route
    }
}

/// Back stack of mounted screens. The root frame can never be popped.
pub struct Navigator<F> {
    stack: Vec<Frame<F>>,
}

impl<F> Navigator<F> {
    pub fn new(root_route: impl Into<String>, root: F) -> Self {
        Self {
            stack: vec![Frame {
                route: root_route.into(),
                view: root,
            }],
        }
    }

    pub fn push(&mut self, route: impl Into<String>, view: F) {
        self.stack.push(Frame {
            route: route.into(),
            view,
        });
    }

    /// Remove the top frame, exposing the one below
    pub fn pop(&mut self) -> Option<Frame<F>> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    pub fn top(&self) -> &Frame<F> {
        // The root frame is never removed
        &self.stack[self.stack.len() - 1]
    }

    pub fn top_mut(&mut self) -> &mut Frame<F> {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn routes(&self) -> Vec<&str> {
        self.stack.iter().map(|f| f.route.as_str()).collect()
    }

    pub fn frames_mut(&mut self) -> impl Iterator<Item = &mut Frame<F>> {
        self.stack.iter_mut()
    }
}
