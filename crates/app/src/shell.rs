//! Line-oriented terminal front end
//!
//! Each stdin line is one [`Command`]. After every command the top screen is
//! rendered as plain text.

use std::fmt::Write as _;

use clap::{Parser, Subcommand};
use natter_core::{Result, UserId};

use crate::app::{App, MountedScreen, Phase};

#[derive(Parser, Debug)]
#[command(name = "natter", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create an account
    #[command(name = "signup")]
    SignUp {
        email: String,
        #[arg(allow_hyphen_values = true)]
        password: String,
    },

    /// Sign in
    Login {
        email: String,
        #[arg(allow_hyphen_values = true)]
        password: String,
    },

    /// Open home, user, friends, qrcode, details/<id>, addFriend/<id> or addFriendToChat/<id>
    Go { route: String },

    /// Return to the previous screen
    Back,

    /// Set the message input (chat)
    Say {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Send the message input (chat)
    Send,

    /// Create a chat and open it (home)
    #[command(name = "newchat")]
    NewChat,

    /// Edit the display name (user)
    Name {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Save the display name (user)
    Apply,

    /// Report a scanned code; none cancels (friends)
    Scan { payload: Option<String> },

    /// Add the scanned friend (addFriend)
    Add,

    /// Select or deselect a friend (addFriendToChat)
    Toggle { uid: String },

    /// Add the selected friends to the chat (addFriendToChat)
    Register,

    /// Sign out
    Logout,

    /// Exit
    #[command(alias = "exit")]
    Quit,
}

impl Command {
    /// Parse one input line. `help` and malformed lines come back as clap
    /// errors whose text is ready to show.
    pub fn parse(line: &str) -> std::result::Result<Command, clap::Error> {
        Line::try_parse_from(line.split_whitespace()).map(|line| line.command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn wrong_screen(command: &str) -> natter_core::Error {
    natter_core::Error::InvalidOperation(format!("`{}` is not available here", command))
}

/// Run one command against the app
pub async fn execute(app: &mut App, command: Command) -> Result<Flow> {
    match command {
        Command::SignUp { email, password } => {
            app.sign_up(&email, &password).await?;
        }
        Command::Login { email, password } => {
            app.sign_in(&email, &password).await?;
        }
        Command::Go { route } => app.navigate(&route).await?,
        Command::Back => {
            if !app.back() {
                app.set_notice("Already at the first screen");
            }
        }
        Command::Say { text } => match app.top_mut() {
            Some(MountedScreen::Chat(view)) => view.set_input(text.join(" ")),
            _ => return Err(wrong_screen("say")),
        },
        Command::Send => match app.top_mut() {
            // The write is detached; its outcome is only logged
            Some(MountedScreen::Chat(view)) => drop(view.send()),
            _ => return Err(wrong_screen("send")),
        },
        Command::NewChat => app.create_chat().await?,
        Command::Name { text } => match app.top_mut() {
            Some(MountedScreen::User(view)) => view.name = text.join(" "),
            _ => return Err(wrong_screen("name")),
        },
        Command::Apply => {
            let notice = match app.top_mut() {
                Some(MountedScreen::User(view)) => {
                    view.apply().await;
                    view.notice().map(str::to_string)
                }
                _ => return Err(wrong_screen("apply")),
            };
            if let Some(notice) = notice {
                app.set_notice(notice);
            }
        }
        Command::Scan { payload } => app.scan(payload.as_deref()).await?,
        Command::Add => app.add_pending_friend()?,
        Command::Toggle { uid } => {
            let uid = UserId::from(uid);
            let toggled = match app.top_mut() {
                Some(MountedScreen::Members(editor)) => editor.toggle(&uid),
                _ => return Err(wrong_screen("toggle")),
            };
            if !toggled {
                app.set_notice(format!("Not a selectable friend: {}", uid));
            }
        }
        Command::Register => {
            let issued = match app.top_mut() {
                Some(MountedScreen::Members(editor)) => editor.register().map(drop).is_some(),
                _ => return Err(wrong_screen("register")),
            };
            if !issued {
                app.set_notice("Members not loaded yet");
            }
        }
        Command::Logout => app.logout().await,
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Text rendering of the current screen plus any pending notice
pub fn render(app: &mut App) -> String {
    let mut out = String::new();

    match app.phase() {
        Phase::LoggedOut(_) => {
            out.push_str("== Login ==\nsignup <email> <password> | login <email> <password>\n");
        }
        Phase::LoggedIn(signed_in) => {
            let navigator = signed_in.navigator();
            let top = navigator.top();
            let _ = writeln!(out, "== {} ==", navigator.routes().join(" > "));
            render_screen(&mut out, top.route(), &top.view);
        }
    }

    if let Some(notice) = app.take_notice() {
        let _ = writeln!(out, "* {}", notice);
    }
    out
}

const STALE: &str = "(updates stopped)\n";

fn render_screen(out: &mut String, route: &str, screen: &MountedScreen) {
    match screen {
        MountedScreen::Home(view) => {
            let _ = writeln!(out, "{}", view.welcome());
            if view.chats().is_empty() {
                out.push_str("No chats yet\n");
            }
            for summary in view.chats() {
                let _ = writeln!(
                    out,
                    "  {} ({} members)",
                    summary.id,
                    summary.chat.members.len()
                );
            }
            if !view.is_live() {
                out.push_str(STALE);
            }
        }
        MountedScreen::Chat(view) => {
            let _ = writeln!(out, "Chat {} as {}", view.chat_id(), view.sender_name());
            for message in view.messages() {
                let _ = writeln!(
                    out,
                    "[{}] {}: {}",
                    message.format_timestamp(),
                    message.sender_name,
                    message.text
                );
            }
            if !view.is_live() {
                out.push_str(STALE);
            }
            let _ = writeln!(out, "> {}", view.input());
        }
        MountedScreen::User(view) => {
            let _ = writeln!(out, "UID: {}", view.user_id());
            let _ = writeln!(out, "Name: {}", view.name);
            if !view.is_loaded() {
                out.push_str("Profile not found\n");
            }
        }
        MountedScreen::Friends(view) => {
            if view.friends().is_empty() {
                out.push_str("No friends yet\n");
            }
            for friend in view.friends() {
                let _ = writeln!(out, "  {} ({})", friend.name, friend.uid);
            }
            if !view.is_live() {
                out.push_str(STALE);
            }
        }
        MountedScreen::QrCode(view) => {
            let _ = writeln!(out, "{}", view.render());
        }
        MountedScreen::AddFriend(view) => {
            let _ = writeln!(
                out,
                "Add {} ({})? [add | back]",
                view.name().unwrap_or("..."),
                view.friend()
            );
        }
        MountedScreen::Members(editor) => {
            if !editor.is_loaded() {
                let _ = writeln!(out, "Chat {} not found", editor.chat_id());
            }
            let members: Vec<&str> = editor.members().iter().map(UserId::as_str).collect();
            let _ = writeln!(out, "Members: {}", members.join(", "));
            for friend in editor.candidates() {
                let mark = if editor.is_selected(&friend.uid) { "x" } else { " " };
                let _ = writeln!(out, "  [{}] {} ({})", mark, friend.name, friend.uid);
            }
            let _ = writeln!(out, "{} selected", editor.selection().len());
        }
        MountedScreen::Unmounted => {
            let _ = writeln!(out, "Nothing to show for {}", route);
        }
    }
}
