//! Identity code view model

use natter_core::identity_code::{self, PixelMatrix};
use natter_core::AppConfig;
use tracing::warn;

use crate::session::Session;

pub const UNAVAILABLE: &str = "No QR Code available";

/// The signed-in user's identity code
pub struct QrCodeView {
    matrix: Option<PixelMatrix>,
    terminal: Option<String>,
}

impl QrCodeView {
    pub fn new(config: &AppConfig, session: &Session) -> Self {
        let uid = session.user_id().as_str();
        let size = &config.identity_code;

        let matrix = match identity_code::encode(uid, size.width, size.height) {
            Ok(matrix) => Some(matrix),
            Err(e) => {
                warn!(%uid, error = %e, "Failed to generate identity code");
                None
            }
        };
        let terminal = match &matrix {
            Some(_) => identity_code::render_terminal(uid)
                .map_err(|e| warn!(%uid, error = %e, "Failed to render identity code"))
                .ok(),
            None => None,
        };

        Self { matrix, terminal }
    }

    pub fn matrix(&self) -> Option<&PixelMatrix> {
        self.matrix.as_ref()
    }

    /// Text form of the code, or the unavailable notice
    pub fn render(&self) -> &str {
        self.terminal.as_deref().unwrap_or(UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewmodel::friends::{FriendRosterView, ScanOutcome};

    #[test]
    fn test_code_scans_back_to_user() {
        let session = Session::new("u1".into());
        let view = QrCodeView::new(&AppConfig::default(), &session);

        let matrix = view.matrix().unwrap();
        assert_eq!((matrix.width(), matrix.height()), (400, 400));
        assert_eq!(
            FriendRosterView::scan_code(matrix),
            ScanOutcome::Scanned(session.user_id().clone())
        );
        assert_ne!(view.render(), UNAVAILABLE);
    }

    #[test]
    fn test_unavailable_for_blank_id() {
        let view = QrCodeView::new(&AppConfig::default(), &Session::new("".into()));
        assert!(view.matrix().is_none());
        assert_eq!(view.render(), UNAVAILABLE);
    }
}
