//! Identity codes
//!
//! A user's id rendered as a QR code for friend exchange. Encoding is pure:
//! the same id and size always give the same matrix.

use qrcode::render::unicode;
use qrcode::{Color, QrCode};

use crate::error::{Error, Result};

/// Light modules around the symbol, as the QR standard requires
const QUIET_ZONE: usize = 4;

/// Smallest module size in pixels; tiny requests are enlarged to stay scannable
const MIN_MODULE_PX: usize = 4;

/// Largest matrix we agree to allocate (a 4096 x 4096 image)
const MAX_PIXELS: usize = 4096 * 4096;

fn pixel_count(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .filter(|&pixels| pixels <= MAX_PIXELS)
        .ok_or_else(|| Error::IdentityCode(format!("size {}x{} is too large", width, height)))
}

/// A black and white pixel grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMatrix {
    width: usize,
    height: usize,
    dark: Vec<bool>,
}

impl PixelMatrix {
    fn blank(width: usize, height: usize) -> Result<Self> {
        Ok(Self {
            width,
            height,
            dark: vec![false; pixel_count(width, height)?],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True for a dark pixel; out-of-range reads are light
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.dark[y * self.width + x]
    }

    fn set_dark(&mut self, x: usize, y: usize) {
        self.dark[y * self.width + x] = true;
    }

    /// Greyscale value of a pixel (0 dark, 255 light)
    pub fn luma(&self, x: usize, y: usize) -> u8 {
        if self.is_dark(x, y) {
            0
        } else {
            255
        }
    }
}

/// Encode `text` into a QR code of at least `width` x `height` pixels.
///
/// Modules are square and centered. When the requested size cannot hold the
/// symbol at `MIN_MODULE_PX`, the matrix grows to fit.
pub fn encode(text: &str, width: usize, height: usize) -> Result<PixelMatrix> {
    if text.is_empty() {
        return Err(Error::IdentityCode("cannot encode an empty id".to_string()));
    }
    if width == 0 || height == 0 {
        return Err(Error::IdentityCode(format!(
            "invalid size {}x{}",
            width, height
        )));
    }
    pixel_count(width, height)?;

    let code = QrCode::new(text.as_bytes())
        .map_err(|e| Error::IdentityCode(format!("QR generation failed: {}", e)))?;
    let modules = code.width();
    let colors = code.to_colors();

    let full = modules + 2 * QUIET_ZONE;
    let scale = (width / full).min(height / full).max(MIN_MODULE_PX);
    let side = full * scale;
    let out_width = width.max(side);
    let out_height = height.max(side);
    let left = (out_width - side) / 2 + QUIET_ZONE * scale;
    let top = (out_height - side) / 2 + QUIET_ZONE * scale;

    let mut matrix = PixelMatrix::blank(out_width, out_height)?;
    for my in 0..modules {
        for mx in 0..modules {
            if colors[my * modules + mx] != Color::Dark {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    matrix.set_dark(left + mx * scale + dx, top + my * scale + dy);
                }
            }
        }
    }

    Ok(matrix)
}

/// Read the text back out of a scanned matrix
pub fn decode(matrix: &PixelMatrix) -> Option<String> {
    let mut image =
        rqrr::PreparedImage::prepare_from_greyscale(matrix.width(), matrix.height(), |x, y| {
            matrix.luma(x, y)
        });
    image
        .detect_grids()
        .into_iter()
        .find_map(|grid| grid.decode().ok().map(|(_, content)| content))
}

/// Compact terminal rendering of the code for `text`
pub fn render_terminal(text: &str) -> Result<String> {
    let code = QrCode::new(text.as_bytes())
        .map_err(|e| Error::IdentityCode(format!("QR generation failed: {}", e)))?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const UID: &str = "3f2b8c1e-9a47-4d0b-b6c2-5e8f71a0d934";

    #[test]
    fn test_round_trip() {
        let matrix = encode(UID, 400, 400).unwrap();
        assert_eq!((matrix.width(), matrix.height()), (400, 400));
        assert_eq!(decode(&matrix).as_deref(), Some(UID));
    }

    #[test]
    fn test_round_trip_non_square() {
        let matrix = encode("u1", 320, 200).unwrap();
        assert_eq!((matrix.width(), matrix.height()), (320, 200));
        assert_eq!(decode(&matrix).as_deref(), Some("u1"));
    }

    #[test]
    fn test_tiny_request_is_enlarged() {
        let matrix = encode(UID, 1, 1).unwrap();
        assert!(matrix.width() > 1 && matrix.height() > 1);
        assert_eq!(decode(&matrix).as_deref(), Some(UID));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(encode(UID, 200, 200).unwrap(), encode(UID, 200, 200).unwrap());
    }

    #[test]
    fn test_rejects_empty_and_zero_size() {
        assert!(encode("", 100, 100).is_err());
        assert!(encode(UID, 0, 100).is_err());
    }

    #[test]
    fn test_oversized_request_is_refused() {
        for (width, height) in [(usize::MAX, 2), (usize::MAX, usize::MAX), (5000, 5000)] {
            match encode(UID, width, height) {
                Err(Error::IdentityCode(msg)) => assert!(msg.contains("too large"), "{}", msg),
                other => panic!("{}x{} gave {:?}", width, height, other),
            }
        }
        assert!(PixelMatrix::blank(usize::MAX, 3).is_err());
        assert!(encode("u1", 4096, 4096).is_ok());
    }

    #[test]
    fn test_blank_matrix_decodes_to_nothing() {
        assert!(decode(&PixelMatrix::blank(100, 100).unwrap()).is_none());
    }

    #[test]
    fn test_terminal_rendering() {
        let rendered = render_terminal("u1").unwrap();
        assert!(rendered.lines().count() > 5);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Any printable id survives encoding at any on-screen size
        #[test]
        fn prop_round_trip_any_size(text in "[ -~]{1,40}", width in 1usize..=600, height in 1usize..=600) {
            let matrix = encode(&text, width, height).unwrap();
            prop_assert!(matrix.width() >= width && matrix.height() >= height);
            prop_assert_eq!(decode(&matrix), Some(text));
        }
    }
}
