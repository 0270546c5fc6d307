//! Text acquisition: turning a bill image into raw text.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Image file extensions accepted for upload.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "tiff", "bmp"];

/// Check whether a file looks like a supported bill image by its extension.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Anything that can turn an encoded image into raw text.
pub trait TextSource {
    /// Extract text from an encoded image payload (PNG, JPEG, ...).
    ///
    /// Implementations return [`OcrError::EmptyText`] rather than an empty
    /// string when the image contains no readable text.
    fn extract_text(&self, image: &[u8]) -> Result<String, OcrError>;
}

impl<T: TextSource + ?Sized> TextSource for &T {
    fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        (**self).extract_text(image)
    }
}

/// A recognized text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR on one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// Full text (boxes joined with newlines).
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Build a result from unordered boxes, sorting them into reading order.
    pub fn from_boxes(mut boxes: Vec<TextBox>, image_size: (u32, u32), processing_time_ms: u64) -> Self {
        sort_by_reading_order(&mut boxes);

        let text = boxes
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            boxes,
            text,
            processing_time_ms,
            image_size,
        }
    }
}

/// Sort boxes top-to-bottom in 20px rows, then left-to-right within a row.
fn sort_by_reading_order(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();

        let row_a = (ay / 20.0) as i32;
        let row_b = (by / 20.0) as i32;

        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 10.0, x, y + 10.0],
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_image(Path::new("bill.png")));
        assert!(is_supported_image(Path::new("scans/BILL.JPEG")));
        assert!(is_supported_image(Path::new("a.tiff")));
        assert!(!is_supported_image(Path::new("bill.pdf")));
        assert!(!is_supported_image(Path::new("bill")));
    }

    #[test]
    fn test_reading_order() {
        let boxes = vec![
            text_box(200.0, 45.0, "$10.00"),
            text_box(10.0, 5.0, "ACME STORE"),
            text_box(10.0, 42.0, "Red Widget"),
        ];

        let result = OcrResult::from_boxes(boxes, (400, 300), 12);
        assert_eq!(result.text, "ACME STORE\nRed Widget\n$10.00");
        assert_eq!(result.image_size, (400, 300));
    }
}
