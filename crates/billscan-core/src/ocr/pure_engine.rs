//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::time::Instant;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};

use super::{OcrResult, TextBox, TextSource};

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
///
/// Loading the models is the expensive part; build one engine at startup and
/// hand it to the pipeline rather than loading per image.
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from the model files named in `models`.
    pub fn from_config(models: &ModelConfig, config: OcrConfig) -> Result<Self, OcrError> {
        let det_path = models.model_path(&models.detection_model);
        let rec_path = models.model_path(&models.recognition_model);
        let dict_path = models.model_path(&models.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", models.model_dir.display());

        Ok(Self { engine, config })
    }

    /// Run OCR on a decoded image, returning boxes in reading order.
    pub fn process(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        info!("Processing image: {}x{}", width, height);

        let max_side = self.config.max_image_size;
        let resized;
        let image = if max_side > 0 && width.max(height) > max_side {
            debug!("Downscaling image to fit {}px", max_side);
            resized = image.resize(max_side, max_side, FilterType::Triangle);
            &resized
        } else {
            image
        };

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: clean_unk(&r.text, self.config.keep_unk),
                confidence: r.confidence,
            })
            .collect();

        let result = OcrResult::from_boxes(
            boxes,
            (width, height),
            start.elapsed().as_millis() as u64,
        );

        info!(
            "OCR complete: {} text boxes in {}ms",
            result.boxes.len(),
            result.processing_time_ms
        );

        Ok(result)
    }
}

impl TextSource for PureOcrEngine {
    fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        let image = image::load_from_memory(image)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        let text = self.process(&image)?.text;
        if text.trim().is_empty() {
            return Err(OcrError::EmptyText);
        }

        Ok(text)
    }
}

fn clean_unk(text: &str, keep_unk: bool) -> String {
    if keep_unk {
        text.to_string()
    } else {
        text.replace("[UNK]", " ")
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_unk() {
        assert_eq!(clean_unk("Red[UNK]Widget", false), "Red Widget");
        assert_eq!(clean_unk("Red[UNK]Widget", true), "Red[UNK]Widget");
    }

    #[test]
    fn test_missing_models_is_model_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let models = ModelConfig {
            model_dir: dir.path().to_path_buf(),
            ..ModelConfig::default()
        };

        let err = PureOcrEngine::from_config(&models, OcrConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, OcrError::ModelLoad(_)));
    }
}
