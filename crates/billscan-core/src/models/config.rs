//! Configuration structures for the billscan pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BillscanError, Result};

/// Main configuration for billscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BillscanConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Model configuration.
    pub models: ModelConfig,

    /// Bill record storage.
    pub store: StoreConfig,

    /// Chat proxy configuration.
    pub chat: ChatConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Maximum image dimension (longer side); larger images are downscaled.
    pub max_image_size: u32,

    /// Keep `[UNK]` tokens emitted by the recognizer instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            max_image_size: 2048,
            keep_unk: false,
        }
    }
}

/// Model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

/// Bill record storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding all bill records.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("bills.json"),
        }
    }
}

/// Generative chat proxy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Model name passed to the endpoint.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Base URL of the generative language API.
    pub endpoint: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 30,
        }
    }
}

impl BillscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| BillscanError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| BillscanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl ModelConfig {
    /// Full path to a model file inside `model_dir`.
    pub fn model_path(&self, file_name: &str) -> PathBuf {
        self.model_dir.join(file_name)
    }
}
