//! Configuration types for batch conversion.

use crate::error::{ConversionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Default per-file size limit in MiB.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 250;

const MIB: u64 = 1024 * 1024;

/// Named compression setting applied uniformly to a batch.
///
/// Only image conversions consult it. `Low` compression keeps the most
/// fidelity, `High` trades fidelity for size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompressionLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl CompressionLevel {
    /// All levels, from best quality to smallest output.
    pub const ALL: [CompressionLevel; 3] = [
        CompressionLevel::Low,
        CompressionLevel::Medium,
        CompressionLevel::High,
    ];

    /// Quality fraction in `0.0..=1.0` used for lossy re-encoding.
    ///
    /// Only JPEG is lossy. PNG maps the level to deflate effort through
    /// [`png_compression`](Self::png_compression), and WebP output is
    /// always lossless, so the level does not change it.
    pub fn image_quality(self) -> f32 {
        match self {
            CompressionLevel::Low => 0.9,
            CompressionLevel::Medium => 0.7,
            CompressionLevel::High => 0.5,
        }
    }

    /// JPEG quality on the encoder's 1-100 scale.
    pub fn jpeg_quality(self) -> u8 {
        (self.image_quality() * 100.0).round() as u8
    }

    /// Deflate effort for PNG output.
    pub fn png_compression(self) -> png::Compression {
        match self {
            CompressionLevel::Low => png::Compression::Best,
            CompressionLevel::Medium => png::Compression::Default,
            CompressionLevel::High => png::Compression::Fast,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            CompressionLevel::Low => "Best Quality",
            CompressionLevel::Medium => "Balanced",
            CompressionLevel::High => "Max Compression",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompressionLevel::Low => "LOW",
            CompressionLevel::Medium => "MEDIUM",
            CompressionLevel::High => "HIGH",
        }
    }
}

impl FromStr for CompressionLevel {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(CompressionLevel::Low),
            "MEDIUM" => Ok(CompressionLevel::Medium),
            "HIGH" => Ok(CompressionLevel::High),
            _ => Err(ConversionError::UnknownCompressionLevel(s.to_string())),
        }
    }
}

/// Limits enforced when files are submitted to a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Maximum size of a single submitted file.
    /// Default: 250 MiB.
    pub max_file_size_bytes: u64,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * MIB,
        }
    }
}

impl AdmissionConfig {
    /// Create an admission config with a limit expressed in MiB.
    pub fn with_max_file_size_mb(mb: u64) -> Self {
        Self {
            max_file_size_bytes: mb.saturating_mul(MIB),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size_bytes == 0 {
            return Err(ConversionError::InvalidConfig(
                "max_file_size_bytes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Decoder limits for image conversions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Upper bound on memory a single decode may allocate.
    /// Default: 512 MiB.
    pub max_decode_alloc: u64,

    /// Maximum width or height accepted from a decoded image.
    /// Default: 16384 pixels.
    pub max_dimension: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_decode_alloc: 512 * MIB,
            max_dimension: 16_384,
        }
    }
}

impl ImageConfig {
    /// Set the decode allocation limit.
    pub fn max_decode_alloc(mut self, bytes: u64) -> Self {
        self.max_decode_alloc = bytes;
        self
    }

    /// Set the maximum accepted image dimension.
    pub fn max_dimension(mut self, pixels: u32) -> Self {
        self.max_dimension = pixels;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_decode_alloc == 0 {
            return Err(ConversionError::InvalidConfig(
                "max_decode_alloc must be greater than 0".to_string(),
            ));
        }
        if self.max_dimension == 0 {
            return Err(ConversionError::InvalidConfig(
                "max_dimension must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Decoder limits for the `image` crate.
    pub(crate) fn limits(&self) -> image::Limits {
        let mut limits = image::Limits::default();
        limits.max_alloc = Some(self.max_decode_alloc);
        limits.max_image_width = Some(self.max_dimension);
        limits.max_image_height = Some(self.max_dimension);
        limits
    }
}

/// Combined configuration for a batch and its converter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Admission configuration.
    pub admission: AdmissionConfig,

    /// Image decoder configuration.
    pub image: ImageConfig,

    /// Initial compression level for new batches.
    #[serde(default)]
    pub compression: CompressionLevel,
}

impl ConverterConfig {
    /// Create a config with the given per-file limit in MiB.
    pub fn new(max_file_size_mb: u64) -> Self {
        Self {
            admission: AdmissionConfig::with_max_file_size_mb(max_file_size_mb),
            ..Default::default()
        }
    }

    /// Set the per-file size limit in bytes.
    pub fn max_file_size_bytes(mut self, bytes: u64) -> Self {
        self.admission.max_file_size_bytes = bytes;
        self
    }

    /// Set the initial compression level.
    pub fn compression(mut self, level: CompressionLevel) -> Self {
        self.compression = level;
        self
    }

    /// Set the image decoder configuration.
    pub fn image(mut self, image: ImageConfig) -> Self {
        self.image = image;
        self
    }

    /// Validate the entire configuration.
    pub fn validate(&self) -> Result<()> {
        self.admission.validate()?;
        self.image.validate()?;
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ConverterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file, falling back to defaults when absent.
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&content)
    }

    /// Save configuration to a JSON file.
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

/// Lifecycle stage of a conversion item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConversionStage {
    /// Admitted, waiting for a run.
    Pending,
    /// Being converted.
    Processing,
    /// Converted; a payload is attached.
    Completed,
    /// Conversion failed; an error message is attached.
    Failed,
}

/// Snapshot published after every item transition during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionProgress {
    /// Position of the item among the items selected for this run.
    pub item_index: usize,

    /// Number of items selected for this run.
    pub total_items: usize,

    /// Identity of the item.
    pub item_id: Uuid,

    /// Original file name.
    pub file_name: String,

    /// Stage the item just entered.
    pub stage: ConversionStage,

    /// Output size once completed.
    pub result_size: Option<u64>,

    /// Error description once failed.
    pub error: Option<String>,
}

/// Result of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Items converted in this run.
    pub successful: Vec<ItemResult>,

    /// Items that failed in this run.
    pub failed: Vec<FailedItem>,

    /// Total processing time.
    pub total_duration: Duration,
}

impl BatchResult {
    /// Number of items processed in this run.
    pub fn processed(&self) -> usize {
        self.successful.len() + self.failed.len()
    }
}

/// A successfully converted item.
#[derive(Debug, Clone)]
pub struct ItemResult {
    pub item_id: Uuid,
    pub file_name: String,
    pub original_size: u64,
    pub result_size: u64,
    /// Processing time for this item.
    pub duration: Duration,
}

/// Information about a failed conversion.
#[derive(Debug, Clone)]
pub struct FailedItem {
    pub item_id: Uuid,
    pub file_name: String,
    /// Error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // CompressionLevel tests
    #[test]
    fn test_compression_level_qualities() {
        assert_eq!(CompressionLevel::Low.image_quality(), 0.9);
        assert_eq!(CompressionLevel::Medium.image_quality(), 0.7);
        assert_eq!(CompressionLevel::High.image_quality(), 0.5);

        assert_eq!(CompressionLevel::Low.jpeg_quality(), 90);
        assert_eq!(CompressionLevel::Medium.jpeg_quality(), 70);
        assert_eq!(CompressionLevel::High.jpeg_quality(), 50);
    }

    #[test]
    fn test_compression_level_labels() {
        assert_eq!(CompressionLevel::Low.label(), "Best Quality");
        assert_eq!(CompressionLevel::Medium.label(), "Balanced");
        assert_eq!(CompressionLevel::High.label(), "Max Compression");
    }

    #[test]
    fn test_compression_level_default_is_medium() {
        assert_eq!(CompressionLevel::default(), CompressionLevel::Medium);
    }

    #[test]
    fn test_compression_level_from_str() {
        assert_eq!("low".parse::<CompressionLevel>().unwrap(), CompressionLevel::Low);
        assert_eq!("MEDIUM".parse::<CompressionLevel>().unwrap(), CompressionLevel::Medium);
        assert_eq!(" High ".parse::<CompressionLevel>().unwrap(), CompressionLevel::High);
        assert!(matches!(
            "extreme".parse::<CompressionLevel>(),
            Err(ConversionError::UnknownCompressionLevel(_))
        ));
    }

    #[test]
    fn test_compression_level_serde_uppercase() {
        let json = serde_json::to_string(&CompressionLevel::High).unwrap();
        assert_eq!(json, "\"HIGH\"");
        let level: CompressionLevel = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(level, CompressionLevel::Low);
    }

    // AdmissionConfig tests
    #[test]
    fn test_admission_config_defaults() {
        let config = AdmissionConfig::default();
        assert_eq!(config.max_file_size_bytes, 250 * 1024 * 1024);
    }

    #[test]
    fn test_admission_config_validation_zero_limit() {
        let config = AdmissionConfig {
            max_file_size_bytes: 0,
        };
        assert!(config.validate().is_err());
    }

    // ImageConfig tests
    #[test]
    fn test_image_config_builder_pattern() {
        let config = ImageConfig::default()
            .max_decode_alloc(1024)
            .max_dimension(64);
        assert_eq!(config.max_decode_alloc, 1024);
        assert_eq!(config.max_dimension, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_image_config_validation_zero_values() {
        assert!(ImageConfig::default().max_dimension(0).validate().is_err());
        assert!(ImageConfig::default().max_decode_alloc(0).validate().is_err());
    }

    // ConverterConfig tests
    #[test]
    fn test_converter_config_new() {
        let config = ConverterConfig::new(10);
        assert_eq!(config.admission.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.compression, CompressionLevel::Medium);
    }

    #[test]
    fn test_converter_config_validate_propagates() {
        let config = ConverterConfig::default().max_file_size_bytes(0);
        assert!(config.validate().is_err());

        let config2 = ConverterConfig::default().image(ImageConfig::default().max_dimension(0));
        assert!(config2.validate().is_err());
    }

    #[test]
    fn test_converter_config_from_json_without_compression() {
        let json = r#"{
            "admission": { "max_file_size_bytes": 2048 },
            "image": { "max_decode_alloc": 4096, "max_dimension": 100 }
        }"#;
        let config = ConverterConfig::from_json_str(json).unwrap();
        assert_eq!(config.admission.max_file_size_bytes, 2048);
        assert_eq!(config.compression, CompressionLevel::Medium);
    }

    #[test]
    fn test_converter_config_from_json_rejects_invalid() {
        let json = r#"{
            "admission": { "max_file_size_bytes": 0 },
            "image": { "max_decode_alloc": 4096, "max_dimension": 100 }
        }"#;
        assert!(matches!(
            ConverterConfig::from_json_str(json),
            Err(ConversionError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_converter_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("concom.json");

        let original = ConverterConfig::new(5).compression(CompressionLevel::High);
        original.save_to_file(&config_path).await.unwrap();

        let loaded = ConverterConfig::from_file(&config_path).await.unwrap();
        assert_eq!(loaded.admission.max_file_size_bytes, 5 * 1024 * 1024);
        assert_eq!(loaded.compression, CompressionLevel::High);
    }

    #[tokio::test]
    async fn test_converter_config_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = ConverterConfig::from_file(&temp_dir.path().join("absent.json"))
            .await
            .unwrap();
        assert_eq!(
            loaded.admission.max_file_size_bytes,
            AdmissionConfig::default().max_file_size_bytes
        );
    }

    // BatchResult tests
    #[test]
    fn test_batch_result_processed() {
        let result = BatchResult {
            successful: vec![ItemResult {
                item_id: Uuid::new_v4(),
                file_name: "a.png".to_string(),
                original_size: 10,
                result_size: 5,
                duration: Duration::from_millis(3),
            }],
            failed: vec![FailedItem {
                item_id: Uuid::new_v4(),
                file_name: "b.png".to_string(),
                error: "Failed to load image".to_string(),
            }],
            total_duration: Duration::from_millis(5),
        };
        assert_eq!(result.processed(), 2);
        assert!(BatchResult::default().successful.is_empty());
    }
}
