//! Conversion executor.
//!
//! Dispatches one input file to the image, text or PDF path according to its
//! kind, after checking the pair against the compatibility table. Image
//! codecs run on tokio's blocking pool so the caller's task stays responsive.

use crate::config::{CompressionLevel, ConverterConfig, ImageConfig};
use crate::documents;
use crate::error::{ConversionError, Result};
use crate::formats::{self, TargetFormat, PDF_KIND};
use crate::image_codec;
use crate::item::{ConvertedOutput, InputFile};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Converts single files.
#[derive(Debug, Clone)]
pub struct Converter {
    image: ImageConfig,
}

impl Converter {
    /// Create a new converter with the given configuration.
    pub fn new(config: &ConverterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            image: config.image.clone(),
        })
    }

    /// Convert `source` into `target`.
    ///
    /// `level` only affects image targets.
    pub async fn convert(
        &self,
        source: &InputFile,
        target: TargetFormat,
        level: CompressionLevel,
    ) -> Result<ConvertedOutput> {
        let kind = source.kind();
        if !formats::is_conversion_supported(kind, target) {
            return Err(unsupported(kind, target));
        }

        let start = Instant::now();
        let output = if formats::is_image_kind(kind) {
            self.convert_image(source.shared_data(), target, level).await?
        } else if formats::is_text_kind(kind) {
            let text = String::from_utf8_lossy(source.data());
            documents::text_to_document(&text, target)
        } else if kind == PDF_KIND && target == TargetFormat::Txt {
            let text = documents::extract_pdf_text(source.data());
            ConvertedOutput::new(text.into_bytes(), TargetFormat::Txt)
        } else {
            return Err(unsupported(kind, target));
        };

        debug!(
            "Converted {} ({}) to {}: {} -> {} bytes in {:?}",
            source.name(),
            kind,
            target,
            source.size(),
            output.size(),
            start.elapsed()
        );
        Ok(output)
    }

    async fn convert_image(
        &self,
        data: Arc<[u8]>,
        target: TargetFormat,
        level: CompressionLevel,
    ) -> Result<ConvertedOutput> {
        if !target.is_image() {
            return Err(ConversionError::UnsupportedConversion {
                from: "image".to_string(),
                to: target.to_string(),
            });
        }

        let config = self.image.clone();
        let encoded = tokio::task::spawn_blocking(move || {
            let decoded = image_codec::decode(&data, &config)?;
            image_codec::encode(&decoded, target, level)
        })
        .await
        .map_err(|e| {
            ConversionError::ResourceUnavailable(format!("image worker did not complete: {}", e))
        })??;

        Ok(ConvertedOutput::new(encoded, target))
    }
}

fn unsupported(kind: &str, target: TargetFormat) -> ConversionError {
    ConversionError::UnsupportedConversion {
        from: kind.to_string(),
        to: target.to_string(),
    }
}
