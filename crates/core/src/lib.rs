//! # concom-core
//!
//! In-process batch file conversion. Nothing leaves the host: images are
//! re-encoded with the `image` and `png` crates, text documents are turned
//! into PDF (and stub DOCX/XLSX), and PDFs yield their literal text.
//!
//! The pieces, leaf first:
//!
//! - [`formats`]: which output formats each input kind may be converted into
//! - [`Converter`]: converts one file, dispatching on its kind
//! - [`Batch`]: admits files, runs them one at a time, tracks each item's state
//! - [`BatchStats`]: original/converted/saved totals over completed items
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use concom_core::{Batch, CompressionLevel, ConverterConfig, InputFile, TargetFormat};
//!
//! #[tokio::main]
//! async fn main() -> concom_core::Result<()> {
//!     let mut batch = Batch::new(ConverterConfig::default())?;
//!
//!     let png = std::fs::read("photo.png")?;
//!     batch.admit(vec![InputFile::new("photo.png", "image/png", png)])?;
//!
//!     let result = batch
//!         .run_batch(TargetFormat::Webp, CompressionLevel::Medium, |progress| {
//!             println!("{}: {:?}", progress.file_name, progress.stage);
//!         })
//!         .await?;
//!
//!     for item in batch.items() {
//!         if let Some(download) = item.download() {
//!             std::fs::write(download.file_name, download.data)?;
//!         }
//!     }
//!
//!     if let Some(stats) = batch.stats() {
//!         println!(
//!             "{} converted, saved {}",
//!             result.successful.len(),
//!             concom_core::format_bytes(stats.saved)
//!         );
//!     }
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod converter;
pub mod documents;
pub mod error;
pub mod formats;
pub mod image_codec;
pub mod item;
pub mod stats;

// Re-export main types for convenience
pub use batch::Batch;
pub use config::{
    AdmissionConfig, BatchResult, CompressionLevel, ConversionProgress, ConversionStage,
    ConverterConfig, FailedItem, ImageConfig, ItemResult,
};
pub use converter::Converter;
pub use error::{ConversionError, Result};
pub use formats::{allowed_targets, TargetFormat};
pub use item::{ConversionItem, ConvertedOutput, Download, InputFile, ItemState};
pub use stats::{format_bytes, BatchStats};

/// Input kinds that have at least one permitted output.
pub const SUPPORTED_KINDS: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/bmp",
    "text/plain",
    "text/html",
    "application/json",
    "application/xml",
    "text/xml",
    "text/csv",
    formats::PDF_KIND,
    formats::DOCX_KIND,
];

/// Check if an input kind can be converted to anything.
pub fn is_supported_kind(kind: &str) -> bool {
    !allowed_targets(kind).is_empty()
}

/// Initialize the library's logging.
/// Call this once at application startup if you want to see logs.
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
}
