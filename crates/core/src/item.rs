//! Conversion items and their lifecycle.
//!
//! An item moves `Pending -> Processing -> Completed | Failed`. Failed items
//! may re-enter `Processing`; completed items never leave `Completed`.

use crate::config::ConversionStage;
use crate::error::{ConversionError, Result};
use crate::formats::{self, TargetFormat};
use std::sync::Arc;
use uuid::Uuid;

/// A file handed over by the file-selection source.
#[derive(Debug, Clone)]
pub struct InputFile {
    name: String,
    kind: String,
    data: Arc<[u8]>,
}

impl InputFile {
    /// Create an input file. An empty kind is inferred from the file name.
    pub fn new(name: impl Into<String>, kind: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let mut kind = kind.into();
        if kind.trim().is_empty() {
            kind = formats::kind_from_file_name(&name).to_string();
        }
        Self {
            name,
            kind,
            data: data.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle to the raw bytes.
    pub fn shared_data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Payload produced by a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedOutput {
    pub data: Vec<u8>,
    pub format: TargetFormat,
    pub mime_type: &'static str,
}

impl ConvertedOutput {
    /// Output labelled with the format's own MIME type.
    pub fn new(data: Vec<u8>, format: TargetFormat) -> Self {
        Self {
            data,
            format,
            mime_type: format.mime_type(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Kind label of the output (its extension).
    pub fn label(&self) -> &'static str {
        self.format.extension()
    }
}

/// Per-item state machine.
#[derive(Debug, Clone)]
pub enum ItemState {
    Pending,
    Processing,
    Completed(ConvertedOutput),
    Failed(String),
}

impl ItemState {
    pub fn stage(&self) -> ConversionStage {
        match self {
            ItemState::Pending => ConversionStage::Pending,
            ItemState::Processing => ConversionStage::Processing,
            ItemState::Completed(_) => ConversionStage::Completed,
            ItemState::Failed(_) => ConversionStage::Failed,
        }
    }

    /// Whether a run should pick this item up.
    pub fn is_runnable(&self) -> bool {
        matches!(self, ItemState::Pending | ItemState::Failed(_))
    }
}

/// A retrievable converted file.
#[derive(Debug, Clone, Copy)]
pub struct Download<'a> {
    pub file_name: &'a str,
    pub mime_type: &'static str,
    pub data: &'a [u8],
}

/// One file in a batch.
#[derive(Debug, Clone)]
pub struct ConversionItem {
    id: Uuid,
    source: InputFile,
    target: Option<TargetFormat>,
    state: ItemState,
    download_name: Option<String>,
}

impl ConversionItem {
    pub fn new(source: InputFile) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            target: None,
            state: ItemState::Pending,
            download_name: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source(&self) -> &InputFile {
        &self.source
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn original_kind(&self) -> &str {
        self.source.kind()
    }

    pub fn original_size(&self) -> u64 {
        self.source.size()
    }

    /// Target chosen for the most recent run, if any.
    pub fn target(&self) -> Option<TargetFormat> {
        self.target
    }

    pub fn state(&self) -> &ItemState {
        &self.state
    }

    pub fn stage(&self) -> ConversionStage {
        self.state.stage()
    }

    pub fn output(&self) -> Option<&ConvertedOutput> {
        match &self.state {
            ItemState::Completed(output) => Some(output),
            _ => None,
        }
    }

    pub fn result_size(&self) -> Option<u64> {
        self.output().map(ConvertedOutput::size)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ItemState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// `Pending | Failed -> Processing`, recording the target.
    pub fn begin(&mut self, target: TargetFormat) -> Result<()> {
        if !self.state.is_runnable() {
            return Err(self.refuse(ConversionStage::Processing));
        }
        self.target = Some(target);
        self.state = ItemState::Processing;
        Ok(())
    }

    /// `Processing -> Completed`.
    pub fn complete(&mut self, output: ConvertedOutput) -> Result<()> {
        if !matches!(self.state, ItemState::Processing) {
            return Err(self.refuse(ConversionStage::Completed));
        }
        self.download_name = Some(download_name(self.name(), output.format));
        self.state = ItemState::Completed(output);
        Ok(())
    }

    /// `Processing -> Failed`.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        if !matches!(self.state, ItemState::Processing) {
            return Err(self.refuse(ConversionStage::Failed));
        }
        self.state = ItemState::Failed(message.into());
        Ok(())
    }

    /// The converted payload, available once completed.
    pub fn download(&self) -> Option<Download<'_>> {
        let output = self.output()?;
        let file_name = self.download_name.as_deref()?;
        Some(Download {
            file_name,
            mime_type: output.mime_type,
            data: &output.data,
        })
    }

    fn refuse(&self, to: ConversionStage) -> ConversionError {
        ConversionError::InvalidTransition {
            from: self.stage(),
            to,
        }
    }
}

/// `<text before the first '.'>.<extension>`
pub fn download_name(original_name: &str, format: TargetFormat) -> String {
    let base = original_name.split('.').next().unwrap_or_default();
    format!("{}.{}", base, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_item(name: &str, content: &str) -> ConversionItem {
        ConversionItem::new(InputFile::new(name, "text/plain", content.as_bytes().to_vec()))
    }

    #[test]
    fn test_input_file_infers_empty_kind() {
        let file = InputFile::new("photo.png", "", vec![1u8, 2, 3]);
        assert_eq!(file.kind(), "image/png");
        assert_eq!(file.size(), 3);

        let explicit = InputFile::new("photo.png", "image/webp", vec![1u8]);
        assert_eq!(explicit.kind(), "image/webp");
    }

    #[test]
    fn test_new_item_is_pending() {
        let item = text_item("notes.txt", "hello");
        assert_eq!(item.stage(), ConversionStage::Pending);
        assert_eq!(item.original_size(), 5);
        assert!(item.target().is_none());
        assert!(item.output().is_none());
        assert!(item.download().is_none());
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut item = text_item("notes.txt", "hello");
        item.begin(TargetFormat::Docx).unwrap();
        assert_eq!(item.stage(), ConversionStage::Processing);
        assert_eq!(item.target(), Some(TargetFormat::Docx));

        item.complete(ConvertedOutput::new(b"hello".to_vec(), TargetFormat::Docx))
            .unwrap();
        assert_eq!(item.stage(), ConversionStage::Completed);
        assert_eq!(item.result_size(), Some(5));

        let download = item.download().unwrap();
        assert_eq!(download.file_name, "notes.docx");
        assert_eq!(download.mime_type, TargetFormat::Docx.mime_type());
        assert_eq!(download.data, b"hello");
    }

    #[test]
    fn test_failed_item_can_retry() {
        let mut item = text_item("notes.txt", "hello");
        item.begin(TargetFormat::Pdf).unwrap();
        item.fail("boom").unwrap();
        assert_eq!(item.error(), Some("boom"));
        assert!(item.state().is_runnable());

        item.begin(TargetFormat::Pdf).unwrap();
        assert_eq!(item.stage(), ConversionStage::Processing);
        assert!(item.error().is_none());
    }

    #[test]
    fn test_completed_item_cannot_restart() {
        let mut item = text_item("notes.txt", "hello");
        item.begin(TargetFormat::Docx).unwrap();
        item.complete(ConvertedOutput::new(vec![1], TargetFormat::Docx))
            .unwrap();

        let err = item.begin(TargetFormat::Pdf).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::InvalidTransition {
                from: ConversionStage::Completed,
                to: ConversionStage::Processing,
            }
        ));
        assert_eq!(item.target(), Some(TargetFormat::Docx));
    }

    #[test]
    fn test_pending_item_cannot_finish() {
        let mut item = text_item("notes.txt", "hello");
        assert!(item.complete(ConvertedOutput::new(vec![], TargetFormat::Pdf)).is_err());
        assert!(item.fail("nope").is_err());
        assert_eq!(item.stage(), ConversionStage::Pending);
    }

    #[test]
    fn test_download_name_uses_text_before_first_dot() {
        assert_eq!(download_name("photo.png", TargetFormat::Webp), "photo.webp");
        assert_eq!(download_name("archive.tar.gz", TargetFormat::Txt), "archive.txt");
        assert_eq!(download_name("README", TargetFormat::Pdf), "README.pdf");
    }
}
