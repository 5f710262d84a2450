//! Batch orchestrator.
//!
//! A [`Batch`] owns the items of one session. Admission keeps the batch to a
//! single compatible kind so that one target format and one compression level
//! apply to every item. Runs convert the runnable items strictly one after
//! another and publish a [`ConversionProgress`] snapshot after each
//! transition. A failing item never stops the run.

use crate::config::{
    AdmissionConfig, BatchResult, CompressionLevel, ConversionProgress, ConverterConfig,
    FailedItem, ItemResult,
};
use crate::converter::Converter;
use crate::error::{ConversionError, Result};
use crate::formats::{self, TargetFormat};
use crate::item::{ConversionItem, InputFile, ItemState};
use crate::stats::BatchStats;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The working set of items for a session.
#[derive(Debug)]
pub struct Batch {
    items: Vec<ConversionItem>,
    target: Option<TargetFormat>,
    compression: CompressionLevel,
    admission: AdmissionConfig,
    converter: Converter,
}

impl Batch {
    /// Create an empty batch.
    pub fn new(config: ConverterConfig) -> Result<Self> {
        let converter = Converter::new(&config)?;
        Ok(Self {
            items: Vec::new(),
            target: None,
            compression: config.compression,
            admission: config.admission,
            converter,
        })
    }

    /// Admit a submission as a whole, or reject it without touching the batch.
    ///
    /// Every file must be within the size limit and share a compatible kind
    /// with the batch (or, for an empty batch, with the first submitted file).
    pub fn admit(&mut self, files: Vec<InputFile>) -> Result<Vec<Uuid>> {
        let Some(first) = files.first() else {
            return Ok(Vec::new());
        };

        let limit = self.admission.max_file_size_bytes;
        if let Some(file) = files.iter().find(|f| f.size() > limit) {
            warn!("Rejected submission: {} exceeds {} bytes", file.name(), limit);
            return Err(ConversionError::FileTooLarge {
                name: file.name().to_string(),
                size: file.size(),
                limit,
            });
        }

        let reference = self.batch_kind().unwrap_or(first.kind()).to_string();
        if let Some(file) = files
            .iter()
            .find(|f| !formats::are_kinds_compatible(&reference, f.kind()))
        {
            warn!(
                "Rejected submission: {} ({}) does not match batch kind {}",
                file.name(),
                file.kind(),
                reference
            );
            return Err(ConversionError::BatchIncompatible {
                existing: reference,
                incoming: file.kind().to_string(),
            });
        }

        let mut ids = Vec::with_capacity(files.len());
        for file in files {
            let item = ConversionItem::new(file);
            debug!("Admitted {} as {}", item.name(), item.id());
            ids.push(item.id());
            self.items.push(item);
        }

        info!("Admitted {} files ({} in batch)", ids.len(), self.items.len());
        Ok(ids)
    }

    /// Remove an item, handing it back so its payload can be released.
    pub fn remove(&mut self, id: Uuid) -> Option<ConversionItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        let removed = self.items.remove(index);
        if self.items.is_empty() {
            self.target = None;
        }
        Some(removed)
    }

    /// Drop every item and reset the target selection.
    pub fn clear(&mut self) -> Vec<ConversionItem> {
        self.target = None;
        std::mem::take(&mut self.items)
    }

    pub fn items(&self) -> &[ConversionItem] {
        &self.items
    }

    pub fn get(&self, id: Uuid) -> Option<&ConversionItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Kind of the first item, which the rest of the batch is compatible with.
    pub fn batch_kind(&self) -> Option<&str> {
        self.items.first().map(ConversionItem::original_kind)
    }

    /// Output formats the batch can be converted into.
    pub fn available_formats(&self) -> &'static [TargetFormat] {
        self.batch_kind().map(formats::allowed_targets).unwrap_or(&[])
    }

    /// Whether the compression level applies to this batch.
    pub fn is_image_batch(&self) -> bool {
        self.batch_kind().is_some_and(formats::is_image_kind)
    }

    pub fn target_format(&self) -> Option<TargetFormat> {
        self.target
    }

    /// Select the target format for the next run.
    pub fn set_target_format(&mut self, target: TargetFormat) -> Result<()> {
        if !self.available_formats().contains(&target) {
            return Err(ConversionError::UnsupportedConversion {
                from: self.batch_kind().unwrap_or("empty batch").to_string(),
                to: target.to_string(),
            });
        }
        self.target = Some(target);
        Ok(())
    }

    pub fn compression(&self) -> CompressionLevel {
        self.compression
    }

    pub fn set_compression(&mut self, level: CompressionLevel) {
        self.compression = level;
    }

    /// Items that have never been run.
    pub fn pending_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.state(), ItemState::Pending))
            .count()
    }

    /// Items the next run would pick up (pending or failed).
    pub fn runnable_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.state().is_runnable())
            .count()
    }

    /// Totals over completed items, `None` when nothing has completed.
    pub fn stats(&self) -> Option<BatchStats> {
        BatchStats::from_items(&self.items)
    }

    /// Run with the selected target and compression level.
    pub async fn run(&mut self) -> Result<BatchResult> {
        self.run_with_progress(|_| {}).await
    }

    /// Run with the selected settings, reporting every transition.
    pub async fn run_with_progress<F>(&mut self, progress: F) -> Result<BatchResult>
    where
        F: FnMut(ConversionProgress),
    {
        let target = self.target.ok_or(ConversionError::TargetNotSelected)?;
        self.execute(target, self.compression, progress).await
    }

    /// Convert every pending or failed item into `target`.
    ///
    /// Completed items are left untouched. Per-item failures are recorded on
    /// the item and in the returned [`BatchResult`].
    ///
    /// Each [`ConversionProgress`] describes the one item that just changed
    /// state. The batch is borrowed for the whole run, so observers that show
    /// the full list keep their own copy keyed by `item_id` and update it
    /// from each snapshot.
    pub async fn run_batch<F>(
        &mut self,
        target: TargetFormat,
        level: CompressionLevel,
        progress: F,
    ) -> Result<BatchResult>
    where
        F: FnMut(ConversionProgress),
    {
        self.target = Some(target);
        self.compression = level;
        self.execute(target, level, progress).await
    }

    async fn execute<F>(
        &mut self,
        target: TargetFormat,
        level: CompressionLevel,
        mut progress: F,
    ) -> Result<BatchResult>
    where
        F: FnMut(ConversionProgress),
    {
        let start = Instant::now();
        let selected: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.state().is_runnable())
            .map(|(index, _)| index)
            .collect();
        let total_items = selected.len();
        let mut result = BatchResult::default();

        info!(
            "Converting {} of {} items to {} ({})",
            total_items,
            self.items.len(),
            target,
            level.label()
        );

        for (item_index, &slot) in selected.iter().enumerate() {
            let item_start = Instant::now();

            let item = &mut self.items[slot];
            item.begin(target)?;
            progress(snapshot(item, item_index, total_items));
            let source = item.source().clone();

            let outcome = self.converter.convert(&source, target, level).await;

            let item = &mut self.items[slot];
            match outcome {
                Ok(output) => {
                    let result_size = output.size();
                    item.complete(output)?;
                    info!(
                        "Converted {}: {} -> {} bytes",
                        item.name(),
                        item.original_size(),
                        result_size
                    );
                    result.successful.push(ItemResult {
                        item_id: item.id(),
                        file_name: item.name().to_string(),
                        original_size: item.original_size(),
                        result_size,
                        duration: item_start.elapsed(),
                    });
                }
                Err(e) => {
                    warn!("Failed to convert {}: {}", item.name(), e);
                    item.fail(e.to_string())?;
                    result.failed.push(FailedItem {
                        item_id: item.id(),
                        file_name: item.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
            progress(snapshot(item, item_index, total_items));
        }

        result.total_duration = start.elapsed();
        info!(
            "Batch finished: {} converted, {} failed in {:?}",
            result.successful.len(),
            result.failed.len(),
            result.total_duration
        );
        Ok(result)
    }
}

fn snapshot(item: &ConversionItem, item_index: usize, total_items: usize) -> ConversionProgress {
    ConversionProgress {
        item_index,
        total_items,
        item_id: item.id(),
        file_name: item.name().to_string(),
        stage: item.stage(),
        result_size: item.result_size(),
        error: item.error().map(str::to_string),
    }
}
