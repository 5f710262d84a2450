//! Size statistics over completed items.

use crate::config::ConversionStage;
use crate::item::ConversionItem;
use serde::{Deserialize, Serialize};

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Totals across the completed items of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub completed_items: usize,
    pub total_original: u64,
    pub total_converted: u64,
    /// `max(0, total_original - total_converted)`
    pub saved: u64,
}

impl BatchStats {
    /// Aggregate completed items; `None` when there are none.
    pub fn from_items(items: &[ConversionItem]) -> Option<Self> {
        let mut completed_items = 0;
        let mut total_original = 0u64;
        let mut total_converted = 0u64;

        for item in items {
            if item.stage() != ConversionStage::Completed {
                continue;
            }
            completed_items += 1;
            total_original += item.original_size();
            total_converted += item.result_size().unwrap_or(0);
        }

        if completed_items == 0 {
            return None;
        }

        Some(Self {
            completed_items,
            total_original,
            total_converted,
            saved: total_original.saturating_sub(total_converted),
        })
    }

    /// Labelled rows for a size chart.
    pub fn rows(&self) -> [(&'static str, u64); 3] {
        [
            ("Original", self.total_original),
            ("New Size", self.total_converted),
            ("Saved", self.saved),
        ]
    }
}

/// Format a byte count with base-1024 units and at most two decimals.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
