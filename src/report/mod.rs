//! Report generation
//!
//! Output formatters for a rendered payload:
//!
//! - **HTML**: self-contained interactive page (charts, tooltips, term links)
//! - **JSON**: the chart configurations, machine-readable
//!
//! # Usage
//!
//! ```ignore
//! use phenoviz::report;
//!
//! // Picks the format from the extension
//! report::generate("report.html", &payload)?;  // HTML
//! report::generate("report.json", &payload)?;  // JSON
//! ```

pub mod html;
pub mod json;

use crate::model::VizPayload;
use serde::Serialize;
use std::io;
use std::path::Path;

/// Generate a report in the appropriate format based on file extension.
pub fn generate<P: AsRef<Path>>(path: P, payload: &VizPayload) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "html" | "htm" => html::write(&mut file, payload),
        _ => json::write(&mut file, payload),
    }
}

/// Headline numbers for the report's stats row.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub diseases: usize,
    pub terms: usize,
    pub heatmaps: usize,
    pub posttests: usize,
    pub distributions: usize,
    /// (panel, disease) entries whose average rank change is negative.
    pub improved: usize,
    /// Entries whose average rank change is positive.
    pub declined: usize,
}

impl Summary {
    pub fn from_payload(payload: &VizPayload) -> Self {
        let mut summary = Self {
            diseases: payload.diseases.len(),
            terms: payload.terms.len(),
            heatmaps: payload.heatmaps.len(),
            posttests: payload.posttests.len(),
            distributions: payload.distributions.len(),
            ..Self::default()
        };

        for panel in &payload.heatmaps {
            for &change in panel.rank_changes.values() {
                if change < 0.0 {
                    summary.improved += 1;
                } else if change > 0.0 {
                    summary.declined += 1;
                }
            }
        }

        summary
    }

    pub fn chart_count(&self) -> usize {
        self.heatmaps + self.posttests + self.distributions
    }
}
