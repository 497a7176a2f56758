//! Phenoviz - Interactive charts for diagnostic-score refinement results
//!
//! Phenoviz reshapes the JSON payloads produced by a clinical
//! decision-support pipeline (disease rank changes, HPO term repetition
//! counts, posttest probabilities, score distributions) into the declarative
//! series + options format of the in-browser charting libraries, and writes
//! a self-contained HTML report around them.
//!
//! # Overview
//!
//! The interesting chart is the repetition heatmap: one row per candidate
//! disease plus a reference row fixing the column order, with a single
//! numeric axis overloaded to carry five disjoint meanings. Fixed
//! multipliers keep the bands apart:
//!
//! | Value range | Meaning |
//! |-------------|---------|
//! | `[-(N-1), -1]` | rank improvement |
//! | `[1, N-1]` | rank decline |
//! | `[100, reps × 100]` | observed repetition count × 100 |
//! | `[-reps × 100, -100]` | excluded repetition count × -100 |
//! | `10000` | clinical annotation sentinel |
//!
//! Tooltips decode a cell back into its band and reconstruct the underlying
//! disease/term/frequency facts; x-axis term labels link out to the HPO
//! browser. All of that is resolved while the report is generated, so the
//! page scripts stay dumb lookups.
//!
//! # Quick Start
//!
//! ```no_run
//! use phenoviz::{report, VizPayload};
//!
//! let text = std::fs::read_to_string("results.json").unwrap();
//! let payload = VizPayload::from_str(&text).unwrap();
//!
//! report::generate("report.html", &payload).unwrap();
//! ```
//!
//! # Modules
//!
//! - [`model`]: the payload contract (order-preserving maps)
//! - [`normalize`]: derived lookups (label reverse index, frequency grouping)
//! - [`chart`]: chart configuration builders
//! - [`report`]: HTML/JSON report writers
//! - [`serve`]: interactive HTTP mode

pub mod chart;
pub mod model;
pub mod normalize;
pub mod report;
pub mod serve;

pub use chart::encoding::{CellBand, ValueEncoding};
pub use chart::{build_all, ChartBundle};
pub use model::{
    DistributionPanel, DistributionRecord, DistributionSeries, FrequencyRecord, HeatmapPanel,
    PosttestPanel, VizPayload,
};
pub use normalize::{FrequencyIndex, LabelIndex};
