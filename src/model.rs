//! Input payload types
//!
//! The server-side pipeline serializes refinement results as a single JSON
//! document. The maps are deliberately order-preserving: chart column and row
//! order follows the enumeration order of the payload objects, so everything
//! object-shaped deserializes into an [`IndexMap`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Identifier → human-readable label, in payload order.
pub type CatalogMap = IndexMap<String, String>;

/// disease id → (term id → repetition count), in payload order.
pub type CountMap = IndexMap<String, IndexMap<String, u32>>;

/// One disease/term frequency annotation. A null frequency means the
/// annotation carries no usable frequency and is skipped everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRecord {
    pub disease_id: String,
    pub term_id: String,
    pub frequency: Option<f64>,
}

/// Data behind one repetition heatmap: the rank shifts and per-disease term
/// repetition counts for a single candidate recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapPanel {
    /// Recommendation this panel belongs to.
    pub action_id: String,
    /// disease id → signed average rank change (negative = improvement).
    pub rank_changes: IndexMap<String, f64>,
    /// Counts for observed terms.
    pub repetition_counts: CountMap,
    /// Counts for excluded terms; empty when the panel has no excluded data.
    #[serde(default)]
    pub excluded_counts: CountMap,
    /// Frequency annotations backing the sentinel markers and tooltip lines.
    #[serde(default)]
    pub frequencies: Vec<FrequencyRecord>,
}

impl HeatmapPanel {
    /// A panel with excluded counts renders the five-band variant.
    pub fn has_excluded(&self) -> bool {
        !self.excluded_counts.is_empty()
    }
}

/// Posttest probabilities for one recommendation, keyed by disease id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosttestPanel {
    pub action_id: String,
    /// Shared pretest baseline. The upstream pipeline does not emit
    /// per-disease pretest values yet, so one placeholder covers the row.
    #[serde(default = "default_initial_probability")]
    pub initial_probability: f64,
    pub posttest_probabilities: IndexMap<String, f64>,
}

fn default_initial_probability() -> f64 {
    0.5
}

/// One sample point on an empirical score distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRecord {
    pub action_id: String,
    pub score: f64,
    pub probability: f64,
}

/// A labeled curve of distribution sample points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionSeries {
    pub label: String,
    pub records: Vec<DistributionRecord>,
}

/// One cumulative-distribution scatter chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionPanel {
    /// Legend title, e.g. the name of the score the curves were filtered by.
    pub title: String,
    pub series: Vec<DistributionSeries>,
}

/// The full document handed over by the page-generation side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VizPayload {
    /// disease id → label.
    pub diseases: CatalogMap,
    /// symptom/feature term id → label.
    pub terms: CatalogMap,
    /// recommendation id → label.
    #[serde(default)]
    pub actions: CatalogMap,
    /// Upper bound on repetition counts.
    pub n_repetitions: u32,
    #[serde(default)]
    pub heatmaps: Vec<HeatmapPanel>,
    #[serde(default)]
    pub posttests: Vec<PosttestPanel>,
    #[serde(default)]
    pub distributions: Vec<DistributionPanel>,
}

impl VizPayload {
    pub fn from_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }

    /// Number of diseases in the differential; bounds the rank-change band.
    pub fn n_diseases(&self) -> usize {
        self.diseases.len()
    }

    pub fn chart_count(&self) -> usize {
        self.heatmaps.len() + self.posttests.len() + self.distributions.len()
    }
}
