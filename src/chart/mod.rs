//! Chart configuration builders
//!
//! Every builder is a pure function from payload data to a declarative
//! configuration value; the report template's glue script hands those to the
//! charting libraries. Nothing here touches the DOM or holds page state.
//!
//! - [`encoding`]: the overloaded numeric cell axis
//! - [`heatmap`]: repetition heatmap series + options
//! - [`tooltip`]: cell value → tooltip HTML
//! - [`posttest`]: posttest-probability bar/line combo
//! - [`distribution`]: score cumulative-distribution scatter

pub mod distribution;
pub mod encoding;
pub mod heatmap;
pub mod posttest;
pub mod tooltip;

use crate::model::VizPayload;
use crate::normalize::LabelIndex;
use encoding::ValueEncoding;
use serde::Serialize;
use serde_json::Value;

/// Three-decimal display rounding used by the sibling chart tooltips.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// All chart configurations derived from one payload, in panel order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartBundle {
    pub heatmaps: Vec<Value>,
    pub posttests: Vec<Value>,
    pub distributions: Vec<Value>,
}

impl ChartBundle {
    pub fn chart_count(&self) -> usize {
        self.heatmaps.len() + self.posttests.len() + self.distributions.len()
    }
}

/// Builds every chart in the payload. Heatmap panels whose disease count or
/// repetition limit would break the value-band layout are skipped, matching
/// the omit-on-bad-data posture of the rest of the pipeline.
pub fn build_all(payload: &VizPayload) -> ChartBundle {
    let diseases = LabelIndex::new(&payload.diseases);
    let terms = LabelIndex::new(&payload.terms);
    let actions = LabelIndex::new(&payload.actions);
    let encoding = ValueEncoding::new(payload.n_diseases(), payload.n_repetitions);

    let heatmaps = match encoding {
        Some(encoding) => payload
            .heatmaps
            .iter()
            .enumerate()
            .map(|(i, panel)| heatmap::chart_config(panel, &diseases, &terms, &encoding, i))
            .collect(),
        None => Vec::new(),
    };

    let posttests = payload
        .posttests
        .iter()
        .enumerate()
        .map(|(i, panel)| posttest::chart_config(panel, &actions, i))
        .collect();

    let distributions = payload
        .distributions
        .iter()
        .enumerate()
        .map(|(i, panel)| distribution::chart_config(panel, &actions, i))
        .collect();

    ChartBundle {
        heatmaps,
        posttests,
        distributions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VizPayload;

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.7234), 0.723);
        assert_eq!(round3(0.5), 0.5);
        assert_eq!(round3(-0.18999999999999995), -0.19);
    }

    #[test]
    fn test_build_all_indexes_panels() {
        let payload = VizPayload::from_str(
            r#"{
            "diseases": {"OMIM:1": "Alpha syndrome"},
            "terms": {"HP:1": "Seizure"},
            "n_repetitions": 3,
            "heatmaps": [
                {"action_id": "MAXO:1", "rank_changes": {}, "repetition_counts": {"OMIM:1": {"HP:1": 1}}},
                {"action_id": "MAXO:2", "rank_changes": {}, "repetition_counts": {"OMIM:1": {"HP:1": 2}}}
            ],
            "posttests": [
                {"action_id": "MAXO:1", "posttest_probabilities": {"OMIM:1": 0.7}}
            ]
        }"#,
        )
        .unwrap();

        let bundle = build_all(&payload);
        assert_eq!(bundle.chart_count(), 3);
        assert_eq!(bundle.heatmaps[0]["chart"]["mountId"], "repetitionHeatmap_0");
        assert_eq!(bundle.heatmaps[1]["chart"]["mountId"], "repetitionHeatmap_1");
        assert_eq!(bundle.posttests[0]["mountId"], "posttestChart_0");
    }

    #[test]
    fn test_build_all_skips_heatmaps_outside_band_envelope() {
        // 200 repetitions would collide with the annotation sentinel.
        let payload = VizPayload::from_str(
            r#"{
            "diseases": {"OMIM:1": "Alpha syndrome"},
            "terms": {"HP:1": "Seizure"},
            "n_repetitions": 200,
            "heatmaps": [
                {"action_id": "MAXO:1", "rank_changes": {}, "repetition_counts": {"OMIM:1": {"HP:1": 1}}}
            ]
        }"#,
        )
        .unwrap();

        let bundle = build_all(&payload);
        assert!(bundle.heatmaps.is_empty());
    }
}
