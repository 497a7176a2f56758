//! Cell tooltip resolution
//!
//! Decodes a hovered cell's encoded value into its semantic band and
//! renders the underlying facts as tooltip HTML. Resolution happens at
//! report-generation time; the page script only looks the fragments up.

use crate::chart::encoding::{CellBand, ValueEncoding};
use crate::chart::heatmap::Point;
use crate::normalize::FrequencyIndex;
use std::fmt::Write;

pub struct TooltipContext<'a> {
    pub encoding: &'a ValueEncoding,
    pub frequencies: &'a FrequencyIndex,
    /// Only the excluded-count chart variant renders annotation markers.
    pub with_annotations: bool,
}

const SPACER: &str = "<div><p></p></div>";

/// Tooltip HTML for one cell, or `None` when the cell has no decodable
/// content (empty placeholder, out-of-band value, or an annotation sentinel
/// in the variant that does not show them).
pub fn resolve(ctx: &TooltipContext<'_>, series_name: &str, point: &Point) -> Option<String> {
    let value = point.y?;
    match ctx.encoding.decode(value)? {
        CellBand::RankImprovement(magnitude) => Some(rank_html(
            series_name,
            "Average Rank Improvement",
            magnitude,
        )),
        CellBand::RankDecline(magnitude) => {
            Some(rank_html(series_name, "Average Rank Decline", magnitude))
        }
        CellBand::Observed(count) => Some(count_html(ctx, &point.x, count, "gold")),
        CellBand::Excluded(count) => Some(count_html(ctx, &point.x, count, "lightskyblue")),
        CellBand::Annotation => {
            if !ctx.with_annotations {
                return None;
            }
            Some(annotation_html(ctx, series_name, &point.x))
        }
    }
}

fn rank_html(disease_label: &str, caption: &str, magnitude: f64) -> String {
    format!(
        "<div style=\"background-color: lightgray; color: blue\"><b>Disease Term</b>: {disease_label}</div>\
         {SPACER}\
         <div><b>{caption}</b>: {magnitude}</div>"
    )
}

fn count_html(ctx: &TooltipContext<'_>, term_label: &str, count: u32, band_color: &str) -> String {
    format!(
        "<div style=\"background-color: lightgray; color: red\"><b>HPO Term</b>: {term_label}</div>\
         {SPACER}{}\
         <div style=\"background-color: {band_color}\"><b>Repetition Count</b>: {count} of {}</div>",
        frequency_html(ctx, term_label),
        ctx.encoding.n_repetitions(),
    )
}

fn annotation_html(ctx: &TooltipContext<'_>, disease_label: &str, term_label: &str) -> String {
    format!(
        "<div style=\"background-color: lightgray; color: red\"><b>HPO Term</b>: {term_label}</div>\
         {SPACER}{}\
         <div style=\"background-color: plum\"><b>Disease Annotation</b>: recorded clinical feature of {disease_label}</div>",
        frequency_html(ctx, term_label),
    )
}

/// One line per distinct frequency value, diseases joined with "; ".
fn frequency_html(ctx: &TooltipContext<'_>, term_label: &str) -> String {
    let mut html = String::new();
    for group in ctx.frequencies.groups_for(term_label) {
        let diseases = group.diseases.join("; ");
        let _ = write!(
            html,
            "<div><b>Frequency of <span style=\"color: red\">{term_label}</span> \
             in <span style=\"color: blue\">{diseases}</span></b>: {}</div>{SPACER}",
            group.frequency,
        );
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VizPayload;
    use crate::normalize::LabelIndex;

    fn payload() -> VizPayload {
        VizPayload::from_str(
            r#"{
            "diseases": {"OMIM:1": "Alpha syndrome", "OMIM:2": "Beta syndrome"},
            "terms": {"HP:1": "Seizure"},
            "n_repetitions": 3,
            "heatmaps": [{
                "action_id": "MAXO:1",
                "rank_changes": {"OMIM:1": -2.0, "OMIM:2": 1.0},
                "repetition_counts": {
                    "OMIM:1": {"HP:1": 2},
                    "OMIM:2": {"HP:1": 1}
                },
                "frequencies": [
                    {"disease_id": "OMIM:1", "term_id": "HP:1", "frequency": 0.5},
                    {"disease_id": "OMIM:2", "term_id": "HP:1", "frequency": 0.5}
                ]
            }]
        }"#,
        )
        .unwrap()
    }

    fn point(x: &str, y: Option<f64>) -> Point {
        Point {
            x: x.to_string(),
            y,
        }
    }

    #[test]
    fn test_rank_improvement_tooltip() {
        let encoding = ValueEncoding::new(2, 3).unwrap();
        let frequencies = FrequencyIndex::default();
        let ctx = TooltipContext {
            encoding: &encoding,
            frequencies: &frequencies,
            with_annotations: true,
        };

        let html = resolve(&ctx, "Alpha syndrome", &point("Average Rank Change", Some(-1.0)))
            .unwrap();
        assert!(html.contains("<b>Disease Term</b>: Alpha syndrome"));
        assert!(html.contains("<b>Average Rank Improvement</b>: 1"));
    }

    #[test]
    fn test_rank_decline_tooltip() {
        let encoding = ValueEncoding::new(5, 3).unwrap();
        let frequencies = FrequencyIndex::default();
        let ctx = TooltipContext {
            encoding: &encoding,
            frequencies: &frequencies,
            with_annotations: false,
        };

        let html =
            resolve(&ctx, "Beta syndrome", &point("Average Rank Change", Some(3.0))).unwrap();
        assert!(html.contains("<b>Average Rank Decline</b>: 3"));
    }

    #[test]
    fn test_observed_count_tooltip_groups_shared_frequency() {
        let payload = payload();
        let encoding = ValueEncoding::new(payload.n_diseases(), payload.n_repetitions).unwrap();
        let panel = &payload.heatmaps[0];
        let frequencies = FrequencyIndex::build(
            &LabelIndex::new(&payload.terms),
            &LabelIndex::new(&payload.diseases),
            &panel.repetition_counts,
            &panel.frequencies,
        );
        let ctx = TooltipContext {
            encoding: &encoding,
            frequencies: &frequencies,
            with_annotations: false,
        };

        let html = resolve(&ctx, "N Repetitions", &point("Seizure", Some(200.0))).unwrap();
        assert!(html.contains("<b>Repetition Count</b>: 2 of 3"));
        assert!(html.contains("background-color: gold"));

        // Both diseases share frequency 0.5: one joined line, not two.
        assert!(html.contains("Alpha syndrome; Beta syndrome"));
        assert_eq!(html.matches("Frequency of").count(), 1);
    }

    #[test]
    fn test_excluded_count_tooltip() {
        let encoding = ValueEncoding::new(5, 3).unwrap();
        let frequencies = FrequencyIndex::default();
        let ctx = TooltipContext {
            encoding: &encoding,
            frequencies: &frequencies,
            with_annotations: true,
        };

        let html = resolve(&ctx, "N Repetitions", &point("Seizure", Some(-300.0))).unwrap();
        assert!(html.contains("<b>Repetition Count</b>: 3 of 3"));
        assert!(html.contains("background-color: lightskyblue"));
    }

    #[test]
    fn test_annotation_marker_only_in_excluded_variant() {
        let encoding = ValueEncoding::new(5, 3).unwrap();
        let frequencies = FrequencyIndex::default();
        let sentinel = point("Seizure", Some(10000.0));

        let with = TooltipContext {
            encoding: &encoding,
            frequencies: &frequencies,
            with_annotations: true,
        };
        let html = resolve(&with, "Alpha syndrome", &sentinel).unwrap();
        assert!(html.contains("<b>Disease Annotation</b>"));
        assert!(html.contains("Alpha syndrome"));

        let without = TooltipContext {
            encoding: &encoding,
            frequencies: &frequencies,
            with_annotations: false,
        };
        assert_eq!(resolve(&without, "Alpha syndrome", &sentinel), None);
    }

    #[test]
    fn test_empty_and_out_of_band_cells_have_no_tooltip() {
        let encoding = ValueEncoding::new(5, 3).unwrap();
        let frequencies = FrequencyIndex::default();
        let ctx = TooltipContext {
            encoding: &encoding,
            frequencies: &frequencies,
            with_annotations: true,
        };

        assert_eq!(resolve(&ctx, "Alpha syndrome", &point("Seizure", None)), None);
        assert_eq!(
            resolve(&ctx, "Alpha syndrome", &point("Seizure", Some(0.0))),
            None
        );
        assert_eq!(
            resolve(&ctx, "Alpha syndrome", &point("Seizure", Some(50.0))),
            None
        );
    }
}
