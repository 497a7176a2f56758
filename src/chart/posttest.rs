//! Posttest-probability bar/line combo
//!
//! One chart per recommendation: a flat line of pretest baselines overlaid
//! with floating bars from the baseline to each disease's posttest
//! probability. Bars going up render green, bars going down render red,
//! with the border skipped on the anchored edge.

use crate::chart::round3;
use crate::model::PosttestPanel;
use crate::normalize::LabelIndex;
use serde_json::{json, Value};

pub const INITIAL_SERIES_LABEL: &str = "Initial Posttest Probability";
pub const FINAL_SERIES_LABEL: &str = "Final Posttest Probability";

/// Declarative Chart.js configuration for one panel. The decorative legend
/// border and the line-extension drawing live as canvas plugins in the
/// report template; tooltip texts are precomputed here.
pub fn chart_config(panel: &PosttestPanel, actions: &LabelIndex, index: usize) -> Value {
    let initial = panel.initial_probability;
    let disease_ids: Vec<&str> = panel
        .posttest_probabilities
        .keys()
        .map(String::as_str)
        .collect();

    let line_data: Vec<f64> = disease_ids.iter().map(|_| initial).collect();

    let mut bar_data = Vec::with_capacity(disease_ids.len());
    let mut background_colors = Vec::with_capacity(disease_ids.len());
    let mut border_colors = Vec::with_capacity(disease_ids.len());
    let mut border_skipped = Vec::with_capacity(disease_ids.len());
    for &final_probability in panel.posttest_probabilities.values() {
        bar_data.push(json!([initial, final_probability]));
        if final_probability >= initial {
            background_colors.push("lightgreen");
            border_colors.push("green");
            border_skipped.push("bottom");
        } else {
            background_colors.push("pink");
            border_colors.push("red");
            border_skipped.push("top");
        }
    }

    let tooltips: Vec<Vec<String>> = vec![
        disease_ids
            .iter()
            .enumerate()
            .map(|(rank, &id)| tooltip_line(INITIAL_SERIES_LABEL, initial, 0.0, rank + 1, id))
            .collect(),
        disease_ids
            .iter()
            .zip(panel.posttest_probabilities.values())
            .enumerate()
            .map(|(rank, (&id, &p))| {
                tooltip_line(FINAL_SERIES_LABEL, p, p - initial, rank + 1, id)
            })
            .collect(),
    ];

    json!({
        "mountId": format!("posttestChart_{index}"),
        "data": {
            "labels": disease_ids,
            "datasets": [
                {
                    "type": "line",
                    "label": INITIAL_SERIES_LABEL,
                    "data": line_data,
                    "borderColor": "black",
                    "pointBackgroundColor": "darkgray",
                    "pointRadius": 0,
                    "showLine": true,
                    "borderWidth": 2,
                },
                {
                    "type": "bar",
                    "label": FINAL_SERIES_LABEL,
                    "data": bar_data,
                    "backgroundColor": background_colors,
                    "borderColor": border_colors,
                    "borderWidth": 2,
                    "borderSkipped": border_skipped,
                },
            ],
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": {
                "title": {
                    "display": true,
                    "text": format!(
                        "{}) {}: {}",
                        index + 1,
                        panel.action_id,
                        actions.label_or_id(&panel.action_id)
                    ),
                },
            },
            "scales": {
                "x": {
                    "position": "bottom",
                    "title": { "display": true, "text": "Disease ID", "font": { "size": 12 } },
                    "ticks": { "font": { "size": 10 } },
                },
                "y": {
                    "title": { "display": true, "text": "Posttest Probability", "font": { "size": 12 } },
                },
            },
        },
        "tooltips": tooltips,
    })
}

fn tooltip_line(label: &str, probability: f64, diff: f64, rank: usize, disease_id: &str) -> String {
    format!(
        "{label}: {} (\u{0394} = {}) {rank}. {disease_id}",
        round3(probability),
        round3(diff),
    )
}
