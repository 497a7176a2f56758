//! Score cumulative-distribution scatter
//!
//! One dataset per curve of (score, cumulative probability) sample points.
//! Legend decoration (the boxed border) is drawn by the canvas plugins in
//! the report template.

use crate::chart::round3;
use crate::model::DistributionPanel;
use crate::normalize::LabelIndex;
use serde_json::{json, Value};

pub fn chart_config(panel: &DistributionPanel, actions: &LabelIndex, index: usize) -> Value {
    let datasets: Vec<Value> = panel
        .series
        .iter()
        .map(|series| {
            let data: Vec<Value> = series
                .records
                .iter()
                .map(|r| json!({ "x": r.score, "y": r.probability }))
                .collect();
            json!({ "label": series.label, "data": data })
        })
        .collect();

    let tooltips: Vec<Vec<String>> = panel
        .series
        .iter()
        .map(|series| {
            series
                .records
                .iter()
                .enumerate()
                .map(|(rank, r)| {
                    format!(
                        "{}: ({}, {})  {}. {}: {}",
                        series.label,
                        round3(r.score),
                        round3(r.probability),
                        rank + 1,
                        r.action_id,
                        actions.label_or_id(&r.action_id),
                    )
                })
                .collect()
        })
        .collect();

    json!({
        "type": "scatter",
        "mountId": format!("scoreDistribution_{index}"),
        "data": { "datasets": datasets },
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": {
                "legend": {
                    "position": "top",
                    "title": {
                        "display": true,
                        "text": panel.title,
                        "font": { "size": 10, "weight": "bold" },
                    },
                    "labels": {
                        "usePointStyle": true,
                        "boxHeight": 6,
                        "font": { "size": 10 },
                    },
                },
                "title": { "display": true, "text": "Score Cumulative Distribution" },
            },
            "scales": {
                "x": {
                    "type": "linear",
                    "position": "bottom",
                    "title": { "display": true, "text": "Term Score", "font": { "size": 12 } },
                },
                "y": {
                    "title": { "display": true, "text": "Cumulative Probability", "font": { "size": 12 } },
                },
            },
        },
        "tooltipTitle": panel.title,
        "tooltips": tooltips,
    })
}
