//! Repetition heatmap: series construction and chart options
//!
//! One row per disease plus a reference row fixing the column order. Cell
//! values ride the overloaded axis from [`crate::chart::encoding`]: the
//! rank-change column holds the raw signed shift, the reference row holds
//! scaled repetition counts, and disease cells hold either nothing or the
//! annotation sentinel.

use crate::chart::encoding::ValueEncoding;
use crate::chart::tooltip::{self, TooltipContext};
use crate::model::HeatmapPanel;
use crate::normalize::{non_null_frequencies, FrequencyIndex, LabelIndex};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};

/// Fixed first column of every row.
pub const RANK_CHANGE_LABEL: &str = "Average Rank Change";

/// Name of the reference series that pins the x-axis column order.
pub const REFERENCE_SERIES_NAME: &str = "N Repetitions";

/// Term labels link out to the ontology browser.
pub const TERM_BROWSER_URL: &str = "https://hpo.jax.org/browse/term/";

/// Maximum x-axis label length before ellipsis truncation.
pub const X_LABEL_MAX_CHARS: usize = 25;

/// Maximum y-axis label length before ellipsis truncation.
pub const Y_LABEL_MAX_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: String,
    pub y: Option<f64>,
}

impl Point {
    fn new(x: impl Into<String>, y: Option<f64>) -> Self {
        Self { x: x.into(), y }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<Point>,
}

/// Output of the series builder: the reference series first, then one row
/// per disease, plus the x-axis label color list.
#[derive(Debug, Clone)]
pub struct HeatmapSeries {
    pub series: Vec<Series>,
    pub label_colors: Vec<String>,
}

impl HeatmapSeries {
    pub fn reference(&self) -> &Series {
        &self.series[0]
    }

    pub fn disease_rows(&self) -> &[Series] {
        &self.series[1..]
    }
}

/// Builds the heatmap rows for one panel.
///
/// Observed counts populate the reference series (deduplicated by
/// label+value pair); disease rows carry the rank-change scalar, null
/// placeholders, and the annotation sentinel where a non-null frequency
/// record matches the cell. Excluded counts, when present, contribute
/// sign-flipped reference columns only. Rows are finally reordered to the
/// reference column order; points missing from a row are dropped.
pub fn build_series(
    panel: &HeatmapPanel,
    diseases: &LabelIndex,
    terms: &LabelIndex,
    encoding: &ValueEncoding,
) -> HeatmapSeries {
    let annotated: HashSet<(&str, &str)> = non_null_frequencies(&panel.frequencies)
        .iter()
        .map(|r| (r.disease_id.as_str(), r.term_id.as_str()))
        .collect();

    let mut reference = vec![Point::new(RANK_CHANGE_LABEL, None)];
    let mut raw_rows: Vec<Series> = Vec::with_capacity(panel.repetition_counts.len());

    for (disease_id, term_counts) in &panel.repetition_counts {
        let mut row = vec![Point::new(
            RANK_CHANGE_LABEL,
            panel.rank_changes.get(disease_id).copied(),
        )];
        for (term_id, &count) in term_counts {
            let term_label = terms.label_or_id(term_id);
            if count == 0 {
                row.push(Point::new(term_label, None));
                continue;
            }
            let cell = if annotated.contains(&(disease_id.as_str(), term_id.as_str())) {
                Some(encoding.annotation_sentinel())
            } else {
                None
            };
            row.push(Point::new(term_label, cell));
            push_reference_column(&mut reference, term_label, encoding.encode_observed(count));
        }
        raw_rows.push(Series {
            name: diseases.label_or_id(disease_id).to_string(),
            data: row,
        });
    }

    for term_counts in panel.excluded_counts.values() {
        for (term_id, &count) in term_counts {
            if count == 0 {
                continue;
            }
            let term_label = terms.label_or_id(term_id);
            push_reference_column(&mut reference, term_label, encoding.encode_excluded(count));
        }
    }

    // Reorder only once the axis is complete; a row reordered against a
    // half-built reference would shed placeholders for columns that later
    // diseases (or the excluded map) still add.
    let rows = raw_rows
        .into_iter()
        .map(|s| Series {
            data: reorder_to_reference(&s.data, &reference),
            name: s.name,
        })
        .collect::<Vec<_>>();

    let label_colors = std::iter::once("black".to_string())
        .chain(std::iter::repeat("blue".to_string()).take(reference.len().saturating_sub(1)))
        .collect();

    let mut series = Vec::with_capacity(rows.len() + 1);
    series.push(Series {
        name: REFERENCE_SERIES_NAME.to_string(),
        data: reference,
    });
    series.extend(rows);

    HeatmapSeries {
        series,
        label_colors,
    }
}

fn push_reference_column(reference: &mut Vec<Point>, label: &str, value: f64) {
    let exists = reference
        .iter()
        .any(|p| p.x == label && p.y == Some(value));
    if !exists {
        reference.push(Point::new(label, Some(value)));
    }
}

/// Reorders `row` to the reference column order, looking points up by label.
/// A label appearing twice in the reference emits the row's point twice;
/// labels absent from the row are dropped, not null-filled.
fn reorder_to_reference(row: &[Point], reference: &[Point]) -> Vec<Point> {
    let mut by_label: HashMap<&str, &Point> = HashMap::with_capacity(row.len());
    for point in row {
        by_label.insert(point.x.as_str(), point);
    }
    reference
        .iter()
        .filter_map(|r| by_label.get(r.x.as_str()).map(|p| (*p).clone()))
        .collect()
}

/// Label → browser URL for every term label except the fixed rank-change
/// column. Built once from the reverse lookup; the in-page click handler is
/// a plain map access, and an unknown label simply has no entry.
pub fn term_link_map(terms: &LabelIndex) -> Map<String, Value> {
    let mut links = Map::new();
    for (id, label) in terms.iter() {
        if label == RANK_CHANGE_LABEL || links.contains_key(label) {
            continue;
        }
        links.insert(
            label.to_string(),
            Value::String(format!("{}{}", TERM_BROWSER_URL, id)),
        );
    }
    links
}

/// Assembles the full declarative chart configuration for one panel.
///
/// The glue script in the report template turns this into the charting
/// library's options object: `maxChars` become label formatter closures,
/// `termLinks` backs the x-axis label click handler and `tooltips` the
/// custom tooltip callback.
pub fn chart_config(
    panel: &HeatmapPanel,
    diseases: &LabelIndex,
    terms: &LabelIndex,
    encoding: &ValueEncoding,
    index: usize,
) -> Value {
    let built = build_series(panel, diseases, terms, encoding);
    let frequencies = FrequencyIndex::build(terms, diseases, &panel.repetition_counts, &panel.frequencies);
    let ctx = TooltipContext {
        encoding,
        frequencies: &frequencies,
        with_annotations: panel.has_excluded(),
    };

    let tooltips: Vec<Vec<Value>> = built
        .series
        .iter()
        .map(|series| {
            series
                .data
                .iter()
                .map(|point| match tooltip::resolve(&ctx, &series.name, point) {
                    Some(html) => Value::String(html),
                    None => Value::Null,
                })
                .collect()
        })
        .collect();

    json!({
        "series": built.series,
        "chart": {
            "height": 600,
            "type": "heatmap",
            "mountId": format!("repetitionHeatmap_{index}"),
        },
        "dataLabels": { "enabled": false },
        "colors": ["#ffffff"],
        "grid": { "yaxis": { "lines": { "show": false } } },
        "title": { "text": "HPO Term Repetition Counts" },
        "xaxis": {
            "labels": {
                "maxChars": X_LABEL_MAX_CHARS,
                "style": { "colors": built.label_colors },
            },
        },
        "yaxis": {
            "labels": { "maxChars": Y_LABEL_MAX_CHARS },
        },
        "plotOptions": {
            "heatmap": {
                "reverseNegativeShade": true,
                "colorScale": { "ranges": color_scale_ranges(encoding, panel.has_excluded()) },
            },
        },
        "termLinks": term_link_map(terms),
        "tooltips": tooltips,
    })
}

/// The color bands mirror the value bands one for one.
fn color_scale_ranges(encoding: &ValueEncoding, with_excluded: bool) -> Vec<Value> {
    let mut ranges = vec![
        json!({
            "from": encoding.min_rank_change(),
            "to": -1.0,
            "color": "#00A100",
            "name": "Rank Improvement",
        }),
        json!({
            "from": 1.0,
            "to": encoding.max_rank_change(),
            "color": "#FF0000",
            "name": "Rank Decline",
        }),
    ];
    if with_excluded {
        ranges.push(json!({
            "from": encoding.min_excluded(),
            "to": -crate::chart::encoding::REP_COUNT_MULTIPLIER,
            "color": "#87CEFA",
            "name": "Repetition Counts (Excluded)",
        }));
    }
    let observed_name = if with_excluded {
        "Repetition Counts (Observed)"
    } else {
        "Repetition Counts"
    };
    ranges.push(json!({
        "from": crate::chart::encoding::REP_COUNT_MULTIPLIER,
        "to": encoding.max_observed(),
        "color": "#FFB200",
        "name": observed_name,
    }));
    if with_excluded {
        ranges.push(json!({
            "from": encoding.annotation_sentinel(),
            "to": encoding.annotation_sentinel(),
            "color": "#800080",
            "name": "Disease Annotation",
        }));
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VizPayload;

    fn payload() -> VizPayload {
        VizPayload::from_str(
            r#"{
            "diseases": {
                "OMIM:1": "Alpha syndrome",
                "OMIM:2": "Beta syndrome",
                "OMIM:3": "Gamma syndrome"
            },
            "terms": {"HP:1": "Seizure", "HP:2": "Microcephaly", "HP:3": "Short stature"},
            "n_repetitions": 3,
            "heatmaps": [{
                "action_id": "MAXO:1",
                "rank_changes": {"OMIM:1": -2.0, "OMIM:2": 1.0, "OMIM:3": 0.0},
                "repetition_counts": {
                    "OMIM:1": {"HP:1": 2, "HP:2": 1, "HP:3": 0},
                    "OMIM:2": {"HP:1": 1, "HP:2": 3, "HP:3": 0},
                    "OMIM:3": {"HP:1": 2, "HP:2": 0, "HP:3": 1}
                },
                "frequencies": [
                    {"disease_id": "OMIM:1", "term_id": "HP:1", "frequency": 0.5}
                ]
            }]
        }"#,
        )
        .unwrap()
    }

    fn build(payload: &VizPayload) -> HeatmapSeries {
        let encoding = ValueEncoding::new(payload.n_diseases(), payload.n_repetitions).unwrap();
        build_series(
            &payload.heatmaps[0],
            &LabelIndex::new(&payload.diseases),
            &LabelIndex::new(&payload.terms),
            &encoding,
        )
    }

    #[test]
    fn test_reference_series_comes_first() {
        let built = build(&payload());
        assert_eq!(built.series[0].name, REFERENCE_SERIES_NAME);
        assert_eq!(built.disease_rows().len(), 3);
    }

    #[test]
    fn test_reference_accumulates_deduplicated_columns() {
        let built = build(&payload());
        let reference = built.reference();

        // Rank-change column plus: Seizure@200, Microcephaly@100,
        // Seizure@100, Microcephaly@300, Short stature@100.
        // OMIM:3's Seizure@200 duplicates OMIM:1's and is dropped.
        assert_eq!(reference.data.len(), 6);
        assert_eq!(reference.data[0], Point::new(RANK_CHANGE_LABEL, None));
        assert_eq!(reference.data[1], Point::new("Seizure", Some(200.0)));
        assert_eq!(reference.data[2], Point::new("Microcephaly", Some(100.0)));
        assert_eq!(reference.data[3], Point::new("Seizure", Some(100.0)));
        assert_eq!(reference.data[4], Point::new("Microcephaly", Some(300.0)));
        assert_eq!(reference.data[5], Point::new("Short stature", Some(100.0)));
    }

    #[test]
    fn test_post_reorder_column_parity() {
        // Every row must line up with the reference axis: same point count,
        // same label sequence.
        let built = build(&payload());
        let reference_labels: Vec<&str> =
            built.reference().data.iter().map(|p| p.x.as_str()).collect();

        for row in built.disease_rows() {
            let labels: Vec<&str> = row.data.iter().map(|p| p.x.as_str()).collect();
            assert_eq!(labels, reference_labels, "row {} misaligned", row.name);
        }
    }

    #[test]
    fn test_rank_change_leads_every_row() {
        let built = build(&payload());
        assert_eq!(built.disease_rows()[0].data[0].y, Some(-2.0));
        assert_eq!(built.disease_rows()[1].data[0].y, Some(1.0));
        assert_eq!(built.disease_rows()[2].data[0].y, Some(0.0));
    }

    #[test]
    fn test_annotation_sentinel_replaces_placeholder() {
        let built = build(&payload());
        let alpha = &built.disease_rows()[0];

        // OMIM:1 × HP:1 has a non-null frequency record, so both Seizure
        // columns show the sentinel; everything else stays a placeholder.
        let seizure_cells: Vec<Option<f64>> = alpha
            .data
            .iter()
            .filter(|p| p.x == "Seizure")
            .map(|p| p.y)
            .collect();
        assert_eq!(seizure_cells, [Some(10000.0), Some(10000.0)]);
        assert!(alpha
            .data
            .iter()
            .filter(|p| p.x != "Seizure" && p.x != RANK_CHANGE_LABEL)
            .all(|p| p.y.is_none()));
    }

    #[test]
    fn test_zero_counts_do_not_become_columns() {
        let built = build(&payload());
        // HP:3 is zero for OMIM:1 and OMIM:2; only OMIM:3's count of 1
        // creates the column.
        let short_stature: Vec<&Point> = built
            .reference()
            .data
            .iter()
            .filter(|p| p.x == "Short stature")
            .collect();
        assert_eq!(short_stature.len(), 1);
        assert_eq!(short_stature[0].y, Some(100.0));
    }

    #[test]
    fn test_label_colors_cover_reference_columns() {
        let built = build(&payload());
        assert_eq!(built.label_colors.len(), built.reference().data.len());
        assert_eq!(built.label_colors[0], "black");
        assert!(built.label_colors[1..].iter().all(|c| c == "blue"));
    }

    #[test]
    fn test_excluded_counts_add_columns_not_rows() {
        let mut payload = payload();
        payload.heatmaps[0].excluded_counts = serde_json::from_str(
            r#"{"OMIM:2": {"HP:3": 2}}"#,
        )
        .unwrap();
        let built = build(&payload);

        // Still three disease rows; the excluded entry only widens the axis.
        assert_eq!(built.disease_rows().len(), 3);
        let excluded: Vec<&Point> = built
            .reference()
            .data
            .iter()
            .filter(|p| p.y == Some(-200.0))
            .collect();
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].x, "Short stature");

        // Parity holds across the widened axis too.
        for row in built.disease_rows() {
            assert_eq!(row.data.len(), built.reference().data.len());
        }
    }

    #[test]
    fn test_term_link_map_skips_rank_change_column() {
        let mut catalog = crate::model::CatalogMap::new();
        catalog.insert("HP:1".to_string(), "Seizure".to_string());
        catalog.insert("HP:2".to_string(), RANK_CHANGE_LABEL.to_string());
        let links = term_link_map(&LabelIndex::new(&catalog));

        assert_eq!(links.len(), 1);
        assert_eq!(
            links["Seizure"],
            Value::String("https://hpo.jax.org/browse/term/HP:1".to_string())
        );
        assert!(!links.contains_key(RANK_CHANGE_LABEL));
    }

    #[test]
    fn test_duplicate_labels_link_once() {
        let mut catalog = crate::model::CatalogMap::new();
        catalog.insert("HP:1".to_string(), "Seizure".to_string());
        catalog.insert("HP:9".to_string(), "Seizure".to_string());
        let links = term_link_map(&LabelIndex::new(&catalog));

        assert_eq!(links.len(), 1);
        assert_eq!(
            links["Seizure"],
            Value::String("https://hpo.jax.org/browse/term/HP:1".to_string())
        );
    }

    #[test]
    fn test_chart_config_shape() {
        let payload = payload();
        let encoding = ValueEncoding::new(payload.n_diseases(), payload.n_repetitions).unwrap();
        let config = chart_config(
            &payload.heatmaps[0],
            &LabelIndex::new(&payload.diseases),
            &LabelIndex::new(&payload.terms),
            &encoding,
            2,
        );

        assert_eq!(config["chart"]["mountId"], "repetitionHeatmap_2");
        assert_eq!(config["chart"]["type"], "heatmap");
        assert_eq!(config["xaxis"]["labels"]["maxChars"], 25);
        assert_eq!(config["yaxis"]["labels"]["maxChars"], 30);

        // No excluded counts: three color bands, observed band unqualified.
        let ranges = config["plotOptions"]["heatmap"]["colorScale"]["ranges"]
            .as_array()
            .unwrap();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[2]["name"], "Repetition Counts");

        // One tooltip slot per cell.
        let tooltips = config["tooltips"].as_array().unwrap();
        let series = config["series"].as_array().unwrap();
        assert_eq!(tooltips.len(), series.len());
        for (t, s) in tooltips.iter().zip(series) {
            assert_eq!(
                t.as_array().unwrap().len(),
                s["data"].as_array().unwrap().len()
            );
        }
    }

    #[test]
    fn test_chart_config_five_bands_with_excluded() {
        let mut payload = payload();
        payload.heatmaps[0].excluded_counts =
            serde_json::from_str(r#"{"OMIM:2": {"HP:3": 2}}"#).unwrap();
        let encoding = ValueEncoding::new(payload.n_diseases(), payload.n_repetitions).unwrap();
        let config = chart_config(
            &payload.heatmaps[0],
            &LabelIndex::new(&payload.diseases),
            &LabelIndex::new(&payload.terms),
            &encoding,
            0,
        );

        let ranges = config["plotOptions"]["heatmap"]["colorScale"]["ranges"]
            .as_array()
            .unwrap();
        assert_eq!(ranges.len(), 5);
        assert_eq!(ranges[2]["name"], "Repetition Counts (Excluded)");
        assert_eq!(ranges[3]["name"], "Repetition Counts (Observed)");
        assert_eq!(ranges[4]["name"], "Disease Annotation");
        assert_eq!(ranges[4]["from"], ranges[4]["to"]);
    }
}
