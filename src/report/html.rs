//! HTML report with ApexCharts/Chart.js visualizations
//!
//! The page is self-contained: chart configurations are embedded as one JSON
//! blob and a small glue script turns them into live charts. Everything
//! interactive (tooltip HTML, term links, label colors) was resolved at
//! generation time, so the in-page callbacks are plain lookups.

use crate::chart::{self, ChartBundle};
use crate::model::VizPayload;
use crate::report::Summary;
use serde_json::json;
use std::fmt::Write as _;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, payload: &VizPayload) -> io::Result<()> {
    let summary = Summary::from_payload(payload);
    let bundle = chart::build_all(payload);
    let json_data = serde_json::to_string(&json!({
        "summary": summary,
        "charts": bundle,
    }))?;
    let sections = chart_sections(payload, &bundle);
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

    write!(writer, r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Phenoviz Refinement Report</title>
    <script src="https://cdn.jsdelivr.net/npm/apexcharts"></script>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <style>
        :root {{
            --bg: #0d1117;
            --card: #161b22;
            --border: #30363d;
            --text: #e6edf3;
            --dim: #7d8590;
            --improved: #3fb950;
            --declined: #f85149;
            --accent: #58a6ff;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }}
        .container {{ max-width: 1600px; margin: 0 auto; padding: 2rem; }}

        /* Header */
        .header {{
            display: flex;
            align-items: center;
            gap: 1rem;
            margin-bottom: 2rem;
            padding-bottom: 1rem;
            border-bottom: 1px solid var(--border);
        }}
        .logo {{
            font-size: 2.5rem;
            font-weight: 800;
            background: linear-gradient(135deg, var(--accent), #a371f7);
            -webkit-background-clip: text;
            -webkit-text-fill-color: transparent;
        }}
        .subtitle {{ color: var(--dim); font-size: 1rem; }}

        /* Stats Row */
        .stats {{
            display: grid;
            grid-template-columns: repeat(5, 1fr);
            gap: 1rem;
            margin-bottom: 2rem;
        }}
        .stat {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.5rem;
            text-align: center;
        }}
        .stat-value {{ font-size: 3rem; font-weight: 700; line-height: 1; }}
        .stat-label {{ color: var(--dim); font-size: 0.875rem; text-transform: uppercase; letter-spacing: 0.05em; margin-top: 0.5rem; }}
        .stat.improved .stat-value {{ color: var(--improved); }}
        .stat.declined .stat-value {{ color: var(--declined); }}

        /* Chart cards */
        .chart-card {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.5rem;
            margin-bottom: 1.5rem;
        }}
        .chart-title {{
            font-size: 1rem;
            font-weight: 600;
            margin-bottom: 1rem;
            color: var(--dim);
        }}
        .chart-canvas {{ position: relative; height: 340px; }}
        .apexcharts-canvas {{ background: #ffffff; border-radius: 8px; }}

        /* Footer */
        .footer {{
            margin-top: 2rem;
            padding-top: 1rem;
            border-top: 1px solid var(--border);
            color: var(--dim);
            font-size: 0.875rem;
            text-align: center;
        }}
        .footer a {{ color: var(--accent); text-decoration: none; }}
        .footer a:hover {{ text-decoration: underline; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <div>
                <div class="logo">Phenoviz</div>
                <div class="subtitle">Diagnostic Score Refinement Report</div>
            </div>
        </div>

        <div class="stats">
            <div class="stat">
                <div class="stat-value">{diseases}</div>
                <div class="stat-label">Diseases</div>
            </div>
            <div class="stat">
                <div class="stat-value">{terms}</div>
                <div class="stat-label">HPO Terms</div>
            </div>
            <div class="stat">
                <div class="stat-value">{charts}</div>
                <div class="stat-label">Charts</div>
            </div>
            <div class="stat improved">
                <div class="stat-value">{improved}</div>
                <div class="stat-label">Rank Improved</div>
            </div>
            <div class="stat declined">
                <div class="stat-value">{declined}</div>
                <div class="stat-label">Rank Declined</div>
            </div>
        </div>

{sections}
        <div class="footer">
            Generated {generated} by <a href="https://github.com/notactuallytreyanastasio/phenoviz" target="_blank">Phenoviz</a>
        </div>
    </div>

    <script>
    const data = {json_data};

    function truncate(str, n) {{
        return str.length > n ? str.substr(0, n - 1) + '...' : str;
    }}

    // Heatmaps (ApexCharts). The config is declarative: maxChars become
    // formatter closures, termLinks backs the label click handler and
    // tooltips the custom tooltip callback.
    function renderHeatmap(cfg) {{
        const el = document.getElementById(cfg.chart.mountId);
        if (!el) return;
        const options = {{
            series: cfg.series,
            chart: {{
                height: cfg.chart.height,
                type: cfg.chart.type,
                events: {{
                    xAxisLabelClick: function(event, chartContext, opts) {{
                        const label = opts.globals.labels[opts.labelIndex];
                        const url = cfg.termLinks[label];
                        if (url) {{
                            window.open(url);
                        }}
                    }}
                }}
            }},
            dataLabels: cfg.dataLabels,
            colors: cfg.colors,
            grid: cfg.grid,
            title: cfg.title,
            xaxis: {{
                labels: {{
                    formatter: function(str) {{ return truncate(String(str), cfg.xaxis.labels.maxChars); }},
                    style: {{ colors: cfg.xaxis.labels.style.colors }}
                }}
            }},
            yaxis: {{
                labels: {{
                    formatter: function(str) {{ return truncate(String(str), cfg.yaxis.labels.maxChars); }}
                }}
            }},
            plotOptions: cfg.plotOptions,
            tooltip: {{
                custom: function(ctx) {{
                    return cfg.tooltips[ctx.seriesIndex][ctx.dataPointIndex];
                }}
            }}
        }};
        new ApexCharts(el, options).render();
    }}

    // Chart.js canvas plugins: boxed legend border, extra legend margin,
    // and edge-to-edge extension of the baseline in the combo chart.
    const legendSpace = 10;

    const legendBorder = {{
        id: 'legendBorder',
        beforeDatasetsDraw(chart) {{
            const ctx = chart.ctx;
            const legend = chart.legend;
            if (!legend || !legend.lineWidths) return;
            const widthCenter = legend.width / 2;
            legend.lineWidths.forEach(function(itemWidth) {{
                ctx.save();
                ctx.strokeStyle = 'black';
                ctx.lineWidth = 1;
                ctx.beginPath();
                ctx.moveTo(widthCenter - (itemWidth / 2), legend.top - 5);
                ctx.lineTo(widthCenter + (itemWidth / 2), legend.top - 5);
                ctx.lineTo(widthCenter + (itemWidth / 2), legend.bottom - 5 - legendSpace);
                ctx.lineTo(widthCenter - (itemWidth / 2), legend.bottom - 5 - legendSpace);
                ctx.closePath();
                ctx.stroke();
            }});
        }}
    }};

    const legendMargin = {{
        id: 'legendMargin',
        beforeInit(chart) {{
            const fitValue = chart.legend.fit;
            chart.legend.fit = function fit() {{
                fitValue.bind(chart.legend)();
                return this.height += legendSpace;
            }};
        }}
    }};

    const extendLine = {{
        id: 'extendLine',
        afterDatasetsDraw(chart) {{
            const ctx = chart.ctx;
            chart.data.datasets.forEach(function(dataset, index) {{
                if (dataset.type !== 'line') return;
                const meta = chart.getDatasetMeta(index);
                const points = meta.dataset._points || [];
                if (points.length === 0) return;
                const xaxis = chart.scales.x;
                const firstPt = points[0];
                const lastPt = points[points.length - 1];
                ctx.save();
                ctx.strokeStyle = dataset.borderColor;
                ctx.lineWidth = dataset.borderWidth;
                ctx.beginPath();
                ctx.moveTo(xaxis.left, firstPt.y);
                ctx.lineTo(firstPt.x, firstPt.y);
                ctx.stroke();
                ctx.beginPath();
                ctx.moveTo(lastPt.x, lastPt.y);
                ctx.lineTo(xaxis.right, lastPt.y);
                ctx.stroke();
            }});
        }}
    }};

    function tooltipLookup(cfg) {{
        return function(item) {{
            return cfg.tooltips[item.datasetIndex][item.dataIndex];
        }};
    }}

    function renderPosttest(cfg) {{
        const el = document.getElementById(cfg.mountId);
        if (!el) return;
        const options = cfg.options;
        options.plugins.tooltip = {{ callbacks: {{ label: tooltipLookup(cfg) }} }};
        new Chart(el, {{
            data: cfg.data,
            options: options,
            plugins: [extendLine, legendBorder, legendMargin]
        }});
    }}

    function renderDistribution(cfg) {{
        const el = document.getElementById(cfg.mountId);
        if (!el) return;
        const options = cfg.options;
        options.plugins.tooltip = {{
            callbacks: {{
                title: function() {{ return cfg.tooltipTitle; }},
                label: tooltipLookup(cfg)
            }}
        }};
        new Chart(el, {{
            type: cfg.type,
            data: cfg.data,
            options: options,
            plugins: [legendBorder, legendMargin]
        }});
    }}

    // Initialize
    data.charts.heatmaps.forEach(renderHeatmap);
    data.charts.posttests.forEach(renderPosttest);
    data.charts.distributions.forEach(renderDistribution);
    </script>
</body>
</html>
"#,
        diseases = summary.diseases,
        terms = summary.terms,
        charts = summary.chart_count(),
        improved = summary.improved,
        declined = summary.declined,
        sections = sections,
        generated = generated,
        json_data = json_data,
    )?;

    Ok(())
}

/// One card per chart, mount ids matching the embedded configurations.
/// Heatmaps mount into plain divs; the Chart.js charts need a canvas.
fn chart_sections(payload: &VizPayload, bundle: &ChartBundle) -> String {
    let mut sections = String::new();

    for (i, _) in bundle.heatmaps.iter().enumerate() {
        let action_id = payload
            .heatmaps
            .get(i)
            .map(|p| p.action_id.as_str())
            .unwrap_or("");
        let caption = match payload.actions.get(action_id) {
            Some(label) => format!("{}. {}: {}", i + 1, action_id, label),
            None if action_id.is_empty() => format!("{}.", i + 1),
            None => format!("{}. {}", i + 1, action_id),
        };
        let _ = writeln!(
            sections,
            "        <div class=\"chart-card\">\n            \
             <div class=\"chart-title\">{caption}</div>\n            \
             <div id=\"repetitionHeatmap_{i}\"></div>\n        </div>"
        );
    }

    for (i, _) in bundle.posttests.iter().enumerate() {
        let _ = writeln!(
            sections,
            "        <div class=\"chart-card\">\n            \
             <div class=\"chart-canvas\"><canvas id=\"posttestChart_{i}\"></canvas></div>\n        </div>"
        );
    }

    for (i, _) in bundle.distributions.iter().enumerate() {
        let _ = writeln!(
            sections,
            "        <div class=\"chart-card\">\n            \
             <div class=\"chart-canvas\"><canvas id=\"scoreDistribution_{i}\"></canvas></div>\n        </div>"
        );
    }

    sections
}
