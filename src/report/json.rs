//! JSON report: the chart configurations, machine-readable

use crate::chart::{self, ChartBundle};
use crate::model::VizPayload;
use crate::report::Summary;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct JsonReport {
    generated: String,
    summary: Summary,
    charts: ChartBundle,
}

pub fn write<W: Write>(writer: &mut W, payload: &VizPayload) -> io::Result<()> {
    let report = JsonReport {
        generated: chrono::Local::now().to_rfc3339(),
        summary: Summary::from_payload(payload),
        charts: chart::build_all(payload),
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writer.write_all(b"\n")
}
