//! Plain-text rendering of report shapes for the terminal.

use std::fmt::{self, Write};

use epiwatch_triplets::{PipelineResult, Report};

pub fn render_report(result: &PipelineResult, report: &Report) -> Result<String, fmt::Error> {
    let mut out = String::new();
    match result {
        PipelineResult::NotRun => {
            out.push_str("Awaiting data to process.\n");
            return Ok(out);
        }
        PipelineResult::Empty => {
            out.push_str("No data: no record produced a clinical triplet.\n");
            return Ok(out);
        }
        PipelineResult::Ready { .. } => {}
    }

    writeln!(out, "Top clinical triplets ({} total)", report.total_triplets)?;
    writeln!(
        out,
        "{:<22} {:<22} {:<24} {:>6} {:>12}",
        "Symptom", "Disease", "Country", "Count", "ThreatIndex"
    )?;
    for row in &report.table {
        writeln!(
            out,
            "{:<22} {:<22} {:<24} {:>6} {:>12.3}",
            row.symptom, row.disease, row.country, row.count, row.threat_index
        )?;
    }

    out.push_str("\nTop triplets by count\n");
    let max = report.bars.iter().map(|b| b.count).max().unwrap_or(1).max(1);
    for bar in &report.bars {
        let width = ((bar.count * 40) / max).max(1) as usize;
        writeln!(out, "{:<50} {} {}", bar.label, "#".repeat(width), bar.count)?;
    }

    if !report.yearly.is_empty() {
        out.push_str("\nAnnual mentions\n");
        for y in &report.yearly {
            writeln!(out, "{}  {}", y.year, y.mentions)?;
        }
    }
    Ok(out)
}
