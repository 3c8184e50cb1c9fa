//! Dashboard handler: input forms plus every view of the latest result.

use axum::{extract::State, response::Html};
use epiwatch_triplets::{
    BarRow, Heatmap, PipelineResult, Report, SummaryRow, YearlyMentions, CSV_FILE_NAME,
};

use crate::state::{LatestRun, SharedState};

/// A one-line message shown above the results.
pub enum Banner {
    Info(String),
    Error(String),
}

pub async fn dashboard(State(state): State<SharedState>) -> Html<String> {
    let run = state.latest().await;
    Html(render_page(&run, &Report::from_result(&run.result, &state.report_config), None))
}

pub fn render_page(run: &LatestRun, report: &Report, banner: Option<Banner>) -> String {
    let banner_html = match banner {
        Some(Banner::Info(msg)) => format!(r#"<div class="alert alert-info">{}</div>"#, escape_html(&msg)),
        Some(Banner::Error(msg)) => format!(r#"<div class="alert alert-error">{}</div>"#, escape_html(&msg)),
        None => String::new(),
    };

    let warnings_html = if run.warnings.is_empty() {
        String::new()
    } else {
        let items: String = run
            .warnings
            .iter()
            .map(|w| format!("<li>{}</li>", escape_html(w)))
            .collect();
        format!(
            r#"<div class="alert alert-warning"><strong>{} record(s) skipped</strong><ul>{}</ul></div>"#,
            run.warnings.len(),
            items
        )
    };

    let results_html = match &run.result {
        PipelineResult::NotRun => r#"<p class="text-muted">Awaiting data to process.</p>"#.to_string(),
        PipelineResult::Empty => format!(
            r#"<p class="text-muted">No data: none of the {} record(s) produced a clinical triplet.</p>"#,
            run.records
        ),
        PipelineResult::Ready { .. } => render_results(run, report),
    };

    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Epiwatch | Clinical Pattern Dashboard</title>
    <style>
        body {{ font-family: system-ui, sans-serif; margin: 2rem; color: #1f2933; }}
        table {{ border-collapse: collapse; margin-bottom: 1.5rem; }}
        th, td {{ border: 1px solid #d9e2ec; padding: 4px 10px; text-align: left; }}
        .bar {{ background: #3e7bfa; height: 12px; }}
        .text-muted {{ color: #7b8794; }}
        .alert {{ padding: 8px 12px; margin-bottom: 1rem; border-radius: 4px; }}
        .alert-info {{ background: #e3f8ff; }}
        .alert-error {{ background: #ffe3e3; }}
        .alert-warning {{ background: #fffbea; }}
        form {{ display: inline-block; vertical-align: top; margin-right: 2rem; }}
    </style>
</head>
<body>
<h1>PubMed NLP Dashboard for Emerging Clinical Patterns</h1>
<p class="text-muted">Extract symptoms, diseases and countries from abstracts, count clinical triplets and rank them by Threat Index.</p>
{}
<section>
    <form action="/upload" method="post" enctype="multipart/form-data">
        <h3>Upload CSV</h3>
        <p class="text-muted">Needs an <code>Abstract</code> column; <code>Title</code> and <code>Date</code> are optional.</p>
        <input type="file" name="file" accept=".csv" required>
        <button type="submit">Process</button>
    </form>
    <form action="/search" method="post">
        <h3>Search PubMed</h3>
        <p><input type="text" name="query" placeholder="dengue fever" required></p>
        <p>From <input type="date" name="start_date"> to <input type="date" name="end_date"></p>
        <p>Max results <input type="number" name="max_results" min="100" max="1000" step="100" value="100"></p>
        <button type="submit">Search</button>
    </form>
</section>
{}
<section>
{}
</section>
</body>
</html>"#,
        banner_html,
        warnings_html,
        results_html,
    )
}

fn render_results(run: &LatestRun, report: &Report) -> String {
    let origin = run.origin.as_deref().unwrap_or("unknown source");
    let mut html = format!(
        r#"<p class="text-muted">{} triplet(s) from {} record(s) ({}).
<a href="/download/{}">Download Triplets CSV</a></p>"#,
        report.total_triplets,
        run.records,
        escape_html(origin),
        CSV_FILE_NAME,
    );

    html.push_str("<h2>Top Clinical Triplets</h2>");
    html.push_str(&render_table(&report.table));
    html.push_str("<h2>Top Clinical Triplets by Count</h2>");
    html.push_str(&render_bars(&report.bars));
    html.push_str("<h2>Symptom x Country Co-occurrence</h2>");
    html.push_str(&render_heatmap(&report.heatmap));
    if !report.yearly.is_empty() {
        html.push_str("<h2>Annual Trend of Clinical Triplet Mentions</h2>");
        html.push_str(&render_yearly(&report.yearly));
    }
    html
}

fn render_table(rows: &[SummaryRow]) -> String {
    let body: String = rows
        .iter()
        .map(|r| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.3}</td></tr>",
                escape_html(&r.symptom),
                escape_html(&r.disease),
                escape_html(&r.country),
                r.count,
                r.threat_index
            )
        })
        .collect();
    format!(
        "<table><thead><tr><th>Symptom</th><th>Disease</th><th>Country</th><th>Count</th><th>ThreatIndex</th></tr></thead><tbody>{}</tbody></table>",
        body
    )
}

fn render_bars(bars: &[BarRow]) -> String {
    let max = bars.iter().map(|b| b.count).max().unwrap_or(1).max(1);
    let body: String = bars
        .iter()
        .map(|b| {
            let width = b.count * 300 / max;
            format!(
                r#"<tr><td>{}</td><td><div class="bar" style="width:{}px"></div></td><td>{}</td></tr>"#,
                escape_html(&b.label),
                width,
                b.count
            )
        })
        .collect();
    format!("<table><tbody>{}</tbody></table>", body)
}

fn render_heatmap(heatmap: &Heatmap) -> String {
    let header: String = heatmap
        .countries
        .iter()
        .map(|c| format!("<th>{}</th>", escape_html(c)))
        .collect();
    let body: String = heatmap
        .symptoms
        .iter()
        .zip(&heatmap.counts)
        .map(|(symptom, row)| {
            let cells: String = row.iter().map(|n| format!("<td>{}</td>", n)).collect();
            format!("<tr><th>{}</th>{}</tr>", escape_html(symptom), cells)
        })
        .collect();
    format!(
        "<table><thead><tr><th></th>{}</tr></thead><tbody>{}</tbody></table>",
        header, body
    )
}

fn render_yearly(yearly: &[YearlyMentions]) -> String {
    let body: String = yearly
        .iter()
        .map(|y| format!("<tr><td>{}</td><td>{}</td></tr>", y.year, y.mentions))
        .collect();
    format!(
        "<table><thead><tr><th>Year</th><th>Mentions</th></tr></thead><tbody>{}</tbody></table>",
        body
    )
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
