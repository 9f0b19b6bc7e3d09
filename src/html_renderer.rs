use crate::report::{CSV_CONTENT_TYPE, CSV_HEADER, Report, ReportOutcome};
use chrono::{Local, NaiveDate};

/// Standalone report page. `csv_href` is the link target of the download button, if a CSV was written.
#[must_use]
pub fn render_page(outcome: &ReportOutcome, date: NaiveDate, csv_href: Option<&str>) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("  <meta charset=\"UTF-8\">\n");
    html.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("  <title>PSA File Extractor</title>\n");
    html.push_str(&render_styles());
    html.push_str("</head>\n<body>\n");

    html.push_str("  <h2 class=\"main-title\">DELTEK REPLICON PSA FILE EXTRACTOR</h2>\n");
    html.push_str("  <h3 class=\"sub-title\">GSAP TRACKER</h3>\n");
    html.push_str(&format!(
        "  <p class=\"generated\">Report date: {} &middot; generated {}</p>\n  <hr>\n",
        date.format("%Y-%m-%d"),
        Local::now().format("%Y-%m-%d %H:%M")
    ));

    html.push_str("  <div class=\"section\">\n");
    match outcome {
        ReportOutcome::Success(report) => {
            html.push_str("<p class=\"status green\">Report generated successfully!</p>\n");
            html.push_str(&render_table(report));
            if let Some(href) = csv_href {
                html.push_str(&format!(
                    r#"<p><a class="download" href="{}" type="{CSV_CONTENT_TYPE}" download="{}">Download Report as CSV</a></p>
"#,
                    escape_html(href),
                    escape_html(&report.file_name())
                ));
            }
        }
        ReportOutcome::Empty => {
            html.push_str(
                "<p class=\"status yellow\">No matching files found for the selected date.</p>\n",
            );
        }
        ReportOutcome::Failure(e) => {
            html.push_str(&format!(
                "<p class=\"status red\">Error: {}</p>\n",
                escape_html(&e.to_string())
            ));
        }
    }
    html.push_str("  </div>\n");

    html.push_str("</body>\n</html>\n");
    html
}

fn render_styles() -> String {
    r#"  <style>
    body { background-color: #0c0c0c; color: #d1d1d1; font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; padding: 20px; margin: 0; }
    .main-title { text-align: center; color: #4CAF50; text-decoration: underline; }
    .sub-title { text-align: center; color: #fff; }
    .generated { text-align: center; font-size: 0.9em; color: #777; text-transform: uppercase; letter-spacing: 2px; }
    hr { border: none; border-top: 1px solid #333; }
    .section { margin: 20px auto; max-width: 1000px; overflow-x: auto; }
    .status { padding: 10px; background-color: #1a1a1a; border-left: 3px solid #333; }
    .green { color: #4CAF50; border-left-color: #4CAF50; }
    .yellow { color: #FFD700; border-left-color: #FFD700; }
    .red { color: #f44336; border-left-color: #f44336; }
    .muted { color: #777; }
    .num { text-align: right; }
    .data-table { width: 100%; border-collapse: collapse; margin: 10px 0; font-size: 0.9em; }
    .data-table th { background-color: #1a1a1a; padding: 10px; text-align: left; border-bottom: 2px solid #333; }
    .data-table td { padding: 8px; border-bottom: 1px solid #222; }
    .data-table tr.summary { border-top: 3px solid #4CAF50; background-color: #1a1a1a; font-weight: bold; }
    .download { display: inline-block; padding: 8px 16px; background-color: #4CAF50; color: #0c0c0c; border-radius: 6px; text-decoration: none; font-weight: bold; }
    @media (max-width: 768px) {
      body { padding: 10px; }
      .data-table { font-size: 0.75em; }
    }
  </style>
"#.to_string()
}

fn render_table(report: &Report) -> String {
    let mut html = String::new();
    html.push_str(r#"<table class="data-table"><thead><tr>"#);
    for h in CSV_HEADER {
        html.push_str(&format!("<th>{h}</th>"));
    }
    html.push_str("</tr></thead><tbody>");

    for r in &report.records {
        let time_cell = match r.processing_time {
            Some(e) if e.is_negative() => format!(r#"<td class="red">{e}</td>"#),
            Some(e) => format!("<td>{e}</td>"),
            None => r#"<td class="muted">-</td>"#.to_string(),
        };
        html.push_str(&format!(
            r#"<tr><td>{}</td><td class="num">{}</td><td class="num" title="{}">{}</td>{}</tr>"#,
            escape_html(&r.file_name),
            r.record_count,
            human_bytes::human_bytes(r.size_bytes as f64),
            r.size_bytes,
            time_cell
        ));
    }

    html.push_str(&format!(
        r#"<tr class="summary"><td>TOTALS ({} files)</td><td class="num">{}</td><td class="num">{}</td><td></td></tr>"#,
        report.records.len(),
        report.total_records(),
        report.total_size()
    ));

    html.push_str("</tbody></table>\n");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlator::Elapsed;
    use crate::error::ReportError;
    use crate::types::LogRecord;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn test_success_page_has_table_and_download() {
        let report = Report {
            date: date(),
            records: vec![LogRecord {
                file_name: "LOG_<b>_out.csv".to_string(),
                record_count: 10,
                size_bytes: 4096,
                processing_time: Some(Elapsed::from_seconds(150)),
            }],
        };
        let html = render_page(
            &ReportOutcome::Success(report),
            date(),
            Some("report_2024-01-10.csv"),
        );

        assert!(html.contains("<th>File Size (Bytes)</th>"));
        assert!(html.contains("LOG_&lt;b&gt;_out.csv"));
        assert!(html.contains("<td>00:02:30</td>"));
        assert!(html.contains(r#"href="report_2024-01-10.csv""#));
        assert!(html.contains(r#"type="text/csv""#));
    }

    #[test]
    fn test_empty_page_warns() {
        let html = render_page(&ReportOutcome::Empty, date(), None);
        assert!(html.contains("No matching files found"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn test_failure_page_shows_error() {
        let outcome = ReportOutcome::Failure(ReportError::Transport("connection refused".into()));
        let html = render_page(&outcome, date(), None);
        assert!(html.contains("Error: transport error: connection refused"));
        assert!(!html.contains("Download Report"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a&b<"c">'"#), "a&amp;b&lt;&quot;c&quot;&gt;&#39;");
    }
}
