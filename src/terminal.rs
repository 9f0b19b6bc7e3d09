use crate::report::{CSV_HEADER, Report, ReportOutcome};
use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};

pub fn print_banner(date: NaiveDate) {
    println!("{}", "=== DELTEK REPLICON PSA FILE EXTRACTOR ===".green().underline());
    println!("{}", "GSAP TRACKER".bold());
    println!("Report date: {}", date.format("%Y-%m-%d").to_string().cyan());
}

#[must_use]
pub fn report_table(report: &Report) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);
    table.set_header(CSV_HEADER.to_vec());

    for r in &report.records {
        let time_cell = match r.processing_time {
            Some(e) if e.is_negative() => Cell::new(e.to_string()).fg(Color::Red),
            Some(e) => Cell::new(e.to_string()),
            None => Cell::new("-").fg(Color::Yellow),
        };

        table.add_row(vec![
            Cell::new(&r.file_name),
            Cell::new(r.record_count).set_alignment(CellAlignment::Right),
            Cell::new(format!(
                "{} ({})",
                r.size_bytes,
                human_bytes::human_bytes(r.size_bytes as f64)
            ))
            .set_alignment(CellAlignment::Right),
            time_cell,
        ]);
    }

    // Summary Row
    table.add_row(vec![
        Cell::new(format!("TOTALS ({} files)", report.records.len())).add_attribute(Attribute::Bold),
        Cell::new(report.total_records())
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Right),
        Cell::new(human_bytes::human_bytes(report.total_size() as f64))
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Right),
        Cell::new(""),
    ]);

    table
}

pub fn print_outcome(outcome: &ReportOutcome) {
    match outcome {
        ReportOutcome::Success(report) => {
            println!("{}", report_table(report));
            println!("{}", "Report generated successfully!".green());
        }
        ReportOutcome::Empty => {
            println!("{}", "No matching files found for the selected date.".yellow());
        }
        ReportOutcome::Failure(e) => {
            eprintln!("{} {e}", "Error:".red());
        }
    }
}
