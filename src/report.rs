use crate::correlator::{self, InputFileIndex};
use crate::date_filter::{filter_by_date, filter_by_extension};
use crate::error::ReportError;
use crate::remote::{RemoteStore, join_remote};
use crate::row_counter;
use crate::types::{LogRecord, RemoteEntry};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: [&str; 4] = [
    "File Name",
    "Record Count",
    "File Size (Bytes)",
    "Processing Time",
];

pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Where input and log files live on the server, and how to recognise them.
#[derive(Debug, Clone)]
pub struct SourceDirs {
    pub input_dir: String,
    pub input_ext: String,
    pub log_dir: String,
    pub log_ext: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub date: NaiveDate,
    pub records: Vec<LogRecord>,
}

#[derive(Debug)]
pub enum ReportOutcome {
    Success(Report),
    /// No log file matched the target date.
    Empty,
    Failure(ReportError),
}

impl Report {
    /// `report_<YYYY-MM-DD>.csv`
    #[must_use]
    pub fn file_name(&self) -> String {
        report_file_name(self.date)
    }

    #[must_use]
    pub fn total_records(&self) -> u64 {
        self.records.iter().map(|r| r.record_count).sum()
    }

    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.records.iter().map(|r| r.size_bytes).sum()
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, ReportError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(CSV_HEADER)?;
        for r in &self.records {
            wtr.write_record([
                r.file_name.clone(),
                r.record_count.to_string(),
                r.size_bytes.to_string(),
                r.processing_time_display(),
            ])?;
        }
        wtr.into_inner()
            .map_err(|e| ReportError::Output(e.to_string()))
    }

    /// Writes the CSV into `dir` under [`Report::file_name`] and returns its path.
    pub fn write_csv(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        let path = dir.join(self.file_name());
        let bytes = self.to_csv()?;
        fs::write(&path, bytes)
            .map_err(|e| ReportError::Output(format!("{}: {e}", path.display())))?;
        log::info!("CSV written: {}", path.display());
        Ok(path)
    }
}

#[must_use]
pub fn report_file_name(date: NaiveDate) -> String {
    format!("report_{}.csv", date.format("%Y-%m-%d"))
}

fn scan_dir(
    store: &dyn RemoteStore,
    dir: &str,
    ext: &str,
    date: NaiveDate,
) -> Result<Vec<RemoteEntry>, ReportError> {
    let listed = store.list(dir)?;
    let matching = filter_by_date(&filter_by_extension(&listed, ext), date);
    log::info!(
        "{} of {} entries in {dir} are {ext} files from {date}",
        matching.len(),
        listed.len()
    );
    Ok(matching)
}

fn build_record(
    store: &dyn RemoteStore,
    dirs: &SourceDirs,
    index: &InputFileIndex,
    log_entry: &RemoteEntry,
) -> Result<LogRecord, ReportError> {
    let path = join_remote(&dirs.log_dir, &log_entry.name);

    // The reader, and the remote handle behind it, is dropped at the end of this block
    // whether or not counting succeeds.
    let record_count = {
        let reader = store.open_text(&path)?;
        row_counter::count_records(reader, &log_entry.name)?
    };

    let processing_time = correlator::correlate(index, log_entry)?;
    log::debug!(
        "{}: {record_count} records, {} bytes",
        log_entry.name,
        log_entry.size_bytes
    );

    Ok(LogRecord {
        file_name: log_entry.name.clone(),
        record_count,
        size_bytes: log_entry.size_bytes,
        processing_time,
    })
}

/// Builds the report for `date`. Any per-file anomaly aborts the whole report.
pub fn build_report(
    store: &dyn RemoteStore,
    dirs: &SourceDirs,
    date: NaiveDate,
) -> Result<Report, ReportError> {
    let inputs = scan_dir(store, &dirs.input_dir, &dirs.input_ext, date)?;
    let index = InputFileIndex::from_entries(&inputs);

    let logs = scan_dir(store, &dirs.log_dir, &dirs.log_ext, date)?;

    let records = logs
        .iter()
        .map(|entry| build_record(store, dirs, &index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Report { date, records })
}

#[must_use]
pub fn generate(store: &dyn RemoteStore, dirs: &SourceDirs, date: NaiveDate) -> ReportOutcome {
    match build_report(store, dirs, date) {
        Ok(report) if report.records.is_empty() => ReportOutcome::Empty,
        Ok(report) => ReportOutcome::Success(report),
        Err(e) => {
            log::error!("Report generation failed ({:?}): {e}", e.kind());
            ReportOutcome::Failure(e)
        }
    }
}
