mod config;
mod correlator;
mod date_filter;
mod error;
mod html_renderer;
mod remote;
mod report;
mod row_counter;
mod terminal;
mod types;

use chrono::{Local, NaiveDate};
use clap::Parser;
use colored::Colorize;
use config::SftpConfig;
use error::ReportError;
use remote::{LocalStore, RemoteStore, SftpStore};
use report::{ReportOutcome, SourceDirs};
use std::fs;
use std::path::{Path, PathBuf};

const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_NO_MATCHES: i32 = 2;

#[derive(Parser, Debug)]
#[command(version, about = "Daily PSA input/log file report over SFTP", long_about = None)]
struct Args {
    /// Report date (YYYY-MM-DD), matched against file modification dates in local time
    #[arg(long, short = 'd', value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Secrets file with sftp_host, sftp_port, sftp_username and sftp_password
    #[arg(long, short = 's', default_value = ".streamlit/secrets.toml")]
    secrets: PathBuf,

    /// Remote directory holding the input files
    #[arg(long, default_value = "/Production/Inbound/Resource Assignments/Archive")]
    input_dir: String,

    /// Remote directory holding the log files
    #[arg(long, default_value = "/Production/Inbound/Resource Assignments/Logs/Archive")]
    log_dir: String,

    /// Suffix identifying input files
    #[arg(long, default_value = ".pgp")]
    input_ext: String,

    /// Suffix identifying log files
    #[arg(long, default_value = ".csv")]
    log_ext: String,

    /// Directory the CSV report is written to
    #[arg(long, short = 'o', default_value = ".")]
    output_dir: PathBuf,

    /// Also write an HTML report page to FILE
    #[arg(long, short = 'H', value_name = "FILE")]
    html: Option<PathBuf>,

    /// Read the directories under a local root instead of connecting over SFTP
    #[arg(long, value_name = "ROOT")]
    local: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q')]
    quiet: bool,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if args.verbose >= 2 {
        builder.filter_level(log::LevelFilter::Debug);
    } else if args.verbose == 1 {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.init();
}

fn main() {
    let args = Args::parse();
    init_logging(&args);

    let code = run(&args);
    std::process::exit(code);
}

/// Everything that holds a connection lives inside this call, so it is closed before `exit`.
fn run(args: &Args) -> i32 {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    terminal::print_banner(date);

    let store: Box<dyn RemoteStore> = match open_store(args) {
        Ok(store) => store,
        Err(e) => {
            log::error!("{e}");
            return finish(args, ReportOutcome::Failure(e), date);
        }
    };

    let dirs = SourceDirs {
        input_dir: args.input_dir.clone(),
        input_ext: args.input_ext.clone(),
        log_dir: args.log_dir.clone(),
        log_ext: args.log_ext.clone(),
    };

    println!("Processing files...");
    let outcome = report::generate(store.as_ref(), &dirs, date);
    drop(store);

    finish(args, outcome, date)
}

fn open_store(args: &Args) -> Result<Box<dyn RemoteStore>, ReportError> {
    if let Some(root) = &args.local {
        println!("Reading files under local root {}...", root.display());
        return Ok(Box::new(LocalStore::new(root)));
    }

    // Credentials are checked before any connection attempt.
    let cfg = SftpConfig::load(&args.secrets)?;
    log::debug!("Loaded {cfg:?}");
    println!("Connecting to SFTP and processing files... Please wait!");
    Ok(Box::new(SftpStore::connect(&cfg)?))
}

fn finish(args: &Args, outcome: ReportOutcome, date: NaiveDate) -> i32 {
    let (outcome, csv_path) = match outcome {
        ReportOutcome::Success(report) => match report.write_csv(&args.output_dir) {
            Ok(path) => (ReportOutcome::Success(report), Some(path)),
            Err(e) => (ReportOutcome::Failure(e), None),
        },
        other => (other, None),
    };

    terminal::print_outcome(&outcome);
    if let Some(path) = &csv_path {
        println!("CSV written: {}", path.display().to_string().cyan());
    }

    if let Some(html_path) = &args.html {
        let href = csv_path.as_deref().map(|p| csv_href(p, html_path));
        let page = html_renderer::render_page(&outcome, date, href.as_deref());
        if let Err(e) = fs::write(html_path, page) {
            eprintln!("Error writing HTML report to {}: {e}", html_path.display());
            return EXIT_FAILURE;
        }
        println!("HTML report written: {}", html_path.display().to_string().cyan());
    }

    match outcome {
        ReportOutcome::Success(_) => EXIT_OK,
        ReportOutcome::Empty => EXIT_NO_MATCHES,
        ReportOutcome::Failure(_) => EXIT_FAILURE,
    }
}

/// Link target for the CSV as seen from the HTML page: a bare file name when both share a directory.
fn csv_href(csv: &Path, html: &Path) -> String {
    let html_dir = html.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let csv_dir = csv.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));

    let same_dir = match (fs::canonicalize(html_dir), fs::canonicalize(csv_dir)) {
        (Ok(a), Ok(b)) => a == b,
        _ => html_dir == csv_dir,
    };

    match csv.file_name() {
        Some(name) if same_dir => name.to_string_lossy().to_string(),
        _ => fs::canonicalize(csv)
            .unwrap_or_else(|_| csv.to_path_buf())
            .display()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::SystemTime;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-01-10").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
        assert!(parse_date("10/01/2024").is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["psa_tracker", "--date", "2024-01-10"]);
        assert_eq!(args.input_ext, ".pgp");
        assert_eq!(args.log_ext, ".csv");
        assert_eq!(args.log_dir, "/Production/Inbound/Resource Assignments/Logs/Archive");
        assert!(args.local.is_none());
    }

    #[test]
    fn test_csv_href_same_dir() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("report_2024-01-10.csv");
        fs::write(&csv, "x").unwrap();
        let html = dir.path().join("report.html");
        assert_eq!(csv_href(&csv, &html), "report_2024-01-10.csv");
    }

    #[test]
    fn test_csv_href_other_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("out")).unwrap();
        let csv = dir.path().join("out/report_2024-01-10.csv");
        fs::write(&csv, "x").unwrap();
        let html = dir.path().join("report.html");
        assert!(csv_href(&csv, &html).ends_with("out/report_2024-01-10.csv"));
    }

    #[test]
    fn test_missing_secrets_fails_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let secrets = dir.path().join("secrets.toml");
        fs::write(&secrets, "sftp_host = \"127.0.0.1\"\n").unwrap();
        let secrets = secrets.display().to_string();
        let args = Args::parse_from(["psa_tracker", "--secrets", secrets.as_str()]);

        let err = open_store(&args).err().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_run_against_local_tree() {
        let root = tempfile::tempdir().unwrap();
        let logs = root.path().join("logs");
        fs::create_dir_all(&logs).unwrap();
        fs::create_dir_all(root.path().join("inputs")).unwrap();
        let log_path = logs.join("LOG_A1_out.csv");
        fs::write(&log_path, "h\n1\n").unwrap();
        let noon = Local.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        fs::File::options()
            .write(true)
            .open(&log_path)
            .unwrap()
            .set_modified(SystemTime::from(noon))
            .unwrap();

        let out = tempfile::tempdir().unwrap();
        let root_s = root.path().display().to_string();
        let out_s = out.path().display().to_string();
        let args_for = |date: &str| {
            Args::parse_from([
                "psa_tracker",
                "--local",
                root_s.as_str(),
                "--input-dir",
                "/inputs",
                "--log-dir",
                "/logs",
                "--output-dir",
                out_s.as_str(),
                "--date",
                date,
            ])
        };

        assert_eq!(run(&args_for("2024-01-10")), EXIT_OK);
        let csv = fs::read_to_string(out.path().join("report_2024-01-10.csv")).unwrap();
        assert!(csv.contains("LOG_A1_out.csv,1,4,\n"));

        let other_day = args_for("2000-01-01");
        assert_eq!(run(&other_day), EXIT_NO_MATCHES);
    }
}
