use crate::error::ReportError;
use crate::types::RemoteEntry;
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fmt;

const SECONDS_PER_DAY: i64 = 86_400;

/// Signed wall-clock time between an input file and its log, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed(i64);

impl Elapsed {
    #[must_use]
    pub fn from_seconds(seconds: i64) -> Self {
        Elapsed(seconds)
    }

    /// Truncates sub-second precision toward zero.
    #[must_use]
    pub fn between(start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Elapsed(end.signed_duration_since(start).num_seconds())
    }

    #[must_use]
    pub fn total_seconds(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Parses the `Dd HH:MM:SS` / `HH:MM:SS` form produced by `Display`, with an optional leading `-`.
    #[cfg(test)]
    pub fn parse(s: &str) -> Option<Self> {
        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (days, clock) = match rest.split_once("d ") {
            Some((d, clock)) => (d.parse::<i64>().ok()?, clock),
            None => (0, rest),
        };

        let mut parts = clock.split(':');
        let hours: i64 = parts.next()?.parse().ok()?;
        let minutes: i64 = parts.next()?.parse().ok()?;
        let seconds: i64 = parts.next()?.parse().ok()?;
        if parts.next().is_some() || hours > 23 || minutes > 59 || seconds > 59 {
            return None;
        }

        let magnitude = days * SECONDS_PER_DAY + hours * 3_600 + minutes * 60 + seconds;
        Some(Elapsed(if negative { -magnitude } else { magnitude }))
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let days = magnitude / SECONDS_PER_DAY as u64;
        let remainder = magnitude % SECONDS_PER_DAY as u64;
        let hours = remainder / 3_600;
        let minutes = (remainder % 3_600) / 60;
        let seconds = remainder % 60;

        if self.0 < 0 {
            write!(f, "-")?;
        }
        if days > 0 {
            write!(f, "{days}d {hours:02}:{minutes:02}:{seconds:02}")
        } else {
            write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
        }
    }
}

/// Second `_`-separated segment of a log file name, e.g. `ABC123` in `LOG_ABC123_out.csv`.
pub fn identifying_token(log_name: &str) -> Result<&str, ReportError> {
    match log_name.split('_').nth(1) {
        // An empty token would prefix-match every input file.
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(ReportError::MalformedName(log_name.to_string())),
    }
}

/// Input file name -> modification time, for the input files of one target date.
#[derive(Debug, Default)]
pub struct InputFileIndex {
    files: BTreeMap<String, DateTime<Local>>,
}

impl InputFileIndex {
    #[must_use]
    pub fn from_entries(entries: &[RemoteEntry]) -> Self {
        let files = entries
            .iter()
            .filter_map(|e| e.modified_at.map(|ts| (e.name.clone(), ts)))
            .collect();
        InputFileIndex { files }
    }

    /// First input file, in ascending name order, whose name starts with `token`.
    #[must_use]
    pub fn find_origin(&self, token: &str) -> Option<(&str, DateTime<Local>)> {
        self.files
            .iter()
            .find(|(name, _)| name.starts_with(token))
            .map(|(name, ts)| (name.as_str(), *ts))
    }
}

/// Processing time of `log`, or `None` when no input file in `index` matches it.
pub fn correlate(index: &InputFileIndex, log: &RemoteEntry) -> Result<Option<Elapsed>, ReportError> {
    let token = identifying_token(&log.name)?;

    let Some((input_name, input_ts)) = index.find_origin(token) else {
        log::warn!("No input file found for log '{}' (token '{token}')", log.name);
        return Ok(None);
    };

    let Some(log_ts) = log.modified_at else {
        log::warn!("Log '{}' has no modification time; cannot correlate", log.name);
        return Ok(None);
    };

    let elapsed = Elapsed::between(input_ts, log_ts);
    if elapsed.is_negative() {
        log::warn!(
            "Log '{}' is older than its input '{input_name}' by {}",
            log.name,
            Elapsed::from_seconds(-elapsed.total_seconds())
        );
    } else {
        log::debug!("Log '{}' matched input '{input_name}': {elapsed}", log.name);
    }

    Ok(Some(elapsed))
}
