use thiserror::Error;

/// Discriminant of a [`ReportError`], for callers that branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    MalformedName,
    RecordCountUnderflow,
    Encoding,
    Output,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed log file name '{0}': expected at least two '_'-separated segments")]
    MalformedName(String),

    #[error("log file '{0}' is empty: no header line to subtract")]
    RecordCountUnderflow(String),

    #[error("log file '{0}' is not valid UTF-8")]
    Encoding(String),

    #[error("failed to write report: {0}")]
    Output(String),
}

impl ReportError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::Configuration(_) => ErrorKind::Configuration,
            ReportError::Transport(_) => ErrorKind::Transport,
            ReportError::MalformedName(_) => ErrorKind::MalformedName,
            ReportError::RecordCountUnderflow(_) => ErrorKind::RecordCountUnderflow,
            ReportError::Encoding(_) => ErrorKind::Encoding,
            ReportError::Output(_) => ErrorKind::Output,
        }
    }
}

impl From<ssh2::Error> for ReportError {
    fn from(e: ssh2::Error) -> Self {
        ReportError::Transport(e.to_string())
    }
}

impl From<csv::Error> for ReportError {
    fn from(e: csv::Error) -> Self {
        ReportError::Output(e.to_string())
    }
}
