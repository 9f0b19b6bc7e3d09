use crate::config::SftpConfig;
use crate::error::ReportError;
use crate::types::RemoteEntry;
use chrono::{DateTime, Local, TimeZone};
use ssh2::{FileStat, Session, Sftp};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file server that can list a directory and stream a file back as text.
pub trait RemoteStore {
    /// Non-recursive listing of regular files in `dir`.
    fn list(&self, dir: &str) -> Result<Vec<RemoteEntry>, ReportError>;

    /// Opens `path` for reading. The handle is released when the reader is dropped.
    fn open_text(&self, path: &str) -> Result<Box<dyn BufRead + '_>, ReportError>;
}

/// Joins a listed file name onto its directory, remote-path style.
#[must_use]
pub fn join_remote(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), name)
}

/// Builds an entry for a regular file. Servers that omit permissions get the benefit of the doubt.
fn entry_from_stat(path: &Path, stat: &FileStat) -> Option<RemoteEntry> {
    if stat.perm.is_some() && !stat.is_file() {
        return None;
    }
    let name = path.file_name()?.to_string_lossy().to_string();
    let modified_at = stat
        .mtime
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| Local.timestamp_opt(secs, 0).single());
    Some(RemoteEntry {
        name,
        modified_at,
        size_bytes: stat.size.unwrap_or(0),
    })
}

pub struct SftpStore {
    sftp: Sftp,
    session: Session,
}

impl SftpStore {
    pub fn connect(cfg: &SftpConfig) -> Result<Self, ReportError> {
        log::info!("Connecting to sftp://{}@{}:{}", cfg.username, cfg.host, cfg.port);

        let tcp = TcpStream::connect((cfg.host.as_str(), cfg.port)).map_err(|e| {
            ReportError::Transport(format!("cannot connect to {}:{}: {e}", cfg.host, cfg.port))
        })?;

        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.handshake()?;
        session
            .userauth_password(&cfg.username, &cfg.password)
            .map_err(|e| ReportError::Transport(format!("authentication failed: {e}")))?;
        if !session.authenticated() {
            return Err(ReportError::Transport("authentication rejected".to_string()));
        }

        let sftp = session.sftp()?;
        Ok(SftpStore { sftp, session })
    }
}

impl RemoteStore for SftpStore {
    fn list(&self, dir: &str) -> Result<Vec<RemoteEntry>, ReportError> {
        let listing = self
            .sftp
            .readdir(Path::new(dir))
            .map_err(|e| ReportError::Transport(format!("cannot list {dir}: {e}")))?;

        let no_perm = listing.iter().filter(|(_, stat)| stat.perm.is_none()).count();
        if no_perm > 0 {
            log::warn!("{no_perm} entries in {dir} have no permissions; treating them as files");
        }

        let entries: Vec<RemoteEntry> = listing
            .iter()
            .filter_map(|(path, stat)| entry_from_stat(path, stat))
            .collect();

        log::info!("Listed {} files in {dir}", entries.len());
        Ok(entries)
    }

    fn open_text(&self, path: &str) -> Result<Box<dyn BufRead + '_>, ReportError> {
        let file = self
            .sftp
            .open(Path::new(path))
            .map_err(|e| ReportError::Transport(format!("cannot open {path}: {e}")))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

impl Drop for SftpStore {
    fn drop(&mut self) {
        if let Err(e) = self.session.disconnect(None, "report complete", None) {
            log::debug!("SFTP disconnect failed: {e}");
        }
    }
}

/// Serves directories under a local root, with remote paths resolved relative to it.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalStore { root: root.into() }
    }

    fn resolve(&self, remote: &str) -> PathBuf {
        self.root.join(remote.trim_start_matches('/'))
    }
}

impl RemoteStore for LocalStore {
    fn list(&self, dir: &str) -> Result<Vec<RemoteEntry>, ReportError> {
        let path = self.resolve(dir);
        let mut entries = Vec::new();

        for entry in WalkDir::new(&path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry
                .map_err(|e| ReportError::Transport(format!("cannot list {dir}: {e}")))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let metadata = entry
                .metadata()
                .map_err(|e| ReportError::Transport(format!("cannot stat {dir}: {e}")))?;
            let modified_at = metadata.modified().ok().map(DateTime::<Local>::from);

            entries.push(RemoteEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                modified_at,
                size_bytes: metadata.len(),
            });
        }

        log::info!("Listed {} files in {}", entries.len(), path.display());
        Ok(entries)
    }

    fn open_text(&self, path: &str) -> Result<Box<dyn BufRead + '_>, ReportError> {
        let file = File::open(self.resolve(path))
            .map_err(|e| ReportError::Transport(format!("cannot open {path}: {e}")))?;
        Ok(Box::new(BufReader::new(file)))
    }
}
