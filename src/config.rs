use crate::error::ReportError;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

const KEY_HOST: &str = "sftp_host";
const KEY_PORT: &str = "sftp_port";
const KEY_USERNAME: &str = "sftp_username";
const KEY_PASSWORD: &str = "sftp_password";

/// Connection parameters for the SFTP server, resolved once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct SftpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

// Keep the password out of logs.
impl fmt::Debug for SftpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SftpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// `sftp_port` may be written as `22` or `"22"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    sftp_host: Option<String>,
    sftp_port: Option<PortValue>,
    sftp_username: Option<String>,
    sftp_password: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl SftpConfig {
    /// Reads the top-level `sftp_*` keys of a `secrets.toml` file.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ReportError::Configuration(format!("cannot read secrets file {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ReportError> {
        let secrets: SecretsFile = toml::from_str(content)
            .map_err(|e| ReportError::Configuration(format!("invalid secrets file: {e}")))?;

        let host = present(secrets.sftp_host);
        let username = present(secrets.sftp_username);
        let password = present(secrets.sftp_password);
        let port = secrets.sftp_port.filter(|p| !matches!(p, PortValue::Text(t) if t.is_empty()));

        let missing: Vec<&str> = [
            (KEY_HOST, host.is_none()),
            (KEY_PORT, port.is_none()),
            (KEY_USERNAME, username.is_none()),
            (KEY_PASSWORD, password.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        let (Some(host), Some(port), Some(username), Some(password)) =
            (host, port, username, password)
        else {
            return Err(ReportError::Configuration(format!(
                "missing secrets: {}",
                missing.join(", ")
            )));
        };

        let port = match port {
            PortValue::Number(n) => u16::try_from(n).ok(),
            PortValue::Text(t) => t.trim().parse::<u16>().ok(),
        }
        .ok_or_else(|| ReportError::Configuration(format!("{KEY_PORT} is not a valid port")))?;

        Ok(SftpConfig {
            host,
            port,
            username,
            password,
        })
    }
}
