use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::credentials::Credentials;
use crate::utils::constants::*;

/// ================================
/// Full client configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,
    #[serde(default)]
    pub settings: Settings,
}

/// ================================
/// Client-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_api_host")]
    pub api_host: String,
    /// Full scheme+host override, e.g. `http://127.0.0.1:8080`. Wins over `api_host`.
    pub base_url: Option<String>,
    /// Lifetime of the cached bearer token, independent of `expires_in`.
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub logging: Option<LoggingConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            base_url: None,
            token_ttl_seconds: default_token_ttl_seconds(),
            transport: TransportConfig::default(),
            storage: StorageConfig::default(),
            logging: None,
        }
    }
}

impl Settings {
    /// `https://<host>/<org_name>/<app_name>/`
    pub fn base_url_for(&self, credentials: &Credentials) -> String {
        let root = match &self.base_url {
            Some(base_url) => base_url.trim_end_matches('/').to_owned(),
            None => format!("https://{}", self.api_host.trim_end_matches('/')),
        };
        format!("{}/{}/{}/", root, credentials.org_name, credentials.app_name)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_seconds)
    }
}

/// ================================
/// HTTP transport
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// whole request, connect included
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Disables certificate chain and hostname checks. Never enable against production.
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            insecure_skip_tls_verify: false,
            user_agent: None,
        }
    }
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// ================================
/// Local files
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_cursor_dir")]
    pub cursor_dir: PathBuf,
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cursor_dir: default_cursor_dir(),
            download_dir: default_download_dir(),
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_api_host() -> String {
    DEFAULT_API_HOST.to_owned()
}

fn default_token_ttl_seconds() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

fn default_cursor_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CURSOR_DIR)
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DOWNLOAD_DIR)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn base_url_from_host_or_override() {
        let credentials = Credentials::new("c", "s", "org", "app").unwrap();
        let mut settings = Settings::default();
        assert_eq!(settings.base_url_for(&credentials), "https://a1.easemob.com/org/app/");

        settings.base_url = Some("http://127.0.0.1:9000/".into());
        assert_eq!(settings.base_url_for(&credentials), "http://127.0.0.1:9000/org/app/");
    }
}
