use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::path::Path;
use tracing::{debug, error};

use crate::config::settings::{ClientConfig, LogFormat, LoggingConfig};

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ClientConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config '{}'", path.display()))?;

    let expanded = expand_env_vars(&content)?;
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<ClientConfig> {
    let mut client_config: ClientConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))
        .map_err(|e| anyhow!("Invalid config format: {}", e))?;

    // Apply defaults
    if client_config.settings.logging.is_none() {
        client_config.settings.logging =
            Some(LoggingConfig::new("info".to_owned(), LogFormat::Compact));
    }

    debug!("validation config ...");
    client_config.credentials.validate()?;
    if client_config.settings.base_url.is_none() && client_config.settings.api_host.trim().is_empty() {
        return Err(anyhow!("settings: either 'api_host' or 'base_url' must be set"));
    }

    Ok(client_config)
}

/// Replaces `${VAR}` and `${VAR:default}` with environment values.
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    });
    Ok(expanded.to_string())
}

#[cfg(test)]
mod test {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const CONFIG: &str = r#"
credentials:
  client_id: ${EASEMOB_TEST_CLIENT_ID}
  client_secret: ${EASEMOB_TEST_CLIENT_SECRET:fallback-secret}
  org_name: org
  app_name: app
settings:
  token_ttl_seconds: 30
  transport:
    timeout_ms: 2500
"#;

    #[tokio::test]
    #[serial]
    async fn loads_yaml_with_env_expansion() {
        std::env::set_var("EASEMOB_TEST_CLIENT_ID", "client-from-env");
        std::env::remove_var("EASEMOB_TEST_CLIENT_SECRET");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = file_to_config(file.path()).await.unwrap();
        assert_eq!(config.credentials.client_id, "client-from-env");
        assert_eq!(config.credentials.client_secret, "fallback-secret");
        assert_eq!(config.settings.token_ttl_seconds, 30);
        assert_eq!(config.settings.transport.timeout_ms, 2500);
        assert_eq!(config.settings.transport.connect_timeout_ms, 5000);
        assert_eq!(config.settings.transport.max_redirects, 3);
        assert!(!config.settings.transport.insecure_skip_tls_verify);
        assert_eq!(config.settings.logging.unwrap().format, LogFormat::Compact);

        std::env::remove_var("EASEMOB_TEST_CLIENT_ID");
    }

    #[test]
    fn missing_credentials_rejected() {
        let yaml = "credentials:\n  client_id: c\n  org_name: org\n  app_name: app\n";
        let err = parse_config(yaml).unwrap_err();
        assert!(err.to_string().contains("client_secret"));
    }
}
