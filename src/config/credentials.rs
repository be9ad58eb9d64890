use serde::Deserialize;
use std::fmt;

use crate::error::{EasemobError, Result};

/// Application credentials. Missing keys deserialize as empty strings and are
/// rejected by [`Credentials::validate`].
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Part of the app key before `#`.
    #[serde(default)]
    pub org_name: String,
    /// Part of the app key after `#`.
    #[serde(default)]
    pub app_name: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        org_name: impl Into<String>,
        app_name: impl Into<String>,
    ) -> Result<Self> {
        let credentials = Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            org_name: org_name.into(),
            app_name: app_name.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("org_name", &self.org_name),
            ("app_name", &self.app_name),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(EasemobError::Configuration(format!(
                "credentials: missing {}",
                missing.join(", ")
            )))
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("org_name", &self.org_name)
            .field("app_name", &self.app_name)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn all_fields_required() {
        assert!(Credentials::new("c", "s", "org", "app").is_ok());

        let err = Credentials::new("c", "", "org", " ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("client_secret, app_name"));
    }

    #[test]
    fn debug_hides_secret() {
        let credentials = Credentials::new("c", "very-secret", "org", "app").unwrap();
        let printed = format!("{:?}", credentials);
        assert!(!printed.contains("very-secret"));
    }
}
