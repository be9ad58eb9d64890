// tests/common/mod.rs
use httpmock::Method::POST;
use httpmock::{Mock, MockServer};
use serde_json::json;
use std::path::Path;

use crate::config::credentials::Credentials;
use crate::config::settings::{ClientConfig, Settings, StorageConfig};

pub const TOKEN_PATH: &str = "/org/app/token";
pub const BEARER: &str = "Bearer T";

/// Client config pointed at `server`, storing files under `storage`.
pub fn client_config(server: &MockServer, storage: &Path) -> ClientConfig {
    ClientConfig {
        credentials: Credentials::new("c", "s", "org", "app").expect("credentials"),
        settings: Settings {
            base_url: Some(server.base_url()),
            storage: StorageConfig {
                cursor_dir: storage.join("txtfile"),
                download_dir: storage.join("down"),
            },
            ..Settings::default()
        },
    }
}

/// Token endpoint answering with access token "T" and an application id.
pub async fn mock_token(server: &MockServer) -> Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(POST).path(TOKEN_PATH).json_body(json!({
                "grant_type": "client_credentials",
                "client_id": "c",
                "client_secret": "s"
            }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "access_token": "T",
                    "expires_in": 3600,
                    "application": "app-uuid"
                }));
        })
        .await
}
