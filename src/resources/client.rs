use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::token_manager::TokenManager;
use crate::cache::token_cache::{MemoryTokenCache, TokenCache};
use crate::config::credentials::Credentials;
use crate::config::settings::{ClientConfig, Settings};
use crate::cursor::cursor_store::{CursorFile, CursorStore};
use crate::error::{EasemobError, Result};
use crate::resources::endpoint::{Call, Endpoint};
use crate::transport::adapter::HttpTransport;
use crate::transport::request::ApiRequest;
use crate::transport::response::{ApiResult, ErrorBody};

/// Entry point for every provider operation.
///
/// Cheap to clone; clones share the HTTP connection pool and the token cache.
#[derive(Clone)]
pub struct EasemobClient {
    base_url: String,
    transport: HttpTransport,
    tokens: TokenManager,
    cursors: CursorStore,
    download_dir: PathBuf,
}

impl EasemobClient {
    /// Client with a private in-memory token cache.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_cache(config, Arc::new(MemoryTokenCache::new()))
    }

    pub fn from_credentials(credentials: Credentials) -> Result<Self> {
        Self::new(ClientConfig { credentials, settings: Settings::default() })
    }

    /// Client using `cache` for the bearer token; pass the same cache to
    /// several clients to share one token.
    pub fn with_cache(config: ClientConfig, cache: Arc<dyn TokenCache>) -> Result<Self> {
        let ClientConfig { credentials, settings } = config;
        credentials.validate()?;

        let base_url = settings.base_url_for(&credentials);
        let transport = HttpTransport::new(&settings.transport)?;
        let tokens = TokenManager::new(
            &base_url,
            Arc::new(credentials),
            transport.clone(),
            cache,
            settings.token_ttl(),
        );
        info!("easemob client for '{}'", base_url);

        Ok(Self {
            base_url,
            transport,
            tokens,
            cursors: CursorStore::new(settings.storage.cursor_dir),
            download_dir: settings.storage.download_dir,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn cursors(&self) -> &CursorStore {
        &self.cursors
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Bearer header line, see [`TokenManager::get_token`].
    pub async fn get_token(&self, force: bool) -> Result<String> {
        self.tokens.get_token(force).await
    }

    /// Runs `call` with the current bearer token. A JSON body with a non-empty
    /// `error` field is returned as [`crate::EasemobError::Provider`].
    pub async fn execute(&self, call: Call) -> Result<ApiResult> {
        let request = self.authorized(call).await?;
        self.transport.execute(request).await?.error_for_provider()
    }

    /// Like [`execute`](Self::execute) but keeps the body bytes exactly as
    /// received; a JSON `error` body is still raised as a provider error.
    pub async fn execute_raw(&self, call: Call) -> Result<Vec<u8>> {
        let request = self.authorized(call).await?;
        let bytes = self.transport.execute_raw(request).await?;
        match ErrorBody::from_bytes(&bytes) {
            Some(ErrorBody { error, error_description }) => {
                Err(EasemobError::Provider { error, error_description })
            }
            None => Ok(bytes),
        }
    }

    /// Request built and checked locally first; the bearer is fetched only
    /// for a well-formed call.
    async fn authorized(&self, call: Call) -> Result<ApiRequest> {
        let endpoint = call.endpoint();
        let request = call.into_request(&self.base_url)?;
        let bearer = self.tokens.get_token(false).await?;
        debug!("call '{}': {} {}", endpoint, request.verb, request.url);
        Ok(request.first_header(bearer))
    }

    /// [`execute`](Self::execute) for endpoints that always answer with JSON.
    pub async fn execute_json(&self, call: Call) -> Result<Value> {
        self.execute(call).await?.into_json()
    }

    /// All users, or the first `limit` when given.
    pub async fn users(&self, limit: Option<u32>) -> Result<Value> {
        self.execute_json(with_limit(Call::new(Endpoint::GetUsers), limit)).await
    }

    /// One page of users; a returned cursor is written to `userfile.txt`.
    pub async fn users_page(&self, limit: u32, cursor: Option<&str>) -> Result<Value> {
        self.page(Endpoint::GetUsers, CursorFile::Users, limit, cursor).await
    }

    pub async fn groups(&self, limit: Option<u32>) -> Result<Value> {
        self.execute_json(with_limit(Call::new(Endpoint::GetGroups), limit)).await
    }

    /// One page of groups; a returned cursor is written to `groupfile.txt`.
    pub async fn groups_page(&self, limit: u32, cursor: Option<&str>) -> Result<Value> {
        self.page(Endpoint::GetGroups, CursorFile::Groups, limit, cursor).await
    }

    async fn page(
        &self,
        endpoint: Endpoint,
        file: CursorFile,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Value> {
        let mut call = Call::new(endpoint).query("limit", limit);
        if let Some(cursor) = cursor.filter(|cursor| !cursor.is_empty()) {
            call = call.query("cursor", cursor);
        }

        let page = self.execute_json(call).await?;
        if let Some(next) = page.get("cursor").and_then(Value::as_str).filter(|c| !c.is_empty()) {
            self.cursors.write(file, next).await?;
        }
        Ok(page)
    }
}

fn with_limit(call: Call, limit: Option<u32>) -> Call {
    match limit.filter(|limit| *limit > 0) {
        Some(limit) => call.query("limit", limit),
        None => call,
    }
}
