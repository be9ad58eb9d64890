use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::cache::token_cache::TokenCache;
use crate::config::credentials::Credentials;
use crate::error::{EasemobError, Result};
use crate::observability::metrics::{
    get_metrics, OUTCOME_CACHE_HIT, OUTCOME_FETCHED, OUTCOME_REJECTED, OUTCOME_UNCACHED,
};
use crate::transport::adapter::HttpTransport;
use crate::transport::request::{ApiRequest, Payload, Verb};
use crate::transport::response::{ApiResult, ErrorBody};
use crate::utils::constants::{AUTHORIZATION_PREFIX, GRANT_TYPE_CLIENT_CREDENTIALS, TOKEN_CACHE_KEY};

static INVALID_RESPONSE: &str = "invalid_response";

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    /// Logged only; the cache uses its own TTL.
    #[serde(default)]
    expires_in: Option<Value>,
    #[serde(default)]
    application: Option<Value>,
}

/// `Authorization:Bearer <token>` header line.
pub fn bearer_header(token: &str) -> String {
    format!("{}{}", AUTHORIZATION_PREFIX, token)
}

/// Obtains bearer tokens with the client-credentials grant and keeps them in
/// the injected cache for a fixed TTL.
///
/// The cache lookup and the store are two separate operations with no lock
/// around them. Two callers that miss at the same time both fetch a token;
/// both tokens are valid for the provider and the later store wins.
#[derive(Clone)]
pub struct TokenManager {
    token_url: String,
    credentials: Arc<Credentials>,
    transport: HttpTransport,
    cache: Arc<dyn TokenCache>,
    ttl: Duration,
}

impl TokenManager {
    pub fn new(
        base_url: &str,
        credentials: Arc<Credentials>,
        transport: HttpTransport,
        cache: Arc<dyn TokenCache>,
        ttl: Duration,
    ) -> Self {
        Self {
            token_url: format!("{}token", base_url),
            credentials,
            transport,
            cache,
            ttl,
        }
    }

    /// Bearer header line. Uses the cached token unless `force` is set or the
    /// entry has expired.
    pub async fn get_token(&self, force: bool) -> Result<String> {
        let metrics = get_metrics().await;

        if !force {
            if let Some(token) = self.cache.get(TOKEN_CACHE_KEY).await {
                debug!("token: cache hit");
                metrics.token_requests.with_label_values(&[OUTCOME_CACHE_HIT]).inc();
                return Ok(bearer_header(&token));
            }
        }

        let response = self
            .request_grant()
            .await
            .inspect_err(|err| {
                if let EasemobError::Authentication { .. } = err {
                    metrics.token_requests.with_label_values(&[OUTCOME_REJECTED]).inc();
                }
            })?;

        let access_token = response
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                metrics.token_requests.with_label_values(&[OUTCOME_REJECTED]).inc();
                EasemobError::authentication(INVALID_RESPONSE, "token response has no access_token")
            })?;

        if has_application(response.application.as_ref()) {
            self.cache.put(TOKEN_CACHE_KEY, access_token.clone(), self.ttl).await;
            info!(
                "token: fetched, cached for {}s (provider expires_in: {:?})",
                self.ttl.as_secs(),
                response.expires_in
            );
            metrics.token_requests.with_label_values(&[OUTCOME_FETCHED]).inc();
        } else {
            warn!("token: response without 'application', not cached");
            metrics.token_requests.with_label_values(&[OUTCOME_UNCACHED]).inc();
        }

        Ok(bearer_header(&access_token))
    }

    /// Drops the cached token so the next call fetches a new one.
    pub async fn invalidate(&self) {
        debug!("token: invalidated");
        self.cache.remove(TOKEN_CACHE_KEY).await;
    }

    async fn request_grant(&self) -> Result<TokenResponse> {
        let body = TokenRequest {
            grant_type: GRANT_TYPE_CLIENT_CREDENTIALS,
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
        };
        let request = ApiRequest::new(&self.token_url, Verb::Post)
            .header("Content-Type:application/json")
            .payload(Payload::json(&body)?);

        let result = self.transport.execute(request).await?;

        if let Some(ErrorBody { error, error_description }) = result.error_body() {
            error!("token: grant rejected: {} ({})", error, error_description);
            return Err(EasemobError::Authentication { error, error_description });
        }

        match result {
            ApiResult::Json(value) => serde_json::from_value(value).map_err(|err| {
                EasemobError::authentication(INVALID_RESPONSE, err.to_string())
            }),
            ApiResult::Raw(bytes) => Err(EasemobError::authentication(
                INVALID_RESPONSE,
                format!("token endpoint returned {} non-JSON bytes", bytes.len()),
            )),
        }
    }
}

fn has_application(application: Option<&Value>) -> bool {
    match application {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty() && s != "0",
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Bool(present)) => *present,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
    }
}
