use reqwest::multipart::{Form, Part};
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};

use crate::config::settings::TransportConfig;
use crate::error::Result;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::transport::request::{split_header_line, ApiRequest, Payload, Verb};
use crate::transport::response::ApiResult;

static TIMEOUT_MSG: &str = "timeout";
static CONNECT_MSG: &str = "connect";
static ERROR_MSG: &str = "error";

/// Executes one request per call: no retries, no status interpretation.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(cfg: &TransportConfig) -> Result<Self> {
        let user_agent = cfg
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("easemob-client/{}", env!("CARGO_PKG_VERSION")));

        let mut builder = Client::builder()
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.timeout())
            .redirect(Policy::limited(cfg.max_redirects))
            .user_agent(user_agent)
            .gzip(true);

        if cfg.insecure_skip_tls_verify {
            warn!("TLS certificate and hostname verification is DISABLED for the Easemob API");
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self { client: builder.build()? })
    }

    /// Sends `request` and returns the parsed JSON body, or the raw bytes when
    /// the body is not (non-empty) JSON.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResult> {
        Ok(ApiResult::from_bytes(self.execute_raw(request).await?))
    }

    /// Sends `request` and returns the body exactly as received.
    pub async fn execute_raw(&self, request: ApiRequest) -> Result<Vec<u8>> {
        let metrics = get_metrics().await;
        let verb = request.verb;
        let start = get_instant();
        metrics.api_requests.with_label_values(&[verb.as_str()]).inc();

        let builder = self.build(request)?;
        let response = builder.send().await.inspect_err(|err| {
            let reason = if err.is_timeout() {
                TIMEOUT_MSG
            } else if err.is_connect() {
                CONNECT_MSG
            } else {
                ERROR_MSG
            };
            debug!(%verb, error = %err, "request failed");
            metrics.api_request_failures.with_label_values(&[verb.as_str(), reason]).inc();
        })?;

        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await.inspect_err(|err| {
            metrics.api_request_failures.with_label_values(&[verb.as_str(), ERROR_MSG]).inc();
            debug!(%verb, %url, error = %err, "reading body failed");
        })?;

        metrics
            .api_request_duration
            .with_label_values(&[verb.as_str()])
            .observe(start.elapsed().as_secs_f64());
        debug!(%verb, %url, %status, bytes = body.len(), "received response");

        Ok(body.to_vec())
    }

    fn build(&self, request: ApiRequest) -> Result<RequestBuilder> {
        let ApiRequest { url, verb, headers, payload } = request;

        let mut builder = match verb {
            Verb::Get => self.client.get(&url),
            Verb::Post | Verb::Upload => self.client.post(&url),
            Verb::Put => self.client.put(&url),
            Verb::Delete => self.client.delete(&url),
        };

        for line in &headers {
            let (name, value) = split_header_line(line)?;
            builder = builder.header(name, value);
        }

        if verb.carries_body() && !payload.is_empty() {
            builder = match payload {
                Payload::Empty => builder,
                Payload::Bytes(bytes) => builder.body(bytes),
                Payload::Multipart(part) => {
                    let file = Part::bytes(part.bytes).file_name(part.file_name);
                    builder.multipart(Form::new().part(part.field, file))
                }
            };
        }

        debug!(%verb, %url, headers = headers.len(), "sending request");
        Ok(builder)
    }
}
