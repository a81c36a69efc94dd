use super::config::ApiConfig;
use super::{ApiResponse, ApiTransport};
use crate::core::{ClientError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{Instrument, Level, event, info_span};

/// Error body the server sends with non-2xx responses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// `ApiTransport` over HTTP(S) using reqwest
pub struct HttpTransport {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpTransport {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone());
        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn send(&self, path: &str, body: JsonValue) -> Result<ApiResponse> {
        let url = self.config.endpoint(path);
        let mut request = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&body);
        if let Some(token) = &self.config.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(api_error(status, &text));
        }

        // Empty bodies (204 and friends) are treated as "no data".
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(ApiResponse::default());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn post(&self, path: &str, body: JsonValue) -> Result<ApiResponse> {
        let span = info_span!("api.post", path = %path);
        async move {
            match self.send(path, body).await {
                Ok(response) => {
                    event!(
                        Level::DEBUG,
                        has_data = response.data.is_some(),
                        "api request completed"
                    );
                    Ok(response)
                }
                Err(err) => {
                    event!(Level::WARN, error = %err, "api request failed");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Map a non-2xx response to `ClientError::Api`
///
/// A JSON `{ error, message }` body wins; a plain-text body becomes the
/// message; anything missing falls back to the status reason.
fn api_error(status: reqwest::StatusCode, body: &str) -> ClientError {
    let reason = status.canonical_reason().unwrap_or("request failed");
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let (code, message) = match parsed {
        Some(parsed) => (parsed.error, parsed.message),
        None => {
            let text = body.trim();
            (None, (!text.is_empty()).then(|| text.to_string()))
        }
    };

    ClientError::Api {
        status: status.as_u16(),
        code: code.unwrap_or_else(|| reason.to_ascii_lowercase().replace(' ', "_")),
        message: message.unwrap_or_else(|| reason.to_string()),
    }
}
