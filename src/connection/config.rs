use crate::core::{ClientError, Result};
use std::time::Duration;

pub const ENV_API_URL: &str = "MEMBERSHIPS_API_URL";
pub const ENV_API_TOKEN: &str = "MEMBERSHIPS_API_TOKEN";
pub const ENV_API_TIMEOUT_SECS: &str = "MEMBERSHIPS_API_TIMEOUT_SECS";

/// API client configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server origin, e.g. `https://docs.example.com`
    pub base_url: String,

    /// Path prepended to every RPC method
    pub api_prefix: String,

    /// Bearer token sent with every request
    pub token: Option<String>,

    /// Request timeout
    pub timeout: Duration,

    pub user_agent: String,

    /// Honour `HTTP(S)_PROXY` environment settings
    pub use_env_proxy: bool,
}

impl ApiConfig {
    /// Create a configuration for the given server origin
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_prefix: "/api".to_string(),
            token: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("collection-memberships/{}", env!("CARGO_PKG_VERSION")),
            use_env_proxy: true,
        }
    }

    /// Set the API token
    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Connect directly, ignoring proxy environment variables
    pub fn no_proxy(mut self) -> Self {
        self.use_env_proxy = false;
        self
    }

    /// Set the RPC path prefix (`/api` by default, empty string for none)
    pub fn api_prefix(mut self, prefix: &str) -> Self {
        self.api_prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    /// Parse and validate a server origin
    ///
    /// # Examples
    ///
    /// ```
    /// # use collection_memberships::ApiConfig;
    /// let config = ApiConfig::from_url("https://docs.example.com/").unwrap();
    /// assert_eq!(config.base_url, "https://docs.example.com");
    /// ```
    pub fn from_url(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ClientError::Config("API URL must not be empty".to_string()));
        }

        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .ok_or_else(|| {
                ClientError::Config(format!("API URL '{}' must start with http:// or https://", url))
            })?;

        if rest.trim_end_matches('/').is_empty() {
            return Err(ClientError::Config(format!("API URL '{}' has no host", url)));
        }

        Ok(Self::new(url))
    }

    /// Load configuration from `MEMBERSHIPS_API_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_API_URL)
            .ok_or_else(|| ClientError::Config(format!("{} is not set", ENV_API_URL)))?;
        let mut config = Self::from_url(&url)?;

        if let Some(token) = lookup(ENV_API_TOKEN).filter(|t| !t.trim().is_empty()) {
            config = config.token(token.trim());
        }

        if let Some(raw) = lookup(ENV_API_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                ClientError::Config(format!("invalid {}='{}'", ENV_API_TIMEOUT_SECS, raw))
            })?;
            config = config.timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Full URL for an RPC method path such as `/collections.add_group`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}/{}", self.base_url, self.api_prefix, path.trim_start_matches('/'))
    }
}
