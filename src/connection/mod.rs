pub mod config;
pub mod http;

use crate::core::{ClientError, Pagination, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// RPC actions a store may expose against its resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcAction {
    Info,
    List,
    Create,
    Update,
    Delete,
}

impl RpcAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcAction::Info => "info",
            RpcAction::List => "list",
            RpcAction::Create => "create",
            RpcAction::Update => "update",
            RpcAction::Delete => "delete",
        }
    }
}

/// Envelope of every successful RPC response
///
/// `data` is kept as raw JSON so each store decodes the shape it expects.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub data: Option<JsonValue>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl ApiResponse {
    pub fn with_data(data: JsonValue) -> Self {
        Self {
            data: Some(data),
            pagination: None,
        }
    }

    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Takes and decodes the `data` payload
    ///
    /// Fails with `MissingPayload(missing)` when the server sent no data.
    pub fn take_payload<T: DeserializeOwned>(&mut self, missing: &'static str) -> Result<T> {
        let data = self
            .data
            .take()
            .filter(|value| !value.is_null())
            .ok_or(ClientError::MissingPayload(missing))?;
        Ok(serde_json::from_value(data)?)
    }
}

/// Request/response channel to the API server
///
/// Stores only talk to the server through this trait; `HttpTransport` is the
/// production implementation.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// POST a JSON body to an RPC method path such as `/collections.add_group`
    async fn post(&self, path: &str, body: JsonValue) -> Result<ApiResponse>;
}
