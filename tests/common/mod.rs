#![allow(dead_code)]

use async_trait::async_trait;
use collection_memberships::{ApiResponse, ApiTransport, ClientError, Result};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Transport that replays queued responses and records every request
///
/// Once the queue is empty it answers with an empty envelope.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse>>>,
    requests: Mutex<Vec<(String, Value)>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every request waits for `gate` to be notified before answering
    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Self::default()
        })
    }

    pub fn respond(&self, response: ApiResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn respond_data(&self, data: Value) {
        self.respond(ApiResponse::with_data(data));
    }

    pub fn fail(&self, err: ClientError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    async fn post(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), body));

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::default()))
    }
}

pub fn membership(id: &str, collection_id: &str, group_id: &str, permission: &str) -> Value {
    json!({
        "id": id,
        "collectionId": collection_id,
        "groupId": group_id,
        "permission": permission,
    })
}

pub fn group(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "memberCount": 3,
        "createdAt": "2024-05-01T09:30:00Z",
        "updatedAt": "2024-05-02T09:30:00Z",
    })
}
