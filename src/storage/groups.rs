use super::store::{Record, Store};
use crate::connection::{ApiTransport, RpcAction};
use crate::core::{Group, Result};
use serde_json::json;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{Instrument, Level, event, info_span};

impl Record for Group {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Cache of groups seen by any membership response
pub struct GroupsStore {
    store: Store<Group>,
    transport: Arc<dyn ApiTransport>,
}

impl GroupsStore {
    const ACTIONS: &'static [RpcAction] = &[RpcAction::Info, RpcAction::List];

    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            store: Store::new("groups", Self::ACTIONS),
            transport,
        }
    }

    /// Load a single group from the server and cache it
    pub async fn fetch(&self, id: &str) -> Result<Group> {
        self.store.require(RpcAction::Info)?;
        let span = info_span!("groups.fetch", group_id = %id);
        self.apply_fetch(id).instrument(span).await
    }

    async fn apply_fetch(&self, id: &str) -> Result<Group> {
        let _fetching = self.store.fetching();
        let mut res = self.transport.post("/groups.info", json!({ "id": id })).await?;
        let group: Group = res.take_payload("Group data not available")?;
        event!(Level::DEBUG, "group fetched");
        Ok(self.store.add(group).await)
    }
}

impl Deref for GroupsStore {
    type Target = Store<Group>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}
