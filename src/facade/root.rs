use crate::connection::ApiTransport;
use crate::connection::config::ApiConfig;
use crate::connection::http::HttpTransport;
use crate::core::Result;
use crate::storage::{CollectionGroupMembershipsStore, GroupsStore};
use std::sync::Arc;
use tracing::{Level, event};

/// Owns every store and the transport they share
///
/// Other parts of an application hold a `RootStore` and reach the individual
/// stores through it, so cross-store updates (a group registered by a
/// membership fetch, memberships evicted by a collection deletion) land in
/// the same caches everyone reads.
pub struct RootStore {
    transport: Arc<dyn ApiTransport>,
    groups: Arc<GroupsStore>,
    collection_group_memberships: CollectionGroupMembershipsStore,
}

impl RootStore {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        let groups = Arc::new(GroupsStore::new(Arc::clone(&transport)));
        let collection_group_memberships =
            CollectionGroupMembershipsStore::new(Arc::clone(&transport), Arc::clone(&groups));
        Self {
            transport,
            groups,
            collection_group_memberships,
        }
    }

    /// Build a root store talking HTTP to the configured server
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use collection_memberships::{ApiConfig, RootStore, PageParams};
    /// # async fn run() -> collection_memberships::Result<()> {
    /// let config = ApiConfig::from_url("https://docs.example.com")?.token("api-token");
    /// let root = RootStore::connect(config)?;
    ///
    /// let page = root
    ///     .collection_group_memberships()
    ///     .fetch_page(&PageParams::new().collection("collection-id"))
    ///     .await?;
    /// println!("{} memberships", page.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn connect(config: ApiConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(Arc::new(transport)))
    }

    pub fn transport(&self) -> &Arc<dyn ApiTransport> {
        &self.transport
    }

    pub fn groups(&self) -> &Arc<GroupsStore> {
        &self.groups
    }

    pub fn collection_group_memberships(&self) -> &CollectionGroupMembershipsStore {
        &self.collection_group_memberships
    }

    /// Keep caches consistent after a collection was deleted elsewhere
    pub async fn collection_deleted(&self, collection_id: &str) -> usize {
        self.collection_group_memberships
            .remove_collection_memberships(collection_id)
            .await
    }

    /// Empty every store, e.g. on logout
    pub async fn clear(&self) {
        self.collection_group_memberships.clear().await;
        self.groups.clear().await;
        event!(Level::INFO, "stores cleared");
    }
}
