use super::groups::GroupsStore;
use super::store::{Record, Store};
use crate::connection::{ApiTransport, RpcAction};
use crate::core::{
    ClientError, CollectionGroupMembership, CollectionPermission, CreateMembership,
    DeleteMembership, Group, Page, PageParams, Result,
};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;
use tracing::{Instrument, Level, event, info_span};

pub const GROUP_MEMBERSHIPS_PATH: &str = "/collections.group_memberships";
pub const ADD_GROUP_PATH: &str = "/collections.add_group";
pub const REMOVE_GROUP_PATH: &str = "/collections.remove_group";

/// Page size used by `fetch_all` when the caller sets none
pub const DEFAULT_PAGE_LIMIT: u32 = 25;

const MEMBERSHIP_MISSING: &str = "Membership data should be available";

impl Record for CollectionGroupMembership {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MembershipsPayload {
    #[serde(default)]
    groups: Vec<Group>,
    #[serde(default)]
    collection_group_memberships: Vec<CollectionGroupMembership>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddGroupBody<'a> {
    id: &'a str,
    group_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    permission: Option<CollectionPermission>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveGroupBody<'a> {
    id: &'a str,
    group_id: &'a str,
}

/// Client-side mirror of collection/group membership records
///
/// Network calls go through the shared [`ApiTransport`]; every record the
/// server returns is kept until it is deleted or its collection goes away.
/// Lookups by (collection, group) are linear scans over the cache.
pub struct CollectionGroupMembershipsStore {
    store: Store<CollectionGroupMembership>,
    groups: Arc<GroupsStore>,
    transport: Arc<dyn ApiTransport>,
}

impl CollectionGroupMembershipsStore {
    const ACTIONS: &'static [RpcAction] = &[RpcAction::List, RpcAction::Create, RpcAction::Delete];

    pub fn new(transport: Arc<dyn ApiTransport>, groups: Arc<GroupsStore>) -> Self {
        Self {
            store: Store::new("collection_group_memberships", Self::ACTIONS),
            groups,
            transport,
        }
    }

    pub fn groups(&self) -> &Arc<GroupsStore> {
        &self.groups
    }

    /// Fetch one page of memberships
    ///
    /// Every group in the response is registered with the groups store and
    /// every membership is cached. The returned page carries the server's
    /// pagination metadata. `is_fetching()` is true only while the request
    /// is in flight, whatever the outcome.
    pub async fn fetch_page(&self, params: &PageParams) -> Result<Page<CollectionGroupMembership>> {
        self.store.require(RpcAction::List)?;
        let span = info_span!(
            "collection_group_memberships.fetch_page",
            collection_id = ?params.id,
            offset = ?params.offset,
            limit = ?params.limit
        );

        self.apply_page(params).instrument(span).await
    }

    async fn apply_page(&self, params: &PageParams) -> Result<Page<CollectionGroupMembership>> {
        let _fetching = self.store.fetching();
        let body = serde_json::to_value(params)?;
        let mut res = self.transport.post(GROUP_MEMBERSHIPS_PATH, body).await?;

        let payload: MembershipsPayload = match res.take_payload("Data not available") {
            Ok(payload) => payload,
            Err(err) => {
                event!(Level::ERROR, error = %err, "membership page rejected");
                return Err(err);
            }
        };

        let group_count = payload.groups.len();
        self.groups.add_many(payload.groups).await;
        let records = self.store.add_many(payload.collection_group_memberships).await;
        self.store.set_loaded();

        event!(
            Level::DEBUG,
            groups = group_count,
            memberships = records.len(),
            "membership page applied"
        );
        Ok(Page::new(records, res.pagination.take()))
    }

    /// Fetch pages until the server returns a short one
    ///
    /// A page counts as short against the limit the server reports in its
    /// pagination, which may be lower than the one requested.
    pub async fn fetch_all(&self, params: PageParams) -> Result<Vec<CollectionGroupMembership>> {
        let limit = params.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let mut offset = params.offset.unwrap_or(0);
        let mut all = Vec::new();

        loop {
            let page = self
                .fetch_page(&params.clone().offset(offset).limit(limit))
                .await?;
            let page_limit = page
                .pagination()
                .map(|pagination| pagination.limit)
                .filter(|served| *served > 0)
                .unwrap_or(limit);
            let fetched = page.len() as u32;
            all.extend(page);

            if fetched == 0 || fetched < page_limit {
                break;
            }
            offset += fetched;
        }

        Ok(all)
    }

    /// Add a group to a collection and cache the resulting membership
    pub async fn create(&self, input: CreateMembership) -> Result<CollectionGroupMembership> {
        self.store.require(RpcAction::Create)?;
        let span = info_span!(
            "collection_group_memberships.create",
            collection_id = %input.collection_id,
            group_id = %input.group_id
        );

        self.apply_create(&input).instrument(span).await
    }

    async fn apply_create(&self, input: &CreateMembership) -> Result<CollectionGroupMembership> {
        let body = serde_json::to_value(AddGroupBody {
            id: &input.collection_id,
            group_id: &input.group_id,
            permission: input.permission,
        })?;
        let mut res = self.transport.post(ADD_GROUP_PATH, body).await?;
        let payload: MembershipsPayload = res.take_payload(MEMBERSHIP_MISSING)?;

        if !payload.groups.is_empty() {
            self.groups.add_many(payload.groups).await;
        }
        let created = self
            .store
            .add_many(payload.collection_group_memberships)
            .await
            .into_iter()
            .next()
            .ok_or(ClientError::MissingPayload(MEMBERSHIP_MISSING))?;

        event!(Level::DEBUG, membership_id = %created.id, "membership created");
        Ok(created)
    }

    /// Remove a group from a collection
    ///
    /// The local record, if any, is dropped only after the server accepted
    /// the removal. Returns the record that was dropped.
    pub async fn delete(
        &self,
        input: DeleteMembership,
    ) -> Result<Option<CollectionGroupMembership>> {
        self.store.require(RpcAction::Delete)?;
        let span = info_span!(
            "collection_group_memberships.delete",
            collection_id = %input.collection_id,
            group_id = %input.group_id
        );

        self.apply_delete(&input).instrument(span).await
    }

    async fn apply_delete(
        &self,
        input: &DeleteMembership,
    ) -> Result<Option<CollectionGroupMembership>> {
        let body = serde_json::to_value(RemoveGroupBody {
            id: &input.collection_id,
            group_id: &input.group_id,
        })?;
        self.transport.post(REMOVE_GROUP_PATH, body).await?;

        let removed = match self.find(&input.collection_id, &input.group_id).await {
            Some(membership) => self.store.remove(&membership.id).await,
            None => None,
        };
        event!(Level::DEBUG, removed_locally = removed.is_some(), "membership deleted");
        Ok(removed)
    }

    /// Drop every cached membership of a collection without a server call
    pub async fn remove_collection_memberships(&self, collection_id: &str) -> usize {
        let removed = self
            .store
            .remove_where(|m| m.collection_id == collection_id)
            .await
            .len();
        event!(
            Level::DEBUG,
            collection_id = %collection_id,
            removed,
            "collection memberships evicted"
        );
        removed
    }

    /// First cached membership linking the collection and group
    pub async fn find(
        &self,
        collection_id: &str,
        group_id: &str,
    ) -> Option<CollectionGroupMembership> {
        self.store
            .find_by(|m| m.links(collection_id, group_id))
            .await
    }

    pub async fn in_collection(&self, collection_id: &str) -> Vec<CollectionGroupMembership> {
        self.store
            .filter(|m| m.collection_id == collection_id)
            .await
    }

    pub async fn for_group(&self, group_id: &str) -> Vec<CollectionGroupMembership> {
        self.store.filter(|m| m.group_id == group_id).await
    }
}

impl Deref for CollectionGroupMembershipsStore {
    type Target = Store<CollectionGroupMembership>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}
