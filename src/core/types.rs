use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// Access level a group is granted on a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionPermission {
    /// View documents only
    Read,
    /// View and edit documents
    ReadWrite,
    /// Full control, including sharing settings
    Admin,
}

impl CollectionPermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionPermission::Read => "read",
            CollectionPermission::ReadWrite => "read_write",
            CollectionPermission::Admin => "admin",
        }
    }
}

impl fmt::Display for CollectionPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionPermission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(CollectionPermission::Read),
            "read_write" | "readwrite" => Ok(CollectionPermission::ReadWrite),
            "admin" => Ok(CollectionPermission::Admin),
            other => Err(format!("unknown collection permission '{}'", other)),
        }
    }
}

/// Association granting a group a permission level on a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionGroupMembership {
    pub id: String,
    pub collection_id: String,
    pub group_id: String,
    pub permission: CollectionPermission,
}

impl CollectionGroupMembership {
    /// Checks whether this record links the given collection and group
    #[inline]
    pub fn links(&self, collection_id: &str, group_id: &str) -> bool {
        self.collection_id == collection_id && self.group_id == group_id
    }
}

/// Group summary as returned alongside memberships
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Pagination metadata returned next to a page of results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

/// Request parameters for a paged membership fetch
///
/// Unset fields are left out of the request body entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageParams {
    /// Collection to list memberships for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Filter on group name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<CollectionPermission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

impl PageParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a single collection
    pub fn collection(mut self, collection_id: impl Into<String>) -> Self {
        self.id = Some(collection_id.into());
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn permission(mut self, permission: CollectionPermission) -> Self {
        self.permission = Some(permission);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(field.into());
        self.direction = Some(direction);
        self
    }
}

/// Records of one fetched page with the server's pagination attached
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    pagination: Option<Pagination>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Option<Pagination>) -> Self {
        Self { items, pagination }
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Deref for Page<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Body of `collections.add_group`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMembership {
    pub collection_id: String,
    pub group_id: String,
    pub permission: Option<CollectionPermission>,
}

impl CreateMembership {
    pub fn new(collection_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            group_id: group_id.into(),
            permission: None,
        }
    }

    pub fn permission(mut self, permission: CollectionPermission) -> Self {
        self.permission = Some(permission);
        self
    }
}

/// Body of `collections.remove_group`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteMembership {
    pub collection_id: String,
    pub group_id: String,
}

impl DeleteMembership {
    pub fn new(collection_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            group_id: group_id.into(),
        }
    }
}
