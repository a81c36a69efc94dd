// ============================================================================
// Collection Memberships Library
// ============================================================================

pub mod core;
pub mod connection;
pub mod storage;
pub mod facade;

// Re-export main types for convenience
pub use crate::core::{
    ClientError, CollectionGroupMembership, CollectionPermission, CreateMembership,
    DeleteMembership, Group, Page, PageParams, Pagination, Result, SortDirection,
};
pub use facade::RootStore;

// Re-export connection API
pub use connection::{
    ApiResponse, ApiTransport, RpcAction,
    config::ApiConfig,
    http::HttpTransport,
};

// Re-export stores
pub use storage::{CollectionGroupMembershipsStore, GroupsStore, Record, Store};
