pub mod error;
pub mod types;

pub use error::{ClientError, Result};
pub use types::{
    CollectionGroupMembership, CollectionPermission, CreateMembership, DeleteMembership, Group,
    Page, PageParams, Pagination, SortDirection,
};
