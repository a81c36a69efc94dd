pub mod groups;
pub mod memberships;
pub mod store;

pub use groups::GroupsStore;
pub use memberships::CollectionGroupMembershipsStore;
pub use store::{FetchingGuard, Record, Store};
