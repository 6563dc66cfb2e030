//! Instance group coordination: the cached group view and its mutations,
//! the member invariants checked before any call, balanced dispatch and the
//! instance directory.

pub mod dispatch;
pub mod filter;
pub mod instances;
pub mod service;
pub mod validate;

pub use {
    dispatch::{BalancedDispatcher, SendText, validate_send},
    filter::GroupFilter,
    instances::{INSTANCES_COLLECTION, InstanceDirectory},
    service::{GROUPS_COLLECTION, InstanceGroupService},
};
