//! Wire types shared by the gateway client and the coordinators.
//!
//! Field names follow the gateway's JSON (camelCase). Nothing in here talks to
//! the network or holds state.

pub mod group;
pub mod instance;
pub mod message;
pub mod session;

pub use {
    group::{Ack, CreateInstanceGroup, InstanceGroup, MemberRequest, UpdateInstanceGroup},
    instance::Instance,
    message::{BalancedSendRequest, SendReceipt},
    session::{Integration, IntegrationSession, SessionScope, SessionStatus, TargetStatus},
};

/// Header carrying the API credential on every request.
pub const API_KEY_HEADER: &str = "apikey";
