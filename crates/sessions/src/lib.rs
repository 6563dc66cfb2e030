//! Integration session lifecycle: which status changes are legal and how a
//! change is applied against the gateway.

pub mod service;
pub mod status;

pub use {
    service::{IntegrationSessionService, SESSIONS_COLLECTION},
    status::{is_legal, legal_transitions},
};
