//! Pieces shared by every coordinator: the error taxonomy, the notification
//! sink and the read-through query cache.

pub mod cache;
pub mod error;
pub mod notify;

pub use {
    cache::{Invalidation, QueryCache, QueryKey},
    error::{Error, Invalid, Result},
    notify::{LogNotifier, Notification, Notifier, RecordingNotifier},
};
