//! Gateway instance listing with a bounded staleness and a background
//! refresh loop.

use std::{sync::Arc, time::Duration};

use {
    serde_json::Value,
    switchboard_client::InstanceApi,
    switchboard_common::{Invalidation, QueryCache, QueryKey, Result},
    switchboard_protocol::Instance,
    tokio::{task::JoinHandle, time::MissedTickBehavior},
    tokio_util::sync::CancellationToken,
    tracing::{debug, warn},
};

pub const INSTANCES_COLLECTION: &str = "instances";

fn instances_key() -> QueryKey {
    QueryKey::new(INSTANCES_COLLECTION, "fetchInstances", Value::Null)
}

pub struct InstanceDirectory {
    api: Arc<dyn InstanceApi>,
    cache: QueryCache<Vec<Instance>>,
}

impl InstanceDirectory {
    pub fn new(api: Arc<dyn InstanceApi>, stale_after: Duration) -> Self {
        Self {
            api,
            cache: QueryCache::with_stale_after(stale_after),
        }
    }

    /// Cached listing, re-read once it is older than the stale bound.
    pub async fn list(&self) -> Result<Vec<Instance>> {
        let api = Arc::clone(&self.api);
        self.cache
            .get_or_fetch(instances_key(), || async move { api.fetch_instances().await })
            .await
            .map_err(|e| e.into_remote("failed to fetch instances"))
    }

    /// Unconditional re-read.
    pub async fn refresh(&self) -> Result<Vec<Instance>> {
        let api = Arc::clone(&self.api);
        self.cache
            .refetch(instances_key(), || async move { api.fetch_instances().await })
            .await
            .map_err(|e| e.into_remote("failed to fetch instances"))
    }

    /// Re-read only if the cached listing has gone stale.
    pub async fn on_focus_regained(&self) -> Result<Vec<Instance>> {
        self.list().await
    }

    pub async fn invalidate(&self) {
        self.cache
            .invalidate(&Invalidation::collection(INSTANCES_COLLECTION))
            .await;
    }

    /// Re-read every `interval` until `cancel` fires. Failures are logged and
    /// the loop keeps going.
    pub fn spawn_refresh(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let directory = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        debug!("instance refresh stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        match directory.refresh().await {
                            Ok(instances) => debug!(count = instances.len(), "instances refreshed"),
                            Err(e) => warn!(error = %e, "instance refresh failed"),
                        }
                    }
                }
            }
        })
    }
}
