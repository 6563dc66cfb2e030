use std::sync::Arc;

use {
    serde_json::json,
    switchboard_client::IntegrationSessionApi,
    switchboard_common::{Error, Invalidation, Notifier, QueryCache, QueryKey, Result},
    switchboard_protocol::{Ack, IntegrationSession, SessionScope, TargetStatus},
    tracing::{error, info, warn},
};

use crate::status::{is_legal, legal_transitions};

pub const SESSIONS_COLLECTION: &str = "sessions";

fn sessions_key(scope: &SessionScope) -> QueryKey {
    QueryKey::new(
        SESSIONS_COLLECTION,
        "fetchSessions",
        json!({
            "integration": scope.integration.path_segment(),
            "botId": scope.bot_id,
            "instanceName": scope.instance_name,
        }),
    )
}

/// Session lists per integration bot, and the status changes applied to them.
pub struct IntegrationSessionService {
    api: Arc<dyn IntegrationSessionApi>,
    notifier: Arc<dyn Notifier>,
    cache: QueryCache<Vec<IntegrationSession>>,
}

impl IntegrationSessionService {
    pub fn new(api: Arc<dyn IntegrationSessionApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            cache: QueryCache::new(),
        }
    }

    pub async fn list(&self, scope: &SessionScope) -> Result<Vec<IntegrationSession>> {
        let api = Arc::clone(&self.api);
        let owned = scope.clone();
        self.cache
            .get_or_fetch(sessions_key(scope), || async move {
                api.fetch_sessions(&owned).await
            })
            .await
            .map_err(|e| e.into_remote("failed to fetch sessions"))
    }

    pub async fn refresh(&self, scope: &SessionScope) -> Result<Vec<IntegrationSession>> {
        let api = Arc::clone(&self.api);
        let owned = scope.clone();
        self.cache
            .refetch(sessions_key(scope), || async move {
                api.fetch_sessions(&owned).await
            })
            .await
            .map_err(|e| e.into_remote("failed to fetch sessions"))
    }

    /// The actions a presentation layer may offer for `session`.
    pub fn available_actions(&self, session: &IntegrationSession) -> Vec<TargetStatus> {
        legal_transitions(session.status)
    }

    /// Apply one status change and re-read the list once the gateway has
    /// confirmed it. Nothing is changed locally before confirmation.
    pub async fn transition(
        &self,
        scope: &SessionScope,
        session: &IntegrationSession,
        target: TargetStatus,
    ) -> Result<Ack> {
        if !is_legal(session.status, target) {
            error!(
                remote_jid = %session.remote_jid,
                from = %session.status,
                to = %target,
                "illegal session transition requested"
            );
            return Err(Error::InvalidTransition {
                from: session.status.to_string(),
                to: target.to_string(),
            });
        }

        let ack = match self
            .api
            .change_session_status(scope, &session.remote_jid, target)
            .await
        {
            Ok(ack) => ack,
            Err(err) => {
                warn!(
                    integration = %scope.integration,
                    remote_jid = %session.remote_jid,
                    to = %target,
                    status = ?err.status(),
                    error = %err,
                    "session transition failed"
                );
                let err = err.into_remote("failed to change session status");
                self.notifier.error(&err.to_string());
                return Err(err);
            },
        };

        info!(
            integration = %scope.integration,
            remote_jid = %session.remote_jid,
            from = %session.status,
            to = %target,
            "session transition applied"
        );
        self.notifier.success(&match target {
            TargetStatus::Delete => "session deleted".to_string(),
            other => format!("session {other}"),
        });

        self.cache
            .invalidate(&Invalidation::Key(sessions_key(scope)))
            .await;
        if let Err(e) = self.refresh(scope).await {
            warn!(error = %e, "session list refresh after transition failed");
        }
        Ok(ack)
    }
}
