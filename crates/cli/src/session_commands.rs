use std::sync::Arc;

use {
    anyhow::Result,
    clap::{Args, Subcommand},
    secrecy::Secret,
    serde_json::json,
    switchboard_common::Error,
    switchboard_protocol::{Integration, IntegrationSession, SessionScope, TargetStatus},
    switchboard_sessions::IntegrationSessionService,
};

use crate::{Context, output::print_json};

#[derive(Args)]
pub struct ScopeArgs {
    /// n8n, typebot, dify, evolutionBot, flowise, openai or evoai.
    #[arg(long)]
    integration: Integration,
    #[arg(long)]
    bot_id: String,
    /// Instance the bot runs on.
    #[arg(long)]
    instance: String,
    /// Token of that instance. The global API key is used when omitted.
    #[arg(long, env = "SWITCHBOARD_INSTANCE_TOKEN", hide_env_values = true)]
    instance_token: Option<String>,
}

impl ScopeArgs {
    fn scope(&self) -> SessionScope {
        SessionScope {
            integration: self.integration,
            bot_id: self.bot_id.clone(),
            instance_name: self.instance.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// List sessions of one integration bot.
    List {
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Show the status changes a session currently allows.
    Actions {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long)]
        remote_jid: String,
    },
    /// Change a session's status, or delete it.
    Transition {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long)]
        remote_jid: String,
        /// opened, paused, closed or delete.
        #[arg(long)]
        status: TargetStatus,
    },
}

pub async fn handle_sessions(ctx: &Context, action: SessionAction) -> Result<()> {
    match action {
        SessionAction::List { scope } => {
            let service = service(ctx, &scope);
            print_json(&service.list(&scope.scope()).await?)
        },
        SessionAction::Actions { scope, remote_jid } => {
            let service = service(ctx, &scope);
            let session = find_session(&service, &scope.scope(), &remote_jid).await?;
            print_json(&json!({
                "remoteJid": session.remote_jid,
                "status": session.status,
                "actions": service.available_actions(&session),
            }))
        },
        SessionAction::Transition {
            scope,
            remote_jid,
            status,
        } => {
            let service = service(ctx, &scope);
            let scope = scope.scope();
            let session = find_session(&service, &scope, &remote_jid).await?;
            print_json(&service.transition(&scope, &session, status).await?)
        },
    }
}

fn service(ctx: &Context, scope: &ScopeArgs) -> IntegrationSessionService {
    let client = match &scope.instance_token {
        Some(token) => ctx.client.with_api_key(Some(Secret::new(token.clone()))),
        None => ctx.client.clone(),
    };
    IntegrationSessionService::new(Arc::new(client), ctx.notifier.clone())
}

async fn find_session(
    service: &IntegrationSessionService,
    scope: &SessionScope,
    remote_jid: &str,
) -> Result<IntegrationSession> {
    service
        .list(scope)
        .await?
        .into_iter()
        .find(|s| s.remote_jid == remote_jid)
        .ok_or_else(|| Error::NotFound(format!("session {remote_jid}")).into())
}
