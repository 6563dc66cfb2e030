use std::sync::Arc;

use {
    anyhow::Result,
    clap::Subcommand,
    switchboard_groups::InstanceDirectory,
    tokio_util::sync::CancellationToken,
    tracing::warn,
};

use crate::{Context, output::print_json};

#[derive(Subcommand)]
pub enum InstanceAction {
    /// List gateway instances.
    List,
    /// Re-read the instance list on an interval until interrupted.
    Watch {
        /// Seconds between refreshes. Defaults to `instances.refresh_interval_secs`.
        #[arg(long)]
        interval: Option<u64>,
    },
}

pub async fn handle_instances(ctx: &Context, action: InstanceAction) -> Result<()> {
    let directory = Arc::new(InstanceDirectory::new(
        Arc::new(ctx.client.clone()),
        ctx.config.instances.stale_after(),
    ));

    match action {
        InstanceAction::List => print_json(&directory.list().await?),
        InstanceAction::Watch { interval } => {
            let interval = interval
                .map(|secs| std::time::Duration::from_secs(secs.max(1)))
                .unwrap_or_else(|| ctx.config.instances.refresh_interval());
            print_json(&directory.list().await?)?;

            let cancel = CancellationToken::new();
            let refresher = directory.spawn_refresh(interval, cancel.clone());
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    _ = ticker.tick() => match directory.list().await {
                        Ok(instances) => print_json(&instances)?,
                        Err(e) => warn!(error = %e, "failed to list instances"),
                    },
                }
            }
            cancel.cancel();
            refresher.await?;
            Ok(())
        },
    }
}
