mod config_commands;
mod group_commands;
mod instance_commands;
mod output;
mod session_commands;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context as _,
    clap::{Parser, Subcommand},
    switchboard_client::HttpGatewayClient,
    switchboard_config::SwitchboardConfig,
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::output::ConsoleNotifier;

#[derive(Parser)]
#[command(name = "switchboard", about = "Switchboard: instance groups and integration sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file. Standard locations are searched when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Gateway base URL, overriding the config file.
    #[arg(long, global = true, env = "SWITCHBOARD_URL")]
    url: Option<String>,

    /// Gateway API key, overriding the config file.
    #[arg(long, global = true, env = "SWITCHBOARD_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Instance group management.
    Groups {
        #[command(subcommand)]
        action: group_commands::GroupAction,
    },
    /// Send a text through a group, letting the gateway pick the instance.
    Send(group_commands::SendArgs),
    /// Integration session management.
    Sessions {
        #[command(subcommand)]
        action: session_commands::SessionAction,
    },
    /// Gateway instances.
    Instances {
        #[command(subcommand)]
        action: instance_commands::InstanceAction,
    },
    /// Configuration.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

/// Everything a command needs to reach the gateway.
pub(crate) struct Context {
    pub config: SwitchboardConfig,
    /// File the config was read from, if any.
    pub config_path: Option<PathBuf>,
    pub client: HttpGatewayClient,
    pub notifier: Arc<ConsoleNotifier>,
}

impl Context {
    fn load(cli: &Cli) -> anyhow::Result<Self> {
        let config = resolve_config(cli)?;
        let client = HttpGatewayClient::from_config(&config.gateway)
            .context("failed to build gateway client")?;
        debug!(
            base_url = client.base_url(),
            authenticated = client.has_api_key(),
            "gateway client ready"
        );
        let config_path = cli
            .config
            .clone()
            .or_else(switchboard_config::loader::find_config_file);
        Ok(Self {
            config,
            config_path,
            client,
            notifier: Arc::new(ConsoleNotifier),
        })
    }
}

/// File (explicit or discovered) first, then command-line and environment
/// overrides.
fn resolve_config(cli: &Cli) -> anyhow::Result<SwitchboardConfig> {
    let mut config = match &cli.config {
        Some(path) => switchboard_config::load_config(path)?,
        None => switchboard_config::discover_and_load(),
    };
    if let Some(url) = &cli.url {
        config.gateway.base_url = url.clone();
    }
    if let Some(key) = &cli.api_key {
        config.gateway.api_key = Some(key.clone());
    }
    Ok(config)
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "switchboard starting");

    let ctx = Context::load(&cli)?;
    match cli.command {
        Commands::Groups { action } => group_commands::handle_groups(&ctx, action).await,
        Commands::Send(args) => group_commands::handle_send(&ctx, args).await,
        Commands::Sessions { action } => session_commands::handle_sessions(&ctx, action).await,
        Commands::Instances { action } => instance_commands::handle_instances(&ctx, action).await,
        Commands::Config { action } => config_commands::handle_config(&ctx, action),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[gateway]\nbase_url = \"http://file:8080\"\napi_key = \"from-file\"\n\n[instances]\nstale_after_secs = 9"
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from([
            "switchboard",
            "--config",
            path,
            "--url",
            "http://flag:9090",
            "config",
            "show",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.gateway.base_url, "http://flag:9090");
        assert_eq!(config.gateway.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.instances.stale_after_secs, 9);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from([
            "switchboard",
            "--config",
            "/nonexistent/switchboard.toml",
            "config",
            "show",
        ])
        .unwrap();
        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "switchboard",
            "groups",
            "list",
            "--search",
            "sales",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(cli.command, Commands::Groups { .. }));
    }
}
