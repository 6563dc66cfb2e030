use {anyhow::Result, clap::Subcommand};

use crate::{Context, output::print_json};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration with the API key redacted.
    Show,
}

pub fn handle_config(ctx: &Context, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let mut config = ctx.config.clone();
            if config.gateway.api_key.is_some() {
                config.gateway.api_key = Some("[REDACTED]".into());
            }
            if let Some(path) = &ctx.config_path {
                eprintln!("config file: {}", path.display());
            }
            print_json(&config)
        },
    }
}
