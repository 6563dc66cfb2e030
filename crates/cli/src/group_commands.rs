use std::{collections::HashSet, sync::Arc};

use {
    anyhow::Result,
    clap::{Args, Subcommand},
    switchboard_groups::{BalancedDispatcher, GroupFilter, InstanceGroupService, SendText},
    switchboard_protocol::{CreateInstanceGroup, UpdateInstanceGroup},
};

use crate::{Context, output::print_json};

#[derive(Subcommand)]
pub enum GroupAction {
    /// List instance groups.
    List {
        /// Case-insensitive match on name or description.
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        enabled_only: bool,
    },
    /// Show one group.
    Get { id: String },
    /// Create a group.
    Create {
        #[arg(long)]
        name: String,
        /// Routing key used for balanced sends.
        #[arg(long)]
        alias: String,
        #[arg(long)]
        description: Option<String>,
        /// Create the group disabled.
        #[arg(long)]
        disabled: bool,
        /// Member instance (repeatable).
        #[arg(short, long = "instance")]
        instances: Vec<String>,
    },
    /// Update fields of a group. Omitted fields are left untouched.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        alias: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        enabled: Option<bool>,
        /// Replace the member set (repeatable).
        #[arg(short, long = "instance")]
        instances: Vec<String>,
    },
    /// Delete a group.
    Delete { id: String },
    /// Add a member instance.
    AddInstance { id: String, instance: String },
    /// Remove a member instance. The last member cannot be removed.
    RemoveInstance { id: String, instance: String },
}

#[derive(Args)]
pub struct SendArgs {
    /// Group alias.
    #[arg(long)]
    alias: String,
    /// Recipient number, digits only.
    #[arg(long)]
    number: String,
    #[arg(long)]
    text: String,
    /// Delay before sending, in milliseconds.
    #[arg(long, allow_negative_numbers = true)]
    delay: Option<i64>,
    #[arg(long)]
    mentions_every_one: bool,
    /// Mentioned number (repeatable).
    #[arg(long = "mention")]
    mentioned: Vec<String>,
}

pub async fn handle_groups(ctx: &Context, action: GroupAction) -> Result<()> {
    let service = InstanceGroupService::new(Arc::new(ctx.client.clone()), ctx.notifier.clone());

    match action {
        GroupAction::List {
            search,
            enabled_only,
        } => {
            let filter = GroupFilter {
                search,
                enabled_only,
            };
            print_json(&service.list(Some(&filter)).await?)
        },
        GroupAction::Get { id } => print_json(&service.get(&id).await?),
        GroupAction::Create {
            name,
            alias,
            description,
            disabled,
            instances,
        } => {
            let mut spec = CreateInstanceGroup::new(name, alias, normalize_instances(instances))
                .with_enabled(!disabled);
            spec.description = description;
            print_json(&service.create(&spec).await?)
        },
        GroupAction::Update {
            id,
            name,
            alias,
            description,
            enabled,
            instances,
        } => {
            let patch = UpdateInstanceGroup {
                name,
                alias,
                description,
                enabled,
                instances: (!instances.is_empty()).then(|| normalize_instances(instances)),
            };
            if patch.is_empty() {
                anyhow::bail!("nothing to update");
            }
            print_json(&service.update(&id, &patch).await?)
        },
        GroupAction::Delete { id } => print_json(&service.delete(&id).await?),
        GroupAction::AddInstance { id, instance } => {
            print_json(&service.add_instance(&id, instance.trim()).await?)
        },
        GroupAction::RemoveInstance { id, instance } => {
            print_json(&service.remove_instance(&id, instance.trim()).await?)
        },
    }
}

pub async fn handle_send(ctx: &Context, args: SendArgs) -> Result<()> {
    let dispatcher = BalancedDispatcher::new(Arc::new(ctx.client.clone()), ctx.notifier.clone());
    let send = SendText {
        number: args.number,
        text: args.text,
        delay_ms: args.delay,
        mentions_every_one: args.mentions_every_one,
        mentioned: args.mentioned,
    };
    print_json(&dispatcher.send(&args.alias, send).await?)
}

/// Trim names, drop blanks and keep the first occurrence of each name.
fn normalize_instances(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}
