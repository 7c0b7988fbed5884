// Command handlers

use crate::cli::{Args, CapacitySubcommand, Command, WorkspaceSubcommand};
use crate::config::{load_desired, Config};
use anyhow::{Context, Result};
use pbi_client::HttpClient;
use pbi_reconciler::{DesiredWorkspace, ReadOutcome, ReconcileError, WorkspaceReconciler};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Main command dispatcher
pub async fn execute_command(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    debug!(api_url = %config.api_url, "Configuration loaded");

    let client = HttpClient::new(config.client_config()?).context("Failed to create HTTP client")?;
    let reconciler = WorkspaceReconciler::new(Arc::new(client));

    match args.command {
        Command::Capacity { command } => handle_capacity(&reconciler, command).await,
        Command::Workspace { command } => handle_workspace(&reconciler, command).await,
    }
}

async fn handle_capacity(reconciler: &WorkspaceReconciler, command: CapacitySubcommand) -> Result<()> {
    let capacities = reconciler.capacities();
    match command {
        CapacitySubcommand::List => print_json(&capacities.list().await?),
        CapacitySubcommand::Show { name } => print_json(&capacities.lookup(&name).await?),
    }
}

async fn handle_workspace(
    reconciler: &WorkspaceReconciler,
    command: WorkspaceSubcommand,
) -> Result<()> {
    match command {
        WorkspaceSubcommand::Create { name, capacity } => {
            let desired = desired(name, capacity);
            let state = reconciler.create(&desired).await.map_err(report_partial)?;
            print_json(&state)
        }
        WorkspaceSubcommand::Read { id } => match reconciler.read(&id).await? {
            ReadOutcome::Present(state) => print_json(&state),
            ReadOutcome::Absent => {
                warn!(workspace_id = %id, "Workspace does not exist");
                print_json(&serde_json::Value::Null)
            }
        },
        WorkspaceSubcommand::Update { id, name, capacity } => {
            let mut state = reconciler
                .read(&id)
                .await?
                .into_state()
                .with_context(|| format!("Workspace {id} does not exist"))?;
            reconciler
                .update(&mut state, &desired(name, capacity))
                .await?;
            print_json(&state)
        }
        WorkspaceSubcommand::Delete { id } => {
            reconciler.delete(&id).await?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        WorkspaceSubcommand::Import { id } => print_json(&reconciler.import(&id).await?),
        WorkspaceSubcommand::Apply { file, id } => {
            let desired = load_desired(&file)?;
            let applied = reconciler
                .apply(id.as_deref(), &desired)
                .await
                .map_err(report_partial)?;
            print_json(&applied)
        }
    }
}

fn desired(name: String, capacity: Option<String>) -> DesiredWorkspace {
    DesiredWorkspace {
        name,
        capacity_display_name: capacity,
    }
}

/// Make sure a workspace left behind by a failed create is visible to the user
fn report_partial(err: ReconcileError) -> anyhow::Error {
    if let Some(id) = err.created_workspace_id() {
        warn!(workspace_id = %id, "Workspace was created but not fully configured");
    }
    err.into()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{rendered}");
    Ok(())
}
