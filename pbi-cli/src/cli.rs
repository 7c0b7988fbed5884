// CLI argument parsing and definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "pbi")]
#[command(about = "Reconcile Power BI workspaces and capacity assignments")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a configuration file (defaults to <config dir>/pbi/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Look up capacities
    Capacity {
        #[command(subcommand)]
        command: CapacitySubcommand,
    },
    /// Manage workspaces
    Workspace {
        #[command(subcommand)]
        command: WorkspaceSubcommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum CapacitySubcommand {
    /// List every capacity visible to the caller
    List,
    /// Show the ID of the capacity with this display name
    Show {
        /// Capacity display name (case-sensitive)
        name: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum WorkspaceSubcommand {
    /// Create a workspace
    Create {
        /// Workspace name
        #[arg(long)]
        name: String,
        /// Display name of the capacity to assign
        #[arg(long)]
        capacity: Option<String>,
    },
    /// Show the observed state of a workspace (prints null if it does not exist)
    Read {
        /// Workspace ID
        id: String,
    },
    /// Change the capacity assignment of a workspace
    Update {
        /// Workspace ID
        id: String,
        /// Workspace name; must match the current name
        #[arg(long)]
        name: String,
        /// Display name of the capacity to assign (omit to unassign)
        #[arg(long)]
        capacity: Option<String>,
    },
    /// Delete a workspace
    Delete {
        /// Workspace ID
        id: String,
    },
    /// Adopt an existing workspace by ID
    Import {
        /// Workspace ID
        id: String,
    },
    /// Converge a workspace on the state declared in a file
    Apply {
        /// YAML file with `name` and optional `capacity`
        #[arg(short, long)]
        file: PathBuf,
        /// ID of the workspace managed by a previous apply
        #[arg(long)]
        id: Option<String>,
    },
}
