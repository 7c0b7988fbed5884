use pbi_client::ClientError;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReconcileError>;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Remote call failed while {step}: {source}")]
    RemoteUnavailable {
        step: Step,
        #[source]
        source: ClientError,
    },

    #[error("Capacity not found for {0}")]
    NotFound(CapacityQuery),

    #[error("Workspace {workspace_id} is assigned to capacity {capacity_id}, which is not in the capacity list")]
    AmbiguousRemoteState {
        workspace_id: String,
        capacity_id: String,
    },

    #[error("Workspace {workspace_id} was created, but a later step failed: {source}")]
    PartiallyCreated {
        workspace_id: String,
        #[source]
        source: Box<ReconcileError>,
    },

    #[error("Workspace {0} is not visible on the service")]
    NotVisible(String),

    #[error("Workspace name cannot change from '{current}' to '{desired}'; the workspace must be replaced")]
    RequiresReplacement { current: String, desired: String },

    #[error("Cannot import workspace {0}: it does not exist")]
    ImportTargetMissing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ReconcileError {
    pub(crate) fn remote(step: Step) -> impl FnOnce(ClientError) -> Self {
        move |source| ReconcileError::RemoteUnavailable { step, source }
    }

    /// ID of a workspace that exists remotely even though the operation failed
    pub fn created_workspace_id(&self) -> Option<&str> {
        match self {
            ReconcileError::PartiallyCreated { workspace_id, .. } => Some(workspace_id),
            _ => None,
        }
    }

    /// The sub-step whose remote call failed, looking through partial creates
    pub fn failed_step(&self) -> Option<Step> {
        match self {
            ReconcileError::RemoteUnavailable { step, .. } => Some(*step),
            ReconcileError::PartiallyCreated { source, .. } => source.failed_step(),
            _ => None,
        }
    }
}

/// Remote sub-steps, reported with transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ListCapacities,
    CreateWorkspace,
    GetWorkspace,
    DeleteWorkspace,
    AssignCapacity,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            Step::ListCapacities => "listing capacities",
            Step::CreateWorkspace => "creating the workspace",
            Step::GetWorkspace => "reading the workspace",
            Step::DeleteWorkspace => "deleting the workspace",
            Step::AssignCapacity => "assigning the workspace to a capacity",
        };
        f.write_str(step)
    }
}

/// What a failed capacity lookup was keyed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacityQuery {
    DisplayName(String),
    Id(String),
}

impl fmt::Display for CapacityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityQuery::DisplayName(name) => write!(f, "display name '{}'", name),
            CapacityQuery::Id(id) => write!(f, "ID '{}'", id),
        }
    }
}
