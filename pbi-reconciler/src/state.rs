//! Desired and observed workspace state

use crate::error::{ReconcileError, Result};
use serde::{Deserialize, Serialize};

/// Workspace attributes as declared by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredWorkspace {
    /// Fixed at creation; a different name means a different workspace
    pub name: String,

    /// Display name of the capacity to run on; `None` or empty means no capacity
    #[serde(default, alias = "capacity", skip_serializing_if = "Option::is_none")]
    pub capacity_display_name: Option<String>,
}

impl DesiredWorkspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capacity_display_name: None,
        }
    }

    pub fn with_capacity(mut self, display_name: impl Into<String>) -> Self {
        self.capacity_display_name = Some(display_name.into());
        self
    }

    /// Desired capacity display name, empty when none is wanted
    pub fn capacity(&self) -> &str {
        self.capacity_display_name.as_deref().unwrap_or_default()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ReconcileError::InvalidInput(
                "workspace name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Workspace attributes as last observed on the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceState {
    pub id: String,
    pub name: String,

    /// Capacity ID reported by the last read; `None` after an assignment until
    /// the next read re-resolves it
    pub capacity_id: Option<String>,

    /// Display name of the assigned capacity, empty when unassigned
    pub capacity_display_name: String,
}

/// Outcome of reading a workspace by ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Present(WorkspaceState),
    /// The service does not know the ID; the caller should drop its identity
    Absent,
}

impl ReadOutcome {
    pub fn is_absent(&self) -> bool {
        matches!(self, ReadOutcome::Absent)
    }

    pub fn into_state(self) -> Option<WorkspaceState> {
        match self {
            ReadOutcome::Present(state) => Some(state),
            ReadOutcome::Absent => None,
        }
    }
}
