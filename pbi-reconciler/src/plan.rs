//! Drift detection between desired and observed workspace state
//!
//! [`plan`] is a pure function: it only compares values, so every branch is
//! testable without a remote service.

use crate::state::{DesiredWorkspace, WorkspaceState};
use serde::Serialize;

/// Action needed to bring a workspace in line with its desired state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Plan {
    /// Observed state already matches
    Noop,
    /// Nothing is tracked, or the tracked workspace disappeared
    Create,
    /// Only the capacity assignment differs
    UpdateCapacity { from: String, to: String },
    /// The name differs; names are create-time only, so delete and create
    Replace { from: String, to: String },
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        matches!(self, Plan::Noop)
    }
}

pub fn plan(observed: Option<&WorkspaceState>, desired: &DesiredWorkspace) -> Plan {
    let Some(observed) = observed else {
        return Plan::Create;
    };

    if observed.name != desired.name {
        return Plan::Replace {
            from: observed.name.clone(),
            to: desired.name.clone(),
        };
    }

    if observed.capacity_display_name != desired.capacity() {
        return Plan::UpdateCapacity {
            from: observed.capacity_display_name.clone(),
            to: desired.capacity().to_string(),
        };
    }

    Plan::Noop
}
