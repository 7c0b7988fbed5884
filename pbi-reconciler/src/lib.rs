//! Workspace reconciliation for the Power BI control plane
//!
//! This crate holds the lifecycle logic for Power BI workspaces: create, read,
//! update, delete, import, and converging on a declared desired state. It
//! resolves capacity display names to IDs through [`CapacityResolver`] and talks
//! to the service only through an injected [`pbi_client::PowerBiApi`].
//!
//! The service is the only source of truth. Nothing here persists state; the
//! caller keeps whatever identity it needs between runs.

pub mod capacity;
pub mod error;
pub mod plan;
pub mod state;
pub mod workspace;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use capacity::{CapacityLookup, CapacityResolver};
pub use error::{CapacityQuery, ReconcileError, Result, Step};
pub use plan::{plan, Plan};
pub use state::{DesiredWorkspace, ReadOutcome, WorkspaceState};
pub use workspace::{Applied, CapacityAssignment, WorkspaceReconciler};
