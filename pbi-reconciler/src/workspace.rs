use crate::capacity::CapacityResolver;
use crate::error::{ReconcileError, Result, Step};
use crate::plan::{plan, Plan};
use crate::state::{DesiredWorkspace, ReadOutcome, WorkspaceState};
use pbi_client::{PowerBiApi, NO_CAPACITY_ID};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Record of a successful capacity assignment.
///
/// The assignment call is authoritative until the next read, so applying it
/// to a tracked state stores the desired display name and forgets the
/// previously observed capacity ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityAssignment {
    pub capacity_display_name: String,
}

impl CapacityAssignment {
    pub fn record(self, state: &mut WorkspaceState) {
        state.capacity_display_name = self.capacity_display_name;
        state.capacity_id = None;
    }
}

/// Result of [`WorkspaceReconciler::apply`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Applied {
    pub plan: Plan,
    pub state: WorkspaceState,
}

/// Drives workspace lifecycle operations against the service.
///
/// Operations on the same workspace must not run concurrently; callers
/// serialize them. No remote call is retried.
#[derive(Clone)]
pub struct WorkspaceReconciler {
    api: Arc<dyn PowerBiApi>,
    capacities: CapacityResolver,
}

impl WorkspaceReconciler {
    pub fn new(api: Arc<dyn PowerBiApi>) -> Self {
        Self {
            capacities: CapacityResolver::new(api.clone()),
            api,
        }
    }

    pub fn capacities(&self) -> &CapacityResolver {
        &self.capacities
    }

    /// Create a workspace, assign its capacity, and return the observed state.
    ///
    /// A failure after the workspace exists is returned as
    /// [`ReconcileError::PartiallyCreated`] carrying the new ID; the workspace
    /// is not deleted.
    #[instrument(skip(self, desired), fields(name = %desired.name))]
    pub async fn create(&self, desired: &DesiredWorkspace) -> Result<WorkspaceState> {
        desired.validate()?;

        let created = self
            .api
            .create_workspace(&desired.name)
            .await
            .map_err(ReconcileError::remote(Step::CreateWorkspace))?;
        info!(workspace_id = %created.id, "Created workspace");

        self.finish_create(&created.id, desired)
            .await
            .map_err(|source| ReconcileError::PartiallyCreated {
                workspace_id: created.id.clone(),
                source: Box::new(source),
            })
    }

    async fn finish_create(&self, id: &str, desired: &DesiredWorkspace) -> Result<WorkspaceState> {
        if !desired.capacity().is_empty() {
            self.assign_capacity(id, desired.capacity()).await?;
        }
        self.read_present(id).await
    }

    /// Read a workspace; a missing workspace is [`ReadOutcome::Absent`], not an error
    #[instrument(skip(self))]
    pub async fn read(&self, id: &str) -> Result<ReadOutcome> {
        let Some(workspace) = self
            .api
            .get_workspace(id)
            .await
            .map_err(ReconcileError::remote(Step::GetWorkspace))?
        else {
            info!("Workspace is absent on the service");
            return Ok(ReadOutcome::Absent);
        };

        let capacity_display_name = if !workspace.has_capacity() {
            String::new()
        } else {
            match self.capacities.resolve_by_id(&workspace.capacity_id).await {
                Ok(capacity) => capacity.display_name,
                Err(ReconcileError::NotFound(_)) => {
                    return Err(ReconcileError::AmbiguousRemoteState {
                        workspace_id: workspace.id,
                        capacity_id: workspace.capacity_id,
                    });
                }
                Err(e) => return Err(e),
            }
        };

        Ok(ReadOutcome::Present(WorkspaceState {
            id: workspace.id,
            name: workspace.name,
            capacity_id: Some(workspace.capacity_id),
            capacity_display_name,
        }))
    }

    async fn read_present(&self, id: &str) -> Result<WorkspaceState> {
        self.read(id)
            .await?
            .into_state()
            .ok_or_else(|| ReconcileError::NotVisible(id.to_string()))
    }

    /// Bring the capacity assignment of a tracked workspace in line with `desired`.
    ///
    /// Does nothing when the desired capacity display name equals the observed
    /// one. A different name is rejected: names are create-time only.
    #[instrument(skip(self, state, desired), fields(workspace_id = %state.id))]
    pub async fn update(&self, state: &mut WorkspaceState, desired: &DesiredWorkspace) -> Result<()> {
        desired.validate()?;

        if desired.name != state.name {
            return Err(ReconcileError::RequiresReplacement {
                current: state.name.clone(),
                desired: desired.name.clone(),
            });
        }

        if state.capacity_display_name == desired.capacity() {
            debug!("Capacity unchanged");
            return Ok(());
        }

        self.assign_capacity(&state.id, desired.capacity())
            .await?
            .record(state);
        Ok(())
    }

    /// Assign a workspace to the capacity with the given display name, or to no
    /// capacity when the name is empty.
    ///
    /// Resolution happens before any assignment call; an unknown name fails
    /// without touching the workspace. Re-running with the same name issues
    /// the same call again.
    #[instrument(skip(self))]
    pub async fn assign_capacity(
        &self,
        workspace_id: &str,
        capacity_display_name: &str,
    ) -> Result<CapacityAssignment> {
        let capacity_id = if capacity_display_name.is_empty() {
            NO_CAPACITY_ID.to_string()
        } else {
            self.capacities.resolve_by_name(capacity_display_name).await?.id
        };

        self.api
            .assign_workspace_to_capacity(workspace_id, &capacity_id)
            .await
            .map_err(ReconcileError::remote(Step::AssignCapacity))?;
        info!(%capacity_id, "Assigned capacity");

        Ok(CapacityAssignment {
            capacity_display_name: capacity_display_name.to_string(),
        })
    }

    /// Delete a workspace unconditionally
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.api
            .delete_workspace(id)
            .await
            .map_err(ReconcileError::remote(Step::DeleteWorkspace))?;
        info!("Deleted workspace");
        Ok(())
    }

    /// Adopt an existing workspace by ID, backfilling every observed attribute
    #[instrument(skip(self))]
    pub async fn import(&self, id: &str) -> Result<WorkspaceState> {
        match self.read(id).await? {
            ReadOutcome::Present(state) => Ok(state),
            ReadOutcome::Absent => Err(ReconcileError::ImportTargetMissing(id.to_string())),
        }
    }

    /// Converge a workspace on `desired`.
    ///
    /// `tracked_id` is the identity the caller holds from a previous run, if
    /// any. A tracked workspace that no longer exists is recreated; a name
    /// change replaces the workspace; a capacity change updates it in place.
    /// The returned state always comes from a final read.
    #[instrument(skip(self, desired), fields(name = %desired.name))]
    pub async fn apply(
        &self,
        tracked_id: Option<&str>,
        desired: &DesiredWorkspace,
    ) -> Result<Applied> {
        desired.validate()?;

        let observed = match tracked_id {
            Some(id) => {
                let outcome = self.read(id).await?;
                if outcome.is_absent() {
                    warn!(workspace_id = %id, "Tracked workspace no longer exists; recreating it");
                }
                outcome.into_state()
            }
            None => None,
        };

        let plan = plan(observed.as_ref(), desired);
        debug!(?plan, "Planned workspace changes");

        let state = match (&plan, observed) {
            (Plan::Noop, Some(state)) => state,
            (Plan::UpdateCapacity { .. }, Some(mut state)) => {
                self.update(&mut state, desired).await?;
                self.read_present(&state.id).await?
            }
            (Plan::Replace { .. }, Some(state)) => {
                self.delete(&state.id).await?;
                self.create(desired).await?
            }
            _ => self.create(desired).await?,
        };

        Ok(Applied { plan, state })
    }
}
