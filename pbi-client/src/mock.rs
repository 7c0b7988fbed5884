//! In-memory Power BI control plane for tests
//!
//! `MockPowerBi` keeps capacities and workspaces in memory, records every call
//! in order, and can be told to fail specific endpoints or to hide freshly
//! created workspaces from a number of reads (eventual consistency).

use crate::api::PowerBiApi;
use crate::error::{ClientError, Result};
use crate::types::{Capacity, Workspace, NO_CAPACITY_ID};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Remote endpoints, used to target failure injection and count calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListCapacities,
    CreateWorkspace,
    GetWorkspace,
    DeleteWorkspace,
    AssignToCapacity,
}

/// One recorded call against the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListCapacities,
    CreateWorkspace { name: String },
    GetWorkspace { id: String },
    DeleteWorkspace { id: String },
    AssignToCapacity {
        workspace_id: String,
        capacity_id: String,
    },
}

impl ApiCall {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            ApiCall::ListCapacities => Endpoint::ListCapacities,
            ApiCall::CreateWorkspace { .. } => Endpoint::CreateWorkspace,
            ApiCall::GetWorkspace { .. } => Endpoint::GetWorkspace,
            ApiCall::DeleteWorkspace { .. } => Endpoint::DeleteWorkspace,
            ApiCall::AssignToCapacity { .. } => Endpoint::AssignToCapacity,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    capacities: Vec<Capacity>,
    workspaces: Vec<Workspace>,
    calls: Vec<ApiCall>,
    failing: HashSet<Endpoint>,
    visibility_lag: usize,
    hidden_reads: HashMap<String, usize>,
}

#[derive(Debug, Default)]
pub struct MockPowerBi {
    state: Mutex<MockState>,
}

impl MockPowerBi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock preloaded with `(id, display_name)` capacities, in that order
    pub fn with_capacities<'a>(capacities: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mock = Self::new();
        mock.set_capacities(
            capacities
                .into_iter()
                .map(|(id, name)| Capacity::new(id, name))
                .collect(),
        );
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_capacities(&self, capacities: Vec<Capacity>) {
        self.state().capacities = capacities;
    }

    /// Insert or replace a workspace directly, bypassing the call log
    pub fn insert_workspace(&self, workspace: Workspace) {
        let mut state = self.state();
        state.workspaces.retain(|w| w.id != workspace.id);
        state.workspaces.push(workspace);
    }

    /// Remove a workspace behind the caller's back (out-of-band deletion)
    pub fn remove_workspace(&self, id: &str) -> bool {
        let mut state = self.state();
        let before = state.workspaces.len();
        state.workspaces.retain(|w| w.id != id);
        state.workspaces.len() != before
    }

    /// Point a workspace at an arbitrary capacity ID without validation
    pub fn force_capacity(&self, workspace_id: &str, capacity_id: &str) {
        if let Some(ws) = self
            .state()
            .workspaces
            .iter_mut()
            .find(|w| w.id == workspace_id)
        {
            ws.capacity_id = capacity_id.to_string();
        }
    }

    pub fn workspace(&self, id: &str) -> Option<Workspace> {
        self.state().workspaces.iter().find(|w| w.id == id).cloned()
    }

    pub fn workspaces(&self) -> Vec<Workspace> {
        self.state().workspaces.clone()
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.endpoint() == endpoint)
            .count()
    }

    /// Make every call to `endpoint` fail with 503 until [`Self::recover`]
    pub fn fail(&self, endpoint: Endpoint) {
        self.state().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.state().failing.remove(&endpoint);
    }

    /// Hide each workspace created from now on from its next `reads` lookups
    pub fn set_visibility_lag(&self, reads: usize) {
        self.state().visibility_lag = reads;
    }

    fn record(&self, call: ApiCall) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        let endpoint = call.endpoint();
        state.calls.push(call);
        if state.failing.contains(&endpoint) {
            return Err(injected_failure(endpoint));
        }
        Ok(state)
    }
}

#[async_trait]
impl PowerBiApi for MockPowerBi {
    async fn list_capacities(&self) -> Result<Vec<Capacity>> {
        let state = self.record(ApiCall::ListCapacities)?;
        Ok(state.capacities.clone())
    }

    async fn create_workspace(&self, name: &str) -> Result<Workspace> {
        let mut state = self.record(ApiCall::CreateWorkspace {
            name: name.to_string(),
        })?;

        let workspace = Workspace::new(uuid::Uuid::new_v4().to_string(), name);
        if state.visibility_lag > 0 {
            let lag = state.visibility_lag;
            state.hidden_reads.insert(workspace.id.clone(), lag);
        }
        state.workspaces.push(workspace.clone());
        Ok(workspace)
    }

    async fn get_workspace(&self, id: &str) -> Result<Option<Workspace>> {
        let mut state = self.record(ApiCall::GetWorkspace { id: id.to_string() })?;

        if let Some(remaining) = state.hidden_reads.get_mut(id) {
            *remaining -= 1;
            if *remaining == 0 {
                state.hidden_reads.remove(id);
            }
            return Ok(None);
        }

        Ok(state.workspaces.iter().find(|w| w.id == id).cloned())
    }

    async fn delete_workspace(&self, id: &str) -> Result<()> {
        let mut state = self.record(ApiCall::DeleteWorkspace { id: id.to_string() })?;

        let before = state.workspaces.len();
        state.workspaces.retain(|w| w.id != id);
        if state.workspaces.len() == before {
            return Err(rejected(Method::DELETE, StatusCode::NOT_FOUND, id));
        }
        state.hidden_reads.remove(id);
        Ok(())
    }

    async fn assign_workspace_to_capacity(
        &self,
        workspace_id: &str,
        capacity_id: &str,
    ) -> Result<()> {
        let mut state = self.record(ApiCall::AssignToCapacity {
            workspace_id: workspace_id.to_string(),
            capacity_id: capacity_id.to_string(),
        })?;

        if capacity_id != NO_CAPACITY_ID && !state.capacities.iter().any(|c| c.id == capacity_id) {
            return Err(rejected(Method::POST, StatusCode::BAD_REQUEST, capacity_id));
        }

        let workspace = state
            .workspaces
            .iter_mut()
            .find(|w| w.id == workspace_id)
            .ok_or_else(|| rejected(Method::POST, StatusCode::NOT_FOUND, workspace_id))?;
        workspace.capacity_id = capacity_id.to_string();
        Ok(())
    }
}

fn injected_failure(endpoint: Endpoint) -> ClientError {
    ClientError::Status {
        method: Method::GET,
        url: format!("mock://{endpoint:?}"),
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "injected failure".to_string(),
    }
}

fn rejected(method: Method, status: StatusCode, subject: &str) -> ClientError {
    ClientError::Status {
        method,
        url: format!("mock://{subject}"),
        status,
        body: String::new(),
    }
}
