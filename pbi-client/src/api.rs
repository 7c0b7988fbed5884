use crate::error::Result;
use crate::types::{Capacity, Workspace};
use async_trait::async_trait;

/// Remote object API of the Power BI control plane
///
/// Every method is a single remote call. Implementations must not retry,
/// cache, or reorder calls; callers rely on each call reflecting the remote
/// service at the time it is made.
#[async_trait]
pub trait PowerBiApi: Send + Sync {
    /// List every capacity visible to the caller, in service order
    async fn list_capacities(&self) -> Result<Vec<Capacity>>;

    /// Create a workspace; the returned record carries the new ID
    async fn create_workspace(&self, name: &str) -> Result<Workspace>;

    /// Fetch a workspace; `None` when the service does not know the ID
    async fn get_workspace(&self, id: &str) -> Result<Option<Workspace>>;

    async fn delete_workspace(&self, id: &str) -> Result<()>;

    /// Assign a workspace to a capacity; [`crate::NO_CAPACITY_ID`] unassigns it
    async fn assign_workspace_to_capacity(&self, workspace_id: &str, capacity_id: &str)
        -> Result<()>;
}
