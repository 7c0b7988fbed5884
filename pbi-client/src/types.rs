//! Wire types for the Power BI REST API

use serde::{Deserialize, Deserializer, Serialize};

/// Capacity ID that unassigns a workspace from any dedicated capacity.
///
/// The assign endpoint always takes a concrete identifier, so "no capacity"
/// is spelled as the nil GUID rather than an empty value.
pub const NO_CAPACITY_ID: &str = "00000000-0000-0000-0000-000000000000";

/// A capacity as returned by `GET capacities`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capacity {
    pub id: String,
    pub display_name: String,
}

impl Capacity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// A workspace (a "group" in the REST API)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,

    /// Assigned capacity; [`NO_CAPACITY_ID`] when the workspace is on shared capacity.
    #[serde(default = "no_capacity", deserialize_with = "capacity_or_sentinel")]
    pub capacity_id: String,
}

impl Workspace {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity_id: no_capacity(),
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.capacity_id != NO_CAPACITY_ID
    }
}

/// OData collection envelope (`{ "value": [...] }`)
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    pub value: Option<Vec<T>>,
}

impl<T> ListResponse<T> {
    pub fn into_items(self) -> Vec<T> {
        self.value.unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateWorkspaceRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignToCapacityRequest<'a> {
    pub capacity_id: &'a str,
}

fn no_capacity() -> String {
    NO_CAPACITY_ID.to_string()
}

// Shared-capacity workspaces come back without `capacityId` (or with it empty).
fn capacity_or_sentinel<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|id| !id.is_empty()).unwrap_or_else(no_capacity))
}
