//! Capacity display name <-> ID resolution
//!
//! The service has no name-keyed capacity lookup, so both directions fetch the
//! full capacity list and scan it. Nothing is cached between calls: capacities
//! are few and change rarely, and a stale mapping would silently assign the
//! wrong capacity.

use crate::error::{CapacityQuery, ReconcileError, Result, Step};
use pbi_client::{Capacity, PowerBiApi};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Result of looking a capacity up by display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityLookup {
    pub name: String,
    pub capacity_id: String,
}

#[derive(Clone)]
pub struct CapacityResolver {
    api: Arc<dyn PowerBiApi>,
}

impl CapacityResolver {
    pub fn new(api: Arc<dyn PowerBiApi>) -> Self {
        Self { api }
    }

    /// Every capacity visible to the caller, in service order
    pub async fn list(&self) -> Result<Vec<Capacity>> {
        self.api
            .list_capacities()
            .await
            .map_err(ReconcileError::remote(Step::ListCapacities))
    }

    /// First capacity whose display name matches exactly (case-sensitive).
    ///
    /// Display names are not unique; when several capacities share one, the
    /// first in service order wins.
    #[instrument(skip(self))]
    pub async fn resolve_by_name(&self, display_name: &str) -> Result<Capacity> {
        let capacities = self.list().await?;

        let matching = capacities
            .iter()
            .filter(|c| c.display_name == display_name)
            .count();
        if matching > 1 {
            warn!(
                display_name,
                matching, "Several capacities share this display name; using the first"
            );
        }

        first_match(capacities, |c| c.display_name == display_name)
            .ok_or_else(|| ReconcileError::NotFound(CapacityQuery::DisplayName(display_name.to_string())))
    }

    #[instrument(skip(self))]
    pub async fn resolve_by_id(&self, id: &str) -> Result<Capacity> {
        let capacities = self.list().await?;
        first_match(capacities, |c| c.id == id)
            .ok_or_else(|| ReconcileError::NotFound(CapacityQuery::Id(id.to_string())))
    }

    /// Look up the ID behind a display name
    pub async fn lookup(&self, display_name: &str) -> Result<CapacityLookup> {
        let capacity = self.resolve_by_name(display_name).await?;
        Ok(CapacityLookup {
            name: display_name.to_string(),
            capacity_id: capacity.id,
        })
    }
}

fn first_match(capacities: Vec<Capacity>, pred: impl Fn(&Capacity) -> bool) -> Option<Capacity> {
    let scanned = capacities.len();
    let found = capacities.into_iter().find(|c| pred(c));
    debug!(scanned, found = found.is_some(), "Scanned capacity list");
    found
}
