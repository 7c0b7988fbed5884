use crate::WorkspaceReconciler;
use pbi_client::mock::MockPowerBi;
use std::sync::Arc;

/// Helper to build a reconciler over an in-memory control plane holding the
/// given `(id, display_name)` capacities
pub fn mock_reconciler<'a>(
    capacities: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> (Arc<MockPowerBi>, WorkspaceReconciler) {
    let mock = Arc::new(MockPowerBi::with_capacities(capacities));
    let reconciler = WorkspaceReconciler::new(mock.clone());
    (mock, reconciler)
}
