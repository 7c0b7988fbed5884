//! Drift correction tests for `WorkspaceReconciler::apply`

use pbi_client::mock::{ApiCall, Endpoint};
use pbi_client::NO_CAPACITY_ID;
use pbi_reconciler::test_utils::mock_reconciler;
use pbi_reconciler::{DesiredWorkspace, Plan, ReconcileError};

#[tokio::test]
async fn test_apply_without_tracked_id_creates() {
    let (mock, reconciler) = mock_reconciler([("c1", "Premium")]);

    let applied = reconciler
        .apply(None, &DesiredWorkspace::new("Sales").with_capacity("Premium"))
        .await
        .unwrap();

    assert_eq!(applied.plan, Plan::Create);
    assert_eq!(applied.state.name, "Sales");
    assert_eq!(applied.state.capacity_display_name, "Premium");
    assert_eq!(mock.workspaces().len(), 1);
}

#[tokio::test]
async fn test_apply_converged_state_is_noop() {
    let (mock, reconciler) = mock_reconciler([("c1", "Premium")]);
    let desired = DesiredWorkspace::new("Sales").with_capacity("Premium");
    let first = reconciler.apply(None, &desired).await.unwrap();
    mock.clear_calls();

    let second = reconciler
        .apply(Some(&first.state.id), &desired)
        .await
        .unwrap();

    assert_eq!(second.plan, Plan::Noop);
    assert_eq!(second.state, first.state);
    assert_eq!(mock.count(Endpoint::AssignToCapacity), 0);
    assert_eq!(mock.count(Endpoint::CreateWorkspace), 0);
}

#[tokio::test]
async fn test_apply_corrects_capacity_drift() {
    let (mock, reconciler) = mock_reconciler([("c1", "Premium"), ("c2", "Embedded")]);
    let desired = DesiredWorkspace::new("Sales").with_capacity("Premium");
    let first = reconciler.apply(None, &desired).await.unwrap();

    // Someone reassigns the workspace out of band
    mock.force_capacity(&first.state.id, "c2");

    let applied = reconciler
        .apply(Some(&first.state.id), &desired)
        .await
        .unwrap();

    assert_eq!(
        applied.plan,
        Plan::UpdateCapacity {
            from: "Embedded".to_string(),
            to: "Premium".to_string(),
        }
    );
    assert_eq!(applied.state.id, first.state.id);
    assert_eq!(applied.state.capacity_id.as_deref(), Some("c1"));
    assert_eq!(applied.state.capacity_display_name, "Premium");
}

#[tokio::test]
async fn test_apply_removing_capacity_assigns_sentinel() {
    let (mock, reconciler) = mock_reconciler([("c1", "Premium")]);
    let first = reconciler
        .apply(None, &DesiredWorkspace::new("Sales").with_capacity("Premium"))
        .await
        .unwrap();
    mock.clear_calls();

    let applied = reconciler
        .apply(Some(&first.state.id), &DesiredWorkspace::new("Sales"))
        .await
        .unwrap();

    assert!(mock.calls().contains(&ApiCall::AssignToCapacity {
        workspace_id: first.state.id.clone(),
        capacity_id: NO_CAPACITY_ID.to_string(),
    }));
    assert_eq!(applied.state.capacity_id.as_deref(), Some(NO_CAPACITY_ID));
    assert_eq!(applied.state.capacity_display_name, "");
}

#[tokio::test]
async fn test_apply_recreates_deleted_workspace() {
    let (mock, reconciler) = mock_reconciler([("c1", "Premium")]);
    let desired = DesiredWorkspace::new("Sales");
    let first = reconciler.apply(None, &desired).await.unwrap();

    assert!(mock.remove_workspace(&first.state.id));

    let applied = reconciler
        .apply(Some(&first.state.id), &desired)
        .await
        .unwrap();

    assert_eq!(applied.plan, Plan::Create);
    assert_ne!(applied.state.id, first.state.id);
    assert_eq!(mock.workspaces().len(), 1);
}

#[tokio::test]
async fn test_apply_rename_replaces_workspace() {
    let (mock, reconciler) = mock_reconciler([("c1", "Premium")]);
    let first = reconciler
        .apply(None, &DesiredWorkspace::new("Sales"))
        .await
        .unwrap();
    mock.clear_calls();

    let applied = reconciler
        .apply(
            Some(&first.state.id),
            &DesiredWorkspace::new("Marketing").with_capacity("Premium"),
        )
        .await
        .unwrap();

    assert_eq!(
        applied.plan,
        Plan::Replace {
            from: "Sales".to_string(),
            to: "Marketing".to_string(),
        }
    );
    assert_eq!(applied.state.name, "Marketing");
    assert_eq!(applied.state.capacity_display_name, "Premium");
    assert!(mock.workspace(&first.state.id).is_none());

    let calls = mock.calls();
    let delete_at = calls
        .iter()
        .position(|c| matches!(c, ApiCall::DeleteWorkspace { .. }))
        .unwrap();
    let create_at = calls
        .iter()
        .position(|c| matches!(c, ApiCall::CreateWorkspace { .. }))
        .unwrap();
    assert!(delete_at < create_at);
}

#[tokio::test]
async fn test_apply_stops_on_read_failure() {
    let (mock, reconciler) = mock_reconciler([("c1", "Premium")]);
    let first = reconciler
        .apply(None, &DesiredWorkspace::new("Sales"))
        .await
        .unwrap();
    mock.fail(Endpoint::GetWorkspace);
    mock.clear_calls();

    let err = reconciler
        .apply(Some(&first.state.id), &DesiredWorkspace::new("Sales"))
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::RemoteUnavailable { .. }));
    // A failed read is not mistaken for absence
    assert_eq!(mock.count(Endpoint::CreateWorkspace), 0);
}

#[tokio::test]
async fn test_apply_unknown_capacity_fails_before_assign() {
    let (mock, reconciler) = mock_reconciler([("c1", "Premium")]);
    let first = reconciler
        .apply(None, &DesiredWorkspace::new("Sales"))
        .await
        .unwrap();
    mock.clear_calls();

    let err = reconciler
        .apply(
            Some(&first.state.id),
            &DesiredWorkspace::new("Sales").with_capacity("Nope"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::NotFound(_)));
    assert_eq!(mock.count(Endpoint::AssignToCapacity), 0);
}
