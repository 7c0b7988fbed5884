//! End-to-end tests for the `pbi` binary against a fake control plane

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Default)]
struct Fake {
    workspaces: Vec<Value>,
}

type Shared = Arc<Mutex<Fake>>;

async fn capacities() -> Json<Value> {
    Json(json!({ "value": [
        { "id": "c1", "displayName": "Premium" },
        { "id": "c2", "displayName": "Embedded" },
    ]}))
}

async fn get_groups(
    State(fake): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let fake = fake.lock().unwrap();
    let id = params
        .get("$filter")
        .and_then(|f| f.strip_prefix("id eq '"))
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or_default();
    let matches: Vec<Value> = fake
        .workspaces
        .iter()
        .filter(|w| w["id"] == id)
        .cloned()
        .collect();
    Json(json!({ "value": matches }))
}

async fn create_group(State(fake): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut fake = fake.lock().unwrap();
    let workspace = json!({
        "id": format!("ws-{}", fake.workspaces.len() + 1),
        "name": body["name"],
    });
    fake.workspaces.push(workspace.clone());
    Json(workspace)
}

async fn assign(
    State(fake): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    let mut fake = fake.lock().unwrap();
    match fake.workspaces.iter_mut().find(|w| w["id"] == id.as_str()) {
        Some(workspace) => {
            workspace["capacityId"] = body["capacityId"].clone();
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

struct Harness {
    fake: Shared,
    base: String,
    dir: TempDir,
}

impl Harness {
    async fn start() -> Self {
        let fake: Shared = Arc::default();
        let app = Router::new()
            .route("/v1.0/myorg/capacities", get(capacities))
            .route("/v1.0/myorg/groups", get(get_groups).post(create_group))
            .route("/v1.0/myorg/groups/{id}/AssignToCapacity", post(assign))
            .with_state(fake.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            fake,
            base: format!("http://{addr}/v1.0/myorg/"),
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Run the binary with an isolated config file so no user config is picked up
    fn run(&self, args: &[&str]) -> Output {
        self.run_with_env(args, &[])
    }

    fn run_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Output {
        let config = self.dir.path().join("config.yaml");
        std::fs::write(&config, format!("api_url: {}\n", self.base)).unwrap();

        Command::new(env!("CARGO_BIN_EXE_pbi"))
            .arg("--config")
            .arg(&config)
            .args(args)
            .env_remove("RUST_LOG")
            .env_remove("PBI_TIMEOUT_SECS")
            .envs(env.iter().copied())
            .output()
            .expect("Failed to run pbi")
    }

    fn write(&self, name: &str, contents: &str) -> String {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "pbi failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_capacity_show() {
    let harness = Harness::start().await;

    let value = stdout_json(&harness.run(&["capacity", "show", "Embedded"]));

    assert_eq!(value["name"], "Embedded");
    assert_eq!(value["capacity_id"], "c2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_capacity_fails() {
    let harness = Harness::start().await;

    let output = harness.run(&["capacity", "show", "premium"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Capacity not found"), "stderr: {stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_workspace_create_and_read() {
    let harness = Harness::start().await;

    let created = stdout_json(&harness.run(&[
        "workspace",
        "create",
        "--name",
        "Sales",
        "--capacity",
        "Premium",
    ]));
    assert_eq!(created["name"], "Sales");
    assert_eq!(created["capacity_display_name"], "Premium");

    let id = created["id"].as_str().unwrap();
    let read = stdout_json(&harness.run(&["workspace", "read", id]));
    assert_eq!(read["capacity_id"], "c1");
    assert_eq!(read["capacity_display_name"], "Premium");

    assert_eq!(harness.fake.lock().unwrap().workspaces.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_read_missing_workspace_prints_null() {
    let harness = Harness::start().await;

    let value = stdout_json(&harness.run(&["workspace", "read", "ws-404"]));

    assert!(value.is_null());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_is_idempotent() {
    let harness = Harness::start().await;
    let file = harness.write("sales.yaml", "name: Sales\ncapacity: Premium\n");

    let first = stdout_json(&harness.run(&["workspace", "apply", "-f", &file]));
    assert_eq!(first["plan"]["action"], "create");
    let id = first["state"]["id"].as_str().unwrap().to_string();

    let second = stdout_json(&harness.run(&["workspace", "apply", "-f", &file, "--id", &id]));
    assert_eq!(second["plan"]["action"], "noop");
    assert_eq!(second["state"]["id"], id.as_str());

    assert_eq!(harness.fake.lock().unwrap().workspaces.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_timeout_env_fails() {
    let harness = Harness::start().await;

    let output = harness.run_with_env(&["capacity", "list"], &[("PBI_TIMEOUT_SECS", "30s")]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PBI_TIMEOUT_SECS '30s'"), "stderr: {stderr}");
}
