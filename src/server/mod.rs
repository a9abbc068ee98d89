use crate::blobstore::BlobStore;
use crate::forward::CommandForwarder;
use crate::handlers::{commands, devices, status, telemetry};
use crate::models::config::EdgemonConfig;
use anyhow::Result;
use axum::Router;
use axum::routing::{get, post, put};
use sqlx::SqlitePool;
use std::time::Duration;

/// Everything a handler needs, injected explicitly. Tests build their own
/// instance around an isolated in-memory store; there is no global handle
/// anywhere.
#[derive(Clone)]
pub struct AppState {
    pool: SqlitePool,
    liveness_window: Duration,
    forwarder: Option<CommandForwarder>,
    blobs: BlobStore,
}

impl AppState {
    pub fn new(pool: SqlitePool, cfg: &EdgemonConfig) -> Result<Self> {
        let forwarder = cfg
            .forward
            .target_url
            .as_ref()
            .map(|url| CommandForwarder::new(&cfg.forward, url.clone()))
            .transpose()?;

        Ok(Self {
            pool,
            liveness_window: cfg.liveness.window,
            forwarder,
            blobs: BlobStore::from_config(&cfg.screenshots),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn liveness_window(&self) -> Duration {
        self.liveness_window
    }

    pub fn forwarder(&self) -> Option<&CommandForwarder> {
        self.forwarder.as_ref()
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/devices", post(devices::register).get(devices::list))
        .route(
            "/devices/:id/metrics",
            post(telemetry::record_metric).get(telemetry::metrics),
        )
        .route("/devices/:id/activity", post(telemetry::record_activity))
        .route("/devices/:id/activities", get(telemetry::activities))
        .route(
            "/devices/:id/processes",
            post(telemetry::report_processes).get(telemetry::processes),
        )
        .route(
            "/devices/:id/alerts",
            post(telemetry::record_alert).get(telemetry::alerts),
        )
        .route("/devices/:id/screenshots", get(telemetry::screenshots))
        .route("/devices/:id/commands", post(commands::create))
        .route("/devices/:id/commands/pending", get(commands::pending))
        .route("/commands/:id/status", put(commands::update_status))
        .route("/status", get(status::status))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::config::ForwardConfig;
    use axum::extract::State as AxState;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    async fn test_server() -> TestServer {
        let pool = test_pool().await;
        let state = AppState::new(pool, &EdgemonConfig::default()).unwrap();
        TestServer::new(app(state)).unwrap()
    }

    async fn register_device(server: &TestServer, id: &str) {
        let resp = server
            .post("/devices")
            .json(&json!({ "id": id, "name": "bench rig", "os": "linux" }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn register_then_replace_process_snapshot() {
        let server = test_server().await;
        register_device(&server, "dev-1").await;

        let devices = server.get("/devices").await.json::<Value>();
        assert_eq!(devices[0]["id"], "dev-1");
        assert_eq!(devices[0]["is_online"], true);

        let resp = server
            .post("/devices/dev-1/processes")
            .json(&json!([
                { "pid": 1, "name": "init", "cpu_usage": 0.1 },
                { "pid": 42, "name": "miner", "cpu_usage": 93.0 },
                { "pid": 7, "name": "sshd", "cpu_usage": 2.5 }
            ]))
            .await;
        assert_eq!(resp.status_code(), StatusCode::OK);

        let listed = server.get("/devices/dev-1/processes").await.json::<Value>();
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0]["name"], "miner");

        server
            .post("/devices/dev-1/processes")
            .json(&json!([{ "pid": 9, "name": "backup", "cpu_usage": 4.0 }]))
            .await;

        let listed = server.get("/devices/dev-1/processes").await.json::<Value>();
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["name"], "backup");
    }

    #[tokio::test]
    async fn command_lifecycle_empties_the_pending_queue() {
        let server = test_server().await;
        register_device(&server, "dev-1").await;

        let created = server
            .post("/devices/dev-1/commands")
            .json(&json!({ "command": "ping" }))
            .await;
        assert_eq!(created.status_code(), StatusCode::OK);
        let created = created.json::<Value>();
        assert_eq!(created["status"], "pending");
        assert!(created["completed_at"].is_null());

        let id = created["id"].as_str().unwrap();
        let updated = server
            .put(&format!("/commands/{id}/status"))
            .json(&json!({ "status": "completed", "result": "pong", "exit_code": 0 }))
            .await;
        assert_eq!(updated.status_code(), StatusCode::OK);
        let updated = updated.json::<Value>();
        assert_eq!(updated["result"], "pong");
        assert!(!updated["completed_at"].is_null());

        let pending = server.get("/devices/dev-1/commands/pending").await;
        assert_eq!(pending.text(), "[]");
    }

    #[tokio::test]
    async fn non_integer_limit_is_a_client_error() {
        let server = test_server().await;
        register_device(&server, "dev-1").await;

        for path in [
            "/devices/dev-1/metrics",
            "/devices/dev-1/processes",
            "/devices/dev-1/activities",
            "/devices/dev-1/alerts",
            "/devices/dev-1/screenshots",
        ] {
            let resp = server.get(path).add_query_param("limit", "abc").await;
            assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST, "{path}");
            assert!(resp.text().contains("invalid limit"), "{path}");
        }
    }

    #[tokio::test]
    async fn empty_lists_serialize_as_empty_arrays() {
        let server = test_server().await;
        register_device(&server, "dev-1").await;

        for path in [
            "/devices/dev-1/metrics",
            "/devices/dev-1/processes",
            "/devices/dev-1/activities",
            "/devices/dev-1/alerts",
            "/devices/dev-1/screenshots",
            "/devices/dev-1/commands/pending",
        ] {
            let resp = server.get(path).await;
            assert_eq!(resp.status_code(), StatusCode::OK, "{path}");
            assert_eq!(resp.text(), "[]", "{path}");
        }
    }

    #[tokio::test]
    async fn malformed_bodies_are_rejected_with_400() {
        let server = test_server().await;
        register_device(&server, "dev-1").await;

        // Not JSON at all.
        let resp = server.post("/devices").text("not json").await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);

        // Registration without an id.
        let resp = server.post("/devices").json(&json!({ "name": "x" })).await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);

        // Blank command text.
        let resp = server
            .post("/devices/dev-1/commands")
            .json(&json!({ "command": "   " }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);

        // Unknown status string.
        let resp = server
            .put("/commands/some-id/status")
            .json(&json!({ "status": "exploded" }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_command_id_is_not_found() {
        let server = test_server().await;

        let resp = server
            .put("/commands/does-not-exist/status")
            .json(&json!({ "status": "completed" }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn terminal_commands_reject_further_transitions() {
        let server = test_server().await;
        register_device(&server, "dev-1").await;

        let created = server
            .post("/devices/dev-1/commands")
            .json(&json!({ "command": "reboot" }))
            .await
            .json::<Value>();
        let id = created["id"].as_str().unwrap();

        server
            .put(&format!("/commands/{id}/status"))
            .json(&json!({ "status": "failed", "exit_code": 1 }))
            .await;

        let resp = server
            .put(&format!("/commands/{id}/status"))
            .json(&json!({ "status": "running" }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn status_endpoint_reports_counts() {
        let server = test_server().await;
        register_device(&server, "dev-1").await;
        server
            .post("/devices/dev-1/commands")
            .json(&json!({ "command": "ping" }))
            .await;

        let status = server.get("/status").await.json::<Value>();
        assert_eq!(status["database"], "healthy");
        assert_eq!(status["stats"]["total_devices"], 1);
        assert_eq!(status["stats"]["pending_commands"], 1);
    }

    // ---- forwarding -----------------------------------------------------

    async fn edge_hits(AxState(hits): AxState<Arc<AtomicUsize>>) -> StatusCode {
        hits.fetch_add(1, Ordering::SeqCst);
        StatusCode::OK
    }

    async fn edge_refuses(AxState(hits): AxState<Arc<AtomicUsize>>) -> StatusCode {
        hits.fetch_add(1, Ordering::SeqCst);
        StatusCode::INTERNAL_SERVER_ERROR
    }

    async fn spawn_edge(always_fails: bool) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let route = if always_fails {
            post(edge_refuses)
        } else {
            post(edge_hits)
        };
        let edge = Router::new()
            .route("/commands", route)
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, edge).await.unwrap();
        });

        (format!("http://{addr}/commands"), hits)
    }

    async fn forwarding_server(target_url: String) -> TestServer {
        let pool = test_pool().await;
        let cfg = EdgemonConfig {
            forward: ForwardConfig {
                target_url: Some(target_url),
                max_retries: 1,
                base_delay: Duration::from_millis(5),
                max_delay: Duration::from_millis(20),
                request_timeout: Duration::from_secs(2),
                concurrency: 4,
            },
            ..Default::default()
        };
        let state = AppState::new(pool, &cfg).unwrap();
        TestServer::new(app(state)).unwrap()
    }

    async fn wait_for_hits(hits: &AtomicUsize, at_least: usize) {
        for _ in 0..200 {
            if hits.load(Ordering::SeqCst) >= at_least {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("edge stub never reached {at_least} hit(s)");
    }

    #[tokio::test]
    async fn accepted_commands_are_forwarded_in_the_background() {
        let (url, hits) = spawn_edge(false).await;
        let server = forwarding_server(url).await;
        register_device(&server, "dev-1").await;

        let created = server
            .post("/devices/dev-1/commands")
            .json(&json!({ "command": "ping" }))
            .await;
        assert_eq!(created.status_code(), StatusCode::OK);

        wait_for_hits(&hits, 1).await;

        // Delivery is a side channel: the persisted row is still pending.
        let pending = server
            .get("/devices/dev-1/commands/pending")
            .await
            .json::<Value>();
        assert_eq!(pending.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn forwarding_failures_never_touch_the_stored_command() {
        let (url, hits) = spawn_edge(true).await;
        let server = forwarding_server(url).await;
        register_device(&server, "dev-1").await;

        let created = server
            .post("/devices/dev-1/commands")
            .json(&json!({ "command": "ping" }))
            .await;
        assert_eq!(created.status_code(), StatusCode::OK);
        let created = created.json::<Value>();
        assert_eq!(created["status"], "pending");

        // 1 initial attempt + 1 retry, then the failure is swallowed.
        wait_for_hits(&hits, 2).await;
        sleep(Duration::from_millis(50)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        let pending = server
            .get("/devices/dev-1/commands/pending")
            .await
            .json::<Value>();
        assert_eq!(pending.as_array().unwrap().len(), 1);
        assert_eq!(pending[0]["status"], "pending");
    }
}
