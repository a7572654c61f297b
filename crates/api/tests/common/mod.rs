#![allow(dead_code)] // each test binary uses a subset of these helpers

//! Shared harness for HTTP-level integration tests.
//!
//! Builds the real application router (same middleware stack as
//! production) on top of a per-test database and a scripted stub queue,
//! plus request/seeding helpers.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;
use zeus_core::job::RemoteJobState;
use zeus_queue::{JobQueue, QueueError};
use zeus_worker::registry::ScriptRegistry;

use zeus_api::auth::password::hash_password;
use zeus_api::auth::jwt::JwtConfig;
use zeus_api::catalog;
use zeus_api::config::{QueueConfig, ServerConfig};
use zeus_api::engine::dispatcher::JobDispatcher;
use zeus_api::engine::reconciler::JobReconciler;
use zeus_api::router::build_app_router;
use zeus_api::state::AppState;
use zeus_db::models::user::{CreateUser, User};
use zeus_db::repositories::{PermissionRepo, ScriptRepo, UserRepo};

/// Plaintext password used for all test users.
pub const TEST_PASSWORD: &str = "test_password_123!";

// ---------------------------------------------------------------------------
// Stub queue
// ---------------------------------------------------------------------------

/// One recorded submission: `(module, script, parameters)`.
pub type Submission = (String, Option<String>, serde_json::Value);

/// Scripted in-memory [`JobQueue`] double.
///
/// Tests drive the backend side directly: preset the ids `submit` hands
/// out, flip it into unavailable mode, or set the authoritative state a
/// later poll should observe.
#[derive(Default)]
pub struct StubQueue {
    states: Mutex<HashMap<String, RemoteJobState>>,
    submissions: Mutex<Vec<Submission>>,
    next_ids: Mutex<VecDeque<String>>,
    unavailable: Mutex<bool>,
}

impl StubQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue up the id the next `submit` call returns (FIFO).
    pub fn push_next_id(&self, id: &str) {
        self.next_ids.lock().unwrap().push_back(id.to_string());
    }

    /// Set the authoritative state for a job id.
    pub fn set_state(&self, id: &str, state: RemoteJobState) {
        self.states.lock().unwrap().insert(id.to_string(), state);
    }

    /// Forget a job id entirely (the backend lost it).
    pub fn forget(&self, id: &str) {
        self.states.lock().unwrap().remove(id);
    }

    /// Make every call fail with `QueueError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    /// All submissions recorded so far.
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobQueue for StubQueue {
    async fn submit(
        &self,
        module_name: &str,
        script_name: Option<&str>,
        parameters: &serde_json::Value,
    ) -> Result<String, QueueError> {
        if *self.unavailable.lock().unwrap() {
            return Err(QueueError::Unavailable("stub queue is down".into()));
        }

        self.submissions.lock().unwrap().push((
            module_name.to_string(),
            script_name.map(|s| s.to_string()),
            parameters.clone(),
        ));

        let id = self
            .next_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        self.states
            .lock()
            .unwrap()
            .insert(id.clone(), RemoteJobState::Pending);
        Ok(id)
    }

    async fn status(&self, external_id: &str) -> Result<Option<RemoteJobState>, QueueError> {
        if *self.unavailable.lock().unwrap() {
            return Err(QueueError::Unavailable("stub queue is down".into()));
        }
        Ok(self.states.lock().unwrap().get(external_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-key".to_string(),
            access_token_expiry_mins: 30,
        },
        queue: QueueConfig {
            url: None,
            request_timeout_secs: 10,
        },
        catalog_grant_on_discovery: false,
        dev_seed: false,
    }
}

/// Build the full application router over the given pool and queue.
pub fn build_test_app(pool: PgPool, queue: Arc<dyn JobQueue>) -> Router {
    let config = test_config();
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        dispatcher: Arc::new(JobDispatcher::new(pool.clone(), Arc::clone(&queue))),
        reconciler: Arc::new(JobReconciler::new(pool, queue)),
    };
    build_app_router(state, &config)
}

/// Mirror the builtin registry catalog into the test database.
///
/// Discovery grants are off; tests grant scripts explicitly so each case
/// controls its permission shape.
pub async fn sync_builtin_catalog(pool: &PgPool) {
    let registry = ScriptRegistry::builtin();
    catalog::sync(pool, &registry.catalog(), false)
        .await
        .expect("catalog sync should succeed");
}

// ---------------------------------------------------------------------------
// Seeding helpers
// ---------------------------------------------------------------------------

/// Create a test user with the given module grants.
pub async fn create_test_user(pool: &PgPool, username: &str, modules: &[&str]) -> User {
    let hashed = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            password_hash: hashed,
        },
    )
    .await
    .expect("user creation should succeed");

    for module in modules {
        PermissionRepo::grant_module(pool, user.id, module)
            .await
            .expect("module grant should succeed");
    }

    user
}

/// Grant one cataloged script to a user.
pub async fn grant_script(pool: &PgPool, user_id: i64, module: &str, script: &str) {
    let row = ScriptRepo::find_by_module_and_name(pool, module, script)
        .await
        .expect("script lookup should succeed")
        .unwrap_or_else(|| panic!("script {module}.{script} must be cataloged"));
    PermissionRepo::grant_script(pool, user_id, row.id)
        .await
        .expect("script grant should succeed");
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Send a GET request without authentication.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("request must build"),
    )
    .await
    .expect("request must succeed")
}

/// Send a GET request with a bearer token.
pub async fn get_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(path)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .expect("request must build"),
    )
    .await
    .expect("request must succeed")
}

/// Send a POST request with a JSON body, no authentication.
pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request must build"),
    )
    .await
    .expect("request must succeed")
}

/// Send a POST request with a JSON body and a bearer token.
pub async fn post_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .expect("request must build"),
    )
    .await
    .expect("request must succeed")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body must collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body must be valid JSON")
}

/// Log in through the API and return the access token.
pub async fn login_user(app: Router, username: &str) -> String {
    let body = serde_json::json!({ "username": username, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["access_token"]
        .as_str()
        .expect("login must return access_token")
        .to_string()
}
