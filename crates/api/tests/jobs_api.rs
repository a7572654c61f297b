//! HTTP-level integration tests for job status polling, reconciliation,
//! idempotent record-keeping, and the job history listing.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{
    body_json, create_test_user, get_auth, login_user, post_json_auth, StubQueue,
};
use sqlx::PgPool;
use zeus_core::job::RemoteJobState;

/// Dispatch a module-level job and return its id.
async fn dispatch(app: Router, token: &str, module: &str, params: serde_json::Value) -> String {
    let body = serde_json::json!({ "module_name": module, "parameters": params });
    let response = post_json_auth(app, "/api/v1/modules/execute", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["job_id"]
        .as_str()
        .expect("dispatch must return job_id")
        .to_string()
}

async fn job_row(pool: &PgPool, job_id: &str) -> (String, Option<serde_json::Value>) {
    sqlx::query_as("SELECT status, result FROM jobs WHERE external_id = $1")
        .bind(job_id)
        .fetch_one(pool)
        .await
        .expect("job row must exist")
}

/// A freshly dispatched job polls as pending and exists as a pending
/// record.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_dispatched_job_is_pending(pool: PgPool) {
    common::sync_builtin_catalog(&pool).await;
    create_test_user(&pool, "poller", &["module1"]).await;

    let app = common::build_test_app(pool.clone(), StubQueue::new());
    let token = login_user(app.clone(), "poller").await;
    let job_id = dispatch(app.clone(), &token, "module1", serde_json::json!({})).await;

    let response = get_auth(app, &format!("/api/v1/jobs/{job_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["job_id"], job_id);
    assert_eq!(json["status"], "pending");
    assert!(json.get("result").is_none());
    assert!(json.get("error").is_none());

    let (status, _) = job_row(&pool, &job_id).await;
    assert_eq!(status, "pending");
}

/// Reconciliation round-trip: a queue success is persisted on first poll
/// and a second poll yields the identical view with no divergence.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_success_is_persisted_and_idempotent(pool: PgPool) {
    common::sync_builtin_catalog(&pool).await;
    create_test_user(&pool, "winner", &["module1"]).await;

    let queue = StubQueue::new();
    let app = common::build_test_app(pool.clone(), queue.clone());
    let token = login_user(app.clone(), "winner").await;
    let job_id = dispatch(app.clone(), &token, "module1", serde_json::json!({})).await;

    let result = serde_json::json!({"patients_processed": 150, "anomalies_detected": 3});
    queue.set_state(&job_id, RemoteJobState::Succeeded { result: result.clone() });

    let first = body_json(get_auth(app.clone(), &format!("/api/v1/jobs/{job_id}"), &token).await).await;
    assert_eq!(first["status"], "success");
    assert_eq!(first["result"], result);

    let second = body_json(get_auth(app, &format!("/api/v1/jobs/{job_id}"), &token).await).await;
    assert_eq!(first, second, "re-polling must yield the same view");

    let (status, stored) = job_row(&pool, &job_id).await;
    assert_eq!(status, "success");
    assert_eq!(stored, Some(result));
}

/// A queue failure is persisted with its error message.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_failure_is_persisted_with_error(pool: PgPool) {
    common::sync_builtin_catalog(&pool).await;
    create_test_user(&pool, "loser", &["module1"]).await;

    let queue = StubQueue::new();
    let app = common::build_test_app(pool.clone(), queue.clone());
    let token = login_user(app.clone(), "loser").await;
    let job_id = dispatch(app.clone(), &token, "module1", serde_json::json!({})).await;

    queue.set_state(
        &job_id,
        RemoteJobState::Failed { error: "script crashed".into() },
    );

    let json = body_json(get_auth(app, &format!("/api/v1/jobs/{job_id}"), &token).await).await;
    assert_eq!(json["status"], "failed");
    assert_eq!(json["error"], "script crashed");

    let (status, result) = job_row(&pool, &job_id).await;
    assert_eq!(status, "failed");
    assert_eq!(result, None);
}

/// Intermediate backend states are mirrored verbatim, then superseded by
/// the terminal state.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_intermediate_state_is_mirrored(pool: PgPool) {
    common::sync_builtin_catalog(&pool).await;
    create_test_user(&pool, "watcher", &["module1"]).await;

    let queue = StubQueue::new();
    let app = common::build_test_app(pool.clone(), queue.clone());
    let token = login_user(app.clone(), "watcher").await;
    let job_id = dispatch(app.clone(), &token, "module1", serde_json::json!({})).await;

    queue.set_state(&job_id, RemoteJobState::Running);
    let json = body_json(get_auth(app.clone(), &format!("/api/v1/jobs/{job_id}"), &token).await).await;
    assert_eq!(json["status"], "running");
    let (status, _) = job_row(&pool, &job_id).await;
    assert_eq!(status, "running");

    queue.set_state(
        &job_id,
        RemoteJobState::Succeeded { result: serde_json::json!({"ok": true}) },
    );
    let json = body_json(get_auth(app, &format!("/api/v1/jobs/{job_id}"), &token).await).await;
    assert_eq!(json["status"], "success");
}

/// A terminal local record wins over a backend that has since forgotten
/// the job: the mirrored result stays available.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_forgotten_job_degrades_to_local_view(pool: PgPool) {
    common::sync_builtin_catalog(&pool).await;
    create_test_user(&pool, "keeper", &["module1"]).await;

    let queue = StubQueue::new();
    let app = common::build_test_app(pool.clone(), queue.clone());
    let token = login_user(app.clone(), "keeper").await;
    let job_id = dispatch(app.clone(), &token, "module1", serde_json::json!({})).await;

    let result = serde_json::json!({"reports_generated": 25});
    queue.set_state(&job_id, RemoteJobState::Succeeded { result: result.clone() });
    let _ = body_json(get_auth(app.clone(), &format!("/api/v1/jobs/{job_id}"), &token).await).await;

    // Backend loses the job (result expiry); the mirror still answers.
    queue.forget(&job_id);
    let json = body_json(get_auth(app, &format!("/api/v1/jobs/{job_id}"), &token).await).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["result"], result);
}

/// A job dispatched outside this gateway still polls fine as a queue-only
/// view, without creating a local record.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_untracked_job_degrades_to_queue_view(pool: PgPool) {
    create_test_user(&pool, "outsider", &[]).await;

    let queue = StubQueue::new();
    queue.set_state("ext-job-1", RemoteJobState::Running);
    let app = common::build_test_app(pool.clone(), queue);
    let token = login_user(app.clone(), "outsider").await;

    let response = get_auth(app, "/api/v1/jobs/ext-job-1", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "running");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0, "queue-only polls must not create records");
}

/// An identifier neither side knows is a 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_job_is_not_found(pool: PgPool) {
    create_test_user(&pool, "searcher", &[]).await;
    let app = common::build_test_app(pool, StubQueue::new());
    let token = login_user(app.clone(), "searcher").await;

    let response = get_auth(app, "/api/v1/jobs/no-such-job", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Dispatching twice with a colliding external id leaves exactly one
/// record, reset to pending with the second call's parameters.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_colliding_dispatch_upserts_record(pool: PgPool) {
    common::sync_builtin_catalog(&pool).await;
    create_test_user(&pool, "repeater", &["module1"]).await;

    let queue = StubQueue::new();
    queue.push_next_id("dup-1");
    queue.push_next_id("dup-1");
    let app = common::build_test_app(pool.clone(), queue.clone());
    let token = login_user(app.clone(), "repeater").await;

    let first = dispatch(app.clone(), &token, "module1", serde_json::json!({"run": 1})).await;
    assert_eq!(first, "dup-1");

    // Mark the first round terminal so the reset-to-pending is observable.
    queue.set_state("dup-1", RemoteJobState::Failed { error: "first run".into() });
    let _ = get_auth(app.clone(), "/api/v1/jobs/dup-1", &token).await;

    let second = dispatch(app.clone(), &token, "module1", serde_json::json!({"run": 2})).await;
    assert_eq!(second, "dup-1");

    let rows: Vec<(String, serde_json::Value, Option<String>)> = sqlx::query_as(
        "SELECT status, parameters, error_message FROM jobs WHERE external_id = 'dup-1'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 1, "collision must upsert, not duplicate");
    assert_eq!(rows[0].0, "pending");
    assert_eq!(rows[0].1, serde_json::json!({"run": 2}));
    assert_eq!(rows[0].2, None, "stale error must be cleared");
}

/// The history listing is scoped to the caller and newest-first.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_job_history_is_scoped_per_user(pool: PgPool) {
    common::sync_builtin_catalog(&pool).await;
    create_test_user(&pool, "alice", &["module1"]).await;
    create_test_user(&pool, "bob", &["module1"]).await;

    let app = common::build_test_app(pool, StubQueue::new());
    let alice_token = login_user(app.clone(), "alice").await;
    let bob_token = login_user(app.clone(), "bob").await;

    let first = dispatch(app.clone(), &alice_token, "module1", serde_json::json!({"n": 1})).await;
    let second = dispatch(app.clone(), &alice_token, "module1", serde_json::json!({"n": 2})).await;
    dispatch(app.clone(), &bob_token, "module1", serde_json::json!({})).await;

    let json = body_json(get_auth(app.clone(), "/api/v1/jobs", &alice_token).await).await;
    let jobs = json["data"].as_array().expect("data array");
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0]["job_id"], second, "newest first");
    assert_eq!(jobs[1]["job_id"], first);

    let json = body_json(get_auth(app, "/api/v1/jobs?limit=1", &bob_token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}
