//! Integration tests against a mock backend.
//!
//! These tests drive the console services over real HTTP using wiremock,
//! with the session persisted in a temporary directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{
    body_json, header, header_exists, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{AppError, HttpClientConfig, PollConfig, SchedulerConfig, SessionConfig};
use console_lib::clients::LoginRequest;
use console_lib::services::AssumeYes;
use console_lib::session::{FileSessionStore, Session, SessionProvider};
use console_lib::{AppState, ConsoleConfig};
use domain::{ApprovalDecision, StoreLookup, UserStatus, WarningKind};

const TOKEN: &str = "test-admin-token";

// =============================================================================
// Harness
// =============================================================================

struct Harness {
    server: MockServer,
    state: AppState,
    session_path: PathBuf,
    _dir: TempDir,
}

fn config(base_url: String, session_path: PathBuf, timeout_secs: u64) -> ConsoleConfig {
    ConsoleConfig {
        http: HttpClientConfig {
            base_url,
            request_timeout_secs: timeout_secs,
            analytics_timeout_secs: timeout_secs,
        },
        scheduler: SchedulerConfig {
            max_concurrent: 8,
            burst: 16,
            refill_interval_ms: 1,
        },
        session: SessionConfig { path: session_path },
        poll: PollConfig::default(),
    }
}

async fn harness_with_timeout(logged_in: bool, timeout_secs: u64) -> Harness {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("session.json");

    let store = Arc::new(FileSessionStore::new(&session_path));
    if logged_in {
        store.acquire(Session::new(TOKEN, None)).await.unwrap();
    }

    let state = AppState::with_session(
        config(server.uri(), session_path.clone(), timeout_secs),
        store,
    )
    .unwrap();

    Harness {
        server,
        state,
        session_path,
        _dir: dir,
    }
}

async fn harness(logged_in: bool) -> Harness {
    harness_with_timeout(logged_in, 5).await
}

/// Answer every role-scoped listing with an empty `{users: []}` envelope.
async fn mount_empty_scoped(server: &MockServer, except: &[&str]) {
    for role in ["player", "coach", "seller", "delivery"] {
        if except.contains(&role) {
            continue;
        }
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .and(query_param("role", role))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
            .mount(server)
            .await;
    }
}

async fn mount_broad(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param_is_missing("role"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// =============================================================================
// Aggregation
// =============================================================================

#[tokio::test]
async fn test_store_entry_is_merged_across_queries() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param_is_missing("role"))
        .and(query_param("status", "pending"))
        .and(query_param("limit", "1000"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"_id": "A", "role": "seller"}])),
        )
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("role", "seller"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"users": [{"_id": "A", "role": "seller", "storeName": "Acme"}]}
        })))
        .mount(&h.server)
        .await;
    mount_empty_scoped(&h.server, &["seller"]).await;

    let view = h.state.approvals.pending_queue(false).await.unwrap();

    assert_eq!(view.stores.len(), 1);
    assert_eq!(view.stores[0].id, "A");
    assert_eq!(view.stores[0].extra_str("storeName"), Some("Acme"));
    assert!(view.warnings.is_empty());
}

#[tokio::test]
async fn test_requests_carry_token_and_request_id() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(header_exists("X-Request-Id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(5)
        .mount(&h.server)
        .await;

    let view = h.state.approvals.pending_queue(false).await.unwrap();

    assert!(view.is_empty());
}

#[tokio::test]
async fn test_forbidden_role_degrades_with_one_warning() {
    let h = harness(true).await;

    mount_broad(&h.server, json!({"users": []})).await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("role", "coach"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Access denied"})))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("role", "seller"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"_id": "S1", "role": "seller"}])),
        )
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("role", "delivery"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"_id": "D1", "role": "delivery"}])),
        )
        .mount(&h.server)
        .await;
    mount_empty_scoped(&h.server, &["coach", "seller", "delivery"]).await;

    let view = h.state.approvals.pending_queue(false).await.unwrap();

    assert!(view.coaches.is_empty());
    assert_eq!(view.stores.len(), 1);
    assert_eq!(view.delivery.len(), 1);
    assert_eq!(view.warnings.len(), 1);
    assert_eq!(view.warnings[0].kind, WarningKind::Permission);
}

#[tokio::test]
async fn test_rate_limited_query_is_not_fatal() {
    let h = harness(true).await;

    mount_broad(&h.server, json!([])).await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("role", "player"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2"))
        .mount(&h.server)
        .await;
    mount_empty_scoped(&h.server, &["player"]).await;

    let view = h.state.approvals.pending_queue(false).await.unwrap();

    assert!(view.has_warning(WarningKind::RateLimited));
}

// =============================================================================
// Session
// =============================================================================

#[tokio::test]
async fn test_unauthorized_response_clears_session() {
    let h = harness(true).await;
    assert!(h.session_path.exists());

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .mount(&h.server)
        .await;

    let err = h.state.approvals.pending_queue(false).await.unwrap_err();

    assert!(matches!(err, AppError::SessionExpired));
    assert!(err.is_fatal());
    assert!(!h.session_path.exists());
    assert!(h.state.session.current().await.unwrap().is_none());
}

#[tokio::test]
async fn test_calls_without_session_are_rejected_locally() {
    let h = harness(false).await;

    let err = h.state.users.show("u1").await.unwrap_err();

    assert!(matches!(err, AppError::NotAuthenticated));
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_persists_session() {
    let h = harness(false).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/admin/login"))
        .and(body_json(json!({"email": "root@club.in", "password": "s3cret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"token": "fresh-token", "admin": {"_id": "a1", "name": "Root"}}
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let session = h
        .state
        .auth
        .login(LoginRequest::new(" root@club.in ", "s3cret"))
        .await
        .unwrap();

    assert_eq!(session.token, "fresh-token");
    assert!(h.session_path.exists());

    let reopened = FileSessionStore::new(&h.session_path);
    let stored = reopened.current().await.unwrap().unwrap();
    assert_eq!(stored.token, "fresh-token");
    assert_eq!(stored.admin_label(), "Root");
}

#[tokio::test]
async fn test_login_rejection_is_invalid_credentials() {
    let h = harness(false).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/admin/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid"})))
        .mount(&h.server)
        .await;

    let err = h
        .state
        .auth
        .login(LoginRequest::new("root@club.in", "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidCredentials));
    assert!(!h.session_path.exists());
}

#[tokio::test]
async fn test_invalid_login_is_not_sent() {
    let h = harness(false).await;

    let err = h
        .state
        .auth
        .login(LoginRequest::new("not-an-email", "pw"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// Decisions
// =============================================================================

#[tokio::test]
async fn test_approve_sends_put_then_refetches() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"_id": "u1", "name": "Kiran", "role": "coach", "status": "pending"}
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/users/u1"))
        .and(body_json(json!({"status": "active"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .expect(5)
        .mount(&h.server)
        .await;

    let outcome = h
        .state
        .approvals
        .decide("u1", ApprovalDecision::Approve, &AssumeYes)
        .await
        .unwrap();

    assert_eq!(outcome.status, UserStatus::Active);
    assert_eq!(outcome.name, "Kiran");
    assert!(!outcome.queue.contains("u1"));
}

#[tokio::test]
async fn test_failed_decision_surfaces_server_message() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "u1", "role": "seller", "status": "pending"
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/users/u1"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Documents incomplete"})),
        )
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h
        .state
        .approvals
        .decide("u1", ApprovalDecision::Reject, &AssumeYes)
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Documents incomplete");
}

#[tokio::test]
async fn test_empty_user_body_is_not_found() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/users/gone"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("", "application/json"))
        .mount(&h.server)
        .await;

    let err = h.state.users.show("gone").await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_user_id_is_sent_as_one_path_segment() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/users/a%2Fb%3Fx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "a/b?x", "role": "player", "status": "active"
        })))
        .expect(1..)
        .mount(&h.server)
        .await;

    let detail = h.state.users.show("a/b?x").await.unwrap();

    assert_eq!(detail.user.id, "a/b?x");
}

#[tokio::test]
async fn test_set_status_allows_administrative_states() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/users/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "p1", "role": "player", "status": "active"
        })))
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/users/p1"))
        .and(body_json(json!({"status": "suspended"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "p1", "role": "player", "status": "suspended"
        })))
        .mount(&h.server)
        .await;

    let user = h
        .state
        .users
        .set_status("p1", UserStatus::Suspended)
        .await
        .unwrap();

    assert_eq!(user.status, UserStatus::Suspended);
}

// =============================================================================
// Enrichment
// =============================================================================

#[tokio::test]
async fn test_show_user_attaches_store_profile() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/users/u7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "_id": "u7",
                "role": "seller",
                "status": "pending",
                "location": {"city": "Pune"},
                "documents": {"pan": "pan.png"}
            }
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stores"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"_id": "st1", "userId": {"_id": "u7"}, "storeName": "Acme",
                 "documents": {"gstCertificate": "gst.pdf"}},
                {"_id": "st2", "userId": "someone-else"}
            ]
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let detail = h.state.users.show("u7").await.unwrap();

    assert!(detail.warnings.is_empty());
    assert!(detail.user.documents.contains("pan"));
    assert!(detail.user.documents.contains("gstCertificate"));
    assert_eq!(detail.user.role_data.map(|p| p.id), Some("st1".to_string()));
    assert!(detail.user.location.is_some());
}

#[tokio::test]
async fn test_delivery_roster_comes_from_available_partners() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/users/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "d1", "role": "delivery", "status": "pending"
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/delivery/available"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let detail = h.state.users.show("d1").await.unwrap();

    assert_eq!(detail.user.id, "d1");
    assert!(detail.user.role_data.is_none());
    assert_eq!(detail.warnings.len(), 1);
    assert_eq!(detail.warnings[0].kind, WarningKind::Enrichment);
}

// =============================================================================
// Dashboard, shop and support
// =============================================================================

#[tokio::test]
async fn test_dashboard_survives_analytics_failure() {
    let h = harness(true).await;

    mount_broad(
        &h.server,
        json!([
            {"_id": "p1", "role": "player", "status": "active"},
            {"_id": "c1", "role": "coach", "status": "pending"},
            {"_id": "c2", "role": "coach", "status": "rejected"},
            {"_id": "s1", "role": "seller", "status": "active"}
        ]),
    )
    .await;
    mount_empty_scoped(&h.server, &[]).await;
    Mock::given(method("GET"))
        .and(path("/api/admin/shop/analytics"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&h.server)
        .await;

    let summary = h.state.dashboard.summary(Utc::now()).await.unwrap();

    assert_eq!(summary.total_users, 4);
    assert_eq!(summary.pending, 1);
    assert!(summary.shop.is_none());
    assert!(summary.warnings.iter().any(|w| w.kind == WarningKind::Analytics));
}

#[tokio::test]
async fn test_missing_store_needs_registration() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/admin/shop/stores/s404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Store not found"})))
        .mount(&h.server)
        .await;

    let lookup = h.state.shop.store_lookup("s404").await.unwrap();

    assert_eq!(lookup, StoreLookup::NeedsRegistration);
}

#[tokio::test]
async fn test_non_json_success_is_invalid_response() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/admin/support/tickets/t1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html>maintenance</html>", "text/html"),
        )
        .mount(&h.server)
        .await;

    let err = h.state.support.show("t1").await.unwrap_err();

    assert!(matches!(err, AppError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_ticket_reply_posts_message() {
    let h = harness(true).await;

    Mock::given(method("POST"))
        .and(path("/api/admin/support/tickets/t1/reply"))
        .and(body_json(json!({"message": "We are on it"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/support/tickets/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "_id": "t1",
                "subject": "Order missing",
                "status": "in_progress",
                "replies": [{"message": "We are on it", "from": "admin"}]
            }
        })))
        .mount(&h.server)
        .await;

    let ticket = h.state.support.reply("t1", "  We are on it  ").await.unwrap();

    assert_eq!(ticket.replies.len(), 1);
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let h = harness_with_timeout(true, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/admin/shop/analytics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"totalOrders": 3}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&h.server)
        .await;

    let err = h.state.shop.analytics().await.unwrap_err();

    assert!(matches!(err, AppError::Timeout(_)));
    assert!(err.is_retryable());
}
