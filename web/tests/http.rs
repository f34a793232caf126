//! HTTP-level tests of the full router: identity extraction, status
//! codes, and the JSON contract of each endpoint.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use janseva_core::types::Role;
use janseva_core::ApplicationStatus;
use janseva_testing::fixtures;
use janseva_web::extractors::{USER_ID_HEADER, USER_ROLE_HEADER};
use janseva_web::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    state: AppState,
}

impl TestApp {
    fn new() -> Self {
        Self {
            state: AppState::in_memory(),
        }
    }

    fn router(&self) -> Router {
        router(self.state.clone())
    }

    fn birth_certificate_id(&self) -> String {
        self.state
            .lifecycle
            .catalog()
            .find_by_name("Birth Certificate")
            .unwrap()
            .id
            .to_string()
    }

    async fn request(
        &self,
        method: &str,
        uri: &str,
        identity: Option<(Uuid, Role)>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((user, role)) = identity {
            builder = builder
                .header(USER_ID_HEADER, user.to_string())
                .header(USER_ROLE_HEADER, role.to_string());
        }
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Submits a birth-certificate application, returning its id.
    async fn submit(&self, applicant: Uuid) -> String {
        let body = json!({
            "service_id": self.birth_certificate_id(),
            "applicant_details": fixtures::applicant_details(),
            "additional_info": { "child_name": "Aarav" },
        });
        let (status, response) = self
            .request(
                "POST",
                "/api/applications",
                Some((applicant, Role::Citizen)),
                Some(body),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(response["status"], "pending");
        response["application_id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn health_is_open() {
    let app = TestApp::new();
    let (status, _) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn api_requires_identity_headers() {
    let app = TestApp::new();
    let (status, body) = app.request("GET", "/api/applications", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn submission_assigns_server_side_fields() {
    let app = TestApp::new();
    let applicant = Uuid::new_v4();
    let id = app.submit(applicant).await;
    assert!(Uuid::parse_str(&id).is_ok());

    let (status, record) = app
        .request(
            "GET",
            &format!("/api/applications/{id}"),
            Some((applicant, Role::Citizen)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["status"], "pending");
    assert_eq!(record["status_history"].as_array().unwrap().len(), 1);
    // Catalog fee for a birth certificate, in paise.
    assert_eq!(record["fee_amount"], 5000);
}

#[tokio::test]
async fn unknown_service_is_not_found() {
    let app = TestApp::new();
    let body = json!({
        "service_id": Uuid::new_v4().to_string(),
        "applicant_details": fixtures::applicant_details(),
    });
    let (status, response) = app
        .request(
            "POST",
            "/api/applications",
            Some((Uuid::new_v4(), Role::Citizen)),
            Some(body),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["code"], "NOT_FOUND");
}

#[tokio::test]
async fn invalid_applicant_details_are_bad_request() {
    let app = TestApp::new();
    let mut details = fixtures::applicant_details();
    details.phone = "12345".to_string();
    let body = json!({
        "service_id": app.birth_certificate_id(),
        "applicant_details": details,
    });
    let (status, response) = app
        .request(
            "POST",
            "/api/applications",
            Some((Uuid::new_v4(), Role::Citizen)),
            Some(body),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn status_transitions_over_http() {
    let app = TestApp::new();
    let applicant = Uuid::new_v4();
    let officer = Uuid::new_v4();
    let id = app.submit(applicant).await;

    // A citizen may not transition.
    let (status, response) = app
        .request(
            "PUT",
            &format!("/api/applications/{id}/status"),
            Some((applicant, Role::Citizen)),
            Some(json!({ "status": "under_review" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(response["code"], "FORBIDDEN");

    // An officer may.
    let (status, updated) = app
        .request(
            "PUT",
            &format!("/api/applications/{id}/status"),
            Some((officer, Role::Officer)),
            Some(json!({ "status": "under_review", "remarks": "taken up" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "under_review");
    assert_eq!(updated["status_history"].as_array().unwrap().len(), 2);

    // Illegal jumps are a conflict.
    let (status, response) = app
        .request(
            "PUT",
            &format!("/api/applications/{id}/status"),
            Some((officer, Role::Officer)),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["code"], "ILLEGAL_TRANSITION");

    // The status view reflects the committed history.
    let (status, view) = app
        .request(
            "GET",
            &format!("/api/applications/{id}/status"),
            Some((applicant, Role::Citizen)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "under_review");
    assert_eq!(view["status_history"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn citizens_are_scoped_to_their_own_listings() {
    let app = TestApp::new();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    app.submit(alice).await;
    app.submit(bob).await;

    let (status, page) = app
        .request(
            "GET",
            "/api/applications",
            Some((alice, Role::Citizen)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);

    let (status, page) = app
        .request(
            "GET",
            "/api/applications",
            Some((Uuid::new_v4(), Role::Officer)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn strangers_get_404_or_403_not_data() {
    let app = TestApp::new();
    let id = app.submit(Uuid::new_v4()).await;

    let (status, _) = app
        .request(
            "GET",
            &format!("/api/applications/{id}"),
            Some((Uuid::new_v4(), Role::Citizen)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            "GET",
            &format!("/api/applications/{}", Uuid::new_v4()),
            Some((Uuid::new_v4(), Role::Officer)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notification_self_service_round_trip() {
    let app = TestApp::new();
    let applicant = Uuid::new_v4();
    app.submit(applicant).await;

    let (status, page) = app
        .request(
            "GET",
            "/api/notifications?unread_only=true",
            Some((applicant, Role::Citizen)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    let note_id = items[0]["id"].as_str().unwrap().to_string();

    // Another user cannot touch it.
    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/notifications/{note_id}/read"),
            Some((Uuid::new_v4(), Role::Citizen)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The recipient can.
    let (status, note) = app
        .request(
            "PUT",
            &format!("/api/notifications/{note_id}/read"),
            Some((applicant, Role::Citizen)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(note["is_read"], true);

    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/notifications/{note_id}"),
            Some((applicant, Role::Citizen)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn statistics_endpoints() {
    let app = TestApp::new();
    let applicant = Uuid::new_v4();
    app.submit(applicant).await;

    // System statistics need identity like every other endpoint, but
    // any role will do.
    let (status, _) = app.request("GET", "/api/statistics", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, stats) = app
        .request(
            "GET",
            "/api/statistics",
            Some((applicant, Role::Citizen)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_services"], 6);
    assert_eq!(stats["applications_processed"], 0);

    // Personal statistics require identity.
    let (status, _) = app.request("GET", "/api/statistics/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, stats) = app
        .request(
            "GET",
            "/api/statistics/me",
            Some((applicant, Role::Citizen)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_applications"], 1);
    assert_eq!(stats["pending_applications"], 1);
}

#[tokio::test]
async fn audit_log_is_admin_only() {
    let app = TestApp::new();
    let applicant = Uuid::new_v4();
    app.submit(applicant).await;

    let (status, _) = app
        .request("GET", "/api/audit", Some((applicant, Role::Citizen)), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, page) = app
        .request(
            "GET",
            "/api/audit?action=APPLICATION_SUBMITTED",
            Some((Uuid::new_v4(), Role::Admin)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_cursor_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .request(
            "GET",
            "/api/applications?cursor=garbage",
            Some((Uuid::new_v4(), Role::Citizen)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}
