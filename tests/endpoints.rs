//! Typed endpoint round-trips and error mapping against a local mock server.

use chrono::{TimeZone, Utc};
use gatherkit::{ApiClient, ApiError, EventDraft, EventFilter, Role, TokenStore};
use mockito::Matcher;

const EVENT_BODY: &str = r#"{
    "id": 12,
    "title": "Rust study circle",
    "description": "Weekly meetup",
    "language": "English",
    "location": "Berlin",
    "starts_at": "2026-09-01T18:00:00Z",
    "ends_at": "2026-09-01T20:00:00Z",
    "capacity": 20,
    "created_by": 7,
    "created_by_email": "mira@example.com",
    "available_seats": 3,
    "total_enrollments": 17,
    "is_past": false
}"#;

const ENROLLMENT_BODY: &str = r#"{
    "id": 4,
    "event": 12,
    "event_title": "Rust study circle",
    "status": "enrolled"
}"#;

fn signed_in_client(server: &mockito::Server) -> ApiClient {
    let store = TokenStore::in_memory();
    store.set("A1".into(), Some("R1".into())).unwrap();
    ApiClient::new(server.url(), store).unwrap()
}

fn draft() -> EventDraft {
    EventDraft {
        title: "Rust study circle".into(),
        description: "Weekly meetup".into(),
        language: "English".into(),
        location: "Berlin".into(),
        starts_at: Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap(),
        ends_at: Utc.with_ymd_and_hms(2026, 9, 1, 20, 0, 0).unwrap(),
        capacity: Some(20),
    }
}

#[tokio::test]
async fn list_events_passes_filter_as_query() {
    let mut server = mockito::Server::new_async().await;
    let events_mock = server
        .mock("GET", "/events/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("location".into(), "Berlin".into()),
            Matcher::UrlEncoded("q".into(), "rust".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!("[{EVENT_BODY}]"))
        .create_async()
        .await;

    let filter = EventFilter {
        location: Some("Berlin".into()),
        text: Some("rust".into()),
        ..Default::default()
    };
    let events = signed_in_client(&server).list_events(&filter).await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Rust study circle");
    events_mock.assert_async().await;
}

#[tokio::test]
async fn create_event_posts_draft_and_parses_response() {
    let mut server = mockito::Server::new_async().await;
    let create_mock = server
        .mock("POST", "/events/")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "title": "Rust study circle",
            "capacity": 20
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(EVENT_BODY)
        .create_async()
        .await;

    let event = signed_in_client(&server).create_event(&draft()).await.unwrap();

    assert_eq!(event.id, 12);
    assert_eq!(event.available_seats, Some(3));
    create_mock.assert_async().await;
}

#[tokio::test]
async fn update_event_puts_to_the_event_path() {
    let mut server = mockito::Server::new_async().await;
    let update_mock = server
        .mock("PUT", "/events/12/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(EVENT_BODY)
        .create_async()
        .await;

    let event = signed_in_client(&server)
        .update_event(12, &draft())
        .await
        .unwrap();

    assert_eq!(event.id, 12);
    update_mock.assert_async().await;
}

#[tokio::test]
async fn delete_event_accepts_empty_response() {
    let mut server = mockito::Server::new_async().await;
    let delete_mock = server
        .mock("DELETE", "/events/12/")
        .with_status(204)
        .create_async()
        .await;

    signed_in_client(&server).delete_event(12).await.unwrap();
    delete_mock.assert_async().await;
}

#[tokio::test]
async fn event_enrollments_lists_attendees() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/events/12/enrollments/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!("[{ENROLLMENT_BODY}]"))
        .create_async()
        .await;

    let enrollments = signed_in_client(&server).event_enrollments(12).await.unwrap();
    assert_eq!(enrollments.len(), 1);
    assert!(enrollments[0].is_active());
}

#[tokio::test]
async fn enroll_posts_event_id() {
    let mut server = mockito::Server::new_async().await;
    let enroll_mock = server
        .mock("POST", "/enrollments/")
        .match_body(Matcher::Json(serde_json::json!({"event": 12})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(ENROLLMENT_BODY)
        .create_async()
        .await;

    let enrollment = signed_in_client(&server).enroll(12).await.unwrap();
    assert_eq!(enrollment.event, 12);
    enroll_mock.assert_async().await;
}

#[tokio::test]
async fn cancel_enrollment_patches_status() {
    let mut server = mockito::Server::new_async().await;
    let cancel_mock = server
        .mock("PATCH", "/enrollments/4/")
        .match_body(Matcher::Json(serde_json::json!({"status": "canceled"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 4, "event": 12, "status": "canceled"}"#)
        .create_async()
        .await;

    let enrollment = signed_in_client(&server).cancel_enrollment(4).await.unwrap();
    assert!(!enrollment.is_active());
    cancel_mock.assert_async().await;
}

#[tokio::test]
async fn past_enrollments_hits_the_past_route() {
    let mut server = mockito::Server::new_async().await;
    let past_mock = server
        .mock("GET", "/enrollments/past/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let enrollments = signed_in_client(&server).past_enrollments().await.unwrap();
    assert!(enrollments.is_empty());
    past_mock.assert_async().await;
}

#[tokio::test]
async fn signup_sends_role_and_returns_unit() {
    let mut server = mockito::Server::new_async().await;
    let signup_mock = server
        .mock("POST", "/auth/signup/")
        .match_body(Matcher::Json(serde_json::json!({
            "email": "tam@example.com",
            "password": "hunter22",
            "role": "Seeker"
        })))
        .with_status(201)
        .with_body(r#"{"detail": "User created successfully.", "code": "signup_success"}"#)
        .create_async()
        .await;

    ApiClient::new(server.url(), TokenStore::in_memory())
        .unwrap()
        .signup("tam@example.com", "hunter22", Role::Seeker)
        .await
        .unwrap();
    signup_mock.assert_async().await;
}

#[tokio::test]
async fn signup_validation_errors_are_field_keyed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/signup/")
        .with_status(400)
        .with_body(r#"{"email": ["A user with this email already exists."]}"#)
        .create_async()
        .await;

    let err = ApiClient::new(server.url(), TokenStore::in_memory())
        .unwrap()
        .signup("tam@example.com", "hunter22", Role::Seeker)
        .await
        .unwrap_err();

    let ApiError::BadRequest(detail) = err else {
        panic!("expected bad request, got {err:?}");
    };
    assert!(detail.message().contains("already exists"));
}

#[tokio::test]
async fn verify_email_posts_otp() {
    let mut server = mockito::Server::new_async().await;
    let verify_mock = server
        .mock("POST", "/auth/verify-email/")
        .match_body(Matcher::Json(serde_json::json!({
            "email": "tam@example.com",
            "otp": "482913"
        })))
        .with_status(200)
        .with_body(r#"{"detail": "Email verified successfully.", "code": "email_verified"}"#)
        .create_async()
        .await;

    ApiClient::new(server.url(), TokenStore::in_memory())
        .unwrap()
        .verify_email("tam@example.com", "482913")
        .await
        .unwrap();
    verify_mock.assert_async().await;
}

#[tokio::test]
async fn forbidden_responses_map_without_retry() {
    let mut server = mockito::Server::new_async().await;
    let create_mock = server
        .mock("POST", "/events/")
        .with_status(403)
        .with_body(r#"{"detail": "You can only modify events you created.", "code": "permission_denied"}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh_mock = server
        .mock("POST", "/auth/refresh/")
        .expect(0)
        .create_async()
        .await;

    let err = signed_in_client(&server).create_event(&draft()).await.unwrap_err();

    let ApiError::Forbidden(detail) = err else {
        panic!("expected forbidden, got {err:?}");
    };
    assert!(detail.message().contains("only modify events"));
    create_mock.assert_async().await;
    refresh_mock.assert_async().await;
}

#[tokio::test]
async fn server_errors_pass_through_untouched() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/events/12/")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;
    let refresh_mock = server
        .mock("POST", "/auth/refresh/")
        .expect(0)
        .create_async()
        .await;

    let err = signed_in_client(&server).event(12).await.unwrap_err();

    assert!(matches!(err, ApiError::Server(_)));
    refresh_mock.assert_async().await;
}
