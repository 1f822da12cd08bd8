#![allow(clippy::unwrap_used)]
// Integration tests for `Backend` and the resource clients using wiremock.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tripdesk_core::model::{EntityId, ReservationStatus};
use tripdesk_core::requests::{CommentInput, LoginRequest, TripInput};
use tripdesk_core::{Backend, BackendConfig, CoreError, NormalizationMode, QueryStatus};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Backend) {
    setup_with_mode(NormalizationMode::Lenient).await
}

async fn setup_with_mode(mode: NormalizationMode) -> (MockServer, Backend) {
    let server = MockServer::start().await;
    let config = BackendConfig::new(Url::parse(&server.uri()).unwrap())
        .with_timeout(Duration::from_secs(5))
        .with_normalization(mode);
    let backend = Backend::new(config).unwrap();
    (server, backend)
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

fn trip_doc(id: &str, destination: &str, price: f64) -> Value {
    json!({
        "_id": id,
        "destination": destination,
        "description": "Guided tour",
        "debutDate": "2030-05-01",
        "endDate": "2030-05-08",
        "price": price,
        "reduction": 0,
        "isActive": true,
        "tripType": "Adventure",
    })
}

fn trip_input(destination: &str) -> TripInput {
    TripInput {
        destination: destination.into(),
        description: "Guided tour".into(),
        start_date: NaiveDate::from_ymd_opt(2030, 5, 1),
        end_date: NaiveDate::from_ymd_opt(2030, 5, 8),
        price: 1200.0,
        reduction: 10.0,
        is_available: true,
        trip_type: "Adventure".into(),
        image: None,
    }
}

// ── Queries ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_is_served_from_cache() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/events/get/e1"))
        .respond_with(ok(json!({ "_id": "e1", "title": "Jazz night", "price": "25" })))
        .expect(1)
        .mount(&server)
        .await;

    let id = EntityId::from("e1");
    let first = backend.events().get(&id).await.unwrap();
    let second = backend.events().get(&id).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    let event = Option::as_ref(&first).unwrap();
    assert_eq!(event.title, "Jazz night");
    assert!((event.price - 25.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_transport_404_is_not_a_sentinel() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/trip/get/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Trip not found" })))
        .mount(&server)
        .await;

    let err = backend.trips().get(&EntityId::from("missing")).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_message(), "Trip not found");
}

#[tokio::test]
async fn test_lenient_mode_serves_empty_values() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/trip/get"))
        .respond_with(ok(json!("not a list")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trip/get/t1"))
        .respond_with(ok(json!(42)))
        .mount(&server)
        .await;

    assert!(backend.trips().list().await.unwrap().is_empty());
    assert!(backend.trips().get(&EntityId::from("t1")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_strict_mode_surfaces_normalization_errors() {
    let (server, backend) = setup_with_mode(NormalizationMode::Strict).await;

    Mock::given(method("GET"))
        .and(path("/trip/get"))
        .respond_with(ok(json!("not a list")))
        .mount(&server)
        .await;

    let err = backend.trips().list().await.unwrap_err();
    assert!(matches!(err, CoreError::Normalization { ref operation, .. } if operation == "trip.list"));
}

#[tokio::test]
async fn test_envelope_fallback_depends_on_mode() {
    let bare = json!([{ "_id": "s1", "title": "Feedback", "status": "published" }]);

    let (server, lenient) = setup().await;
    Mock::given(method("GET"))
        .and(path("/survey/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bare.clone()))
        .mount(&server)
        .await;
    let surveys = lenient.surveys().list().await.unwrap();
    assert_eq!(surveys.len(), 1);
    assert_eq!(surveys[0].title, "Feedback");

    let (server, strict) = setup_with_mode(NormalizationMode::Strict).await;
    Mock::given(method("GET"))
        .and(path("/survey/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bare))
        .mount(&server)
        .await;
    assert!(strict.surveys().list().await.is_err());
}

#[tokio::test]
async fn test_filtered_responses_use_query_string() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/response/get"))
        .and(query_param("questionId", "q1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responses": [{ "_id": "r1", "questionId": "q1", "userId": "u1", "value": "Yes" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let responses = backend
        .responses()
        .list_for_question(&EntityId::from("q1"))
        .await
        .unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].value, "Yes");
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_refetches_subscribed_list() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/trip/get"))
        .respond_with(ok(json!([trip_doc("t1", "Tozeur", 900.0)])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trip/get"))
        .respond_with(ok(json!([trip_doc("t1", "Tozeur", 900.0), trip_doc("t2", "Djerba", 1200.0)])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/trip/add"))
        .respond_with(ok(trip_doc("t2", "Djerba", 1200.0)))
        .expect(1)
        .mount(&server)
        .await;

    let mut list = backend.trips().watch_list().unwrap();
    assert_eq!(list.settled().await.unwrap().len(), 1);

    let created = backend.trips().create(&trip_input("Djerba")).await.unwrap().unwrap();
    assert_eq!(created.id, EntityId::from("t2"));
    assert_eq!(list.status(), QueryStatus::Refetching);

    let refreshed = list.settled().await.unwrap();
    assert_eq!(refreshed.len(), 2);
    assert_eq!(refreshed[1].destination, "Djerba");
}

#[tokio::test]
async fn test_list_converges_after_rapid_updates() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/trip/get"))
        .respond_with(ok(json!([trip_doc("t1", "Tozeur", 100.0)])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trip/get"))
        .respond_with(ok(json!([trip_doc("t1", "Tozeur", 300.0)])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/trip/update/t1"))
        .respond_with(ok(trip_doc("t1", "Tozeur", 300.0)))
        .expect(2)
        .mount(&server)
        .await;

    let mut list = backend.trips().watch_list().unwrap();
    list.settled().await.unwrap();

    let id = EntityId::from("t1");
    let mut patch = trip_input("Tozeur");
    patch.price = 200.0;
    backend.trips().update(&id, &patch).await.unwrap();
    patch.price = 300.0;
    backend.trips().update(&id, &patch).await.unwrap();

    let trips = list.settled().await.unwrap();
    assert!((trips[0].price - 300.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_validation_blocks_request() {
    let (server, backend) = setup().await;

    Mock::given(method("POST"))
        .and(path("/trip/add"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut input = trip_input("");
    input.price = 0.0;
    let err = backend.trips().create(&input).await.unwrap_err();

    let CoreError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(errors.get("destination"), Some("Destination is required"));
    assert_eq!(errors.get("price"), Some("Price must be greater than 0"));
}

#[tokio::test]
async fn test_rejected_mutation_does_not_invalidate() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/events/get"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/events/delete/e1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "message": "Event has reservations" })),
        )
        .mount(&server)
        .await;

    let mut list = backend.events().watch_list().unwrap();
    list.settled().await.unwrap();

    let err = backend.events().delete(&EntityId::from("e1")).await.unwrap_err();
    assert!(matches!(err, CoreError::Rejected { ref message, .. } if message == "Event has reservations"));
    assert_eq!(list.status(), QueryStatus::Resolved);
}

#[tokio::test]
async fn test_add_comment_refreshes_post_list() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/community/get"))
        .respond_with(ok(json!([{ "_id": "p1", "text": "Hello", "comments": [] }])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/community/p1/comment"))
        .and(body_json(json!({ "text": "Nice trip!" })))
        .respond_with(ok(json!([{ "_id": "c1", "text": "Nice trip!" }])))
        .expect(1)
        .mount(&server)
        .await;

    let mut posts = backend.community().watch_posts().unwrap();
    posts.settled().await.unwrap();

    let thread = backend
        .community()
        .add_comment(&EntityId::from("p1"), &CommentInput { text: "Nice trip!".into() })
        .await
        .unwrap();
    assert_eq!(thread.len(), 1);

    posts.settled().await.unwrap();
}

#[tokio::test]
async fn test_reservation_status_refreshes_dashboard() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dashboard/user-stats"))
        .respond_with(ok(json!({ "totalUsers": 12 })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/reservation/status/r1"))
        .and(body_json(json!({ "status": "confirmed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reservation": { "_id": "r1", "status": "confirmed" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut stats = backend.dashboard().watch_user_stats().unwrap();
    assert_eq!(stats.settled().await.unwrap().total_users, 12);

    let updated = backend
        .reservations()
        .update_status(&EntityId::from("r1"), ReservationStatus::Confirmed)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, ReservationStatus::Confirmed);

    stats.settled().await.unwrap();
}

// ── Session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_stores_admin_token() {
    let (server, backend) = setup().await;

    Mock::given(method("POST"))
        .and(path("/admin/login"))
        .and(body_json(json!({ "email": "ops@tripdesk.test", "password": "hunter22" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Login successful",
            "token": "jwt-admin",
            "admin": { "_id": "a1", "name": "Ops", "email": "ops@tripdesk.test" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reward/get"))
        .and(header("authorization", "Bearer jwt-admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rewards": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let session = backend
        .login(&LoginRequest {
            email: "ops@tripdesk.test".into(),
            password: SecretString::from("hunter22"),
        })
        .await
        .unwrap();
    assert_eq!(session.outcome.message, "Login successful");
    assert_eq!(session.outcome.admin.unwrap().name, "Ops");
    assert!(backend.is_authenticated());

    assert!(backend.rewards().list().await.unwrap().is_empty());

    backend.logout();
    assert!(!backend.is_authenticated());
    assert!(backend.cache().is_empty());
}

#[tokio::test]
async fn test_login_without_token_fails() {
    let (server, backend) = setup().await;

    Mock::given(method("POST"))
        .and(path("/admin/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .mount(&server)
        .await;

    let err = backend
        .login(&LoginRequest {
            email: "ops@tripdesk.test".into(),
            password: SecretString::from("hunter22"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::MissingToken { .. }));
    assert!(!backend.is_authenticated());
}
