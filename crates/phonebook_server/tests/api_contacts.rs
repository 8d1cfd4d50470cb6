use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use phonebook_core::db::{open_db, open_db_in_memory};
use phonebook_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    let conn = open_db_in_memory().expect("in-memory db should open");
    build_router(AppState::new(conn))
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone()
        .oneshot(request)
        .await
        .expect("request should not fail at the transport level")
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("response body should be readable");
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

async fn create_contact(app: &Router, name: &str, phone: &str) -> Value {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/contacts",
            &json!({"name": name, "phone": phone}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await
}

#[tokio::test]
async fn create_returns_201_with_serialized_contact() {
    let app = test_app();

    let created = create_contact(&app, "Alice", "123").await;

    assert_eq!(created.get("name").and_then(Value::as_str), Some("Alice"));
    assert_eq!(created.get("phone").and_then(Value::as_str), Some("123"));
    assert!(created.get("id").and_then(Value::as_i64).is_some());
}

#[tokio::test]
async fn created_contact_roundtrips_through_get_with_200() {
    let app = test_app();

    let created = create_contact(&app, "Alice", "123").await;
    let id = created.get("id").and_then(Value::as_i64).expect("id");

    let response = send(&app, empty_request("GET", &format!("/api/contacts/{id}"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = response_json(response).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_with_missing_field_returns_400() {
    let app = test_app();

    for body in [json!({"name": "Alice"}), json!({"phone": "123"}), json!({})] {
        let response = send(&app, json_request("POST", "/api/contacts", &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");

        let error = response_json(response).await;
        assert_eq!(
            error.get("message").and_then(Value::as_str),
            Some("Invalid input")
        );
    }
}

#[tokio::test]
async fn create_with_empty_field_returns_400() {
    let app = test_app();

    let response = send(
        &app,
        json_request("POST", "/api/contacts", &json!({"name": "", "phone": "123"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_body_returns_400() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/contacts")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("request should build");

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = response_json(response).await;
    assert_eq!(
        error.get("message").and_then(Value::as_str),
        Some("Invalid input")
    );
}

#[tokio::test]
async fn create_with_duplicate_phone_returns_409() {
    let app = test_app();
    create_contact(&app, "Alice", "555").await;

    let response = send(
        &app,
        json_request("POST", "/api/contacts", &json!({"name": "Bob", "phone": "555"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let error = response_json(response).await;
    assert_eq!(
        error.get("message").and_then(Value::as_str),
        Some("Phone number already exists")
    );
}

#[tokio::test]
async fn get_unknown_id_returns_404() {
    let app = test_app();

    let response = send(&app, empty_request("GET", "/api/contacts/42")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error = response_json(response).await;
    assert_eq!(
        error.get("message").and_then(Value::as_str),
        Some("Contact not found")
    );
}

#[tokio::test]
async fn put_replaces_fields_and_returns_204() {
    let app = test_app();
    let created = create_contact(&app, "Alice", "123").await;
    let id = created.get("id").and_then(Value::as_i64).expect("id");

    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/contacts/{id}"),
            &json!({"name": "Alicia", "phone": "456"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let bytes = to_bytes(response.into_body(), 1024).await.expect("body");
    assert!(bytes.is_empty(), "204 response must have no body");

    let fetched = send(&app, empty_request("GET", &format!("/api/contacts/{id}"))).await;
    let fetched = response_json(fetched).await;
    assert_eq!(fetched.get("name").and_then(Value::as_str), Some("Alicia"));
    assert_eq!(fetched.get("phone").and_then(Value::as_str), Some("456"));
    assert_eq!(fetched.get("id").and_then(Value::as_i64), Some(id));
}

#[tokio::test]
async fn put_unknown_id_returns_404() {
    let app = test_app();

    let response = send(
        &app,
        json_request(
            "PUT",
            "/api/contacts/42",
            &json!({"name": "Ghost", "phone": "000"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_to_phone_of_other_contact_returns_409() {
    let app = test_app();
    create_contact(&app, "Alice", "123").await;
    let bob = create_contact(&app, "Bob", "456").await;
    let bob_id = bob.get("id").and_then(Value::as_i64).expect("id");

    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/contacts/{bob_id}"),
            &json!({"name": "Bob", "phone": "123"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let fetched = send(
        &app,
        empty_request("GET", &format!("/api/contacts/{bob_id}")),
    )
    .await;
    let fetched = response_json(fetched).await;
    assert_eq!(
        fetched.get("phone").and_then(Value::as_str),
        Some("456"),
        "failed update must leave the record unchanged"
    );
}

#[tokio::test]
async fn put_with_missing_field_returns_400() {
    let app = test_app();
    let created = create_contact(&app, "Alice", "123").await;
    let id = created.get("id").and_then(Value::as_i64).expect("id");

    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/contacts/{id}"),
            &json!({"name": "Alicia"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_returns_204_then_get_returns_404() {
    let app = test_app();
    let created = create_contact(&app, "Alice", "123").await;
    let id = created.get("id").and_then(Value::as_i64).expect("id");

    let response = send(
        &app,
        empty_request("DELETE", &format!("/api/contacts/{id}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let gone = send(&app, empty_request("GET", &format!("/api/contacts/{id}"))).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    let again = send(
        &app,
        empty_request("DELETE", &format!("/api/contacts/{id}")),
    )
    .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_first_page_of_twelve_contacts() {
    let app = test_app();
    for n in 1..=12 {
        create_contact(&app, &format!("contact-{n:02}"), &format!("{n:04}")).await;
    }

    let response = send(
        &app,
        empty_request("GET", "/api/contacts?page=1&perPage=5"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let contacts = body
        .get("contacts")
        .and_then(Value::as_array)
        .expect("contacts array");
    assert_eq!(contacts.len(), 5);
    assert_eq!(body.get("total").and_then(Value::as_u64), Some(12));
    assert_eq!(body.get("pages").and_then(Value::as_u64), Some(3));
    assert_eq!(body.get("page").and_then(Value::as_u64), Some(1));
    assert_eq!(body.get("hasPrev").and_then(Value::as_bool), Some(false));
    assert_eq!(body.get("hasNext").and_then(Value::as_bool), Some(true));
    assert!(body.get("prevNum").is_none());
    assert_eq!(body.get("nextNum").and_then(Value::as_u64), Some(2));

    assert_eq!(
        contacts[0].get("name").and_then(Value::as_str),
        Some("contact-01"),
        "listing must follow insertion order"
    );
}

#[tokio::test]
async fn list_last_page_holds_the_remainder() {
    let app = test_app();
    for n in 1..=12 {
        create_contact(&app, &format!("contact-{n:02}"), &format!("{n:04}")).await;
    }

    let response = send(
        &app,
        empty_request("GET", "/api/contacts?page=3&perPage=5"),
    )
    .await;
    let body = response_json(response).await;

    let contacts = body
        .get("contacts")
        .and_then(Value::as_array)
        .expect("contacts array");
    assert_eq!(contacts.len(), 2);
    assert_eq!(body.get("hasNext").and_then(Value::as_bool), Some(false));
    assert!(body.get("nextNum").is_none());
    assert_eq!(body.get("prevNum").and_then(Value::as_u64), Some(2));
}

#[tokio::test]
async fn list_out_of_range_page_returns_empty_items_with_metadata() {
    let app = test_app();
    create_contact(&app, "Alice", "123").await;

    let response = send(
        &app,
        empty_request("GET", "/api/contacts?page=99&perPage=5"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let contacts = body
        .get("contacts")
        .and_then(Value::as_array)
        .expect("contacts array");
    assert!(contacts.is_empty());
    assert_eq!(body.get("total").and_then(Value::as_u64), Some(1));
    assert_eq!(body.get("pages").and_then(Value::as_u64), Some(1));
}

#[tokio::test]
async fn list_with_garbage_params_falls_back_to_defaults() {
    let app = test_app();
    for n in 1..=6 {
        create_contact(&app, &format!("contact-{n}"), &format!("{n}00")).await;
    }

    let response = send(
        &app,
        empty_request("GET", "/api/contacts?page=abc&perPage=-1"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let contacts = body
        .get("contacts")
        .and_then(Value::as_array)
        .expect("contacts array");
    assert_eq!(contacts.len(), 5, "default page size applies");
    assert_eq!(body.get("page").and_then(Value::as_u64), Some(1));
}

#[tokio::test]
async fn preflight_options_is_answered_with_cors_headers() {
    let app = test_app();

    let response = send(&app, empty_request("OPTIONS", "/api/contacts")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn regular_responses_carry_the_any_origin_header() {
    let app = test_app();

    let response = send(&app, empty_request("GET", "/api/contacts")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn file_backed_store_is_created_and_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("phonebook.db");

    let first = build_router(AppState::new(open_db(&db_path).expect("first open")));
    create_contact(&first, "Alice", "123").await;
    drop(first);

    let second = build_router(AppState::new(open_db(&db_path).expect("second open")));
    let response = send(&second, empty_request("GET", "/api/contacts")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body.get("total").and_then(Value::as_u64), Some(1));
    let contacts = body
        .get("contacts")
        .and_then(Value::as_array)
        .expect("contacts array");
    assert_eq!(
        contacts[0].get("name").and_then(Value::as_str),
        Some("Alice")
    );
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = test_app();

    let response = send(&app, empty_request("GET", "/api/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body.get("status").and_then(Value::as_str), Some("ok"));
}
