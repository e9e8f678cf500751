use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::registry::registry_router;

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn create_then_fetch_student() {
    let router = registry_router(shared_registry());

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/students",
            serde_json::to_value(student_draft("72345678")).expect("draft json"),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json_body(response).await;
    let id = created["id"].as_i64().expect("numeric id");

    let response = router
        .oneshot(
            Request::get(format!("/students/{id}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["dni"], "72345678");
    assert_eq!(payload["current_cycle"], 1);
}

#[tokio::test]
async fn unknown_student_is_404() {
    let router = registry_router(shared_registry());
    let response = router
        .oneshot(
            Request::get("/students/77")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "student 77 not found");
}

#[tokio::test]
async fn invalid_course_payload_lists_details() {
    let router = registry_router(shared_registry());
    let response = router
        .oneshot(json_request(
            "POST",
            "/courses",
            json!({ "code": "FIS101", "name": "Física General", "credits": 9, "cycle": 1 }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "validation failed");
    assert_eq!(payload["details"][0], "credits must be between 1 and 5");
}

#[tokio::test]
async fn deleting_a_course_hides_it() {
    let registry = shared_registry();
    let course = registry
        .create_course(course_draft("QUI101", 1))
        .expect("course");
    let router = registry_router(registry);

    let response = router
        .clone()
        .oneshot(
            Request::delete(format!("/courses/{}", course.id))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::get(format!("/courses/{}", course.id))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_registry_bodies_are_bad_requests() {
    let router = registry_router(shared_registry());

    let created = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/students",
            serde_json::to_value(student_draft("73456789")).expect("draft json"),
        ))
        .await
        .expect("route executes");
    let student_id = read_json_body(created).await["id"].as_i64().expect("numeric id");

    let created = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/courses",
            json!({ "code": "FIS101", "name": "Física General", "credits": 4, "cycle": 1 }),
        ))
        .await
        .expect("route executes");
    let course_id = read_json_body(created).await["id"].as_i64().expect("numeric id");

    let cases = [
        ("POST", "/students".to_string(), json!({ "first_name": 42, "dni": "73456780" })),
        ("PUT", format!("/students/{student_id}"), json!({ "age": "twenty" })),
        ("POST", "/courses".to_string(), json!({ "code": "FIS102", "credits": "four" })),
        ("PUT", format!("/courses/{course_id}"), json!({ "code": 101 })),
    ];

    for (method, uri, body) in cases {
        let response = router
            .clone()
            .oneshot(json_request(method, &uri, body))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {uri}");
        let payload = read_json_body(response).await;
        assert!(payload["error"]
            .as_str()
            .expect("error message")
            .starts_with("malformed request body"));
        assert!(payload.get("details").is_none());
    }
}
