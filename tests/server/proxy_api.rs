use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{assert_cors_headers, spawn_app, spawn_app_with_upstream};

#[tokio::test]
async fn test_upstream_status_and_body_pass_through() {
    let app = spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/users/7"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "not found"})))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app
        .client
        .get(app.url("/api/users/7"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors_headers(&response);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"detail": "not found"}));
}

#[tokio::test]
async fn test_preflight_short_circuits() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.upstream)
        .await;

    let response = app
        .client
        .request(reqwest::Method::OPTIONS, app.url("/api/quiz/start"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors_headers(&response);
    assert!(response.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_post_forwards_json_body_and_query() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/quiz/submit"))
        .and(query_param("attempt", "2"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({"answer": "b"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"score": 10})))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app
        .client
        .post(app.url("/api/quiz/submit?attempt=2"))
        .json(&json!({"answer": "b"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["score"], 10);
}

#[tokio::test]
async fn test_authorization_header_is_forwarded() {
    let app = spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Ada"})))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app
        .client
        .get(app.url("/api/profile"))
        .header("Authorization", "Bearer secret-token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_text_response_is_wrapped_as_json_string() {
    let app = spawn_app().await;
    Mock::given(path("/motd"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello there"))
        .mount(&app.upstream)
        .await;

    let response = app.client.get(app.url("/api/motd")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, Value::String("hello there".to_string()));
}

#[tokio::test]
async fn test_binary_response_is_relayed_unchanged() {
    let app = spawn_app().await;
    let pdf = b"%PDF-1.7\x00\xff\xfe binary".to_vec();
    Mock::given(path("/resumes/3/download"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(pdf.clone(), "application/pdf"))
        .mount(&app.upstream)
        .await;

    let response = app
        .client
        .get(app.url("/api/resumes/3/download"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    assert_eq!(response.bytes().await.unwrap().to_vec(), pdf);
}

#[tokio::test]
async fn test_unreachable_upstream_returns_error_envelope() {
    let app = spawn_app_with_upstream("http://127.0.0.1:1").await;

    let response = app.client.get(app.url("/api/jobs")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors_headers(&response);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["details"], "Failed to proxy request to 127.0.0.1");
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_json_body_is_rejected_without_forwarding() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.upstream)
        .await;

    let response = app
        .client
        .put(app.url("/api/profile"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Internal server error");
}
