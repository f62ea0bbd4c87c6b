use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::{assert_cors_headers, spawn_app};

async fn mount_reddit(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/r/programming.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"children": [
                {"data": {
                    "id": "r1", "title": "Rust 2024 edition", "selftext": "",
                    "permalink": "/r/programming/comments/r1/", "created_utc": 1_700_000_300.0
                }},
                {"data": {
                    "id": "r2", "title": "Async traits", "selftext": "finally stable",
                    "permalink": "/r/programming/comments/r2/", "created_utc": 1_700_000_100.0
                }}
            ]}
        })))
        .mount(server)
        .await;
}

async fn mount_hacker_news(server: &MockServer) {
    Mock::given(path("/v0/topstories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(server)
        .await;
    Mock::given(path("/v0/item/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "title": "Show HN: a tiny kernel", "url": "https://example.com/kernel",
            "time": 1_700_000_400
        })))
        .mount(server)
        .await;
    Mock::given(path("/v0/item/2.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
    Mock::given(path("/v0/item/3.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3, "title": "Ask HN: favourite editor?", "time": 1_700_000_000
        })))
        .mount(server)
        .await;
}

async fn mount_devto(server: &MockServer) {
    Mock::given(path("/api/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 42, "title": "Ownership explained", "description": null,
            "url": "https://dev.to/a/ownership", "published_at": "2023-11-14T22:30:00Z"
        }])))
        .mount(server)
        .await;
}

fn failing(route: &str) -> Mock {
    Mock::given(path(route)).respond_with(ResponseTemplate::new(503))
}

fn published_times(feed: &Value) -> Vec<String> {
    feed["articles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["publishedAt"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_all_sources_merged_newest_first() {
    let app = spawn_app().await;
    mount_reddit(&app.providers).await;
    mount_hacker_news(&app.providers).await;
    mount_devto(&app.providers).await;

    let response = app.client.get(app.url("/news")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors_headers(&response);
    let feed: Value = response.json().await.unwrap();
    assert_eq!(feed["source"], "all");
    assert_eq!(feed["totalResults"], 5);

    let times = published_times(&feed);
    let mut sorted = times.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(times, sorted);
    assert_eq!(feed["articles"][0]["id"], "devto-42");
}

#[tokio::test]
async fn test_one_failing_source_is_skipped() {
    let app = spawn_app().await;
    failing("/r/programming.json").mount(&app.providers).await;
    mount_hacker_news(&app.providers).await;
    mount_devto(&app.providers).await;

    let response = app
        .client
        .get(app.url("/news?source=all&limit=9"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let feed: Value = response.json().await.unwrap();
    let articles = feed["articles"].as_array().unwrap();
    assert!(!articles.is_empty());
    assert!(articles.iter().all(|a| a["source"] != "Reddit"));
}

#[tokio::test]
async fn test_every_source_failing_is_bad_gateway() {
    let app = spawn_app().await;
    failing("/r/programming.json").mount(&app.providers).await;
    failing("/v0/topstories.json").mount(&app.providers).await;
    failing("/api/articles").mount(&app.providers).await;

    let response = app.client.get(app.url("/news")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "fetch_failed");
    assert!(body["message"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_hacker_news_skips_missing_items() {
    let app = spawn_app().await;
    mount_hacker_news(&app.providers).await;

    let response = app
        .client
        .get(app.url("/news?source=hackernews&limit=3"))
        .send()
        .await
        .unwrap();

    let feed: Value = response.json().await.unwrap();
    let articles = feed["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0]["id"], "hn-1");
    assert_eq!(
        articles[1]["url"],
        "https://news.ycombinator.com/item?id=3"
    );
}

#[tokio::test]
async fn test_devto_null_description_falls_back_to_title() {
    let app = spawn_app().await;
    mount_devto(&app.providers).await;

    let response = app
        .client
        .get(app.url("/news?source=devto&limit=1"))
        .send()
        .await
        .unwrap();

    let feed: Value = response.json().await.unwrap();
    let article = &feed["articles"][0];
    assert_eq!(article["source"], "Dev.to");
    assert_eq!(article["description"], article["title"]);
}

#[tokio::test]
async fn test_per_source_limit_is_forwarded() {
    let app = spawn_app().await;
    Mock::given(path("/r/programming.json"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"children": []}})))
        .expect(1)
        .mount(&app.providers)
        .await;
    Mock::given(path("/api/articles"))
        .and(query_param("per_page", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&app.providers)
        .await;
    Mock::given(path("/v0/topstories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&app.providers)
        .await;

    let response = app
        .client
        .get(app.url("/news?limit=13"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let feed: Value = response.json().await.unwrap();
    assert_eq!(feed["totalResults"], 0);
}

#[tokio::test]
async fn test_single_source_failure_is_retried_then_reported() {
    let app = spawn_app().await;
    failing("/r/programming.json")
        .expect(3)
        .mount(&app.providers)
        .await;

    let response = app
        .client
        .get(app.url("/news?source=reddit"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Reddit API error: 503");
}

#[tokio::test]
async fn test_fresh_feed_is_cached() {
    let app = spawn_app().await;
    Mock::given(path("/api/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 7, "title": "Cached", "description": "once",
            "url": "https://dev.to/a/cached", "published_at": "2024-01-01T00:00:00Z"
        }])))
        .expect(1)
        .mount(&app.providers)
        .await;

    for _ in 0..2 {
        let response = app
            .client
            .get(app.url("/news?source=devto&limit=2"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_refresh_clears_cache() {
    let app = spawn_app().await;
    Mock::given(path("/api/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&app.providers)
        .await;

    let feed_url = app.url("/news?source=devto");
    app.client.get(&feed_url).send().await.unwrap();

    let refresh = app
        .client
        .post(app.url("/news/refresh"))
        .send()
        .await
        .unwrap();
    assert_eq!(refresh.status(), StatusCode::NO_CONTENT);

    app.client.get(&feed_url).send().await.unwrap();
}

#[tokio::test]
async fn test_invalid_query_is_rejected() {
    let app = spawn_app().await;

    for query in ["source=myspace", "limit=0", "limit=101", "limit=abc", "limit=-3"] {
        let response = app
            .client
            .get(app.url(&format!("/news?{query}")))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{query}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "validation_error");
    }
}

#[tokio::test]
async fn test_source_status_reports_each_provider() {
    let app = spawn_app().await;
    Mock::given(path("/r/programming.json"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"children": []}})))
        .expect(1)
        .mount(&app.providers)
        .await;
    mount_hacker_news(&app.providers).await;
    failing("/api/articles").expect(1).mount(&app.providers).await;

    let response = app
        .client
        .get(app.url("/news/sources"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors_headers(&response);
    let statuses: Value = response.json().await.unwrap();
    assert_eq!(
        statuses,
        json!([
            {"source": "Reddit", "status": "online"},
            {"source": "Hacker News", "status": "online"},
            {"source": "Dev.to", "status": "offline", "error": "Dev.to API error: 503"}
        ])
    );
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = spawn_app().await;
    let response = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}
