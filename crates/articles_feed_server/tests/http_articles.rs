use articles_feed_core::{ArticleStore, FeedPool, Namespace, PoolConfig};
use articles_feed_server::config::HttpConfig;
use articles_feed_server::{router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    db_path: PathBuf,
    _dir: TempDir,
}

async fn spawn_app(namespace: Namespace, max_page_size: Option<i64>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = PoolConfig {
        max_size: 4,
        min_idle: 1,
        connection_timeout: Duration::from_secs(5),
        ..PoolConfig::default()
    };
    let db_path = dir.path().join("feed.sqlite3");
    let pool = FeedPool::open(&db_path, namespace, &config).await.unwrap();
    let state = AppState::new(ArticleStore::new(pool), max_page_size);
    TestApp {
        router: router(state, &HttpConfig::default()),
        db_path,
        _dir: dir,
    }
}

async fn app() -> TestApp {
    spawn_app(Namespace::main(), None).await
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

async fn post_json(app: &TestApp, uri: &str, body: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn create(app: &TestApp, title: &str, author: &str, body: &str) -> Value {
    let payload = json!({"title": title, "authorName": author, "body": body}).to_string();
    let (status, response) = post_json(app, "/articles", &payload).await;
    assert_eq!(status, StatusCode::CREATED, "{response}");
    tokio::time::sleep(Duration::from_millis(2)).await;
    response
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = app().await;
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("healthy"));
    assert!(body["data"]["version"].as_str().is_some());
}

#[tokio::test]
async fn create_returns_created_article() {
    let app = app().await;
    let body = create(&app, "Intro", "Ann", "x").await;

    assert_eq!(body["success"], json!(true));
    let data = &body["data"];
    assert!(!data["id"].as_str().unwrap().is_empty());
    assert_eq!(data["title"], json!("Intro"));
    assert_eq!(data["authorName"], json!("Ann"));
    assert_eq!(data["body"], json!("x"));
    assert!(data["createdAt"].as_str().is_some());
    assert!(body.get("meta").is_none());
}

#[tokio::test]
async fn create_then_list_shows_article_and_meta() {
    let app = app().await;
    let created = create(&app, "Intro", "Ann", "x").await;

    let (status, body) = get(&app, "/articles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(
        body["meta"],
        json!({"page": 1, "pageSize": 20, "totalItems": 1})
    );
    let articles = body["data"]["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["id"], created["data"]["id"]);
    assert_eq!(articles[0]["authorName"], json!("Ann"));
}

#[tokio::test]
async fn list_pages_and_counts_all_matches() {
    let app = app().await;
    for (title, author) in [("a", "Ann"), ("b", "Bob"), ("c", "Cy"), ("d", "Dee")] {
        create(&app, title, author, "body").await;
    }

    let (status, body) = get(&app, "/articles?page=1&pageSize=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["totalItems"], json!(4));
    assert_eq!(body["meta"]["pageSize"], json!(2));
    let titles: Vec<_> = body["data"]["articles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["d", "c"]);
}

#[tokio::test]
async fn list_filters_by_query_and_author() {
    let app = app().await;
    create(&app, "Storage", "Ann", "Tuning PostgreSQL").await;
    create(&app, "Caching", "Bob", "Redis notes").await;

    let (_, by_query) = get(&app, "/articles?query=PostgreSQL").await;
    assert_eq!(by_query["meta"]["totalItems"], json!(1));
    assert_eq!(by_query["data"]["articles"][0]["title"], json!("Storage"));

    let (_, by_author) = get(&app, "/articles?authorName=bob").await;
    assert_eq!(by_author["meta"]["totalItems"], json!(1));
    assert_eq!(by_author["data"]["articles"][0]["title"], json!("Caching"));
}

#[tokio::test]
async fn non_positive_window_is_echoed_normalized() {
    let app = app().await;
    let (status, body) = get(&app, "/articles?page=0&pageSize=-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["meta"],
        json!({"page": 1, "pageSize": 20, "totalItems": 0})
    );
}

#[tokio::test]
async fn page_size_cap_is_applied() {
    let app = spawn_app(Namespace::main(), Some(5)).await;
    let (_, body) = get(&app, "/articles?pageSize=50").await;
    assert_eq!(body["meta"]["pageSize"], json!(5));
}

#[tokio::test]
async fn missing_fields_are_validation_errors() {
    let app = app().await;

    let (status, body) = post_json(&app, "/articles", r#"{"authorName":"Ann"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "error": {"code": 400, "message": "'title' is required"}})
    );

    let (status, body) = post_json(&app, "/articles", r#"{"title":"Intro","authorName":"  "}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], json!("'authorName' is required"));
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = app().await;
    let (status, body) = post_json(&app, "/articles", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!(400));
}

#[tokio::test]
async fn non_integer_page_is_a_validation_error() {
    let app = app().await;
    let (status, body) = get(&app, "/articles?page=two").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!(400));
}

#[tokio::test]
async fn unknown_route_uses_envelope() {
    let app = app().await;
    let (status, body) = get(&app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!(404));
}

#[tokio::test]
async fn namespace_fault_is_a_generic_server_error() {
    let app = app().await;
    let conn = rusqlite::Connection::open(&app.db_path).unwrap();
    conn.execute_batch("DROP TABLE authors_fts;").unwrap();
    drop(conn);

    let (status, body) = get(&app, "/articles").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "error": {"code": 500, "message": "internal server error"}})
    );

    let (status, _) = post_json(
        &app,
        "/articles",
        r#"{"title":"Intro","authorName":"Ann","body":"x"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn configured_namespace_serves_requests() {
    let app = spawn_app(Namespace::new("articles_feed").unwrap(), None).await;
    let created = create(&app, "Intro", "Ann", "x").await;

    let (status, body) = get(&app, "/articles?authorName=Ann").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["totalItems"], json!(1));
    assert_eq!(body["data"]["articles"][0]["id"], created["data"]["id"]);
}
