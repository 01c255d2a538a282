use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use server::{build_app, AppConfig};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

fn write_corpus(dir: &Path) {
    fs::write(dir.join("doc1.txt"), "the quick brown fox").unwrap();
    fs::write(dir.join("doc2.txt"), "quick fox jumps\nover the owner\nof the ship").unwrap();
    fs::write(dir.join("skip.pdf"), "not indexed").unwrap();
}

fn app_with(token: Option<&str>) -> (TempDir, Router) {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let config = AppConfig {
        docs_dir: dir.path().to_path_buf(),
        extension: "txt".into(),
        cache_capacity: 8,
        admin_token: token.map(str::to_string),
    };
    let app = build_app(config).unwrap();
    (dir, app)
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    call(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let (_dir, app) = app_with(None);
    let (status, json) = get(&app, "/search?q=quick%20fox").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_hits"], 2);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr[0]["document_id"], "doc1.txt");
    assert_eq!(arr[0]["match_percentage"], 100.0);
    assert_eq!(arr[1]["document_id"], "doc2.txt");
    assert_eq!(arr[1]["matches"][0]["context"], "quick fox jumps over the owner of the ship");
}

#[tokio::test]
async fn alternative_search_counts_distinct_terms() {
    let (_dir, app) = app_with(None);
    let (status, json) = get(&app, "/alternative_search?q=jumps%20brown%20owner").await;
    assert_eq!(status, StatusCode::OK);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr[0]["document_id"], "doc2.txt");
    let top = arr[0]["match_percentage"].as_f64().unwrap();
    assert!((top - 200.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let (_dir, app) = app_with(None);
    let (status, json) = get(&app, "/search?q=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    let (status, _) = get(&app, "/alternative_search?q=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn autocomplete_is_sorted_and_limited() {
    let (_dir, app) = app_with(None);
    let (_, json) = get(&app, "/autocomplete?q=Qu").await;
    let all: Vec<&str> = json["suggestions"].as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    assert_eq!(all, vec!["quick", "quick brown", "quick brown fox", "quick fox", "quick fox jumps"]);

    let (_, json) = get(&app, "/autocomplete?q=qu&limit=2").await;
    assert_eq!(json["suggestions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn lists_and_serves_documents() {
    let (_dir, app) = app_with(None);
    let (_, json) = get(&app, "/list_docs").await;
    assert_eq!(json, serde_json::json!(["doc1.txt", "doc2.txt"]));

    let (status, json) = get(&app, "/docs/doc1.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["text"], "the quick brown fox");

    let (status, _) = get(&app, "/docs/skip.pdf").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_report_counts() {
    let (_dir, app) = app_with(None);
    let (_, json) = get(&app, "/stats").await;
    assert_eq!(json["documents"], 2);
    assert_eq!(json["skipped"], 0);
}

#[tokio::test]
async fn rebuild_requires_token_and_picks_up_new_documents() {
    let (dir, app) = app_with(Some("secret"));
    let post = |token: Option<&str>| {
        let mut req = Request::post("/index/rebuild");
        if let Some(t) = token {
            req = req.header("X-ADMIN-TOKEN", t);
        }
        req.body(Body::empty()).unwrap()
    };

    let (status, _) = call(&app, post(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(&app, post(Some("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    fs::write(dir.path().join("doc3.txt"), "zebra crossing").unwrap();
    let (_, json) = get(&app, "/search?q=zebra").await;
    assert_eq!(json["total_hits"], 0);

    let (status, json) = call(&app, post(Some("secret"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["documents"], 3);

    let (_, json) = get(&app, "/search?q=zebra").await;
    assert_eq!(json["results"][0]["document_id"], "doc3.txt");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn parallel_searches_agree() {
    let (_dir, app) = app_with(None);
    let (first, second, alt) = tokio::join!(
        get(&app, "/search?q=quick%20owner"),
        get(&app, "/search?q=quick%20owner"),
        get(&app, "/alternative_search?q=quick%20owner"),
    );
    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(first.1["results"], second.1["results"]);
    assert_eq!(alt.1["results"][0]["document_id"], "doc2.txt");
    assert_eq!(alt.1["results"][0]["match_percentage"], 100.0);
}
