use std::sync::Arc;
use std::time::Duration;

use reqlab::builder::{RequestBuilder, SendOutcome};
use reqlab::history::HistoryStorage;
use reqlab::http::{BodyType, Client, Method, RequestModel};
use reqlab::i18n::Notice;
use reqlab::settings::AppContext;
use reqlab::store::FileStore;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context(temp_dir: &TempDir) -> AppContext {
    AppContext::load(Arc::new(FileStore::new(temp_dir.path()))).unwrap()
}

fn history(ctx: &AppContext) -> HistoryStorage {
    HistoryStorage::new(ctx.store().clone())
}

async fn send(ctx: &AppContext, client: Client, request: RequestModel) -> SendOutcome {
    let mut builder = RequestBuilder::open(ctx, client);
    builder.set_request(request);
    builder.send().await.unwrap()
}

#[tokio::test]
async fn test_history_recording() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/history-test"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
             "status": "created"
        })))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir);

    let url = format!("{}/history-test", mock_server.uri());
    let request = RequestModel::new(Method::Post, url.clone())
        .with_body(r#"{"test": "data"}"#, BodyType::Json);

    let outcome = send(&ctx, Client::new().unwrap(), request).await;
    let SendOutcome::Completed { response, history: recorded } = outcome else {
        panic!("expected a completed send");
    };
    assert_eq!(response.status, 201);
    assert_eq!(response.status_text, "Created");
    assert!(!response.error);
    assert_eq!(response.size, response.data.len());

    let entries = history(&ctx).list().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, recorded.unwrap().id);
    assert_eq!(entries[0].request.url, url);
    assert_eq!(entries[0].request.method, Method::Post);
    assert_eq!(entries[0].response.status, 201);

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received[0].body, br#"{"test": "data"}"#.to_vec());
    assert_eq!(
        received[0].headers.get("content-type").unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn test_newest_entry_first() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir);
    let client = Client::new().unwrap();

    for name in ["first", "second"] {
        let url = format!("{}/{}", mock_server.uri(), name);
        send(&ctx, client.clone(), RequestModel::new(Method::Get, url)).await;
    }

    let entries = history(&ctx).list().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].request.url.ends_with("/second"));
    assert!(entries[0].id > entries[1].id);
}

#[tokio::test]
async fn test_bodyless_methods_never_send_body() {
    let mock_server = MockServer::start().await;
    Mock::given(path("/no-body"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir);
    let client = Client::new().unwrap();
    let url = format!("{}/no-body", mock_server.uri());

    for m in [Method::Get, Method::Head, Method::Delete, Method::Options] {
        let request = RequestModel::new(m, url.clone()).with_body(r#"{"x":1}"#, BodyType::Json);
        send(&ctx, client.clone(), request).await;
    }

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 4);
    for request in received {
        assert!(request.body.is_empty(), "{} sent a body", request.method);
        assert!(request.headers.get("content-type").is_none());
    }
    assert_eq!(history(&ctx).list().unwrap().len(), 4);
}

#[tokio::test]
async fn test_query_params_reach_server() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_string("found"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir);
    let request = RequestModel::new(Method::Get, format!("{}/search", mock_server.uri()))
        .with_query("q", "rust");

    let SendOutcome::Completed { response, .. } = send(&ctx, Client::new().unwrap(), request).await
    else {
        panic!("expected a completed send");
    };
    assert_eq!(response.status, 200);
    assert_eq!(response.data, "found");
}

#[tokio::test]
async fn test_empty_url_makes_no_call() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir);

    let mut builder = RequestBuilder::open(&ctx, Client::new().unwrap());
    builder.set_request(RequestModel::new(Method::Get, "   "));
    let err = builder.send().await.unwrap_err();

    assert_eq!(err.notice(), Some(Notice::UrlRequired));
    assert!(history(&ctx).list().unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_host_is_recorded_as_failure() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir);

    let outcome = send(
        &ctx,
        Client::new().unwrap(),
        RequestModel::new(Method::Get, "http://127.0.0.1:1/"),
    )
    .await;
    let SendOutcome::Completed { response, .. } = outcome else {
        panic!("expected a completed send");
    };
    assert_eq!(response.status, 0);
    assert_eq!(response.status_text, "Request Failed");
    assert!(response.error);
    assert!(response.data.starts_with("Error: "));

    let entries = history(&ctx).list().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].response.error);
}

#[tokio::test]
async fn test_timeout_becomes_failure_record() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir);
    let client = Client::with_timeout(Duration::from_millis(100)).unwrap();

    let outcome = send(&ctx, client, RequestModel::new(Method::Get, mock_server.uri())).await;
    let SendOutcome::Completed { response, .. } = outcome else {
        panic!("expected a completed send");
    };
    assert_eq!(response.status, 0);
    assert!(response.error);
    assert_eq!(history(&ctx).list().unwrap().len(), 1);
}

#[tokio::test]
async fn test_auto_save_off_skips_history() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let mut ctx = context(&temp_dir);
    ctx.set_auto_save(false).unwrap();

    let outcome = send(
        &ctx,
        Client::new().unwrap(),
        RequestModel::new(Method::Get, mock_server.uri()),
    )
    .await;
    assert!(matches!(outcome, SendOutcome::Completed { history: None, .. }));
    assert!(history(&ctx).list().unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_history() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir);
    send(
        &ctx,
        Client::new().unwrap(),
        RequestModel::new(Method::Get, mock_server.uri()),
    )
    .await;
    assert_eq!(history(&ctx).list().unwrap().len(), 1);

    history(&ctx).clear().unwrap();
    assert!(history(&ctx).list().unwrap().is_empty());
    assert!(!temp_dir.path().join("history.json").exists());
}
