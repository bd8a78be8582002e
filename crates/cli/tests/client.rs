//! Client and HTTP fetcher against a live server on an ephemeral port

use pricetree_cli::{ApiClient, ClientError, HttpCategoryFetcher};
use pricetree_core::{CatalogSession, CategoryId, CategoryRecord, FetchStrategy, TreeBuilder, TreeError};
use pricetree_server::AppState;
use pricetree_store::{Pricebook, VendorEdit};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct TestServer {
    client: ApiClient,
    _shutdown: oneshot::Sender<()>,
}

async fn start_server() -> TestServer {
    let pricebook = Arc::new(Pricebook::open_temporary().unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown = async {
            let _ = rx.await;
        };
        pricetree_server::serve(listener, AppState::new(pricebook), shutdown)
            .await
            .unwrap();
    });

    let client = ApiClient::with_base_url(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
    TestServer {
        client,
        _shutdown: tx,
    }
}

fn id(s: &str) -> CategoryId {
    CategoryId::from(s)
}

fn catalog() -> Vec<CategoryRecord> {
    vec![
        CategoryRecord::new("sports", "Sports Academies", None),
        CategoryRecord::new("badminton", "Badminton", Some(id("sports"))),
        CategoryRecord::new("swimming", "Swimming", Some(id("sports"))),
        CategoryRecord::new("hourly", "Hourly", Some(id("swimming"))),
    ]
}

async fn seeded() -> TestServer {
    let server = start_server().await;
    assert_eq!(server.client.import_catalog(&catalog()).await.unwrap(), 4);
    server.client.register_vendor("v1", "Vendor One").await.unwrap();
    server
}

#[tokio::test]
async fn test_session_over_http_then_sync() {
    let server = seeded().await;
    let builder = TreeBuilder::new(HttpCategoryFetcher::new(server.client.clone()))
        .with_strategy(FetchStrategy::parallel(4));

    let mut session = CatalogSession::new();
    session.load(&builder, id("sports")).await.unwrap();
    session.select(&id("hourly")).unwrap();
    session.select(&id("badminton")).unwrap();

    let request = session.sync_request("v1").unwrap();
    assert_eq!(request.active_leaf_category_ids, vec![id("hourly"), id("badminton")]);

    let report = server.client.sync(&request).await.unwrap();
    assert_eq!(report.created, 3);

    let leaves = server.client.active_leaves("v1", &id("sports")).await.unwrap();
    assert_eq!(leaves, vec![id("badminton"), id("hourly")]);

    // Deselecting Hourly prunes Swimming too
    session.deselect(&id("hourly")).unwrap();
    let report = server.client.sync(&session.sync_request("v1").unwrap()).await.unwrap();
    assert_eq!(report.deactivated, 2);
}

#[tokio::test]
async fn test_rejected_sync_surfaces_error_code() {
    let server = seeded().await;
    let mut session = CatalogSession::new();
    let builder = TreeBuilder::new(HttpCategoryFetcher::new(server.client.clone()));
    session.load(&builder, id("sports")).await.unwrap();
    session.select(&id("badminton")).unwrap();

    let request = session.sync_request("nobody").unwrap();
    let err = server.client.sync(&request).await.unwrap_err();
    match &err {
        ClientError::Rejected { status, code, .. } => {
            assert_eq!(*status, 422);
            assert_eq!(code, "SYNC_REJECTED");
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    // The caller's selection is untouched by the failure
    assert_eq!(session.selected_leaf_ids().unwrap(), vec![id("badminton")]);
}

#[tokio::test]
async fn test_unknown_root_fails_the_build() {
    let server = seeded().await;
    let builder = TreeBuilder::new(HttpCategoryFetcher::new(server.client.clone()));
    let err = builder.build(&id("ghost")).await.unwrap_err();
    assert!(matches!(err, TreeError::FetchFailure { .. }));
}

#[tokio::test]
async fn test_edit_and_sheet_round_trip() {
    let server = seeded().await;
    let client = &server.client;
    client
        .sync(&pricetree_core::SyncRequest::new("v1", id("sports"), vec![id("hourly")]))
        .await
        .unwrap();

    let node = client
        .edit_node("v1", &id("sports"), &id("hourly"), &VendorEdit::price(120.0))
        .await
        .unwrap();
    assert_eq!(node.price, Some(120.0));

    let err = client
        .edit_node("v1", &id("sports"), &id("swimming"), &VendorEdit::price(1.0))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some("BAD_REQUEST"));

    let tree = client.price_tree("v1", &id("sports")).await.unwrap();
    assert_eq!(tree[0].children[0].node.price, Some(120.0));

    let cells = json!({"slot": "06:00", "rate": 120}).as_object().unwrap().clone();
    let row = client.upsert_sheet_row("Hourly Swim", "v1", None, cells).await.unwrap();
    let rows = client.sheet_rows("hourly swim", "v1").await.unwrap();
    assert_eq!(rows.len(), 1);
    client.delete_sheet_row("Hourly Swim", "v1", row.row_id).await.unwrap();
    assert!(client.sheet_rows("Hourly Swim", "v1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_transport_error_when_server_is_gone() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::with_base_url(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = client.vendors().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }));
}

#[tokio::test]
async fn test_truncated_error_body_is_a_decode_error() {
    use std::io::{Read, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf);
        // Promise more body than is sent, then hang up
        stream
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\n{\"error\":")
            .unwrap();
    });

    let client = ApiClient::with_base_url(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
    let err = client.vendors().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }), "got {err:?}");
    server.join().unwrap();
}
