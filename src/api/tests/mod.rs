use super::*;
use crate::test_helpers::{fake_tool, test_config};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

mod system;

/// Router over a service whose yt-dlp is the given shell script body
async fn create_test_app(root: &TempDir, script: &str) -> Router {
    create_test_app_with(root, script, |_| {}).await
}

async fn create_test_app_with(
    root: &TempDir,
    script: &str,
    adjust: impl FnOnce(&mut crate::Config),
) -> Router {
    let script = fake_tool(root.path(), script);
    let mut config = test_config(root.path(), &script);
    adjust(&mut config);
    let tools = TubeTools::new(config).await.unwrap();
    create_router(Arc::new(tools))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_serves_until_shutdown() {
    let root = TempDir::new().unwrap();
    let script = fake_tool(root.path(), "echo 2024.08.06\n");
    let mut config = test_config(root.path(), &script);
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let tools = Arc::new(TubeTools::new(config).await.unwrap());

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(start_api_server(tools, async move {
        stop_rx.await.ok();
    }));

    tokio::time::sleep(Duration::from_millis(100)).await;
    stop_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_shutdown_closes_open_progress_streams() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let root = TempDir::new().unwrap();
    let script = fake_tool(
        root.path(),
        "echo '[download] Downloading item 1 of 5'\nsleep 20\n",
    );
    let mut config = test_config(root.path(), &script);
    let address = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    config.server.api.bind_address = address;
    let tools = Arc::new(TubeTools::new(config).await.unwrap());

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(start_api_server(tools, async move {
        stop_rx.await.ok();
    }));

    let mut stream = None;
    for _ in 0..50 {
        match tokio::net::TcpStream::connect(address).await {
            Ok(connected) => {
                stream = Some(connected);
                break;
            }
            Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
        }
    }
    let mut stream = stream.expect("server should accept connections");
    stream
        .write_all(
            b"GET /api/download/playlist?url=https%3A%2F%2Fwww.youtube.com%2Fplaylist%3Flist%3DPLx HTTP/1.1\r\nHost: localhost\r\n\r\n",
        )
        .await
        .unwrap();

    let mut seen = String::new();
    let mut buf = [0u8; 1024];
    while !seen.contains("event: progress") {
        let n = tokio::time::timeout(Duration::from_secs(10), stream.read(&mut buf))
            .await
            .expect("progress frame should arrive")
            .unwrap();
        assert!(n > 0, "connection closed early: {seen}");
        seen.push_str(&String::from_utf8_lossy(&buf[..n]));
    }

    stop_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop while a progress stream is open")
        .unwrap();
    assert!(result.is_ok());

    // The stream was closed without a terminal frame
    let mut rest = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut rest))
        .await
        .expect("connection should be closed")
        .ok();
    let rest = String::from_utf8_lossy(&rest);
    assert!(!rest.contains("event: complete"));
}

#[tokio::test]
async fn test_cors_enabled() {
    let root = TempDir::new().unwrap();
    let app = create_test_app(&root, "echo 2024.08.06\n").await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let root = TempDir::new().unwrap();
    let app = create_test_app_with(&root, "echo 2024.08.06\n", |config| {
        config.server.api.cors_enabled = false;
    })
    .await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_downloads_are_served_statically() {
    let root = TempDir::new().unwrap();
    let app = create_test_app(&root, "exit 0\n").await;
    let downloads = root.path().join("downloads");
    std::fs::write(downloads.join("abc-My Song.mp3"), b"ID3data").unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/downloads/abc-My%20Song.mp3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"ID3data");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/downloads/missing.mp3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_build_cors_layer_with_specific_origins() {
    // Invalid header values are skipped rather than rejected
    let _layer = build_cors_layer(&[
        "http://localhost:5173".to_string(),
        "bad\norigin".to_string(),
    ]);
}
