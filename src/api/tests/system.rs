use super::*;

#[tokio::test]
async fn test_health_endpoint() {
    let root = TempDir::new().unwrap();
    let app = create_test_app(&root, "echo 2024.08.06\n").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["ytdlp_available"], true);
}

#[tokio::test]
async fn test_health_reports_failing_tool() {
    let root = TempDir::new().unwrap();
    let app = create_test_app(&root, "exit 127\n").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["ytdlp_available"], false);
}

#[tokio::test]
async fn test_openapi_endpoint() {
    let root = TempDir::new().unwrap();
    let app = create_test_app(&root, "exit 0\n").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert!(json["paths"]["/api/download/playlist"].is_object());
    assert_eq!(json["info"]["title"], "tubetools HTTP API");
}

#[tokio::test]
async fn test_cleanup_endpoint() {
    let root = TempDir::new().unwrap();
    let app = create_test_app_with(&root, "exit 0\n", |config| {
        config.download.cleanup_max_age = Duration::ZERO;
    })
    .await;
    std::fs::write(root.path().join("downloads").join("old.mp3"), b"x").unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/cleanup")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["deleted"], 1);
    assert!(!root.path().join("downloads").join("old.mp3").exists());
}
