//! API integration tests.
//!
//! Tests HTTP endpoints against a [`TestHarness`] server running on a random
//! port with a stub decoder standing in for the real binary.

mod common;

use common::TestHarness;

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_timestamp() {
    let (_harness, addr) = TestHarness::with_server().await;
    let url = format!("http://{addr}/health");

    let resp = reqwest::get(&url).await.expect("request failed");
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "ok");
    assert!(!json["timestamp"].as_str().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Request validation (no side effects on rejection)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn download_rejects_invalid_url_without_side_effects() {
    let (harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/download"))
        .json(&serde_json::json!({"url": "not-a-url", "format": "audio"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "InvalidRequest");

    // No directory was created and no job is tracked.
    assert_eq!(harness.dir_count(), 0);
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn download_rejects_unsupported_format() {
    let (harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/download"))
        .json(&serde_json::json!({"url": "https://youtu.be/abc12345678", "format": "flac"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "InvalidRequest");
    assert_eq!(harness.dir_count(), 0);
}

// ---------------------------------------------------------------------------
// End-to-end: submit then fetch
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[tokio::test]
async fn download_then_fetch_round_trip() {
    let (_harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/download"))
        .json(&serde_json::json!({"url": "https://youtu.be/abc12345678", "format": "audio"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["filename"], "clip.mp3");
    let handle = json["download_handle"].as_str().unwrap();
    assert!(handle.starts_with("/file/"));

    let resp = client
        .get(format!("http://{addr}{handle}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "audio/mpeg"
    );
    assert!(resp.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("clip.mp3"));

    let bytes = resp.bytes().await.unwrap();
    assert_eq!(&bytes[..], b"media-bytes");
}

#[cfg(unix)]
#[tokio::test]
async fn failing_decoder_maps_to_conversion_failed() {
    let (harness, addr) = TestHarness::with_server_stub(common::STUB_EXIT_NONZERO).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/download"))
        .json(&serde_json::json!({"url": "https://youtu.be/abc12345678", "format": "video"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "ConversionFailed");

    // The failed job left nothing on disk and nothing fetchable.
    assert_eq!(harness.dir_count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn decoder_without_output_maps_to_artifact_missing() {
    let (harness, addr) = TestHarness::with_server_stub(common::STUB_NO_OUTPUT).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/download"))
        .json(&serde_json::json!({"url": "https://youtu.be/abc12345678", "format": "audio"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "ArtifactMissing");
    assert_eq!(harness.dir_count(), 0);
}

// ---------------------------------------------------------------------------
// Fetch misses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_unknown_job_is_not_found() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!(
        "http://{addr}/file/00000000-0000-4000-8000-000000000000"
    ))
    .await
    .unwrap();
    assert_eq!(resp.status(), 404);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "NotFound");
}

#[tokio::test]
async fn fetch_malformed_id_is_not_found() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/file/not-a-job-id"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
