//! Integration tests for public media serving.

mod common;

use common::{test_config, TestHarness, API_KEY};

#[tokio::test]
async fn url_serves_uploaded_bytes() {
    let h = TestHarness::with_server().await;
    let data = b"\x89PNG\r\n\x1a\n fake png body";
    let record = h.upload_ok(data, "image/png").await;

    let resp = h.client.get(&record.url).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let headers = resp.headers();
    assert_eq!(headers["content-type"], "image/png");
    assert_eq!(
        headers["cache-control"],
        "public, max-age=31536000, immutable"
    );
    assert_eq!(
        headers["etag"].to_str().unwrap(),
        record.object.http_etag.as_str()
    );
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert!(headers.get("content-security-policy").is_none());
    assert_eq!(&resp.bytes().await.unwrap()[..], &data[..]);
}

#[tokio::test]
async fn html_upload_is_served_sandboxed() {
    let h = TestHarness::with_server().await;
    let record = h.upload_ok(b"<h1>hi</h1>", "text/html").await;

    let resp = h.client.get(&record.url).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let headers = resp.headers();
    assert_eq!(headers["content-type"], "text/html");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["content-security-policy"], "sandbox");
}

#[tokio::test]
async fn media_missing_and_short_ids() {
    let h = TestHarness::with_server().await;
    assert_eq!(h.get("/media/BCDFGHJKLM").await.status(), 404);
    assert_eq!(h.get("/media/BCD").await.status(), 400);
}

#[tokio::test]
async fn media_gone_after_delete() {
    let h = TestHarness::with_server().await;
    let record = h.upload_ok(b"bye", "image/jpeg").await;
    h.delete(&format!("/api/images/{}", record.id), Some(API_KEY))
        .await;
    assert_eq!(h.client.get(&record.url).send().await.unwrap().status(), 404);
}

#[tokio::test]
async fn external_media_url_is_used_in_records() {
    let mut config = test_config();
    config.media.public_url = Some("https://media.example.com/".into());
    config.media.serve = false;
    let h = TestHarness::with_server_config(config).await;

    let record = h.upload_ok(b"cdn", "image/png").await;
    assert_eq!(record.url, format!("https://media.example.com/{}", record.id));
    assert_eq!(h.get(&format!("/media/{}", record.id)).await.status(), 404);
}
