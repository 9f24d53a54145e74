//! Endpoint contract tests over a real socket.

mod common;

use reqwest::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE, VARY};
use reqwest::StatusCode;

#[tokio::test]
async fn healthz_is_plain_and_uncompressed() {
    let server = common::spawn_server().await;
    let res = common::client()
        .get(server.url("/healthz"))
        .header(ACCEPT_ENCODING, "gzip")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(CONTENT_ENCODING).is_none());
    assert_eq!(res.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn json_is_gzip_whatever_the_client_accepts() {
    let server = common::spawn_server().await;
    let client = common::client();

    for accept in [None, Some("identity"), Some("br"), Some("gzip;q=0")] {
        let mut req = client.get(server.url("/gzip/json"));
        if let Some(accept) = accept {
            req = req.header(ACCEPT_ENCODING, accept);
        }
        let res = req.send().await.unwrap();

        assert_eq!(res.status(), StatusCode::OK, "{accept:?}");
        assert_eq!(res.headers()[CONTENT_ENCODING], "gzip", "{accept:?}");
        assert_eq!(res.headers()[VARY], "Accept-Encoding", "{accept:?}");
        assert_eq!(
            res.headers()[CONTENT_TYPE],
            "application/json; charset=utf-8"
        );

        let text = common::gunzip(&res.bytes().await.unwrap());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["path"], "/gzip/json");
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}

#[tokio::test]
async fn json_path_ignores_query_string() {
    let server = common::spawn_server().await;
    let res = common::client()
        .get(server.url("/gzip/json?x=1"))
        .send()
        .await
        .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&common::gunzip(&res.bytes().await.unwrap())).unwrap();
    assert_eq!(value["path"], "/gzip/json");
}

#[tokio::test]
async fn sse_headers() {
    let server = common::spawn_server().await;
    let res = common::client()
        .get(server.url("/gzip/sse?chunks=1&delayMs=0"))
        .header(ACCEPT_ENCODING, "identity")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let headers = res.headers();
    assert_eq!(headers[CONTENT_ENCODING], "gzip");
    assert_eq!(headers[VARY], "Accept-Encoding");
    assert!(headers[CONTENT_TYPE]
        .to_str()
        .unwrap()
        .contains("text/event-stream"));
    assert_eq!(headers["cache-control"], "no-cache");
    assert_eq!(headers["x-accel-buffering"], "no");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let server = common::spawn_server().await;
    let res = common::client()
        .get(server.url("/gzip/xml"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn probe_disabled_serves_identical_bodies() {
    let mut config = force_gzip_upstream::UpstreamConfig::default();
    config.probe.enabled = false;
    let server = common::spawn_server_with(config).await;

    let res = common::client()
        .get(server.url("/gzip/sse?chunks=2&delayMs=0"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()[CONTENT_ENCODING], "gzip");
    let text = common::gunzip(&res.bytes().await.unwrap());
    assert_eq!(common::frame_indices(&text), vec![1, 2]);
}
