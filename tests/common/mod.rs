//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::Read;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use flate2::read::GzDecoder;
use force_gzip_upstream::config::UpstreamConfig;
use force_gzip_upstream::http::HttpServer;
use force_gzip_upstream::lifecycle::Shutdown;
use tokio::net::TcpListener;

/// A running upstream on an ephemeral port. Shuts down on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the upstream with default configuration.
pub async fn spawn_server() -> TestServer {
    spawn_server_with(UpstreamConfig::default()).await
}

/// Start the upstream with `config`, bound to 127.0.0.1 on a free port.
pub async fn spawn_server_with(config: UpstreamConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer { addr, shutdown }
}

/// Client without proxies or transparent decompression.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

pub fn gunzip(bytes: &[u8]) -> String {
    let mut text = String::new();
    GzDecoder::new(bytes)
        .read_to_string(&mut text)
        .expect("body is not valid gzip");
    text
}

/// Body read one network chunk at a time, with arrival times.
pub struct ChunkedBody {
    pub chunks: Vec<(Duration, Vec<u8>)>,
    pub elapsed: Duration,
}

impl ChunkedBody {
    pub fn bytes(&self) -> Vec<u8> {
        self.chunks.iter().flat_map(|(_, c)| c.iter().copied()).collect()
    }
}

pub async fn read_chunks(mut res: reqwest::Response, started: Instant) -> ChunkedBody {
    let mut chunks = Vec::new();
    while let Some(chunk) = res.chunk().await.unwrap() {
        chunks.push((started.elapsed(), chunk.to_vec()));
    }
    ChunkedBody {
        chunks,
        elapsed: started.elapsed(),
    }
}

/// Split a decoded SSE body into its `data:` payloads.
pub fn data_lines(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .filter(|event| !event.is_empty())
        .map(|event| event.strip_prefix("data: ").expect("event without data prefix"))
        .collect()
}

/// Indices of the JSON frames, asserting the stream ends with exactly one sentinel.
pub fn frame_indices(text: &str) -> Vec<u64> {
    let lines = data_lines(text);
    let (last, frames) = lines.split_last().expect("empty stream");
    assert_eq!(*last, "[DONE]");
    frames
        .iter()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["index"].as_u64().unwrap()
        })
        .collect()
}
