//! Inspect how the upstream's responses arrive on the wire.
//!
//! Reads the body one network chunk at a time (no transparent
//! decompression), reports arrival offset and size of every chunk, and
//! gunzips incrementally so each frame can be seen decoding as it lands.

use std::io::Write;
use std::time::Instant;

use clap::{Parser, Subcommand};
use flate2::write::GzDecoder;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};

#[derive(Parser)]
#[command(name = "upstream-inspect")]
#[command(about = "Delivery inspector for force-gzip-upstream", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:18080")]
    url: String,

    /// Value sent as Accept-Encoding. The upstream compresses regardless.
    #[arg(short, long, default_value = "identity")]
    accept_encoding: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET /healthz
    Health,
    /// GET /gzip/json
    Json,
    /// GET /gzip/sse
    Sse {
        #[arg(long)]
        chunks: Option<String>,
        #[arg(long)]
        delay_ms: Option<String>,
    },
}

impl Commands {
    fn path(&self) -> String {
        match self {
            Commands::Health => "/healthz".to_string(),
            Commands::Json => "/gzip/json".to_string(),
            Commands::Sse { chunks, delay_ms } => {
                let mut query = Vec::new();
                if let Some(chunks) = chunks {
                    query.push(format!("chunks={chunks}"));
                }
                if let Some(delay_ms) = delay_ms {
                    query.push(format!("delayMs={delay_ms}"));
                }
                if query.is_empty() {
                    "/gzip/sse".to_string()
                } else {
                    format!("/gzip/sse?{}", query.join("&"))
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_str(&cli.accept_encoding)?);

    let url = format!("{}{}", cli.url.trim_end_matches('/'), cli.command.path());
    println!("GET {url}");

    let started = Instant::now();
    let res = client.get(&url).headers(headers).send().await?;
    inspect_response(res, started).await
}

async fn inspect_response(
    mut res: reqwest::Response,
    started: Instant,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("status: {}", res.status());
    for name in ["content-type", "content-encoding", "vary", "content-length", "transfer-encoding"] {
        if let Some(value) = res.headers().get(name) {
            println!("{name}: {}", value.to_str().unwrap_or("<binary>"));
        }
    }

    let gzip = res
        .headers()
        .get("content-encoding")
        .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"gzip"));
    let mut decoder = gzip.then(|| GzDecoder::new(Vec::new()));

    let mut total = 0usize;
    let mut index = 0usize;
    while let Some(chunk) = res.chunk().await? {
        total += chunk.len();
        println!(
            "chunk #{index} +{}ms {} bytes (total {total})",
            started.elapsed().as_millis(),
            chunk.len()
        );
        index += 1;

        match decoder.as_mut() {
            Some(decoder) => {
                decoder.write_all(&chunk)?;
                decoder.flush()?;
                let decoded = std::mem::take(decoder.get_mut());
                if !decoded.is_empty() {
                    print!("{}", String::from_utf8_lossy(&decoded));
                }
            }
            None => print!("{}", String::from_utf8_lossy(&chunk)),
        }
    }

    if let Some(decoder) = decoder {
        let rest = decoder.finish()?;
        if !rest.is_empty() {
            print!("{}", String::from_utf8_lossy(&rest));
        }
    }

    println!();
    println!(
        "done: {index} chunks, {total} bytes in {}ms",
        started.elapsed().as_millis()
    );
    Ok(())
}
