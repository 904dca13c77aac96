//! Video generation worker binary.
//!
//! Reads a JSON request from the path given as the first argument (or
//! stdin when omitted), runs the pipeline, and writes the resulting
//! artifact as JSON to stdout.

use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pvid_models::VideoRequest;
use pvid_worker::{PipelineConfig, VideoPipeline};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("pvid=info".parse().unwrap())
        .add_directive("aws_config=warn".parse().unwrap())
        .add_directive("hyper=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting pvid-worker");

    let request = match read_request().await {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to read request: {}", e);
            std::process::exit(1);
        }
    };

    let config = PipelineConfig::from_env();
    let pipeline = match VideoPipeline::new(config) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create pipeline: {}", e);
            std::process::exit(1);
        }
    };

    // Ctrl-C flips the cancellation flag; the pipeline stops at the next
    // stage boundary (or kills a running encode).
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        cancel_tx.send(true).ok();
    });

    match pipeline.process_with_cancel(&request, cancel_rx).await {
        Ok(artifact) => match serde_json::to_string_pretty(&artifact) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize artifact: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Video generation failed: {}", e);
            std::process::exit(1);
        }
    }
}

async fn read_request() -> Result<VideoRequest, Box<dyn std::error::Error>> {
    let raw = match std::env::args().nth(1) {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut buf = String::new();
            use tokio::io::AsyncReadExt;
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };
    Ok(serde_json::from_str(&raw)?)
}
