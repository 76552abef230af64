//! s3shim server: a lightweight S3-compatible object store for development and tests.
//!
//! # Usage
//!
//! ```text
//! GATEWAY_LISTEN=0.0.0.0:10001 S3_BACKEND=disk DATA_DIR=/var/lib/s3shim s3shim-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:10001` | Bind address |
//! | `S3_DOMAIN` | `localhost` | Host name of path-style requests |
//! | `S3_VIRTUAL_HOSTING` | `true` | Accept `<bucket>.<domain>` hosts |
//! | `S3_BACKEND` | `memory` | `memory` or `disk` |
//! | `DATA_DIR` | `s3` | Base directory of the disk backend |
//! | `S3_INTERNAL_RESET` | `true` | Serve `GET /_internal/reset` |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use s3shim_core::{S3Config, backend};
use s3shim_http::{S3HttpConfig, S3HttpService};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: S3HttpService) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Probe the health endpoint of a running server.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request =
        format!("GET /_internal/health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"status\":\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

/// The address a local health probe should connect to.
fn probe_address(listen: &str) -> String {
    listen.replace("0.0.0.0", "127.0.0.1")
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().any(|a| a == "--health-check") {
        let config = S3Config::from_env();
        let healthy = run_health_check(&probe_address(&config.gateway_listen))
            .await
            .is_ok();
        std::process::exit(i32::from(!healthy));
    }

    let config = S3Config::from_env();

    init_tracing(&config.log_level)?;

    info!(
        gateway_listen = %config.gateway_listen,
        s3_domain = %config.s3_domain,
        s3_virtual_hosting = config.s3_virtual_hosting,
        backend = %config.backend,
        internal_reset = config.internal_reset,
        version = VERSION,
        "starting s3shim server",
    );

    let backend = backend::from_config(&config)
        .await
        .with_context(|| format!("failed to initialize {} backend", config.backend))?;
    let service = S3HttpService::from_backend(backend, S3HttpConfig::from(&config));

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}
