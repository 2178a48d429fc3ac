//! serve command - Serve the HTTP API
//!
//! Builds one proxy at startup and shares it across requests. With
//! `--in-memory` the proxy talks to a process-local store instead of S3.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use kv_core::{MemoryClientFactory, MemoryStore, StorageProxy};
use serde::Serialize;
use tokio::net::TcpListener;

use super::StorageArgs;
use crate::api::{AppState, create_router};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Serve the HTTP API
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "S3KV_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// Keep items in process memory instead of S3
    #[arg(long)]
    pub in_memory: bool,
}

#[derive(Debug, Serialize)]
struct ServeOutput<'a> {
    listen: SocketAddr,
    bucket: &'a str,
}

/// Execute the serve command
pub async fn execute(
    args: ServeArgs,
    storage: &StorageArgs,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let proxy = match build_proxy(&args, storage) {
        Ok(proxy) => proxy,
        Err(e) => return formatter.config_failure(&e),
    };

    match run(args.listen, proxy, &formatter).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            ExitCode::UsageError
        }
    }
}

fn build_proxy(args: &ServeArgs, storage: &StorageArgs) -> kv_core::Result<StorageProxy> {
    if !args.in_memory {
        return storage.connect();
    }

    let mut settings = storage.layered_settings()?;
    if settings.bucket.is_empty() {
        settings.bucket = "s3kv".to_string();
    }
    tracing::info!(bucket = %settings.bucket, "Serving from an in-memory store");
    let factory = MemoryClientFactory::new(MemoryStore::new());
    StorageProxy::from_settings(&settings, Arc::new(factory))
}

async fn run(addr: SocketAddr, proxy: StorageProxy, formatter: &Formatter) -> anyhow::Result<()> {
    let bucket = proxy.bucket().to_string();
    let router = create_router(AppState::new(proxy));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let local = listener.local_addr().context("Failed to read local address")?;

    tracing::info!(%local, %bucket, "Server listening");
    formatter.done(
        &ServeOutput {
            listen: local,
            bucket: &bucket,
        },
        &format!("Listening on http://{local} (bucket '{bucket}')"),
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
