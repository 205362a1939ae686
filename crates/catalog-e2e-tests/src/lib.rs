pub mod rest;

use std::time::Duration;

use anyhow::{Result, anyhow};
use catalog_server::config::{Parser, ServerConfig};
use rand::Rng as _;
use tempfile::TempDir;
use tracing::{debug, error};

/// Keeps the test's data directory (and the catalog database inside) alive until dropped.
pub struct DataDirGuard(#[allow(dead_code)] TempDir);

/// Server configuration for one test: own temporary data dir and a port nobody listens on.
pub fn test_config(test_name: &str, extra_args: &[&str]) -> Result<(ServerConfig, DataDirGuard)> {
    let data_dir = TempDir::with_prefix(format!("{test_name}_"))?;
    let data_dir_arg = data_dir.path().to_string_lossy().to_string();

    // the port is only probed here, server binds it later
    let mut rng = rand::rng();
    let port = (0..10)
        .map(|_| rng.random_range(3030..4030u16))
        .find(|port| std::net::TcpListener::bind(("127.0.0.1", *port)).is_ok())
        .ok_or_else(|| anyhow!("No free port for test {test_name}"))?
        .to_string();
    let base_url = format!("http://localhost:{port}");

    let mut args = vec![
        "catalog-e2e-tests",
        "--data-dir",
        &data_dir_arg,
        "--port",
        &port,
        "--base-url",
        &base_url,
    ];
    args.extend_from_slice(extra_args);
    let config = ServerConfig::try_parse_from(args)?;
    debug!("Test {test_name} uses port {port} and data dir {data_dir_arg}");
    Ok((config, DataDirGuard(data_dir)))
}

/// Fresh (empty) database in a temporary directory, removed when guard is dropped.
pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, DataDirGuard)> {
    test_config(test_name, &[])
}

/// Starts server in background and waits until it answers health checks.
pub async fn spawn_server(args: ServerConfig) -> Result<()> {
    let health_url = args.base_url.join("health")?;
    let state = catalog_server::run::build_state(&args).await?;
    tokio::spawn(async move {
        if let Err(e) =
            catalog_server::run::run_graceful_with_state(args, state, std::future::pending()).await
        {
            error!("Test server failed: {e}");
        }
    });

    let client = reqwest::Client::new();
    for _ in 0..50 {
        match client.get(health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => return Ok(()),
            Ok(response) => debug!("Server not ready: {}", response.status()),
            Err(e) => debug!("Server not ready: {e}"),
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    Err(anyhow!("Server did not start"))
}

pub async fn launch_env(args: ServerConfig) -> Result<reqwest::Client> {
    spawn_server(args).await?;
    let client = reqwest::Client::builder().build()?;
    Ok(client)
}
