//! proxyhost - multi-tenant static site gateway.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proxyhost::{
    config::{CheckConfig, Cli, Command, ServeConfig, StorageBackend},
    create_router, create_s3_client, parse_request_path,
    store::{BlobStore, MemoryBlobStore, S3BlobStore},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(config) => run_serve(config).await,
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("proxyhost v{}", env!("CARGO_PKG_VERSION"));
    info!("");
    info!("Configuration:");
    info!("  Site prefix: {}", config.site_prefix);
    info!("  Cache-Control max-age: {}s", config.cache_max_age);
    match config.fetch_timeout() {
        Some(timeout) => info!("  Fetch timeout: {}s", timeout.as_secs()),
        None => warn!("  Fetch timeout: DISABLED - slow storage holds requests open"),
    }
    info!("  Upload limit: {} bytes", config.max_upload_bytes);

    match config.storage.storage {
        StorageBackend::S3 => {
            let bucket = config.storage.bucket();
            info!("  S3 bucket: {}", bucket);
            if let Some(ref endpoint) = config.storage.s3_endpoint {
                info!("  S3 endpoint: {}", endpoint);
            }
            info!("  S3 region: {}", config.storage.s3_region);

            let client = create_s3_client(
                config.storage.s3_endpoint.as_deref(),
                &config.storage.s3_region,
            )
            .await;
            let store = S3BlobStore::new(client, bucket);

            info!("");
            info!("Connecting to S3...");
            if let Err(e) = store.check().await {
                error!("  Failed to connect to S3: {}", e);
                error!("");
                error!("  Please check:");
                error!("    - Your AWS credentials are configured correctly");
                error!("    - The bucket '{}' exists and is accessible", bucket);
                error!("    - The S3 endpoint is correct (if using MinIO/custom S3)");
                return ExitCode::FAILURE;
            }
            info!("  Connected successfully");

            serve_with_store(store, &config).await
        }
        StorageBackend::Memory => {
            warn!("  Storage: MEMORY - published sites are lost on restart");
            serve_with_store(MemoryBlobStore::new(), &config).await
        }
    }
}

/// Bind the listener and run the router until ctrl-c.
async fn serve_with_store<B>(store: B, config: &ServeConfig) -> ExitCode
where
    B: BlobStore + Clone + 'static,
{
    let router = create_router(store, config.router_config());
    let addr = config.bind_address();
    let prefix = config.site_prefix.trim_end_matches('/');

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!(
        "    curl -X POST --data-binary @index.html http://{}/api/sites/<tenant>",
        addr
    );
    info!("    curl http://{}{}/<tenant>/<site>/", addr, prefix);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server shutdown complete");
    ExitCode::SUCCESS
}

/// Resolves when ctrl-c is received.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining connections"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "proxyhost=debug,tower_http=debug"
    } else {
        "proxyhost=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("proxyhost Configuration Check");
    println!("═════════════════════════════════");
    println!();

    if let Err(e) = config.validate() {
        println!("✗ {}", e);
        return ExitCode::FAILURE;
    }

    let bucket = config.storage.bucket();
    println!("✓ Bucket: {}", bucket);
    if let Some(ref endpoint) = config.storage.s3_endpoint {
        println!("✓ Endpoint: {}", endpoint);
    }
    println!("✓ Region: {}", config.storage.s3_region);
    println!();

    print!("Testing S3 connection... ");

    let client = create_s3_client(
        config.storage.s3_endpoint.as_deref(),
        &config.storage.s3_region,
    )
    .await;
    let store = S3BlobStore::new(client, bucket);

    if let Err(e) = store.check().await {
        println!("✗ failed");
        println!();
        println!("Error: {}", e);
        println!();
        println!("Please check:");
        println!("  - Your AWS credentials are configured correctly");
        println!("  - The bucket '{}' exists and is accessible", bucket);
        if config.storage.s3_endpoint.is_some() {
            println!("  - The S3 endpoint is correct and reachable");
        }
        return ExitCode::FAILURE;
    }
    println!("✓ success");

    if let Some(path) = config.probe_path() {
        println!();

        let site_path = match parse_request_path(&path) {
            Ok(site_path) => site_path,
            Err(e) => {
                println!("✗ Invalid probe path '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        };
        let key = site_path.storage_key();
        print!("Testing object '{}'... ", key);

        match store.get(&key).await {
            Ok(Some(object)) => {
                println!("✓ found");
                println!("  Size: {} bytes", object.data.len());
                println!("  Stored Content-Type: {}", object.content_type);
            }
            Ok(None) => {
                println!("✗ not found");
                println!();
                println!("  The object '{}' does not exist in the bucket.", key);
                return ExitCode::FAILURE;
            }
            Err(e) => {
                println!("✗ failed");
                println!();
                println!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    println!();
    println!("═════════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}
