mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};

use vg_core::config::{BackendMode, Config};
use vg_fetch::{start_sweep_task, JobStore, JobStoreOptions};
use vg_server::{build_router, AppContext};

async fn start_server(host: String, port: u16, config_path: Option<&Path>) -> Result<()> {
    // Load config
    let mut config = Config::load_or_default(config_path)?;

    // Override host/port from CLI if specified
    config.server.host = host;
    config.server.port = port;

    for warning in config.validate() {
        tracing::warn!("Config: {warning}");
    }

    tracing::info!("Starting vidgrab server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    // Resolve the decoder up front so a misconfigured local backend fails
    // fast instead of on the first request.
    let decoder = match vg_fetch::resolve_decoder(&config.tools) {
        Some(path) => {
            tracing::info!("Using decoder at {}", path.display());
            path
        }
        None if config.backend.mode == BackendMode::Local => {
            anyhow::bail!(
                "no decoder binary found; install {} or set tools.decoder_path",
                vg_fetch::DEFAULT_DECODER
            );
        }
        None => {
            tracing::warn!("No decoder binary found; only the resolver backend will work");
            std::path::PathBuf::from(vg_fetch::DEFAULT_DECODER)
        }
    };

    let store = Arc::new(JobStore::new(
        config.downloads.root.clone(),
        decoder,
        JobStoreOptions::from(&config.downloads),
    )?);

    // The first tick fires immediately, clearing directories left over from
    // a previous process before any new job lands.
    let sweep_handle = start_sweep_task(
        store.clone(),
        config.downloads.sweep_interval(),
        config.downloads.retention(),
    );

    let addr: std::net::SocketAddr =
        format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .context("Invalid server address")?;

    let ctx = AppContext::new(Arc::new(config), store);
    let app = build_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down...");
    sweep_handle.abort();

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vidgrab=trace,vg_core=trace,vg_fetch=trace,vg_server=trace,tower_http=debug"
                .to_string()
        } else {
            "vidgrab=debug,vg_core=debug,vg_fetch=debug,vg_server=debug,tower_http=info"
                .to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            // Create tokio runtime
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("vidgrab {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(config_path)?;

    let rt = tokio::runtime::Runtime::new()?;
    let info = rt.block_on(vg_fetch::check_decoder(&config.tools));

    println!("Checking external tools...\n");

    let status = if info.available { "✓" } else { "✗" };
    print!("{} {}", status, info.name);
    if let Some(ref version) = info.version {
        print!(" ({version})");
    }
    if let Some(ref path) = info.path {
        print!(" -- {}", path.display());
    }
    println!();

    if !info.available {
        println!(
            "\nInstall {} or set tools.decoder_path in the config.",
            vg_fetch::DEFAULT_DECODER
        );
        anyhow::bail!("decoder not available");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(path)?;
    let warnings = config.validate();

    if warnings.is_empty() {
        println!("Configuration OK");
    } else {
        println!("Configuration loaded with {} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
