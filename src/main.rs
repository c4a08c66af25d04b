mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use sx_core::config::Config;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    api_key: Option<String>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = Config::load_or_default(config_path);

    // CLI flags win over the config file.
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(api_key) = api_key {
        config.auth.api_key = Some(api_key);
    }

    tracing::info!("Starting sharex server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    sx_server::start(config).await?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "sharex=debug,sx_server=debug,sx_store=debug,tower_http=debug".to_string()
        } else {
            "sharex=info,sx_server=info,sx_store=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start {
            host,
            port,
            api_key,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, api_key, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::GenerateApiKey => {
            println!("{}", sx_server::middleware::auth::generate_api_key());
            Ok(())
        }
        Commands::Version => {
            println!("sharex {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            let contents = std::fs::read_to_string(p)
                .with_context(|| format!("failed to read {}", p.display()))?;
            Config::from_json(&contents)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Public URL: {}", config.server.public_url);
    println!("  Media URL: {}", config.media_base_url());
    println!("  Metadata database: {}", config.storage.db_path.display());
    println!("  Object directory: {}", config.storage.objects_dir.display());
    println!("  Max upload: {} bytes", config.server.max_upload_bytes);

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        for warning in &warnings {
            println!("⚠ {warning}");
        }
    }

    Ok(())
}
