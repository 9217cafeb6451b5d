mod cli;

use wishlist::{
    config::{self, Config},
    graphql::{self, GraphqlService},
    metadata::{MetadataProvider, WatchmodeProvider},
    server,
    services::{ExecutionSettings, Services},
};
use wishlist_db::pool::init_pool;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;

/// Wire storage and the provider into the GraphQL schema.
fn build_graphql(config: &Config) -> Result<GraphqlService> {
    let db_path = config.database.path.to_string_lossy();
    tracing::info!("Initializing database at {}", db_path);
    let pool = init_pool(&db_path)?;

    let provider: Arc<dyn MetadataProvider> =
        Arc::new(WatchmodeProvider::from_config(&config.watchmode)?);
    if !provider.is_available() {
        tracing::warn!("Metadata provider '{}' is not configured", provider.name());
    }

    let services = Services::new(
        pool,
        provider,
        ExecutionSettings::from(&config.graphql),
    );

    GraphqlService::new(Arc::new(services), &config.graphql).context("Failed to build schema")
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting wishlist server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let graphql = build_graphql(&config)?;
    server::start_server(config, graphql).await
}

async fn run_query(
    query: String,
    variables: Option<String>,
    operation_name: Option<String>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let mut request = async_graphql::Request::new(query);
    if let Some(raw) = variables {
        let variables = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&raw)
            .context("--variables must be a JSON object")?;
        request = request.variables(async_graphql::Variables::from_json(variables.into()));
    }
    if let Some(name) = operation_name {
        request = request.operation_name(name);
    }

    let graphql = build_graphql(&config)?;
    let response = graphql.execute(request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.data == async_graphql::Value::Null && response.is_err() {
        anyhow::bail!("Query could not be executed");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "wishlist=trace,wishlist_db=debug,wishlist_common=debug,tower_http=debug".to_string()
        } else {
            "wishlist=debug,wishlist_db=info,tower_http=info".to_string()
        }
    });

    // Logs go to stderr so `wishlist query` output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Query {
            query,
            variables,
            operation_name,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_query(
                query,
                variables,
                operation_name,
                cli.config.as_deref(),
            ))
        }
        Commands::Schema => {
            print!("{}", graphql::sdl()?);
            Ok(())
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("wishlist {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_summary(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            print_summary(&config);
        }
    }

    Ok(())
}

fn print_summary(config: &Config) {
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.database.path.display());
    println!("  WatchMode: {}", config.watchmode.base_url);
    println!(
        "  API key: {}",
        if config.watchmode.api_key.is_empty() {
            "not set"
        } else {
            "set"
        }
    );
    println!(
        "  Similar titles concurrency: {}",
        config.graphql.similar_titles_concurrency
    );
    println!(
        "  Request timeout: {}s",
        config.graphql.request_timeout_secs
    );
}
