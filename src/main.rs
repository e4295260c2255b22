use analytics::QueryEngine;
use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use configuration::{load_config, settings::Config};
use database::{DbRepository, connect, database_exists, run_migrations};
use indicatif::{ProgressBar, ProgressStyle};
use snapshot_client::{bootstrap_if_needed, load_snapshot, source_from_config};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use timeseries::{StoreHandle, load_store};
use web_server::{AppState, ParamSpec, call_tool, run_server, tool_catalog};

/// The main entry point for the market index query service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Overrides such as MARKET_INDEX__STORAGE__DATABASE_URL may live in a .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    // Dropping the guard flushes the file appender, so it lives until exit.
    let _log_guard = configuration::init_tracing(&config.logging)?;

    match cli.command {
        Commands::Load(args) => handle_load(args, config).await,
        Commands::Serve(args) => handle_serve(args, config).await,
        Commands::Call(args) => handle_call(args, config).await,
        Commands::Tools => {
            handle_tools();
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Analytical queries over daily OHLCV series of market indices.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Missing keys fall back to defaults.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a snapshot and upsert it into the local database.
    Load(LoadArgs),
    /// Build the store and serve the tools over HTTP.
    Serve(ServeArgs),
    /// Invoke a single tool and print its JSON result.
    Call(CallArgs),
    /// List the available tools.
    Tools,
}

#[derive(Parser)]
struct LoadArgs {
    /// Read the snapshot from a local JSON file.
    #[arg(long, conflicts_with = "url")]
    snapshot: Option<PathBuf>,

    /// Download the snapshot from this URL.
    #[arg(long)]
    url: Option<String>,
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to bind, overriding `server.host`.
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to bind, overriding `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct CallArgs {
    /// Tool name, e.g. "get_worst_days".
    tool: String,

    /// Tool arguments as a JSON object (e.g. '{"symbol": "^GSPC", "year": 2020}').
    #[arg(long)]
    args: Option<String>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Handles `load`: one fetch, one transactional upsert.
async fn handle_load(args: LoadArgs, config: Config) -> anyhow::Result<()> {
    let mut snapshot_config = config.snapshot.clone();
    if let Some(path) = args.snapshot {
        snapshot_config.path = Some(path);
    } else if let Some(url) = args.url {
        snapshot_config.path = None;
        snapshot_config.url = Some(url);
    }
    let source = source_from_config(&snapshot_config)?;

    let (repo, _) = open_repository(&config).await?;
    let progress = spinner(format!("Loading snapshot from {}...", source.describe()));
    let summary = load_snapshot(source.as_ref(), &repo)
        .await
        .with_context(|| format!("failed to load snapshot from {}", source.describe()))?;
    progress.finish_with_message("Snapshot stored!");
    let totals = repo.counts().await?;

    println!(
        "Loaded {} symbols and {} bars into {}",
        summary.symbols, summary.bars, config.storage.database_url
    );
    println!("Database now holds {} symbols and {} bars", totals.symbols, totals.bars);
    Ok(())
}

/// Handles `serve`.
///
/// The server starts listening straight away. The store is built in the
/// background; until it is swapped in, tool calls answer "store unavailable".
async fn handle_serve(args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let mut server = config.server.clone();
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }

    let (repo, fresh) = open_repository(&config).await?;
    let handle = StoreHandle::unloaded();
    let state = Arc::new(AppState::new(handle.clone(), repo.clone()));

    tokio::spawn(async move {
        let built = async {
            bootstrap_if_needed(&repo, fresh, || source_from_config(&config.snapshot))
                .await
                .context("first-run snapshot load failed")?;
            Ok::<_, anyhow::Error>(load_store(&repo).await?)
        };
        match built.await {
            Ok(store) => {
                handle.replace(store);
            }
            Err(err) => tracing::error!(
                error = %format!("{err:#}"),
                "failed to build the time series store"
            ),
        }
    });

    run_server(server.socket_addr(), state).await
}

/// Handles `call`: builds the store in-process and runs one tool.
async fn handle_call(args: CallArgs, config: Config) -> anyhow::Result<()> {
    let tool_args = match args.args.as_deref() {
        Some(raw) => serde_json::from_str(raw).context("--args is not valid JSON")?,
        None => serde_json::Value::Null,
    };

    let (repo, fresh) = open_repository(&config).await?;
    let progress = spinner("Preparing the local database...".to_string());
    bootstrap_if_needed(&repo, fresh, || source_from_config(&config.snapshot))
        .await
        .context("first-run snapshot load failed")?;
    progress.finish_and_clear();
    let engine = QueryEngine::new(StoreHandle::new(load_store(&repo).await?));

    let result = call_tool(&engine, &args.tool, tool_args)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Handles `tools`: the catalog as a table.
fn handle_tools() {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Tool", "Parameters", "Description"]);

    for tool in tool_catalog() {
        let params = tool.params.iter().map(describe_param).collect::<Vec<_>>().join("\n");
        table.add_row(vec![tool.name.to_string(), params, tool.description.to_string()]);
    }
    println!("{table}");
}

fn describe_param(param: &ParamSpec) -> String {
    let optional = if param.required { "" } else { "?" };
    match param.default {
        Some(default) => format!("{}{optional}: {} = {default}", param.name, param.kind),
        None => format!("{}{optional}: {}", param.name, param.kind),
    }
}

// ==============================================================================
// Storage Helpers
// ==============================================================================

/// Connects and migrates. The flag is true when the database file did not
/// exist before this call.
async fn open_repository(config: &Config) -> anyhow::Result<(DbRepository, bool)> {
    let url = &config.storage.database_url;
    // Checked before connecting, since connecting creates the file.
    let fresh = !database_exists(url);

    let pool = connect(url)
        .await
        .with_context(|| format!("failed to open database {url}"))?;
    run_migrations(&pool).await?;
    Ok((DbRepository::new(pool), fresh))
}

fn spinner(message: String) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    let template = "{spinner:.green} [{elapsed_precise}] {msg}";
    if let Ok(style) = ProgressStyle::default_spinner().template(template) {
        progress.set_style(style);
    }
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}
