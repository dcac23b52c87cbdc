// src/main.rs

//! Mini DB console - type SQL-like queries, see tables
//!
//! Sends each query to the parser service, attaches the selected index
//! engine, runs it against the database service and renders the result.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use minidb_console::client;
use minidb_console::config::{self, Config, Overrides, Settings};
use minidb_console::pipeline::Orchestrator;
use minidb_console::query::SelectorPolicy;
use minidb_console::repl::{self, Repl};

#[derive(Parser)]
#[command(name = "minidb")]
#[command(about = "Query console for the Mini DB parser and database services")]
#[command(version)]
struct Args {
    /// Base URL of the API (parser at /parser, database at /database)
    #[arg(long, env = "MINIDB_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Index engine: -, bplustree, seqfile, exthashing, isam
    #[arg(long, short = 'i', env = "MINIDB_INDEX")]
    index: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "MINIDB_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Reject unknown index engine names instead of sending no index
    #[arg(long)]
    strict_index: bool,

    /// Run one query and exit
    #[arg(long, short = 'q')]
    query: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from ~/.minidb/.env or current dir)
    config::load_dotenv();

    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("minidb_console=debug,minidb=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    // Resolve values: CLI args > env vars (handled by clap) > config file > defaults
    let settings = Settings::resolve(
        Overrides {
            api_base_url: args.api_base_url,
            index: args.index,
            timeout_secs: args.timeout,
            strict_index: args.strict_index,
        },
        Config::load(),
        std::env::var(config::LEGACY_BASE_URL_ENV).ok(),
    );
    tracing::debug!(?settings, "resolved settings");

    let (parser, executor) = client::http_services(&settings.api_base_url, settings.timeout)
        .with_context(|| format!("invalid API base URL: {}", settings.api_base_url))?;

    if let Err(e) = settings.policy.resolve(&settings.index) {
        anyhow::bail!("invalid index engine '{}': {} ({})", settings.index, e, e.reason());
    }

    let orchestrator = Arc::new(
        Orchestrator::new(Arc::new(parser), Arc::new(executor))
            .with_policy(settings.policy)
            .with_selector(settings.index.clone()),
    );

    if let Some(query) = args.query {
        let code = repl::run_once(&orchestrator, &query, args.json).await;
        std::process::exit(code);
    }

    // Pretty startup banner
    println!();
    println!("{}", repl::banner_accent(&format!("  Mini DB Console {}", env!("CARGO_PKG_VERSION"))));
    println!("{}", repl::separator(50));
    println!("{}", repl::banner_line("API", &settings.api_base_url));
    println!("{}", repl::banner_line("Index", &settings.index));
    println!(
        "{}",
        repl::banner_line(
            "Policy",
            match settings.policy {
                SelectorPolicy::Permissive => "permissive",
                SelectorPolicy::Strict => "strict",
            }
        )
    );
    println!("{}", repl::banner_line("Timeout", &format!("{}s", settings.timeout.as_secs())));
    println!("{}", repl::separator(50));
    println!();

    let mut repl = Repl::new(orchestrator, settings.api_base_url)?.with_raw(args.json);
    repl.run().await
}
