//! SkinPilot - Entry Point

use anyhow::Result;
use clap::{Parser, Subcommand};
use skinpilot_bot::{initial_state, AppConfig, AppError, Application};
use skinpilot_core::Wear;
use skinpilot_telemetry::Metrics;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Marketplace price checker for CS items
#[derive(Parser, Debug)]
#[command(name = "skinpilot", version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via SKINPILOT_CONFIG env var)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Print Prometheus metrics to stderr before exiting
    #[arg(long, global = true)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Price every variant of an item
    Price {
        /// Canonical item name, e.g. "AK-47 | Redline"
        item: String,
        /// Start filtered to this wear (fn, mw, ft, ww, bs or the full label)
        #[arg(long)]
        wear: Option<String>,
        /// Start on StatTrak variants
        #[arg(long, conflicts_with = "souvenir")]
        stattrak: bool,
        /// Start on Souvenir variants
        #[arg(long)]
        souvenir: bool,
        /// Keep the view open and read toggle commands from stdin
        #[arg(short, long)]
        interactive: bool,
    },
    /// List catalog items matching a partial name, or featured items
    Search {
        #[arg(default_value = "")]
        query: String,
        #[arg(short, long, default_value_t = 25)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    skinpilot_telemetry::init_logging()?;
    info!("Starting SkinPilot v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(args.config.as_deref())?;
    info!(catalog = %config.catalog_path, "Configuration loaded");

    let app = Application::new(config)?;

    // Ctrl-C cancels in-flight lookups and the interactive view.
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            ctrl_c.cancel();
        }
    });

    let outcome = match args.command {
        Command::Price {
            item,
            wear,
            stattrak,
            souvenir,
            interactive,
        } => {
            let wear = wear.as_deref().map(str::parse::<Wear>).transpose()?;
            price(&app, &item, initial_state(wear, stattrak, souvenir), interactive, &cancel).await
        }
        Command::Search { query, limit } => {
            let names = app.suggest(&query);
            if names.is_empty() {
                println!("No items match {query:?}");
            }
            for name in names.into_iter().take(limit) {
                println!("{name}");
            }
            Ok(())
        }
    };

    cancel.cancel();
    if args.print_metrics {
        eprintln!("{}", Metrics::render()?);
    }
    outcome
}

async fn price(
    app: &Application,
    item: &str,
    initial: skinpilot_core::FilterState,
    interactive: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let result = match app.price_check(item, cancel).await {
        Ok(result) => result,
        Err(AppError::UnknownItem(name)) => {
            let suggestions = app.suggest(&name);
            if suggestions.is_empty() {
                anyhow::bail!("Unknown item {name:?}");
            }
            anyhow::bail!(
                "Unknown item {name:?}. Did you mean:\n  {}",
                suggestions.join("\n  ")
            );
        }
        Err(e) => return Err(e.into()),
    };

    let session = app.open_view(result, initial);
    print!("{}", app.render(&session));

    if interactive {
        let sweeper = app.spawn_session_sweeper(cancel.clone());
        let mut stdout = tokio::io::stdout();
        app.run_interactive(session, BufReader::new(tokio::io::stdin()), &mut stdout, cancel)
            .await?;
        cancel.cancel();
        let _ = sweeper.await;
    }
    Ok(())
}
