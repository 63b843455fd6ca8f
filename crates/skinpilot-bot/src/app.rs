//! Main application orchestration.
//!
//! Wires the item catalog, the marketplace client and the engine:
//! - price check: resolve variants, fan out lookups, open a view session
//! - interactive view: apply toggle commands until quit, EOF or idle timeout

use crate::catalog::{ItemCatalog, SUGGESTION_LIMIT};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::render::TableRenderer;
use skinpilot_core::{AggregationResult, FilterState, Toggle, Wear};
use skinpilot_engine::{
    DynQuoteSource, FanOutAggregator, SessionRegistry, VariantResolver, ViewSession,
};
use skinpilot_market::MarketplaceClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// How often idle view sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// One line of interactive input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    Toggle(Toggle),
    Reset,
    Help,
    Quit,
}

impl ViewCommand {
    /// Parse `fn`/`mw`/`ft`/`ww`/`bs`, `st`, `sv`, `reset`, `help`, `q`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim().to_lowercase();
        match input.as_str() {
            "q" | "quit" | "exit" => Some(Self::Quit),
            "st" | "stattrak" => Some(Self::Toggle(Toggle::StatTrak)),
            "sv" | "souvenir" => Some(Self::Toggle(Toggle::Souvenir)),
            "r" | "reset" => Some(Self::Reset),
            "?" | "h" | "help" => Some(Self::Help),
            other => other.parse::<Wear>().ok().map(|w| Self::Toggle(Toggle::Wear(w))),
        }
    }
}

const HELP: &str = "Commands: fn mw ft ww bs (wear), st (StatTrak), sv (Souvenir), reset, q";

/// Main application.
pub struct Application {
    config: AppConfig,
    resolver: Arc<dyn VariantResolver>,
    /// Kept for suggestions on unknown names.
    catalog: Option<Arc<ItemCatalog>>,
    aggregator: FanOutAggregator,
    sessions: Arc<SessionRegistry>,
    renderer: TableRenderer,
}

impl Application {
    /// Create the application from config: load the catalog and build the
    /// shared HTTP client.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let catalog = Arc::new(
            ItemCatalog::from_file(&config.catalog_path)?.with_featured(&config.featured_items),
        );
        let http = MarketplaceClient::build_http_client(&config.market)?;
        let client = MarketplaceClient::new(http, config.market.clone());
        info!(
            base_url = %config.market.base_url,
            max_attempts = config.market.max_attempts,
            "Marketplace client ready"
        );

        let mut app = Self::with_parts(config, catalog.clone(), Arc::new(client));
        app.catalog = Some(catalog);
        Ok(app)
    }

    /// Create the application over explicit collaborators.
    pub fn with_parts(
        config: AppConfig,
        resolver: Arc<dyn VariantResolver>,
        source: DynQuoteSource,
    ) -> Self {
        let sessions = Arc::new(SessionRegistry::new(config.session.view_timeout()));
        let renderer = TableRenderer::new(config.display.reference_price_ceiling_usd);
        Self {
            aggregator: FanOutAggregator::new(source),
            resolver,
            catalog: None,
            sessions,
            renderer,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Catalog names close to `query`.
    pub fn suggest(&self, query: &str) -> Vec<String> {
        self.catalog
            .as_ref()
            .map(|catalog| catalog.suggest(query, SUGGESTION_LIMIT))
            .unwrap_or_default()
    }

    /// Price every variant of `item`.
    pub async fn price_check(
        &self,
        item: &str,
        cancel: &CancellationToken,
    ) -> AppResult<AggregationResult> {
        let variants = self.resolver.resolve(item);
        if variants.is_empty() {
            return Err(AppError::UnknownItem(item.trim().to_string()));
        }

        let canonical_name = variants[0].canonical_name.clone();
        info!(item = %canonical_name, variants = variants.len(), "Price check started");
        Ok(self
            .aggregator
            .aggregate(&canonical_name, variants, cancel)
            .await?)
    }

    /// Open a view session over `result` starting at `initial`.
    pub fn open_view(&self, result: AggregationResult, initial: FilterState) -> Arc<ViewSession> {
        let session = self.sessions.open(result);
        if !initial.is_default() {
            session.set_state(initial);
        }
        session
    }

    /// Render the session's current view.
    pub fn render(&self, session: &ViewSession) -> String {
        self.renderer
            .render(session.result(), &session.view(), session.availability())
    }

    /// Drive a session from line commands on `input`, writing each new view
    /// to `output`.
    ///
    /// Ends on quit, end of input, cancellation or view timeout. The session
    /// is closed on exit.
    pub async fn run_interactive<R, W>(
        &self,
        session: Arc<ViewSession>,
        input: R,
        output: &mut W,
        cancel: &CancellationToken,
    ) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let id = session.id();
        let outcome = self.drive_view(&session, input, output, cancel).await;
        self.sessions.close(id);
        outcome
    }

    async fn drive_view<R, W>(
        &self,
        session: &ViewSession,
        input: R,
        output: &mut W,
        cancel: &CancellationToken,
    ) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let id = session.id();
        let mut lines = input.lines();
        output.write_all(format!("{HELP}\n").as_bytes()).await?;
        output.flush().await?;

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                () = tokio::time::sleep(session.remaining()) => {
                    info!(session_id = %id, "View session timed out");
                    output.write_all(b"View expired.\n").await?;
                    break;
                }
                () = cancel.cancelled() => {
                    debug!(session_id = %id, "Interactive view cancelled");
                    break;
                }
            };

            let Some(line) = line else {
                debug!(session_id = %id, "Input closed");
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            if session.is_expired() {
                output.write_all(b"View expired.\n").await?;
                break;
            }

            let reply = match ViewCommand::parse(&line) {
                Some(ViewCommand::Quit) => break,
                Some(ViewCommand::Help) => format!("{HELP}\n"),
                Some(ViewCommand::Toggle(toggle)) => {
                    self.sessions.toggle(id, toggle)?;
                    self.render(session)
                }
                Some(ViewCommand::Reset) => {
                    self.sessions.get(id)?.set_state(FilterState::new());
                    self.render(session)
                }
                None => format!("Unknown command {:?}. {HELP}\n", line.trim()),
            };
            output.write_all(reply.as_bytes()).await?;
            output.flush().await?;
        }

        output.flush().await?;
        Ok(())
    }

    /// Periodically evict idle sessions until `cancel` fires.
    pub fn spawn_session_sweeper(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let sessions = self.sessions.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        sessions.evict_expired();
                    }
                    () = cancel.cancelled() => break,
                }
            }
        })
    }
}

/// Initial filter state from command-line flags.
pub fn initial_state(wear: Option<Wear>, stattrak: bool, souvenir: bool) -> FilterState {
    let mut state = FilterState::new();
    if let Some(wear) = wear {
        state.apply(Toggle::Wear(wear));
    }
    if stattrak {
        state.apply(Toggle::StatTrak);
    } else if souvenir {
        state.apply(Toggle::Souvenir);
    }
    state
}
