//! Interactive view sessions.
//!
//! A `ViewSession` pins one aggregation result and owns its filter state.
//! Toggles are applied one at a time under the session lock; the registry
//! evicts sessions idle past their view timeout.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use skinpilot_core::{AggregationResult, FilterState, PriceQuote, Toggle};
use skinpilot_telemetry::Metrics;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::filter::{derive_view, FacetAvailability};

pub type SessionId = Uuid;

/// Owned snapshot of what a session shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub state: FilterState,
    pub quotes: Vec<PriceQuote>,
    pub fell_back: bool,
}

struct SessionInner {
    state: FilterState,
    last_activity: Instant,
}

/// One user's view over an aggregation result.
pub struct ViewSession {
    id: SessionId,
    result: Arc<AggregationResult>,
    availability: FacetAvailability,
    view_timeout: Duration,
    inner: Mutex<SessionInner>,
}

impl ViewSession {
    pub fn new(result: AggregationResult, view_timeout: Duration) -> Self {
        let availability = FacetAvailability::from_result(&result);
        Self {
            id: Uuid::new_v4(),
            result: Arc::new(result),
            availability,
            view_timeout,
            inner: Mutex::new(SessionInner {
                state: FilterState::new(),
                last_activity: Instant::now(),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn result(&self) -> &AggregationResult {
        &self.result
    }

    pub fn availability(&self) -> &FacetAvailability {
        &self.availability
    }

    pub fn state(&self) -> FilterState {
        self.inner.lock().state
    }

    /// Apply `toggle` and return the resulting view.
    pub fn toggle(&self, toggle: Toggle) -> ViewSnapshot {
        let mut inner = self.inner.lock();
        inner.state.apply(toggle);
        inner.last_activity = Instant::now();
        Metrics::toggle(facet_label(toggle));
        debug!(session_id = %self.id, ?toggle, state = ?inner.state, "Toggle applied");
        self.snapshot(inner.state)
    }

    /// Replace the state wholesale, e.g. from command-line flags.
    pub fn set_state(&self, state: FilterState) -> ViewSnapshot {
        let mut inner = self.inner.lock();
        inner.state = state;
        inner.last_activity = Instant::now();
        self.snapshot(state)
    }

    /// Current view without changing state.
    pub fn view(&self) -> ViewSnapshot {
        let state = self.inner.lock().state;
        self.snapshot(state)
    }

    pub fn is_expired(&self) -> bool {
        self.inner.lock().last_activity.elapsed() >= self.view_timeout
    }

    /// Time left before the session expires.
    pub fn remaining(&self) -> Duration {
        self.view_timeout
            .saturating_sub(self.inner.lock().last_activity.elapsed())
    }

    fn snapshot(&self, state: FilterState) -> ViewSnapshot {
        let view = derive_view(&self.result, &state);
        ViewSnapshot {
            state,
            quotes: view.quotes.into_iter().cloned().collect(),
            fell_back: view.fell_back,
        }
    }
}

fn facet_label(toggle: Toggle) -> &'static str {
    match toggle {
        Toggle::Wear(wear) => wear.short_code(),
        Toggle::StatTrak => "stattrak",
        Toggle::Souvenir => "souvenir",
    }
}

/// Live view sessions keyed by id.
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<ViewSession>>,
    view_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(view_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            view_timeout,
        }
    }

    /// Open a session over `result`.
    pub fn open(&self, result: AggregationResult) -> Arc<ViewSession> {
        let session = Arc::new(ViewSession::new(result, self.view_timeout));
        self.sessions.insert(session.id(), session.clone());
        self.report_active();
        info!(
            session_id = %session.id(),
            canonical_name = %session.result().canonical_name,
            "View session opened"
        );
        session
    }

    /// Live session by id. An expired session is evicted.
    pub fn get(&self, id: SessionId) -> EngineResult<Arc<ViewSession>> {
        let session = self
            .sessions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(EngineError::SessionNotFound(id))?;

        if session.is_expired() {
            self.close(id);
            return Err(EngineError::SessionExpired(id));
        }
        Ok(session)
    }

    pub fn toggle(&self, id: SessionId, toggle: Toggle) -> EngineResult<ViewSnapshot> {
        Ok(self.get(id)?.toggle(toggle))
    }

    pub fn close(&self, id: SessionId) -> bool {
        let removed = self.sessions.remove(&id).is_some();
        if removed {
            self.report_active();
            debug!(session_id = %id, "View session closed");
        }
        removed
    }

    /// Drop every expired session. Returns how many were dropped.
    pub fn evict_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired());
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            self.report_active();
            info!(evicted, "Evicted expired view sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn report_active(&self) {
        Metrics::view_sessions_active(self.sessions.len() as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinpilot_core::{ItemVariant, MarketQuote, Wear};

    fn result() -> AggregationResult {
        let quote = |id: u64, wear: Wear, stattrak: bool| {
            let variant = ItemVariant {
                canonical_name: "AWP | Asiimov".to_string(),
                raw_name: format!("AWP | Asiimov ({})", wear.label()),
                marketplace_id: id,
                wear: Some(wear),
                is_stattrak: stattrak,
                is_souvenir: false,
            };
            PriceQuote::from_market(Arc::new(variant), MarketQuote::not_found())
        };
        AggregationResult::new(
            "AWP | Asiimov",
            vec![
                quote(1, Wear::FieldTested, false),
                quote(2, Wear::BattleScarred, false),
                quote(3, Wear::FieldTested, true),
            ],
        )
    }

    #[tokio::test]
    async fn test_toggle_updates_view() {
        let session = ViewSession::new(result(), Duration::from_secs(180));
        assert_eq!(session.view().quotes.len(), 2);

        let snapshot = session.toggle(Toggle::StatTrak);
        assert!(snapshot.state.stattrak_active());
        assert_eq!(snapshot.quotes.len(), 1);
        assert_eq!(snapshot.quotes[0].variant.marketplace_id, 3);

        let snapshot = session.toggle(Toggle::StatTrak);
        assert!(snapshot.state.is_default());
        assert_eq!(snapshot.quotes.len(), 2);
    }

    #[tokio::test]
    async fn test_fallback_is_reported() {
        let session = ViewSession::new(result(), Duration::from_secs(180));
        let snapshot = session.toggle(Toggle::Souvenir);
        assert!(snapshot.fell_back);
        assert!(snapshot.state.souvenir_active());
        assert_eq!(snapshot.quotes.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_expires_after_idle_timeout() {
        let session = ViewSession::new(result(), Duration::from_secs(180));
        tokio::time::advance(Duration::from_secs(179)).await;
        assert!(!session.is_expired());

        session.toggle(Toggle::Wear(Wear::FieldTested));
        tokio::time::advance(Duration::from_secs(179)).await;
        assert!(!session.is_expired());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(session.is_expired());
        assert_eq!(session.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_registry_evicts_expired() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let stale = registry.open(result());
        tokio::time::advance(Duration::from_secs(30)).await;
        let fresh = registry.open(result());
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(registry.evict_expired(), 1);
        assert_eq!(registry.len(), 1);
        assert!(matches!(
            registry.get(stale.id()),
            Err(EngineError::SessionNotFound(_))
        ));
        assert!(registry.get(fresh.id()).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_registry_get_expired() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let session = registry.open(result());
        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(matches!(
            registry.toggle(session.id(), Toggle::StatTrak),
            Err(EngineError::SessionExpired(_))
        ));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_registry_close() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let session = registry.open(result());
        assert!(registry.close(session.id()));
        assert!(!registry.close(session.id()));
        assert!(matches!(
            registry.get(session.id()),
            Err(EngineError::SessionNotFound(_))
        ));
    }
}
