//! Mock marketplace server for integration tests.
//!
//! Serves the sell-order endpoint on an ephemeral local port and can:
//! - Replay a scripted sequence of replies per goods id
//! - Count hits per goods id
//! - Record received query strings

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};

const SELL_ORDER_PATH: &str = "/api/market/goods/sell_order";

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with this JSON body.
    Json(Value),
    /// Bare status code with a short text body.
    Status(u16),
    /// 200 with a non-JSON body.
    Raw(&'static str),
    /// Sleep, then answer with a priced payload.
    Stall(Duration),
}

#[derive(Default)]
struct MockState {
    /// Remaining replies per goods id; the last one repeats.
    scripts: Mutex<HashMap<u64, VecDeque<MockReply>>>,
    hits: Mutex<HashMap<u64, u32>>,
    queries: Mutex<Vec<HashMap<String, String>>>,
}

/// A mock marketplace for testing.
pub struct MockMarketServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: oneshot::Sender<()>,
}

impl MockMarketServer {
    /// Start a new mock server on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(MockState::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = Router::new()
            .route(SELL_ORDER_PATH, get(sell_order))
            .with_state(state.clone());

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            addr,
            state,
            shutdown_tx,
        }
    }

    /// Sell-order endpoint URL.
    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, SELL_ORDER_PATH)
    }

    /// Script the replies for `goods_id`. The last reply repeats forever.
    pub async fn script(&self, goods_id: u64, replies: Vec<MockReply>) {
        self.state
            .scripts
            .lock()
            .await
            .insert(goods_id, replies.into());
    }

    /// Number of requests received for `goods_id`.
    pub async fn hits(&self, goods_id: u64) -> u32 {
        self.state
            .hits
            .lock()
            .await
            .get(&goods_id)
            .copied()
            .unwrap_or(0)
    }

    /// All received query parameter maps, in arrival order.
    pub async fn queries(&self) -> Vec<HashMap<String, String>> {
        self.state.queries.lock().await.clone()
    }

    /// Shutdown the server.
    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Priced payload: one listing at `listing` CNY, reference `usd`/`cny`.
pub fn priced_payload(goods_id: u64, listing: &str, usd: &str, cny: &str) -> Value {
    json!({
        "code": "OK",
        "data": {
            "total_count": 1,
            "goods_infos": {
                goods_id.to_string(): {
                    "steam_price": usd,
                    "steam_price_cny": cny,
                    "goods_info": { "icon_url": format!("https://icon/{goods_id}.png") }
                }
            },
            "items": [
                {
                    "price": listing,
                    "asset_info": { "info": { "inspect_en_url": format!("https://inspect/{goods_id}.png") } }
                }
            ]
        }
    })
}

/// Empty-market payload.
pub fn empty_payload() -> Value {
    json!({
        "code": "OK",
        "data": { "total_count": 0, "goods_infos": {}, "items": [] }
    })
}

async fn sell_order(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let goods_id: u64 = params
        .get("goods_id")
        .and_then(|id| id.parse().ok())
        .unwrap_or_default();

    state.queries.lock().await.push(params);
    *state.hits.lock().await.entry(goods_id).or_insert(0) += 1;

    let reply = {
        let mut scripts = state.scripts.lock().await;
        match scripts.get_mut(&goods_id) {
            Some(script) if script.len() > 1 => script.pop_front(),
            Some(script) => script.front().cloned(),
            None => None,
        }
    };

    match reply {
        Some(MockReply::Json(body)) => Json(body).into_response(),
        Some(MockReply::Status(code)) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, "mock error").into_response()
        }
        Some(MockReply::Raw(body)) => (StatusCode::OK, body).into_response(),
        Some(MockReply::Stall(delay)) => {
            tokio::time::sleep(delay).await;
            Json(priced_payload(goods_id, "100", "14", "100")).into_response()
        }
        None => Json(priced_payload(goods_id, "100", "14", "100")).into_response(),
    }
}
