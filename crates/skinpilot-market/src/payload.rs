//! Sell-order payload decoding.
//!
//! The upstream answers with loosely typed JSON: prices arrive as strings
//! or numbers, and most sub-objects are optional. Decoding validates the
//! fields we depend on and turns any mismatch into `MarketError::Decode`.
//!
//! Expected shape:
//! ```json
//! {
//!   "code": "OK",
//!   "data": {
//!     "total_count": 12,
//!     "goods_infos": {
//!       "33975": {
//!         "steam_price": "14.02",
//!         "steam_price_cny": "100.8",
//!         "goods_info": { "icon_url": "https://..." }
//!       }
//!     },
//!     "items": [
//!       { "price": "88.5", "asset_info": { "info": { "inspect_en_url": "https://..." } } }
//!     ]
//!   }
//! }
//! ```

use crate::error::{MarketError, MarketResult};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use skinpilot_core::{MarketQuote, Price, QuoteStatus};
use std::collections::HashMap;
use std::str::FromStr;

/// Success code reported by the upstream.
const CODE_OK: &str = "OK";

#[derive(Debug, Deserialize)]
struct RawSellOrderResponse {
    code: Option<String>,
    #[serde(default)]
    msg: Option<Value>,
    data: Option<RawSellOrderData>,
}

#[derive(Debug, Deserialize)]
struct RawSellOrderData {
    total_count: Option<Value>,
    #[serde(default)]
    goods_infos: HashMap<String, RawGoodsInfo>,
    #[serde(default)]
    items: Vec<RawListing>,
}

#[derive(Debug, Default, Deserialize)]
struct RawGoodsInfo {
    /// Reference price in USD.
    #[serde(default)]
    steam_price: Option<Value>,
    /// Same reference price in CNY.
    #[serde(default)]
    steam_price_cny: Option<Value>,
    #[serde(default)]
    goods_info: Option<RawCatalogInfo>,
}

#[derive(Debug, Deserialize)]
struct RawCatalogInfo {
    #[serde(default)]
    original_icon_url: Option<String>,
    #[serde(default)]
    icon_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawListing {
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    asset_info: Option<RawAssetInfo>,
}

#[derive(Debug, Deserialize)]
struct RawAssetInfo {
    #[serde(default)]
    info: Option<RawAssetDetail>,
}

#[derive(Debug, Deserialize)]
struct RawAssetDetail {
    #[serde(default)]
    inspect_en_url: Option<String>,
}

impl RawListing {
    fn inspect_url(&self) -> Option<&str> {
        self.asset_info
            .as_ref()?
            .info
            .as_ref()?
            .inspect_en_url
            .as_deref()
            .filter(|url| !url.is_empty())
    }
}

impl RawCatalogInfo {
    fn image_url(&self) -> Option<&str> {
        self.original_icon_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .or_else(|| self.icon_url.as_deref().filter(|url| !url.is_empty()))
    }
}

/// Decode a sell-order response body for `goods_id`.
pub fn decode_sell_orders(body: &[u8], goods_id: u64) -> MarketResult<MarketQuote> {
    let raw: RawSellOrderResponse = serde_json::from_slice(body)
        .map_err(|e| MarketError::Decode(format!("malformed sell-order payload: {e}")))?;

    match raw.code.as_deref() {
        Some(CODE_OK) => {}
        Some(code) => {
            let msg = raw.msg.map(|m| m.to_string()).unwrap_or_default();
            return Err(MarketError::Decode(format!(
                "upstream returned code {code}: {msg}"
            )));
        }
        None => return Err(MarketError::Decode("missing field `code`".to_string())),
    }

    let data = raw
        .data
        .ok_or_else(|| MarketError::Decode("missing field `data`".to_string()))?;

    let total_count = data
        .total_count
        .as_ref()
        .ok_or_else(|| MarketError::Decode("missing field `data.total_count`".to_string()))
        .and_then(parse_count)?;

    if total_count == 0 {
        return Ok(MarketQuote::not_found());
    }

    let first = data.items.first().ok_or_else(|| {
        MarketError::Decode(format!(
            "total_count is {total_count} but `data.items` is empty"
        ))
    })?;
    let listing_price = parse_amount("data.items[0].price", first.price.as_ref())?
        .ok_or_else(|| MarketError::Decode("missing field `data.items[0].price`".to_string()))?;

    let goods_key = goods_id.to_string();
    let goods_info = data.goods_infos.get(&goods_key);

    let (reference_usd, reference_cny) = match goods_info {
        Some(info) => (
            parse_amount("steam_price", info.steam_price.as_ref())?,
            parse_amount("steam_price_cny", info.steam_price_cny.as_ref())?,
        ),
        None => (None, None),
    };

    let buff_price_usd = convert_to_usd(listing_price, reference_usd, reference_cny)?;

    let image_url = data
        .items
        .iter()
        .find_map(RawListing::inspect_url)
        .or_else(|| goods_info?.goods_info.as_ref()?.image_url())
        .map(str::to_string);

    Ok(MarketQuote {
        status: QuoteStatus::Ok,
        buff_price_usd,
        reference_price_usd: reference_usd,
        image_url,
    })
}

/// Convert a native-currency listing price to USD using the FX ratio implied
/// by the same reference price quoted in both currencies.
///
/// Missing or zero reference prices give None; no ratio is assumed.
/// Amounts whose conversion overflows are a decode error.
pub fn convert_to_usd(
    listing: Price,
    reference_usd: Option<Price>,
    reference_native: Option<Price>,
) -> MarketResult<Option<Price>> {
    let (Some(usd), Some(native)) = (
        reference_usd.filter(Price::is_positive),
        reference_native.filter(Price::is_positive),
    ) else {
        return Ok(None);
    };

    usd.ratio_to(native)
        .and_then(|ratio| listing.checked_mul(ratio))
        .map(|price| Some(price.round_cents()))
        .ok_or_else(|| {
            MarketError::Decode(format!(
                "price out of range converting {listing} at {usd} USD / {native} native"
            ))
        })
}

fn parse_count(value: &Value) -> MarketResult<u64> {
    let count = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    count.ok_or_else(|| MarketError::Decode(format!("`data.total_count` is not a count: {value}")))
}

/// Parse a price that may be a JSON string or number. Null and empty
/// strings mean absent.
fn parse_amount(field: &str, value: Option<&Value>) -> MarketResult<Option<Price>> {
    let text = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(MarketError::Decode(format!(
                "`{field}` is not a price: {other}"
            )))
        }
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(|d| Some(Price::new(d)))
        .map_err(|e| MarketError::Decode(format!("`{field}` is not numeric ({text}): {e}")))
}
