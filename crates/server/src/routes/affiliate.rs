//! Affiliate referral click recording.
//!
//! Fired once per first page visit carrying a referral parameter. The
//! resulting row is an immutable event; nothing in this service updates or
//! deletes it.

use axum::http::HeaderMap;
use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use shepherd_core::AffiliateCode;

use crate::db::affiliate::{AffiliateRepository, NewAffiliateClick};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Click recording request body.
#[derive(Debug, Deserialize)]
pub struct ClickRequest {
    #[serde(default)]
    pub affiliate_code: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Record one referral click.
#[instrument(skip(state, headers, request))]
pub async fn record_click(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ClickRequest>,
) -> Result<Json<Value>> {
    let code = request
        .affiliate_code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing affiliate_code".to_string()))?;

    let click = NewAffiliateClick {
        affiliate_code: AffiliateCode::new(code),
        source: request.source.unwrap_or_else(|| "site_visit".to_string()),
        ip_address: client_ip(&headers),
        user_agent: header_or_unknown(&headers, "user-agent"),
    };

    AffiliateRepository::new(state.pool())
        .record_click(&click)
        .await?;

    tracing::info!(code = %click.affiliate_code, source = %click.source, "affiliate click recorded");

    Ok(Json(json!({"success": true})))
}

/// Client IP as seen through proxies: first entry of `x-forwarded-for`,
/// falling back to `x-real-ip`, else "unknown".
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|h| h.to_str().ok())
        .and_then(|raw| raw.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| "unknown".to_string(), ToString::to_string)
}

fn header_or_unknown(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map_or_else(|| "unknown".to_string(), ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_takes_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "203.0.113.9".parse().unwrap());
        assert_eq!(client_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn test_client_ip_unknown_without_headers() {
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
