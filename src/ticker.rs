//! Stock code resolution.
//!
//! HKEXnews does not search by exchange code directly; every title search
//! needs the portal's internal `stockId`. This module asks the prefix lookup
//! endpoint (the one behind the search page's autocomplete box) for a code and
//! turns its JSONP answer into a [`TickerInfo`].
//!
//! The endpoint matches prefixes, so a lookup for `1` may list `00001`,
//! `00010`, `00011` and more. Which candidate wins is decided by
//! [`MatchPolicy`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Hkex;
use super::error::{HkexError, Result};
use super::options::MatchPolicy;
use super::parsing::callback::strip_callback;
use super::traits::TickerOperations;

/// One listed company as identified by the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerInfo {
    /// Portal-assigned identifier used by the title search
    #[serde(rename = "stockId")]
    pub internal_id: u64,
    /// Zero-padded exchange code, e.g. `00001`
    pub code: String,
    /// Short company name as listed by the portal
    #[serde(rename = "name")]
    pub display_name: String,
}

impl TickerInfo {
    /// Whether `code` denotes the same exchange code as this record.
    pub fn matches_code(&self, code: u32) -> bool {
        self.code.trim().parse::<u32>().is_ok_and(|c| c == code)
    }
}

/// Payload of the lookup endpoint once the JSONP wrapper is removed.
#[derive(Debug, Clone, Deserialize)]
pub struct StockLookupResponse {
    /// "1" when the portal truncated the candidate list
    #[serde(default)]
    pub more: Option<String>,
    #[serde(rename = "stockInfo", default)]
    pub stock_info: Vec<TickerInfo>,
}

impl StockLookupResponse {
    /// Decodes a raw `callback({...});` body.
    pub fn from_jsonp(body: &str) -> Result<Self> {
        let payload = strip_callback(body)?;
        Ok(serde_json::from_str(payload)?)
    }

    /// Picks the record for `code` out of the candidates.
    ///
    /// # Errors
    ///
    /// Returns `HkexError::LookupFailure` when there are no candidates, or when
    /// `MatchPolicy::ExactCode` finds none with the requested code.
    pub fn select(self, code: u32, policy: MatchPolicy) -> Result<TickerInfo> {
        if self.stock_info.is_empty() {
            return Err(HkexError::LookupFailure {
                code,
                reason: "portal returned no candidates".to_string(),
            });
        }

        let candidates = self.stock_info.len();
        let chosen = match policy {
            MatchPolicy::FirstResult => self.stock_info.into_iter().next(),
            MatchPolicy::ExactCode => self.stock_info.into_iter().find(|t| t.matches_code(code)),
        };

        chosen.ok_or_else(|| HkexError::LookupFailure {
            code,
            reason: format!("none of {} candidates has code {:05}", candidates, code),
        })
    }
}

/// Query parameters of a lookup request. `timestamp_ms` only defeats caches.
pub fn lookup_params(code: u32, timestamp_ms: i64) -> Vec<(String, String)> {
    vec![
        ("callback".to_string(), "callback".to_string()),
        ("lang".to_string(), "EN".to_string()),
        ("type".to_string(), "A".to_string()),
        ("name".to_string(), code.to_string()),
        ("market".to_string(), "SEHK".to_string()),
        ("_".to_string(), timestamp_ms.to_string()),
    ]
}

#[async_trait]
impl TickerOperations for Hkex {
    /// Resolves an exchange stock code to the portal's internal identity.
    ///
    /// Sends one GET to the prefix lookup endpoint with a millisecond
    /// timestamp as cache buster, strips the JSONP wrapper and picks one
    /// candidate according to `policy`.
    ///
    /// # Arguments
    ///
    /// * `code` - Numeric stock code, e.g. `1` for `00001`
    /// * `policy` - How to choose among prefix matches
    ///
    /// # Returns
    ///
    /// The chosen [`TickerInfo`], whose `internal_id` is the `stockId` every
    /// title search needs.
    ///
    /// # Errors
    ///
    /// Every failure is reported as `HkexError::LookupFailure` carrying `code`:
    /// * the request fails or the portal answers with a non-200 status
    /// * the body is not a JSONP-wrapped lookup document
    /// * the candidate list is empty, or has no exact match under
    ///   [`MatchPolicy::ExactCode`]
    ///
    /// # Example
    ///
    /// ```ignore
    /// # use hkexkit::{Hkex, MatchPolicy, TickerOperations};
    /// let hkex = Hkex::new("reports-bot/1.0 (ops@example.com)")?;
    /// let ticker = hkex.resolve_ticker(700, MatchPolicy::ExactCode).await?;
    /// assert_eq!(ticker.code, "00700");
    /// ```
    async fn resolve_ticker(&self, code: u32, policy: MatchPolicy) -> Result<TickerInfo> {
        let lookup_failure = |e: HkexError| match e {
            HkexError::LookupFailure { .. } => e,
            other => HkexError::LookupFailure {
                code,
                reason: other.to_string(),
            },
        };

        let params = lookup_params(code, chrono::Utc::now().timestamp_millis());
        let query_string = serde_urlencoded::to_string(&params)
            .map_err(|e| HkexError::InvalidResponse(e.to_string()))
            .map_err(lookup_failure)?;
        let url = format!("{}?{}", self.urls.lookup_url(), query_string);

        let body = self
            .transport
            .get_text(&url)
            .await
            .map_err(lookup_failure)?;
        let response = StockLookupResponse::from_jsonp(&body).map_err(lookup_failure)?;

        if response.more.as_deref() == Some("1") {
            tracing::debug!(code, "lookup candidate list was truncated by the portal");
        }

        let info = response.select(code, policy)?;
        tracing::info!(
            code,
            stock_id = info.internal_id,
            name = %info.display_name,
            "resolved ticker"
        );
        Ok(info)
    }
}
