//! Trait definitions organizing portal operations by pipeline stage.
//!
//! The `Hkex` client implements one trait per stage: resolving a stock code,
//! searching for report links, and downloading a report. All of them sit on
//! top of [`Transport`], the only place that touches the network, so tests
//! can swap in a canned transport and drive the whole pipeline offline.

use std::path::Path;

use async_trait::async_trait;

use super::download::FetchOutcome;
use super::error::Result;
use super::options::MatchPolicy;
use super::query::ReportQuery;
use super::search::ReportLink;
use super::ticker::TickerInfo;

/// Raw request/response exchange with the portal.
///
/// Implementations return the body of a successful (200) response and map
/// everything else to an error. They never retry.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Issues a GET and returns the body as text.
    async fn get_text(&self, url: &str) -> Result<String>;
    /// Submits `form` url-encoded in a POST body and returns the body as text.
    async fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<String>;
    /// Issues a GET and returns the raw body.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// Maps exchange stock codes to the portal's own identifiers.
#[async_trait]
pub trait TickerOperations {
    /// Looks up a numeric stock code and selects one candidate per `policy`.
    async fn resolve_ticker(&self, code: u32, policy: MatchPolicy) -> Result<TickerInfo>;
}

/// Runs title searches and extracts downloadable report links.
#[async_trait]
pub trait SearchOperations {
    /// Submits the query and returns matching links, newest-looking first.
    async fn search_reports(&self, query: &ReportQuery) -> Result<Vec<ReportLink>>;
}

/// Copies report documents to local disk.
#[async_trait]
pub trait DownloadOperations {
    /// Ensures a local copy of `link` exists inside `dir`.
    async fn download_report(&self, link: &ReportLink, dir: &Path) -> Result<FetchOutcome>;
}
