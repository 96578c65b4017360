//! Title search execution and report link extraction.
//!
//! The search endpoint answers a form POST with an HTML results table. Every
//! anchor target in it is a candidate; only listed-company PDFs are kept.
//!
//! # Examples
//!
//! ```ignore
//! use hkexkit::{CategoryTable, DateWindow, Hkex, MatchPolicy, SearchOperations, TickerOperations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hkex = Hkex::new("reports-bot/1.0 (ops@example.com)")?;
//!     let ticker = hkex.resolve_ticker(700, MatchPolicy::ExactCode).await?;
//!     let window = DateWindow::default().resolve(chrono::Local::now().date_naive())?;
//!     let query = CategoryTable::default().build_query("Annual Report", &ticker, &window)?;
//!
//!     for link in hkex.search_reports(&query).await? {
//!         println!("{}", link);
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;

use super::Hkex;
use super::error::{HkexError, Result};
use super::parsing::html::extract_hrefs;
use super::query::ReportQuery;
use super::traits::SearchOperations;

/// Path to one downloadable listed-company document, relative to the portal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportLink(String);

impl ReportLink {
    /// Prefix of every listed-company document path.
    pub const PREFIX: &'static str = "/listedco/";
    /// Only PDF documents are downloaded.
    pub const EXTENSION: &'static str = ".pdf";

    /// Accepts `path` only if it starts with [`Self::PREFIX`] and ends with
    /// [`Self::EXTENSION`]. Nothing else about the path is checked.
    pub fn parse(path: &str) -> Option<Self> {
        let valid = path.starts_with(Self::PREFIX) && path.ends_with(Self::EXTENSION);
        valid.then(|| Self(path.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path segment, which becomes the local file name.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ReportLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keeps the valid report links, without duplicates, in descending order.
///
/// Portal file names embed the release date, so descending lexicographic
/// order approximates newest first. It is not a date sort.
pub fn filter_and_sort<I, S>(links: I) -> Vec<ReportLink>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: BTreeSet<ReportLink> = links
        .into_iter()
        .filter_map(|l| ReportLink::parse(l.as_ref()))
        .collect();
    unique.into_iter().rev().collect()
}

/// Extracts report links from a search results page.
pub fn parse_search_results(html: &str) -> Vec<ReportLink> {
    filter_and_sort(extract_hrefs(html))
}

#[async_trait]
impl SearchOperations for Hkex {
    /// Posts the query to the title search and returns the report links.
    ///
    /// No matches is an empty list, not an error. Any body the portal
    /// answers with is parsed leniently, so only transport problems fail.
    ///
    /// # Errors
    ///
    /// Network errors and non-200 responses come back as
    /// `HkexError::SearchFailure` naming the category.
    async fn search_reports(&self, query: &ReportQuery) -> Result<Vec<ReportLink>> {
        let search_failure = |e: HkexError| HkexError::SearchFailure {
            category: query.category().to_string(),
            reason: e.to_string(),
        };

        let body = self
            .transport
            .post_form(&self.urls.search_url(), query.form_params())
            .await
            .map_err(search_failure)?;
        let links = parse_search_results(&body);

        tracing::info!(
            category = query.category(),
            stock_id = query.get("stockId").unwrap_or_default(),
            found = links.len(),
            "search finished"
        );
        Ok(links)
    }
}
