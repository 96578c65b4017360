//! # hkexkit - batch retrieval of HKEXnews disclosure reports
//!
//! hkexkit downloads the annual reports and ESG reports that listed companies
//! file with the Hong Kong Stock Exchange, and files them on disk by company
//! and report type:
//!
//! ```text
//! out/<code>-<name>/<category>/<file name>.pdf
//! ```
//!
//! ## Pipeline
//!
//! - **Ticker resolution** - stock code to the portal's internal `stockId`
//!   ([`TickerOperations`])
//! - **Query building** - category search codes plus date window and
//!   `stockId` ([`CategoryTable`], [`ReportQuery`])
//! - **Search** - title search POST and report link extraction
//!   ([`SearchOperations`])
//! - **Download** - skip-if-present, atomic write ([`DownloadOperations`])
//! - **Orchestration** - tickers × categories with a configurable
//!   [`ErrorPolicy`] ([`run()`])
//!
//! Everything runs sequentially; a file already on disk is never fetched
//! again, so reruns are cheap.
//!
//! ## Basic Usage
//!
//! ```ignore
//! use hkexkit::{Hkex, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hkex = Hkex::new("reports-bot/1.0 (ops@example.com)")?;
//!     let config = RunConfig {
//!         tickers: vec![1, 700],
//!         ..RunConfig::default()
//!     };
//!
//!     let summary = hkexkit::run(&hkex, &config).await?;
//!     println!("{} downloaded, {} failed", summary.downloaded, summary.failed());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod download;
mod error;
mod layout;
mod options;
pub mod parsing;
mod query;
mod run;
mod search;
mod settings;
mod ticker;
mod traits;

pub use config::{HkexConfig, HkexUrls};
pub use client::{Hkex, HttpTransport};
pub use download::{FetchOutcome, destination, write_atomic};
pub use error::{HkexError, Result};
pub use layout::{category_dir, company_dir, sanitize_component};
pub use options::{DateWindow, ErrorPolicy, MatchPolicy, ResolvedWindow};
pub use query::{CategoryTable, ReportCategory, ReportQuery};
pub use run::{FailureRecord, RunSummary, run, run_at};
pub use search::{ReportLink, filter_and_sort, parse_search_results};
pub use settings::{ClientSettings, DEFAULT_TICKERS, RunConfig, Settings};
pub use ticker::{StockLookupResponse, TickerInfo, lookup_params};

pub use traits::{DownloadOperations, SearchOperations, TickerOperations, Transport};

/// Current crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
