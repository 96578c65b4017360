//! Batch orchestration: tickers × categories × report links.
//!
//! Work is strictly sequential. Each unit (a ticker lookup, a category
//! search, a single download) either succeeds or fails on its own; the
//! [`ErrorPolicy`] decides whether a failure ends the run or is recorded and
//! skipped.

use std::path::Path;

use chrono::NaiveDate;

use super::Hkex;
use super::download::FetchOutcome;
use super::error::{HkexError, Result};
use super::layout::{category_dir, company_dir};
use super::options::{ErrorPolicy, ResolvedWindow};
use super::query::ReportCategory;
use super::settings::RunConfig;
use super::ticker::TickerInfo;
use super::traits::{DownloadOperations, SearchOperations, TickerOperations};

/// One unit of work that did not complete.
#[derive(Debug)]
pub struct FailureRecord {
    /// Exchange code being processed
    pub ticker: u32,
    /// Category being processed, if the failure happened past the lookup
    pub category: Option<String>,
    /// Report link being fetched, if the failure happened during a download
    pub link: Option<String>,
    pub error: HkexError,
}

/// Counts and failures of a finished run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub tickers_resolved: usize,
    pub searches: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failures: Vec<FailureRecord>,
}

impl RunSummary {
    /// True when nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Emits the closing summary, one extra line per failure.
    pub fn log(&self) {
        tracing::info!(
            tickers = self.tickers_resolved,
            searches = self.searches,
            downloaded = self.downloaded,
            skipped = self.skipped,
            failed = self.failed(),
            "finished downloading"
        );
        for failure in &self.failures {
            tracing::warn!(
                ticker = failure.ticker,
                category = failure.category.as_deref().unwrap_or("-"),
                link = failure.link.as_deref().unwrap_or("-"),
                stage = failure.error.stage(),
                "failed: {}",
                failure.error
            );
        }
    }

    fn record(&mut self, policy: ErrorPolicy, failure: FailureRecord) -> Result<()> {
        tracing::warn!(
            ticker = failure.ticker,
            category = failure.category.as_deref().unwrap_or("-"),
            link = failure.link.as_deref().unwrap_or("-"),
            "{}",
            failure.error
        );
        match policy {
            ErrorPolicy::Abort => Err(failure.error),
            ErrorPolicy::Continue => {
                self.failures.push(failure);
                Ok(())
            }
        }
    }
}

/// Runs the configured batch with today's local date as the window anchor.
pub async fn run(hkex: &Hkex, config: &RunConfig) -> Result<RunSummary> {
    run_at(hkex, config, chrono::Local::now().date_naive()).await
}

/// Runs the configured batch as if today were `today`.
///
/// # Errors
///
/// Configuration problems and failing to create the output root always end
/// the run. Other failures end it only under [`ErrorPolicy::Abort`].
pub async fn run_at(hkex: &Hkex, config: &RunConfig, today: NaiveDate) -> Result<RunSummary> {
    config.validate()?;
    let window = config.window.resolve(today)?;
    tokio::fs::create_dir_all(&config.output_dir).await?;

    tracing::info!(
        tickers = config.tickers.len(),
        categories = config.categories.len(),
        from = %window.from_param(),
        to = %window.to_param(),
        output = %config.output_dir.display(),
        "starting report download"
    );

    let mut summary = RunSummary::default();
    for &code in &config.tickers {
        let ticker = match hkex.resolve_ticker(code, config.match_policy).await {
            Ok(ticker) => ticker,
            Err(error) => {
                summary.record(
                    config.error_policy,
                    FailureRecord {
                        ticker: code,
                        category: None,
                        link: None,
                        error,
                    },
                )?;
                continue;
            }
        };
        summary.tickers_resolved += 1;

        let company = company_dir(&config.output_dir, &ticker);
        if let Err(error) = tokio::fs::create_dir_all(&company).await {
            summary.record(
                config.error_policy,
                FailureRecord {
                    ticker: code,
                    category: None,
                    link: None,
                    error: error.into(),
                },
            )?;
            continue;
        }

        for category in config.categories.iter() {
            process_category(
                hkex,
                config.error_policy,
                code,
                &ticker,
                category,
                &window,
                &company,
                &mut summary,
            )
            .await?;
        }
    }

    Ok(summary)
}

#[allow(clippy::too_many_arguments)]
async fn process_category(
    hkex: &Hkex,
    policy: ErrorPolicy,
    code: u32,
    ticker: &TickerInfo,
    category: &ReportCategory,
    window: &ResolvedWindow,
    company: &Path,
    summary: &mut RunSummary,
) -> Result<()> {
    let failure = |link: Option<String>, error: HkexError| FailureRecord {
        ticker: code,
        category: Some(category.name.clone()),
        link,
        error,
    };

    tracing::info!(
        ticker = %ticker.code,
        name = %ticker.display_name,
        category = %category.name,
        "downloading reports"
    );

    let dir = category_dir(company, &category.name);
    if let Err(error) = tokio::fs::create_dir_all(&dir).await {
        return summary.record(policy, failure(None, error.into()));
    }

    let query = category.build_query(ticker, window);
    let links = match hkex.search_reports(&query).await {
        Ok(links) => links,
        Err(error) => return summary.record(policy, failure(None, error)),
    };
    summary.searches += 1;

    for link in &links {
        match hkex.download_report(link, &dir).await {
            Ok(FetchOutcome::Downloaded { .. }) => summary.downloaded += 1,
            Ok(FetchOutcome::Skipped { .. }) => summary.skipped += 1,
            Err(error) => summary.record(policy, failure(Some(link.to_string()), error))?,
        }
    }
    Ok(())
}
