use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use super::error::{HkexError, Result};

/// Date format the search form expects for `from` / `to`.
pub const FORM_DATE_FORMAT: &str = "%Y%m%d";

/// Release date window a run searches in.
///
/// One window applies to every query of a run; it is resolved against the run
/// date exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateWindow {
    /// The last `days` days, ending today.
    Trailing { days: i64 },
    /// A fixed historical start, ending today.
    Since { from: NaiveDate },
    /// A fully fixed range.
    Fixed { from: NaiveDate, to: NaiveDate },
}

impl Default for DateWindow {
    fn default() -> Self {
        DateWindow::Trailing { days: 365 }
    }
}

impl DateWindow {
    /// Pins the window to concrete dates.
    ///
    /// # Errors
    ///
    /// Returns `HkexError::ConfigError` for a negative or out-of-range trailing
    /// length, or a start date after the end date.
    pub fn resolve(&self, today: NaiveDate) -> Result<ResolvedWindow> {
        let (from, to) = match *self {
            DateWindow::Trailing { days } => {
                let from = (days >= 0)
                    .then(|| TimeDelta::try_days(days))
                    .flatten()
                    .and_then(|span| today.checked_sub_signed(span))
                    .ok_or_else(|| {
                        HkexError::ConfigError(format!(
                            "Trailing window must be a non-negative, representable span, got {} days",
                            days
                        ))
                    })?;
                (from, today)
            }
            DateWindow::Since { from } => (from, today),
            DateWindow::Fixed { from, to } => (from, to),
        };

        if from > to {
            return Err(HkexError::ConfigError(format!(
                "Date window starts after it ends: {} > {}",
                from, to
            )));
        }

        Ok(ResolvedWindow { from, to })
    }
}

/// A date window pinned to concrete, ordered dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ResolvedWindow {
    pub fn from_param(&self) -> String {
        self.from.format(FORM_DATE_FORMAT).to_string()
    }

    pub fn to_param(&self) -> String {
        self.to.format(FORM_DATE_FORMAT).to_string()
    }
}

/// What the batch does when one unit of work fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Record the failure and move on to the next link, category or ticker.
    #[default]
    Continue,
    /// Stop the run and return the first error.
    Abort,
}

/// How a stock code lookup with several candidates is settled.
///
/// The portal matches on prefixes, so looking up `1` can also return `00011`
/// or `00100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Accept only a candidate whose code is numerically equal to the request.
    #[default]
    ExactCode,
    /// Accept whatever the portal lists first.
    FirstResult,
}
