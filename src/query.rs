//! Title search queries and the report category table.
//!
//! Each report category is a fixed set of HKEXnews search codes. A query is
//! that set plus the run's date window and the target company's `stockId`,
//! laid out in the field order the search form posts.

use serde::{Deserialize, Serialize};

use super::error::{HkexError, Result};
use super::options::ResolvedWindow;
use super::ticker::TickerInfo;

/// Search codes of one report category.
///
/// Only `name` and `t2code` differ between the stock categories; everything
/// else defaults to the listed-company headline search on the main board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCategory {
    /// Display name, also used as the output folder name
    pub name: String,
    #[serde(default = "defaults::lang")]
    pub lang: String,
    #[serde(default)]
    pub category: i32,
    #[serde(default = "defaults::market")]
    pub market: String,
    #[serde(default = "defaults::search_type")]
    pub search_type: i32,
    #[serde(default = "defaults::document_type")]
    pub document_type: i32,
    /// Headline category (40000: financial statements / ESG information)
    #[serde(default = "defaults::t1code")]
    pub t1code: i32,
    #[serde(default = "defaults::t2g_code")]
    pub t2g_code: i32,
    /// Headline subcategory selecting the report type
    pub t2code: i32,
    #[serde(default)]
    pub mb_daterange: i32,
    /// Free-text title filter
    #[serde(default)]
    pub title: String,
}

mod defaults {
    pub(super) fn lang() -> String {
        "EN".to_string()
    }
    pub(super) fn market() -> String {
        "SEHK".to_string()
    }
    pub(super) fn search_type() -> i32 {
        1
    }
    pub(super) fn document_type() -> i32 {
        -1
    }
    pub(super) fn t1code() -> i32 {
        40000
    }
    pub(super) fn t2g_code() -> i32 {
        -2
    }
}

impl ReportCategory {
    /// A category with the standard codes and the given subcategory.
    pub fn new(name: impl Into<String>, t2code: i32) -> Self {
        Self {
            name: name.into(),
            lang: defaults::lang(),
            category: 0,
            market: defaults::market(),
            search_type: defaults::search_type(),
            document_type: defaults::document_type(),
            t1code: defaults::t1code(),
            t2g_code: defaults::t2g_code(),
            t2code,
            mb_daterange: 0,
            title: String::new(),
        }
    }

    pub fn annual_report() -> Self {
        Self::new("Annual Report", 40100)
    }

    pub fn esg() -> Self {
        Self::new("ESG", 40400)
    }

    /// Builds the search query for one company within `window`.
    pub fn build_query(&self, ticker: &TickerInfo, window: &ResolvedWindow) -> ReportQuery {
        let params = vec![
            ("lang", self.lang.clone()),
            ("category", self.category.to_string()),
            ("market", self.market.clone()),
            ("searchType", self.search_type.to_string()),
            ("documentType", self.document_type.to_string()),
            ("t1code", self.t1code.to_string()),
            ("t2Gcode", self.t2g_code.to_string()),
            ("t2code", self.t2code.to_string()),
            ("from", window.from_param()),
            ("to", window.to_param()),
            ("MB-Daterange", self.mb_daterange.to_string()),
            ("title", self.title.clone()),
            ("stockId", ticker.internal_id.to_string()),
        ];

        ReportQuery {
            category: self.name.clone(),
            params: params
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

/// The set of categories a run downloads, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTable(Vec<ReportCategory>);

impl Default for CategoryTable {
    fn default() -> Self {
        Self(vec![ReportCategory::annual_report(), ReportCategory::esg()])
    }
}

impl CategoryTable {
    pub fn new(categories: Vec<ReportCategory>) -> Self {
        Self(categories)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReportCategory> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ReportCategory> {
        self.0.iter().find(|c| c.name == name)
    }

    /// Builds the query for the category called `name`.
    ///
    /// # Errors
    ///
    /// Returns `HkexError::ConfigError` if no category has that name.
    pub fn build_query(
        &self,
        name: &str,
        ticker: &TickerInfo,
        window: &ResolvedWindow,
    ) -> Result<ReportQuery> {
        self.get(name)
            .map(|category| category.build_query(ticker, window))
            .ok_or_else(|| HkexError::ConfigError(format!("Unknown report category: {}", name)))
    }
}

/// A fully populated title search, ready to be form-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    category: String,
    params: Vec<(String, String)>,
}

impl ReportQuery {
    /// Name of the category this query searches for.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Form fields in submission order.
    pub fn form_params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
    }
}
