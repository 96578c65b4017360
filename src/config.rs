use std::time::Duration;

/// Configuration for the HKEXnews client
#[derive(Debug, Clone)]
pub struct HkexConfig {
    /// User agent string for HTTP requests
    pub user_agent: String,
    /// Rate limit in requests per second
    pub rate_limit: u32,
    /// Total HTTP request timeout
    pub timeout: Duration,
    /// Timeout for establishing a connection
    pub connect_timeout: Duration,
    /// Endpoints of the filings portal
    pub base_urls: HkexUrls,
}

/// Endpoints of the HKEXnews portal
#[derive(Debug, Clone)]
pub struct HkexUrls {
    /// Origin that report links are relative to
    pub base: String,
    /// Path of the title search form (POST)
    pub search: String,
    /// Path of the stock code lookup endpoint (GET, JSONP)
    pub lookup: String,
}

impl Default for HkexConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("hkexkit/{}", env!("CARGO_PKG_VERSION")),
            rate_limit: 5,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            base_urls: HkexUrls::default(),
        }
    }
}

impl HkexConfig {
    /// Creates a new HkexConfig with custom settings
    ///
    /// # Basic usage
    ///
    /// ```rust
    /// use hkexkit::{Hkex, HkexConfig};
    /// use std::time::Duration;
    /// let config = HkexConfig::new("reports-bot/1.0", 2, Duration::from_secs(60), None);
    /// let hkex = Hkex::with_config(config)?;
    /// # Ok::<(), hkexkit::HkexError>(())
    /// ```
    pub fn new(
        user_agent: impl Into<String>,
        rate_limit: u32,
        timeout: Duration,
        base_urls: Option<HkexUrls>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            rate_limit,
            timeout,
            base_urls: base_urls.unwrap_or_default(),
            ..Self::default()
        }
    }
}

impl Default for HkexUrls {
    fn default() -> Self {
        Self {
            base: "https://www1.hkexnews.hk".to_string(),
            search: "/search/titlesearch.xhtml?lang=en".to_string(),
            lookup: "/search/partial.do".to_string(),
        }
    }
}

impl HkexUrls {
    /// Points every endpoint at another origin, keeping the portal paths.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            ..Self::default()
        }
    }

    pub fn search_url(&self) -> String {
        format!("{}{}", self.base, self.search)
    }

    pub fn lookup_url(&self) -> String {
        format!("{}{}", self.base, self.lookup)
    }

    /// Absolute URL of a portal-relative document path.
    pub fn document_url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}
