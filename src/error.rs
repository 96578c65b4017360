use thiserror::Error;

#[derive(Error, Debug)]
pub enum HkexError {
    #[error("Ticker lookup failed for {code}: {reason}")]
    LookupFailure { code: u32, reason: String },

    #[error("Report search failed for {category}: {reason}")]
    SearchFailure { category: String, reason: String },

    #[error("Download failed for {link}: {reason}")]
    DownloadFailure { link: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl HkexError {
    /// Short name of the pipeline stage the error belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            HkexError::LookupFailure { .. } => "lookup",
            HkexError::SearchFailure { .. } => "search",
            HkexError::DownloadFailure { .. } => "download",
            HkexError::ConfigError(_) | HkexError::TomlError(_) => "config",
            HkexError::RequestError(_)
            | HkexError::NotFound(_)
            | HkexError::InvalidResponse(_)
            | HkexError::JsonError(_) => "transport",
            HkexError::FileError(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, HkexError>;
