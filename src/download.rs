//! Report download with skip-if-present semantics.
//!
//! A file at the destination path is the only record that a report was
//! already fetched. Downloads are written to a `.part` sibling and renamed
//! into place, so a crashed run never leaves a truncated file under the final
//! name.
//!
//! Two links with the same final segment map to the same destination; the
//! first one fetched wins and the second is skipped.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::Hkex;
use super::error::{HkexError, Result};
use super::layout::sanitize_component;
use super::search::ReportLink;
use super::traits::DownloadOperations;

const PARTIAL_SUFFIX: &str = ".part";

/// What happened to one report link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The report was fetched and stored at the path.
    Downloaded { path: PathBuf, bytes: usize },
    /// A file already existed at the path; nothing was fetched.
    Skipped { path: PathBuf },
}

impl FetchOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FetchOutcome::Downloaded { path, .. } | FetchOutcome::Skipped { path } => path,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FetchOutcome::Skipped { .. })
    }
}

/// Local path a link is stored under inside `dir`.
pub fn destination(link: &ReportLink, dir: &Path) -> PathBuf {
    dir.join(sanitize_component(link.file_name()))
}

/// Writes `bytes` to `path` through a temporary sibling and a rename.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| HkexError::ConfigError(format!("No file name in {}", path.display())))?;
    let mut partial_name = file_name.to_os_string();
    partial_name.push(PARTIAL_SUFFIX);
    let partial = path.with_file_name(partial_name);

    let written = async {
        tokio::fs::write(&partial, bytes).await?;
        tokio::fs::rename(&partial, path).await
    }
    .await;

    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %partial.display(), error = %cleanup, "could not remove partial file");
            }
        }
        return Err(e.into());
    }
    Ok(())
}

#[async_trait]
impl DownloadOperations for Hkex {
    /// Stores the report behind `link` in `dir` unless it is already there.
    ///
    /// The local name is the link's final path segment. An existing file at
    /// that path counts as success and costs no network request; its content
    /// is not checked. New content goes to a `.part` sibling first and is
    /// renamed into place once fully written.
    ///
    /// # Arguments
    ///
    /// * `link` - Portal-relative document path from a search result
    /// * `dir` - Existing category directory to store the file in
    ///
    /// # Returns
    ///
    /// * [`FetchOutcome::Downloaded`] with the path and byte count of a new file
    /// * [`FetchOutcome::Skipped`] when the file was already present
    ///
    /// # Errors
    ///
    /// Every failure is reported as `HkexError::DownloadFailure` naming the link:
    /// * the existence check on the destination fails
    /// * the request fails or the portal answers with a non-200 status
    /// * the file cannot be written or renamed; no partial file is left behind
    ///
    /// # Example
    ///
    /// ```ignore
    /// # use hkexkit::{DownloadOperations, Hkex, ReportLink};
    /// # use std::path::Path;
    /// let hkex = Hkex::new("reports-bot/1.0 (ops@example.com)")?;
    /// let link = ReportLink::parse("/listedco/listconews/sehk/2024/0425/2024042500123.pdf").unwrap();
    /// let outcome = hkex.download_report(&link, Path::new("out/00001-CKH HOLDINGS/Annual Report")).await?;
    /// println!("{}", outcome.path().display());
    /// ```
    async fn download_report(&self, link: &ReportLink, dir: &Path) -> Result<FetchOutcome> {
        let download_failure = |e: HkexError| HkexError::DownloadFailure {
            link: link.to_string(),
            reason: e.to_string(),
        };

        let path = destination(link, dir);
        if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| download_failure(e.into()))?
        {
            tracing::info!(path = %path.display(), "report already exists, skipping");
            return Ok(FetchOutcome::Skipped { path });
        }

        let url = self.urls.document_url(link.as_str());
        tracing::info!(%url, path = %path.display(), "downloading report");

        let bytes = self
            .transport
            .get_bytes(&url)
            .await
            .map_err(download_failure)?;
        write_atomic(&path, &bytes)
            .await
            .map_err(download_failure)?;

        Ok(FetchOutcome::Downloaded {
            path,
            bytes: bytes.len(),
        })
    }
}
