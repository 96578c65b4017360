//! Output directory layout.
//!
//! ```text
//! <output_root>/<code>-<name>/<category>/<file name>.pdf
//! ```
//!
//! Names coming from the portal are untrusted; every component goes through
//! [`sanitize_component`] before it touches the filesystem.

use std::path::{Path, PathBuf};

use super::ticker::TickerInfo;

const REPLACEMENT: char = '_';

/// Makes `raw` safe to use as a single path component.
///
/// Path separators, control characters and characters Windows rejects are
/// replaced, surrounding whitespace and trailing dots are trimmed, and the
/// result is never empty, `.` or `..`.
pub fn sanitize_component(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => REPLACEMENT,
            c if c.is_control() => REPLACEMENT,
            c => c,
        })
        .collect();

    let trimmed = replaced.trim().trim_end_matches('.').trim_end();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        return REPLACEMENT.to_string();
    }
    trimmed.to_string()
}

/// Folder of one company: `<code>-<name>`.
pub fn company_dir(root: &Path, ticker: &TickerInfo) -> PathBuf {
    root.join(format!(
        "{}-{}",
        sanitize_component(&ticker.code),
        sanitize_component(&ticker.display_name)
    ))
}

/// Folder of one report category inside a company folder.
pub fn category_dir(company_dir: &Path, category: &str) -> PathBuf {
    company_dir.join(sanitize_component(category))
}
