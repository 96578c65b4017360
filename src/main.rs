//! `hkex-reports`: downloads the configured HKEXnews reports and exits.
//!
//! Takes no arguments. Settings come from `HKEX_REPORTS_CONFIG` (a TOML file)
//! and `HKEX_*` environment overrides; log verbosity from `RUST_LOG`.

use hkexkit::{Hkex, Settings};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "hkexkit=info,hkex_reports=info";

#[tokio::main]
async fn main() -> hkexkit::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env()?;
    settings.run.validate()?;

    let hkex = Hkex::with_config(settings.client.to_config())?;
    let summary = hkexkit::run(&hkex, &settings.run).await?;
    summary.log();

    Ok(())
}
