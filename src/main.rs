//! Hotfeed publisher binary entrypoint.
//! One run-to-completion pass: fetch every configured source, annotate
//! each item, splice the result into the static page, exit. Scheduling is
//! the caller's job (cron or similar); a non-zero exit means the run
//! produced nothing usable.

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use hotfeed_publisher::annotate::Annotator;
use hotfeed_publisher::config;
use hotfeed_publisher::fetch::Fetcher;
use hotfeed_publisher::ingest::{self, providers};
use hotfeed_publisher::publish;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).compact().init();

    info!("hotfeed publisher starting");

    let registry = match config::load_registry() {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "failed to load source registry");
            return ExitCode::FAILURE;
        }
    };
    let settings = config::AnnotatorSettings::from_env();
    let pacing = config::Pacing::from_env();

    let fetcher = Fetcher::new();
    let annotator = Annotator::new(&settings, pacing.throttle_backoff);
    let providers = providers::build_providers(&registry);

    let items = ingest::run_once(&fetcher, &annotator, &providers, &pacing).await;
    if items.is_empty() {
        error!("every source came back empty; leaving the page untouched");
        return ExitCode::FAILURE;
    }

    let page = config::page_path();
    match publish::publish_to_file(&page, &items) {
        Ok(()) => {
            info!(count = items.len(), page = %page.display(), "page updated");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, page = %page.display(), "publish failed; original page preserved");
            ExitCode::FAILURE
        }
    }
}
