//! The `collect` command: one batch over a code list file.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;

use stoktakip_core::AppConfig;
use stoktakip_scraper::{spawn_refresher, CredentialStore, Engine, EngineConfig, RetryPolicy};

use crate::cookie_file::FileCookieProvider;

#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Newline-separated product code list (`#` starts a comment line).
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// Where to write the collected records as JSON.
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,

    /// Cookie handoff file published by the login automation.
    /// Defaults to `STOKTAKIP_COOKIE_PATH`.
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,
}

pub async fn run(config: &AppConfig, args: CollectArgs) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading code list from {}", args.input.display()))?;
    let codes = parse_codes(&raw);
    if codes.is_empty() {
        anyhow::bail!("no product codes found in {}", args.input.display());
    }

    let store = Arc::new(CredentialStore::new(Duration::from_secs(
        config.cookie_ttl_secs,
    )));
    let cookie_path = args
        .cookies
        .clone()
        .unwrap_or_else(|| config.cookie_path.clone());
    let provider = Arc::new(FileCookieProvider::new(cookie_path));
    let refresher = spawn_refresher(
        Arc::clone(&store),
        provider,
        Duration::from_secs(config.refresh_interval_secs),
    );

    let engine = Engine::new(engine_config(config), store)?;
    let result = engine.collect(&codes).await;
    // The heartbeat has no more readers once the batch is decided.
    refresher.abort();
    let records = result?;

    let failed = records.iter().filter(|r| !r.errors.is_empty()).count();
    let file = std::fs::File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &records)
        .with_context(|| format!("writing records to {}", args.output.display()))?;

    tracing::info!(
        total = records.len(),
        failed,
        output = %args.output.display(),
        "records written"
    );
    Ok(())
}

fn engine_config(config: &AppConfig) -> EngineConfig {
    EngineConfig {
        base_product_url: config.base_product_url.clone(),
        search_url: config.search_url.clone(),
        quantity_hint: config.quantity_hint,
        concurrency: config.concurrency,
        request_timeout_secs: config.request_timeout_secs,
        retry: RetryPolicy {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
            backoff_multiplier: config.retry_backoff_multiplier,
            jitter: config.retry_jitter,
        },
        snapshot_wait: Duration::from_secs(config.snapshot_wait_secs),
        ordered_output: config.ordered_output,
    }
}

/// Splits a code list file into codes, skipping blanks and comment lines.
fn parse_codes(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_codes_skips_blanks_and_comments() {
        let raw = "959.00.125\n\n# yeni liste\n  342.27.704  \n";
        assert_eq!(
            parse_codes(raw),
            vec!["959.00.125".to_owned(), "342.27.704".to_owned()]
        );
    }

    #[test]
    fn parse_codes_of_empty_input_is_empty() {
        assert!(parse_codes("").is_empty());
        assert!(parse_codes("# only a comment\n").is_empty());
    }
}
