use std::path::PathBuf;

/// Runtime configuration for the collector, sourced from environment
/// variables (prefix `STOKTAKIP_`). Every field has a working default so a
/// bare environment runs against the live storefront.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// Price/availability endpoint queried per product code.
    pub base_product_url: String,
    /// Parametric search endpoint used for the existence check.
    pub search_url: String,
    /// Quantity forced into the product query so the page renders every
    /// package-tier row instead of just the first.
    pub quantity_hint: u32,
    pub concurrency: usize,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub retry_backoff_multiplier: f64,
    pub retry_jitter: bool,
    pub cookie_ttl_secs: u64,
    pub refresh_interval_secs: u64,
    /// Upper bound on how long a worker waits for a fresh credential
    /// snapshot before giving up on its code.
    pub snapshot_wait_secs: u64,
    /// Cookie handoff file written by the external login automation.
    pub cookie_path: PathBuf,
    /// When true, output records follow input order instead of completion
    /// order.
    pub ordered_output: bool,
}
