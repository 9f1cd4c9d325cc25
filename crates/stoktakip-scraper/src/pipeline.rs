//! The collection pipeline: one bounded-concurrency run over a code list.
//!
//! Every input code yields exactly one [`ProductRecord`] — never fewer,
//! never duplicated. Failures are captured into the record's `errors` map
//! keyed by stage and never escalate to siblings; the only batch-fatal
//! condition is having no usable session before any task starts.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use scraper::Html;

use crate::client::FetchClient;
use crate::composite;
use crate::credentials::CredentialStore;
use crate::error::ScrapeError;
use crate::price::extract_prices;
use crate::resolver::{ProductResolver, ProductShape};
use crate::retry::RetryPolicy;
use crate::stock::extract_stock;
use crate::types::{ProductRecord, Stage, StockAmount, BUNDLE_STATUS};
use crate::urls::UrlBuilder;

/// Everything an entry point chooses about a collection run. One pipeline,
/// one configuration object — concurrency degree, retry posture, and page
/// quantity hint are data, not separate code paths.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub base_product_url: String,
    pub search_url: String,
    pub quantity_hint: u32,
    pub concurrency: usize,
    pub request_timeout_secs: u64,
    pub retry: RetryPolicy,
    /// Upper bound on waiting for a fresh credential snapshot, both at batch
    /// start and per task.
    pub snapshot_wait: Duration,
    /// When true, records come back in input order; otherwise in completion
    /// order.
    pub ordered_output: bool,
}

/// The availability collection engine.
pub struct Engine {
    client: FetchClient,
    urls: UrlBuilder,
    store: Arc<CredentialStore>,
    concurrency: usize,
    snapshot_wait: Duration,
    ordered_output: bool,
}

impl Engine {
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: EngineConfig, store: Arc<CredentialStore>) -> Result<Self, ScrapeError> {
        let client = FetchClient::new(config.request_timeout_secs, config.retry.clone())?;
        let urls = UrlBuilder::new(
            config.base_product_url,
            config.search_url,
            config.quantity_hint,
        );
        Ok(Self {
            client,
            urls,
            store,
            concurrency: config.concurrency.max(1),
            snapshot_wait: config.snapshot_wait,
            ordered_output: config.ordered_output,
        })
    }

    /// Runs one collection batch: one record per input code, under the
    /// configured concurrency limit. Sibling tasks never cancel each other;
    /// a task that is retrying runs its retries to completion.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::CredentialsUnavailable`] /
    /// [`ScrapeError::CredentialsStale`] when no usable session appears
    /// within the wait bound before any task starts — without a session no
    /// code can be collected, so the batch does not begin.
    pub async fn collect(&self, codes: &[String]) -> Result<Vec<ProductRecord>, ScrapeError> {
        self.store.wait_fresh(self.snapshot_wait).await?;

        tracing::info!(
            codes = codes.len(),
            concurrency = self.concurrency,
            "starting collection batch"
        );

        let tasks = stream::iter(codes.iter().map(String::as_str)).map(|code| self.collect_one(code));
        let records: Vec<ProductRecord> = if self.ordered_output {
            tasks.buffered(self.concurrency).collect().await
        } else {
            tasks.buffer_unordered(self.concurrency).collect().await
        };

        let failed = records.iter().filter(|r| !r.errors.is_empty()).count();
        if failed > 0 {
            tracing::warn!(failed, total = records.len(), "some codes failed during collection");
        } else {
            tracing::info!(total = records.len(), "collection batch complete");
        }

        Ok(records)
    }

    /// One code through the full pipeline. Infallible by design: every
    /// failure mode lands in the record's `errors` map.
    async fn collect_one(&self, code: &str) -> ProductRecord {
        let mut record = ProductRecord::empty(code);

        // Each task pins one snapshot for its whole pipeline run, refusing
        // to start on a stale session.
        let credentials = match self.store.wait_fresh(self.snapshot_wait).await {
            Ok(set) => set,
            Err(error) => {
                record.errors.insert(Stage::Credentials, error.to_string());
                return record;
            }
        };

        let resolver = ProductResolver::new(&self.client, &self.urls);
        match resolver.exists(code, &credentials).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(code, "product not listed at source");
                return ProductRecord::not_listed(code);
            }
            Err(error) => {
                record.errors.insert(Stage::Existence, error.to_string());
                return record;
            }
        }

        let query = match self.urls.product_query(code) {
            Ok(query) => query,
            Err(error) => {
                record.errors.insert(Stage::Fetch, error.to_string());
                return record;
            }
        };
        let outcome = match self.client.fetch(&query.url, &credentials).await {
            Ok(outcome) => outcome,
            Err(error) => {
                record.errors.insert(Stage::Fetch, error.to_string());
                return record;
            }
        };

        // Parse synchronously and drop the DOM before any further await.
        let (shape, prices, singular_stock, sub_codes) = {
            let document = Html::parse_document(&outcome.body);
            (
                ProductResolver::classify(&document),
                extract_prices(&document),
                extract_stock(&document),
                composite::sub_component_codes(&document),
            )
        };

        record.sale_price = prices.sale_price;
        record.net_price = prices.net_price;
        record.recommended_retail_price = prices.recommended_retail_price;
        if record.sale_price.is_none()
            && record.net_price.is_none()
            && record.recommended_retail_price.is_none()
        {
            let error = ScrapeError::Parse {
                context: format!("product page for {code}"),
                reason: "no price elements present".to_owned(),
            };
            record.errors.insert(Stage::Price, error.to_string());
        }

        match shape {
            ProductShape::Singular => {
                record.stock_amount = singular_stock.amount.map(StockAmount::Units);
                record.stock_status = Some(singular_stock.status);
            }
            ProductShape::Composite => {
                let bundle =
                    composite::aggregate(&self.client, &self.urls, &credentials, &sub_codes).await;
                record.stock_amount = bundle.amount.map(StockAmount::Units);
                record.stock_status = Some(BUNDLE_STATUS.to_owned());
                if bundle.failed_fetches > 0 {
                    record.errors.insert(
                        Stage::Bundle,
                        format!(
                            "{} of {} sub-component fetches failed — each counted as zero stock",
                            bundle.failed_fetches, bundle.components
                        ),
                    );
                }
            }
        }

        tracing::debug!(
            code,
            status = record.stock_status.as_deref().unwrap_or("-"),
            "code collected"
        );
        record
    }
}
