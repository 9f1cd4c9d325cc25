//! Stock aggregation for composite (bundle) products.
//!
//! A bundle's availability is the availability of its scarcest part: every
//! sub-component contributes its in-stock quantity, anything not canonically
//! in stock contributes zero, and the bundle reports the minimum. A broken
//! sub-component fetch also contributes zero — one bad part must degrade the
//! figure, not error out the whole bundle.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::client::FetchClient;
use crate::credentials::CredentialSet;
use crate::dom::{element_text, parse_quantity};
use crate::types::IN_STOCK_LABEL;
use crate::urls::UrlBuilder;

static SUB_ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".BomArticlesTable .productDataTableQty").expect("static selector")
});

static SUB_SKU_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.product-sku-title").expect("static selector"));

/// The sub-component page renders the in-stock flag with an inline
/// green-color style; that exact attribute is the availability marker.
static SUB_FLAG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"span.availability-flag[style="color:#339C76"]"#).expect("static selector")
});

static SUB_QTY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".qty-available").expect("static selector"));

/// Aggregated bundle stock plus bookkeeping for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleStock {
    /// Minimum over all sub-component contributions; unset when the bundle
    /// page listed no sub-components at all.
    pub amount: Option<u32>,
    pub failed_fetches: usize,
    pub components: usize,
}

/// Sub-component codes as rendered in the bundle's bill-of-materials table.
#[must_use]
pub fn sub_component_codes(document: &Html) -> Vec<String> {
    document
        .select(&SUB_ROW_SELECTOR)
        .filter_map(|row| row.select(&SUB_SKU_SELECTOR).next())
        .map(element_text)
        .filter(|code| !code.is_empty())
        .collect()
}

/// Quantity one sub-component page contributes to the bundle minimum:
/// its in-stock quantity when the canonical flag is present, zero otherwise
/// (including when the quantity cell fails to parse).
#[must_use]
pub fn sub_component_stock(document: &Html) -> u32 {
    let canonical = document
        .select(&SUB_FLAG_SELECTOR)
        .next()
        .is_some_and(|flag| element_text(flag).to_lowercase().contains(IN_STOCK_LABEL));
    if !canonical {
        return 0;
    }
    document
        .select(&SUB_QTY_SELECTOR)
        .next()
        .and_then(|cell| parse_quantity(&element_text(cell)))
        .unwrap_or(0)
}

/// Fetches every sub-component's availability page with the parent task's
/// credential snapshot and reduces to the bundle figure.
pub async fn aggregate(
    client: &FetchClient,
    urls: &UrlBuilder,
    credentials: &CredentialSet,
    codes: &[String],
) -> BundleStock {
    let mut contributions: Vec<u32> = Vec::with_capacity(codes.len());
    let mut failed_fetches = 0usize;

    for code in codes {
        let contribution = match fetch_sub_component(client, urls, credentials, code).await {
            Ok(quantity) => quantity,
            Err(error) => {
                tracing::warn!(
                    code,
                    error = %error,
                    "sub-component fetch failed — counting zero stock for it"
                );
                failed_fetches += 1;
                0
            }
        };
        contributions.push(contribution);
    }

    BundleStock {
        amount: contributions.iter().copied().min(),
        failed_fetches,
        components: codes.len(),
    }
}

async fn fetch_sub_component(
    client: &FetchClient,
    urls: &UrlBuilder,
    credentials: &CredentialSet,
    code: &str,
) -> Result<u32, crate::error::ScrapeError> {
    let url = urls.sub_component_url(code)?;
    let outcome = client.fetch(&url, credentials).await?;
    let document = Html::parse_document(&outcome.body);
    Ok(sub_component_stock(&document))
}
