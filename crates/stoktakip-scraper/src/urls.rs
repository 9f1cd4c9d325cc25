//! Deterministic query-URL construction for the storefront endpoints.

use reqwest::Url;

use crate::error::ScrapeError;

/// A product code paired with the exact URL its pipeline run will fetch.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub code: String,
    pub url: String,
}

/// Builds the three request URLs the engine needs: the per-code
/// price/availability page, the existence-check search, and the
/// sub-component page used during bundle aggregation.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base_product_url: String,
    search_url: String,
    quantity_hint: u32,
}

impl UrlBuilder {
    #[must_use]
    pub fn new(base_product_url: String, search_url: String, quantity_hint: u32) -> Self {
        Self {
            base_product_url,
            search_url,
            quantity_hint,
        }
    }

    /// Codes arrive dot-separated (`"959.00.125"`); the storefront's SKU
    /// parameter wants them bare.
    #[must_use]
    pub fn sanitize_code(code: &str) -> String {
        code.replace('.', "")
    }

    /// Price/availability page for `code`. The quantity hint is oversized on
    /// purpose: it forces the page to render every package-tier row rather
    /// than only the tier matching a small order.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::InvalidBaseUrl`] if the configured endpoint is not a
    /// parseable URL.
    pub fn product_query(&self, code: &str) -> Result<ProductQuery, ScrapeError> {
        let mut url = self.parse_base(&self.base_product_url)?;
        url.query_pairs_mut()
            .append_pair("SKU", &Self::sanitize_code(code))
            .append_pair("ProductQuantity", &self.quantity_hint.to_string());
        Ok(ProductQuery {
            code: code.to_owned(),
            url: url.to_string(),
        })
    }

    /// Search request used by the existence check. The search term keeps the
    /// dotted form — that is what the storefront echoes back in its
    /// failed-search message.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::InvalidBaseUrl`] if the configured endpoint is not a
    /// parseable URL.
    pub fn search_query(&self, code: &str) -> Result<String, ScrapeError> {
        let mut url = self.parse_base(&self.search_url)?;
        url.query_pairs_mut()
            .append_pair("SearchType", "all")
            .append_pair("SearchTerm", code);
        Ok(url.to_string())
    }

    /// Availability page for one bundle sub-component. Carries the ajax
    /// synchronisation token the storefront expects on these nested calls.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::InvalidBaseUrl`] if the configured endpoint is not a
    /// parseable URL.
    pub fn sub_component_url(&self, code: &str) -> Result<String, ScrapeError> {
        let mut url = self.parse_base(&self.base_product_url)?;
        url.query_pairs_mut()
            .append_pair("SKU", &Self::sanitize_code(code))
            .append_pair("ProductQuantity", &self.quantity_hint.to_string())
            .append_pair("SynchronizationAjaxToken", "1");
        Ok(url.to_string())
    }

    fn parse_base(&self, base: &str) -> Result<Url, ScrapeError> {
        Url::parse(base).map_err(|e| ScrapeError::InvalidBaseUrl {
            url: base.to_owned(),
            reason: e.to_string(),
        })
    }
}
