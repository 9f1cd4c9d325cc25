//! Price extraction over a fetched product page.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::dom::element_text;
use crate::types::PriceInfo;

static PRICE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.price").expect("static selector"));

/// Maps the page's `span.price` elements to named fields **positionally**.
///
/// The page renders the VAT-excluded prices in a fixed order: sale price
/// first, net (lowest) price second, recommended retail price third. Older
/// extraction routines upstream disagreed on whether index 0 was the net or
/// the sale price; this mapping follows the current page rendering and is
/// the single canonical one — do not "fix" it to match historical output.
///
/// Values stay opaque source-locale strings (`"1.255,36 TL"`). Fewer
/// elements than expected leave the trailing fields unset; absence means
/// "unknown", never zero.
#[must_use]
pub fn extract_prices(document: &Html) -> PriceInfo {
    let mut prices = document
        .select(&PRICE_SELECTOR)
        .map(element_text)
        .filter(|text| !text.is_empty());

    PriceInfo {
        sale_price: prices.next(),
        net_price: prices.next(),
        recommended_retail_price: prices.next(),
    }
}
