//! Stock extraction for singular products.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::dom::{element_text, parse_quantity};
use crate::types::{StockInfo, IN_STOCK_LABEL, NO_STOCK_INFO_STATUS};

static TIER_ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr.values-tr").expect("static selector"));

static QTY_CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.qty-available").expect("static selector"));

static ROW_FLAG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("td.requestedPackageStatus .availability-flag").expect("static selector")
});

static PAGE_FLAG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("#productAvailabilityInformation .availability-flag").expect("static selector")
});

/// Scans the package-tier rows of a product page and picks the reported
/// stock figure.
///
/// Priority rule: the first row whose availability label contains the
/// canonical in-stock label wins immediately, whatever its position —
/// "known in stock now" always outranks a projected-availability row
/// ("bir ay içinde" etc.) even when the projection is listed first. When no
/// row is canonical, the first row encountered is used as-is, carrying its
/// own label and quantity. A page with no tier rows at all falls back to the
/// page-level availability indicator, which has no quantity.
#[must_use]
pub fn extract_stock(document: &Html) -> StockInfo {
    let mut first_row: Option<StockInfo> = None;

    for row in document.select(&TIER_ROW_SELECTOR) {
        let (Some(qty_cell), Some(flag)) = (
            row.select(&QTY_CELL_SELECTOR).next(),
            row.select(&ROW_FLAG_SELECTOR).next(),
        ) else {
            continue;
        };

        let amount = parse_quantity(&element_text(qty_cell));
        let label = element_text(flag).to_lowercase();

        if label.contains(IN_STOCK_LABEL) {
            return StockInfo {
                amount,
                status: IN_STOCK_LABEL.to_owned(),
            };
        }

        if first_row.is_none() {
            first_row = Some(StockInfo {
                amount,
                status: label,
            });
        }
    }

    if let Some(info) = first_row {
        return info;
    }

    let status = document
        .select(&PAGE_FLAG_SELECTOR)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_STOCK_INFO_STATUS.to_owned());

    StockInfo {
        amount: None,
        status,
    }
}
