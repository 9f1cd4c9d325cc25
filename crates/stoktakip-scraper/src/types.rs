//! Output record model and the storefront's fixed vocabulary of status
//! labels.
//!
//! Price fields stay opaque source-locale strings (decimal comma, thousands
//! dot, currency suffix) — downstream reporting owns numeric parsing.

use std::collections::BTreeMap;

use serde::ser::Serializer;
use serde::Serialize;

/// Availability label that outranks every other stock-tier row.
pub const IN_STOCK_LABEL: &str = "stokta mevcut";

/// Status reported for composite (bundle) products.
pub const BUNDLE_STATUS: &str = "set urun";

/// Status reported when a product page carries no availability markup at all.
pub const NO_STOCK_INFO_STATUS: &str = "Stok bilgisi bulunamadi";

/// Sentinel written into every price/stock field of a product the storefront
/// does not list. Deliberately distinct from an unset field: unset means
/// "collection failed, unknown", the sentinel means "confirmed absent".
pub const NOT_LISTED_SENTINEL: &str = "urun hafele.com.tr de bulunmuyor";

/// Pipeline stage names used as keys of [`ProductRecord::errors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Credentials,
    Existence,
    Fetch,
    Price,
    Bundle,
}

/// Reported stock quantity.
///
/// `Units` is a real count from the availability table; `NotListed` is the
/// explicit not-present sentinel and serialises as the sentinel string so
/// downstream consumers can tell it apart from a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAmount {
    Units(u32),
    NotListed,
}

impl Serialize for StockAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StockAmount::Units(n) => serializer.serialize_u32(*n),
            StockAmount::NotListed => serializer.serialize_str(NOT_LISTED_SENTINEL),
        }
    }
}

/// Price fields extracted from a product page. Any field the page did not
/// render is left unset — absence means "unknown", never zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceInfo {
    pub sale_price: Option<String>,
    pub net_price: Option<String>,
    pub recommended_retail_price: Option<String>,
}

/// Stock figure and its availability label as read off a product page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockInfo {
    pub amount: Option<u32>,
    pub status: String,
}

/// One collected result per input code. Exactly one of these exists for every
/// code handed to the engine, whether collection succeeded, the product is
/// absent at the source, or a stage failed (in which case `errors` names the
/// stage).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub stock_code: String,
    pub sale_price: Option<String>,
    pub net_price: Option<String>,
    pub recommended_retail_price: Option<String>,
    pub stock_status: Option<String>,
    pub stock_amount: Option<StockAmount>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<Stage, String>,
}

impl ProductRecord {
    /// A record with nothing collected yet. Fields stay unset until a
    /// pipeline stage fills them.
    #[must_use]
    pub fn empty(stock_code: &str) -> Self {
        Self {
            stock_code: stock_code.to_owned(),
            sale_price: None,
            net_price: None,
            recommended_retail_price: None,
            stock_status: None,
            stock_amount: None,
            errors: BTreeMap::new(),
        }
    }

    /// The record for a code the storefront's search confirms it does not
    /// carry: every price/stock field holds the explicit sentinel.
    #[must_use]
    pub fn not_listed(stock_code: &str) -> Self {
        Self {
            stock_code: stock_code.to_owned(),
            sale_price: Some(NOT_LISTED_SENTINEL.to_owned()),
            net_price: Some(NOT_LISTED_SENTINEL.to_owned()),
            recommended_retail_price: Some(NOT_LISTED_SENTINEL.to_owned()),
            stock_status: Some(NOT_LISTED_SENTINEL.to_owned()),
            stock_amount: Some(StockAmount::NotListed),
            errors: BTreeMap::new(),
        }
    }
}
