use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use typed_builder::TypedBuilder;

use super::commodity::CommodityIx;

/// How a price quote entered the database.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PriceType {
    /// A fetched closing quote (`last`).
    Last,
    /// Derived from an actual transaction.
    Transaction,
    /// Anything else the schema allows.
    Unknown,
}

impl PriceType {
    pub fn from_tag(tag: &str) -> PriceType {
        match tag {
            "last" => PriceType::Last,
            "transaction" => PriceType::Transaction,
            _ => PriceType::Unknown,
        }
    }
}

/// One historical quote: `value` units of `currency` per unit of
/// `commodity` at `time`.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Price {
    pub guid: String,

    pub commodity: CommodityIx,

    pub currency: CommodityIx,

    pub time: DateTime<FixedOffset>,

    pub value: Decimal,

    #[builder(default)]
    pub source: Option<String>,

    pub ty: PriceType,
}
