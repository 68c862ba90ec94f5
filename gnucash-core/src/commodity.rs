use typed_builder::TypedBuilder;

use super::slots::SlotMap;

/// Index of a commodity within its book's commodity arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CommodityIx(pub usize);

/// A commodity is something that accounts accumulate: a currency or a
/// simple security. Identity is the `(space, symbol)` pair, e.g.
/// `("CURRENCY", "USD")`, unique within a book.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Commodity {
    /// Namespace, e.g. `CURRENCY` or an exchange name.
    pub space: String,

    /// Symbol within the namespace, e.g. `USD` or a ticker.
    pub symbol: String,

    #[builder(default)]
    pub name: Option<String>,

    /// Exchange-specific code (`cmdty:xcode`), carried through unvalidated.
    #[builder(default)]
    pub xcode: Option<String>,

    /// Smallest tradable subdivision; 100 means cent-level precision.
    /// Absent in the document means 1 (no subdivision).
    pub fraction: i64,

    /// Online quote source, pass-through.
    #[builder(default)]
    pub quote_source: Option<String>,

    /// Online quote timezone, pass-through.
    #[builder(default)]
    pub quote_tz: Option<String>,

    #[builder(default)]
    pub slots: SlotMap,
}

impl Commodity {
    pub fn key(&self) -> (&str, &str) {
        (&self.space, &self.symbol)
    }

    pub fn is_currency(&self) -> bool {
        self.space == "CURRENCY" || self.space == "ISO4217"
    }
}
