use typed_builder::TypedBuilder;

use super::account_types::AccountType;
use super::commodity::CommodityIx;
use super::slots::SlotMap;
use super::transaction::SplitIx;

/// Index of an account within its book's account arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AccountIx(pub usize);

/// One node in the chart-of-accounts tree.
///
/// Parent/child edges and the split back-reference list are stored as arena
/// indexes into the owning [`Book`](crate::Book): the book owns every
/// account, splits stay owned by their transaction, and this account merely
/// points at the splits that post to it.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Account {
    pub guid: String,

    pub name: String,

    pub ty: AccountType,

    #[builder(default)]
    pub code: Option<String>,

    #[builder(default)]
    pub description: Option<String>,

    /// Commodity this account is denominated in. Only the root (and other
    /// structural accounts) may lack one.
    #[builder(default)]
    pub commodity: Option<CommodityIx>,

    /// Non-standard smallest-currency-unit override (`act:commodity-scu`).
    #[builder(default)]
    pub commodity_scu: Option<i64>,

    #[builder(default)]
    pub slots: SlotMap,

    /// Resolved parent edge; `None` only for the root.
    #[builder(default)]
    pub parent: Option<AccountIx>,

    /// Child accounts in document order.
    #[builder(default)]
    pub children: Vec<AccountIx>,

    /// Splits posting to this account, in transaction order and then
    /// document order across transactions.
    #[builder(default)]
    pub splits: Vec<SplitIx>,

    /// Ancestor names joined by [`Book::FULLNAME_SEPARATOR`](crate::Book),
    /// root excluded; the root's own fullname is the empty string.
    #[builder(default)]
    pub fullname: String,
}

impl Account {
    pub fn is_root(&self) -> bool {
        self.ty.is_root()
    }
}
