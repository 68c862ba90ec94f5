use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use typed_builder::TypedBuilder;

use super::account::AccountIx;
use super::commodity::CommodityIx;
use super::slots::SlotMap;

/// Index of a transaction within its book's transaction arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TransactionIx(pub usize);

/// Address of one split: the owning transaction plus the split's position
/// within it. Accounts hold these as non-owning back-references.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SplitIx {
    pub transaction: TransactionIx,
    pub split: usize,
}

/// Reconciliation state of a split (`split:reconciled-state`).
///
/// The flag set is fixed by the schema; unknown flags are a load error.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ReconcileState {
    NotReconciled,
    Cleared,
    Reconciled,
    Voided,
}

impl ReconcileState {
    pub fn from_flag(flag: &str) -> Option<ReconcileState> {
        match flag {
            "n" => Some(ReconcileState::NotReconciled),
            "c" => Some(ReconcileState::Cleared),
            "y" => Some(ReconcileState::Reconciled),
            "v" => Some(ReconcileState::Voided),
            _ => None,
        }
    }
}

/// One balanced ledger event: an ordered group of splits that sum to zero
/// in the transaction currency.
///
/// Split order is the XML document order and is never rearranged.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Transaction {
    pub guid: String,

    /// Check/reference number, freeform.
    #[builder(default)]
    pub num: Option<String>,

    pub currency: CommodityIx,

    pub date_posted: DateTime<FixedOffset>,

    pub date_entered: DateTime<FixedOffset>,

    #[builder(default)]
    pub description: Option<String>,

    #[builder(default)]
    pub slots: SlotMap,

    pub splits: Vec<Split>,
}

impl Transaction {
    /// Sum of split values in the transaction currency. Zero for a
    /// well-formed double-entry transaction.
    pub fn imbalance(&self) -> Decimal {
        self.splits.iter().map(|s| s.value).sum()
    }
}

/// One leg of a transaction, posting to exactly one account.
///
/// `value` is expressed in the transaction currency, `quantity` in the
/// account's commodity; they differ only when those two disagree (the
/// currency-exchange case).
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Split {
    pub guid: String,

    #[builder(default)]
    pub memo: Option<String>,

    /// Freeform action label ("Buy", "Sell", ...).
    #[builder(default)]
    pub action: Option<String>,

    pub reconciled_state: ReconcileState,

    #[builder(default)]
    pub reconcile_date: Option<DateTime<FixedOffset>>,

    pub value: Decimal,

    pub quantity: Decimal,

    pub account: AccountIx,

    /// Lot this split belongs to, if any. Lots themselves are not modeled,
    /// so the reference stays a raw guid.
    #[builder(default)]
    pub lot_guid: Option<String>,

    #[builder(default)]
    pub slots: SlotMap,
}
