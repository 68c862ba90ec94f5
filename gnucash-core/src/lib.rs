pub use account::{Account, AccountIx};
pub use account_types::AccountType;
pub use book::{Book, Walk};
pub use commodity::{Commodity, CommodityIx};
pub use price::{Price, PriceType};
pub use slots::{SlotMap, SlotValue};
pub use transaction::{ReconcileState, Split, SplitIx, Transaction, TransactionIx};

pub mod account;
pub mod account_types;
pub mod book;
pub mod commodity;
pub mod price;
pub mod slots;
pub mod transaction;
