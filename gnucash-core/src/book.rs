use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use super::account::{Account, AccountIx};
use super::commodity::{Commodity, CommodityIx};
use super::price::Price;
use super::slots::SlotMap;
use super::transaction::{Split, SplitIx, Transaction, TransactionIx};

/// The aggregate root holding one fully resolved accounting dataset.
///
/// A book is produced in a single load and is immutable afterwards, so
/// concurrent readers need no locking. It exclusively owns the account tree
/// (parents own children), the commodity and price collections, and the
/// transaction list; splits are owned by their transaction and accounts keep
/// non-owning [`SplitIx`] back-references to the splits posting to them.
#[derive(Clone, Debug)]
pub struct Book {
    pub guid: String,
    pub slots: SlotMap,
    commodities: Vec<Commodity>,
    prices: Vec<Price>,
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    root: AccountIx,
    accounts_by_guid: HashMap<String, AccountIx>,
    accounts_by_fullname: HashMap<String, AccountIx>,
    commodities_by_key: HashMap<(String, String), CommodityIx>,
    transactions_by_guid: HashMap<String, TransactionIx>,
}

impl Book {
    /// Separator used when composing account fullnames.
    pub const FULLNAME_SEPARATOR: &'static str = ":";

    /// Assembles a book from already-resolved entities and builds the lookup
    /// indexes. Callers (the parser's reference resolver) are responsible
    /// for the linkage invariants: a single root, acyclic parent edges, and
    /// split/account indexes that point into the given arenas.
    pub fn new(
        guid: String,
        slots: SlotMap,
        commodities: Vec<Commodity>,
        prices: Vec<Price>,
        accounts: Vec<Account>,
        transactions: Vec<Transaction>,
        root: AccountIx,
    ) -> Book {
        let accounts_by_guid = accounts
            .iter()
            .enumerate()
            .map(|(ix, a)| (a.guid.clone(), AccountIx(ix)))
            .collect();
        let accounts_by_fullname = accounts
            .iter()
            .enumerate()
            .map(|(ix, a)| (a.fullname.clone(), AccountIx(ix)))
            .collect();
        let commodities_by_key = commodities
            .iter()
            .enumerate()
            .map(|(ix, c)| ((c.space.clone(), c.symbol.clone()), CommodityIx(ix)))
            .collect();
        let transactions_by_guid = transactions
            .iter()
            .enumerate()
            .map(|(ix, t)| (t.guid.clone(), TransactionIx(ix)))
            .collect();
        Book {
            guid,
            slots,
            commodities,
            prices,
            accounts,
            transactions,
            root,
            accounts_by_guid,
            accounts_by_fullname,
            commodities_by_key,
            transactions_by_guid,
        }
    }

    pub fn root_account(&self) -> &Account {
        &self.accounts[self.root.0]
    }

    pub fn root_ix(&self) -> AccountIx {
        self.root
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn commodities(&self) -> &[Commodity] {
        &self.commodities
    }

    pub fn prices(&self) -> &[Price] {
        &self.prices
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn account(&self, ix: AccountIx) -> &Account {
        &self.accounts[ix.0]
    }

    pub fn commodity(&self, ix: CommodityIx) -> &Commodity {
        &self.commodities[ix.0]
    }

    pub fn transaction(&self, ix: TransactionIx) -> &Transaction {
        &self.transactions[ix.0]
    }

    pub fn split(&self, ix: SplitIx) -> &Split {
        &self.transactions[ix.transaction.0].splits[ix.split]
    }

    /// The transaction owning the given split.
    pub fn split_transaction(&self, ix: SplitIx) -> &Transaction {
        &self.transactions[ix.transaction.0]
    }

    pub fn account_by_guid(&self, guid: &str) -> Option<&Account> {
        self.accounts_by_guid.get(guid).map(|ix| self.account(*ix))
    }

    /// Looks an account up by its colon-joined fullname, e.g.
    /// `"Assets:Checking"`. The root answers to the empty string.
    pub fn account_by_fullname(&self, fullname: &str) -> Option<&Account> {
        self.accounts_by_fullname
            .get(fullname)
            .map(|ix| self.account(*ix))
    }

    pub fn commodity_by_key(&self, space: &str, symbol: &str) -> Option<CommodityIx> {
        self.commodities_by_key
            .get(&(space.to_string(), symbol.to_string()))
            .copied()
    }

    pub fn transaction_by_guid(&self, guid: &str) -> Option<&Transaction> {
        self.transactions_by_guid
            .get(guid)
            .map(|ix| self.transaction(*ix))
    }

    /// All quotes for a commodity, in price-db document order.
    pub fn prices_for(&self, commodity: CommodityIx) -> impl Iterator<Item = &Price> {
        self.prices.iter().filter(move |p| p.commodity == commodity)
    }

    /// The quote for `commodity` closest in time to `at`; ties resolve to
    /// the earlier quote.
    pub fn price_nearest(
        &self,
        commodity: CommodityIx,
        at: DateTime<FixedOffset>,
    ) -> Option<&Price> {
        self.prices_for(commodity).min_by(|a, b| {
            let da = (a.time - at).num_seconds().abs();
            let db = (b.time - at).num_seconds().abs();
            da.cmp(&db).then(a.time.cmp(&b.time))
        })
    }

    /// Walks the account tree depth-first from the root, visiting each
    /// account exactly once with children in document order. Each step
    /// yields the account, its direct children, and its direct splits.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            book: self,
            stack: vec![self.root],
        }
    }
}

/// Depth-first pre-order traversal over a book's account tree.
pub struct Walk<'b> {
    book: &'b Book,
    stack: Vec<AccountIx>,
}

impl<'b> Iterator for Walk<'b> {
    type Item = (&'b Account, Vec<&'b Account>, Vec<&'b Split>);

    fn next(&mut self) -> Option<Self::Item> {
        let ix = self.stack.pop()?;
        let account = self.book.account(ix);
        // Reversed push keeps children in document order on a LIFO stack.
        self.stack.extend(account.children.iter().rev());
        let children = account
            .children
            .iter()
            .map(|c| self.book.account(*c))
            .collect();
        let splits = account
            .splits
            .iter()
            .map(|s| self.book.split(*s))
            .collect();
        Some((account, children, splits))
    }
}
