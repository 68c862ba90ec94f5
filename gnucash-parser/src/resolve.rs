//! The second pass: identifier indexes and edge wiring.
//!
//! Mapping and resolution are strictly two-phase. Phase one builds the
//! identifier indexes over everything the mappers produced; phase two
//! rewrites each raw reference into an arena index. No step mutates an
//! index another step is reading, and no single-pass forward-reference
//! resolution is ever attempted.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use gnucash_core::{
    Account, AccountIx, Book, CommodityIx, Price, Split, SplitIx, Transaction, TransactionIx,
};

use crate::error::{ParseError, ParseResult, Warning};
use crate::mappers::{RawBook, RawSplit};

pub(crate) fn link(raw: RawBook) -> ParseResult<(Book, Vec<Warning>)> {
    // Phase one: indexes. Duplicate commodity declarations keep their first
    // occurrence; duplicate account guids break reference identity and are
    // rejected.
    let mut commodities_by_key: HashMap<(String, String), CommodityIx> = HashMap::new();
    for (ix, c) in raw.commodities.iter().enumerate() {
        commodities_by_key
            .entry((c.space.clone(), c.symbol.clone()))
            .or_insert(CommodityIx(ix));
    }
    let mut accounts_by_guid: HashMap<String, AccountIx> = HashMap::new();
    for (ix, a) in raw.accounts.iter().enumerate() {
        if accounts_by_guid
            .insert(a.guid.clone(), AccountIx(ix))
            .is_some()
        {
            return Err(ParseError::malformed(
                "account",
                &a.guid,
                "duplicate account guid",
            ));
        }
    }

    // Phase two, step 1: account scalar references (commodity, parent).
    let mut accounts = Vec::with_capacity(raw.accounts.len());
    for a in raw.accounts {
        let commodity = match &a.commodity {
            Some((space, symbol)) => Some(lookup_commodity(
                &commodities_by_key,
                space,
                symbol,
                "account",
                &a.guid,
            )?),
            None => None,
        };
        let parent = match &a.parent {
            Some(parent_guid) => Some(
                accounts_by_guid.get(parent_guid).copied().ok_or_else(|| {
                    ParseError::dangling("account", &a.guid, "parent account", parent_guid.clone())
                })?,
            ),
            None => None,
        };
        accounts.push(
            Account::builder()
                .guid(a.guid)
                .name(a.name)
                .ty(a.ty)
                .code(a.code)
                .description(a.description)
                .commodity(commodity)
                .commodity_scu(a.commodity_scu)
                .slots(a.slots)
                .parent(parent)
                .build(),
        );
    }

    // Root selection: the first parentless ROOT-typed account. Other
    // parentless accounts hang off it; a synthetic root is never invented.
    let root = accounts
        .iter()
        .position(|a| a.parent.is_none() && a.ty.is_root())
        .map(AccountIx)
        .ok_or(ParseError::MissingRoot)?;
    for (ix, account) in accounts.iter_mut().enumerate() {
        if ix != root.0 && account.parent.is_none() {
            account.parent = Some(root);
        }
    }

    // Step 2: reverse parent edges, in document order.
    let edges: Vec<(usize, AccountIx)> = accounts
        .iter()
        .enumerate()
        .filter_map(|(ix, a)| a.parent.map(|p| (ix, p)))
        .collect();
    for (child, parent) in edges {
        accounts[parent.0].children.push(AccountIx(child));
    }
    for account in &accounts {
        let mut names: Vec<&str> = account
            .children
            .iter()
            .map(|c| accounts[c.0].name.as_str())
            .collect();
        names.sort_unstable();
        if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(ParseError::malformed(
                "account",
                &account.guid,
                format!("duplicate child account name '{}'", dup[0]),
            ));
        }
    }

    // Step 3: fullnames, walking down from the root. The root's own name is
    // excluded, so its fullname is empty and a top-level account's fullname
    // is just its name.
    let mut visited = 1usize;
    let mut stack = vec![root];
    while let Some(ix) = stack.pop() {
        let prefix = accounts[ix.0].fullname.clone();
        let children = accounts[ix.0].children.clone();
        for child in children {
            accounts[child.0].fullname = if ix == root {
                accounts[child.0].name.clone()
            } else {
                format!(
                    "{}{}{}",
                    prefix,
                    Book::FULLNAME_SEPARATOR,
                    accounts[child.0].name
                )
            };
            visited += 1;
            stack.push(child);
        }
    }
    if visited != accounts.len() {
        // Every account has a resolved parent, so unreachable accounts can
        // only mean a parent cycle.
        return Err(ParseError::malformed(
            "account",
            &accounts[root.0].guid,
            "account tree contains a parent cycle",
        ));
    }

    // Step 4: price references.
    let mut prices = Vec::with_capacity(raw.prices.len());
    for p in raw.prices {
        let commodity = lookup_commodity(
            &commodities_by_key,
            &p.commodity.0,
            &p.commodity.1,
            "price",
            &p.guid,
        )?;
        let currency = lookup_commodity(
            &commodities_by_key,
            &p.currency.0,
            &p.currency.1,
            "price",
            &p.guid,
        )?;
        prices.push(
            Price::builder()
                .guid(p.guid)
                .commodity(commodity)
                .currency(currency)
                .time(p.time)
                .value(p.value)
                .source(p.source)
                .ty(p.ty)
                .build(),
        );
    }

    // Steps 5-7: transaction currencies, split→account edges plus the
    // reverse split lists, and the zero-sum check. Split lists keep
    // transaction order, then document order across transactions.
    let mut transactions = Vec::with_capacity(raw.transactions.len());
    let mut warnings = Vec::new();
    for (tix, t) in raw.transactions.into_iter().enumerate() {
        let currency = lookup_commodity(
            &commodities_by_key,
            &t.currency.0,
            &t.currency.1,
            "transaction",
            &t.guid,
        )?;
        let mut splits = Vec::with_capacity(t.splits.len());
        for (six, s) in t.splits.into_iter().enumerate() {
            let split = resolve_split(s, &accounts_by_guid)?;
            accounts[split.account.0].splits.push(SplitIx {
                transaction: TransactionIx(tix),
                split: six,
            });
            splits.push(split);
        }

        // Exact rationals mean an exactly-zero sum; any imbalance is a
        // legacy artifact worth surfacing, but never worth losing the
        // transaction over.
        let imbalance: Decimal = splits.iter().map(|s| s.value).sum();
        if !imbalance.is_zero() {
            warn!(transaction = %t.guid, %imbalance, "unbalanced transaction");
            warnings.push(Warning::UnbalancedTransaction {
                guid: t.guid.clone(),
                imbalance,
            });
        }

        transactions.push(
            Transaction::builder()
                .guid(t.guid)
                .num(t.num)
                .currency(currency)
                .date_posted(t.date_posted)
                .date_entered(t.date_entered)
                .description(t.description)
                .slots(t.slots)
                .splits(splits)
                .build(),
        );
    }

    debug!(
        accounts = accounts.len(),
        transactions = transactions.len(),
        warnings = warnings.len(),
        "linked book graph"
    );
    Ok((
        Book::new(
            raw.guid,
            raw.slots,
            raw.commodities,
            prices,
            accounts,
            transactions,
            root,
        ),
        warnings,
    ))
}

fn resolve_split(s: RawSplit, accounts_by_guid: &HashMap<String, AccountIx>) -> ParseResult<Split> {
    let account = accounts_by_guid.get(&s.account).copied().ok_or_else(|| {
        ParseError::dangling("split", &s.guid, "account", s.account.clone())
    })?;
    Ok(Split::builder()
        .guid(s.guid)
        .memo(s.memo)
        .action(s.action)
        .reconciled_state(s.reconciled_state)
        .reconcile_date(s.reconcile_date)
        .value(s.value)
        .quantity(s.quantity)
        .account(account)
        .lot_guid(s.lot_guid)
        .slots(s.slots)
        .build())
}

fn lookup_commodity(
    index: &HashMap<(String, String), CommodityIx>,
    space: &str,
    symbol: &str,
    entity: &'static str,
    guid: &str,
) -> ParseResult<CommodityIx> {
    index
        .get(&(space.to_string(), symbol.to_string()))
        .copied()
        .ok_or_else(|| {
            ParseError::dangling(
                entity,
                guid,
                "commodity",
                format!("{}:{}", space, symbol),
            )
        })
}
