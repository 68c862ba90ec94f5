//! Per-namespace entity mappers: one pure function from a generic element
//! to a typed record.
//!
//! Mappers resolve every scalar field but leave cross-entity references as
//! the raw identifier strings found in the document (commodity
//! `(space, symbol)` pairs, account/parent/lot guids). An account's parent
//! may appear before or after the account itself, so reference resolution
//! is a separate pass ([`crate::resolve`]).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use gnucash_core::{AccountType, Commodity, PriceType, ReconcileState, SlotMap};

use crate::error::{ParseError, ParseResult};
use crate::numeric::parse_numeric;
use crate::slots::decode_slots;
use crate::tree::Elem;

/// A whole book with unresolved references, straight out of the mappers.
#[derive(Debug)]
pub(crate) struct RawBook {
    pub guid: String,
    pub slots: SlotMap,
    pub commodities: Vec<Commodity>,
    pub prices: Vec<RawPrice>,
    pub accounts: Vec<RawAccount>,
    pub transactions: Vec<RawTransaction>,
}

#[derive(Debug)]
pub(crate) struct RawPrice {
    pub guid: String,
    pub commodity: (String, String),
    pub currency: (String, String),
    pub time: DateTime<FixedOffset>,
    pub value: Decimal,
    pub source: Option<String>,
    pub ty: PriceType,
}

#[derive(Debug)]
pub(crate) struct RawAccount {
    pub guid: String,
    pub name: String,
    pub ty: AccountType,
    pub code: Option<String>,
    pub description: Option<String>,
    pub commodity: Option<(String, String)>,
    pub commodity_scu: Option<i64>,
    pub parent: Option<String>,
    pub slots: SlotMap,
}

#[derive(Debug)]
pub(crate) struct RawTransaction {
    pub guid: String,
    pub num: Option<String>,
    pub currency: (String, String),
    pub date_posted: DateTime<FixedOffset>,
    pub date_entered: DateTime<FixedOffset>,
    pub description: Option<String>,
    pub slots: SlotMap,
    pub splits: Vec<RawSplit>,
}

#[derive(Debug)]
pub(crate) struct RawSplit {
    pub guid: String,
    pub memo: Option<String>,
    pub action: Option<String>,
    pub reconciled_state: ReconcileState,
    pub reconcile_date: Option<DateTime<FixedOffset>>,
    pub value: Decimal,
    pub quantity: Decimal,
    pub account: String,
    pub lot_guid: Option<String>,
    pub slots: SlotMap,
}

/// Maps a `gnc:book` element into raw entity collections, dispatching each
/// namespaced child to its mapper. Scheduled transactions, templates,
/// budgets, and count-data are out of scope and skipped.
pub(crate) fn book(e: &Elem) -> ParseResult<RawBook> {
    let guid = required(e, "book:id", "book", "?")?.to_string();

    let mut raw = RawBook {
        slots: match e.child("book:slots") {
            Some(slots) => decode_slots(slots, "book", &guid)?,
            None => SlotMap::new(),
        },
        guid,
        commodities: Vec::new(),
        prices: Vec::new(),
        accounts: Vec::new(),
        transactions: Vec::new(),
    };

    for child in &e.children {
        match child.tag.as_str() {
            "gnc:commodity" => raw.commodities.push(commodity(child)?),
            "gnc:pricedb" => {
                for price_el in child.children_named("price") {
                    raw.prices.push(price(price_el)?);
                }
            }
            "gnc:account" => raw.accounts.push(account(child)?),
            "gnc:transaction" => raw.transactions.push(transaction(child)?),
            // Out of scope: templates, scheduling, budgets, bookkeeping
            // counters, and anything this loader does not model.
            _ => {}
        }
    }

    debug!(
        commodities = raw.commodities.len(),
        prices = raw.prices.len(),
        accounts = raw.accounts.len(),
        transactions = raw.transactions.len(),
        "mapped book entities"
    );
    Ok(raw)
}

pub(crate) fn commodity(e: &Elem) -> ParseResult<Commodity> {
    let space = required(e, "cmdty:space", "commodity", "?")?.to_string();
    let symbol = required(e, "cmdty:id", "commodity", &space)?.to_string();
    let fraction = match e.text_of("cmdty:fraction") {
        Some(text) => text.trim().parse::<i64>().map_err(|_| {
            ParseError::malformed("commodity", &symbol, format!("bad fraction '{}'", text))
        })?,
        // No subdivision.
        None => 1,
    };
    let slots = match e.child("cmdty:slots") {
        Some(slots) => decode_slots(slots, "commodity", &symbol)?,
        None => SlotMap::new(),
    };
    Ok(Commodity::builder()
        .space(space)
        .symbol(symbol)
        .name(e.text_of("cmdty:name").map(str::to_string))
        .xcode(e.text_of("cmdty:xcode").map(str::to_string))
        .fraction(fraction)
        .quote_source(e.text_of("cmdty:quote_source").map(str::to_string))
        .quote_tz(e.text_of("cmdty:quote_tz").map(str::to_string))
        .slots(slots)
        .build())
}

pub(crate) fn price(e: &Elem) -> ParseResult<RawPrice> {
    let guid = required(e, "price:id", "price", "?")?.to_string();
    let commodity = commodity_ref(e, "price:commodity", "price", &guid)?;
    let currency = commodity_ref(e, "price:currency", "price", &guid)?;
    let time = time_of(e, "price:time", "price", &guid)?;
    let value_text = required(e, "price:value", "price", &guid)?;
    let value = amount(value_text, "price", &guid)?;
    Ok(RawPrice {
        source: e.text_of("price:source").map(str::to_string),
        ty: e
            .text_of("price:type")
            .map(PriceType::from_tag)
            .unwrap_or(PriceType::Unknown),
        guid,
        commodity,
        currency,
        time,
        value,
    })
}

pub(crate) fn account(e: &Elem) -> ParseResult<RawAccount> {
    let guid = required(e, "act:id", "account", "?")?.to_string();
    let name = required(e, "act:name", "account", &guid)?.to_string();
    let ty_text = required(e, "act:type", "account", &guid)?;
    let ty = AccountType::from_tag(ty_text).ok_or_else(|| ParseError::UnknownAccountType {
        guid: guid.clone(),
        ty: ty_text.to_string(),
    })?;
    let commodity = match e.child("act:commodity") {
        Some(c) => Some(pair(c, "account", &guid)?),
        None => None,
    };
    let commodity_scu = match e.text_of("act:commodity-scu") {
        Some(text) => Some(text.trim().parse::<i64>().map_err(|_| {
            ParseError::malformed("account", &guid, format!("bad commodity-scu '{}'", text))
        })?),
        None => None,
    };
    let slots = match e.child("act:slots") {
        Some(slots) => decode_slots(slots, "account", &guid)?,
        None => SlotMap::new(),
    };
    Ok(RawAccount {
        name,
        ty,
        code: e.text_of("act:code").map(str::to_string),
        description: e.text_of("act:description").map(str::to_string),
        commodity,
        commodity_scu,
        parent: e.text_of("act:parent").map(str::to_string),
        slots,
        guid,
    })
}

pub(crate) fn transaction(e: &Elem) -> ParseResult<RawTransaction> {
    let guid = required(e, "trn:id", "transaction", "?")?.to_string();
    let currency = commodity_ref(e, "trn:currency", "transaction", &guid)?;
    let date_posted = time_of(e, "trn:date-posted", "transaction", &guid)?;
    let date_entered = time_of(e, "trn:date-entered", "transaction", &guid)?;
    let slots = match e.child("trn:slots") {
        Some(slots) => decode_slots(slots, "transaction", &guid)?,
        None => SlotMap::new(),
    };
    // Split order is XML document order and must be preserved exactly.
    let splits = e
        .child("trn:splits")
        .ok_or_else(|| ParseError::malformed("transaction", &guid, "missing trn:splits"))?
        .children_named("trn:split")
        .map(split)
        .collect::<ParseResult<Vec<_>>>()?;
    Ok(RawTransaction {
        num: e.text_of("trn:num").map(str::to_string),
        description: e.text_of("trn:description").map(str::to_string),
        guid,
        currency,
        date_posted,
        date_entered,
        slots,
        splits,
    })
}

fn split(e: &Elem) -> ParseResult<RawSplit> {
    let guid = required(e, "split:id", "split", "?")?.to_string();
    let state_text = required(e, "split:reconciled-state", "split", &guid)?;
    let reconciled_state = ReconcileState::from_flag(state_text).ok_or_else(|| {
        ParseError::UnknownReconcileState {
            guid: guid.clone(),
            state: state_text.to_string(),
        }
    })?;
    let reconcile_date = match e.child("split:reconcile-date") {
        Some(_) => Some(time_of(e, "split:reconcile-date", "split", &guid)?),
        None => None,
    };
    let value = amount(required(e, "split:value", "split", &guid)?, "split", &guid)?;
    let quantity = amount(
        required(e, "split:quantity", "split", &guid)?,
        "split",
        &guid,
    )?;
    let account = required(e, "split:account", "split", &guid)?.to_string();
    let slots = match e.child("split:slots") {
        Some(slots) => decode_slots(slots, "split", &guid)?,
        None => SlotMap::new(),
    };
    Ok(RawSplit {
        memo: e.text_of("split:memo").map(str::to_string),
        action: e.text_of("split:action").map(str::to_string),
        lot_guid: e.text_of("split:lot").map(str::to_string),
        guid,
        reconciled_state,
        reconcile_date,
        value,
        quantity,
        account,
        slots,
    })
}

/// Parses a GnuCash timestamp. Exports carry `2014-12-24 13:19:48 -0500`;
/// zone-less and date-only forms appear in older files and date-posted
/// fields, and are read as UTC.
pub(crate) fn timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(DateTime::from_naive_utc_and_offset(naive, Utc.fix()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0)?;
        return Some(DateTime::from_naive_utc_and_offset(naive, Utc.fix()));
    }
    None
}

fn required<'a>(
    e: &'a Elem,
    tag: &str,
    entity: &'static str,
    guid: &str,
) -> ParseResult<&'a str> {
    e.text_of(tag)
        .ok_or_else(|| ParseError::malformed(entity, guid, format!("missing {}", tag)))
}

fn amount(text: &str, entity: &'static str, guid: &str) -> ParseResult<Decimal> {
    parse_numeric(text).ok_or_else(|| ParseError::MalformedAmount {
        entity,
        guid: guid.to_string(),
        text: text.to_string(),
    })
}

/// Reads a `(cmdty:space, cmdty:id)` reference pair from the child element
/// with the given tag.
fn commodity_ref(
    e: &Elem,
    tag: &str,
    entity: &'static str,
    guid: &str,
) -> ParseResult<(String, String)> {
    let child = e
        .child(tag)
        .ok_or_else(|| ParseError::malformed(entity, guid, format!("missing {}", tag)))?;
    pair(child, entity, guid)
}

fn pair(e: &Elem, entity: &'static str, guid: &str) -> ParseResult<(String, String)> {
    let space = required(e, "cmdty:space", entity, guid)?;
    let symbol = required(e, "cmdty:id", entity, guid)?;
    Ok((space.to_string(), symbol.to_string()))
}

/// Reads a `ts:date` timestamp nested under the child with the given tag.
fn time_of(
    e: &Elem,
    tag: &str,
    entity: &'static str,
    guid: &str,
) -> ParseResult<DateTime<FixedOffset>> {
    let holder = e
        .child(tag)
        .ok_or_else(|| ParseError::malformed(entity, guid, format!("missing {}", tag)))?;
    let text = holder
        .text_of("ts:date")
        .ok_or_else(|| ParseError::malformed(entity, guid, format!("{} without ts:date", tag)))?;
    timestamp(text)
        .ok_or_else(|| ParseError::malformed(entity, guid, format!("bad {} '{}'", tag, text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::read_document;
    use indoc::indoc;

    #[test]
    fn timestamps_with_and_without_zones() {
        let full = timestamp("2014-12-24 13:19:48 -0500").unwrap();
        assert_eq!(full.to_rfc3339(), "2014-12-24T13:19:48-05:00");

        let zoneless = timestamp("2014-12-24 13:19:48").unwrap();
        assert_eq!(zoneless.to_rfc3339(), "2014-12-24T13:19:48+00:00");

        let date_only = timestamp("2014-12-24").unwrap();
        assert_eq!(date_only.to_rfc3339(), "2014-12-24T00:00:00+00:00");

        assert_eq!(timestamp("24.12.2014"), None);
        assert_eq!(timestamp(""), None);
    }

    #[test]
    fn commodity_defaults_fraction_to_one() {
        let e = read_document(
            indoc! {r#"
                <gnc:commodity version="2.0.0">
                  <cmdty:space>NASDAQ</cmdty:space>
                  <cmdty:id>HOOL</cmdty:id>
                  <cmdty:name>Hooli Inc</cmdty:name>
                </gnc:commodity>
            "#}
            .as_bytes(),
        )
        .unwrap();
        let c = commodity(&e).unwrap();
        assert_eq!(c.key(), ("NASDAQ", "HOOL"));
        assert_eq!(c.fraction, 1);
        assert_eq!(c.name.as_deref(), Some("Hooli Inc"));
    }

    #[test]
    fn account_with_unknown_type_fails() {
        let e = read_document(
            indoc! {r#"
                <gnc:account version="2.0.0">
                  <act:name>Weird</act:name>
                  <act:id type="guid">1111</act:id>
                  <act:type>BOGUS</act:type>
                </gnc:account>
            "#}
            .as_bytes(),
        )
        .unwrap();
        match account(&e).unwrap_err() {
            ParseError::UnknownAccountType { guid, ty } => {
                assert_eq!(guid, "1111");
                assert_eq!(ty, "BOGUS");
            }
            other => panic!("expected UnknownAccountType, got {:?}", other),
        }
    }

    #[test]
    fn account_without_id_is_malformed() {
        let e = read_document(
            br#"<gnc:account><act:name>NoId</act:name><act:type>ASSET</act:type></gnc:account>"#
                as &[u8],
        )
        .unwrap();
        assert!(matches!(
            account(&e).unwrap_err(),
            ParseError::MalformedDocument { entity: "account", .. }
        ));
    }

    #[test]
    fn split_with_unknown_reconcile_state_fails() {
        let e = read_document(
            indoc! {r#"
                <trn:split>
                  <split:id type="guid">2222</split:id>
                  <split:reconciled-state>q</split:reconciled-state>
                  <split:value>100/100</split:value>
                  <split:quantity>100/100</split:quantity>
                  <split:account type="guid">3333</split:account>
                </trn:split>
            "#}
            .as_bytes(),
        )
        .unwrap();
        match split(&e).unwrap_err() {
            ParseError::UnknownReconcileState { guid, state } => {
                assert_eq!(guid, "2222");
                assert_eq!(state, "q");
            }
            other => panic!("expected UnknownReconcileState, got {:?}", other),
        }
    }
}
