//! Decoder for `slot` key/value metadata blocks.
//!
//! Slots appear on books, commodities, accounts, transactions, and splits,
//! and nest to arbitrary depth through `frame` values. The value-type tag
//! set is fixed; anything else is application metadata we must carry
//! through rather than reject, so unknown tags decode to
//! [`SlotValue::Other`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use gnucash_core::{SlotMap, SlotValue};

use crate::error::{ParseError, ParseResult};
use crate::mappers::timestamp;
use crate::numeric::parse_numeric;
use crate::tree::Elem;

/// Decodes a slot container (a `*:slots` element or a `frame` value) into
/// an order-preserving map. Duplicate keys within one frame are
/// last-write-wins.
pub(crate) fn decode_slots(
    container: &Elem,
    entity: &'static str,
    guid: &str,
) -> ParseResult<SlotMap> {
    let mut slots = SlotMap::new();
    for slot in container.children_named("slot") {
        let key = slot
            .text_of("slot:key")
            .ok_or_else(|| ParseError::malformed(entity, guid, "slot without slot:key"))?
            .to_string();
        let value = slot
            .child("slot:value")
            .ok_or_else(|| {
                ParseError::malformed(entity, guid, format!("slot '{}' without slot:value", key))
            })
            .and_then(|v| decode_value(v, entity, guid))?;
        slots.insert(key, value);
    }
    Ok(slots)
}

fn decode_value(value: &Elem, entity: &'static str, guid: &str) -> ParseResult<SlotValue> {
    let ty = value.attr("type").unwrap_or("string");
    Ok(match ty {
        "string" => SlotValue::Text(value.text().to_string()),
        "guid" => SlotValue::Guid(value.text().to_string()),
        "integer" => {
            let text = value.text();
            let n = text.trim().parse::<i64>().map_err(|_| {
                ParseError::malformed(entity, guid, format!("bad integer slot '{}'", text))
            })?;
            SlotValue::Integer(n)
        }
        // Doubles decode to the same exact-decimal representation as
        // numerics; the formats differ only in the document encoding.
        "double" => {
            let text = value.text();
            let n = text.trim().parse::<Decimal>().map_err(|_| {
                ParseError::malformed(entity, guid, format!("bad double slot '{}'", text))
            })?;
            SlotValue::Numeric(n)
        }
        "numeric" => {
            let text = value.text();
            let n = parse_numeric(text).ok_or_else(|| ParseError::MalformedAmount {
                entity,
                guid: guid.to_string(),
                text: text.to_string(),
            })?;
            SlotValue::Numeric(n)
        }
        "gdate" => {
            let text = value.text_of("gdate").ok_or_else(|| {
                ParseError::malformed(entity, guid, "gdate slot without gdate element")
            })?;
            let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
                ParseError::malformed(entity, guid, format!("bad gdate slot '{}'", text))
            })?;
            SlotValue::Date(date)
        }
        "timespec" => {
            let text = value.text_of("ts:date").ok_or_else(|| {
                ParseError::malformed(entity, guid, "timespec slot without ts:date")
            })?;
            let ts = timestamp(text).ok_or_else(|| {
                ParseError::malformed(entity, guid, format!("bad timespec slot '{}'", text))
            })?;
            SlotValue::Timestamp(ts)
        }
        "frame" => SlotValue::Frame(decode_slots(value, entity, guid)?),
        "list" => {
            let items = value
                .children
                .iter()
                .map(|item| decode_value(item, entity, guid))
                .collect::<ParseResult<Vec<_>>>()?;
            SlotValue::List(items)
        }
        other => {
            // Extensible application metadata; carry it through raw.
            warn!(entity, guid, ty = other, "unknown slot value type");
            SlotValue::Other {
                ty: other.to_string(),
                raw: value.text().to_string(),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::read_document;
    use indoc::indoc;
    use rust_decimal::Decimal;

    fn decode(xml: &str) -> SlotMap {
        let root = read_document(xml.as_bytes()).unwrap();
        decode_slots(&root, "test", "t1").unwrap()
    }

    #[test]
    fn scalar_slot_values() {
        let slots = decode(indoc! {r#"
            <act:slots>
              <slot>
                <slot:key>notes</slot:key>
                <slot:value type="string">opening balance</slot:value>
              </slot>
              <slot>
                <slot:key>order</slot:key>
                <slot:value type="integer">42</slot:value>
              </slot>
              <slot>
                <slot:key>rate</slot:key>
                <slot:value type="numeric">150/100</slot:value>
              </slot>
              <slot>
                <slot:key>reconcile-info</slot:key>
                <slot:value type="guid">deadbeefdeadbeefdeadbeefdeadbeef</slot:value>
              </slot>
              <slot>
                <slot:key>date</slot:key>
                <slot:value type="gdate"><gdate>2019-07-01</gdate></slot:value>
              </slot>
            </act:slots>
        "#});

        assert_eq!(
            slots.get("notes"),
            Some(&SlotValue::Text("opening balance".to_string()))
        );
        assert_eq!(slots.get("order"), Some(&SlotValue::Integer(42)));
        assert_eq!(
            slots.get("rate"),
            Some(&SlotValue::Numeric(Decimal::new(150, 2)))
        );
        assert_eq!(
            slots.get("date"),
            Some(&SlotValue::Date(
                NaiveDate::from_ymd_opt(2019, 7, 1).unwrap()
            ))
        );
        let keys: Vec<_> = slots.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["notes", "order", "rate", "reconcile-info", "date"]
        );
    }

    #[test]
    fn frames_nest_and_duplicates_take_the_last_write() {
        let slots = decode(indoc! {r#"
            <book:slots>
              <slot>
                <slot:key>options</slot:key>
                <slot:value type="frame">
                  <slot>
                    <slot:key>Budgeting</slot:key>
                    <slot:value type="frame">
                      <slot>
                        <slot:key>default</slot:key>
                        <slot:value type="string">one</slot:value>
                      </slot>
                      <slot>
                        <slot:key>default</slot:key>
                        <slot:value type="string">two</slot:value>
                      </slot>
                    </slot:value>
                  </slot>
                </slot:value>
              </slot>
            </book:slots>
        "#});

        let options = slots.get("options").unwrap().as_frame().unwrap();
        let budgeting = options.get("Budgeting").unwrap().as_frame().unwrap();
        assert_eq!(budgeting.len(), 1);
        assert_eq!(
            budgeting.get("default"),
            Some(&SlotValue::Text("two".to_string()))
        );
    }

    #[test]
    fn list_values_decode_recursively() {
        let slots = decode(indoc! {r#"
            <trn:slots>
              <slot>
                <slot:key>tags</slot:key>
                <slot:value type="list">
                  <slot:value type="string">food</slot:value>
                  <slot:value type="integer">7</slot:value>
                </slot:value>
              </slot>
            </trn:slots>
        "#});

        assert_eq!(
            slots.get("tags"),
            Some(&SlotValue::List(vec![
                SlotValue::Text("food".to_string()),
                SlotValue::Integer(7),
            ]))
        );
    }

    #[test]
    fn double_values_decode_numerically() {
        let slots = decode(indoc! {r#"
            <act:slots>
              <slot>
                <slot:key>weight</slot:key>
                <slot:value type="double">7</slot:value>
              </slot>
              <slot>
                <slot:key>ratio</slot:key>
                <slot:value type="double">2.5</slot:value>
              </slot>
            </act:slots>
        "#});

        assert_eq!(
            slots.get("weight"),
            Some(&SlotValue::Numeric(Decimal::from(7)))
        );
        assert_eq!(
            slots.get("ratio"),
            Some(&SlotValue::Numeric(Decimal::new(25, 1)))
        );
    }

    #[test]
    fn unknown_value_types_survive_as_raw_text() {
        let slots = decode(indoc! {r#"
            <act:slots>
              <slot>
                <slot:key>color</slot:key>
                <slot:value type="binary">cafef00d</slot:value>
              </slot>
            </act:slots>
        "#});

        assert_eq!(
            slots.get("color"),
            Some(&SlotValue::Other {
                ty: "binary".to_string(),
                raw: "cafef00d".to_string(),
            })
        );
    }

    #[test]
    fn slot_without_key_is_malformed() {
        let root = read_document(
            br#"<act:slots><slot><slot:value type="string">x</slot:value></slot></act:slots>"#
                as &[u8],
        )
        .unwrap();
        let err = decode_slots(&root, "account", "a1").unwrap_err();
        assert!(matches!(err, ParseError::MalformedDocument { .. }));
    }
}
