use rust_decimal::Decimal;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// A fatal load error. Every variant carries the entity kind and the
/// offending identifier so callers can locate the bad element in the
/// document.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The XML tokenizer rejected the input.
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A structurally required field is missing or unreadable.
    #[error("malformed {entity} '{guid}': {detail}")]
    MalformedDocument {
        entity: &'static str,
        guid: String,
        detail: String,
    },

    /// A numerator/denominator amount string did not parse.
    #[error("malformed amount '{text}' in {entity} '{guid}'")]
    MalformedAmount {
        entity: &'static str,
        guid: String,
        text: String,
    },

    #[error("unknown account type '{ty}' for account '{guid}'")]
    UnknownAccountType { guid: String, ty: String },

    #[error("unknown reconcile state '{state}' for split '{guid}'")]
    UnknownReconcileState { guid: String, state: String },

    /// An id reference with no matching entity in the book.
    #[error("{entity} '{guid}' references unknown {target_kind} '{target}'")]
    DanglingReference {
        entity: &'static str,
        guid: String,
        target_kind: &'static str,
        target: String,
    },

    /// No parentless ROOT-typed account to hang the tree on.
    #[error("book has no resolvable root account")]
    MissingRoot,
}

impl ParseError {
    pub(crate) fn malformed<D: ToString>(entity: &'static str, guid: &str, detail: D) -> ParseError {
        ParseError::MalformedDocument {
            entity,
            guid: guid.to_string(),
            detail: detail.to_string(),
        }
    }

    pub(crate) fn dangling(
        entity: &'static str,
        guid: &str,
        target_kind: &'static str,
        target: String,
    ) -> ParseError {
        ParseError::DanglingReference {
            entity,
            guid: guid.to_string(),
            target_kind,
            target,
        }
    }
}

/// A non-fatal finding. Real-world files contain these (legacy rounding
/// artifacts in particular), so they are collected and surfaced next to the
/// loaded book instead of aborting the load.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// A transaction whose splits do not sum to zero in the transaction
    /// currency.
    UnbalancedTransaction { guid: String, imbalance: Decimal },
}
