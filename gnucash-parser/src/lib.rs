//! Loader for GnuCash `gnc-v2` XML exports.
//!
//! The input is an uncompressed XML document (callers unzip `.gnucash.gz`
//! files themselves); the output is a fully cross-referenced
//! [`gnucash_core::Book`] plus any non-fatal findings. Loading is a single
//! synchronous pass over the document followed by a reference-resolution
//! pass, and the returned graph is immutable and safe to share across
//! threads.
//!
//! ```no_run
//! let xml = std::fs::read_to_string("ledger.gnucash").unwrap();
//! let load = gnucash_parser::parse_str(&xml).unwrap();
//! for (account, _children, splits) in load.book.walk() {
//!     println!("{} ({} splits)", account.fullname, splits.len());
//! }
//! ```

use std::io::BufRead;

use tracing::debug;

use gnucash_core::Book;

pub use error::{ParseError, ParseResult, Warning};
pub use numeric::{format_numeric, parse_numeric};
pub use tree::Elem;

pub mod error;
pub mod tree;

mod mappers;
mod numeric;
mod resolve;
mod slots;

/// A successfully loaded book together with the non-fatal findings
/// collected while linking it (unbalanced transactions in particular).
#[derive(Debug)]
pub struct Load {
    pub book: Book,
    pub warnings: Vec<Warning>,
}

/// Loads a book from an XML string.
pub fn parse_str(input: &str) -> ParseResult<Load> {
    parse_reader(input.as_bytes())
}

/// Loads a book from a buffered reader of uncompressed XML bytes.
pub fn parse_reader<R: BufRead>(reader: R) -> ParseResult<Load> {
    let root = tree::read_document(reader)?;
    parse_tree(&root)
}

/// Loads a book from an already-built element tree. The root may be the
/// usual `gnc-v2` wrapper or a bare `gnc:book` element.
pub fn parse_tree(root: &Elem) -> ParseResult<Load> {
    let book_el = if root.tag == "gnc:book" {
        root
    } else {
        root.child("gnc:book").ok_or_else(|| {
            ParseError::malformed("document", "", "no gnc:book element")
        })?
    };
    debug!(root = %root.tag, "mapping gnc:book");
    let raw = mappers::book(book_el)?;
    let (book, warnings) = resolve::link(raw)?;
    Ok(Load { book, warnings })
}
