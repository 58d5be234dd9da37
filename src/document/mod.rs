//! The rule document language: data model, parser and serializer.
//!
//! Rules persist as UTF-8 text documents whose root object is always a
//! `Rule`. The [`parse`]/[`write`] pair round-trips any document built
//! from the strict value grammar; expressions outside it survive as
//! verbatim text.

mod lexer;
mod parser;
pub mod value;
mod writer;

pub use parser::parse;
pub use value::{Document, Import, Node, PropertyRef, RawExpr, Value};
pub use writer::write;
