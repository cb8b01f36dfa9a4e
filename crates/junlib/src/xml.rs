//! XML tree model, parser, writer and tree queries

pub(crate) mod cursor;
pub mod model;
pub mod parser;
pub mod query;
pub mod writer;

pub use model::{Content, Descendants, Document, Element};
pub use parser::Parser;
pub use query::AttributeMatch;
