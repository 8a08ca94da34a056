//! Layout reconstruction: decoded pages in, [`Document`](crate::model::Document) out.

mod document_parser;
mod layout;
mod options;
mod source;
mod tables;

pub use document_parser::DocumentParser;
pub use layout::{WordClusterer, LINE_GAP, SECTION_GAP};
pub use options::{EdgeStrategy, PageSelection, ParseOptions, TableSettings};
pub use source::{JsonSource, PageSource};
pub use tables::{
    apply_header_row, tables_with_keyword, TableHeaderMode, TableNormalizer, MIN_COLUMNS,
    MIN_ROWS,
};
