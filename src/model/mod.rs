//! Document model types.
//!
//! Two layers live here: the raw types handed over by the decoder
//! ([`RawDocument`], [`RawPage`], [`RawTable`], [`Word`]) and the
//! reconstructed view built from them ([`Document`], [`Page`], [`Table`],
//! [`Line`], [`Section`]).

mod document;
mod page;
mod table;
mod word;

pub use document::{parse_pdf_date, parse_text_date, Document, Metadata, RawDocument, PAGE_SEPARATOR};
pub use page::{ImageRef, Page, RawPage};
pub use table::{RawTable, Table, TableRow};
pub use word::{BBox, Line, Section, Word};
