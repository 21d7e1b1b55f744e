//! `field:value` filter expressions and listing order for sessions

pub mod apply;
pub mod ast;
pub mod parser;
pub mod sort;

pub use apply::{apply_filters, matches_filter};
pub use ast::{FieldFilter, FilterExpr, FilterField, FilterOperator};
pub use parser::parse_filter;
pub use sort::{SortKey, sort_sessions};
