//! Core domain types
//!
//! Pure data structures and pure logic for the import pipeline - value
//! cells, field registries, and the mapping state. No I/O and no datastore
//! access happens here.

mod mapping;
mod schema;
mod value;
pub mod result;

pub use mapping::{normalize_header, FieldMapping, HeaderMatcher, MappingSet, SubstringMatcher};
pub use schema::{AliasEntry, Entity, ImportSpec, TargetField, Transform};
pub use value::{date_from_serial, parse_date, parse_decimal, CellValue, RawRow, TransformedRow};
