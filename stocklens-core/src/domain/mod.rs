//! Domain types: raw and cleaned price records.

pub mod record;
pub mod timestamp;

pub use record::{CleanedRecord, CleanedTable, RawRecord, RawTable, Shape};
pub use timestamp::{format_timestamp, parse_timestamp};
