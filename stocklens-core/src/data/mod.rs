//! Raw ingestion and cleaned-table persistence

pub mod ingest;
pub mod schema;
pub mod writer;

pub use ingest::{raw_table_from_frame, read_raw_csv, DataError};
pub use schema::{RawSchema, SchemaError, CLEANED_COLUMNS, PRICE_COLUMNS, RAW_COLUMNS};
pub use writer::{cleaned_file_name, write_atomic, CleanedTableWriter, TableMeta};
