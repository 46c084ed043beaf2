//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, output serialization)
//! - `sync_reader` - Synchronous operation reader with iterator interface, seed loader
//! - `async_reader` - Asynchronous operation reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{
    convert_account_record, convert_operation_record, read_accounts_csv, write_accounts_csv,
    AccountCsvRecord, OperationCsvRecord,
};
pub use sync_reader::{load_accounts, SyncReader};
