//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over ledger operations from a CSV file, and
//! a loader for seed account files. Delegates CSV format concerns to the
//! csv_format module.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<LedgerOperation, LedgerError>` for each CSV row:
//!
//! ```no_run
//! use bank_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("operations.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(operation) => println!("Applying: {:?}", operation),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row errors are yielded as Err variants in the iterator
//! - Line numbers are included in error messages for debugging

use crate::io::csv_format::{convert_operation_record, read_accounts_csv, OperationCsvRecord};
use crate::types::{Account, LedgerError, LedgerOperation};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader over ledger operations
///
/// Reads one row at a time; memory use does not grow with file size.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    headers: csv::StringRecord,
    line_num: u64,
}

impl SyncReader {
    /// Open an operations CSV file
    ///
    /// The CSV reader trims whitespace from all fields and accepts rows with
    /// fewer columns than the header, so trailing optional columns may be
    /// omitted.
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let file = open_file(path)?;

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);
        let headers = reader.headers()?.clone();

        Ok(Self {
            reader,
            headers,
            line_num: 1,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<LedgerOperation, LedgerError>;

    /// Get the next operation from the CSV file
    ///
    /// Returns `None` at end of file. Parse and conversion failures are
    /// tagged with the line they came from.
    fn next(&mut self) -> Option<Self::Item> {
        let mut record = csv::StringRecord::new();

        match self.reader.read_record(&mut record) {
            Ok(false) => None,
            Ok(true) => {
                self.line_num = record
                    .position()
                    .map(|pos| pos.line())
                    .unwrap_or(self.line_num + 1);
                let line = self.line_num;

                let result = record
                    .deserialize::<OperationCsvRecord>(Some(&self.headers))
                    .map_err(LedgerError::from)
                    .and_then(convert_operation_record)
                    .map_err(|e| with_line(e, line));

                Some(result)
            }
            Err(e) => {
                self.line_num += 1;
                Some(Err(e.into()))
            }
        }
    }
}

/// Load seed accounts from a CSV file
///
/// Malformed rows are logged and skipped.
pub fn load_accounts(path: &Path) -> Result<Vec<Account>, LedgerError> {
    let file = open_file(path)?;
    read_accounts_csv(file)
}

fn open_file(path: &Path) -> Result<File, LedgerError> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LedgerError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => LedgerError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        },
    })
}

fn with_line(error: LedgerError, line: u64) -> LedgerError {
    match error {
        LedgerError::ParseError { line: None, message } => LedgerError::ParseError {
            line: Some(line),
            message,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    const HEADER: &str = "op,id,to,amount,accountNumber,holderName,txType\n";

    #[test]
    fn test_reads_operations_in_order() {
        let file = create_temp_csv(&format!(
            "{HEADER}deposit,1,,100.0\nwithdraw,1,,25\ntransfer,1,2,10.50\ndelete,2\n"
        ));

        let operations: Vec<LedgerOperation> = SyncReader::new(file.path())
            .unwrap()
            .map(Result::unwrap)
            .collect();

        assert_eq!(operations.len(), 4);
        assert_eq!(
            operations[2],
            LedgerOperation::Transfer {
                from: 1,
                to: 2,
                amount: Decimal::new(1050, 2)
            }
        );
        assert_eq!(operations[3], LedgerOperation::Delete { id: 2 });
    }

    #[test]
    fn test_bad_row_yields_error_with_line_and_continues() {
        let file = create_temp_csv(&format!("{HEADER}deposit,1,,10\nrefund,1,,5\ndeposit,1,,7\n"));

        let results: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(LedgerError::ParseError { line: Some(3), .. })
        ));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_whitespace_and_case_are_tolerated() {
        let file = create_temp_csv(&format!("{HEADER}  DEPOSIT , 1 , , 100.0 \n"));

        let operations: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(operations.len(), 1);
        assert!(operations[0].is_ok());
    }

    #[test]
    fn test_missing_file() {
        let result = SyncReader::new(Path::new("does/not/exist.csv"));

        assert!(matches!(result, Err(LedgerError::FileNotFound { .. })));
    }

    #[test]
    fn test_load_accounts() {
        let file = create_temp_csv(
            "id,accountNumber,holderName,balance\n1,ACC-001,Alice,1000.00\n2,ACC-002,Bob,0\n",
        );

        let accounts = load_accounts(file.path()).unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].holder_name, "Alice");
        assert_eq!(accounts[0].balance, Decimal::new(100000, 2));
    }

    #[test]
    fn test_load_accounts_missing_file() {
        let result = load_accounts(Path::new("does/not/exist.csv"));

        assert!(matches!(result, Err(LedgerError::FileNotFound { .. })));
    }
}
