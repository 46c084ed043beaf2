//! Synchronous processing strategy
//!
//! Single-threaded replay: a `SyncReader` streams operations one row at a
//! time and a `LedgerEngine` applies each in file order.
//!
//! # Memory Efficiency
//!
//! Operations are never buffered; memory use is O(accounts), not
//! O(operations).

use crate::core::LedgerEngine;
use crate::io::csv_format::write_accounts_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::{Account, LedgerError};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use bank_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = io::stdout();
///
/// strategy.process(Vec::new(), Path::new("operations.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        accounts: Vec<Account>,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), LedgerError> {
        let engine = LedgerEngine::new();
        engine.seed(accounts)?;

        let reader = SyncReader::new(input_path)?;

        let mut applied = 0usize;
        let mut rejected = 0usize;
        for result in reader {
            match result {
                Ok(operation) => {
                    if engine.apply_logged(&operation) {
                        applied += 1;
                    } else {
                        rejected += 1;
                    }
                }
                Err(e) => warn!(error = %e, "skipping operation row"),
            }
        }
        info!(applied, rejected, "replay finished");

        let accounts = engine.accounts()?;
        write_accounts_csv(&accounts, output)?;

        Ok(())
    }
}
