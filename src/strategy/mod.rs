//! Processing strategy module for ledger replay
//!
//! This module defines the Strategy pattern for the complete replay pipeline:
//! seed the registry, read operations from CSV, apply them, write the final
//! accounts. Different implementations (synchronous, asynchronous batch) can
//! be selected at runtime and must produce identical output.

use crate::cli::StrategyType;
use crate::types::{Account, LedgerError};
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete replay pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Replay operations from `input_path` on a registry seeded with `accounts`
    ///
    /// Writes the final accounts as CSV to `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened (file not found, permission denied)
    /// - The seed accounts are rejected by the registry
    /// - Output cannot be written
    ///
    /// Individual operation failures are logged and do not cause this method
    /// to return an error.
    fn process(
        &self,
        accounts: Vec<Account>,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), LedgerError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// `config` is only used by the async strategy; `None` means defaults.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
