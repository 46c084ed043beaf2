//! Asynchronous batch processing strategy
//!
//! Multi-threaded replay: operations are read in batches and each batch is
//! applied by a `BatchProcessor`, which runs independent operations as
//! concurrent tokio tasks.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (wave partitioning + tasks)
//!     └── LedgerEngine
//!         └── AccountRegistry (RwLock over the account list)
//! ```
//!
//! Batches run one after another, so an account's operations keep file order
//! across batch boundaries. The final state equals a sequential replay.

use crate::core::{BatchProcessor, LedgerEngine};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_accounts_csv;
use crate::strategy::ProcessingStrategy;
use crate::types::{Account, LedgerError};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default number of operations per batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_concurrent: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// A zero value is replaced by its default with a warning.
    pub fn new(batch_size: usize, max_concurrent: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                requested = batch_size,
                default = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent = if max_concurrent == 0 {
            warn!(
                requested = max_concurrent,
                default = default.max_concurrent,
                "invalid max concurrency, using default"
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self {
            batch_size,
            max_concurrent,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// Produces byte-identical output to [`SyncProcessingStrategy`](super::SyncProcessingStrategy)
/// for the same input.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy with the specified configuration
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// The active batch configuration
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(
        &self,
        accounts: Vec<Account>,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent)
            .build()
            .map_err(|e| LedgerError::IoError {
                message: format!("Failed to create tokio runtime: {e}"),
            })?;

        runtime.block_on(async {
            let engine = LedgerEngine::new();
            engine.seed(accounts)?;
            let processor = BatchProcessor::new(engine.clone());

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => LedgerError::FileNotFound {
                        path: input_path.display().to_string(),
                    },
                    _ => LedgerError::IoError {
                        message: format!("Failed to open file '{}': {}", input_path.display(), e),
                    },
                })?;
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut applied = 0usize;
            let mut rejected = 0usize;
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }
                debug!(size = batch.len(), "processing batch");

                for processed in processor.process_batch(batch).await {
                    if processed.result.is_ok() {
                        applied += 1;
                    } else {
                        rejected += 1;
                    }
                }
            }
            info!(applied, rejected, "replay finished");

            let accounts = engine.accounts()?;
            write_accounts_csv(&accounts, output)?;

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::SyncProcessingStrategy;
    use rstest::rstest;
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

    fn seed() -> Vec<Account> {
        vec![
            Account::new(1, "ACC-001", "Alice", Decimal::new(100000, 2)),
            Account::new(2, "ACC-002", "Bob", Decimal::new(50000, 2)),
            Account::new(3, "ACC-003", "Carol", Decimal::ZERO),
        ]
    }

    #[rstest]
    #[case(0, 4, DEFAULT_BATCH_SIZE, 4)]
    #[case(10, 2, 10, 2)]
    fn test_batch_config_new(
        #[case] batch_size: usize,
        #[case] max_concurrent: usize,
        #[case] expected_batch: usize,
        #[case] expected_concurrent: usize,
    ) {
        let config = BatchConfig::new(batch_size, max_concurrent);

        assert_eq!(config.batch_size, expected_batch);
        assert_eq!(config.max_concurrent, expected_concurrent);
    }

    #[test]
    fn test_batch_config_zero_concurrency_falls_back() {
        let config = BatchConfig::new(5, 0);

        assert_eq!(config.max_concurrent, num_cpus::get());
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let strategy = AsyncProcessingStrategy::new(BatchConfig::default());
        let mut output = Vec::new();

        let result = strategy.process(seed(), Path::new("nonexistent.csv"), &mut output);

        assert!(matches!(result, Err(LedgerError::FileNotFound { .. })));
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(1000)]
    fn test_async_strategy_matches_sync_across_batch_sizes(#[case] batch_size: usize) {
        let file = create_temp_csv(
            "op,id,to,amount,accountNumber,holderName,txType\n\
             transfer,1,2,100\n\
             transfer,2,3,250.50\n\
             withdraw,3,,300\n\
             create,4,,10,ACC-004,Dave\n\
             deposit,4,,5\n\
             transfer,3,1,250.50\n\
             delete,2\n\
             deposit,2,,1\n\
             create,5,,0,ACC-005,Erin\n\
             transfer,1,5,1\n",
        );

        let mut sync_output = Vec::new();
        SyncProcessingStrategy
            .process(seed(), file.path(), &mut sync_output)
            .unwrap();

        let mut async_output = Vec::new();
        AsyncProcessingStrategy::new(BatchConfig::new(batch_size, 4))
            .process(seed(), file.path(), &mut async_output)
            .unwrap();

        assert_eq!(
            String::from_utf8(async_output).unwrap(),
            String::from_utf8(sync_output).unwrap()
        );
    }

    #[test]
    fn test_async_strategy_maintains_ordering_across_batches() {
        let file = create_temp_csv(
            "op,id,to,amount\n\
             withdraw,3,,1\n\
             deposit,3,,30\n\
             withdraw,3,,20\n\
             withdraw,3,,20\n",
        );

        let mut output = Vec::new();
        AsyncProcessingStrategy::new(BatchConfig::new(1, 2))
            .process(seed(), file.path(), &mut output)
            .unwrap();

        let output = String::from_utf8(output).unwrap();
        let carol = output.lines().find(|line| line.starts_with("3,")).unwrap();
        assert_eq!(carol, "3,ACC-003,Carol,10");
    }
}
