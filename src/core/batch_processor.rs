//! Wave-partitioned batch processing for concurrent replay
//!
//! This module provides the `BatchProcessor` struct, which applies a batch of
//! ledger operations concurrently while producing exactly the registry state a
//! sequential replay would.
//!
//! # Design
//!
//! Each operation declares the lock keys it touches (see
//! [`LedgerOperation::lock_keys`]). The batch is split into waves: an
//! operation is placed in the wave after the last wave that touched any of
//! its keys. Operations inside one wave touch disjoint keys, so they commute
//! and may run in parallel; waves run one after another.
//!
//! ```text
//! batch:  t(1->2)  d(3)  w(1)  c(4)  c(5)
//! wave 0: t(1->2)  d(3)  c(4)
//! wave 1: w(1)     c(5)
//! ```
//!
//! # Guarantees
//!
//! - Operations on the same account keep their input order
//! - Creates keep their input order, so registry insertion order is stable
//! - Every operation is applied exactly once, even if others fail

use std::collections::HashMap;

use crate::core::engine::LedgerEngine;
use crate::types::{LedgerError, LedgerOperation, LockKey};
use futures::future::join_all;
use tracing::{error, warn};

/// Result of applying a single operation
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The operation that was applied
    pub operation: LedgerOperation,

    /// The result of applying it
    pub result: Result<(), LedgerError>,
}

/// Batch processor with conflict-free wave partitioning
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    engine: LedgerEngine,
}

impl BatchProcessor {
    /// Create a new BatchProcessor over a shared engine
    pub fn new(engine: LedgerEngine) -> Self {
        Self { engine }
    }

    /// Split a batch into waves of mutually independent operations
    ///
    /// Each operation appears in exactly one wave. Within a wave, operations
    /// keep their relative input order.
    pub fn partition_into_waves(&self, batch: Vec<LedgerOperation>) -> Vec<Vec<LedgerOperation>> {
        let mut waves: Vec<Vec<LedgerOperation>> = Vec::new();
        let mut last_wave: HashMap<LockKey, usize> = HashMap::new();

        for operation in batch {
            let keys = operation.lock_keys();
            let wave = keys
                .iter()
                .filter_map(|key| last_wave.get(key))
                .max()
                .map_or(0, |w| w + 1);

            for key in keys {
                last_wave.insert(key, wave);
            }
            if wave == waves.len() {
                waves.push(Vec::new());
            }
            waves[wave].push(operation);
        }

        waves
    }

    /// Apply one wave, every operation as its own task
    ///
    /// Results are returned in the wave's order.
    pub async fn process_wave(&self, wave: Vec<LedgerOperation>) -> Vec<ProcessingResult> {
        let tasks = wave.into_iter().map(|operation| {
            let engine = self.engine.clone();
            tokio::spawn(async move {
                let result = engine.apply(&operation);
                ProcessingResult { operation, result }
            })
        });

        let mut results = Vec::new();
        for joined in join_all(tasks).await {
            match joined {
                Ok(processed) => results.push(processed),
                Err(e) => error!(error = %e, "operation task panicked"),
            }
        }

        results
    }

    /// Apply a batch wave by wave
    ///
    /// Rejected operations are logged at `warn` and reported in the results;
    /// they never stop the batch.
    pub async fn process_batch(&self, batch: Vec<LedgerOperation>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(batch.len());

        for wave in self.partition_into_waves(batch) {
            for processed in self.process_wave(wave).await {
                if let Err(e) = &processed.result {
                    warn!(operation = processed.operation.name(), error = %e, "operation rejected");
                }
                results.push(processed);
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Account;
    use rust_decimal::Decimal;

    fn processor() -> BatchProcessor {
        let engine = LedgerEngine::new();
        engine
            .seed(vec![
                Account::new(1, "ACC-001", "Alice", Decimal::new(100, 0)),
                Account::new(2, "ACC-002", "Bob", Decimal::new(100, 0)),
                Account::new(3, "ACC-003", "Carol", Decimal::new(100, 0)),
            ])
            .unwrap();
        BatchProcessor::new(engine)
    }

    fn deposit(id: i64, amount: i64) -> LedgerOperation {
        LedgerOperation::Deposit {
            id,
            amount: Decimal::new(amount, 0),
            tx_type: "Credit".to_string(),
        }
    }

    fn withdraw(id: i64, amount: i64) -> LedgerOperation {
        LedgerOperation::Withdraw {
            id,
            amount: Decimal::new(amount, 0),
            tx_type: "Debit".to_string(),
        }
    }

    fn transfer(from: i64, to: i64, amount: i64) -> LedgerOperation {
        LedgerOperation::Transfer {
            from,
            to,
            amount: Decimal::new(amount, 0),
        }
    }

    fn create(id: i64) -> LedgerOperation {
        LedgerOperation::Create(Account::new(id, format!("ACC-{id}"), "New", Decimal::ZERO))
    }

    #[test]
    fn test_partition_empty_batch() {
        let waves = processor().partition_into_waves(vec![]);

        assert!(waves.is_empty());
    }

    #[test]
    fn test_partition_independent_operations_share_a_wave() {
        let waves =
            processor().partition_into_waves(vec![deposit(1, 1), deposit(2, 1), deposit(3, 1)]);

        assert_eq!(waves.len(), 1);
        assert_eq!(waves[0].len(), 3);
    }

    #[test]
    fn test_partition_same_account_is_sequential() {
        let waves =
            processor().partition_into_waves(vec![deposit(1, 1), withdraw(1, 1), deposit(1, 2)]);

        assert_eq!(waves.len(), 3);
        assert_eq!(waves[0], vec![deposit(1, 1)]);
        assert_eq!(waves[1], vec![withdraw(1, 1)]);
        assert_eq!(waves[2], vec![deposit(1, 2)]);
    }

    #[test]
    fn test_partition_matches_documented_example() {
        let waves = processor().partition_into_waves(vec![
            transfer(1, 2, 5),
            deposit(3, 1),
            withdraw(1, 1),
            create(4),
            create(5),
        ]);

        assert_eq!(waves.len(), 2);
        assert_eq!(waves[0], vec![transfer(1, 2, 5), deposit(3, 1), create(4)]);
        assert_eq!(waves[1], vec![withdraw(1, 1), create(5)]);
    }

    #[test]
    fn test_partition_transfer_waits_for_both_accounts() {
        let waves = processor().partition_into_waves(vec![
            deposit(1, 1),
            deposit(2, 1),
            deposit(2, 1),
            transfer(1, 2, 1),
        ]);

        assert_eq!(waves.len(), 3);
        assert_eq!(waves[2], vec![transfer(1, 2, 1)]);
    }

    #[test]
    fn test_partition_preserves_every_operation() {
        let batch = vec![
            transfer(1, 2, 1),
            transfer(2, 3, 1),
            transfer(3, 1, 1),
            deposit(2, 4),
            create(9),
            LedgerOperation::Delete { id: 9 },
        ];

        let waves = processor().partition_into_waves(batch.clone());

        let total: usize = waves.iter().map(Vec::len).sum();
        assert_eq!(total, batch.len());
        for op in &batch {
            assert!(waves.iter().any(|wave| wave.contains(op)));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_process_batch_matches_sequential_replay() {
        let batch = vec![
            transfer(1, 2, 60),
            withdraw(1, 50), // fails: 40 left
            deposit(3, 25),
            transfer(2, 3, 160),
            withdraw(1, 40),
            create(4),
            transfer(3, 4, 285),
        ];

        let concurrent = processor();
        let results = concurrent.process_batch(batch.clone()).await;

        let sequential = processor();
        for op in &batch {
            let _ = sequential.engine.apply(op);
        }

        assert_eq!(results.len(), batch.len());
        assert_eq!(results.iter().filter(|r| r.result.is_err()).count(), 1);
        assert_eq!(
            concurrent.engine.accounts().unwrap(),
            sequential.engine.accounts().unwrap()
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_process_batch_concurrent_deposits() {
        let processor = processor();
        processor
            .engine
            .seed(vec![Account::new(1, "ACC-001", "Alice", Decimal::ZERO)])
            .unwrap();

        let results = processor.process_batch(vec![deposit(1, 50); 10]).await;

        assert!(results.iter().all(|r| r.result.is_ok()));
        assert_eq!(
            processor.engine.registry().get_by_id(1).unwrap().balance,
            Decimal::new(500, 0)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_process_wave_runs_disjoint_operations() {
        let processor = processor();

        let results = processor
            .process_wave(vec![deposit(1, 1), deposit(2, 2), deposit(3, 3)])
            .await;

        assert_eq!(results.len(), 3);
        let accounts = processor.engine.accounts().unwrap();
        assert_eq!(accounts[0].balance, Decimal::new(101, 0));
        assert_eq!(accounts[1].balance, Decimal::new(102, 0));
        assert_eq!(accounts[2].balance, Decimal::new(103, 0));
    }
}
