//! Ledger operation engine
//!
//! This module provides the LedgerEngine that applies parsed ledger operations
//! to a shared AccountRegistry. It is the request-handling layer's view of the
//! registry: one operation in, one registry call, one result out.

use crate::core::registry::AccountRegistry;
use crate::types::{Account, LedgerError, LedgerOperation, TransferRequest};
use std::sync::Arc;
use tracing::warn;

/// Ledger operation engine
///
/// Holds the registry behind an `Arc`, so clones of the engine (or of the
/// registry handle) can be used from many tasks at once.
#[derive(Debug, Clone)]
pub struct LedgerEngine {
    registry: Arc<AccountRegistry>,
}

impl LedgerEngine {
    /// Create an engine over an empty registry
    pub fn new() -> Self {
        Self::with_registry(Arc::new(AccountRegistry::new()))
    }

    /// Create an engine over an existing registry
    pub fn with_registry(registry: Arc<AccountRegistry>) -> Self {
        LedgerEngine { registry }
    }

    /// Shared handle to the underlying registry
    pub fn registry(&self) -> &Arc<AccountRegistry> {
        &self.registry
    }

    /// Replace the registry contents with `accounts`
    pub fn seed(&self, accounts: Vec<Account>) -> Result<(), LedgerError> {
        self.registry.initialize_all(accounts)
    }

    /// Apply a single operation
    ///
    /// Routes the operation to the matching registry call and returns its
    /// result unchanged.
    pub fn apply(&self, operation: &LedgerOperation) -> Result<(), LedgerError> {
        match operation {
            LedgerOperation::Create(account) => self.registry.create(account.clone()),
            LedgerOperation::Update(account) => self.registry.update(account.clone()),
            LedgerOperation::Delete { id } => self.registry.delete(*id),
            LedgerOperation::Deposit {
                id,
                amount,
                tx_type,
            } => self.registry.deposit(*id, *amount, tx_type),
            LedgerOperation::Withdraw {
                id,
                amount,
                tx_type,
            } => self.registry.withdraw(*id, *amount, tx_type),
            LedgerOperation::Transfer { from, to, amount } => {
                self.registry.transfer_funds(*from, *to, *amount)
            }
        }
    }

    /// Apply an operation, logging a rejection instead of returning it
    ///
    /// Returns whether the operation was committed.
    pub fn apply_logged(&self, operation: &LedgerOperation) -> bool {
        match self.apply(operation) {
            Ok(()) => true,
            Err(e) => {
                warn!(operation = operation.name(), error = %e, "operation rejected");
                false
            }
        }
    }

    /// Validate and apply a transfer request
    ///
    /// Shape errors (`InvalidRequest`, or an amount below the minimum) are
    /// returned before the registry is touched.
    pub fn transfer(&self, request: TransferRequest) -> Result<(), LedgerError> {
        request.validate()?;
        self.apply(&request.into_operation())
    }

    /// Final account states in registry order
    pub fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        self.registry.get_all()
    }
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new()
    }
}
