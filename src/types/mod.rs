//! Types module
//!
//! Contains core data structures used throughout the ledger.
//! This module organizes types into logical submodules:
//! - `account`: the Account entity and its balance rules
//! - `transaction`: identifiers, transaction types and ledger operations
//! - `error`: Error types for the ledger

pub mod account;
pub mod error;
pub mod transaction;

pub use account::Account;
pub use error::{ErrorKind, LedgerError};
pub use transaction::{
    denotes_credit, denotes_debit, AccountId, LedgerOperation, LockKey, TransferRequest, CREDIT,
    DEBIT, MIN_TRANSFER_AMOUNT,
};
