//! Bank Ledger Library
//! # Overview
//!
//! This library provides a thread-safe in-memory account registry with
//! balance-changing operations, plus a CSV replay driver with a sync and an
//! async strategy.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, LedgerOperation, LedgerError, etc.)
//! - [`core`] - Business logic components:
//!   - [`core::registry`] - Thread-safe account storage and transfers
//!   - [`core::engine`] - Operation dispatch on a shared registry
//!   - [`core::batch_processor`] - Concurrent wave-based batch replay
//! - [`io`] - CSV readers and writers
//! - [`strategy`] - Pluggable replay pipelines
//! - [`cli`] - CLI arguments parsing
//! - [`observability`] - Logging setup
//!
//! # Operations
//!
//! - **Create / Update / Delete**: Manage account records
//! - **Deposit**: Credit funds (transaction type must denote a credit)
//! - **Withdraw**: Debit funds (transaction type must denote a debit, balance must cover it)
//! - **Transfer**: Move funds between two accounts atomically
//!
//! Balances never go negative, and a transfer either fully applies or leaves
//! both accounts untouched.

pub mod cli;
pub mod core;
pub mod io;
pub mod observability;
pub mod strategy;
pub mod types;

pub use core::{AccountRegistry, LedgerEngine};
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountId, ErrorKind, LedgerError, LedgerOperation, TransferRequest,
};
