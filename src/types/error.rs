//! Error types for the bank ledger
//!
//! This module defines every error that can occur while mutating accounts,
//! looking them up in the registry, or reading and writing ledger files.
//!
//! # Error Categories
//!
//! - **Lookup Errors**: the requested account id does not exist
//! - **Validation Errors**: non-positive amounts, wrong transaction type, malformed requests
//! - **Balance Errors**: insufficient funds, arithmetic overflow
//! - **Infrastructure Errors**: file I/O, CSV parsing, poisoned locks
//!
//! The request-handling layer classifies errors with [`LedgerError::kind`] and
//! shows users only [`LedgerError::public_message`].

use super::transaction::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger
///
/// Every variant is a local, recoverable failure of a single call; none is
/// fatal to the process on its own.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// No account with the given id exists in the registry
    #[error("Account {id} not found")]
    AccountNotFound {
        /// The id that was looked up
        id: AccountId,
    },

    /// Amount is zero, negative, or otherwise unusable for the operation
    #[error("Invalid amount {amount} for {operation}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// Operation that rejected it
        operation: String,
    },

    /// Transaction type does not denote the kind the operation requires
    #[error("Invalid transaction type '{tx_type}', expected a {expected} type")]
    InvalidTransactionType {
        /// The transaction type supplied by the caller
        tx_type: String,
        /// Required kind ("Credit" or "Debit")
        expected: String,
    },

    /// Requested amount exceeds the account balance
    ///
    /// The account is left unchanged.
    #[error("Insufficient funds for account {id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account id
        id: AccountId,
        /// Balance at the time of the request
        balance: Decimal,
        /// Requested amount
        requested: Decimal,
    },

    /// A request failed shape validation before reaching the registry
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Human-readable reason
        message: String,
    },

    /// Crediting an account would overflow the decimal range
    #[error("Arithmetic overflow in {operation} for account {id}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account id
        id: AccountId,
    },

    /// A thread panicked while holding a registry lock
    #[error("Registry lock poisoned during {operation}")]
    LockPoisoned {
        /// Operation that found the poisoned lock
        operation: String,
    },

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing or record conversion error
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

/// Coarse classification used by the request-handling layer
///
/// Maps one-to-one onto response classes: not found, bad request, and
/// internal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    Internal,
}

impl LedgerError {
    /// Classify this error for the caller
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::AccountNotFound { .. } => ErrorKind::NotFound,
            LedgerError::InvalidAmount { .. }
            | LedgerError::InvalidTransactionType { .. }
            | LedgerError::InsufficientFunds { .. }
            | LedgerError::InvalidRequest { .. } => ErrorKind::BadRequest,
            LedgerError::ArithmeticOverflow { .. }
            | LedgerError::LockPoisoned { .. }
            | LedgerError::FileNotFound { .. }
            | LedgerError::IoError { .. }
            | LedgerError::ParseError { .. } => ErrorKind::Internal,
        }
    }

    /// Message safe to show to an end user
    ///
    /// Internal failures collapse to a generic message so that paths, lock
    /// state and parser details never leak.
    pub fn public_message(&self) -> String {
        match self {
            LedgerError::InsufficientFunds { .. } => "Insufficient funds.".to_string(),
            other => match other.kind() {
                ErrorKind::NotFound | ErrorKind::BadRequest => other.to_string(),
                ErrorKind::Internal => "Internal error.".to_string(),
            },
        }
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an AccountNotFound error
    pub fn account_not_found(id: AccountId) -> Self {
        LedgerError::AccountNotFound { id }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, operation: &str) -> Self {
        LedgerError::InvalidAmount {
            amount,
            operation: operation.to_string(),
        }
    }

    /// Create an InvalidTransactionType error
    pub fn invalid_transaction_type(tx_type: &str, expected: &str) -> Self {
        LedgerError::InvalidTransactionType {
            tx_type: tx_type.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(id: AccountId, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            id,
            balance,
            requested,
        }
    }

    /// Create an InvalidRequest error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        LedgerError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, id: AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            id,
        }
    }

    /// Create a LockPoisoned error
    pub fn lock_poisoned(operation: &str) -> Self {
        LedgerError::LockPoisoned {
            operation: operation.to_string(),
        }
    }

    /// Create a ParseError without line information
    pub fn parse(message: impl Into<String>) -> Self {
        LedgerError::ParseError {
            line: None,
            message: message.into(),
        }
    }
}
