//! Transaction-related types for the bank ledger
//!
//! This module defines account identifiers, the credit/debit transaction
//! type convention, the operations the driver replays against a registry,
//! and the transfer request accepted from the request-handling layer.

use super::account::Account;
use super::error::LedgerError;
use rust_decimal::Decimal;

/// Account identifier, assigned by the caller
pub type AccountId = i64;

/// Transaction type that every deposit defaults to
pub const CREDIT: &str = "Credit";

/// Transaction type that every withdrawal defaults to
pub const DEBIT: &str = "Debit";

/// Smallest amount a transfer request may carry
pub const MIN_TRANSFER_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Whether `tx_type` names a credit operation
///
/// Matches any type whose name ends with "Credit", ignoring case, so
/// "Credit", "cardCredit" and "WIRE_CREDIT" all qualify.
pub fn denotes_credit(tx_type: &str) -> bool {
    ends_with_ignore_case(tx_type, CREDIT)
}

/// Whether `tx_type` names a debit operation
pub fn denotes_debit(tx_type: &str) -> bool {
    ends_with_ignore_case(tx_type, DEBIT)
}

fn ends_with_ignore_case(value: &str, suffix: &str) -> bool {
    value.len() >= suffix.len()
        && value.is_char_boundary(value.len() - suffix.len())
        && value[value.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// One ledger operation as replayed by the driver
///
/// Each variant maps to exactly one registry call.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerOperation {
    /// Insert a new account
    Create(Account),

    /// Overwrite number, holder and balance of an existing account
    Update(Account),

    /// Remove an account by id
    Delete { id: AccountId },

    /// Credit an account
    Deposit {
        id: AccountId,
        amount: Decimal,
        tx_type: String,
    },

    /// Debit an account
    Withdraw {
        id: AccountId,
        amount: Decimal,
        tx_type: String,
    },

    /// Move funds between two accounts (possibly the same one)
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    },
}

/// Key an operation must hold exclusively while it runs
///
/// Operations whose key sets are disjoint may run concurrently without
/// changing the final registry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockKey {
    /// A single account, by id
    Account(AccountId),
    /// The insertion order of the registry
    Ordering,
}

impl LedgerOperation {
    /// Name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            LedgerOperation::Create(_) => "create",
            LedgerOperation::Update(_) => "update",
            LedgerOperation::Delete { .. } => "delete",
            LedgerOperation::Deposit { .. } => "deposit",
            LedgerOperation::Withdraw { .. } => "withdraw",
            LedgerOperation::Transfer { .. } => "transfer",
        }
    }

    /// Keys this operation touches
    ///
    /// `create` appends to the registry, so it also claims the ordering
    /// key; two creates never share a wave and insertion order stays the
    /// input order.
    pub fn lock_keys(&self) -> Vec<LockKey> {
        match self {
            LedgerOperation::Create(account) => {
                vec![LockKey::Account(account.id), LockKey::Ordering]
            }
            LedgerOperation::Update(account) => vec![LockKey::Account(account.id)],
            LedgerOperation::Delete { id }
            | LedgerOperation::Deposit { id, .. }
            | LedgerOperation::Withdraw { id, .. } => vec![LockKey::Account(*id)],
            LedgerOperation::Transfer { from, to, .. } if from == to => {
                vec![LockKey::Account(*from)]
            }
            LedgerOperation::Transfer { from, to, .. } => {
                vec![LockKey::Account(*from), LockKey::Account(*to)]
            }
        }
    }
}

/// Transfer request as accepted from the request-handling layer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Decimal,
}

impl TransferRequest {
    /// Check the request's shape before it reaches the registry
    ///
    /// Both ids must be positive and the amount must be at least
    /// [`MIN_TRANSFER_AMOUNT`].
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.from_account_id <= 0 {
            return Err(LedgerError::invalid_request(format!(
                "fromAccountId must be positive, got {}",
                self.from_account_id
            )));
        }
        if self.to_account_id <= 0 {
            return Err(LedgerError::invalid_request(format!(
                "toAccountId must be positive, got {}",
                self.to_account_id
            )));
        }
        if self.amount < MIN_TRANSFER_AMOUNT {
            return Err(LedgerError::invalid_amount(self.amount, "transfer"));
        }
        Ok(())
    }

    /// Convert into the operation the engine applies
    pub fn into_operation(self) -> LedgerOperation {
        LedgerOperation::Transfer {
            from: self.from_account_id,
            to: self.to_account_id,
            amount: self.amount,
        }
    }
}
