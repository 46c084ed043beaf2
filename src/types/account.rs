//! Account entity for the bank ledger
//!
//! This module defines the Account structure and the balance-mutation rules
//! every ledger operation goes through: deposit, withdraw and transfer.
//!
//! Every method validates completely before it writes, so a failed call
//! leaves the account exactly as it was.

use super::error::LedgerError;
use super::transaction::{denotes_credit, denotes_debit, AccountId, CREDIT, DEBIT};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single bank account
///
/// Serializes as `{id, accountNumber, holderName, balance}`, the external
/// representation handed to the request-handling layer. The balance is an
/// exact decimal and serializes as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Caller-assigned identifier
    pub id: AccountId,

    /// Display account number (not required to be unique)
    pub account_number: String,

    /// Display name of the account holder
    pub holder_name: String,

    /// Current balance
    ///
    /// Never negative after a successful operation.
    pub balance: Decimal,
}

impl Account {
    /// Create an account with the given opening balance
    pub fn new(
        id: AccountId,
        account_number: impl Into<String>,
        holder_name: impl Into<String>,
        balance: Decimal,
    ) -> Self {
        Account {
            id,
            account_number: account_number.into(),
            holder_name: holder_name.into(),
            balance,
        }
    }

    /// Credit the account
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `tx_type` does not end with "Credit" (case-insensitive)
    /// - `amount` is zero or negative
    /// - the new balance would overflow
    pub fn deposit(&mut self, amount: Decimal, tx_type: &str) -> Result<(), LedgerError> {
        if !denotes_credit(tx_type) {
            return Err(LedgerError::invalid_transaction_type(tx_type, CREDIT));
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount, "deposit"));
        }

        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", self.id))?;

        Ok(())
    }

    /// Debit the account
    ///
    /// Withdrawing the entire balance leaves the account at exactly zero.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - `tx_type` does not end with "Debit" (case-insensitive)
    /// - `amount` is zero or negative
    /// - `amount` exceeds the balance
    pub fn withdraw(&mut self, amount: Decimal, tx_type: &str) -> Result<(), LedgerError> {
        if !denotes_debit(tx_type) {
            return Err(LedgerError::invalid_transaction_type(tx_type, DEBIT));
        }
        self.check_debit(amount, "withdraw")?;

        self.balance -= amount;

        Ok(())
    }

    /// Move `amount` from this account to `target`
    ///
    /// Both new balances are computed before either is written, so the
    /// transfer is applied completely or not at all.
    ///
    /// The borrow checker rules out `target` being `self`; a transfer from
    /// an account to itself goes through [`Account::transfer_within`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `amount` is zero or negative
    /// - `amount` exceeds this account's balance
    /// - the target's balance would overflow
    pub fn transfer(&mut self, target: &mut Account, amount: Decimal) -> Result<(), LedgerError> {
        self.check_debit(amount, "transfer")?;

        let new_source = self.balance - amount;
        let new_target = target
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", target.id))?;

        self.balance = new_source;
        target.balance = new_target;

        Ok(())
    }

    /// Transfer `amount` from this account to itself
    ///
    /// Validated exactly like [`Account::transfer`]; the debit leg and then
    /// the credit leg are applied to the same balance, which nets to zero.
    pub fn transfer_within(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        self.check_debit(amount, "transfer")?;

        // Both legs stay within [0, balance], so neither can overflow
        self.balance -= amount;
        self.balance += amount;

        Ok(())
    }

    fn check_debit(&self, amount: Decimal, operation: &str) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount, operation));
        }
        if amount > self.balance {
            return Err(LedgerError::insufficient_funds(
                self.id,
                self.balance,
                amount,
            ));
        }
        Ok(())
    }
}
