//! Thread-safe account registry
//!
//! This module provides the `AccountRegistry` struct, the sole long-lived
//! owner of every account. Callers read clones; all mutation goes through
//! registry operations or the [`AccountRegistry::modify`] closure.
//!
//! # Design
//!
//! Accounts live in a single `RwLock<Vec<Account>>`, kept in insertion order.
//!
//! - Every mutating operation (`create`, `update`, `delete`,
//!   `initialize_all`, `transfer_funds`, `deposit`, `withdraw`, `modify`)
//!   runs under the write lock, so no two mutations interleave.
//! - Reads (`get_all`, `get_by_id`) share the read lock and always see the
//!   state between two whole mutations. A snapshot never shows one leg of a
//!   transfer without the other.
//!
//! # Duplicates
//!
//! Ids are not required to be unique. Lookups by id resolve to the first
//! account inserted with that id.

use crate::types::{Account, AccountId, LedgerError};
use rust_decimal::Decimal;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// In-memory registry of accounts keyed by id
///
/// All methods take `&self` and are safe to call from many threads at once;
/// share the registry behind an `Arc`.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    accounts: RwLock<Vec<Account>>,
}

impl AccountRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with `accounts`
    ///
    /// # Errors
    ///
    /// Fails with `InvalidAmount` if any account has a negative balance.
    pub fn with_accounts(accounts: Vec<Account>) -> Result<Self, LedgerError> {
        let registry = Self::new();
        registry.initialize_all(accounts)?;
        Ok(registry)
    }

    /// Number of accounts currently held
    pub fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.read_accounts("len")?.len())
    }

    /// Whether the registry holds no accounts
    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.read_accounts("is_empty")?.is_empty())
    }

    /// Snapshot of every account in insertion order
    pub fn get_all(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.read_accounts("get_all")?.clone())
    }

    /// Snapshot of the first account with the given id
    ///
    /// # Errors
    ///
    /// Fails with `AccountNotFound` if no account has this id.
    pub fn get_by_id(&self, id: AccountId) -> Result<Account, LedgerError> {
        let accounts = self.read_accounts("get_by_id")?;
        let index = position(&accounts, id)?;
        Ok(accounts[index].clone())
    }

    /// Append an account
    ///
    /// Duplicate ids and account numbers are accepted.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidAmount` if the opening balance is negative.
    pub fn create(&self, account: Account) -> Result<(), LedgerError> {
        check_opening_balance(&account, "create")?;

        let mut accounts = self.write_accounts("create")?;
        debug!(account_id = account.id, balance = %account.balance, "account created");
        accounts.push(account);

        Ok(())
    }

    /// Overwrite number, holder and balance of the account with `account.id`
    ///
    /// # Errors
    ///
    /// Fails with `AccountNotFound` if the id is unknown, or `InvalidAmount`
    /// if the new balance is negative.
    pub fn update(&self, account: Account) -> Result<(), LedgerError> {
        check_opening_balance(&account, "update")?;

        let mut accounts = self.write_accounts("update")?;
        let index = position(&accounts, account.id)?;
        let current = &mut accounts[index];

        current.account_number = account.account_number;
        current.holder_name = account.holder_name;
        current.balance = account.balance;
        debug!(account_id = current.id, balance = %current.balance, "account updated");

        Ok(())
    }

    /// Remove the first account with the given id
    ///
    /// # Errors
    ///
    /// Fails with `AccountNotFound` if no account has this id.
    pub fn delete(&self, id: AccountId) -> Result<(), LedgerError> {
        let mut accounts = self.write_accounts("delete")?;
        let index = position(&accounts, id)?;

        accounts.remove(index);
        debug!(account_id = id, "account deleted");

        Ok(())
    }

    /// Replace the entire contents of the registry
    ///
    /// Used for seeding at startup and for resetting state between runs.
    /// Existing accounts are dropped without any per-account delete.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidAmount` if any account has a negative balance; the
    /// registry is left untouched in that case.
    pub fn initialize_all(&self, accounts: Vec<Account>) -> Result<(), LedgerError> {
        for account in &accounts {
            check_opening_balance(account, "initialize_all")?;
        }

        let mut current = self.write_accounts("initialize_all")?;
        debug!(count = accounts.len(), "registry initialized");
        *current = accounts;

        Ok(())
    }

    /// Run `f` against the live account with the given id
    ///
    /// The registry's write lock is held for the whole call. If `f` fails,
    /// or leaves a negative balance, the account is restored to its state
    /// before the call. The id is fixed; changes `f` makes to it are
    /// discarded.
    ///
    /// # Errors
    ///
    /// Fails with `AccountNotFound` if the id is unknown, otherwise returns
    /// whatever `f` returns.
    pub fn modify<F, T>(&self, id: AccountId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Account) -> Result<T, LedgerError>,
    {
        let mut accounts = self.write_accounts("modify")?;
        let index = position(&accounts, id)?;
        let account = &mut accounts[index];

        let snapshot = account.clone();
        let outcome = f(account).and_then(|value| {
            if account.balance < Decimal::ZERO {
                Err(LedgerError::invalid_amount(account.balance, "modify"))
            } else {
                Ok(value)
            }
        });

        match outcome {
            Ok(value) => {
                account.id = snapshot.id;
                Ok(value)
            }
            Err(e) => {
                *account = snapshot;
                Err(e)
            }
        }
    }

    /// Credit the account with the given id
    pub fn deposit(&self, id: AccountId, amount: Decimal, tx_type: &str) -> Result<(), LedgerError> {
        self.modify(id, |account| account.deposit(amount, tx_type))?;
        debug!(account_id = id, %amount, "deposit committed");
        Ok(())
    }

    /// Debit the account with the given id
    pub fn withdraw(
        &self,
        id: AccountId,
        amount: Decimal,
        tx_type: &str,
    ) -> Result<(), LedgerError> {
        self.modify(id, |account| account.withdraw(amount, tx_type))?;
        debug!(account_id = id, %amount, "withdrawal committed");
        Ok(())
    }

    /// Move `amount` from account `from_id` to account `to_id`
    ///
    /// Both accounts are looked up first, then the amount is validated,
    /// then the entity transfer runs. The whole call holds the write lock.
    /// `from_id == to_id` is allowed and leaves the balance unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - either id is unknown (`AccountNotFound`)
    /// - `amount` is zero or negative (`InvalidAmount`)
    /// - the source balance is below `amount` (`InsufficientFunds`)
    pub fn transfer_funds(
        &self,
        from_id: AccountId,
        to_id: AccountId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let mut accounts = self.write_accounts("transfer_funds")?;
        let source = position(&accounts, from_id)?;
        let target = position(&accounts, to_id)?;

        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount, "transfer"));
        }

        if source == target {
            accounts[source].transfer_within(amount)?;
        } else {
            let (source_account, target_account) = pair_mut(&mut accounts, source, target);
            source_account.transfer(target_account, amount)?;
        }

        debug!(from = from_id, to = to_id, %amount, "transfer committed");
        Ok(())
    }

    fn read_accounts(
        &self,
        operation: &str,
    ) -> Result<RwLockReadGuard<'_, Vec<Account>>, LedgerError> {
        self.accounts
            .read()
            .map_err(|_| LedgerError::lock_poisoned(operation))
    }

    fn write_accounts(
        &self,
        operation: &str,
    ) -> Result<RwLockWriteGuard<'_, Vec<Account>>, LedgerError> {
        self.accounts
            .write()
            .map_err(|_| LedgerError::lock_poisoned(operation))
    }
}

fn position(accounts: &[Account], id: AccountId) -> Result<usize, LedgerError> {
    accounts
        .iter()
        .position(|account| account.id == id)
        .ok_or_else(|| LedgerError::account_not_found(id))
}

/// Two distinct elements of `accounts`, borrowed mutably, in `(first, second)` order
fn pair_mut(accounts: &mut [Account], first: usize, second: usize) -> (&mut Account, &mut Account) {
    if first < second {
        let (head, tail) = accounts.split_at_mut(second);
        (&mut head[first], &mut tail[0])
    } else {
        let (head, tail) = accounts.split_at_mut(first);
        (&mut tail[0], &mut head[second])
    }
}

fn check_opening_balance(account: &Account, operation: &str) -> Result<(), LedgerError> {
    if account.balance < Decimal::ZERO {
        return Err(LedgerError::invalid_amount(account.balance, operation));
    }
    Ok(())
}
