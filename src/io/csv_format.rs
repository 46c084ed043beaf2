//! CSV format handling for accounts and ledger operations
//!
//! This module centralizes all CSV format concerns, providing:
//! - `AccountCsvRecord` for seed files, and conversion to `Account`
//! - `OperationCsvRecord` for operation streams, and conversion to `LedgerOperation`
//! - Account output serialization
//!
//! Conversions are pure (no I/O) for easy testing.
//!
//! # Formats
//!
//! ```text
//! accounts:   id,accountNumber,holderName,balance
//! operations: op,id,to,amount,accountNumber,holderName,txType
//! ```

use crate::types::{Account, AccountId, LedgerError, LedgerOperation, CREDIT, DEBIT};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::{Read, Write};
use std::str::FromStr;
use tracing::warn;

/// Header written above every account listing
pub const ACCOUNT_HEADER: [&str; 4] = ["id", "accountNumber", "holderName", "balance"];

/// Seed account row
///
/// The balance is kept as a string and parsed with `Decimal::from_str`, so
/// no value ever passes through a float.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountCsvRecord {
    pub id: AccountId,
    #[serde(rename = "accountNumber")]
    pub account_number: String,
    #[serde(rename = "holderName")]
    pub holder_name: String,
    pub balance: String,
}

/// Operation row
///
/// Only `op` and `id` are always required; which other columns matter
/// depends on the operation.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OperationCsvRecord {
    pub op: String,
    pub id: AccountId,
    #[serde(default)]
    pub to: Option<AccountId>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(rename = "accountNumber", default)]
    pub account_number: Option<String>,
    #[serde(rename = "holderName", default)]
    pub holder_name: Option<String>,
    #[serde(rename = "txType", default)]
    pub tx_type: Option<String>,
}

/// Convert a seed row to an Account
pub fn convert_account_record(record: AccountCsvRecord) -> Result<Account, LedgerError> {
    let balance = parse_amount(&record.balance, record.id)?;

    Ok(Account::new(
        record.id,
        record.account_number,
        record.holder_name,
        balance,
    ))
}

/// Convert an operation row to a LedgerOperation
///
/// The row's shape is checked here (operation name, required columns,
/// decimal syntax); business rules such as positive amounts are left to
/// the registry so that they are reported the same way for every caller.
///
/// - `create` needs `accountNumber` and `holderName`; `amount` is the opening
///   balance and defaults to zero
/// - `update` needs `accountNumber`, `holderName` and `amount`
/// - `deposit` / `withdraw` need `amount`; `txType` defaults to
///   `Credit` / `Debit`
/// - `transfer` needs `to` and `amount`
pub fn convert_operation_record(record: OperationCsvRecord) -> Result<LedgerOperation, LedgerError> {
    let op = record.op.to_lowercase();
    let id = record.id;
    let amount = match non_empty(record.amount) {
        Some(raw) => Some(parse_amount(&raw, id)?),
        None => None,
    };
    let required_amount = || {
        amount.ok_or_else(|| {
            LedgerError::parse(format!("{} operation for account {} requires an amount", op, id))
        })
    };

    let operation = match op.as_str() {
        "create" | "update" => {
            let account_number = non_empty(record.account_number).ok_or_else(|| {
                LedgerError::parse(format!("{op} operation for account {id} requires an accountNumber"))
            })?;
            let holder_name = non_empty(record.holder_name).ok_or_else(|| {
                LedgerError::parse(format!("{op} operation for account {id} requires a holderName"))
            })?;

            if op == "create" {
                let balance = amount.unwrap_or(Decimal::ZERO);
                LedgerOperation::Create(Account::new(id, account_number, holder_name, balance))
            } else {
                let balance = required_amount()?;
                LedgerOperation::Update(Account::new(id, account_number, holder_name, balance))
            }
        }
        "delete" => LedgerOperation::Delete { id },
        "deposit" => LedgerOperation::Deposit {
            id,
            amount: required_amount()?,
            tx_type: non_empty(record.tx_type).unwrap_or_else(|| CREDIT.to_string()),
        },
        "withdraw" => LedgerOperation::Withdraw {
            id,
            amount: required_amount()?,
            tx_type: non_empty(record.tx_type).unwrap_or_else(|| DEBIT.to_string()),
        },
        "transfer" => {
            let to = record.to.ok_or_else(|| {
                LedgerError::parse(format!("transfer operation for account {id} requires a target"))
            })?;
            LedgerOperation::Transfer {
                from: id,
                to,
                amount: required_amount()?,
            }
        }
        _ => {
            return Err(LedgerError::parse(format!(
                "Invalid operation '{}' for account {}",
                record.op, id
            )))
        }
    };

    Ok(operation)
}

/// Read seed accounts from CSV
///
/// Rows that fail to parse are logged and skipped; the rest are returned in
/// file order.
pub fn read_accounts_csv<R: Read>(input: R) -> Result<Vec<Account>, LedgerError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input);

    let mut accounts = Vec::new();
    for result in reader.deserialize::<AccountCsvRecord>() {
        match result
            .map_err(LedgerError::from)
            .and_then(convert_account_record)
        {
            Ok(account) => accounts.push(account),
            Err(e) => warn!(error = %e, "skipping seed account row"),
        }
    }

    Ok(accounts)
}

/// Write account states as CSV
///
/// Accounts are written in the order given, which for registry output is
/// insertion order. The header is always written, even for an empty list.
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);

    writer.write_record(ACCOUNT_HEADER)?;
    for account in accounts {
        writer.serialize(account)?;
    }
    writer.flush()?;

    Ok(())
}

fn parse_amount(raw: &str, id: AccountId) -> Result<Decimal, LedgerError> {
    Decimal::from_str(raw.trim()).map_err(|_| {
        LedgerError::parse(format!("Invalid amount '{}' for account {}", raw, id))
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
