//! Bank Ledger CLI
//!
//! Replays account operations from a CSV file and prints the final accounts.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > accounts.csv
//! cargo run -- --accounts seed.csv operations.csv > accounts.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv > accounts.csv
//! RUST_LOG=debug cargo run -- --log-format json operations.csv > accounts.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use bank_ledger::cli;
use bank_ledger::io::load_accounts;
use bank_ledger::observability;
use bank_ledger::strategy;
use bank_ledger::LedgerError;
use std::process;

fn main() {
    let args = cli::parse_args();
    observability::init(args.log_format);

    if let Err(e) = run(&args) {
        tracing::error!(error = %e, "replay failed");
        process::exit(1);
    }
}

fn run(args: &cli::CliArgs) -> Result<(), LedgerError> {
    let accounts = match &args.accounts_file {
        Some(path) => load_accounts(path)?,
        None => Vec::new(),
    };

    let config = match args.strategy {
        cli::StrategyType::Async => Some(args.to_batch_config()),
        cli::StrategyType::Sync => None,
    };
    let strategy = strategy::create_strategy(args.strategy, config);

    let mut output = std::io::stdout().lock();
    strategy.process(accounts, &args.input_file, &mut output)
}
