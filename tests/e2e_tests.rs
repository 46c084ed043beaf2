//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline using predefined CSV
//! fixtures. Each test:
//! 1. Loads accounts.csv from a fixture directory, if present
//! 2. Replays input.csv through the selected strategy
//! 3. Compares the output CSV with expected.csv
//!
//! Fixtures are located in tests/fixtures/ and cover:
//! - Happy path deposits, withdrawals and transfers
//! - Rejections (insufficient funds, unknown accounts, invalid amounts and types)
//! - Account creation, update and deletion, including insertion order
//! - Edge cases (self transfers, emptying an account, duplicate ids, malformed rows)
//!
//! Each fixture is run with both the synchronous and the async strategy.

#[cfg(test)]
mod tests {
    use bank_ledger::cli::StrategyType;
    use bank_ledger::io::load_accounts;
    use bank_ledger::strategy::{create_strategy, BatchConfig};
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    /// Run a fixture and compare its output with expected.csv
    ///
    /// # Panics
    ///
    /// Panics if fixture files cannot be read, or if the output differs from
    /// the expected output.
    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType, config: Option<BatchConfig>) {
        let fixture_dir = Path::new("tests/fixtures").join(fixture_name);
        let accounts_path = fixture_dir.join("accounts.csv");
        let input_path = fixture_dir.join("input.csv");
        let expected_path = fixture_dir.join("expected.csv");

        assert!(input_path.exists(), "Input file not found: {}", input_path.display());
        assert!(
            expected_path.exists(),
            "Expected file not found: {}",
            expected_path.display()
        );

        let accounts = if accounts_path.exists() {
            load_accounts(&accounts_path)
                .unwrap_or_else(|e| panic!("Failed to load seed accounts: {}", e))
        } else {
            Vec::new()
        };

        let strategy = create_strategy(strategy_type, config);
        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        strategy
            .process(accounts, &input_path, &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to replay operations: {}", e));
        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));
        let expected_output = fs::read_to_string(&expected_path).unwrap_or_else(|e| {
            panic!("Failed to read expected file {}: {}", expected_path.display(), e)
        });

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, actual_output, expected_output
        );
    }

    /// End-to-end test for all fixtures with both strategies
    #[rstest]
    #[case("happy_path")]
    #[case("transfers")]
    #[case("insufficient_funds")]
    #[case("not_found")]
    #[case("invalid_amounts")]
    #[case("crud")]
    #[case("self_transfer")]
    #[case("withdraw_full_balance")]
    #[case("malformed_data")]
    #[case("no_seed")]
    #[case("duplicate_ids")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        run_test_fixture(fixture, strategy, None);
    }

    /// Tiny batches force an account's operations across batch boundaries
    #[rstest]
    #[case("transfers")]
    #[case("crud")]
    #[case("duplicate_ids")]
    fn test_fixtures_with_small_batches(
        #[case] fixture: &str,
        #[values(1, 2)] batch_size: usize,
    ) {
        run_test_fixture(fixture, StrategyType::Async, Some(BatchConfig::new(batch_size, 2)));
    }

    #[rstest]
    fn test_missing_input_is_fatal(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let mut output = Vec::new();

        let result = create_strategy(strategy, None).process(
            Vec::new(),
            Path::new("tests/fixtures/does_not_exist/input.csv"),
            &mut output,
        );

        assert!(result.is_err());
        assert!(output.is_empty());
    }
}
