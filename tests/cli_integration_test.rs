//! CLI integration tests.
//!
//! Tests cover:
//! - Config parsing (build_backtest_config)
//! - Strategy file loading with warnings and errors
//! - Backtest pipeline with MockDataPort
//! - Full subcommands against real files on disk

mod common;

use clap::Parser;
use common::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use stratforge::adapters::file_config_adapter::FileConfigAdapter;
use stratforge::cli::{self, Cli};
use stratforge::domain::backtest::BacktestConfig;
use stratforge::domain::error::StratforgeError;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> String {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path.display().to_string()
}

fn write_prices(dir: &Path, closes: &[f64]) -> String {
    let mut csv = String::from("date,open,high,low,close,volume\n");
    for (i, c) in closes.iter().enumerate() {
        csv.push_str(&format!("{},{c},{c},{c},{c},1000\n", day(i).format("%Y-%m-%d")));
    }
    let path = dir.join("prices.csv");
    fs::write(&path, csv).unwrap();
    path.display().to_string()
}

fn exit_code(args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args).unwrap();
    format!("{:?}", cli::run(cli))
}

fn code(n: u8) -> String {
    format!("{:?}", ExitCode::from(n))
}

mod config_loading {
    use super::*;

    #[test]
    fn build_backtest_config_reads_history_sizes() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ntrade_history = 8\nequity_history = 20\n")
                .unwrap();
        let config = cli::build_backtest_config(&adapter).unwrap();
        assert_eq!(
            config,
            BacktestConfig {
                trade_history: 8,
                equity_history: 20,
                parallel: true,
            }
        );
    }

    #[test]
    fn build_backtest_config_reads_parallel_switch() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nparallel = no\n").unwrap();
        assert!(!cli::build_backtest_config(&adapter).unwrap().parallel);

        let adapter = FileConfigAdapter::from_string("[backtest]\nparallel = maybe\n").unwrap();
        assert!(cli::build_backtest_config(&adapter).unwrap().parallel);
    }

    #[test]
    fn build_backtest_config_uses_defaults() {
        let adapter = FileConfigAdapter::from_string("[logging]\nfilter = debug\n").unwrap();
        let config = cli::build_backtest_config(&adapter).unwrap();
        assert_eq!(config, BacktestConfig::default());
    }

    #[test]
    fn build_backtest_config_rejects_zero() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nequity_history = 0\n").unwrap();
        let err = cli::build_backtest_config(&adapter).unwrap_err();
        match err {
            StratforgeError::ConfigInvalid { key, .. } => assert_eq!(key, "equity_history"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_config_from_disk() {
        let file = write_temp_ini("[backtest]\ntrade_history = 2\n");
        let adapter = cli::load_config(&file.path().to_path_buf()).unwrap();
        assert_eq!(cli::build_backtest_config(&adapter).unwrap().trade_history, 2);
    }
}

mod strategy_loading {
    use super::*;

    #[test]
    fn load_parsed_strategy_keeps_warnings() {
        let dir = TempDir::new().unwrap();
        let path = write_json(dir.path(), "rsi.json", &rsi_dip_json());
        let parsed = cli::load_parsed_strategy(Path::new(&path)).unwrap();
        assert_eq!(parsed.spec.name, "RSI dip buyer");
        assert!(parsed.warnings.iter().any(|w| w.contains("No exit conditions")));
    }

    #[test]
    fn load_parsed_strategy_rejects_invalid() {
        let dir = TempDir::new().unwrap();
        let path = write_json(dir.path(), "bad.json", &serde_json::json!({"name": "x"}));
        let err = cli::load_parsed_strategy(Path::new(&path)).unwrap_err();
        assert!(matches!(err, StratforgeError::SpecInvalid { .. }));
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn pipeline_with_mock_data_port() {
        let port = MockDataPort::new().with_bars("dip", make_bars(&dip_then_recover(60)));
        let strategies = vec![
            stratforge::domain::normalize::parse_strategy(&rsi_dip_json()).unwrap(),
            stratforge::domain::normalize::parse_strategy(&sma_cross_json()).unwrap(),
        ];
        let config = BacktestConfig {
            trade_history: 5,
            equity_history: 10,
            ..BacktestConfig::default()
        };
        let reports = cli::run_backtest_pipeline(&port, "dip", &strategies, &config).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].strategy_name, "RSI dip buyer");
        assert_eq!(reports[0].trades.len(), 2);
        assert_eq!(reports[0].equity_curve.len(), 10);
    }

    #[test]
    fn sequential_pipeline_matches_parallel() {
        let port = MockDataPort::new().with_bars("dip", make_bars(&dip_then_recover(60)));
        let strategies = vec![
            stratforge::domain::normalize::parse_strategy(&rsi_dip_json()).unwrap(),
            stratforge::domain::normalize::parse_strategy(&sma_cross_json()).unwrap(),
        ];
        let sequential = BacktestConfig {
            parallel: false,
            ..BacktestConfig::default()
        };
        let parallel = cli::run_backtest_pipeline(&port, "dip", &strategies, &BacktestConfig::default()).unwrap();
        let serial = cli::run_backtest_pipeline(&port, "dip", &strategies, &sequential).unwrap();
        assert_eq!(parallel, serial);
    }

    #[test]
    fn pipeline_propagates_data_errors() {
        let port = MockDataPort::new().with_error("broken", "feed down");
        let strategies = vec![stratforge::domain::normalize::parse_strategy(&rsi_dip_json()).unwrap()];
        let err = cli::run_backtest_pipeline(&port, "broken", &strategies, &BacktestConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("feed down"));
    }
}

mod commands {
    use super::*;

    #[test]
    fn validate_valid_strategy() {
        let dir = TempDir::new().unwrap();
        let path = write_json(dir.path(), "rsi.json", &rsi_dip_json());
        assert_eq!(exit_code(&["stratforge", "validate", "--strategy", &path]), code(0));
    }

    #[test]
    fn validate_invalid_strategy_exits_with_spec_code() {
        let dir = TempDir::new().unwrap();
        let path = write_json(dir.path(), "bad.json", &serde_json::json!({"entry_conditions": []}));
        assert_eq!(exit_code(&["stratforge", "validate", "-s", &path]), code(4));
    }

    #[test]
    fn malformed_json_exits_with_spec_code() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ nope").unwrap();
        let path = path.display().to_string();
        assert_eq!(exit_code(&["stratforge", "normalize", "-s", &path]), code(4));
    }

    #[test]
    fn normalize_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let path = write_json(dir.path(), "rsi.json", &rsi_dip_json());
        let out = dir.path().join("normalized.json");
        let out_str = out.display().to_string();
        assert_eq!(
            exit_code(&["stratforge", "normalize", "-s", &path, "-o", &out_str]),
            code(0)
        );
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["spec"]["name"], "RSI dip buyer");
        assert_eq!(written["spec"]["timeframe"], "1d");
        assert_eq!(written["metadata"]["total_conditions"], 1);
    }

    #[test]
    fn backtest_writes_reports() {
        let dir = TempDir::new().unwrap();
        let rsi = write_json(dir.path(), "rsi.json", &rsi_dip_json());
        let sma = write_json(dir.path(), "sma.json", &sma_cross_json());
        let prices = write_prices(dir.path(), &dip_then_recover(60));
        let ini = write_temp_ini("[backtest]\ntrade_history = 1\n");
        let ini = ini.path().display().to_string();
        let out = dir.path().join("reports.json");
        let out_str = out.display().to_string();

        let status = exit_code(&[
            "stratforge", "backtest", "-s", &rsi, &sma, "-p", &prices, "-c", &ini, "-o", &out_str,
        ]);
        assert_eq!(status, code(0));

        let reports: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let reports = reports.as_array().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0]["total_trades"], 1);
        assert_eq!(reports[0]["trades"].as_array().unwrap().len(), 1);
        assert_eq!(reports[0]["trades"][0]["reason"], "TARGET");
    }

    #[test]
    fn backtest_rejects_bad_config_value() {
        let dir = TempDir::new().unwrap();
        let rsi = write_json(dir.path(), "rsi.json", &rsi_dip_json());
        let prices = write_prices(dir.path(), &rising(30));
        let ini = write_temp_ini("[backtest]\ntrade_history = 0\n");
        let ini = ini.path().display().to_string();
        assert_eq!(
            exit_code(&["stratforge", "backtest", "-s", &rsi, "-p", &prices, "-c", &ini]),
            code(2)
        );
    }

    #[test]
    fn backtest_missing_prices_exits_with_price_code() {
        let dir = TempDir::new().unwrap();
        let rsi = write_json(dir.path(), "rsi.json", &rsi_dip_json());
        let missing = dir.path().join("missing.csv").display().to_string();
        assert_eq!(
            exit_code(&["stratforge", "backtest", "-s", &rsi, "-p", &missing]),
            code(5)
        );
    }

    #[test]
    fn render_with_custom_template() {
        let dir = TempDir::new().unwrap();
        let sma = write_json(dir.path(), "sma.json", &sma_cross_json());
        let template = dir.path().join("t.md");
        fs::write(&template, "{{NAME}}: {{ENTRY_RULES}}").unwrap();
        let ini = write_temp_ini(&format!("[render]\ntemplate_path = {}\n", template.display()));
        let ini = ini.path().display().to_string();
        let out = dir.path().join("out.md");
        let out_str = out.display().to_string();

        assert_eq!(
            exit_code(&["stratforge", "render", "-s", &sma, "-c", &ini, "-o", &out_str]),
            code(0)
        );
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "SMA Crossover: - SMA(5) crosses above SMA(20)"
        );
    }

    #[test]
    fn catalog_writes_supported_values() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("catalog.json");
        let out_str = out.display().to_string();
        assert_eq!(exit_code(&["stratforge", "catalog", "-o", &out_str]), code(0));

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let kinds: Vec<&str> = written["indicators"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["kind"].as_str().unwrap())
            .collect();
        assert!(kinds.contains(&"BOLLINGER"));
        assert_eq!(written["operators"][5]["operator"], "CROSSES_ABOVE");
        assert_eq!(written["timeframes"][6], "1d");
    }

    #[test]
    fn init_writes_a_strategy_that_validates() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("starter.json");
        let out_str = out.display().to_string();
        assert_eq!(exit_code(&["stratforge", "init", "-o", &out_str]), code(0));
        assert_eq!(exit_code(&["stratforge", "validate", "-s", &out_str]), code(0));

        let parsed = cli::load_parsed_strategy(&out).unwrap();
        assert_eq!(parsed.spec.name, "Default RSI Strategy");
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("mine.json");
        fs::write(&out, "{}").unwrap();
        let out_str = out.display().to_string();
        assert_eq!(exit_code(&["stratforge", "init", "-o", &out_str]), code(1));
        assert_eq!(fs::read_to_string(&out).unwrap(), "{}");
    }

    #[test]
    fn missing_config_file_exits_with_config_code() {
        let dir = TempDir::new().unwrap();
        let sma = write_json(dir.path(), "sma.json", &sma_cross_json());
        assert_eq!(
            exit_code(&["stratforge", "render", "-s", &sma, "-c", "/nonexistent/config.ini"]),
            code(2)
        );
    }
}
