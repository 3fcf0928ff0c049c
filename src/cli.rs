//! CLI definition and dispatch.
//!
//! Diagnostics go to stderr; machine-readable output (JSON, rendered text)
//! goes to stdout or the `--output` file.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_strategy_adapter::load_strategy;
use crate::adapters::template_renderer::TemplateRenderer;
use crate::domain::backtest::{
    BacktestConfig, BacktestReport, DEFAULT_EQUITY_HISTORY, DEFAULT_TRADE_HISTORY,
};
use crate::domain::batch::{run_batch, run_batch_sequential};
use crate::domain::catalog::{catalog, default_strategy};
use crate::domain::error::StratforgeError;
use crate::domain::normalize::{parse_strategy, upgrade_legacy};
use crate::domain::strategy::ParsedStrategy;
use crate::domain::validation::validate;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::render_port::RenderPort;

#[derive(Parser, Debug)]
#[command(
    name = "stratforge",
    about = "Validate, normalize, render and backtest declarative trading strategies"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a strategy file and print the validation result
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// Print the normalized form of a strategy
    Normalize {
        #[arg(short, long)]
        strategy: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Backtest one or more strategies over a CSV price series
    Backtest {
        #[arg(short, long, num_args = 1.., required = true)]
        strategy: Vec<PathBuf>,
        #[arg(short, long)]
        prices: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a strategy through a text template
    Render {
        #[arg(short, long)]
        strategy: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the indicators, operators and timeframes a strategy may use
    Catalog {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a starter strategy document
    Init {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Command {
    fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Command::Backtest { config, .. } | Command::Render { config, .. } => config.as_ref(),
            Command::Validate { .. }
            | Command::Normalize { .. }
            | Command::Catalog { .. }
            | Command::Init { .. } => None,
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match cli.command.config_path().map(load_config).transpose() {
        Ok(config) => config,
        Err(e) => {
            init_logging(None);
            return fail(&e);
        }
    };
    init_logging(
        config
            .as_ref()
            .and_then(|c| c.get_string("logging", "filter"))
            .as_deref(),
    );

    let outcome = match &cli.command {
        Command::Validate { strategy } => run_validate(strategy),
        Command::Normalize { strategy, output } => run_normalize(strategy, output.as_deref()),
        Command::Backtest {
            strategy,
            prices,
            output,
            ..
        } => run_backtest(strategy, prices, config.as_ref(), output.as_deref()),
        Command::Render {
            strategy, output, ..
        } => run_render(strategy, config.as_ref(), output.as_deref()),
        Command::Catalog { output } => to_json(&catalog()).and_then(|j| emit(output.as_deref(), &j)),
        Command::Init { output } => run_init(output.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the config filter.
pub fn init_logging(config_filter: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config_filter.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, StratforgeError> {
    FileConfigAdapter::from_file(path)
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, StratforgeError> {
    Ok(BacktestConfig {
        trade_history: read_history(config, "trade_history", DEFAULT_TRADE_HISTORY)?,
        equity_history: read_history(config, "equity_history", DEFAULT_EQUITY_HISTORY)?,
        parallel: config.get_bool("backtest", "parallel", true),
    })
}

fn read_history(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, StratforgeError> {
    let value = config.get_int("backtest", key, default as i64);
    if value < 1 {
        return Err(StratforgeError::ConfigInvalid {
            section: "backtest".into(),
            key: key.into(),
            reason: format!("must be at least 1, got {}", value),
        });
    }
    Ok(value as usize)
}

/// Load, upgrade, validate and normalize one strategy file, printing warnings.
pub fn load_parsed_strategy(path: &Path) -> Result<ParsedStrategy, StratforgeError> {
    let raw = load_strategy(path)?;
    let parsed = parse_strategy(&raw)?;
    for warning in &parsed.warnings {
        eprintln!("warning: {}: {}", path.display(), warning);
    }
    Ok(parsed)
}

/// Fetch `prices` through `data_port` and backtest every strategy against it.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    prices: &str,
    strategies: &[ParsedStrategy],
    bt_config: &BacktestConfig,
) -> Result<Vec<BacktestReport>, StratforgeError> {
    let bars = data_port.fetch_bars(prices)?;
    eprintln!(
        "Running backtest: {} strateg{}, {} bars",
        strategies.len(),
        if strategies.len() == 1 { "y" } else { "ies" },
        bars.len()
    );

    let specs: Vec<_> = strategies.iter().map(|p| p.spec.clone()).collect();
    let results = if bt_config.parallel {
        run_batch(&specs, &bars)?
    } else {
        run_batch_sequential(&specs, &bars)?
    };

    for result in &results {
        eprintln!("\n=== {} ===", result.strategy_name);
        if result.insufficient_data {
            eprintln!(
                "Insufficient data: {} bars, {} needed before the first decision",
                bars.len(),
                result.warmup_bars
            );
        }
        eprintln!("Final Capital:    {:.2}", result.final_capital);
        eprintln!("Total Return:     {:.2}%", result.metrics.total_return_pct);
        eprintln!("Max Drawdown:     -{:.2}%", result.metrics.max_drawdown_pct);
        eprintln!("Total Trades:     {}", result.metrics.total_trades);
        eprintln!("Win Rate:         {:.1}%", result.metrics.win_rate);
    }

    Ok(results.iter().map(|r| r.report(bt_config)).collect())
}

fn run_validate(strategy_path: &Path) -> Result<(), StratforgeError> {
    let raw = load_strategy(strategy_path)?;
    let result = validate(&upgrade_legacy(&raw));

    emit(None, &to_json(&result)?)?;
    for warning in &result.warnings {
        eprintln!("warning: {}", warning);
    }
    if result.is_valid {
        eprintln!("Strategy is valid: {}", strategy_path.display());
        Ok(())
    } else {
        Err(StratforgeError::SpecInvalid {
            errors: result.errors,
        })
    }
}

fn run_normalize(strategy_path: &Path, output: Option<&Path>) -> Result<(), StratforgeError> {
    let parsed = load_parsed_strategy(strategy_path)?;
    emit(output, &to_json(&parsed)?)
}

fn run_backtest(
    strategy_paths: &[PathBuf],
    prices: &Path,
    config: Option<&FileConfigAdapter>,
    output: Option<&Path>,
) -> Result<(), StratforgeError> {
    let bt_config = match config {
        Some(c) => build_backtest_config(c)?,
        None => BacktestConfig::default(),
    };
    let strategies = strategy_paths
        .iter()
        .map(|p| load_parsed_strategy(p))
        .collect::<Result<Vec<_>, _>>()?;

    let data_port = CsvAdapter::new(PathBuf::new());
    let reports = run_backtest_pipeline(
        &data_port,
        &prices.to_string_lossy(),
        &strategies,
        &bt_config,
    )?;
    emit(output, &to_json(&reports)?)
}

fn run_render(
    strategy_path: &Path,
    config: Option<&FileConfigAdapter>,
    output: Option<&Path>,
) -> Result<(), StratforgeError> {
    let parsed = load_parsed_strategy(strategy_path)?;
    let renderer = match config.and_then(|c| c.get_string("render", "template_path")) {
        Some(path) => TemplateRenderer::from_file(path)?,
        None => TemplateRenderer::new(),
    };
    emit(output, &renderer.render(&parsed)?)
}

fn run_init(output: Option<&Path>) -> Result<(), StratforgeError> {
    if let Some(path) = output.filter(|p| p.exists()) {
        return Err(StratforgeError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        )));
    }
    emit(output, &to_json(&default_strategy())?)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, StratforgeError> {
    serde_json::to_string_pretty(value).map_err(|e| StratforgeError::Io(e.into()))
}

fn emit(output: Option<&Path>, content: &str) -> Result<(), StratforgeError> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!("Written to: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn fail(err: &StratforgeError) -> ExitCode {
    match err {
        StratforgeError::SpecInvalid { errors } => {
            for e in errors {
                eprintln!("error: {}", e);
            }
        }
        other => eprintln!("error: {other}"),
    }
    ExitCode::from(err)
}
