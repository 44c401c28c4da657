//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::adapters::csv_adapter::CsvMarketData;
use crate::adapters::csv_trade_journal::CsvTradeJournal;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::log_report::LogReport;
use crate::adapters::paper_broker::{PaperBroker, PaperBrokerConfig};
use crate::domain::config::{build_trader_config, TraderConfig};
use crate::domain::error::SigtraderError;
use crate::domain::indicator::IndicatorType;
use crate::domain::retry::ThreadSleeper;
use crate::domain::session::{evaluate_signal, run_session, SessionContext};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "sigtrader", about = "Daily warning-dot signal trader")]
pub struct Cli {
    /// Log at DEBUG instead of INFO
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one trading session: signal, plan, order, report
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Session date (YYYY-MM-DD); defaults to the local date
        #[arg(long)]
        today: Option<String>,
    },
    /// Print the market signal without touching the account
    Signal {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        today: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);
    match cli.command {
        Command::Run { config, today } => run_trade(&config, today.as_deref()),
        Command::Signal { config, today } => run_signal(&config, today.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging already initialised: {e}");
    }
}

fn fail(err: SigtraderError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<(FileConfigAdapter, TraderConfig), SigtraderError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    let config = build_trader_config(&adapter)?;
    Ok((adapter, config))
}

pub fn parse_today(today: Option<&str>) -> Result<NaiveDate, SigtraderError> {
    match today {
        None => Ok(chrono::Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
            SigtraderError::ConfigInvalid {
                section: "cli".into(),
                key: "today".into(),
                reason: format!("'{s}' is not YYYY-MM-DD: {e}"),
            }
        }),
    }
}

pub fn build_data_source(adapter: &dyn ConfigPort) -> CsvMarketData {
    let path = adapter
        .get_string("data", "csv_path")
        .unwrap_or_else(|| "data".to_string());
    CsvMarketData::new(PathBuf::from(path))
}

pub fn parse_holidays(raw: &str) -> Result<Vec<NaiveDate>, SigtraderError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| SigtraderError::ConfigInvalid {
                section: "broker".into(),
                key: "holidays".into(),
                reason: format!("'{s}': {e}"),
            })
        })
        .collect()
}

/// Paper account from `[broker]`. Without a configured price the last close
/// of the traded symbol is used.
pub fn build_paper_broker(
    adapter: &dyn ConfigPort,
    config: &TraderConfig,
    data: &dyn MarketDataPort,
) -> Result<PaperBroker, SigtraderError> {
    let price = match adapter.get_double("broker", "price", f64::NAN) {
        p if p.is_finite() && p > 0.0 => p,
        _ => data
            .fetch_bars(&config.symbol, 1)?
            .last()
            .map(|b| b.close)
            .ok_or_else(|| SigtraderError::DataUnavailable {
                symbol: config.symbol.clone(),
                reason: "no bar to price the paper account".into(),
            })?,
    };

    let cash = adapter.get_double("broker", "cash", 10_000.0);
    if !cash.is_finite() || cash < 0.0 {
        return Err(SigtraderError::ConfigInvalid {
            section: "broker".into(),
            key: "cash".into(),
            reason: "cash must be non-negative".into(),
        });
    }

    let holidays = match adapter.get_string("broker", "holidays") {
        Some(raw) => parse_holidays(&raw)?,
        None => Vec::new(),
    };

    Ok(PaperBroker::new(PaperBrokerConfig {
        symbol: config.symbol.clone(),
        cash,
        quantity: adapter.get_double("broker", "quantity", 0.0).max(0.0),
        average_cost: adapter.get_double("broker", "average_cost", 0.0),
        price,
        slippage_pct: adapter.get_double("broker", "slippage_pct", 0.0),
        commission: config.planner.commission,
        holidays,
    }))
}

pub fn build_sinks(adapter: &dyn ConfigPort) -> Vec<Box<dyn ReportPort>> {
    let mut sinks: Vec<Box<dyn ReportPort>> = vec![Box::new(LogReport)];
    if let Some(path) = adapter
        .get_string("report", "journal_path")
        .filter(|p| !p.trim().is_empty())
    {
        sinks.push(Box::new(CsvTradeJournal::new(PathBuf::from(path.trim()))));
    }
    sinks
}

fn run_trade(config_path: &Path, today: Option<&str>) -> ExitCode {
    // Stage 1: config
    info!(path = %config_path.display(), "loading config");
    let (adapter, config) = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let today = match parse_today(today) {
        Ok(d) => d,
        Err(e) => return fail(e),
    };

    // Stage 2: adapters
    let data = build_data_source(&adapter);
    let broker = match build_paper_broker(&adapter, &config, &data) {
        Ok(b) => b,
        Err(e) => return fail(e),
    };
    let sinks = build_sinks(&adapter);
    let sleeper = ThreadSleeper;

    // Stage 3: session
    let ctx = SessionContext {
        config: &config,
        data: &data,
        broker: &broker,
        sinks: sinks.iter().map(|s| s.as_ref() as &dyn ReportPort).collect(),
        sleeper: &sleeper,
    };
    let report = match run_session(&ctx, today) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    println!("{} {} {}", report.session_date, report.signal, report.plan.side);

    // Stage 4: surface a rejected or failed order
    match report.result {
        Some(result) => match result.ensure_filled() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(e),
        },
        None => ExitCode::SUCCESS,
    }
}

fn run_signal(config_path: &Path, today: Option<&str>) -> ExitCode {
    let (adapter, config) = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let today = match parse_today(today) {
        Ok(d) => d,
        Err(e) => return fail(e),
    };

    let data = build_data_source(&adapter);
    // Calendar only; no account state is read.
    let holidays = match adapter.get_string("broker", "holidays") {
        Some(raw) => match parse_holidays(&raw) {
            Ok(h) => h,
            Err(e) => return fail(e),
        },
        None => Vec::new(),
    };
    let broker = PaperBroker::new(PaperBrokerConfig {
        holidays,
        ..PaperBrokerConfig::new(&config.symbol, 0.0, 0.0)
    });

    match evaluate_signal(&config, &data, &broker, today) {
        Ok(evaluation) => {
            for day in &evaluation.warnings {
                eprintln!(
                    "  {}  black_dot={}  red_dot={}",
                    day.date, day.black_dot, day.red_dot
                );
            }
            println!("{}", evaluation.signal);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let (adapter, config) = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    if let Some(raw) = adapter.get_string("broker", "holidays") {
        if let Err(e) = parse_holidays(&raw) {
            return fail(e);
        }
    }

    let params = &config.indicators;
    eprintln!("\nTrader:");
    eprintln!("  symbol:        {}", config.symbol);
    eprintln!("  signal symbol: {}", config.signal_symbol);
    eprintln!("  history bars:  {}", config.history_bars);

    eprintln!("\nIndicators:");
    for indicator in [
        IndicatorType::CloseSma(params.ma_period),
        IndicatorType::VolumeSma(params.ma_period),
        IndicatorType::TrueRange,
        IndicatorType::Atr(params.atr_period),
        IndicatorType::ClosingRange,
        IndicatorType::UpDownVolumeRatio(params.volume_ratio_period),
    ] {
        eprintln!("  {}", indicator);
    }
    eprintln!("  minimum bars: {}", params.min_bars());

    eprintln!("\nPlanner:");
    eprintln!("  commission:  {}", config.planner.commission);
    eprintln!("  cash buffer: {:.2}", config.planner.cash_buffer);
    eprintln!("  min cash:    {:.2}", config.planner.min_cash);

    eprintln!("\nRetry:");
    eprintln!("  max attempts:  {}", config.retry.max_attempts);
    eprintln!("  initial delay: {:?}", config.retry.initial_delay);
    eprintln!("  backoff:       {:?}", config.retry.backoff);

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
