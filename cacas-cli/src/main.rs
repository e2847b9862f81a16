//! Cacas CLI — convergence scans, backtests, and trade plans over CSV data.
//!
//! Commands:
//! - `scan` — classify a configured universe and print/export the table
//! - `batch` — backtest the configured universe, one summary row per ticker
//! - `backtest` — single-ticker backtest with full metrics
//! - `plan` — ATR stop/target trade plan for one ticker

mod csv_bars;

use anyhow::{bail, Context, Result};
use cacas_core::data::MarketData;
use cacas_core::domain::Signal;
use cacas_core::{Backtester, CacasChannel, Direction, Period, RiskManager};
use cacas_runner::{batch_backtest, scan_assets, write_csv, AssetFrames, ScanConfig, StdoutProgress};
use clap::{Parser, Subcommand};
use csv_bars::CsvBars;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cacas",
    about = "Cacas Channel — scanner de convergência diário/semanal"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a universe for daily/weekly convergences.
    Scan {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Directory with per-ticker CSV files (TICKER.csv).
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Also write the scan table to this CSV file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Backtest every ticker in the configured universe.
    Batch {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Directory with per-ticker CSV files.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Backtest a single ticker and print the full metrics.
    Backtest {
        #[arg(long)]
        ticker: String,

        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// History length: 6mo, 1y, 2y, 3y, 5y, 10y.
        #[arg(long, default_value = "2y")]
        period: String,

        /// Stop distance: ATR × this.
        #[arg(long, default_value_t = 1.5)]
        atr_mult: f64,

        /// Target distance: stop distance × this.
        #[arg(long, default_value_t = 2.0)]
        target_mult: f64,
    },
    /// Print an ATR-based trade plan for a ticker.
    Plan {
        #[arg(long)]
        ticker: String,

        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// History length: 6mo, 1y, 2y, 3y, 5y, 10y.
        #[arg(long, default_value = "1y")]
        period: String,

        /// long or short.
        #[arg(long, default_value = "long")]
        direction: String,

        /// Stop distance: ATR × this.
        #[arg(long, default_value_t = 1.5)]
        atr_mult: f64,

        /// Reward as a multiple of the risk distance.
        #[arg(long, default_value_t = 2.0)]
        target_mult: f64,

        /// Capital for position sizing (no sizing if omitted).
        #[arg(long)]
        capital: Option<f64>,

        /// Risk budget as percent of capital.
        #[arg(long, default_value_t = 1.0)]
        risk_pct: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Scan {
            config,
            data_dir,
            out,
        } => cmd_scan(&config, &data_dir, out.as_deref()),
        Commands::Batch { config, data_dir } => cmd_batch(&config, &data_dir),
        Commands::Backtest {
            ticker,
            data_dir,
            period,
            atr_mult,
            target_mult,
        } => cmd_backtest(&ticker, &data_dir, &period, atr_mult, target_mult),
        Commands::Plan {
            ticker,
            data_dir,
            period,
            direction,
            atr_mult,
            target_mult,
            capital,
            risk_pct,
        } => cmd_plan(
            &ticker, &data_dir, &period, &direction, atr_mult, target_mult, capital, risk_pct,
        ),
    }
}

fn parse_period(text: &str) -> Result<Period> {
    Ok(match text {
        "6mo" => Period::SixMonths,
        "1y" => Period::OneYear,
        "2y" => Period::TwoYears,
        "3y" => Period::ThreeYears,
        "5y" => Period::FiveYears,
        "10y" => Period::TenYears,
        other => bail!("período desconhecido '{other}' (use 6mo, 1y, 2y, 3y, 5y, 10y)"),
    })
}

fn parse_direction(text: &str) -> Result<Direction> {
    Ok(match text {
        "long" => Direction::Long,
        "short" => Direction::Short,
        other => bail!("direção desconhecida '{other}' (use long ou short)"),
    })
}

fn load_config(path: &std::path::Path) -> Result<ScanConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("lendo config {}", path.display()))?;
    Ok(ScanConfig::from_toml_str(&text)?)
}

/// Compute daily and weekly frames for every ticker; absent or too-thin
/// series stay absent and are skipped downstream.
fn build_frames(
    provider: &CsvBars,
    channel: &CacasChannel,
    tickers: &[String],
    period: Period,
    min_bars: usize,
) -> BTreeMap<String, AssetFrames> {
    tickers
        .iter()
        .map(|ticker| {
            let daily = provider
                .daily_bars(ticker, period)
                .filter(|bars| bars.len() >= min_bars)
                .map(|bars| channel.compute_full(bars, true, true));
            let weekly = provider
                .weekly_bars(ticker, period)
                .filter(|bars| bars.len() >= min_bars)
                .map(|bars| channel.compute(bars));
            (ticker.clone(), AssetFrames { daily, weekly })
        })
        .collect()
}

fn fmt_signal(signal: Option<Signal>) -> String {
    match signal {
        Some(s) => s.as_int().to_string(),
        None => "-".to_string(),
    }
}

fn cmd_scan(config_path: &std::path::Path, data_dir: &std::path::Path, out: Option<&std::path::Path>) -> Result<()> {
    let config = load_config(config_path)?;
    println!("run {}\n", &config.run_id()[..12]);

    let channel = CacasChannel::new(config.channel)?;
    let provider = CsvBars::new(data_dir);
    let assets = build_frames(
        &provider,
        &channel,
        &config.universe,
        config.period,
        config.min_bars,
    );
    let outcome = scan_assets(&assets, &StdoutProgress);

    println!(
        "\n{:<8} {:>7} {:>6}  {:<10} {:<22} descrição",
        "ticker", "semanal", "diário", "tipo", "status"
    );
    for hit in &outcome.hits {
        let record = &hit.record;
        println!(
            "{:<8} {:>7} {:>6}  {:<10} {:<22} {}",
            hit.ticker,
            fmt_signal(record.weekly_signal),
            fmt_signal(record.daily_signal),
            record.convergence_type.label(),
            record.status.label(),
            record.description,
        );
    }
    if !outcome.skipped.is_empty() {
        println!("\nSem dados: {}", outcome.skipped.join(", "));
    }

    if let Some(path) = out {
        let file =
            fs::File::create(path).with_context(|| format!("criando {}", path.display()))?;
        write_csv(file, &outcome.hits)?;
        println!("\nExportado para {}", path.display());
    }
    Ok(())
}

fn cmd_batch(config_path: &std::path::Path, data_dir: &std::path::Path) -> Result<()> {
    let config = load_config(config_path)?;
    let channel = CacasChannel::new(config.channel)?;
    let provider = CsvBars::new(data_dir);
    let assets = build_frames(
        &provider,
        &channel,
        &config.universe,
        config.period,
        config.min_bars,
    );

    let outcome = batch_backtest(&assets, config.atr_multiplier, config.target_multiplier)?;

    println!(
        "{:<8} {:>6} {:>8} {:>9} {:>9} {:>8} {:>8} {:>6} {:>6}",
        "ticker", "trades", "win%", "ret_tot%", "ret_med%", "pf", "dd%", "alvos", "stops"
    );
    for summary in &outcome.summaries {
        println!(
            "{:<8} {:>6} {:>8.1} {:>9.2} {:>9.2} {:>8.2} {:>8.2} {:>6} {:>6}",
            summary.ticker,
            summary.total_trades,
            summary.win_rate,
            summary.total_return,
            summary.avg_return,
            summary.profit_factor,
            summary.max_drawdown,
            summary.targets_hit,
            summary.stops_hit,
        );
    }
    if !outcome.skipped.is_empty() {
        println!("\nSem dados: {}", outcome.skipped.join(", "));
    }
    Ok(())
}

fn cmd_backtest(
    ticker: &str,
    data_dir: &std::path::Path,
    period: &str,
    atr_mult: f64,
    target_mult: f64,
) -> Result<()> {
    let period = parse_period(period)?;
    let provider = CsvBars::new(data_dir);
    let channel = CacasChannel::new(Default::default())?;

    let daily_bars = match provider.daily_bars(ticker, period) {
        Some(bars) => bars,
        None => bail!("sem dados para {ticker}"),
    };
    let weekly_bars = provider
        .weekly_bars(ticker, period)
        .unwrap_or_default();

    let daily = channel.compute(daily_bars);
    let weekly = channel.compute(weekly_bars);

    let backtester = Backtester::new(atr_mult, target_mult)?;
    let result = backtester.run(&daily, &weekly);
    let metrics = &result.metrics;

    if let (Some(start), Some(end)) = (result.start_date, result.end_date) {
        println!("Período: {start} até {end}");
    }
    println!("Trades: {} ({} alvos, {} stops)", metrics.total_trades, metrics.targets_hit, metrics.stops_hit);
    println!(
        "Win rate: {:.1}% (ajustado {:.1}%)",
        metrics.win_rate, metrics.adjusted_win_rate
    );
    println!(
        "Retorno total: {:.2}%  médio: {:.2}%  melhor: {:.2}%  pior: {:.2}%",
        metrics.total_return, metrics.avg_return, metrics.best_trade, metrics.worst_trade
    );
    println!(
        "Profit factor: {:.2}  Max drawdown: {:.2}%  Sharpe: {:.2}",
        metrics.profit_factor, metrics.max_drawdown, metrics.sharpe_ratio
    );
    println!(
        "Expectância: {:.2}%  Tempo médio: {:.0} dias",
        metrics.expectancy, metrics.avg_days_in_trade
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_plan(
    ticker: &str,
    data_dir: &std::path::Path,
    period: &str,
    direction: &str,
    atr_mult: f64,
    target_mult: f64,
    capital: Option<f64>,
    risk_pct: f64,
) -> Result<()> {
    let period = parse_period(period)?;
    let direction = parse_direction(direction)?;
    let provider = CsvBars::new(data_dir);

    let bars = match provider.daily_bars(ticker, period) {
        Some(bars) => bars,
        None => bail!("sem dados para {ticker}"),
    };

    let risk_manager = RiskManager::new(cacas_core::indicators::DEFAULT_ATR_PERIOD, atr_mult)?;
    let plan = match risk_manager.trade_plan(&bars, direction, target_mult, capital, risk_pct) {
        Some(plan) => plan,
        None => bail!("histórico insuficiente para calcular ATR de {ticker}"),
    };

    let channel = CacasChannel::new(Default::default())?;
    let frame = channel.compute(bars);

    println!("PLANO DE TRADE — {ticker}");
    if let Some(snapshot) = frame.latest() {
        let label = match snapshot.signal {
            Signal::Bullish => "COMPRA",
            Signal::Bearish => "VENDA",
            Signal::Neutral => "NEUTRO",
        };
        println!("Sinal atual: {label} ({})", snapshot.date);
    }
    println!(
        "Entrada: R$ {:.2} ({})",
        plan.entry_price,
        match plan.direction {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    );
    println!(
        "Stop: R$ {:.2}  distância R$ {:.2}  risco R$ {:.2} ({:.2}%)",
        plan.stop.stop_price, plan.stop.stop_distance, plan.stop.risk, plan.stop.risk_pct
    );
    println!(
        "Alvo {:.1}x: R$ {:.2}  ganho R$ {:.2} ({:.2}%)",
        plan.risk_reward, plan.target.price, plan.target.gain, plan.target.gain_pct
    );
    for target in &plan.all_targets {
        println!(
            "  {:.1}x → R$ {:.2} ({:+.2}%)",
            target.multiplier, target.price, target.gain_pct
        );
    }
    println!("ATR: {:.2}", plan.atr);
    if let Some(position) = &plan.position {
        println!(
            "Posição: {} ações  R$ {:.2} ({:.1}% do capital, risco R$ {:.2})",
            position.shares, position.position_value, position.position_pct, position.risk_amount
        );
    }
    Ok(())
}
