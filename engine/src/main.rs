// Signal dashboard entry point
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use engine::config::DashboardSettings;
use engine::data::market_data::MarketDataGateway;
use engine::data::sample::{sample_data, MAX_SAMPLE_DAYS};
use engine::services::report::{render_sparkline, render_table};
use engine::services::{DashboardSession, DashboardView, UploadOutcome};
use shared::models::{IndicatorKind, OutputSize, PriceSeries, TimeInterval};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "signal-dashboard", version, about = "SMA / EMA / RSI over pasted, uploaded or fetched price series")]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct IndicatorArgs {
    /// SMA, EMA or RSI
    #[arg(short, long)]
    indicator: Option<IndicatorKind>,

    /// Lookback period; values below 1 are treated as 1
    #[arg(short, long, allow_negative_numbers = true)]
    period: Option<i64>,

    /// Print the view as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute over comma/space separated text or an uploaded table file
    Compute {
        #[command(flatten)]
        opts: IndicatorArgs,

        #[arg(long, conflicts_with = "file")]
        prices: Option<String>,

        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Fetch price history from Alpha Vantage and compute over the closes
    Fetch {
        symbol: String,

        #[arg(long, default_value = "daily")]
        interval: TimeInterval,

        #[arg(long)]
        output_size: Option<OutputSize>,

        /// Quote currency; switches to the daily crypto endpoint
        #[arg(long)]
        market: Option<String>,

        #[command(flatten)]
        opts: IndicatorArgs,
    },
    /// Compute over generated demo data
    Sample {
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(0..=MAX_SAMPLE_DAYS as i64))]
        days: u32,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[command(flatten)]
        opts: IndicatorArgs,
    },
}

fn clamp_period(raw: i64) -> usize {
    usize::try_from(raw.max(1)).unwrap_or(usize::MAX)
}

fn apply_indicator_args(session: &mut DashboardSession, args: &IndicatorArgs) {
    if let Some(kind) = args.indicator {
        session.set_indicator(kind);
    }
    if let Some(period) = args.period {
        session.set_period(clamp_period(period));
    }
}

fn print_view(view: &DashboardView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }
    println!("{}", render_table(view.spec.kind().as_str(), &view.rows));
    println!("{}  {}", view.spec.label(), render_sparkline(&view.result));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => DashboardSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => DashboardSettings::default(),
    }
    .with_env_overrides();

    let mut session = DashboardSession::new(&settings);

    let json = match &cli.command {
        Command::Compute { opts, prices, file } => {
            apply_indicator_args(&mut session, opts);
            if let Some(text) = prices {
                session.set_price_text(text.as_str());
            }
            if let Some(path) = file {
                let outcome = session
                    .load_file(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                if outcome == UploadOutcome::Empty {
                    tracing::warn!(path = %path.display(), "No numeric values found in file, using current prices");
                }
            }
            opts.json
        }
        Command::Fetch {
            symbol,
            interval,
            output_size,
            market,
            opts,
        } => {
            apply_indicator_args(&mut session, opts);
            let gateway = MarketDataGateway::new(&settings.market_data)?;
            let bars = match market {
                Some(market) => gateway.fetch_crypto_data(symbol, market).await,
                None => {
                    let size = output_size.unwrap_or(gateway.output_size());
                    gateway.fetch_stock_data(symbol, *interval, size).await
                }
            }
            .with_context(|| format!("Failed to fetch market data for {}", symbol))?;
            info!(symbol = %symbol, bars = bars.len(), "Fetched price history");
            session.set_price_text(PriceSeries::from_bars(&bars).to_text());
            opts.json
        }
        Command::Sample { days, seed, opts } => {
            apply_indicator_args(&mut session, opts);
            let bars = sample_data(Utc::now().date_naive(), *days, *seed);
            session.set_price_text(PriceSeries::from_bars(&bars).to_text());
            opts.json
        }
    };

    let view = session.view();
    info!(
        indicator = %view.spec.label(),
        prices = view.series.len(),
        available = view.result.available().count(),
        "Computed dashboard view"
    );
    print_view(&view, json)
}
