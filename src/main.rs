use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use market_snap::fetch::CMC_HOME;
use market_snap::filter::MarketView;
use market_snap::{
    capture, render, save_png, save_to_csv, CaptureResponse, Config, FileSource, FilterOptions,
    MarketSnapshot, RasterCanvas, RenderOptions, UrlSource,
};

/// Capture the CoinMarketCap top page and render it as a summary card.
#[derive(Debug, Parser)]
#[command(name = "market-snap", version)]
struct Args {
    /// Saved copy of the page, re-read until the coin table shows up
    #[arg(long, value_name = "FILE", conflicts_with = "url", required_unless_present = "url")]
    input: Option<PathBuf>,

    /// Fetch the page over HTTP (defaults to the CoinMarketCap home page)
    #[arg(long, value_name = "URL", num_args = 0..=1, default_missing_value = CMC_HOME)]
    url: Option<String>,

    /// Directory for the PNG card
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    #[arg(long, default_value = market_snap::model::DEFAULT_HEADLINE)]
    headline: String,

    #[arg(long, default_value = "")]
    watermark: String,

    /// CSS color such as "#ec6714" or "rgb(236, 103, 20)"
    #[arg(long, default_value = market_snap::model::DEFAULT_ACCENT)]
    accent: String,

    /// Extra symbol to leave out of the card (repeatable)
    #[arg(long = "ignore", value_name = "SYMBOL")]
    ignore: Vec<String>,

    /// Keep stablecoins in the table and movers
    #[arg(long)]
    keep_stables: bool,

    /// Number of table rows to extract
    #[arg(long)]
    limit: Option<usize>,

    /// Also write the extracted rows as CSV
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Print the capture response as JSON
    #[arg(long)]
    json: bool,

    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    #[arg(long, value_name = "MS")]
    poll_ms: Option<u64>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(limit) = args.limit {
        config.capture.row_limit = limit;
    }
    if let Some(ms) = args.timeout_ms {
        config.capture.wait.timeout = std::time::Duration::from_millis(ms);
    }
    if let Some(ms) = args.poll_ms {
        config.capture.wait.poll_interval = std::time::Duration::from_millis(ms);
    }
    if let Some(dir) = &args.out_dir {
        config.out_dir = dir.clone();
    }
    config
        .capture
        .validate()
        .context("invalid --limit, --timeout-ms or --poll-ms")?;
    Ok(config)
}

fn print_json(response: &CaptureResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

fn print_summary(snapshot: &MarketSnapshot, filter: &FilterOptions) {
    let view = MarketView::new(snapshot, filter);
    println!("{:<5} {:<18} {:<8} {:>14} {:>10} {:>10}", "Rank", "Name", "Symbol", "Price", "24h", "7d");
    println!("{}", "-".repeat(70));
    for coin in &view.coins {
        println!(
            "{:<5} {:<18} {:<8} {:>14} {:>10} {:>10}",
            coin.rank, coin.name, coin.symbol, coin.price, coin.change_24h, coin.change_7d,
        );
    }
    println!(
        "\nBreadth: {} up / {} down / {} flat ({})",
        view.breadth.up,
        view.breadth.down,
        view.breadth.flat,
        view.breadth.mood().label()
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(&args)?;

    let result = match (&args.input, &args.url) {
        (Some(path), _) => capture(&FileSource::new(path), &config.capture).await,
        (None, Some(url)) => capture(&UrlSource::new(url.as_str())?, &config.capture).await,
        (None, None) => bail!("either --input or --url is required"),
    };

    let snapshot = match result {
        Ok(snapshot) => snapshot,
        Err(err) => {
            error!(error = %err, "capture failed");
            if args.json {
                print_json(&CaptureResponse::failure(&err))?;
            }
            return Err(err.into());
        }
    };

    let options = RenderOptions {
        watermark: args.watermark.clone(),
        accent: args.accent.clone(),
        headline: args.headline.clone(),
        filter: FilterOptions {
            ignore_symbols: args.ignore.clone(),
            ignore_stables: !args.keep_stables,
        },
    };

    if let Some(path) = &args.csv {
        save_to_csv(snapshot.coins(), path)?;
        info!(path = %path.display(), "wrote coin rows");
    }

    let mut canvas = RasterCanvas::default();
    render(&mut canvas, &snapshot, &options);
    let card = save_png(&canvas.into_image(), &config.out_dir, Utc::now())?;

    let missing = snapshot.missing_fields();
    if !missing.is_empty() {
        warn!(missing = ?missing, "rendered with partial data");
    }

    if args.json {
        print_json(&CaptureResponse::success(snapshot))?;
    } else {
        print_summary(&snapshot, &options.filter);
        if !missing.is_empty() {
            println!("Some fields are missing: {}", missing.join(", "));
        }
        println!("\nCard saved to: {}", card.display());
    }

    Ok(())
}
