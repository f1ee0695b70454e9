// acecast entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, filtered by RUST_LOG)
// 2. Load config
// 3. Open database
// 4. Seed the venue reference store
// 5. Build provider clients and the prediction service
// 6. Run the requested command and print the result

use std::path::Path;
use std::sync::Arc;

use acecast_app::assemble::Assembler;
use acecast_app::service::PredictionService;
use acecast_core::config;
use acecast_core::db::Database;
use acecast_core::model::{HistoryEntry, HistorySummary, Prediction};
use acecast_core::venues::VenueStore;
use acecast_sources::{MlbStatsClient, OpenMeteoClient};
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "acecast")]
#[command(about = "Pick the day's most promising starting pitcher")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Date to predict (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    /// Ignore any cached prediction and fetch fresh data
    #[arg(long, global = true)]
    force: bool,

    /// Skip weather lookups
    #[arg(long, global = true)]
    no_weather: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show the prediction for the date (default)
    Predict,
    /// Show every stored pick, most recent first, with a summary
    History,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Initialize tracing
    init_tracing()?;

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;

    // 3. Open database
    let db_path = config.database_path()?;
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db_path = db_path.to_string_lossy().into_owned();
    let db = Database::open(&db_path).context("failed to open database")?;
    info!("Database opened at {db_path}");

    // 4. Seed the venue reference store
    let venues = match VenueStore::load_csv(Path::new(&config.data_paths.venues)) {
        Ok(store) => {
            info!("Loaded {} venues", store.len());
            store
        }
        Err(e) => {
            warn!("Venue seed unavailable, starting empty: {e}");
            VenueStore::new()
        }
    };

    // 5. Build provider clients and the prediction service
    let stats = MlbStatsClient::from_config(&config)?;
    let weather = OpenMeteoClient::from_config(&config)?;
    let assembler = Assembler::new(Arc::new(stats), Arc::new(weather), Arc::new(venues));
    let service = PredictionService::new(assembler, db);

    // 6. Run the command
    match cli.command.unwrap_or(Command::Predict) {
        Command::Predict => {
            let date = cli
                .date
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            let include_weather = config.prediction.include_weather && !cli.no_weather;
            let prediction = service
                .fetch_prediction(date, cli.force, include_weather)
                .await;
            print_prediction(&prediction);
        }
        Command::History => {
            let entries = service.history_entries()?;
            let summary = service.history_summary()?;
            print_history(&entries, &summary);
        }
    }

    Ok(())
}

/// Initialize tracing to stderr so stdout carries only the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("acecast=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

fn print_prediction(prediction: &Prediction) {
    let c = &prediction.candidate;
    println!("{}", prediction.date);
    println!(
        "{} ({}HP, {})  confidence {:.1}{}",
        c.name,
        c.hand.code(),
        c.team.name,
        prediction.confidence_score,
        if prediction.is_sample { "  [sample data]" } else { "" }
    );
    for insight in &prediction.insights {
        println!("  {:<14} {}", insight.title, insight.detail);
    }
}

fn print_history(entries: &[HistoryEntry], summary: &HistorySummary) {
    if entries.is_empty() {
        println!("No predictions stored yet.");
        return;
    }
    for e in entries {
        println!("{}  {:>6.1}  {}", e.date, e.score, e.pitcher_name);
    }
    println!();
    if let (Some(best), Some(worst), Some(avg)) = (&summary.best, &summary.worst, summary.average) {
        println!("best    {:>6.1}  {} ({})", best.score, best.pitcher_name, best.date);
        println!("worst   {:>6.1}  {} ({})", worst.score, worst.pitcher_name, worst.date);
        println!("average {avg:>6.1}");
    }
}
