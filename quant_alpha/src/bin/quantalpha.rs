use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use quant_alpha::gaps::{weekday_label, GapSummary, GapType};
use quant_alpha::metrics::{load_metrics, metric_records};
use quant_alpha::provider::csv_source::read_history_file;
use quant_alpha::provider::CsvHistorySource;
use quant_alpha::report::{render_outcome, render_response};
use quant_alpha::{AnalysisConfig, AnalysisOutcome, HistoryProvider, Period, QuantAlpha, Result};

#[derive(Parser)]
#[command(author, version, about = "Quantitative daily briefing for B3 equities")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// History window: 1y, 2y or 5y
    #[arg(short, long, global = true)]
    period: Option<Period>,

    /// Seed of the synthetic fallback series
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Fail instead of serving synthetic data when no history is available
    #[arg(long, global = true)]
    no_fallback: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more tickers
    Analyze {
        /// Tickers, with or without the .SA suffix
        #[arg(required = true)]
        tickers: Vec<String>,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,

        /// Print only the daily report, without introduction and footer
        #[arg(long)]
        brief: bool,

        /// Read history from this CSV file
        #[arg(long, conflicts_with = "data_dir")]
        history: Option<PathBuf>,

        /// Read history from <DIR>/<TICKER>_diario_5anos.csv
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Opening gap statistics of a daily history CSV
    Gaps {
        csv: PathBuf,

        /// Ticker label for the output
        #[arg(long, default_value = "ATIVO")]
        ticker: String,

        #[arg(long)]
        json: bool,
    },

    /// Validate and print a per-weekday metrics CSV
    Metrics {
        csv: PathBuf,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(error = %err, "quantalpha failed");
            eprintln!("Erro: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    }
    .with_env_overrides()?;

    if let Some(period) = cli.period {
        config.period = period;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if cli.no_fallback {
        config.synthetic_fallback = false;
    }

    debug!(?config, "configuration loaded");
    Ok(config)
}

/// Returns `Ok(false)` when some ticker could not be analyzed
fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Analyze {
            tickers,
            json,
            brief,
            history,
            data_dir,
        } => match (history, data_dir) {
            (Some(file), _) => analyze(
                &QuantAlpha::with_source(CsvHistorySource::file(file), config),
                &tickers,
                json,
                brief,
            ),
            (None, Some(dir)) => analyze(
                &QuantAlpha::with_source(CsvHistorySource::directory(dir), config),
                &tickers,
                json,
                brief,
            ),
            (None, None) => analyze(&QuantAlpha::offline(config), &tickers, json, brief),
        },
        Commands::Gaps { csv, ticker, json } => {
            let series = read_history_file(&csv, &ticker)?;
            let summary = GapSummary::from_series(&series)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_gaps(&summary);
            }
            Ok(true)
        }
        Commands::Metrics { csv, json } => {
            let df = load_metrics(&csv)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&metric_records(&df)?)?);
            } else {
                println!("{}", df);
            }
            Ok(true)
        }
    }
}

fn analyze<P: HistoryProvider>(
    analyst: &QuantAlpha<P>,
    tickers: &[String],
    json: bool,
    brief: bool,
) -> Result<bool> {
    let outcomes: Vec<AnalysisOutcome> = tickers.iter().map(|t| analyst.analyze(t)).collect();
    let all_complete = outcomes.iter().all(AnalysisOutcome::is_complete);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            if brief {
                println!("{}", render_outcome(outcome));
            } else {
                println!("{}", render_response(outcome));
            }
        }
    }

    Ok(all_complete)
}

fn print_gaps(summary: &GapSummary) {
    println!("Gaps de abertura - {}\n", summary.ticker);
    println!(
        "{:<8} {:>8} {:>10} {:>8} {:>8} {:>8}",
        "Gap", "Pregões", "Média %", "Q1", "Mediana", "Q3"
    );
    for group in &summary.groups {
        println!(
            "{:<8} {:>8} {:>10.2} {:>8.2} {:>8.2} {:>8.2}",
            group.gap.label(),
            group.sessions,
            group.mean_variation_pct,
            group.quartiles.q1,
            group.quartiles.median,
            group.quartiles.q3
        );
    }

    println!("\nFrequência por dia da semana\n");
    print!("{:<10}", "Dia");
    for gap in GapType::ALL {
        print!(" {:>8}", gap.label());
    }
    println!();

    let mut days: Vec<_> = summary.frequency.iter().map(|c| c.weekday).collect();
    days.dedup();
    for day in days {
        print!("{:<10}", weekday_label(day));
        for gap in GapType::ALL {
            print!(" {:>8}", summary.count(day, gap));
        }
        println!();
    }
}
