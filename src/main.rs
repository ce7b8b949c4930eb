use clap::{Parser, Subcommand};
use penny_scan::config::Config;
use penny_scan::screen::ScreenedStock;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_EXPORT: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// List stocks ranked by score (default if no subcommand)
    List {
        /// Only show stocks that pass the penny-stock criteria
        #[arg(long)]
        penny_only: bool,

        /// Print tab-separated values instead of a table
        #[arg(long)]
        tsv: bool,
    },
    /// Show the per-factor breakdown of a ranked stock
    Show {
        /// Index number of the stock (1-based, as shown in list)
        index: usize,

        /// Rank among penny stocks only
        #[arg(long)]
        penny_only: bool,
    },
    /// Write scores, raw metrics and factor breakdown to a file
    Export {
        /// Output path (defaults to penny_stock_scores_<dd_mm_yy>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write JSON records instead of CSV (factor columns are left out)
        #[arg(long)]
        json: bool,

        /// Only export stocks that pass the penny-stock criteria
        #[arg(long)]
        penny_only: bool,
    },
    /// Print the scoring table
    Factors,
}

#[derive(Parser, Debug)]
#[command(name = "penny-scan")]
#[command(about = "Penny stock screener with rule-based fundamental scoring", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/penny-scan/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Stock metrics file (.json, .yaml or .yml)
    #[arg(short, long, global = true, default_value = "stocks.json")]
    input: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load config and input, then score and rank. Exits the process on failure.
fn load_and_screen(
    config_path: Option<PathBuf>,
    input: &Path,
    penny_only: bool,
) -> (Config, Vec<ScreenedStock>) {
    let start_time = Instant::now();

    // Load and validate config
    let config = match penny_scan::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            error!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    if let Err(errors) = penny_scan::config::validate_config(&config) {
        error!("Config errors:");
        for e in errors {
            error!("  - {}", e);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let stocks = match penny_scan::stock::load_stocks(input) {
        Ok(s) => s,
        Err(e) => {
            error!("Input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };
    info!("Loaded {} stocks from {}", stocks.len(), input.display());

    let screened = penny_scan::screen::screen_stocks(stocks, &config.penny, penny_only);
    let penny_count = screened.iter().filter(|s| s.is_penny).count();
    debug!(
        "Scored {} stocks ({} penny) in {:?}",
        screened.len(),
        penny_count,
        start_time.elapsed()
    );

    (config, screened)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::List {
        penny_only: false,
        tsv: false,
    });
    let use_colors = penny_scan::output::should_use_colors();

    match command {
        Commands::Factors => {
            println!("{}", penny_scan::output::format_factor_table());
        }
        Commands::List { penny_only, tsv } => {
            let (_, screened) = load_and_screen(cli.config, &cli.input, penny_only);
            if tsv {
                println!("{}", penny_scan::output::format_tsv(&screened));
            } else {
                println!(
                    "{}",
                    penny_scan::output::format_scored_table(&screened, use_colors)
                );
            }
        }
        Commands::Show { index, penny_only } => {
            let (_, screened) = load_and_screen(cli.config, &cli.input, penny_only);
            // Validate index bounds (1-based)
            if index < 1 || index > screened.len() {
                error!(
                    "Invalid index {}. Must be between 1 and {}.",
                    index,
                    screened.len()
                );
                std::process::exit(EXIT_CONFIG);
            }
            println!(
                "{}",
                penny_scan::output::format_stock_detail(&screened[index - 1], use_colors)
            );
        }
        Commands::Export {
            output,
            json,
            penny_only,
        } => {
            let (config, screened) = load_and_screen(cli.config, &cli.input, penny_only);
            let path = output.unwrap_or_else(|| {
                penny_scan::output::default_export_path(chrono::Local::now().date_naive(), json)
            });
            let rows = penny_scan::output::build_rows(&screened, &config.export.suffix);
            let rendered = if json {
                penny_scan::output::render_json(&rows)
            } else {
                penny_scan::output::render_csv(&rows)
            };

            let written = rendered.and_then(|contents| penny_scan::output::write_export(&path, &contents));
            if let Err(e) = written {
                error!("Export failed: {:#}", e);
                std::process::exit(EXIT_EXPORT);
            }
            info!("Exported {} stocks to {}", rows.len(), path.display());
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
