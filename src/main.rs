use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use prop_score::config::{self, Config};
use prop_score::output;
use prop_score::scoring::{Evaluator, RawMetrics, ScoreError, Strategy};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable report / ranked table
    Table,
    /// Tab-separated rows for scripting
    Tsv,
    /// JSON for dashboards and chart tooling
    Json,
}

/// Raw market figures for a single area, all in percent
#[derive(Args, Debug)]
struct MetricArgs {
    /// Annual population growth rate, e.g. 2.5 (may be negative)
    #[arg(long, allow_hyphen_values = true)]
    population_growth: f64,

    /// Gross rental yield, e.g. 5.5
    #[arg(long, allow_hyphen_values = true)]
    rental_yield: f64,

    /// New dwelling supply as a share of existing stock, e.g. 6.0
    #[arg(long, allow_hyphen_values = true)]
    supply_ratio: f64,

    /// Rental vacancy rate, e.g. 2.0
    #[arg(long, allow_hyphen_values = true)]
    vacancy_rate: f64,

    /// Share of household income spent on mortgage repayments, e.g. 28.0
    #[arg(long, allow_hyphen_values = true)]
    mortgage_stress: f64,
}

impl MetricArgs {
    fn to_raw(&self) -> RawMetrics {
        RawMetrics::new(
            self.population_growth,
            self.rental_yield,
            self.supply_ratio,
            self.vacancy_rate,
            self.mortgage_stress,
        )
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank every area in the config file (default if no subcommand)
    Compare,
    /// Score a single area given on the command line
    Evaluate {
        /// Name shown in the report
        #[arg(short, long, default_value = "Assessment Area")]
        name: String,

        #[command(flatten)]
        metrics: MetricArgs,
    },
    /// Create a config file interactively
    Init,
    /// Show the preset weighting strategies
    Strategies,
}

#[derive(Parser, Debug)]
#[command(name = "prop-score")]
#[command(about = "Score and rank real-estate areas for investment", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/prop-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Preset weights to use instead of the config file's weights
    #[arg(short, long, global = true, value_parser = parse_strategy)]
    strategy: Option<Strategy>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn parse_strategy(s: &str) -> Result<Strategy, String> {
    s.parse().map_err(|e: ScoreError| e.to_string())
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Map a failure to an exit code: bad area data is an input error,
/// everything else (weights, YAML, file access) is a config error.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ScoreError>() {
        Some(
            ScoreError::MissingMetric(_)
            | ScoreError::UnknownMetric(_)
            | ScoreError::DuplicateMetric(_),
        ) => EXIT_INPUT,
        _ => EXIT_CONFIG,
    }
}

/// Load the config file. When no path was given and the default file does
/// not exist, fall back to built-in defaults unless the command needs areas.
fn resolve_config(path: Option<&str>, required: bool) -> Result<Config> {
    if let Some(p) = path {
        return config::load_config(Some(PathBuf::from(p)));
    }
    let default_path = config::get_config_path()?;
    if default_path.exists() || required {
        config::load_config(Some(default_path))
    } else {
        tracing::debug!("no config file found, using default weights");
        Ok(Config::default())
    }
}

fn build_evaluator(config: &Config, strategy: Option<Strategy>) -> Result<Evaluator> {
    let weights = config
        .weight_set(strategy)
        .context("Invalid weight configuration")?;
    tracing::debug!(?weights, "resolved weights");
    Ok(Evaluator::new(weights))
}

fn run_evaluate(cli: &Cli, name: &str, metrics: &MetricArgs, use_colors: bool) -> Result<()> {
    let config = resolve_config(cli.config.as_deref(), false)?;
    let evaluator = build_evaluator(&config, cli.strategy)?;

    let raw = metrics.to_raw();
    let result = evaluator.evaluate(&raw);
    let recommendation = evaluator.recommend(&result);
    tracing::debug!(area = name, composite = result.composite_score, grade = %result.grade, "evaluated area");

    match cli.format {
        OutputFormat::Table => println!(
            "{}",
            output::format_report(&result, &recommendation, name, use_colors)
        ),
        OutputFormat::Tsv => {
            let rows = evaluator.compare_areas([(name, raw)]);
            println!("{}", output::format_tsv(&rows));
        }
        OutputFormat::Json => {
            let report = output::EvaluationReport {
                area_name: name,
                result: &result,
                recommendation: &recommendation,
            };
            println!("{}", output::format_json(&report)?);
        }
    }
    Ok(())
}

fn run_compare(cli: &Cli, use_colors: bool) -> Result<()> {
    let start_time = Instant::now();
    let config = resolve_config(cli.config.as_deref(), true)?;
    let evaluator = build_evaluator(&config, cli.strategy)?;

    if config.areas.is_empty() {
        anyhow::bail!(
            "No areas configured in config file. Add areas, e.g.:\n  areas:\n    Parramatta:\n      population_growth: 2.8\n      rental_yield: 5.5\n      supply_ratio: 5.0\n      vacancy_rate: 1.8\n      mortgage_stress: 30.0"
        );
    }

    let areas = config.raw_areas()?;
    tracing::debug!(count = areas.len(), "loaded areas from config");

    let rows = evaluator.compare_areas(&areas);

    match cli.format {
        OutputFormat::Table => {
            println!("{}", output::format_comparison_table(&rows, use_colors));

            // Detailed report for the top-ranked area
            if let Some(top) = rows.first() {
                if let Some(raw) = areas.get(&top.area_name) {
                    let result = evaluator.evaluate(raw);
                    let recommendation = evaluator.recommend(&result);
                    println!();
                    println!(
                        "{}",
                        output::format_report(&result, &recommendation, &top.area_name, use_colors)
                    );
                }
            }
        }
        OutputFormat::Tsv => println!("{}", output::format_tsv(&rows)),
        OutputFormat::Json => println!("{}", output::format_json(&rows)?),
    }

    tracing::debug!(
        "ranked {} areas in {:?}",
        rows.len(),
        start_time.elapsed()
    );
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let use_colors = !cli.no_color && output::should_use_colors();

    match cli.command {
        None | Some(Commands::Compare) => run_compare(&cli, use_colors),
        Some(Commands::Evaluate {
            ref name,
            ref metrics,
        }) => run_evaluate(&cli, name, metrics, use_colors),
        Some(Commands::Init) => config::init::run_init_wizard(cli.config.as_deref().map(PathBuf::from)),
        Some(Commands::Strategies) => {
            println!("{}", output::format_strategies(use_colors));
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    };
    std::process::exit(code);
}
