//! Quality-measure command-line interface

use clap::{ArgAction, Parser, Subcommand};
use octofhir_measure::cli::output::{self, OutputFormat};
use octofhir_measure::cli::{evaluate, list, validate};
use std::path::PathBuf;

/// Quality-measure command-line tool
#[derive(Parser)]
#[command(name = "measure")]
#[command(author, version, about = "Healthcare quality-measure compliance tools", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Code set registry file (default: built-in catalogue)
    #[arg(short, long, global = true)]
    registry: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available measures
    List,

    /// Evaluate measures over a population dataset
    Evaluate {
        /// Measure id (repeatable, or "all")
        #[arg(short, long = "measure", required = true)]
        measures: Vec<String>,

        /// Measurement year
        #[arg(short, long)]
        year: i32,

        /// Dataset file (JSON with members, claims, pharmacy, labs)
        #[arg(short, long)]
        data: PathBuf,

        /// Only emit members with gaps, in outreach order
        #[arg(long, conflicts_with = "summary_only")]
        gaps_only: bool,

        /// Only emit population summaries
        #[arg(long)]
        summary_only: bool,
    },

    /// Validate the registry and datasets
    Validate {
        /// Dataset files to check
        data: Vec<PathBuf>,

        /// Strict mode (warnings as errors)
        #[arg(short, long)]
        strict: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .init();
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::List => list::list(list::ListConfig {
            registry: cli.registry,
            output_format: cli.format,
            output_file: cli.output,
        }),

        Commands::Evaluate {
            measures,
            year,
            data,
            gaps_only,
            summary_only,
        } => evaluate::evaluate(evaluate::EvaluateConfig {
            measures,
            year,
            data,
            registry: cli.registry,
            gaps_only,
            summary_only,
            verbose: cli.verbose > 0,
            output_format: cli.format,
            output_file: cli.output,
        }),

        Commands::Validate { data, strict } => validate::validate(validate::ValidateConfig {
            registry: cli.registry,
            data,
            strict,
            verbose: cli.verbose > 0,
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
