//! rusty-inventory CLI - inventory optimisation and demand forecasting
//!
//! ## Example Usage
//!
//! ```bash
//! # Run the whole pipeline
//! rusty-inventory run --input skus.csv --output-dir output --horizon 6
//!
//! # Look up the Z-score used for a service level
//! rusty-inventory zscore 0.965
//!
//! # Show the effective configuration
//! rusty-inventory info
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rusty_inventory::config::PipelineConfig;
use rusty_inventory::data::SkuTableReader;
use rusty_inventory::pipeline::{InventoryPipeline, PipelineSummary};
use rusty_inventory::report::{write_all, WrittenFiles};
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

/// rusty-inventory: EOQ, safety stock and per-SKU demand forecasts
#[derive(Parser)]
#[command(name = "rusty-inventory")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Robert Fall")]
#[command(about = "Inventory optimisation and per-SKU demand forecasting", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline on a cleaned SKU table
    Run {
        /// Cleaned SKU table (CSV)
        #[arg(short = 'i', long, value_name = "CSV")]
        input: PathBuf,

        /// Directory for the output tables
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,

        /// Months to forecast
        #[arg(short = 'H', long)]
        horizon: Option<usize>,

        /// Year of the monthly columns
        #[arg(short = 'y', long)]
        reference_year: Option<i32>,
    },

    /// Show the Z-score matched for a service level
    Zscore {
        /// Target service level, e.g. 0.95
        #[arg(value_name = "LEVEL")]
        level: f64,
    },

    /// Show the effective configuration
    Info,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".rusty-inventory").join("config.toml"))
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => return Ok(PipelineConfig::default()),
        },
    };
    PipelineConfig::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Run {
            input,
            output_dir,
            horizon,
            reference_year,
        } => run_pipeline(RunConfig {
            input,
            output_dir,
            horizon,
            reference_year,
            verbose: cli.verbose,
            config,
        }),
        Commands::Zscore { level } => show_zscore(level, &config),
        Commands::Info => show_info(&config),
    });

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

struct RunConfig {
    input: PathBuf,
    output_dir: Option<PathBuf>,
    horizon: Option<usize>,
    reference_year: Option<i32>,
    verbose: bool,
    config: PipelineConfig,
}

impl RunConfig {
    /// File config with command-line overrides applied
    fn effective(&self) -> PipelineConfig {
        let mut config = self.config.clone();
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(horizon) = self.horizon {
            config.forecast.horizon = horizon;
        }
        if let Some(year) = self.reference_year {
            config.calendar.reference_year = year;
        }
        config
    }
}

fn run_pipeline(cfg: RunConfig) -> Result<()> {
    println!("{}", "Running inventory pipeline...".cyan().bold());
    println!();

    let config = cfg.effective();
    if cfg.verbose {
        println!("  {} {}", "Input:".bold(), cfg.input.display());
        println!("  {} {}", "Output dir:".bold(), config.output.dir.display());
        println!("  {} {} months", "Horizon:".bold(), config.forecast.horizon);
        println!("  {} {}", "Reference year:".bold(), config.calendar.reference_year);
        println!();
    }

    let pipeline = InventoryPipeline::new(config.clone()).context("Invalid configuration")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let start = Instant::now();
    pb.set_message("Loading SKU table...");
    let records = SkuTableReader::new()
        .read_path(&cfg.input)
        .with_context(|| format!("Failed to read {}", cfg.input.display()))?;

    pb.set_message(format!("Processing {} SKUs...", records.len()));
    let output = pipeline.run(&records)?;

    pb.set_message("Writing output tables...");
    let files = write_all(&output, &config.output)
        .with_context(|| format!("Failed to write to {}", config.output.dir.display()))?;
    pb.finish_with_message("Pipeline complete!");
    println!();

    print_summary(&output.summary, start.elapsed());
    print_files(&files);
    Ok(())
}

fn print_summary(summary: &PipelineSummary, elapsed: Duration) {
    println!("{}", "Pipeline Summary".green().bold());
    println!("{}", "================".green());
    println!("  SKUs processed:         {}", summary.sku_count);
    println!("  No demand history:      {}", warn_count(summary.no_history));
    println!("  Undefined EOQ:          {}", warn_count(summary.undefined_eoq));
    println!("  Undefined safety stock: {}", warn_count(summary.undefined_safety_stock));
    println!("  Unavailable forecasts:  {}", warn_count(summary.unavailable_forecasts));
    println!("  Elapsed:                {:.2} s", elapsed.as_secs_f64());
    println!();

    if !summary.model_counts.is_empty() {
        println!("{}", "Selected models".bold());
        for (model, count) in &summary.model_counts {
            println!("  {:<6} {}", model.as_str().cyan(), count);
        }
        println!();
    }
}

fn print_files(files: &WrittenFiles) {
    for path in [
        &files.features,
        &files.eoq,
        &files.safety_stock,
        &files.timeseries,
        &files.forecasts,
        &files.diagnostics,
    ] {
        println!("{} {}", "✓".green().bold(), path.display());
    }
}

fn warn_count(count: usize) -> colored::ColoredString {
    if count == 0 {
        count.to_string().normal()
    } else {
        count.to_string().yellow()
    }
}

fn show_zscore(level: f64, config: &PipelineConfig) -> Result<()> {
    if !level.is_finite() {
        anyhow::bail!("service level must be a finite number, got {}", level);
    }
    let entry = config.service_levels.nearest(level);
    println!(
        "  {} {} -> {} {} (z = {})",
        "Target:".bold(),
        level,
        "matched".dimmed(),
        entry.level,
        format!("{:.2}", entry.z).cyan().bold()
    );
    Ok(())
}

fn show_info(config: &PipelineConfig) -> Result<()> {
    println!(
        "{} {}",
        "rusty-inventory".cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();

    println!("{}", "Configuration".bold());
    println!("{}", "=============".dimmed());
    if let Some(path) = default_config_path() {
        println!("  {} {}", "Default config:".bold(), path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}
