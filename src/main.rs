use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use fuel_orders_gen::config::{AppConfig, ConfigError, GeneratorConfig};
use fuel_orders_gen::forms::generate::{
    GenerateFormError, MonthlyForm, MultiYearForm, MultiYearRequest, SingleFileForm,
};
use fuel_orders_gen::logging;
use fuel_orders_gen::repository::CsvRepository;
use fuel_orders_gen::services::ServiceError;
use fuel_orders_gen::services::runs::{generate_backfill, generate_month, generate_single_file};

#[derive(Parser)]
#[command(propagate_version = true)]
#[command(author, version, about = "Generate synthetic petroleum sales data as CSV files", long_about = None)]
struct Cli {
    /// Seed for reproducible output (overrides GENERATOR_SEED)
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// JSON file overriding the generator defaults (overrides GENERATOR_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append one month of orders
    Monthly(MonthlyForm),
    /// Generate orders for a range of months
    MultiYear(MultiYearForm),
    /// Write one file covering a trailing window of days
    SingleFile(SingleFileForm),
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Form(#[from] GenerateFormError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

fn main() -> ExitCode {
    dotenv().ok(); // Load .env file
    let cli = Cli::parse();

    let settings = match AppConfig::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Failed to read settings: {err}");
            return ExitCode::FAILURE;
        }
    };

    match logging::init(&settings.log_dir) {
        Ok(path) => log::debug!("Logging to {}", path.display()),
        Err(err) => {
            eprintln!("Failed to initialize logging: {err}");
            return ExitCode::FAILURE;
        }
    }

    match run(cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Generation failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, settings: &AppConfig) -> Result<(), CliError> {
    let config_path = cli.config.as_deref().or(settings.generator_config.as_deref());
    let config = GeneratorConfig::load(config_path)?;

    let mut rng = match cli.seed.or(settings.seed) {
        Some(seed) => {
            log::info!("Using seed {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let repo = CsvRepository::new(&settings.data_dir);
    let today = Local::now().date_naive();

    let summary = match cli.command {
        Command::Monthly(form) => {
            generate_month(&repo, &config, &mut rng, &form.into_request(today)?)?
        }
        Command::MultiYear(form) => match form.into_request(today)? {
            MultiYearRequest::CurrentMonth(request) => {
                generate_month(&repo, &config, &mut rng, &request)?
            }
            MultiYearRequest::Backfill(request) => {
                generate_backfill(&repo, &config, &mut rng, &request)?
            }
        },
        Command::SingleFile(form) => {
            generate_single_file(&repo, &config, &mut rng, &form.into_request(today)?)?
        }
    };

    for (file, written) in &summary.files {
        log::info!(
            "{}: {written} orders",
            repo.order_file_path(file).display()
        );
    }
    log::info!(
        "Done: {} orders written using {} products and {} customers under {}",
        summary.orders_written(),
        summary.products,
        summary.customers,
        repo.root().display()
    );
    Ok(())
}
