pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::interfaces::cli::Cli;

pub use crate::application::{AskUseCase, FileParser, GenerativeModel, ModelCatalog};
pub use crate::domain::error::{AppError, Result};
pub use crate::domain::llm_config::LLMConfig;
pub use crate::domain::model::ModelDescriptor;
pub use crate::domain::prompt::PromptTemplate;
pub use crate::domain::table::DataFrame;
pub use crate::infrastructure::archive::{ArchiveEntry, ZipStreamReader};
pub use crate::infrastructure::config::{AppConfig, ConfigService};
pub use crate::infrastructure::csv::CsvParser;
pub use crate::infrastructure::llm_clients::{GeminiClient, LLMClient};

pub fn run() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to start runtime: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(interfaces::cli::execute(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
