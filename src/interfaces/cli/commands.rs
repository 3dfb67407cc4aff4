use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::{Cli, Commands};
use crate::application::{AskUseCase, FileParser, ModelCatalog};
use crate::domain::error::Result;
use crate::domain::table::DataFrame;
use crate::infrastructure::archive::ZipStreamReader;
use crate::infrastructure::config::{AppConfig, ConfigService};
use crate::infrastructure::llm_clients::GeminiClient;

/// Rows printed by the walkthrough preview
const DEMO_PREVIEW_ROWS: usize = 5;

pub async fn execute(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute_to(cli, &mut out).await
}

/// Run one command, writing its data output to `out`.
pub(crate) async fn execute_to<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::List { archive } => {
            let reader = ZipStreamReader::open(&archive)?;
            for name in reader.list_files() {
                writeln!(out, "{}", name)?;
            }
        }
        Commands::Preview {
            archive,
            entry,
            rows,
        } => {
            let frame = load_table(&archive, &entry)?;
            writeln!(out, "{}", frame.head(rows))?;
        }
        Commands::Models => {
            for model in model_catalog(&config).list_models().await? {
                writeln!(out, "{}", model.name)?;
            }
        }
        Commands::Ask {
            archive,
            entry,
            question,
            rows,
        } => {
            let frame = load_table(&archive, &entry)?;
            let model = model_catalog(&config)
                .select_model(&config.llm.model)
                .await?;
            let ask = AskUseCase::new(
                config.prompt_template.clone(),
                rows.unwrap_or(config.preview_rows),
            );
            writeln!(out, "{}", ask.execute(&model, &frame, &question).await?)?;
        }
        Commands::Top {
            archive,
            entry,
            column,
            count,
            ascending,
        } => {
            let frame = load_table(&archive, &entry)?;
            let sorted = frame.sort_values(&column, ascending)?;
            writeln!(out, "{}", sorted.head(count))?;
        }
        Commands::Demo {
            archive,
            entry,
            column,
            question,
        } => run_demo(&config, &archive, &entry, &column, question, out).await?,
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };

    let mut config = service.load()?;
    if let Some(key) = &cli.api_key {
        config.llm.api_key = Some(key.clone());
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    Ok(config)
}

/// Open the archive, load one entry, and close the archive again.
fn load_table(archive: &Path, entry: &str) -> Result<DataFrame> {
    let mut reader = ZipStreamReader::open(archive)?;
    FileParser::new(&mut reader).load(entry)
}

fn model_catalog(config: &AppConfig) -> ModelCatalog {
    let client = GeminiClient::with_timeout(Duration::from_secs(config.llm.timeout_secs));
    ModelCatalog::new(Arc::new(client), config.llm.clone())
}

async fn run_demo(
    config: &AppConfig,
    archive: &Path,
    entry: &str,
    column: &str,
    question: Option<String>,
    out: &mut impl Write,
) -> Result<()> {
    let frame = {
        let mut reader = ZipStreamReader::open(archive)?;
        writeln!(out, "{:?}", reader.list_files())?;
        FileParser::new(&mut reader).load(entry)?
    };
    writeln!(out, "{}\n", frame.head(DEMO_PREVIEW_ROWS))?;

    let catalog = model_catalog(config);
    for model in catalog.list_models().await? {
        writeln!(out, "{}", model.name)?;
    }

    let model = catalog.select_model(&config.llm.model).await?;
    let question = question.unwrap_or_else(|| {
        format!("Which 3 rows have the highest {} value?", column)
    });
    info!(model = model.name(), question = %question, "Asking model");

    let ask = AskUseCase::new(config.prompt_template.clone(), config.preview_rows);
    writeln!(out, "\n{}\n", ask.execute(&model, &frame, &question).await?)?;

    writeln!(out, "{}", frame.top_n(column, 3)?)?;
    Ok(())
}
