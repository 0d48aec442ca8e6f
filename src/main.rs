use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use notion_tagger::autotagger::AutoTagger;
use notion_tagger::llm::{ClientSetupError, create_client};
use notion_tagger::notion::NotionClientBuilder;
use notion_tagger::pipeline::{Pipeline, PipelineOptions, RunMode, load_vocabulary, select_records};
use notion_tagger::{Config, ConfigError, Provider};
use time::OffsetDateTime;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// notion-tagger - tag Notion database records with an LLM
#[derive(Parser)]
#[command(name = "notion-tagger")]
#[command(about = "Infers and writes back tags for Notion database records")]
#[command(version)]
struct Cli {
    /// Which records to process
    #[arg(long, value_enum, default_value_t = Mode::Incremental)]
    mode: Mode,

    /// Look-back window for incremental runs, in hours
    #[arg(long, default_value_t = 24, value_name = "HOURS")]
    hours: u32,

    /// LLM provider, overriding LLM_PROVIDER
    #[arg(long, value_name = "PROVIDER")]
    llm: Option<Provider>,
}

/// Run modes exposed on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Every record in the database
    Initial,
    /// Records edited within the last --hours
    Incremental,
}

fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        // Configuration problems are the user's to fix; everything else is environmental
        let exit_code = if is_config_error(&e) { 1 } else { 2 };
        error!("{e:#}");
        std::process::exit(exit_code);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Returns `true` if any error in the chain is a configuration error.
fn is_config_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.downcast_ref::<ConfigError>().is_some()
            || matches!(
                cause.downcast_ref::<ClientSetupError>(),
                Some(ClientSetupError::Config(_))
            )
    })
}

fn run_mode(mode: Mode, hours: u32) -> RunMode {
    match mode {
        Mode::Initial => RunMode::Full,
        Mode::Incremental => RunMode::Windowed { hours },
    }
}

/// Executes one tagging run.
fn run(cli: &Cli) -> Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;
    let provider = cli.llm.unwrap_or(config.provider);

    let store = NotionClientBuilder::new(&config.notion_api_key, &config.notion_database_id)
        .build()
        .context("Failed to create Notion client")?;

    let client = create_client(provider, &config)
        .with_context(|| format!("Failed to set up {provider} client"))?;

    let vocabulary = load_vocabulary(&store, &config.tag_property);
    let tagger = AutoTagger::new(client, vocabulary);

    let mode = run_mode(cli.mode, cli.hours);
    let records = select_records(&store, mode, OffsetDateTime::now_utc())
        .context("Failed to list records")?;
    info!(count = records.len(), ?mode, %provider, "Starting tagging run");

    let pipeline = Pipeline::new(&store, &tagger, PipelineOptions::from(&config));
    let summary = pipeline.run(&records);

    info!(
        tagged = summary.tagged,
        failed = summary.failed,
        skipped = summary.skipped,
        aborted = summary.aborted,
        "Done: {} tagged, {} failed, {} skipped",
        summary.tagged,
        summary.failed,
        summary.skipped
    );

    Ok(())
}
