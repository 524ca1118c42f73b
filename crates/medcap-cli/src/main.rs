//! medcap CLI — caption preview and single-item ingestion.
//!
//! Set DATABASE_URL (required; `ingest` writes to it) and optionally
//! CAPTION_TEMPLATE and FFPROBE_PATH.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use medcap_cli::init_tracing;
use medcap_cli::local::{LocalMaterializer, NullMetadataStore, StdoutCaptionSink};
use medcap_cli::store_impl::SqlMetadataStore;
use medcap_core::render::validate_template;
use medcap_core::Config;
use medcap_db::{connect_pool, CaptionRepository};
use medcap_processing::{
    FfprobeProber, IngestionPipeline, MediaEvent, MetadataStore, PersistenceOutcome,
};

#[derive(Parser)]
#[command(name = "medcap", about = "Media caption inference and recording")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the caption a file would receive, without touching the database
    Caption {
        /// Path to the media file
        file: PathBuf,
        /// Item id to report in logs
        #[arg(long, default_value = "0")]
        item_id: i64,
    },
    /// Run the full pipeline for a file, recording metadata in Postgres
    Ingest {
        /// Path to the media file
        file: PathBuf,
        /// Item id used as the record key
        #[arg(long)]
        item_id: i64,
    },
    /// Validate a caption template against the canonical field set
    CheckTemplate {
        /// Template string; defaults to the configured one
        template: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config.validate()?;

    match cli.command {
        Commands::Caption { file, item_id } => {
            run_pipeline(&config, file, item_id, false).await?;
        }
        Commands::Ingest { file, item_id } => {
            run_pipeline(&config, file, item_id, true).await?;
        }
        Commands::CheckTemplate { template } => {
            let template = template.unwrap_or_else(|| config.caption_template.clone());
            validate_template(&template).context("template validation failed")?;
            println!("template ok");
        }
    }

    Ok(())
}

async fn run_pipeline(
    config: &Config,
    file: PathBuf,
    item_id: i64,
    persist: bool,
) -> Result<(), anyhow::Error> {
    let metadata = tokio::fs::metadata(&file)
        .await
        .with_context(|| format!("cannot stat {}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
        .ok_or_else(|| anyhow::anyhow!("input path has no usable file name"))?;

    let store: Arc<dyn MetadataStore> = if persist {
        let pool = connect_pool(config)
            .await
            .context("database connection failed")?;
        let repository = CaptionRepository::new(pool);
        repository.ensure_schema().await?;
        Arc::new(SqlMetadataStore::new(repository))
    } else {
        Arc::new(NullMetadataStore)
    };

    let pipeline = IngestionPipeline::new(
        config,
        Arc::new(LocalMaterializer::new(&file)),
        Arc::new(FfprobeProber::new(config.ffprobe_path.clone())?),
        Arc::new(StdoutCaptionSink),
        store,
    )?;

    let event = MediaEvent {
        id: item_id,
        filename,
        byte_size: metadata.len() as i64,
        caption: None,
        attributes: None,
    };

    let report = pipeline.process(&event).await?;

    if let PersistenceOutcome::Failed { reason } = &report.persistence {
        tracing::warn!(item_id, reason = %reason, "metadata was not recorded");
    }

    Ok(())
}
