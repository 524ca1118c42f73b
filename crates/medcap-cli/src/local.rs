//! Local-file collaborators for the CLI.
//!
//! The CLI processes a file on disk instead of a live platform item: the
//! materializer copies the input to a scratch path the pipeline is free to
//! delete, the caption sink prints the rendered caption, and the null store
//! discards writes for database-free previews.

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;

use medcap_core::models::{CaptionRecord, FieldMapping};
use medcap_core::AppError;
use medcap_processing::{CaptionSink, FileMaterializer, MetadataStore};

/// Copies the input file to a scratch path per materialization.
pub struct LocalMaterializer {
    source: PathBuf,
}

impl LocalMaterializer {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

#[async_trait]
impl FileMaterializer for LocalMaterializer {
    async fn materialize(&self, item_id: i64) -> anyhow::Result<PathBuf> {
        let scratch = std::env::temp_dir().join(format!(
            "medcap-{}-{}",
            std::process::id(),
            item_id
        ));
        tokio::fs::copy(&self.source, &scratch).await?;
        Ok(scratch)
    }
}

/// Prints the rendered caption instead of editing a platform message.
pub struct StdoutCaptionSink;

#[async_trait]
impl CaptionSink for StdoutCaptionSink {
    async fn edit_caption(&self, _item_id: i64, caption: &str) -> anyhow::Result<()> {
        println!("{}", caption);
        Ok(())
    }
}

/// Discards writes; used by the database-free `caption` preview.
pub struct NullMetadataStore;

#[async_trait]
impl MetadataStore for NullMetadataStore {
    async fn upsert(
        &self,
        item_id: i64,
        filename: &str,
        filesize: &str,
        fields: &FieldMapping,
    ) -> Result<CaptionRecord, AppError> {
        Ok(CaptionRecord {
            item_id,
            filename: filename.to_string(),
            filesize: filesize.to_string(),
            caption_data: serde_json::to_value(fields)
                .map_err(|err| AppError::Internal(err.to_string()))?,
            created_at: Utc::now(),
        })
    }
}
