//! Collaborator contracts consumed by the ingestion pipeline.
//!
//! The messaging platform, raw-file transport, probe tool and durable store
//! are external systems; the pipeline only sees these traits. Concrete
//! implementations live with the binaries.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use medcap_core::models::{CaptionRecord, FieldMapping, MediaAttributes};
use medcap_core::AppError;

/// One incoming media item, as delivered by the message source.
#[derive(Debug, Clone)]
pub struct MediaEvent {
    /// Platform message id; the identity key for the persisted record.
    pub id: i64,
    pub filename: String,
    pub byte_size: i64,
    /// Caption already on the item, if any.
    pub caption: Option<String>,
    /// Attributes the platform already knows (video messages carry these).
    pub attributes: Option<MediaAttributes>,
}

/// Writes the rendered caption back to the item. The pipeline calls this
/// exactly once per item.
#[async_trait]
pub trait CaptionSink: Send + Sync {
    async fn edit_caption(&self, item_id: i64, caption: &str) -> anyhow::Result<()>;
}

/// Produces a local file containing the item's bytes, for probing. The
/// pipeline deletes the returned path after use regardless of outcome.
#[async_trait]
pub trait FileMaterializer: Send + Sync {
    async fn materialize(&self, item_id: i64) -> anyhow::Result<PathBuf>;
}

/// Inspects a media file's container/streams for technical attributes.
#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> anyhow::Result<MediaAttributes>;
}

/// Durable keyed store for derived metadata.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn upsert(
        &self,
        item_id: i64,
        filename: &str,
        filesize: &str,
        fields: &FieldMapping,
    ) -> Result<CaptionRecord, AppError>;
}
