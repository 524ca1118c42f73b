//! SQL-backed metadata store wiring.

use async_trait::async_trait;

use medcap_core::models::{CaptionRecord, FieldMapping};
use medcap_core::AppError;
use medcap_db::CaptionRepository;
use medcap_processing::MetadataStore;

/// `MetadataStore` over the Postgres caption repository.
pub struct SqlMetadataStore {
    repository: CaptionRepository,
}

impl SqlMetadataStore {
    pub fn new(repository: CaptionRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl MetadataStore for SqlMetadataStore {
    async fn upsert(
        &self,
        item_id: i64,
        filename: &str,
        filesize: &str,
        fields: &FieldMapping,
    ) -> Result<CaptionRecord, AppError> {
        self.repository
            .upsert(item_id, filename, filesize, fields)
            .await
    }
}
