use sqlx::types::Json;
use sqlx::{PgPool, Postgres};

use medcap_core::models::{CaptionRecord, FieldMapping};
use medcap_core::AppError;

/// Repository for derived caption metadata.
///
/// One logical record per item id: writes go through an upsert keyed on
/// `item_id`, and `created_at` is assigned by the server on first insert
/// only; the update arm never touches it.
#[derive(Clone)]
pub struct CaptionRepository {
    pool: PgPool,
}

impl CaptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the captions table if it does not exist. Safe to run on every
    /// startup.
    #[tracing::instrument(skip(self), fields(db.table = "captions", db.operation = "create"))]
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS captions (
                item_id BIGINT PRIMARY KEY,
                filename TEXT NOT NULL,
                filesize TEXT NOT NULL,
                caption_data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert or update the record for `item_id`, converging to the latest
    /// write. `created_at` is deliberately absent from the update list.
    #[tracing::instrument(skip(self, fields), fields(db.table = "captions", db.operation = "upsert", item_id = item_id))]
    pub async fn upsert(
        &self,
        item_id: i64,
        filename: &str,
        filesize: &str,
        fields: &FieldMapping,
    ) -> Result<CaptionRecord, AppError> {
        let record = sqlx::query_as::<Postgres, CaptionRecord>(
            r#"
            INSERT INTO captions (item_id, filename, filesize, caption_data)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (item_id) DO UPDATE SET
                filename = EXCLUDED.filename,
                filesize = EXCLUDED.filesize,
                caption_data = EXCLUDED.caption_data
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(filename)
        .bind(filesize)
        .bind(Json(fields))
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    /// Fetch the record for an item id, if any.
    #[tracing::instrument(skip(self), fields(db.table = "captions", db.operation = "select", item_id = item_id))]
    pub async fn get(&self, item_id: i64) -> Result<Option<CaptionRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, CaptionRecord>(
            "SELECT * FROM captions WHERE item_id = $1",
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }
}
