//! Per-item ingestion: extract → merge → render → caption → persist.

use std::sync::Arc;
use tracing::{info, warn};

use medcap_core::extract::FilenameExtractor;
use medcap_core::format::format_size;
use medcap_core::merge::merge_attributes;
use medcap_core::models::{FieldMapping, MediaAttributes};
use medcap_core::render::render_caption;
use medcap_core::wish::current_wish;
use medcap_core::{AppError, Config};

use crate::traits::{CaptionSink, FileMaterializer, MediaEvent, MediaProber, MetadataStore};

/// How the durable write for one item ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceOutcome {
    Recorded,
    /// Storage failed after all attempts; the caption edit stands.
    Failed { reason: String },
    /// Never attempted because the caption edit itself failed.
    Skipped,
}

/// What happened to one item.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub item_id: i64,
    pub caption: String,
    pub caption_applied: bool,
    /// Whether probed attributes made it into the merge.
    pub probe_applied: bool,
    pub persistence: PersistenceOutcome,
}

/// Orchestrates the per-item flow.
///
/// Each run builds a fresh field mapping and shares no mutable state with
/// other runs; concurrent items are independent. The only transient resource
/// is the materialized file used for probing, which is deleted on every exit
/// path.
pub struct IngestionPipeline {
    extractor: FilenameExtractor,
    caption_template: String,
    store_retry_attempts: u32,
    materializer: Arc<dyn FileMaterializer>,
    prober: Arc<dyn MediaProber>,
    sink: Arc<dyn CaptionSink>,
    store: Arc<dyn MetadataStore>,
}

impl IngestionPipeline {
    pub fn new(
        config: &Config,
        materializer: Arc<dyn FileMaterializer>,
        prober: Arc<dyn MediaProber>,
        sink: Arc<dyn CaptionSink>,
        store: Arc<dyn MetadataStore>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            extractor: FilenameExtractor::new()?,
            caption_template: config.caption_template.clone(),
            store_retry_attempts: config.store_retry_attempts,
            materializer,
            prober,
            sink,
            store,
        })
    }

    /// Process one item.
    ///
    /// Probe and storage trouble degrade into the report; an `Err` here means
    /// the item could not be captioned at all (negative size, or a template
    /// hole that startup validation should have caught).
    #[tracing::instrument(skip(self, event), fields(item_id = event.id, filename = %event.filename))]
    pub async fn process(&self, event: &MediaEvent) -> Result<PipelineReport, AppError> {
        let probed = self.probe_transient_file(event).await;

        let mut fields = self.extractor.extract(&event.filename);
        merge_attributes(&mut fields, event.attributes.as_ref(), probed.as_ref());

        let filesize = format_size(event.byte_size)?;
        fields.set("filename", event.filename.clone());
        fields.set("filesize", filesize.clone());
        fields.set("wish", current_wish());
        fields.set("caption", event.caption.clone().unwrap_or_default());

        let caption = render_caption(&self.caption_template, &fields)?;

        if let Err(error) = self.sink.edit_caption(event.id, &caption).await {
            warn!(item_id = event.id, %error, "Caption edit failed; skipping persistence");
            return Ok(PipelineReport {
                item_id: event.id,
                caption,
                caption_applied: false,
                probe_applied: probed.is_some(),
                persistence: PersistenceOutcome::Skipped,
            });
        }

        let persistence = self.persist(event, &filesize, &fields).await;

        Ok(PipelineReport {
            item_id: event.id,
            caption,
            caption_applied: true,
            probe_applied: probed.is_some(),
            persistence,
        })
    }

    /// Materialize, probe, and always delete the transient file.
    ///
    /// Any trouble degrades to `None`: the item continues with platform and
    /// filename-derived values only.
    async fn probe_transient_file(&self, event: &MediaEvent) -> Option<MediaAttributes> {
        let path = match self.materializer.materialize(event.id).await {
            Ok(path) => path,
            Err(error) => {
                info!(item_id = event.id, %error, "Materialization failed; probe skipped");
                return None;
            }
        };

        let probed = self.prober.probe(&path).await;

        if let Err(error) = tokio::fs::remove_file(&path).await {
            warn!(
                item_id = event.id,
                path = %path.display(),
                %error,
                "Failed to delete transient file"
            );
        }

        match probed {
            Ok(attributes) => Some(attributes),
            Err(error) => {
                info!(item_id = event.id, %error, "Probe failed; continuing without probed attributes");
                None
            }
        }
    }

    /// Best-effort durable write. The caption already on the item is worth
    /// more than the audit record, so failure here never unwinds the edit.
    async fn persist(
        &self,
        event: &MediaEvent,
        filesize: &str,
        fields: &FieldMapping,
    ) -> PersistenceOutcome {
        let mut attempt = 0;
        loop {
            match self
                .store
                .upsert(event.id, &event.filename, filesize, fields)
                .await
            {
                Ok(_) => return PersistenceOutcome::Recorded,
                Err(error) => {
                    if attempt < self.store_retry_attempts {
                        attempt += 1;
                        warn!(item_id = event.id, attempt, %error, "Metadata upsert failed; retrying");
                        continue;
                    }
                    warn!(item_id = event.id, %error, "Metadata upsert failed; caption edit stands");
                    return PersistenceOutcome::Failed {
                        reason: error.to_string(),
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use medcap_core::models::{CaptionRecord, FieldMapping};

    fn test_config(template: &str) -> Config {
        Config {
            database_url: "postgres://localhost/unused".to_string(),
            caption_template: template.to_string(),
            ffprobe_path: "ffprobe".to_string(),
            db_max_connections: 1,
            db_timeout_seconds: 1,
            store_retry_attempts: 0,
        }
    }

    fn event(filename: &str) -> MediaEvent {
        MediaEvent {
            id: 7,
            filename: filename.to_string(),
            byte_size: 1536,
            caption: Some("old caption".to_string()),
            attributes: Some(MediaAttributes {
                duration_secs: Some(200.0),
                width: Some(1280),
                height: Some(720),
                mime_type: Some("video/mp4".to_string()),
            }),
        }
    }

    /// Hands out a real scratch file and remembers its path so tests can
    /// assert the pipeline deleted it.
    struct MockMaterializer {
        fail: bool,
        handed_out: Mutex<Vec<PathBuf>>,
    }

    impl MockMaterializer {
        fn new() -> Self {
            Self {
                fail: false,
                handed_out: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                handed_out: Mutex::new(Vec::new()),
            }
        }

        fn paths(&self) -> Vec<PathBuf> {
            self.handed_out.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FileMaterializer for MockMaterializer {
        async fn materialize(&self, _item_id: i64) -> anyhow::Result<PathBuf> {
            if self.fail {
                anyhow::bail!("download refused");
            }
            let path = tempfile::NamedTempFile::new()?.into_temp_path().keep()?;
            self.handed_out.lock().unwrap().push(path.clone());
            Ok(path)
        }
    }

    struct MockProber {
        result: Option<MediaAttributes>,
    }

    #[async_trait]
    impl MediaProber for MockProber {
        async fn probe(&self, _path: &Path) -> anyhow::Result<MediaAttributes> {
            self.result
                .clone()
                .ok_or_else(|| anyhow::anyhow!("no stream"))
        }
    }

    struct MockSink {
        fail: bool,
        edits: Mutex<Vec<(i64, String)>>,
    }

    impl MockSink {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                edits: Mutex::new(Vec::new()),
            }
        }

        fn edits(&self) -> Vec<(i64, String)> {
            self.edits.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CaptionSink for MockSink {
        async fn edit_caption(&self, item_id: i64, caption: &str) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("flood wait");
            }
            self.edits.lock().unwrap().push((item_id, caption.to_string()));
            Ok(())
        }
    }

    struct MockStore {
        failures_remaining: AtomicU32,
        upserts: Mutex<Vec<(i64, String, String, FieldMapping)>>,
    }

    impl MockStore {
        fn new() -> Self {
            Self::failing_times(0)
        }

        fn failing_times(failures: u32) -> Self {
            Self {
                failures_remaining: AtomicU32::new(failures),
                upserts: Mutex::new(Vec::new()),
            }
        }

        fn upserts(&self) -> Vec<(i64, String, String, FieldMapping)> {
            self.upserts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MetadataStore for MockStore {
        async fn upsert(
            &self,
            item_id: i64,
            filename: &str,
            filesize: &str,
            fields: &FieldMapping,
        ) -> Result<CaptionRecord, AppError> {
            let remaining = self.failures_remaining.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
                return Err(AppError::Internal("connection refused".to_string()));
            }
            self.upserts.lock().unwrap().push((
                item_id,
                filename.to_string(),
                filesize.to_string(),
                fields.clone(),
            ));
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

    struct Fixture {
        materializer: Arc<MockMaterializer>,
        sink: Arc<MockSink>,
        store: Arc<MockStore>,
        pipeline: IngestionPipeline,
    }

    fn fixture(
        config: Config,
        materializer: MockMaterializer,
        prober: MockProber,
        sink: MockSink,
        store: MockStore,
    ) -> Fixture {
        let materializer = Arc::new(materializer);
        let sink = Arc::new(sink);
        let store = Arc::new(store);
        let pipeline = IngestionPipeline::new(
            &config,
            materializer.clone(),
            Arc::new(prober),
            sink.clone(),
            store.clone(),
        )
        .unwrap();
        Fixture {
            materializer,
            sink,
            store,
            pipeline,
        }
    }

    fn probed_attributes() -> MediaAttributes {
        MediaAttributes {
            duration_secs: Some(199.0),
            width: Some(1920),
            height: Some(1080),
            mime_type: Some("matroska,webm".to_string()),
        }
    }

    fn assert_transient_files_deleted(materializer: &MockMaterializer) {
        for path in materializer.paths() {
            assert!(!path.exists(), "transient file left behind: {:?}", path);
        }
        assert!(!materializer.paths().is_empty(), "materializer never ran");
    }

    #[tokio::test]
    async fn happy_path_captions_and_records() {
        let fx = fixture(
            test_config("{title} {resolution} {mime_type} {filesize}"),
            MockMaterializer::new(),
            MockProber {
                result: Some(probed_attributes()),
            },
            MockSink::new(false),
            MockStore::new(),
        );

        let report = fx
            .pipeline
            .process(&event("Movie.Title.[2021].1080p.[English]-Artist-.mkv"))
            .await
            .unwrap();

        assert!(report.caption_applied);
        assert!(report.probe_applied);
        assert_eq!(report.persistence, PersistenceOutcome::Recorded);
        // probed values win over platform values
        assert_eq!(
            report.caption,
            "Movie.Title. 1920x1080 matroska,webm 1.50 KB"
        );

        let edits = fx.sink.edits();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].0, 7);

        let upserts = fx.store.upserts();
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts[0].1, "Movie.Title.[2021].1080p.[English]-Artist-.mkv");
        assert_eq!(upserts[0].2, "1.50 KB");
        assert_eq!(upserts[0].3.get("caption"), Some("old caption"));

        assert_transient_files_deleted(&fx.materializer);
    }

    #[tokio::test]
    async fn probe_failure_degrades_to_platform_values() {
        let fx = fixture(
            test_config("{resolution} {duration}"),
            MockMaterializer::new(),
            MockProber { result: None },
            MockSink::new(false),
            MockStore::new(),
        );

        let report = fx.pipeline.process(&event("Clip.mkv")).await.unwrap();

        assert!(report.caption_applied);
        assert!(!report.probe_applied);
        assert_eq!(report.persistence, PersistenceOutcome::Recorded);
        assert_eq!(report.caption, "1280x720 0:03:20");
        assert_transient_files_deleted(&fx.materializer);
    }

    #[tokio::test]
    async fn materializer_failure_still_captions() {
        let fx = fixture(
            test_config("{title}"),
            MockMaterializer::failing(),
            MockProber { result: None },
            MockSink::new(false),
            MockStore::new(),
        );

        let report = fx.pipeline.process(&event("Clip.mkv")).await.unwrap();
        assert!(report.caption_applied);
        assert!(!report.probe_applied);
        assert_eq!(report.persistence, PersistenceOutcome::Recorded);
    }

    #[tokio::test]
    async fn sink_failure_skips_persistence_but_cleans_up() {
        let fx = fixture(
            test_config("{title}"),
            MockMaterializer::new(),
            MockProber {
                result: Some(probed_attributes()),
            },
            MockSink::new(true),
            MockStore::new(),
        );

        let report = fx.pipeline.process(&event("Clip.mkv")).await.unwrap();

        assert!(!report.caption_applied);
        assert_eq!(report.persistence, PersistenceOutcome::Skipped);
        assert!(fx.store.upserts().is_empty());
        assert_transient_files_deleted(&fx.materializer);
    }

    #[tokio::test]
    async fn store_failure_leaves_caption_standing() {
        let fx = fixture(
            test_config("{title}"),
            MockMaterializer::new(),
            MockProber {
                result: Some(probed_attributes()),
            },
            MockSink::new(false),
            MockStore::failing_times(u32::MAX),
        );

        let report = fx.pipeline.process(&event("Clip.mkv")).await.unwrap();

        assert!(report.caption_applied);
        assert_eq!(fx.sink.edits().len(), 1);
        assert!(matches!(
            report.persistence,
            PersistenceOutcome::Failed { .. }
        ));
        assert_transient_files_deleted(&fx.materializer);
    }

    #[tokio::test]
    async fn bounded_retry_recovers_from_transient_store_failure() {
        let mut config = test_config("{title}");
        config.store_retry_attempts = 2;
        let fx = fixture(
            config,
            MockMaterializer::new(),
            MockProber { result: None },
            MockSink::new(false),
            MockStore::failing_times(1),
        );

        let report = fx.pipeline.process(&event("Clip.mkv")).await.unwrap();
        assert_eq!(report.persistence, PersistenceOutcome::Recorded);
        assert_eq!(fx.store.upserts().len(), 1);
    }

    #[tokio::test]
    async fn negative_size_is_rejected_after_cleanup() {
        let fx = fixture(
            test_config("{title}"),
            MockMaterializer::new(),
            MockProber {
                result: Some(probed_attributes()),
            },
            MockSink::new(false),
            MockStore::new(),
        );

        let mut bad = event("Clip.mkv");
        bad.byte_size = -1;
        let err = fx.pipeline.process(&bad).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(fx.sink.edits().is_empty());
        assert_transient_files_deleted(&fx.materializer);
    }
}
