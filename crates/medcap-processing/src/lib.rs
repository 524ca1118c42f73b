//! Medcap processing
//!
//! Collaborator seams for the messaging platform, file transport, probe tool
//! and durable store, the ffprobe-backed prober, and the per-item ingestion
//! pipeline that ties them together.

pub mod pipeline;
pub mod probe;
pub mod traits;

pub use pipeline::{IngestionPipeline, PersistenceOutcome, PipelineReport};
pub use probe::FfprobeProber;
pub use traits::{CaptionSink, FileMaterializer, MediaEvent, MediaProber, MetadataStore};
