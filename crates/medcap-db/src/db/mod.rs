//! Database repositories for the data access layer.
//
// Caption record repository (upsert + schema bootstrap)
pub mod captions;
//
// Pool construction from configuration
pub mod pool;

pub use captions::CaptionRepository;
pub use pool::connect_pool;
