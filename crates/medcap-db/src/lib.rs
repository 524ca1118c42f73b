//! Medcap database layer
//!
//! Postgres repositories for derived caption metadata. The caption table is
//! bootstrapped idempotently at startup; writes converge through an upsert
//! keyed on the platform item id.

pub mod db;

pub use db::{connect_pool, CaptionRepository};
