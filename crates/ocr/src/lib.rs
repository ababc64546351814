//! # Netsketch OCR
//!
//! Runs a black-box OCR engine over every detected region and turns its raw
//! readings into [`TextFragment`](netsketch_model::TextFragment)s.
//!
//! ## Fan-out
//!
//! ```text
//! regions ──► shard_ranges(len, 3)
//!               │
//!               ├─ shard 0 ──► spawn_blocking ──► map 0 ─┐
//!               ├─ shard 1 ──► spawn_blocking ──► map 1 ─┼─► barrier ──► merged map
//!               └─ shard 2 ──► spawn_blocking ──► map 2 ─┘
//! ```
//!
//! Shard membership is a pure function of the input length. Workers never
//! share a result map, and nothing is returned until every worker is done.
//! The merged map holds exactly one entry per submitted region.
//!
//! ## Reading order
//!
//! A label may come back from the engine in several pieces;
//! [`reading_order`] and [`join_fragments`] put them back together.

mod engine;
mod error;
mod reading;
mod shard;

pub use engine::{OcrEngine, RegionReadings, ReplayEngine};
pub use error::{OcrError, Result};
pub use reading::{join_fragments, read_label, reading_order};
pub use shard::{shard_ranges, Recognized, ShardedRecognizer};
