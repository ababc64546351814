//! # Netsketch Pipeline
//!
//! Runs a whole diagram through OCR fan-out, association and assembly, and
//! keeps the resulting topology on disk.
//!
//! ```text
//! DetectionBatch ──> ShardedRecognizer ──> TopologyBuildContext ──> TopologyAssembler
//!                    (OcrEngine, shards)                              │
//!                                                                     v
//!                                              ReconstructionReport ──> TopologyStore
//! ```

mod config;
mod error;
mod pipeline;
mod store;

pub use config::ReconstructionConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, ReconstructionReport};
pub use store::{HostVars, PortVars, TopologyStore};
