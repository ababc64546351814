//! # Netsketch Graph
//!
//! Association engine and topology assembler: turns positioned detections
//! and their recognised text into a device/interface model.
//!
//! ## Architecture
//!
//! ```text
//! DetectionBatch + Recognized (OCR fragments per region)
//!     │
//!     ├──> TopologyBuildContext::build
//!     │      ├─ zone <-> link   (every link within the attach distance)
//!     │      ├─ zone <-> zone   (petgraph, all pairs sharing a link)
//!     │      ├─ label -> link   (single closest link)
//!     │      ├─ zone text       (classified, bound to the closest zone link)
//!     │      └─ caption -> zone (closest zone within the cap)
//!     │
//!     └──> TopologyAssembler::assemble
//!            ├─ hostname or {kind}_{zone} fallback
//!            ├─ router/switch: one interface per interface label
//!            ├─ pc/server: a single interface
//!            └─ TopologyRecord + unattached notes
//! ```
//!
//! Nothing that fails to associate is lost: it ends up in
//! [`UnattachedNote`]s with a [`NoteReason`].

mod assembler;
mod builder;
mod error;
mod graph;
mod record;
mod types;

pub use assembler::{Assembly, TopologyAssembler};
pub use builder::TopologyBuildContext;
pub use error::{GraphError, Result};
pub use record::{DeviceRecord, InterfaceRecord, TopologyRecord};
pub use types::{
    AssociationConfig, BoundText, ClassifiedText, LinkAnnotation, LinkLabel, NoteReason,
    NoteSource, UnattachedNote, ZoneAnnotation, ZoneGraph,
};
