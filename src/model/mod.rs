//! # Concept Graph Model
//!
//! Plain data that crosses every boundary: merge ↔ propagation ↔
//! statistics ↔ caller.
//!
//! Design rule: this module is pure data — no I/O, no state, no async.
//! Edge orientation is always `source = parent`, `target = child`.

pub mod label;
pub mod node;
pub mod edge;
pub mod graph;
pub mod stats;
pub mod fragment;

pub use label::{Label, canonical_key};
pub use node::{Node, NodeId, NodeType};
pub use edge::{Edge, EdgeId};
pub use graph::{GraphState, NodeMap, EdgeMap};
pub use stats::{PlayerStatistics, NodeStats, DEFAULT_ROOT_LABEL};
pub use fragment::{
    AnalysisResult, DurationInput, ParentLink, Seed, SeedMap, ROOT_LINK_WEIGHT,
};
