//! Flow records and the in-memory collection behind the editor.
//!
//! A flow is one (source, target, value) edge of the diagram. Nodes are
//! never stored; they are derived from the labels the flows mention.

pub mod collection;
pub mod draft;
pub mod types;

pub use collection::FlowCollection;
pub use draft::{DraftError, FlowDraft};
pub use types::{FlowId, FlowRecord, NodeRecord, SankeyData, seed_flows};
