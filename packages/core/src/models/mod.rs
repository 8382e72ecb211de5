//! Data Models
//!
//! - [`project`] - the persisted mind map document
//! - [`node`] / [`edge`] - graph vertices and connections, with style tables
//! - [`markdown_file`] - saved markdown snapshots
//! - [`time`] - clock abstraction and the persisted timestamp format

pub mod edge;
pub mod markdown_file;
pub mod node;
pub mod project;
pub mod time;

pub use edge::{EdgeShape, EdgeStyle, MindMapEdge};
pub use markdown_file::{MarkdownFile, MarkdownFileUpdate, StorageInfo};
pub use node::{
    MindMapNode, NodeData, NodeDataPatch, NodeStyle, NodeType, Position, ResolvedStyle,
};
pub use project::Project;
pub use time::{MockTimeProvider, SystemTimeProvider, TimeProvider};
