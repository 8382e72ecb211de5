//! Editor
//!
//! [`EditorSession`] is the working copy behind the canvas; [`EditorMessage`]
//! is how node widgets and toolbars ask it to change.

mod messages;
mod session;

pub use messages::{EditorMessage, EditorOutcome, ExportFormat, ExportedFile};
pub use session::{EditorSession, DUPLICATE_OFFSET, NEW_NODE_AREA};
