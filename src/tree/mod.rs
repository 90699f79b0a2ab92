pub mod editor;
pub mod node;
pub mod rollup;

pub use editor::{Container, FieldEdit, ScopeEditor};
pub use node::{ContainerId, Level, NodeId, ScopeNode, Status};
