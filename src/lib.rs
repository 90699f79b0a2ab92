pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod import;
pub mod save;
pub mod storage;
pub mod tree;

pub use catalog::{ScopeType, ScopeTypeCatalog, TypeId};
pub use config::AppConfig;
pub use error::{Error, ValidationError};
pub use gateway::{ScopeGateway, SqliteGateway};
pub use save::{SaveReport, SaveReporter, SilentReporter};
pub use tree::{Container, ContainerId, FieldEdit, Level, NodeId, ScopeEditor, ScopeNode, Status};
