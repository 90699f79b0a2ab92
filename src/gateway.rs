use chrono::NaiveDate;
use thiserror::Error;

use crate::catalog::TypeId;
use crate::storage::Database;
use crate::tree::node::{Level, Status};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("create rejected: {0}")]
    Rejected(String),
}

/// Fields sent to the gateway for one container create.
#[derive(Debug, Clone)]
pub struct ContainerFields {
    pub name: String,
    pub description: String,
    pub status: Status,
    pub ordem: i64,
}

/// Fields sent to the gateway for one node create.
#[derive(Debug, Clone)]
pub struct NodeFields {
    pub name: String,
    pub description: String,
    pub status: Status,
    pub category: Option<TypeId>,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    pub ordem: i64,
}

/// Persistence seam for the save flow. Creates must be issued top-down
/// (parent before child) so the returned id can be threaded into the
/// children; the deletes exist for saga compensation after a partial
/// failure.
pub trait ScopeGateway {
    fn create_container(
        &mut self,
        project_id: i64,
        fields: &ContainerFields,
    ) -> Result<i64, GatewayError>;

    /// `parent_id` is `None` exactly for level-1 nodes, whose parent is
    /// the container itself.
    fn create_node(
        &mut self,
        container_id: i64,
        level: Level,
        parent_id: Option<i64>,
        fields: &NodeFields,
    ) -> Result<i64, GatewayError>;

    fn delete_node(&mut self, id: i64) -> Result<(), GatewayError>;

    fn delete_container(&mut self, id: i64) -> Result<(), GatewayError>;
}

/// Gateway backed by the embedded SQLite store.
pub struct SqliteGateway<'a> {
    db: &'a Database,
}

impl<'a> SqliteGateway<'a> {
    pub fn new(db: &'a Database) -> Self {
        SqliteGateway { db }
    }
}

impl ScopeGateway for SqliteGateway<'_> {
    fn create_container(
        &mut self,
        project_id: i64,
        fields: &ContainerFields,
    ) -> Result<i64, GatewayError> {
        Ok(self.db.insert_functional_scope(project_id, fields)?)
    }

    fn create_node(
        &mut self,
        container_id: i64,
        level: Level,
        parent_id: Option<i64>,
        fields: &NodeFields,
    ) -> Result<i64, GatewayError> {
        Ok(self
            .db
            .insert_scope_node(container_id, level, parent_id, fields)?)
    }

    fn delete_node(&mut self, id: i64) -> Result<(), GatewayError> {
        self.db.delete_scope_node(id)?;
        Ok(())
    }

    fn delete_container(&mut self, id: i64) -> Result<(), GatewayError> {
        self.db.delete_functional_scope(id)?;
        Ok(())
    }
}
