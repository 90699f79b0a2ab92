use std::collections::HashMap;

use chrono::NaiveDate;
use rusqlite::{params, Result};
use tracing::debug;

use super::models::{FunctionalScopeRow, ScopeNodeRow, ScopeTypeRow};
use super::sqlite::Database;
use crate::catalog::{ScopeType, ScopeTypeCatalog, TypeId};
use crate::error::Error;
use crate::gateway::{ContainerFields, NodeFields};
use crate::tree::editor::{FieldEdit, ScopeEditor};
use crate::tree::node::{ContainerId, Level, NodeId, Status};

impl Database {
    // ── Scope Types ──────────────────────────────────────────────

    /// Installs catalog entries that are not present yet. Existing rows
    /// are left untouched, so re-seeding is harmless.
    pub fn seed_scope_types(&self, types: &[ScopeType]) -> Result<usize> {
        let tx = self.connection().unchecked_transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO scope_type \
                 (id, name, description, color_hex, icon_name, position, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            )?;
            for (position, t) in types.iter().enumerate() {
                let now = chrono::Utc::now().to_rfc3339();
                count += stmt.execute(params![
                    t.id.0,
                    t.name,
                    t.description,
                    t.color_hex,
                    t.icon_name,
                    position as i64,
                    now,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Seeded {} scope types", count);
        Ok(count)
    }

    pub fn list_scope_types(&self) -> Result<Vec<ScopeTypeRow>> {
        let mut stmt = self.connection().prepare(
            "SELECT id, name, description, color_hex, icon_name, position \
             FROM scope_type ORDER BY position, id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ScopeTypeRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    color_hex: row.get(3)?,
                    icon_name: row.get(4)?,
                    position: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Catalog snapshot as the editor consumes it. Empty when the table
    /// has never been seeded; the caller decides whether that is fatal.
    pub fn load_catalog(&self) -> Result<ScopeTypeCatalog> {
        let types = self
            .list_scope_types()?
            .into_iter()
            .map(|row| ScopeType {
                id: TypeId(row.id),
                name: row.name,
                description: row.description,
                color_hex: row.color_hex,
                icon_name: row.icon_name,
            })
            .collect();
        Ok(ScopeTypeCatalog::new(types))
    }

    // ── Functional Scopes ────────────────────────────────────────

    pub fn insert_functional_scope(
        &self,
        project_id: i64,
        fields: &ContainerFields,
    ) -> Result<i64> {
        let now = chrono::Utc::now().to_rfc3339();
        self.connection().execute(
            "INSERT INTO functional_scope \
             (project_id, name, description, status, ordem, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                project_id,
                fields.name,
                fields.description,
                fields.status.as_str(),
                fields.ordem,
                now,
            ],
        )?;
        Ok(self.connection().last_insert_rowid())
    }

    pub fn get_functional_scope(&self, id: i64) -> Result<Option<FunctionalScopeRow>> {
        match self.connection().query_row(
            "SELECT id, project_id, name, description, status, ordem, created_at, updated_at \
             FROM functional_scope WHERE id = ?1",
            params![id],
            map_functional_scope,
        ) {
            Ok(row) => Ok(Some(row)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn list_functional_scopes(
        &self,
        project_id: Option<i64>,
    ) -> Result<Vec<FunctionalScopeRow>> {
        match project_id {
            Some(project_id) => {
                let mut stmt = self.connection().prepare(
                    "SELECT id, project_id, name, description, status, ordem, created_at, updated_at \
                     FROM functional_scope WHERE project_id = ?1 ORDER BY ordem, id",
                )?;
                let rows = stmt
                    .query_map(params![project_id], map_functional_scope)?
                    .collect::<Result<Vec<_>>>()?;
                Ok(rows)
            }
            None => {
                let mut stmt = self.connection().prepare(
                    "SELECT id, project_id, name, description, status, ordem, created_at, updated_at \
                     FROM functional_scope ORDER BY ordem, id",
                )?;
                let rows = stmt
                    .query_map([], map_functional_scope)?
                    .collect::<Result<Vec<_>>>()?;
                Ok(rows)
            }
        }
    }

    /// Deletes a container row; its nodes go with it via CASCADE.
    pub fn delete_functional_scope(&self, id: i64) -> Result<usize> {
        self.connection()
            .execute("DELETE FROM functional_scope WHERE id = ?1", params![id])
    }

    // ── Scope Nodes ──────────────────────────────────────────────

    pub fn insert_scope_node(
        &self,
        container_id: i64,
        level: Level,
        parent_id: Option<i64>,
        fields: &NodeFields,
    ) -> Result<i64> {
        let now = chrono::Utc::now().to_rfc3339();
        self.connection().execute(
            "INSERT INTO scope_node \
             (container_id, parent_id, depth, scope_type_id, name, description, status, \
              start_date, target_date, estimated_hours, ordem, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
            params![
                container_id,
                parent_id,
                level.depth() as i64,
                fields.category.map(|c| c.0),
                fields.name,
                fields.description,
                fields.status.as_str(),
                fields.start_date.map(|d| d.format("%Y-%m-%d").to_string()),
                fields.target_date.map(|d| d.format("%Y-%m-%d").to_string()),
                fields.estimated_hours,
                fields.ordem,
                now,
            ],
        )?;
        Ok(self.connection().last_insert_rowid())
    }

    /// Deletes a node row; descendants cascade.
    pub fn delete_scope_node(&self, id: i64) -> Result<usize> {
        self.connection()
            .execute("DELETE FROM scope_node WHERE id = ?1", params![id])
    }

    /// All rows of one container, parents before children.
    pub fn nodes_for_container(&self, container_id: i64) -> Result<Vec<ScopeNodeRow>> {
        let mut stmt = self.connection().prepare(
            "SELECT id, container_id, parent_id, depth, scope_type_id, name, description, \
                    status, start_date, target_date, estimated_hours, ordem \
             FROM scope_node WHERE container_id = ?1 \
             ORDER BY depth, parent_id, ordem, id",
        )?;
        let rows = stmt
            .query_map(params![container_id], |row| {
                Ok(ScopeNodeRow {
                    id: row.get(0)?,
                    container_id: row.get(1)?,
                    parent_id: row.get(2)?,
                    depth: row.get(3)?,
                    scope_type_id: row.get(4)?,
                    name: row.get(5)?,
                    description: row.get(6)?,
                    status: row.get(7)?,
                    start_date: row.get(8)?,
                    target_date: row.get(9)?,
                    estimated_hours: row.get(10)?,
                    ordem: row.get(11)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count_nodes(&self, container_id: i64) -> Result<i64> {
        self.connection().query_row(
            "SELECT COUNT(*) FROM scope_node WHERE container_id = ?1",
            params![container_id],
            |row| row.get(0),
        )
    }

    // ── Hydration ────────────────────────────────────────────────

    /// Rebuilds an editor from a persisted container. Rows were
    /// validated when they were saved, so they are adopted as committed
    /// without re-running the commit checks.
    pub fn load_editor(
        &self,
        container_id: i64,
        catalog: ScopeTypeCatalog,
    ) -> std::result::Result<Option<(ScopeEditor, ContainerId)>, Error> {
        let Some(scope_row) = self.get_functional_scope(container_id)? else {
            return Ok(None);
        };

        let mut editor = ScopeEditor::new(catalog);
        let container = editor.add_container(scope_row.name.clone());
        if let Some(c) = editor.container_mut(container) {
            c.description = scope_row.description.clone();
            c.status = Status::parse(&scope_row.status).unwrap_or_default();
            c.persisted_id = Some(scope_row.id);
        }

        let mut by_row: HashMap<i64, NodeId> = HashMap::new();
        for row in self.nodes_for_container(container_id)? {
            let parent = match row.parent_id {
                Some(parent_row) => Some(
                    by_row
                        .get(&parent_row)
                        .copied()
                        .ok_or_else(|| Error::Other(format!(
                            "node row {} references missing parent row {}",
                            row.id, parent_row
                        )))?,
                ),
                None => None,
            };
            let id = editor.add_node(container, parent)?;
            editor.update_field(id, FieldEdit::Name(row.name.clone()))?;
            editor.update_field(id, FieldEdit::Description(row.description.clone()))?;
            editor.update_field(
                id,
                FieldEdit::Status(Status::parse(&row.status).unwrap_or_default()),
            )?;
            editor.update_field(
                id,
                FieldEdit::Category(row.scope_type_id.map(TypeId)),
            )?;
            editor.update_field(id, FieldEdit::StartDate(parse_date(row.start_date)?))?;
            editor.update_field(id, FieldEdit::TargetDate(parse_date(row.target_date)?))?;
            editor.update_field(
                id,
                FieldEdit::EstimatedHours(row.estimated_hours.unwrap_or(0.0)),
            )?;
            editor.mark_committed(id);
            editor.set_persisted_id(id, row.id)?;
            by_row.insert(row.id, id);
        }

        debug!(
            "Hydrated container {} ({} nodes)",
            container_id,
            by_row.len()
        );
        Ok(Some((editor, container)))
    }
}

fn map_functional_scope(row: &rusqlite::Row<'_>) -> Result<FunctionalScopeRow> {
    Ok(FunctionalScopeRow {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        status: row.get(4)?,
        ordem: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn parse_date(value: Option<String>) -> std::result::Result<Option<NaiveDate>, Error> {
    match value {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| Error::InvalidDate(s)),
    }
}
