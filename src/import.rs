//! Plan documents: a JSON description of functional scopes that is
//! replayed through the editor (so every commit-time rule applies) and
//! can then be saved through a gateway.
//!
//! Level is implied by nesting depth; `scope_type` names a catalog
//! entry and is only meaningful on top-level items.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::catalog::ScopeTypeCatalog;
use crate::error::Error;
use crate::tree::editor::{FieldEdit, ScopeEditor};
use crate::tree::node::{ContainerId, NodeId, Status};

#[derive(Debug, Deserialize)]
pub struct PlanDocument {
    pub containers: Vec<ContainerDoc>,
}

#[derive(Debug, Deserialize)]
pub struct ContainerDoc {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub items: Vec<NodeDoc>,
}

#[derive(Debug, Deserialize)]
pub struct NodeDoc {
    #[serde(default)]
    pub scope_type: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub items: Vec<NodeDoc>,
}

pub fn parse_plan(json: &str) -> Result<PlanDocument, Error> {
    Ok(serde_json::from_str(json)?)
}

/// Replays a plan document through the editor operations. Every item is
/// committed, so duplicate, missing-field and date-order violations in
/// the document are rejected exactly like interactive edits.
pub fn build_editor(doc: &PlanDocument, catalog: ScopeTypeCatalog) -> Result<ScopeEditor, Error> {
    let mut editor = ScopeEditor::new(catalog);
    for container_doc in &doc.containers {
        let container = editor.add_container(container_doc.name.clone());
        if let Some(c) = editor.container_mut(container) {
            c.description = container_doc.description.clone();
            c.status = container_doc.status;
        }
        for item in &container_doc.items {
            build_node(&mut editor, container, None, item)?;
        }
    }
    debug!("Built editor from plan ({} containers)", doc.containers.len());
    Ok(editor)
}

fn build_node(
    editor: &mut ScopeEditor,
    container: ContainerId,
    parent: Option<NodeId>,
    doc: &NodeDoc,
) -> Result<(), Error> {
    let id = editor.add_node(container, parent)?;

    if let Some(type_name) = &doc.scope_type {
        let type_id = editor
            .catalog()
            .find_by_name(type_name)
            .map(|t| t.id)
            .ok_or_else(|| Error::Import(format!("unknown scope type '{type_name}'")))?;
        editor.update_field(id, FieldEdit::Category(Some(type_id)))?;
    }
    if !doc.name.is_empty() {
        editor.update_field(id, FieldEdit::Name(doc.name.clone()))?;
    }
    if !doc.description.is_empty() {
        editor.update_field(id, FieldEdit::Description(doc.description.clone()))?;
    }
    editor.update_field(id, FieldEdit::Status(doc.status))?;
    editor.update_field(id, FieldEdit::StartDate(doc.start_date))?;
    editor.update_field(id, FieldEdit::TargetDate(doc.target_date))?;
    if let Some(hours) = doc.estimated_hours {
        editor.update_field(id, FieldEdit::EstimatedHours(hours))?;
    }

    editor.commit(id).map_err(|e| {
        let label = if doc.name.is_empty() {
            doc.scope_type.clone().unwrap_or_default()
        } else {
            doc.name.clone()
        };
        Error::Import(format!("'{label}': {e}"))
    })?;

    for child in &doc.items {
        build_node(editor, container, Some(id), child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::rollup;

    const PLAN: &str = r#"{
        "containers": [{
            "name": "Project scope",
            "items": [{
                "scope_type": "Frontend",
                "items": [
                    { "name": "Login screen", "estimated_hours": 8 },
                    { "name": "Dashboard", "estimated_hours": 12,
                      "start_date": "2025-04-01", "target_date": "2025-04-20" }
                ]
            }]
        }]
    }"#;

    #[test]
    fn test_plan_replays_into_committed_tree() {
        let doc = parse_plan(PLAN).unwrap();
        let editor = build_editor(&doc, ScopeTypeCatalog::builtin()).unwrap();
        let (container, c) = editor.containers().next().unwrap();
        assert_eq!(c.roots().len(), 1);
        let scope = c.roots()[0];
        assert_eq!(editor.display_name(scope), "Frontend");
        assert!(!editor.is_editing(scope));
        assert_eq!(rollup::total_hours(&editor, scope), 20.0);
        assert_eq!(editor.pending_edits(container), 0);
    }

    #[test]
    fn test_unknown_scope_type_is_an_import_error() {
        let doc = parse_plan(
            r#"{"containers":[{"name":"s","items":[{"scope_type":"Mainframe"}]}]}"#,
        )
        .unwrap();
        let err = build_editor(&doc, ScopeTypeCatalog::builtin()).unwrap_err();
        assert!(matches!(err, Error::Import(_)));
    }

    #[test]
    fn test_duplicate_items_in_plan_are_rejected() {
        let doc = parse_plan(
            r#"{"containers":[{"name":"s","items":[{
                "scope_type": "Backend",
                "items": [{ "name": "API" }, { "name": " api " }]
            }]}]}"#,
        )
        .unwrap();
        let err = build_editor(&doc, ScopeTypeCatalog::builtin()).unwrap_err();
        assert!(matches!(err, Error::Import(_)));
    }
}
