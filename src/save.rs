//! Save flow: linearize one container top-down and push it through the
//! persistence gateway.
//!
//! Each child's request needs the row id freshly assigned to its
//! parent, so the creates run strictly sequentially, parent before
//! child. A failed create aborts the rest of the subtree and rolls the
//! already-created rows back with compensating deletes (newest first).
//! Nothing is retried.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error, info};

use crate::error::{Error, ValidationError};
use crate::gateway::{ContainerFields, GatewayError, NodeFields, ScopeGateway};
use crate::tree::editor::ScopeEditor;
use crate::tree::node::{ContainerId, Level, NodeId};

/// Progress hooks for the save flow. The CLI prints through these; all
/// methods default to no-ops.
pub trait SaveReporter {
    fn on_container_saved(&self, _name: &str, _row_id: i64) {}
    fn on_node_saved(&self, _level: Level, _name: &str, _row_id: i64) {}
    fn on_failure(&self, _name: &str) {}
    fn on_compensated(&self, _deleted: usize, _failures: usize) {}
}

/// No-op reporter for silent operation.
pub struct SilentReporter;

impl SaveReporter for SilentReporter {}

#[derive(Debug)]
pub struct SaveReport {
    pub container_row_id: i64,
    pub nodes_saved: usize,
    /// Row id assigned to each editor node, in creation order.
    pub assigned: Vec<(NodeId, i64)>,
    pub duration: Duration,
}

/// A create failed partway through. `created` counts the rows written
/// before the failure (container included); `compensated` how many of
/// them the rollback managed to delete again.
#[derive(Error, Debug)]
#[error(
    "save of '{failed_name}' aborted: {source} ({compensated} of {created} created row(s) rolled back)"
)]
pub struct SaveError {
    #[source]
    pub source: GatewayError,
    pub failed_name: String,
    pub created: usize,
    pub compensated: usize,
    pub compensation_failures: usize,
}

/// Persists one container and its whole committed tree. Rejected
/// outright if any node of the container is still in edit mode.
pub fn save_container<G, R>(
    editor: &ScopeEditor,
    container: ContainerId,
    project_id: i64,
    gateway: &mut G,
    reporter: &R,
) -> Result<SaveReport, Error>
where
    G: ScopeGateway,
    R: SaveReporter,
{
    let pending = editor.pending_edits(container);
    if pending > 0 {
        return Err(ValidationError::PendingEdits(pending).into());
    }
    let c = editor
        .container(container)
        .ok_or(ValidationError::UnknownContainer)?;
    let ordem = editor
        .containers()
        .position(|(id, _)| id == container)
        .map(|i| i as i64 + 1)
        .unwrap_or(1);

    let start = Instant::now();
    let fields = ContainerFields {
        name: c.name.clone(),
        description: c.description.clone(),
        status: c.status,
        ordem,
    };
    let container_row = match gateway.create_container(project_id, &fields) {
        Ok(row_id) => {
            debug!("Created container row {} for '{}'", row_id, c.name);
            reporter.on_container_saved(&c.name, row_id);
            row_id
        }
        Err(source) => {
            reporter.on_failure(&c.name);
            return Err(SaveError {
                source,
                failed_name: c.name.clone(),
                created: 0,
                compensated: 0,
                compensation_failures: 0,
            }
            .into());
        }
    };

    let mut created: Vec<i64> = Vec::new();
    let mut assigned: Vec<(NodeId, i64)> = Vec::new();
    let outcome = save_children(
        editor,
        c.roots(),
        container_row,
        None,
        gateway,
        reporter,
        &mut created,
        &mut assigned,
    );

    match outcome {
        Ok(()) => {
            info!("Saved container '{}' ({} nodes)", c.name, created.len());
            Ok(SaveReport {
                container_row_id: container_row,
                nodes_saved: created.len(),
                assigned,
                duration: start.elapsed(),
            })
        }
        Err((failed_name, source)) => {
            let mut compensated = 0;
            let mut failures = 0;
            for row_id in created.iter().rev() {
                match gateway.delete_node(*row_id) {
                    Ok(()) => compensated += 1,
                    Err(e) => {
                        failures += 1;
                        error!("Compensating delete of node row {} failed: {}", row_id, e);
                    }
                }
            }
            match gateway.delete_container(container_row) {
                Ok(()) => compensated += 1,
                Err(e) => {
                    failures += 1;
                    error!(
                        "Compensating delete of container row {} failed: {}",
                        container_row, e
                    );
                }
            }
            reporter.on_compensated(compensated, failures);
            Err(SaveError {
                source,
                failed_name,
                created: created.len() + 1,
                compensated,
                compensation_failures: failures,
            }
            .into())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn save_children<G, R>(
    editor: &ScopeEditor,
    ids: &[NodeId],
    container_row: i64,
    parent_row: Option<i64>,
    gateway: &mut G,
    reporter: &R,
    created: &mut Vec<i64>,
    assigned: &mut Vec<(NodeId, i64)>,
) -> Result<(), (String, GatewayError)>
where
    G: ScopeGateway,
    R: SaveReporter,
{
    for (index, id) in ids.iter().enumerate() {
        let Some(node) = editor.node(*id) else {
            continue;
        };
        let name = editor.display_name(*id);
        let fields = NodeFields {
            name: name.clone(),
            description: node.description.clone(),
            status: node.status,
            category: node.category,
            start_date: node.start_date,
            target_date: node.target_date,
            // Composites derive their hours; only leaves persist one.
            estimated_hours: node.is_leaf().then_some(node.estimated_hours),
            ordem: index as i64 + 1,
        };
        let row_id = match gateway.create_node(container_row, node.level, parent_row, &fields) {
            Ok(row_id) => row_id,
            Err(source) => {
                reporter.on_failure(&name);
                return Err((name, source));
            }
        };
        reporter.on_node_saved(node.level, &name, row_id);
        created.push(row_id);
        assigned.push((*id, row_id));
        save_children(
            editor,
            node.children(),
            container_row,
            Some(row_id),
            gateway,
            reporter,
            created,
            assigned,
        )?;
    }
    Ok(())
}

/// Writes the row ids from a successful save back onto the editor
/// nodes.
pub fn apply_assigned_ids(
    editor: &mut ScopeEditor,
    container: ContainerId,
    report: &SaveReport,
) -> Result<(), ValidationError> {
    editor.set_container_persisted_id(container, report.container_row_id)?;
    for (node, row_id) in &report.assigned {
        editor.set_persisted_id(*node, *row_id)?;
    }
    Ok(())
}
