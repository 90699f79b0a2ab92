//! Bottom-up roll-ups over the domain tree.
//!
//! Hours and date ranges of composite nodes are derived, never entered:
//! a leaf's `estimated_hours` is the single source of truth, which keeps
//! a feature's stated estimate from drifting away from the sum of its
//! sub-items. All three functions are pure over the subtree and cheap
//! enough (tens of nodes) to recompute on every render.

use chrono::NaiveDate;

use crate::tree::editor::ScopeEditor;
use crate::tree::node::{ContainerId, NodeId};

/// Sum of leaf estimates under `id`. A composite's own
/// `estimated_hours` is ignored.
pub fn total_hours(editor: &ScopeEditor, id: NodeId) -> f64 {
    let Some(node) = editor.node(id) else {
        return 0.0;
    };
    if node.is_leaf() {
        return node.estimated_hours;
    }
    node.children()
        .iter()
        .map(|child| total_hours(editor, *child))
        .sum()
}

/// Earliest start date among the node and all its descendants.
pub fn earliest_start(editor: &ScopeEditor, id: NodeId) -> Option<NaiveDate> {
    let node = editor.node(id)?;
    node.children()
        .iter()
        .filter_map(|child| earliest_start(editor, *child))
        .chain(node.start_date)
        .min()
}

/// Latest target date among the node and all its descendants.
pub fn latest_target(editor: &ScopeEditor, id: NodeId) -> Option<NaiveDate> {
    let node = editor.node(id)?;
    node.children()
        .iter()
        .filter_map(|child| latest_target(editor, *child))
        .chain(node.target_date)
        .max()
}

pub fn container_hours(editor: &ScopeEditor, id: ContainerId) -> f64 {
    editor
        .container(id)
        .map(|c| c.roots().iter().map(|r| total_hours(editor, *r)).sum())
        .unwrap_or(0.0)
}

pub fn container_start(editor: &ScopeEditor, id: ContainerId) -> Option<NaiveDate> {
    editor
        .container(id)?
        .roots()
        .iter()
        .filter_map(|r| earliest_start(editor, *r))
        .min()
}

pub fn container_target(editor: &ScopeEditor, id: ContainerId) -> Option<NaiveDate> {
    editor
        .container(id)?
        .roots()
        .iter()
        .filter_map(|r| latest_target(editor, *r))
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ScopeTypeCatalog, TypeId};
    use crate::tree::editor::FieldEdit;
    use crate::tree::node::NodeId;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn scope_with_two_leaves() -> (ScopeEditor, NodeId, NodeId, NodeId) {
        let mut editor = ScopeEditor::new(ScopeTypeCatalog::builtin());
        let container = editor.add_container("Project scope");
        let scope = editor.add_node(container, None).unwrap();
        editor
            .update_field(scope, FieldEdit::Category(Some(TypeId(1))))
            .unwrap();
        editor.commit(scope).unwrap();

        let feature = editor.add_node(container, Some(scope)).unwrap();
        editor
            .update_field(feature, FieldEdit::Name("Login".into()))
            .unwrap();
        editor.commit(feature).unwrap();

        let sibling = editor.add_node(container, Some(scope)).unwrap();
        editor
            .update_field(sibling, FieldEdit::Name("Signup".into()))
            .unwrap();
        editor.commit(sibling).unwrap();

        (editor, scope, feature, sibling)
    }

    #[test]
    fn test_leaf_hours_identity() {
        let (mut editor, _, feature, _) = scope_with_two_leaves();
        assert_eq!(total_hours(&editor, feature), 0.0);
        editor
            .update_field(feature, FieldEdit::EstimatedHours(6.5))
            .unwrap();
        assert_eq!(total_hours(&editor, feature), 6.5);
    }

    #[test]
    fn test_composite_hours_ignore_own_estimate() {
        let (mut editor, scope, feature, sibling) = scope_with_two_leaves();
        editor
            .update_field(feature, FieldEdit::EstimatedHours(8.0))
            .unwrap();
        editor
            .update_field(sibling, FieldEdit::EstimatedHours(4.0))
            .unwrap();
        // A stale direct estimate on the composite must not leak into
        // the roll-up.
        editor
            .update_field(scope, FieldEdit::EstimatedHours(99.0))
            .unwrap();
        assert_eq!(total_hours(&editor, scope), 12.0);
    }

    #[test]
    fn test_date_range_spans_descendants() {
        let (mut editor, scope, feature, sibling) = scope_with_two_leaves();
        editor
            .update_field(feature, FieldEdit::StartDate(Some(date("2025-03-10"))))
            .unwrap();
        editor
            .update_field(feature, FieldEdit::TargetDate(Some(date("2025-03-20"))))
            .unwrap();
        editor
            .update_field(sibling, FieldEdit::StartDate(Some(date("2025-03-01"))))
            .unwrap();
        editor
            .update_field(sibling, FieldEdit::TargetDate(Some(date("2025-03-15"))))
            .unwrap();

        assert_eq!(earliest_start(&editor, scope), Some(date("2025-03-01")));
        assert_eq!(latest_target(&editor, scope), Some(date("2025-03-20")));
        assert!(earliest_start(&editor, scope) <= latest_target(&editor, scope));
    }

    #[test]
    fn test_undated_tree_has_no_range() {
        let (editor, scope, _, _) = scope_with_two_leaves();
        assert_eq!(earliest_start(&editor, scope), None);
        assert_eq!(latest_target(&editor, scope), None);
    }

    #[test]
    fn test_container_rollups_fold_over_roots() {
        let (mut editor, _, feature, sibling) = scope_with_two_leaves();
        let container = editor.containers().next().unwrap().0;
        editor
            .update_field(feature, FieldEdit::EstimatedHours(3.0))
            .unwrap();
        editor
            .update_field(sibling, FieldEdit::EstimatedHours(2.0))
            .unwrap();
        assert_eq!(container_hours(&editor, container), 5.0);
        assert_eq!(container_start(&editor, container), None);
    }
}
