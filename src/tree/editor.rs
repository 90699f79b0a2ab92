use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::catalog::{ScopeType, ScopeTypeCatalog, TypeId};
use crate::error::ValidationError;
use crate::tree::node::{ContainerId, Level, NodeId, ScopeNode, Status};

/// A single field mutation. Deliberately unvalidated; all checks run at
/// commit time.
#[derive(Debug, Clone)]
pub enum FieldEdit {
    Category(Option<TypeId>),
    Name(String),
    Description(String),
    Status(Status),
    StartDate(Option<NaiveDate>),
    TargetDate(Option<NaiveDate>),
    EstimatedHours(f64),
}

/// A functional-scope grouping holding one forest of level 1-4 nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub name: String,
    pub description: String,
    pub status: Status,
    pub persisted_id: Option<i64>,
    pub(crate) roots: Vec<NodeId>,
}

impl Container {
    fn new(name: String) -> Self {
        Container {
            name,
            description: String::new(),
            status: Status::default(),
            persisted_id: None,
            roots: Vec::new(),
        }
    }

    /// Level-1 nodes in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }
}

/// The editable fields of a node, captured when an edit session starts
/// so cancel can put them back.
#[derive(Debug, Clone)]
struct FieldSnapshot {
    category: Option<TypeId>,
    name: String,
    description: String,
    status: Status,
    start_date: Option<NaiveDate>,
    target_date: Option<NaiveDate>,
    estimated_hours: f64,
}

impl FieldSnapshot {
    fn capture(node: &ScopeNode) -> Self {
        FieldSnapshot {
            category: node.category,
            name: node.name.clone(),
            description: node.description.clone(),
            status: node.status,
            start_date: node.start_date,
            target_date: node.target_date,
            estimated_hours: node.estimated_hours,
        }
    }

    fn restore(self, node: &mut ScopeNode) {
        node.category = self.category;
        node.name = self.name;
        node.description = self.description;
        node.status = self.status;
        node.start_date = self.start_date;
        node.target_date = self.target_date;
        node.estimated_hours = self.estimated_hours;
    }
}

/// Transient view state, kept apart from the domain tree so the domain
/// shape is exactly what gets persisted.
#[derive(Debug, Clone, Default)]
struct EditState {
    editing: bool,
    is_new: bool,
    expanded: bool,
    snapshot: Option<FieldSnapshot>,
}

/// In-memory editor for a project's functional scopes: an id-keyed
/// arena of containers and nodes, plus the catalog snapshot used to
/// offer level-1 choices.
#[derive(Debug)]
pub struct ScopeEditor {
    catalog: ScopeTypeCatalog,
    containers: Vec<(ContainerId, Container)>,
    nodes: HashMap<NodeId, ScopeNode>,
    ui: HashMap<NodeId, EditState>,
    next_id: u64,
}

impl ScopeEditor {
    pub fn new(catalog: ScopeTypeCatalog) -> Self {
        ScopeEditor {
            catalog,
            containers: Vec::new(),
            nodes: HashMap::new(),
            ui: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn catalog(&self) -> &ScopeTypeCatalog {
        &self.catalog
    }

    /// Swap in a freshly loaded catalog. Existing nodes keep their
    /// category references; unknown ones simply stop resolving.
    pub fn refresh_catalog(&mut self, catalog: ScopeTypeCatalog) {
        self.catalog = catalog;
    }

    // ── Containers ───────────────────────────────────────────────

    pub fn add_container(&mut self, name: impl Into<String>) -> ContainerId {
        let id = ContainerId(self.next_id);
        self.next_id += 1;
        self.containers.push((id, Container::new(name.into())));
        debug!("Added container {:?}", id);
        id
    }

    pub fn containers(&self) -> impl Iterator<Item = (ContainerId, &Container)> {
        self.containers.iter().map(|(id, c)| (*id, c))
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(_, c)| c)
    }

    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.containers
            .iter_mut()
            .find(|(cid, _)| *cid == id)
            .map(|(_, c)| c)
    }

    /// Total node count under a container, for the removal confirmation
    /// step.
    pub fn container_subtree_size(&self, id: ContainerId) -> usize {
        self.container(id)
            .map(|c| c.roots.iter().map(|r| self.subtree_size(*r)).sum())
            .unwrap_or(0)
    }

    /// Removes a container and every node under it. Returns the number
    /// of nodes dropped. Irreversible; callers confirm with the user
    /// first via `container_subtree_size`.
    pub fn remove_container(&mut self, id: ContainerId) -> Result<usize, ValidationError> {
        let roots = self
            .container(id)
            .ok_or(ValidationError::UnknownContainer)?
            .roots
            .clone();
        let mut removed = 0;
        for root in roots {
            removed += self.remove_subtree(root);
        }
        self.containers.retain(|(cid, _)| *cid != id);
        debug!("Removed container {:?} ({} nodes)", id, removed);
        Ok(removed)
    }

    pub fn set_container_persisted_id(
        &mut self,
        id: ContainerId,
        row_id: i64,
    ) -> Result<(), ValidationError> {
        let container = self
            .container_mut(id)
            .ok_or(ValidationError::UnknownContainer)?;
        container.persisted_id = Some(row_id);
        Ok(())
    }

    // ── Node lifecycle ───────────────────────────────────────────

    /// Appends a new node in edit state. With no parent the node is a
    /// level-1 scope at the container root; otherwise its level is the
    /// parent's level + 1, and nesting below a sub-item is rejected.
    /// The parent is auto-expanded so the new row is visible.
    pub fn add_node(
        &mut self,
        container: ContainerId,
        parent: Option<NodeId>,
    ) -> Result<NodeId, ValidationError> {
        if self.container(container).is_none() {
            return Err(ValidationError::UnknownContainer);
        }
        let level = match parent {
            None => Level::Scope,
            Some(p) => {
                let parent_node = self.nodes.get(&p).ok_or(ValidationError::UnknownNode)?;
                if parent_node.container != container {
                    return Err(ValidationError::UnknownNode);
                }
                parent_node.level.child().ok_or(ValidationError::MaxDepth)?
            }
        };

        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes
            .insert(id, ScopeNode::new(level, container, parent));
        self.ui.insert(
            id,
            EditState {
                editing: true,
                is_new: true,
                expanded: false,
                snapshot: None,
            },
        );

        match parent {
            Some(p) => {
                if let Some(parent_node) = self.nodes.get_mut(&p) {
                    parent_node.children.push(id);
                }
                self.ui.entry(p).or_default().expanded = true;
            }
            None => {
                if let Some(c) = self.container_mut(container) {
                    c.roots.push(id);
                }
            }
        }

        debug!("Added {:?} node {:?} under {:?}", level, id, parent);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&ScopeNode> {
        self.nodes.get(&id)
    }

    /// Applies a single field edit. No validation happens here; commit
    /// is the gate.
    pub fn update_field(&mut self, id: NodeId, edit: FieldEdit) -> Result<(), ValidationError> {
        let node = self.nodes.get_mut(&id).ok_or(ValidationError::UnknownNode)?;
        match edit {
            FieldEdit::Category(category) => node.category = category,
            FieldEdit::Name(name) => node.name = name,
            FieldEdit::Description(description) => node.description = description,
            FieldEdit::Status(status) => node.status = status,
            FieldEdit::StartDate(date) => node.start_date = date,
            FieldEdit::TargetDate(date) => node.target_date = date,
            FieldEdit::EstimatedHours(hours) => node.estimated_hours = hours,
        }
        Ok(())
    }

    /// Puts a committed node back in edit mode, snapshotting its fields
    /// so cancel can restore them. No-op if already editing.
    pub fn begin_edit(&mut self, id: NodeId) -> Result<(), ValidationError> {
        let snapshot = {
            let node = self.nodes.get(&id).ok_or(ValidationError::UnknownNode)?;
            FieldSnapshot::capture(node)
        };
        let state = self.ui.entry(id).or_default();
        if !state.editing {
            state.editing = true;
            state.snapshot = Some(snapshot);
        }
        Ok(())
    }

    /// Validates and commits an edit session. On rejection the node
    /// stays in edit mode and nothing else changes.
    pub fn commit(&mut self, id: NodeId) -> Result<(), ValidationError> {
        let node = self.nodes.get(&id).ok_or(ValidationError::UnknownNode)?;
        if !self.is_editing(id) {
            return Err(ValidationError::NotEditing);
        }

        let derived_name = match node.level {
            Level::Scope => {
                let category = node.category.ok_or(ValidationError::MissingCategory)?;
                let roots = self
                    .container(node.container)
                    .ok_or(ValidationError::UnknownContainer)?
                    .roots();
                for sibling in roots {
                    if *sibling == id {
                        continue;
                    }
                    if let Some(other) = self.nodes.get(sibling) {
                        if other.category == Some(category) {
                            return Err(ValidationError::DuplicateCategory);
                        }
                    }
                }
                self.catalog.get(category).map(|t| t.name.clone())
            }
            _ => {
                let trimmed = node.name.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::MissingName);
                }
                let lowered = trimmed.to_lowercase();
                let parent = node.parent.ok_or(ValidationError::UnknownNode)?;
                let siblings = self
                    .nodes
                    .get(&parent)
                    .ok_or(ValidationError::UnknownNode)?
                    .children();
                for sibling in siblings {
                    if *sibling == id {
                        continue;
                    }
                    if let Some(other) = self.nodes.get(sibling) {
                        if other.name.trim().to_lowercase() == lowered {
                            return Err(ValidationError::DuplicateName(trimmed.to_string()));
                        }
                    }
                }
                None
            }
        };

        if let (Some(start), Some(target)) = (node.start_date, node.target_date) {
            if target < start {
                return Err(ValidationError::DateOrder { start, target });
            }
        }

        // All checks passed; mutate.
        if let Some(name) = derived_name {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.name = name;
            }
        }
        if let Some(state) = self.ui.get_mut(&id) {
            state.editing = false;
            state.is_new = false;
            state.snapshot = None;
        }
        debug!("Committed node {:?}", id);
        Ok(())
    }

    /// Ends an edit session without committing. A node that was never
    /// committed is discarded entirely; otherwise the fields captured
    /// when editing began are restored.
    pub fn cancel(&mut self, id: NodeId) -> Result<(), ValidationError> {
        let (editing, is_new) = match self.ui.get(&id) {
            Some(state) => (state.editing, state.is_new),
            None => return Err(ValidationError::UnknownNode),
        };
        if !editing {
            return Err(ValidationError::NotEditing);
        }

        if is_new {
            let removed = self.remove_subtree(id);
            debug!("Cancelled new node {:?} ({} discarded)", id, removed);
        } else {
            let snapshot = self.ui.get_mut(&id).and_then(|state| {
                state.editing = false;
                state.snapshot.take()
            });
            if let Some(snapshot) = snapshot {
                if let Some(node) = self.nodes.get_mut(&id) {
                    snapshot.restore(node);
                }
            }
        }
        Ok(())
    }

    /// Removes a node and its entire subtree, returning how many nodes
    /// were dropped. Irreversible; callers run the two-step confirmation
    /// with `descendant_count` first.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, ValidationError> {
        if !self.nodes.contains_key(&id) {
            return Err(ValidationError::UnknownNode);
        }
        let removed = self.remove_subtree(id);
        debug!("Removed node {:?} ({} nodes)", id, removed);
        Ok(removed)
    }

    fn remove_subtree(&mut self, id: NodeId) -> usize {
        let Some((parent, container)) = self.nodes.get(&id).map(|n| (n.parent, n.container))
        else {
            return 0;
        };
        match parent {
            Some(p) => {
                if let Some(parent_node) = self.nodes.get_mut(&p) {
                    parent_node.children.retain(|c| *c != id);
                }
            }
            None => {
                if let Some(c) = self.container_mut(container) {
                    c.roots.retain(|r| *r != id);
                }
            }
        }

        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
                self.ui.remove(&next);
                removed += 1;
            }
        }
        removed
    }

    /// Node count of the subtree rooted at `id`, including the node
    /// itself. Zero for unknown ids.
    pub fn subtree_size(&self, id: NodeId) -> usize {
        let mut stack = vec![id];
        let mut count = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get(&next) {
                stack.extend(node.children.iter().copied());
                count += 1;
            }
        }
        count
    }

    pub fn descendant_count(&self, id: NodeId) -> usize {
        self.subtree_size(id).saturating_sub(1)
    }

    // ── View state ───────────────────────────────────────────────

    pub fn toggle_expanded(&mut self, id: NodeId) -> Result<bool, ValidationError> {
        let state = self.ui.get_mut(&id).ok_or(ValidationError::UnknownNode)?;
        state.expanded = !state.expanded;
        Ok(state.expanded)
    }

    pub fn is_editing(&self, id: NodeId) -> bool {
        self.ui.get(&id).map(|s| s.editing).unwrap_or(false)
    }

    pub fn is_new(&self, id: NodeId) -> bool {
        self.ui.get(&id).map(|s| s.is_new).unwrap_or(false)
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.ui.get(&id).map(|s| s.expanded).unwrap_or(false)
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Categories already taken by level-1 nodes of a container,
    /// optionally ignoring one node (the one currently being edited).
    pub fn used_categories(
        &self,
        container: ContainerId,
        exclude: Option<NodeId>,
    ) -> Vec<TypeId> {
        self.container(container)
            .map(|c| {
                c.roots()
                    .iter()
                    .filter(|r| Some(**r) != exclude)
                    .filter_map(|r| self.nodes.get(r).and_then(|n| n.category))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The catalog entries still offered for a new or re-typed level-1
    /// node, mirroring the sibling-uniqueness rule before commit even
    /// sees it.
    pub fn available_types(
        &self,
        container: ContainerId,
        exclude: Option<NodeId>,
    ) -> Vec<&ScopeType> {
        let used = self.used_categories(container, exclude);
        self.catalog.available(&used)
    }

    /// Nodes of a container still in edit mode. Saving requires zero.
    pub fn pending_edits(&self, container: ContainerId) -> usize {
        self.nodes
            .iter()
            .filter(|(id, node)| node.container == container && self.is_editing(**id))
            .count()
    }

    /// Name for display and persistence: the node's own name, falling
    /// back to the catalog name for level-1 nodes typed but not yet
    /// committed.
    pub fn display_name(&self, id: NodeId) -> String {
        let Some(node) = self.nodes.get(&id) else {
            return String::new();
        };
        if !node.name.is_empty() {
            return node.name.clone();
        }
        node.category
            .and_then(|c| self.catalog.get(c))
            .map(|t| t.name.clone())
            .unwrap_or_default()
    }

    pub fn set_persisted_id(&mut self, id: NodeId, row_id: i64) -> Result<(), ValidationError> {
        let node = self.nodes.get_mut(&id).ok_or(ValidationError::UnknownNode)?;
        node.persisted_id = Some(row_id);
        Ok(())
    }

    /// Adopts a node as committed without running the commit checks.
    /// Used when hydrating from rows that were validated at save time.
    pub(crate) fn mark_committed(&mut self, id: NodeId) {
        if let Some(state) = self.ui.get_mut(&id) {
            state.editing = false;
            state.is_new = false;
            state.snapshot = None;
        }
    }
}
