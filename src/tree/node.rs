use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::TypeId;

/// Editor-assigned node handle. Stable for the lifetime of the editor,
/// unlike a positional path, so removing a sibling never invalidates it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub(crate) u64);

/// Handle of a functional-scope container (one per scope grouping).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContainerId(pub(crate) u64);

/// Depth of a node in the hierarchy. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Level 1: an instance of a catalog scope type.
    Scope,
    /// Level 2: a feature under a scope.
    Feature,
    /// Level 3: a sub-feature under a feature.
    SubFeature,
    /// Level 4: a leaf work item.
    SubItem,
}

impl Level {
    pub fn depth(self) -> u8 {
        match self {
            Level::Scope => 1,
            Level::Feature => 2,
            Level::SubFeature => 3,
            Level::SubItem => 4,
        }
    }

    pub fn from_depth(depth: u8) -> Option<Level> {
        match depth {
            1 => Some(Level::Scope),
            2 => Some(Level::Feature),
            3 => Some(Level::SubFeature),
            4 => Some(Level::SubItem),
            _ => None,
        }
    }

    /// The level of a child node, or `None` below a sub-item.
    pub fn child(self) -> Option<Level> {
        match self {
            Level::Scope => Some(Level::Feature),
            Level::Feature => Some(Level::SubFeature),
            Level::SubFeature => Some(Level::SubItem),
            Level::SubItem => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Planned,
    InProgress,
    Done,
    Cancelled,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Planned => "planned",
            Status::InProgress => "in_progress",
            Status::Done => "done",
            Status::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Status> {
        match value {
            "planned" => Some(Status::Planned),
            "in_progress" => Some(Status::InProgress),
            "done" => Some(Status::Done),
            "cancelled" => Some(Status::Cancelled),
            _ => None,
        }
    }
}

/// One node of the scope tree. Domain fields only; edit/expand state is
/// tracked separately by the editor so this is exactly the shape that
/// gets persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeNode {
    pub level: Level,
    /// Catalog reference. Set on level-1 nodes only.
    pub category: Option<TypeId>,
    /// Free text for levels 2-4; derived from the category for level 1.
    pub name: String,
    pub description: String,
    pub status: Status,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    /// Meaningful on leaves only; composites derive their hours from
    /// their children.
    pub estimated_hours: f64,
    /// Row id assigned by the persistence gateway, once saved.
    pub persisted_id: Option<i64>,
    pub(crate) container: ContainerId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl ScopeNode {
    pub(crate) fn new(level: Level, container: ContainerId, parent: Option<NodeId>) -> Self {
        ScopeNode {
            level,
            category: None,
            name: String::new(),
            description: String::new(),
            status: Status::default(),
            start_date: None,
            target_date: None,
            estimated_hours: 0.0,
            persisted_id: None,
            container,
            parent,
            children: Vec::new(),
        }
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order (persisted as `ordem`).
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_child_chain_stops_at_subitem() {
        assert_eq!(Level::Scope.child(), Some(Level::Feature));
        assert_eq!(Level::Feature.child(), Some(Level::SubFeature));
        assert_eq!(Level::SubFeature.child(), Some(Level::SubItem));
        assert_eq!(Level::SubItem.child(), None);
    }

    #[test]
    fn test_level_depth_round_trip() {
        for depth in 1..=4 {
            let level = Level::from_depth(depth).unwrap();
            assert_eq!(level.depth(), depth);
        }
        assert_eq!(Level::from_depth(0), None);
        assert_eq!(Level::from_depth(5), None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            Status::Planned,
            Status::InProgress,
            Status::Done,
            Status::Cancelled,
        ] {
            assert_eq!(Status::parse(status.as_str()), Some(status));
        }
        assert_eq!(Status::parse("paused"), None);
    }
}
