use serde::{Deserialize, Serialize};

/// Identifier of a scope type in the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TypeId(pub i64);

/// A top-level scope category (e.g. "Frontend") with its display color
/// and icon. Instantiated at most once per functional scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeType {
    pub id: TypeId,
    pub name: String,
    pub description: String,
    pub color_hex: String,
    pub icon_name: String,
}

/// Ordered, read-only snapshot of the scope type catalog. Injected into
/// the editor at construction and refreshed only on demand.
#[derive(Debug, Clone, Default)]
pub struct ScopeTypeCatalog {
    types: Vec<ScopeType>,
}

impl ScopeTypeCatalog {
    pub fn new(types: Vec<ScopeType>) -> Self {
        ScopeTypeCatalog { types }
    }

    /// The categories the product ships with. Matches the seed rows
    /// installed by `Database::seed_scope_types`.
    pub fn builtin() -> Self {
        let entry = |id: i64, name: &str, description: &str, color: &str, icon: &str| ScopeType {
            id: TypeId(id),
            name: name.to_string(),
            description: description.to_string(),
            color_hex: color.to_string(),
            icon_name: icon.to_string(),
        };
        ScopeTypeCatalog::new(vec![
            entry(1, "Frontend", "User interface development", "#3B82F6", "Monitor"),
            entry(2, "Backend", "Server logic and database development", "#10B981", "Database"),
            entry(3, "Integrations", "Integrations with external systems and APIs", "#F59E0B", "Zap"),
            entry(4, "Automations", "Web scraping, RPA and automated processes", "#8B5CF6", "Settings"),
            entry(5, "Design", "Logo and asset creation, vectorization and editing", "#EF4444", "Palette"),
            entry(6, "Mobile", "Mobile development", "#06B6D4", "Smartphone"),
            entry(7, "DevOps", "Infrastructure and deployment", "#EC4899", "Code"),
            entry(8, "Testing", "Testing and software quality", "#EAB308", "Check"),
        ])
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn list(&self) -> &[ScopeType] {
        &self.types
    }

    pub fn get(&self, id: TypeId) -> Option<&ScopeType> {
        self.types.iter().find(|t| t.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&ScopeType> {
        let wanted = name.trim().to_lowercase();
        self.types
            .iter()
            .find(|t| t.name.trim().to_lowercase() == wanted)
    }

    /// Categories still offered for a new level-1 node, given the ones
    /// already used by sibling nodes in the same container.
    pub fn available(&self, used: &[TypeId]) -> Vec<&ScopeType> {
        self.types
            .iter()
            .filter(|t| !used.contains(&t.id))
            .collect()
    }
}
