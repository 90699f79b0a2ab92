/// Row of the scope type catalog.
#[derive(Debug, Clone)]
pub struct ScopeTypeRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub color_hex: String,
    pub icon_name: String,
    pub position: i64,
}

/// A functional scope (one container of level 1-4 nodes) attached to a
/// project.
#[derive(Debug, Clone)]
pub struct FunctionalScopeRow {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub description: String,
    pub status: String,
    pub ordem: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// One node of a persisted scope tree. `parent_id` is NULL for level-1
/// rows; dates are ISO-8601 text.
#[derive(Debug, Clone)]
pub struct ScopeNodeRow {
    pub id: i64,
    pub container_id: i64,
    pub parent_id: Option<i64>,
    pub depth: i64,
    pub scope_type_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub status: String,
    pub start_date: Option<String>,
    pub target_date: Option<String>,
    pub estimated_hours: Option<f64>,
    pub ordem: i64,
}
