use synctech_scope::gateway::{NodeFields, ScopeGateway};
use synctech_scope::save::{self, SilentReporter};
use synctech_scope::storage::Database;
use synctech_scope::tree::rollup;
use synctech_scope::{
    ContainerId, FieldEdit, Level, NodeId, ScopeEditor, ScopeTypeCatalog, SqliteGateway, Status,
    TypeId,
};

fn committed_editor() -> (ScopeEditor, ContainerId, NodeId) {
    let mut editor = ScopeEditor::new(ScopeTypeCatalog::builtin());
    let container = editor.add_container("Project scope");

    let scope = editor.add_node(container, None).unwrap();
    editor
        .update_field(scope, FieldEdit::Category(Some(TypeId(1))))
        .unwrap();
    editor.commit(scope).unwrap();

    let login = editor.add_node(container, Some(scope)).unwrap();
    editor
        .update_field(login, FieldEdit::Name("Login".to_string()))
        .unwrap();
    editor
        .update_field(login, FieldEdit::StartDate("2025-05-01".parse().ok()))
        .unwrap();
    editor
        .update_field(login, FieldEdit::TargetDate("2025-05-15".parse().ok()))
        .unwrap();
    editor
        .update_field(login, FieldEdit::EstimatedHours(8.0))
        .unwrap();
    editor.commit(login).unwrap();

    let dashboard = editor.add_node(container, Some(scope)).unwrap();
    editor
        .update_field(dashboard, FieldEdit::Name("Dashboard".to_string()))
        .unwrap();
    editor
        .update_field(dashboard, FieldEdit::Status(Status::InProgress))
        .unwrap();
    editor
        .update_field(dashboard, FieldEdit::EstimatedHours(6.5))
        .unwrap();
    editor.commit(dashboard).unwrap();

    (editor, container, scope)
}

fn save_to(db: &Database, editor: &ScopeEditor, container: ContainerId, project: i64) -> i64 {
    let mut gateway = SqliteGateway::new(db);
    let report =
        save::save_container(editor, container, project, &mut gateway, &SilentReporter).unwrap();
    report.container_row_id
}

#[test]
fn test_seed_scope_types_is_idempotent() {
    let db = Database::open_in_memory().unwrap();
    let builtin = ScopeTypeCatalog::builtin();

    let seeded = db.seed_scope_types(builtin.list()).unwrap();
    assert_eq!(seeded, 8);
    let seeded_again = db.seed_scope_types(builtin.list()).unwrap();
    assert_eq!(seeded_again, 0);

    let rows = db.list_scope_types().unwrap();
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0].name, "Frontend");
    assert_eq!(rows[7].name, "Testing");
}

#[test]
fn test_catalog_is_empty_before_seeding() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.load_catalog().unwrap().is_empty());
}

#[test]
fn test_saved_container_reloads_into_equal_tree() {
    let db = Database::open_in_memory().unwrap();
    let catalog = ScopeTypeCatalog::builtin();
    db.seed_scope_types(catalog.list()).unwrap();

    let (editor, container, scope) = committed_editor();
    let container_row = save_to(&db, &editor, container, 42);

    let (loaded, loaded_container) = db
        .load_editor(container_row, catalog)
        .unwrap()
        .expect("container should exist");

    let c = loaded.container(loaded_container).unwrap();
    assert_eq!(c.name, "Project scope");
    assert_eq!(c.persisted_id, Some(container_row));
    assert_eq!(c.roots().len(), 1);

    let loaded_scope = c.roots()[0];
    let node = loaded.node(loaded_scope).unwrap();
    assert_eq!(node.level, Level::Scope);
    assert_eq!(node.category, Some(TypeId(1)));
    assert_eq!(loaded.display_name(loaded_scope), "Frontend");
    assert!(!loaded.is_editing(loaded_scope));

    // Children come back in ordem order with their fields intact.
    let children: Vec<String> = node
        .children()
        .iter()
        .map(|id| loaded.node(*id).unwrap().name.clone())
        .collect();
    assert_eq!(children, ["Login", "Dashboard"]);

    // Roll-ups agree between the saved and the reloaded tree.
    assert_eq!(
        rollup::total_hours(&loaded, loaded_scope),
        rollup::total_hours(&editor, scope)
    );
    assert_eq!(
        rollup::earliest_start(&loaded, loaded_scope),
        rollup::earliest_start(&editor, scope)
    );
    assert_eq!(
        rollup::latest_target(&loaded, loaded_scope),
        rollup::latest_target(&editor, scope)
    );
}

#[test]
fn test_load_missing_container_returns_none() {
    let db = Database::open_in_memory().unwrap();
    let loaded = db.load_editor(999, ScopeTypeCatalog::builtin()).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn test_deleting_a_node_cascades_in_the_store() {
    let db = Database::open_in_memory().unwrap();
    db.seed_scope_types(ScopeTypeCatalog::builtin().list())
        .unwrap();

    let (editor, container, _) = committed_editor();
    let container_row = save_to(&db, &editor, container, 1);
    assert_eq!(db.count_nodes(container_row).unwrap(), 3);

    // Deleting the level-1 row takes its children with it.
    let scope_row: i64 = db
        .connection()
        .query_row(
            "SELECT id FROM scope_node WHERE container_id = ?1 AND depth = 1",
            rusqlite::params![container_row],
            |row| row.get(0),
        )
        .unwrap();
    db.delete_scope_node(scope_row).unwrap();
    assert_eq!(db.count_nodes(container_row).unwrap(), 0);
}

#[test]
fn test_deleting_a_container_cascades_in_the_store() {
    let db = Database::open_in_memory().unwrap();
    db.seed_scope_types(ScopeTypeCatalog::builtin().list())
        .unwrap();

    let (editor, container, _) = committed_editor();
    let container_row = save_to(&db, &editor, container, 1);

    db.delete_functional_scope(container_row).unwrap();
    assert_eq!(db.count_nodes(container_row).unwrap(), 0);
    assert!(db.get_functional_scope(container_row).unwrap().is_none());
}

#[test]
fn test_store_rejects_duplicate_level1_type_per_container() {
    let db = Database::open_in_memory().unwrap();
    db.seed_scope_types(ScopeTypeCatalog::builtin().list())
        .unwrap();

    let (editor, container, _) = committed_editor();
    let container_row = save_to(&db, &editor, container, 1);

    // A second level-1 row with the same scope type must violate the
    // store's uniqueness constraint.
    let mut gateway = SqliteGateway::new(&db);
    let fields = NodeFields {
        name: "Frontend again".to_string(),
        description: String::new(),
        status: Status::Planned,
        category: Some(TypeId(1)),
        start_date: None,
        target_date: None,
        estimated_hours: None,
        ordem: 2,
    };
    let result = gateway.create_node(container_row, Level::Scope, None, &fields);
    assert!(result.is_err());
}

#[test]
fn test_list_functional_scopes_filters_by_project() {
    let db = Database::open_in_memory().unwrap();
    db.seed_scope_types(ScopeTypeCatalog::builtin().list())
        .unwrap();

    let (editor, container, _) = committed_editor();
    save_to(&db, &editor, container, 1);

    let (editor, container, _) = committed_editor();
    save_to(&db, &editor, container, 2);

    assert_eq!(db.list_functional_scopes(None).unwrap().len(), 2);
    assert_eq!(db.list_functional_scopes(Some(1)).unwrap().len(), 1);
    assert_eq!(db.list_functional_scopes(Some(3)).unwrap().len(), 0);
}

#[test]
fn test_database_persists_across_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("scope.db");
    let path_str = path.to_str().unwrap();

    {
        let db = Database::open(path_str).unwrap();
        db.seed_scope_types(ScopeTypeCatalog::builtin().list())
            .unwrap();
        let (editor, container, _) = committed_editor();
        save_to(&db, &editor, container, 9);
    }

    let db = Database::open(path_str).unwrap();
    assert_eq!(db.list_scope_types().unwrap().len(), 8);
    assert_eq!(db.list_functional_scopes(Some(9)).unwrap().len(), 1);
}

#[test]
fn test_persisted_dates_survive_the_round_trip_as_iso_text() {
    let db = Database::open_in_memory().unwrap();
    db.seed_scope_types(ScopeTypeCatalog::builtin().list())
        .unwrap();

    let (editor, container, _) = committed_editor();
    let container_row = save_to(&db, &editor, container, 1);

    let stored: (Option<String>, Option<String>) = db
        .connection()
        .query_row(
            "SELECT start_date, target_date FROM scope_node \
             WHERE container_id = ?1 AND name = 'Login'",
            rusqlite::params![container_row],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(stored.0.as_deref(), Some("2025-05-01"));
    assert_eq!(stored.1.as_deref(), Some("2025-05-15"));
}
