mod commands;
mod logging;
mod progress;

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use synctech_scope::storage::Database;
use synctech_scope::tree::rollup;
use synctech_scope::{
    import, save, AppConfig, ContainerId, NodeId, ScopeEditor, ScopeTypeCatalog, SqliteGateway,
    Status,
};
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match synctech_scope::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::ListTypes) => {
            if let Err(err) = run_list_types(&config) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::List { project }) => {
            if let Err(err) = run_list(&config, project) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Show { container_id }) => {
            if let Err(err) = run_show(&config, container_id) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Import {
            file,
            project,
            replace,
        }) => {
            if let Err(err) = run_import(&config, &file, project, replace) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        Some(Commands::TruncateDb) => {
            match prompt_confirm(
                "Are you SURE you want to COMPLETELY DELETE the Database?",
                Some(false),
            ) {
                Ok(true) => match Database::open(&config.db_path) {
                    Ok(db) => {
                        if let Err(e) = db.truncate_all() {
                            error!("Error truncating database: {}", e);
                        } else {
                            println!("All tables truncated");
                        }
                    }
                    Err(e) => error!("Error opening database: {}", e),
                },
                _ => {
                    process::exit(0);
                }
            }
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_list_types(config: &AppConfig) -> anyhow::Result<()> {
    let db = Database::open(&config.db_path)?;
    let catalog = load_or_seed_catalog(&db)?;
    for t in catalog.list() {
        println!(
            "{:>3}  {:<14} {}  {}",
            t.id.0,
            t.name.bold(),
            t.color_hex.dimmed(),
            t.description
        );
    }
    Ok(())
}

fn run_list(config: &AppConfig, project: Option<i64>) -> anyhow::Result<()> {
    let db = Database::open(&config.db_path)?;
    let rows = db.list_functional_scopes(project)?;
    if rows.is_empty() {
        info!("No functional scopes saved");
        return Ok(());
    }
    for row in rows {
        let nodes = db.count_nodes(row.id)?;
        println!(
            "{:>4}  {:<30} project {:<6} {:>3} node(s)  [{}]",
            row.id,
            row.name.bold(),
            row.project_id,
            nodes,
            row.status
        );
    }
    Ok(())
}

fn run_show(config: &AppConfig, container_id: i64) -> anyhow::Result<()> {
    let db = Database::open(&config.db_path)?;
    // A missing catalog only stops level-1 names from resolving; the
    // stored names still render.
    let catalog = match db.load_catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to load scope types: {}", e);
            ScopeTypeCatalog::default()
        }
    };
    match db.load_editor(container_id, catalog)? {
        None => info!("Functional scope {} not found", container_id),
        Some((editor, container)) => print_container(&editor, container),
    }
    Ok(())
}

fn run_import(config: &AppConfig, file: &Path, project: i64, replace: bool) -> anyhow::Result<()> {
    let raw = fs::read_to_string(file)?;
    let doc = import::parse_plan(&raw)?;

    let db = Database::open(&config.db_path)?;
    if replace && !remove_existing_scopes(&db, project)? {
        info!("Import cancelled");
        return Ok(());
    }
    let catalog = load_or_seed_catalog(&db)?;
    let mut editor = import::build_editor(&doc, catalog)?;

    let containers: Vec<ContainerId> = editor.containers().map(|(id, _)| id).collect();
    let mut gateway = SqliteGateway::new(&db);
    let reporter = CliReporter::new();

    let mut total_nodes = 0usize;
    let mut total_secs = 0f64;
    for container in &containers {
        let report = save::save_container(&editor, *container, project, &mut gateway, &reporter)?;
        total_nodes += report.nodes_saved;
        total_secs += report.duration.as_secs_f64();
        save::apply_assigned_ids(&mut editor, *container, &report)?;
    }

    println!();
    info!(
        "Imported {} functional scope(s), {} node(s) in {}",
        format!("{}", containers.len()).green(),
        format!("{}", total_nodes).green(),
        format!("{:.2}s", total_secs).green(),
    );
    for container in &containers {
        print_container(&editor, *container);
    }
    Ok(())
}

/// Deletes a project's saved scopes after the user confirms, naming the
/// number of nodes that go with them. Returns false if the user backed
/// out.
fn remove_existing_scopes(db: &Database, project: i64) -> anyhow::Result<bool> {
    let existing = db.list_functional_scopes(Some(project))?;
    if existing.is_empty() {
        return Ok(true);
    }
    let mut nodes = 0;
    for row in &existing {
        nodes += db.count_nodes(row.id)?;
    }
    let confirmed = prompt_confirm(
        &format!(
            "Project {} already has {} scope(s) with {} node(s); they will all be removed. Continue?",
            project,
            existing.len(),
            nodes
        ),
        Some(false),
    )?;
    if !confirmed {
        return Ok(false);
    }
    for row in &existing {
        db.delete_functional_scope(row.id)?;
    }
    info!("Removed {} existing scope(s)", existing.len());
    Ok(true)
}

fn load_or_seed_catalog(db: &Database) -> anyhow::Result<ScopeTypeCatalog> {
    let catalog = db.load_catalog()?;
    if !catalog.is_empty() {
        return Ok(catalog);
    }
    let builtin = ScopeTypeCatalog::builtin();
    db.seed_scope_types(builtin.list())?;
    Ok(db.load_catalog()?)
}

fn print_container(editor: &ScopeEditor, container: ContainerId) {
    let Some(c) = editor.container(container) else {
        return;
    };
    println!(
        "{} {}",
        c.name.bold(),
        rollup_badges(
            rollup::container_hours(editor, container),
            rollup::container_start(editor, container),
            rollup::container_target(editor, container),
        )
    );
    for root in c.roots() {
        print_node(editor, *root, 1);
    }
}

fn print_node(editor: &ScopeEditor, id: NodeId, depth: usize) {
    let Some(node) = editor.node(id) else {
        return;
    };
    let pad = "  ".repeat(depth);
    println!(
        "{}- {} [{}] {}",
        pad,
        editor.display_name(id),
        status_label(node.status),
        rollup_badges(
            rollup::total_hours(editor, id),
            rollup::earliest_start(editor, id),
            rollup::latest_target(editor, id),
        )
    );
    for child in node.children() {
        print_node(editor, *child, depth + 1);
    }
}

fn rollup_badges(hours: f64, start: Option<NaiveDate>, target: Option<NaiveDate>) -> String {
    let mut parts = Vec::new();
    if hours > 0.0 {
        parts.push(format!("{}h", hours).green().to_string());
    }
    if let Some(start) = start {
        parts.push(format!("from {}", start).cyan().to_string());
    }
    if let Some(target) = target {
        parts.push(format!("to {}", target).cyan().to_string());
    }
    parts.join(" ")
}

fn status_label(status: Status) -> ColoredString {
    match status {
        Status::Planned => "planned".blue(),
        Status::InProgress => "in progress".yellow(),
        Status::Done => "done".green(),
        Status::Cancelled => "cancelled".red(),
    }
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
