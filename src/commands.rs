use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "synctech-scope")]
#[command(about = "SyncTech functional scope planner", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the scope type catalog
    ListTypes,
    /// List saved functional scopes
    List {
        /// Restrict to one project
        #[arg(long)]
        project: Option<i64>,
    },
    /// Show a saved functional scope as a tree with hour/date roll-ups
    Show {
        /// Row id of the functional scope
        container_id: i64,
    },
    /// Import a plan document (JSON) and save it for a project
    Import {
        /// Path to the plan document
        file: PathBuf,
        /// Project the scopes belong to
        #[arg(long)]
        project: i64,
        /// Remove the project's existing scopes first (asks before
        /// deleting)
        #[arg(long)]
        replace: bool,
    },
    /// Print configuration values
    PrintConfig,
    /// Truncate all database tables
    TruncateDb,
}
