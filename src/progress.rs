use synctech_scope::save::SaveReporter;
use synctech_scope::Level;

/// Save reporter printing one line per created row. Saves touch tens of
/// rows at most, so plain lines beat a progress bar here.
pub struct CliReporter;

impl CliReporter {
    pub fn new() -> Self {
        CliReporter
    }
}

impl SaveReporter for CliReporter {
    fn on_container_saved(&self, name: &str, row_id: i64) {
        eprintln!("  \x1b[32m✓\x1b[0m scope '{}' saved as row {}", name, row_id);
    }

    fn on_node_saved(&self, level: Level, name: &str, row_id: i64) {
        let indent = "  ".repeat(level.depth() as usize);
        eprintln!("  \x1b[32m✓\x1b[0m{} '{}' saved as row {}", indent, name, row_id);
    }

    fn on_failure(&self, name: &str) {
        eprintln!("  \x1b[31m✗\x1b[0m saving '{}' failed", name);
    }

    fn on_compensated(&self, deleted: usize, failures: usize) {
        if failures == 0 {
            eprintln!("  \x1b[33m↩\x1b[0m rolled back {} created row(s)", deleted);
        } else {
            eprintln!(
                "  \x1b[31m↩\x1b[0m rollback incomplete: {} deleted, {} failed",
                deleted, failures
            );
        }
    }
}
