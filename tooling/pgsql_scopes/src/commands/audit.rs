//! The `audit` command: list tokens the grammar left unclassified.

use std::path::Path;

use pgsql_scopes::{AuditReport, Auditor};

use super::{load_highlighter, quoted};

pub fn run_audit(grammar: &Path, path: &Path) -> i32 {
    if !path.exists() {
        eprintln!("Path not found: {}", path.display());
        return 1;
    }

    let Some(highlighter) = load_highlighter(grammar) else {
        return 1;
    };

    match Auditor::new(&highlighter).audit(path) {
        Ok(report) => {
            print_audit_report(&report);
            report.exit_code()
        }
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    }
}

fn print_audit_report(report: &AuditReport) {
    for file in &report.files {
        let name = file.display_name();
        if file.is_clean() {
            println!("{name}: all scoped");
            continue;
        }

        println!("\n--- {name} ---");
        for text in &file.unscoped {
            println!("  UNSCOPED: {}", quoted(text));
        }
        println!("  {} unscoped token(s)", file.unscoped.len());
    }

    println!(
        "\nTotal: {} unscoped token(s) across {} files",
        report.total(),
        report.files.len()
    );
}
