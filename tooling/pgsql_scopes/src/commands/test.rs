//! The `test` command: run fixture assertions and report results.

use std::path::Path;

use pgsql_scopes::{AssertionOutcome, AssertionRunner, RunSummary, RunnerConfig};

use super::load_highlighter;

pub fn run_tests(grammar: &Path, path: &Path, config: RunnerConfig) -> i32 {
    if !path.exists() {
        eprintln!("Path not found: {}", path.display());
        return 1;
    }

    let Some(highlighter) = load_highlighter(grammar) else {
        return 1;
    };
    let runner = AssertionRunner::with_config(&highlighter, config);

    match runner.run(path) {
        Ok(summary) => {
            print_test_summary(&summary, runner.config().verbose);
            summary.exit_code()
        }
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    }
}

/// Print results file by file, then the totals.
fn print_test_summary(summary: &RunSummary, verbose: bool) {
    for file in &summary.files {
        if file.total() == 0 {
            continue;
        }

        if verbose || file.has_failures() {
            println!("\n{}", file.path.display());
        }

        for result in &file.results {
            match &result.outcome {
                AssertionOutcome::Passed => {
                    if verbose {
                        println!("  PASS: {}", result.label);
                    }
                }
                AssertionOutcome::Failed(message) => {
                    println!("  FAIL: {}", result.label);
                    for line in message.lines() {
                        println!("        {line}");
                    }
                }
            }
        }
    }

    println!();
    println!("Test Summary:");
    println!(
        "  {} passed, {} failed ({} total) in {} files",
        summary.passed,
        summary.failed,
        summary.total(),
        summary.files.len()
    );
    println!("  Completed in {:.2?}", summary.duration);

    println!();
    if summary.has_failures() {
        println!("FAILED");
    } else if summary.total() == 0 {
        println!("NO ASSERTIONS FOUND");
    } else {
        println!("OK");
    }
}
