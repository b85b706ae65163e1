//! `pgsql-scopes`: check scope assertions and audit scope coverage of the
//! `PostgreSQL` `TextMate` grammar.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pgsql_scopes::RunnerConfig;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "pgsql-scopes",
    version,
    about = "Scope-assertion tests and coverage audit for the PostgreSQL TextMate grammar"
)]
struct Cli {
    /// Grammar to tokenize with.
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        default_value = "pgsql.tmLanguage.json"
    )]
    grammar: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the scope assertions in `*.test.sql` fixtures.
    Test {
        /// Fixture file or directory.
        #[arg(default_value = "tests")]
        path: PathBuf,
        /// Only check assertions whose label contains PATTERN.
        #[arg(long, value_name = "PATTERN")]
        filter: Option<String>,
        /// Also list passing assertions.
        #[arg(short, long)]
        verbose: bool,
    },
    /// List visible tokens in `*.sql` samples that have no meaningful scope.
    Audit {
        /// Sample file or directory.
        #[arg(default_value = "samples")]
        path: PathBuf,
    },
    /// Print every token of a file with its scopes.
    Dump {
        /// File to tokenize.
        file: PathBuf,
    },
}

fn main() {
    pgsql_scopes::init_tracing();
    let cli = Cli::parse();

    let code = match cli.command {
        Command::Test {
            path,
            filter,
            verbose,
        } => commands::run_tests(&cli.grammar, &path, RunnerConfig { filter, verbose }),
        Command::Audit { path } => commands::run_audit(&cli.grammar, &path),
        Command::Dump { file } => commands::dump_file(&cli.grammar, &file),
    };

    std::process::exit(code);
}
