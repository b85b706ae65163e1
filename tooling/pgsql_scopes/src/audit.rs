//! Unscoped-token audit.
//!
//! A coverage sweep over sample files, independent of assertions: every
//! token with visible text should carry at least one scope that says what
//! it is. The grammar's root scope and `meta.*` scopes only say where a
//! token is, so they do not count.

use std::fs;
use std::path::{Path, PathBuf};

use pgsql_textmate::{Token, Tokenize, TokenizeOptions};

use crate::discovery::{discover_in, FileKind};
use crate::error::RunError;

/// Scopes with this prefix mark structure, not meaning.
pub const META_PREFIX: &str = "meta.";

/// Whether `scope` classifies a token under a grammar rooted at `root`.
pub fn is_meaningful_scope(scope: &str, root: &str) -> bool {
    scope != root && !scope.starts_with(META_PREFIX)
}

/// Whether a token with visible text lacks any meaningful scope. Tokens
/// without an explanation have no scopes at all.
pub fn is_unscoped(token: &Token, root: &str) -> bool {
    !token.content.trim().is_empty()
        && !token
            .scope_names()
            .any(|scope| is_meaningful_scope(scope, root))
}

/// Unscoped tokens of one sample file, trimmed, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileAudit {
    pub path: PathBuf,
    pub unscoped: Vec<String>,
}

impl FileAudit {
    pub fn is_clean(&self) -> bool {
        self.unscoped.is_empty()
    }

    /// Name shown in the report: the file name, or the full path when there
    /// is none.
    pub fn display_name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub files: Vec<FileAudit>,
}

impl AuditReport {
    pub fn total(&self) -> usize {
        self.files.iter().map(|file| file.unscoped.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    pub fn exit_code(&self) -> i32 {
        i32::from(!self.is_clean())
    }
}

pub struct Auditor<'t, T: Tokenize + ?Sized> {
    tokenizer: &'t T,
}

impl<'t, T: Tokenize + ?Sized> Auditor<'t, T> {
    pub fn new(tokenizer: &'t T) -> Self {
        Auditor { tokenizer }
    }

    /// Audit every sample under `path` (a file or a directory).
    pub fn audit(&self, path: &Path) -> Result<AuditReport, RunError> {
        let files = discover_in(path, FileKind::Sample);
        tracing::debug!(
            path = %path.display(),
            files = files.len(),
            "auditing samples"
        );

        let mut report = AuditReport::default();
        for file in &files {
            report.files.push(self.audit_file(&file.path)?);
        }
        Ok(report)
    }

    pub fn audit_file(&self, path: &Path) -> Result<FileAudit, RunError> {
        let source = fs::read_to_string(path).map_err(|source| RunError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.audit_source(path, &source)
    }

    pub fn audit_source(&self, path: &Path, source: &str) -> Result<FileAudit, RunError> {
        let tokens = self
            .tokenizer
            .tokenize(source, TokenizeOptions::with_explanation())
            .map_err(|source| RunError::Tokenize {
                path: path.to_path_buf(),
                source,
            })?;

        let root = self.tokenizer.root_scope();
        let unscoped = tokens
            .lines()
            .flatten()
            .filter(|token| is_unscoped(token, root))
            .map(|token| token.content.trim().to_string())
            .collect();

        Ok(FileAudit {
            path: path.to_path_buf(),
            unscoped,
        })
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
