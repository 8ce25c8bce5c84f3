//! Recognition of `Require`/`From ... Import` statements.

use crate::error::{ExtractError, Result};

/// An import-family statement with its fully qualified module names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatement {
    /// `Require M.` loads modules without importing their names
    Require(Vec<String>),

    /// `Require Import M.`, `From P Import a.`, `From P Require Import a.`
    Import(Vec<String>),

    /// `Require Export M.`, `From P Require Export a.`
    Export(Vec<String>),

    /// Recognized but not handled (`From P Export a.`)
    Unsupported,
}

impl ImportStatement {
    pub fn modules(&self) -> &[String] {
        match self {
            Self::Require(modules) | Self::Import(modules) | Self::Export(modules) => modules,
            Self::Unsupported => &[],
        }
    }
}

/// Parse `text` as an import statement of `file`.
///
/// Returns `Ok(None)` for statements that are not imports.
pub fn parse_import(file: &str, text: &str) -> Result<Option<ImportStatement>> {
    let statement = text.trim();
    let tokens: Vec<&str> = statement
        .trim_end_matches('.')
        .split_whitespace()
        .collect();
    let malformed = || ExtractError::malformed_import(file, statement);

    let parsed = match tokens.as_slice() {
        ["Require", "Import", rest @ ..] => ImportStatement::Import(modules(None, rest)),
        ["Require", "Export", rest @ ..] => ImportStatement::Export(modules(None, rest)),
        ["Require", rest @ ..] => ImportStatement::Require(modules(None, rest)),
        ["From", prefix, "Require", "Import", rest @ ..] | ["From", prefix, "Import", rest @ ..] => {
            ImportStatement::Import(modules(Some(*prefix), rest))
        }
        ["From", prefix, "Require", "Export", rest @ ..] => {
            ImportStatement::Export(modules(Some(*prefix), rest))
        }
        ["From", _, "Export", ..] => return Ok(Some(ImportStatement::Unsupported)),
        ["From", prefix, "Require", rest @ ..] => {
            ImportStatement::Require(modules(Some(*prefix), rest))
        }
        ["From", ..] => return Err(malformed()),
        _ => return Ok(None),
    };

    if parsed.modules().is_empty() {
        return Err(malformed());
    }
    Ok(Some(parsed))
}

fn modules(prefix: Option<&str>, tokens: &[&str]) -> Vec<String> {
    let prefix = prefix.map(|p| p.trim_end_matches('.'));
    tokens
        .iter()
        .map(|token| token.trim_end_matches([',', '.']))
        .filter(|token| !token.is_empty())
        .map(|module| match prefix {
            Some(prefix) => format!("{prefix}.{module}"),
            None => module.to_string(),
        })
        .collect()
}
