//
// ir.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 03/03/2024
//

//! Defines the intermediate representation of a parsed script.
//! A `Unit` is built once by the parser, never mutated afterwards,
//! and is the sole input of code generation.

use indexmap::IndexMap;
use crate::directive::Attributes;
use crate::lexer::COMMENT_MARKER;


/// The statement terminator stripped from the end of each variant.
pub const STATEMENT_TERMINATOR: char = ';';

/// The whole-document IR.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unit {
    /// Attributes of the header directive.
    pub header: Attributes,
    /// Repositories by name, in first-seen order.
    pub repositories: IndexMap<String, Repository>,
}

/// A named group of queries sharing a declared set of dialects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Name of the repository.
    pub name: String,
    /// Declared dialect names; sorted, de-duplicated, never empty.
    pub dialects: Vec<String>,
    /// Queries in declaration order.
    pub queries: Vec<Query>,
}

impl Repository {
    /// Looks up a query by name.
    pub fn query(&self, name: &str) -> Option<&Query> {
        self.queries.iter().find(|q| q.name == name)
    }
}

/// How the result of a query is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueryMode {
    /// Write-mode execution; yields the number of affected rows.
    Exec,
    /// Read-mode execution; yields every result row.
    Rows,
    /// Read-mode execution; yields the first row, or "no rows".
    Row,
}

/// A single named query with its per-dialect SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Name of the query.
    pub name: String,
    /// Optional documentation.
    pub doc: Option<Doc>,
    /// Positional arguments, in declaration order.
    pub args: Vec<Arg>,
    /// Result columns, in declaration order.
    pub cols: Vec<Col>,
    /// Variants keyed by dialect name, in authoring order.
    pub variants: IndexMap<String, Variant>,
    /// Whether the query was declared as returning a single row.
    pub single_row: bool,
}

impl Query {
    /// The result mode implied by the declared columns.
    pub fn mode(&self) -> QueryMode {
        if self.cols.is_empty() {
            QueryMode::Exec
        } else if self.single_row {
            QueryMode::Row
        } else {
            QueryMode::Rows
        }
    }

    /// The variant authored for `dialect`, if any.
    pub fn variant(&self, dialect: &str) -> Option<&Variant> {
        self.variants.get(dialect)
    }
}

/// The dialect-specific SQL text of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Name of the dialect.
    pub dialect: String,
    /// The final, trimmed statement. Never empty.
    pub stmt: String,
}

/// Documentation lines attached to a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Doc {
    /// The lines, comment markers stripped.
    pub lines: Vec<String>,
}

/// A positional query argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    /// Argument name.
    pub name: String,
    /// Type of the argument in the generated code.
    pub ty: String,
}

/// A result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Col {
    /// Column name.
    pub name: String,
    /// Type of the column in the generated code.
    pub ty: String,
}

/// Turns the raw lines collected for a variant into its final
/// statement: developer comment lines are dropped, trailing
/// whitespace of each line and surrounding whitespace of the whole
/// are trimmed, and one trailing statement terminator is stripped.
///
/// Applying this to its own output is a no-op, except for a
/// statement ending in two or more terminators.
pub fn trim_statement<S: AsRef<str>>(lines: &[S]) -> String {
    let kept: Vec<_> = lines.iter()
        .map(|l| l.as_ref().trim_end())
        .filter(|l| !l.trim_start().starts_with(COMMENT_MARKER))
        .collect();

    let joined = kept.join("\n");
    let trimmed = joined.trim();
    let stripped = trimmed.strip_suffix(STATEMENT_TERMINATOR).unwrap_or(trimmed);

    stripped.trim().to_owned()
}

/// Turns raw doc-block lines into documentation lines: one leading
/// comment marker and one following space are removed from each line,
/// trailing whitespace is trimmed, and surrounding blank lines dropped.
pub fn doc_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let stripped: Vec<String> = lines.iter()
        .map(|l| {
            let line = l.as_ref().trim();
            let line = line.strip_prefix(COMMENT_MARKER).unwrap_or(line);
            let line = line.strip_prefix(' ').unwrap_or(line);
            line.trim_end().to_owned()
        })
        .collect();

    let first = stripped.iter().position(|l| !l.is_empty());
    let last = stripped.iter().rposition(|l| !l.is_empty());

    match (first, last) {
        (Some(first), Some(last)) => stripped[first..=last].to_vec(),
        _ => Vec::new(),
    }
}
