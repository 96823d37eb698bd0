//
// parser.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 04/03/2024
//

//! The document parser. It pulls tokens from a `Tokenizer`, parses
//! directives, enforces the directive grammar, and builds a `Unit`.
//!
//! The grammar, informally:
//!
//! ```text
//! Unit       := skip-until(header) Block*
//! Block      := Migration | Repository
//! Migration  := 'migration', anything, until 'migration' | 'repository'
//! Repository := 'repository', Query*, until 'migration' | 'repository'
//! Query      := 'query', (Text | 'arg' | 'col' | Doc | 'dialect')*,
//!               until 'migration' | 'repository' | 'query'
//! Doc        := 'doc', Text*, 'end'
//! ```
//!
//! The directive that ends a block belongs to the enclosing block,
//! so it is pushed back into a one-slot lookahead buffer.

use std::collections::HashSet;
use std::io::BufRead;
use indexmap::IndexMap;
use tracing::debug;
use crate::error::{ Error, Result };
use crate::lexer::{ Token, TokenKind, Tokenizer };
use crate::directive::{ Directive, DirectiveKind, HEADER_KEYWORD };
use crate::dialect::GENERIC;
use crate::ir::{ Unit, Repository, Query, Variant, Doc, Arg, Col, trim_statement, doc_lines };


/// Parses an annotated SQL script into a `Unit`.
///
/// # Arguments
///
/// * `input`: the script, read line by line.
/// * `source`: the human-readable name of the script, used in diagnostics.
///
/// # Return value
///
/// * `Ok(Unit)` if the whole script is well-formed.
/// * `Err(Error)` describing the first problem found. No partial
///   `Unit` is ever returned.
pub fn parse<R: BufRead>(input: R, source: &str) -> Result<Unit> {
    Parser::new(Tokenizer::new(input, source)).parse()
}

/// The dialects that subsequent SQL text in a query is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Selector {
    /// No `dialect` directive seen yet.
    Anonymous,
    /// SQL belonging to the named dialect.
    Dialect(String),
}

struct Parser<R> {
    tokenizer: Tokenizer<R>,
    queued:    Option<Token>,
    unit:      Unit,
}

impl<R: BufRead> Parser<R> {
    fn new(tokenizer: Tokenizer<R>) -> Self {
        Parser {
            tokenizer,
            queued: None,
            unit: Unit::default(),
        }
    }

    // Token stream helpers

    fn next(&mut self) -> Result<Option<Token>> {
        match self.queued.take() {
            Some(token) => Ok(Some(token)),
            None        => self.tokenizer.next_token(),
        }
    }

    fn queue(&mut self, token: Token) -> Result<()> {
        if let Some(ref queued) = self.queued {
            bug!("Lookahead slot already holds the token at lines {}", queued.span)
        }

        self.queued = Some(token);

        Ok(())
    }

    // Returns the next directive, skipping text, or `None` at the end of input.
    fn next_directive(&mut self) -> Result<Option<Directive>> {
        while let Some(token) = self.next()? {
            if token.kind == TokenKind::Directive {
                return Directive::parse(token).map(Some);
            }
        }

        Ok(None)
    }

    fn repository_mut(&mut self, name: &str) -> Result<&mut Repository> {
        self.unit.repositories.get_mut(name).ok_or_else(
            lazy_bug!("Repository '{}' vanished while being parsed", name)
        )
    }

    // Actual parser methods

    fn parse(mut self) -> Result<Unit> {
        let header = self.parse_header()?;

        debug!(source = %header.token.source, line = header.token.span.start, "found header");

        self.unit.header = header.attributes;

        while let Some(dir) = self.next_directive()? {
            match dir.kind {
                DirectiveKind::Migration  => self.parse_migration(dir)?,
                DirectiveKind::Repository => self.parse_repository(dir)?,
                _ => return Err(unexpected(&dir, "at top level")),
            }
        }

        Ok(self.unit)
    }

    fn parse_header(&mut self) -> Result<Directive> {
        while let Some(token) = self.next()? {
            if token.is_directive(HEADER_KEYWORD) {
                return Directive::parse(token);
            }
        }

        Err(Error::grammar_at_eof(format!(
            "Missing '--:{}' header directive",
            HEADER_KEYWORD,
        )))
    }

    fn parse_migration(&mut self, dir: Directive) -> Result<()> {
        debug!(line = dir.token.span.start, "skipping migration");

        while let Some(dir) = self.next_directive()? {
            match dir.kind {
                DirectiveKind::Migration | DirectiveKind::Repository => return self.queue(dir.token),
                _ => continue,
            }
        }

        Ok(())
    }

    fn parse_repository(&mut self, dir: Directive) -> Result<()> {
        let name = dir.require("name")?.to_owned();
        let declared = match dir.get("dialects") {
            Some(raw) => Some(dir.name_list("dialects", raw)?),
            None      => None,
        };

        debug!(name = %name, dialects = ?declared, "parsing repository");

        let dialects = match self.unit.repositories.get(&name) {
            Some(existing) => match declared {
                Some(ref dialects) if *dialects != existing.dialects => return Err(Error::grammar(
                    &dir.token,
                    format!(
                        "Repository '{}' re-opened with dialects [{}], but it was declared with [{}]",
                        name,
                        dialects.join(", "),
                        existing.dialects.join(", "),
                    ),
                )),
                _ => existing.dialects.clone(),
            },
            None => {
                let dialects = declared.unwrap_or_else(|| vec![GENERIC.name.to_owned()]);
                let repository = Repository {
                    name:     name.clone(),
                    dialects: dialects.clone(),
                    queries:  Vec::new(),
                };

                self.unit.repositories.insert(name.clone(), repository);

                dialects
            },
        };

        while let Some(dir) = self.next_directive()? {
            match dir.kind {
                DirectiveKind::Migration | DirectiveKind::Repository => return self.queue(dir.token),
                DirectiveKind::Query => {
                    let query_name = dir.require("name")?.to_owned();

                    if self.repository_mut(&name)?.query(&query_name).is_some() {
                        return Err(Error::grammar(
                            &dir.token,
                            format!("Duplicate query '{}' in repository '{}'", query_name, name),
                        ));
                    }

                    let query = self.parse_query(dir, query_name, &name, &dialects)?;

                    self.repository_mut(&name)?.queries.push(query);
                },
                _ => return Err(unexpected(&dir, "inside a repository")),
            }
        }

        Ok(())
    }

    fn parse_query(
        &mut self,
        dir:        Directive,
        name:       String,
        repository: &str,
        dialects:   &[String],
    ) -> Result<Query> {
        debug!(repository = %repository, name = %name, "parsing query");

        let mut query = Query {
            name,
            doc:        None,
            args:       Vec::new(),
            cols:       Vec::new(),
            variants:   IndexMap::new(),
            single_row: dir.has("one"),
        };
        let mut selectors = vec![Selector::Anonymous];
        let mut seen = HashSet::new();
        let mut texts: IndexMap<Selector, Vec<String>> = IndexMap::new();

        while let Some(token) = self.next()? {
            if token.kind == TokenKind::Text {
                for selector in &selectors {
                    texts.entry(selector.clone()).or_default().extend(token.content.iter().cloned());
                }

                continue;
            }

            let next = Directive::parse(token)?;

            match next.kind {
                DirectiveKind::Migration | DirectiveKind::Repository | DirectiveKind::Query => {
                    self.queue(next.token)?;
                    break;
                },
                DirectiveKind::Arg => {
                    let arg = Arg {
                        name: next.require("name")?.to_owned(),
                        ty:   next.require("type")?.to_owned(),
                    };

                    if query.args.iter().any(|a| a.name == arg.name) {
                        return Err(Error::grammar(
                            &next.token,
                            format!("Duplicate argument '{}' in query '{}'", arg.name, query.name),
                        ));
                    }

                    query.args.push(arg);
                },
                DirectiveKind::Col => {
                    let col = Col {
                        name: next.require("name")?.to_owned(),
                        ty:   next.require("type")?.to_owned(),
                    };

                    if query.cols.iter().any(|c| c.name == col.name) {
                        return Err(Error::grammar(
                            &next.token,
                            format!("Duplicate column '{}' in query '{}'", col.name, query.name),
                        ));
                    }

                    query.cols.push(col);
                },
                DirectiveKind::Doc => {
                    if query.doc.is_some() {
                        return Err(Error::grammar(
                            &next.token,
                            format!("Query '{}' already has a 'doc' block", query.name),
                        ));
                    }

                    query.doc = Some(self.parse_doc(&next)?);
                },
                DirectiveKind::Dialect => {
                    let names = next.require_name_list("name")?;

                    for dialect in &names {
                        if !seen.insert(dialect.clone()) {
                            return Err(Error::grammar(
                                &next.token,
                                format!("Dialect '{}' selected more than once in query '{}'", dialect, query.name),
                            ));
                        }

                        if !dialects.contains(dialect) {
                            return Err(Error::grammar(
                                &next.token,
                                format!("Dialect '{}' is not declared by repository '{}'", dialect, repository),
                            ));
                        }
                    }

                    selectors = names.into_iter().map(Selector::Dialect).collect();
                },
                _ => return Err(unexpected(&next, "inside a query")),
            }
        }

        query.variants = collect_variants(&dir, &query.name, texts, dialects)?;

        if query.single_row && query.cols.is_empty() {
            return Err(Error::grammar(
                &dir.token,
                format!("Query '{}' is marked 'one' but declares no columns", query.name),
            ));
        }

        Ok(query)
    }

    fn parse_doc(&mut self, dir: &Directive) -> Result<Doc> {
        let mut lines = Vec::new();

        loop {
            let token = self.next()?.ok_or_else(|| Error::grammar(
                &dir.token,
                "Unterminated 'doc' block: reached end of input before 'end'",
            ))?;

            if token.kind == TokenKind::Text {
                lines.extend(token.content);
                continue;
            }

            let next = Directive::parse(token)?;

            match next.kind {
                DirectiveKind::End => break,
                _ => return Err(unexpected(&next, "inside a 'doc' block")),
            }
        }

        Ok(Doc { lines: doc_lines(&lines) })
    }
}

// Trims the text collected for each selector, drops empty results, and
// resolves anonymous SQL to the repository's only dialect.
fn collect_variants(
    dir:      &Directive,
    query:    &str,
    texts:    IndexMap<Selector, Vec<String>>,
    dialects: &[String],
) -> Result<IndexMap<String, Variant>> {
    let mut variants = IndexMap::new();
    let mut anonymous = None;

    for (selector, lines) in texts {
        let stmt = trim_statement(&lines);

        if stmt.is_empty() {
            continue;
        }

        match selector {
            Selector::Anonymous => anonymous = Some(stmt),
            Selector::Dialect(dialect) => {
                variants.insert(dialect.clone(), Variant { dialect, stmt });
            },
        }
    }

    if let Some(stmt) = anonymous {
        if !variants.is_empty() {
            return Err(Error::grammar(
                &dir.token,
                format!("Query '{}' mixes SQL outside of any dialect with dialect-specific SQL", query),
            ));
        }

        let dialect = match *dialects {
            [ref only] => only.clone(),
            _ => return Err(Error::grammar(
                &dir.token,
                format!(
                    "Cannot infer the dialect of SQL in query '{}': the repository declares {} dialects",
                    query,
                    dialects.len(),
                ),
            )),
        };

        variants.insert(dialect.clone(), Variant { dialect, stmt });
    }

    if variants.is_empty() {
        return Err(Error::grammar(&dir.token, format!("Query '{}' contains no SQL", query)));
    }

    Ok(variants)
}

fn unexpected(dir: &Directive, context: &str) -> Error {
    let message = match dir.kind {
        DirectiveKind::Unknown(ref keyword) => format!("Unknown directive '{}'", keyword),
        ref kind => format!("Unexpected '{}' directive {}", kind, context),
    };

    Error::grammar(&dir.token, message)
}
