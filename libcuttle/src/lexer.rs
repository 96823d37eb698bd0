//
// lexer.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 02/03/2024
//

//! This module contains type definitions and functions for
//! breaking up an annotated SQL script into tokens. Every physical
//! line is either a directive (a line comment whose body starts with
//! the directive sigil) or ordinary text; runs of consecutive text
//! lines are coalesced into a single `Text` token.

use std::io::{ self, BufRead };
use std::sync::Arc;
use regex::Regex;
use lazy_static::lazy_static;
use crate::error::Result;
use crate::util::{ Span, Spanned };


/// The marker that introduces a line comment in SQL.
pub const COMMENT_MARKER: &str = "--";

/// The character which, directly after a line comment marker,
/// turns the comment into a directive.
pub const DIRECTIVE_SIGIL: char = ':';

lazy_static! {
    static ref DIRECTIVE_LINE: Regex = Regex::new(&format!(
        r"^\s*{}\s*{}(.*)$",
        regex::escape(COMMENT_MARKER),
        regex::escape(&DIRECTIVE_SIGIL.to_string()),
    )).unwrap();
}

/// Given the full text of a script, returns every token in it,
/// or an error if the underlying reader fails.
///
/// # Arguments
///
/// * `source`: the human-readable name of the script, e.g. its path.
/// * `text`: the contents of the script.
pub fn lex(source: &str, text: &str) -> Result<Vec<Token>> {
    Tokenizer::new(text.as_bytes(), source).collect()
}

/// Returns the directive content of `line` (sigil and comment
/// marker stripped, surrounding whitespace trimmed), or `None`
/// if `line` is not a directive.
pub fn directive_content(line: &str) -> Option<&str> {
    DIRECTIVE_LINE.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Describes the type of a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    /// One or more consecutive non-directive lines, SQL comments included.
    Text,
    /// Exactly one directive line.
    Directive,
}

/// A run of source lines together with its kind and location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// The kind of the token.
    pub kind: TokenKind,
    /// Name of the source the token was read from.
    pub source: Arc<str>,
    /// Inclusive, 1-based line span of the token.
    pub span: Span,
    /// The physical lines spanned by the token, verbatim.
    pub raw_lines: Vec<String>,
    /// For a `Text` token, the same lines as `raw_lines`. For a
    /// `Directive` token, exactly one line: the directive body
    /// with the comment marker and sigil removed.
    pub content: Vec<String>,
}

impl Token {
    /// Whether this is a directive token whose keyword is `keyword`,
    /// compared case-insensitively.
    pub fn is_directive(&self, keyword: &str) -> bool {
        if self.kind != TokenKind::Directive {
            return false;
        }

        self.content.first()
            .and_then(|body| body.split_whitespace().next())
            .map_or(false, |kw| kw.eq_ignore_ascii_case(keyword))
    }
}

impl Spanned for Token {
    fn span(&self) -> Span {
        self.span
    }
}

/// A pull-style tokenizer. Each call to `next_token()` reads just
/// enough lines to produce one token.
///
/// A directive that terminates a run of text cannot be returned in
/// the same call as that text, so it is parked in a one-slot buffer
/// and handed out by the following call.
#[derive(Debug)]
pub struct Tokenizer<R> {
    lines: io::Lines<R>,
    source: Arc<str>,
    line: usize,
    queued: Option<Token>,
}

impl<R: BufRead> Tokenizer<R> {
    /// Creates a tokenizer reading lines from `input`. `source`
    /// names the input in tokens and diagnostics.
    pub fn new(input: R, source: &str) -> Self {
        Tokenizer {
            lines: input.lines(),
            source: source.into(),
            line: 0,
            queued: None,
        }
    }

    /// Returns the next token, or `None` at the end of the input.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if let Some(token) = self.queued.take() {
            return Ok(Some(token));
        }

        let mut text = Vec::new();
        let mut start = 0;

        while let Some(line) = self.lines.next() {
            let line = line?;
            self.line += 1;

            if let Some(body) = directive_content(&line) {
                let token = Token {
                    kind: TokenKind::Directive,
                    source: self.source.clone(),
                    span: Span::line(self.line),
                    content: vec![body.to_owned()],
                    raw_lines: vec![line],
                };

                if text.is_empty() {
                    return Ok(Some(token));
                }

                self.queued = Some(token);

                return Ok(Some(self.text_token(start, text)));
            }

            if text.is_empty() {
                start = self.line;
            }

            text.push(line);
        }

        if text.is_empty() {
            return Ok(None);
        }

        Ok(Some(self.text_token(start, text)))
    }

    fn text_token(&self, start: usize, lines: Vec<String>) -> Token {
        Token {
            kind: TokenKind::Text,
            source: self.source.clone(),
            span: Span { start, end: start + lines.len() - 1 },
            content: lines.clone(),
            raw_lines: lines,
        }
    }
}

impl<R: BufRead> Iterator for Tokenizer<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
