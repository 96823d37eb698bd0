//
// directive.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 03/03/2024
//

//! Parses the body of a directive token into a keyword and an
//! ordered map of attributes.
//!
//! Attribute syntax is a whitespace-separated list of `key`,
//! `key=value`, or `key="quoted value"` items. A bare key has
//! an empty value; a repeated key overwrites the earlier value.

use std::fmt::{ self, Display, Formatter };
use std::mem;
use indexmap::IndexMap;
use thiserror::Error as ThisError;
use crate::error::{ Error, Result };
use crate::lexer::{ Token, TokenKind };
use crate::util::split_list;


/// The keyword of the directive that marks the start of a script.
pub const HEADER_KEYWORD: &str = "cuttle";

/// Attributes of a directive, in the order their keys first appeared.
pub type Attributes = IndexMap<String, String>;

/// The kind of a directive, derived from its (case-insensitive) keyword.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// `cuttle`: start of the annotated part of the script.
    Header,
    /// `end`: closes a `doc` block.
    End,
    /// `migration`: a schema migration block, skipped entirely.
    Migration,
    /// `apply`: migration sub-marker.
    Apply,
    /// `step`: migration sub-marker.
    Step,
    /// `revert`: migration sub-marker.
    Revert,
    /// `repository`: opens a repository block.
    Repository,
    /// `query`: opens a query block.
    Query,
    /// `arg`: declares a query argument.
    Arg,
    /// `col`: declares a result column.
    Col,
    /// `doc`: opens a documentation block.
    Doc,
    /// `dialect`: selects the dialects subsequent SQL belongs to.
    Dialect,
    /// Any keyword not listed above. Never valid in any context.
    Unknown(String),
}

impl DirectiveKind {
    /// Classifies a raw keyword.
    pub fn from_keyword(keyword: &str) -> Self {
        use self::DirectiveKind::*;

        let lower = keyword.to_lowercase();

        match lower.as_str() {
            HEADER_KEYWORD => Header,
            "end"          => End,
            "migration"    => Migration,
            "apply"        => Apply,
            "step"         => Step,
            "revert"       => Revert,
            "repository"   => Repository,
            "query"        => Query,
            "arg"          => Arg,
            "col"          => Col,
            "doc"          => Doc,
            "dialect"      => Dialect,
            _              => Unknown(lower),
        }
    }

    /// The canonical keyword of this kind.
    pub fn keyword(&self) -> &str {
        use self::DirectiveKind::*;

        match *self {
            Header              => HEADER_KEYWORD,
            End                 => "end",
            Migration           => "migration",
            Apply               => "apply",
            Step                => "step",
            Revert              => "revert",
            Repository          => "repository",
            Query               => "query",
            Arg                 => "arg",
            Col                 => "col",
            Doc                 => "doc",
            Dialect             => "dialect",
            Unknown(ref name)   => name,
        }
    }
}

impl Display for DirectiveKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A malformed attribute list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ThisError)]
pub enum AttributeError {
    /// A quote appeared where no key had been opened.
    #[error("quotes are only allowed in attribute values")]
    StrayQuote,
    /// A quoted value was not closed before the end of the line.
    #[error("unterminated quotes")]
    UnterminatedQuote,
    /// An `=` appeared with no key in front of it.
    #[error("missing attribute name before '='")]
    MissingKey,
}

/// A parsed directive: the token it came from, its kind, and its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// The token the directive was parsed from.
    pub token: Token,
    /// The kind of the directive.
    pub kind: DirectiveKind,
    /// The attributes of the directive, keys unique.
    pub attributes: Attributes,
}

impl Directive {
    /// Parses a directive token. Fails with `Error::Syntax` if the
    /// attribute list is malformed, and with `Error::Unreachable` if
    /// `token` is not a single-line directive token.
    pub fn parse(token: Token) -> Result<Self> {
        if token.kind != TokenKind::Directive || token.content.len() != 1 {
            bug!("Attempt to parse {:?} token at lines {} as a directive", token.kind, token.span)
        }

        let body = token.content[0].trim();
        let (keyword, rest) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
        let kind = DirectiveKind::from_keyword(keyword);

        match parse_attributes(rest) {
            Ok(attributes) => Ok(Directive { token, kind, attributes }),
            Err(error) => Err(Error::syntax(
                &token,
                format!("Invalid attributes on '{}' directive: {}", kind, error),
            )),
        }
    }

    /// Returns the value of attribute `key`, or a grammar error
    /// blaming this directive if the attribute is missing or empty.
    pub fn require(&self, key: &str) -> Result<&str> {
        match self.attributes.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            Some(_) => Err(Error::grammar(
                &self.token,
                format!("Attribute '{}' on '{}' directive must not be empty", key, self.kind),
            )),
            None => Err(Error::grammar(
                &self.token,
                format!("Missing required attribute '{}' on '{}' directive", key, self.kind),
            )),
        }
    }

    /// Returns the value of attribute `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Whether attribute `key` is present, with or without a value.
    pub fn has(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Parses the required comma-separated list attribute `key`
    /// into a sorted, de-duplicated list of names.
    pub fn require_name_list(&self, key: &str) -> Result<Vec<String>> {
        let raw = self.require(key)?;
        self.name_list(key, raw)
    }

    /// Parses `raw`, the value of list attribute `key`, into
    /// a sorted, de-duplicated list of names.
    pub fn name_list(&self, key: &str, raw: &str) -> Result<Vec<String>> {
        let mut names = split_list(raw);

        if names.iter().any(String::is_empty) {
            return Err(Error::grammar(
                &self.token,
                format!("Empty name in '{}' list of '{}' directive", key, self.kind),
            ));
        }

        names.sort();
        names.dedup();

        // Dialect names match case-insensitively.
        for (i, name) in names.iter().enumerate() {
            if let Some(other) = names[i + 1..].iter().find(|n| n.eq_ignore_ascii_case(name)) {
                return Err(Error::grammar(
                    &self.token,
                    format!(
                        "Names '{}' and '{}' in '{}' list of '{}' directive differ only in case",
                        name, other, key, self.kind,
                    ),
                ));
            }
        }

        Ok(names)
    }
}

/// Parses a whitespace-separated attribute list.
///
/// # Return value
///
/// * `Ok(Attributes)` with every key in first-seen order; for a key
///   given more than once, the value of its last occurrence.
/// * `Err(AttributeError)` if a quote appears before any key was
///   opened, a quoted value is unterminated, or `=` has no key.
pub fn parse_attributes(text: &str) -> std::result::Result<Attributes, AttributeError> {
    let mut attributes = Attributes::new();
    let mut key: Option<String> = None;
    let mut buf = String::new();
    let mut in_quotes = false;

    for ch in text.chars() {
        if in_quotes {
            if ch == '"' {
                in_quotes = false;
                flush(&mut attributes, &mut key, &mut buf);
            } else {
                buf.push(ch);
            }
        } else if ch.is_whitespace() {
            flush(&mut attributes, &mut key, &mut buf);
        } else if ch == '=' && key.is_none() {
            if buf.is_empty() {
                return Err(AttributeError::MissingKey);
            }

            key = Some(mem::take(&mut buf));
        } else if ch == '"' {
            if key.is_none() {
                return Err(AttributeError::StrayQuote);
            }

            in_quotes = true;
        } else {
            buf.push(ch);
        }
    }

    if in_quotes {
        return Err(AttributeError::UnterminatedQuote);
    }

    flush(&mut attributes, &mut key, &mut buf);

    Ok(attributes)
}

// Commits the pending attribute, if any: either an opened key with
// the buffered value, or a bare key with an empty value.
fn flush(attributes: &mut Attributes, key: &mut Option<String>, buf: &mut String) {
    match key.take() {
        Some(k) => {
            attributes.insert(k, mem::take(buf));
        },
        None if !buf.is_empty() => {
            attributes.insert(mem::take(buf), String::new());
        },
        None => {},
    }
}
