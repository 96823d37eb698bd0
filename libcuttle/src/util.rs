//
// util.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 02/03/2024
//

//! The `util` module provides various useful helper functions
//! and types used throughout the Cuttle source tree: source
//! spans, colorful diagnostics, package metadata, and string
//! helpers specific to the code that Cuttle emits.

use std::fmt::{ self, Display, Formatter };
use unicode_segmentation::UnicodeSegmentation;


/// Type of a global descriptor that holds information about
/// the current version of the Cuttle package (library and compiler).
#[derive(Debug, Clone, Copy)]
pub struct PackageInfo {
    /// The name of the Cuttle package.
    pub name: &'static str,
    /// The version of the Cuttle package.
    pub version: &'static str,
    /// The list of authors of Cuttle.
    pub authors: &'static str,
    /// A short summary of this package.
    pub description: &'static str,
    /// URL of the Cuttle home page.
    pub home_page: &'static str,
}

/// Holds metadata about the Cuttle package as defined in the Cargo manifest.
pub static PACKAGE_INFO: PackageInfo = PackageInfo {
    name:        env!["CARGO_PKG_NAME"],
    version:     env!["CARGO_PKG_VERSION"],
    authors:     env!["CARGO_PKG_AUTHORS"],
    description: env!["CARGO_PKG_DESCRIPTION"],
    home_page:   env!["CARGO_PKG_HOMEPAGE"],
};

/// Used for distinguishing between the types of
/// diagnostic that the compiler can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    /// A message without any special attributes or coloring.
    Default,
    /// An informative message, eg. compilation progress or performance.
    Info,
    /// A highlighted part of a diagnostic.
    Highlight,
    /// Indicates successful compilation.
    Success,
    /// Indicates that an error occurred during compilation.
    Error,
}

/// Returns `DiagnosticKind::Default`.
impl Default for DiagnosticKind {
    fn default() -> Self {
        DiagnosticKind::Default
    }
}

/// A string which, when `Display`ed, looks pretty and colorful.
/// It is used for formatting diagnostic messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Diagnostic<T> {
    value: T,
    kind: DiagnosticKind,
}

impl<T> Diagnostic<T> {
    /// Makes a pretty-printable diagnostic that displays
    /// a given value in the specified diagnostic style.
    pub fn new(value: T, kind: DiagnosticKind) -> Self {
        Diagnostic { value, kind }
    }

    /// Consumes `self` and returns the inner value, discarding style information.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Returns the diagnostic kind associated with this instance.
    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }
}

impl<T> From<T> for Diagnostic<T> {
    fn from(value: T) -> Self {
        Self::new(value, DiagnosticKind::Default)
    }
}

impl<T> Display for Diagnostic<T> where T: Display {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let reset = "\x1b[0m";
        let color = match self.kind {
            DiagnosticKind::Default   => "",
            DiagnosticKind::Info      => "\x1b[1;33m",
            DiagnosticKind::Highlight => "\x1b[1;36m",
            DiagnosticKind::Success   => "\x1b[1;32m",
            DiagnosticKind::Error     => "\x1b[1;31m",
        };

        write!(f, "{}{}{}{}", reset, color, self.value, reset)
    }
}

/// An inclusive range of 1-based physical line numbers
/// within a single source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    /// 1-based index of the first line of the span.
    pub start: usize,
    /// 1-based index of the last line of the span, inclusive.
    pub end: usize,
}

impl Span {
    /// A span covering exactly one line.
    pub fn line(line: usize) -> Self {
        Span { start: line, end: line }
    }

    /// The number of lines covered by the span.
    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    /// Spans always cover at least one line.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// This trait is to be implemented by entities that correspond
/// to some span in the source. This is used for generating
/// location information in user-visible error messages.
pub trait Spanned {
    /// Returns the span `self` was read from.
    fn span(&self) -> Span;
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}

/// Returns the number of extended grapheme clusters in `string`.
/// Used for aligning the gutter of multi-line diagnostics, where
/// source names may contain arbitrary Unicode.
pub fn grapheme_count(string: &str) -> usize {
    string.graphemes(true).count()
}

/// Splits a comma-separated list, trimming each element.
/// Empty elements are preserved so that callers can reject them.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_owned()).collect()
}

/// Renders `value` as a Rust raw string literal, choosing
/// enough `#` delimiters that the content cannot close it early.
pub fn raw_string_literal(value: &str) -> String {
    let mut hashes = 1;

    loop {
        let closing = format!("\"{}", "#".repeat(hashes));

        if !value.contains(&closing) {
            break;
        }

        hashes += 1;
    }

    let delim = "#".repeat(hashes);

    format!("r{}\"{}\"{}", delim, value, delim)
}
