//
// error.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 02/03/2024
//

//! This module defines types for representing possible errors
//! that may be generated while compiling an annotated SQL script.
//! It also provides macros for reporting internal compiler errors
//! in a way that is consistent across modules.

use std::io;
use std::result;
use thiserror::Error as ThisError;
use crate::lexer::Token;
use crate::util::{ Diagnostic, DiagnosticKind, Spanned, grapheme_count };


/// Internal helper for macros `bug!()` and `lazy_bug!()`.
macro_rules! unreachable_error {
    ($msg: expr) => {
        $crate::error::Error::Unreachable {
            message: $msg,
            file: file!(),
            line: line!() as usize,
        }
    }
}

/// Indicates a compiler error. Makes the current function return
/// an `Error::Unreachable`. This is basically a non-panicking
/// substitute for the standard `unreachable!()` macro.
macro_rules! bug {
    ($msg: expr) => {
        return Err(unreachable_error!($msg.to_owned()))
    };
    ($fmt: expr, $($args: tt)*) => {
        return Err(unreachable_error!(format!($fmt, $($args)*)))
    };
}

/// Similar to `bug!()`, but it yields a closure that returns an
/// `Error::Unreachable`. Useful for handling errors lazily,
/// primarily using `Option::ok_or_else()`.
macro_rules! lazy_bug {
    ($msg: expr) => {
        || unreachable_error!($msg.to_owned())
    };
    ($fmt: expr, $($args: tt)*) => {
        || unreachable_error!(format!($fmt, $($args)*))
    };
}


/// An error that may occur while compiling an annotated SQL script.
/// This can be either a user-induced error (e.g. a malformed directive),
/// or an Internal Compiler Error (abbreviated ICE), i.e. a bug.
#[derive(Debug, ThisError)]
pub enum Error {
    /// I/O error while reading the script or writing generated code.
    #[error("I/O error: {0}")]
    IO(#[from] io::Error),
    /// Some unreachable code was reached as a result of a bug/unforeseen condition. ICE.
    #[error("Internal Compiler Error: Reached unreachable code: {message}, in file {file}, line {line}. This is a bug.")]
    Unreachable {
        /// Description of the bug.
        message: String,
        /// Source file inside the Cuttle compiler that caused the bug.
        file: &'static str,
        /// Source line index within the offending file.
        line: usize,
    },
    /// The attribute text of a directive is malformed.
    #[error("Syntax Error: {message}")]
    Syntax {
        /// Description of the syntax error.
        message: String,
        /// The directive token the error was found in.
        token: Box<Token>,
    },
    /// A directive violates the document grammar or a structural invariant.
    #[error("Grammar Error: {message}")]
    Grammar {
        /// Description of the grammar error.
        message: String,
        /// The offending token. End-of-input without any
        /// token to blame is represented as `None`.
        token: Option<Box<Token>>,
    },
    /// The backend cannot express a construct of the parsed unit.
    #[error("Codegen Error: {message}")]
    Codegen {
        /// Description of the code generation error.
        message: String,
    },
}

/// Convenience type alias for expressing `Result`s of Cuttle `Error`s.
pub type Result<T> = result::Result<T, Error>;


impl Error {
    /// Makes a syntax error blaming `token`.
    pub fn syntax<S: Into<String>>(token: &Token, message: S) -> Self {
        Error::Syntax {
            message: message.into(),
            token: Box::new(token.clone()),
        }
    }

    /// Makes a grammar error blaming `token`.
    pub fn grammar<S: Into<String>>(token: &Token, message: S) -> Self {
        Error::Grammar {
            message: message.into(),
            token: Some(Box::new(token.clone())),
        }
    }

    /// Makes a grammar error that has no token to blame.
    pub fn grammar_at_eof<S: Into<String>>(message: S) -> Self {
        Error::Grammar {
            message: message.into(),
            token: None,
        }
    }

    /// Makes a code generation error.
    pub fn codegen<S: Into<String>>(message: S) -> Self {
        Error::Codegen { message: message.into() }
    }

    /// The token this error was reported at, if any.
    pub fn token(&self) -> Option<&Token> {
        match *self {
            Error::Syntax { ref token, .. }               => Some(&**token),
            Error::Grammar { token: Some(ref token), .. } => Some(&**token),
            _                                             => None,
        }
    }

    /// The bare message, without the error-kind prefix.
    pub fn message(&self) -> String {
        match *self {
            Error::Syntax   { ref message, .. } => message.clone(),
            Error::Grammar  { ref message, .. } => message.clone(),
            Error::Codegen  { ref message }     => message.clone(),
            ref other                           => other.to_string(),
        }
    }

    /// Writes an error object as a nicely-formatted, user-readable
    /// error message: every raw source line spanned by the offending
    /// token, prefixed with the source name and its 1-based line number,
    /// followed by the source name, the inclusive line span, and the message.
    ///
    /// # Arguments:
    ///
    /// * `wr`: the `io::Write` that the error will be printed to.
    pub fn pretty_print(&self, wr: &mut dyn io::Write) -> io::Result<()> {
        let token = match self.token() {
            Some(token) => token,
            None => return writeln!(wr, "\n    {}\n", Diagnostic::new(self, DiagnosticKind::Error)),
        };

        let span = token.span();
        let gutters: Vec<_> = (span.start..=span.end)
            .map(|line| format!("{}:{}:", token.source, line))
            .collect();
        let width = gutters.iter().map(|g| grapheme_count(g)).max().unwrap_or(0);

        writeln!(wr)?;

        for (gutter, line) in gutters.iter().zip(&token.raw_lines) {
            let pad = " ".repeat(width - grapheme_count(gutter));
            writeln!(wr, "    {}{} {}", Diagnostic::new(gutter, DiagnosticKind::Highlight), pad, line)?;
        }

        writeln!(
            wr,
            "    {}: {}\n",
            Diagnostic::new(format!("{}:{}", token.source, span), DiagnosticKind::Highlight),
            Diagnostic::new(self, DiagnosticKind::Error),
        )
    }
}
