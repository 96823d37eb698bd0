//
// tests/common/mod.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 11/03/2024
//

#![allow(dead_code)]
#![deny(missing_debug_implementations, missing_copy_implementations,
        trivial_numeric_casts,
        unsafe_code,
        unused_import_braces)]

use cuttle::error::Error;
use cuttle::ir::Unit;
use cuttle::parser::parse;
use cuttle::runtime::{ self, Exec, RTx, Rows, Value, WTx };
use cuttle::util::Span;


/// Name of the source every test script is parsed as.
pub const SOURCE: &str = "test.sql";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Grammar,
}

#[derive(Debug, Clone, Copy)]
pub struct InvalidTestCase {
    pub source:  &'static str,
    pub kind:    ErrorKind,
    pub lines:   (usize, usize),
    pub message: &'static str,
}

pub fn parse_valid(source: &str) -> Unit {
    parse(source.as_bytes(), SOURCE).unwrap_or_else(
        |error| panic!("valid source was rejected: {}\n{}", error, source)
    )
}

pub fn parse_invalid(source: &str) -> Error {
    match parse(source.as_bytes(), SOURCE) {
        Ok(unit) => panic!("invalid source was accepted: {:#?}\n{}", unit, source),
        Err(error) => error,
    }
}

pub fn test_invalid_cases(test_cases: &[InvalidTestCase]) {
    for case in test_cases {
        let error = parse_invalid(case.source);
        let kind = match error {
            Error::Syntax { .. }  => ErrorKind::Syntax,
            Error::Grammar { .. } => ErrorKind::Grammar,
            ref other => panic!("unexpected error kind: {}\n{}", other, case.source),
        };
        let token = error.token().unwrap_or_else(
            || panic!("error has no token: {}\n{}", error, case.source)
        );

        assert_eq!(kind, case.kind, "{}", case.source);
        assert_eq!(error.message(), case.message, "{}", case.source);
        assert_eq!(token.span, Span { start: case.lines.0, end: case.lines.1 }, "{}", case.source);
        assert_eq!(&*token.source, SOURCE);
    }
}

/// An in-memory transaction that records every statement it runs.
/// Queries return a clone of `rows`; statements containing
/// `fail_on` fail with a driver error.
#[derive(Debug, Default)]
pub struct RecordingTx {
    pub calls:         Vec<(String, Vec<Value>)>,
    pub rows:          Rows,
    pub rows_affected: i64,
    pub fail_on:       Option<&'static str>,
}

impl RecordingTx {
    pub fn returning(rows: Rows) -> Self {
        RecordingTx { rows, ..RecordingTx::default() }
    }

    pub fn statements(&self) -> Vec<&str> {
        self.calls.iter().map(|(stmt, _)| stmt.as_str()).collect()
    }

    fn record(&mut self, stmt: &str, args: &[Value]) -> runtime::Result<()> {
        self.calls.push((stmt.to_owned(), args.to_vec()));

        match self.fail_on {
            Some(pattern) if stmt.contains(pattern) => Err(runtime::Error::driver(
                format!("statement failed: {}", stmt)
            )),
            _ => Ok(()),
        }
    }
}

impl RTx for RecordingTx {
    fn query(&mut self, stmt: &str, args: &[Value]) -> runtime::Result<Rows> {
        self.record(stmt, args)?;
        Ok(self.rows.clone())
    }
}

impl WTx for RecordingTx {
    fn exec(&mut self, stmt: &str, args: &[Value]) -> runtime::Result<Exec> {
        self.record(stmt, args)?;
        Ok(Exec::new(self.rows_affected))
    }
}
