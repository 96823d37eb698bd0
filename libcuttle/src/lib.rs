//
// lib.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 02/03/2024
//

//! This library provides the programmatic interface for the Cuttle
//! compiler, which turns annotated SQL scripts into statically-typed,
//! dialect-aware repositories. The crate is composed of several modules,
//! each of which roughly corresponds to a single step in the compilation
//! pipeline:
//!
//! * `lexer` splits a script into directive and text tokens.
//! * `directive` parses the keyword and attributes of a directive.
//! * `parser` enforces the directive grammar and builds…
//! * `ir`, the `Unit` describing every repository, query, and variant.
//! * `dialect` holds the dialect registry and the selection algorithm
//!   that generated repositories run when they are constructed.
//! * `dalgen` is the back-end that generates the repository code.
//! * `runtime` is the surface generated code is compiled against:
//!   transaction traits, values, rows, and batches.
//! * `util` contains miscellaneous helper types and functions.
//! * `error` contains type definitions for uniformly describing syntax,
//!   grammar, code generation, and internal compiler errors.
//!
//! A script looks like this:
//!
//! ```text
//! --:cuttle
//! --:repository name=Users dialects=sqlite,postgres
//! --:query name=Create
//! --:arg name=id type=i64
//! --:dialect name=sqlite
//! INSERT INTO users (id) VALUES (?);
//! --:dialect name=postgres
//! INSERT INTO users (id) VALUES ($1);
//! ```

#![doc(html_root_url = "https://docs.rs/cuttle/0.1.0")]
#![deny(missing_debug_implementations,
        trivial_numeric_casts,
        unsafe_code,
        unused_import_braces, missing_docs)]

#[macro_use]
pub mod error;
pub mod util;
pub mod lexer;
pub mod directive;
pub mod ir;
pub mod parser;
pub mod dialect;
pub mod dalgen;
pub mod runtime;

use std::io::BufRead;
use crate::dalgen::CodegenParams;
use crate::error::Result;


/// Compiles one script in a single pass: tokenizing, parsing, and
/// generating code. Nothing is returned unless the whole pass succeeds.
///
/// # Arguments
///
/// * `input`: the script, read line by line.
/// * `source`: the human-readable name of the script, used in diagnostics.
/// * `params`: code generation parameters; see the docs for `CodegenParams`.
///
/// # Return value
///
/// * `Ok(String)` holding the generated code.
/// * `Err(Error)` describing the first problem found.
pub fn compile<R: BufRead>(input: R, source: &str, params: &CodegenParams) -> Result<String> {
    let unit = parser::parse(input, source)?;
    let mut buf = Vec::new();

    dalgen::generate_dal(&unit, params, &mut buf)?;

    match String::from_utf8(buf) {
        Ok(code) => Ok(code),
        Err(error) => bug!("Generated code is not valid UTF-8: {}", error),
    }
}
