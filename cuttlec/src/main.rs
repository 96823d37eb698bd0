//
// main.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 10/03/2024
//

//! `cuttlec` is the command-line driver for the Cuttle compiler.
//!
//! ## Basic usage:
//!
//! `cuttlec queries/users.sql src/db/users.rs`
//!
//! The absolute minimum of arguments to be provided are:
//!
//! * The annotated SQL script to compile.
//! * The path of the generated Rust source file. It is only written
//!   once the whole script compiled successfully.
//!
//! There are more command-line parameters, for greater flexibility:
//!
//! * `-r`, `--runtime`: the path under which generated code reaches the
//!   `cuttle` runtime. Defaults to `cuttle`. Useful when the runtime is
//!   re-exported from another crate.
//! * Names of repositories, queries, arguments, and columns are rewritten
//!   to follow Rust conventions by default. Every kind of name can be
//!   overridden:
//!   * `-t`, `--typexform`: applied to repository and row type names.
//!   * `-f`, `--funcxform`: applied to query method names.
//!   * `-e`, `--fieldxform`: applied to argument and row field names.
//!   * `-c`, `--constxform`: applied to names of generated statics.
//!
//!   Each of these parameters may take one of the following values:
//!
//!   * `default`: the Rust convention for that kind of name.
//!   * `identity`: the name will be copied verbatim into the generated code.
//!   * `lowsnake`: the name will be transformed to `lower_snake_case`.
//!   * `upsnake`: the name will be transformed to `UPPER_SNAKE_CASE`.
//!   * `lowcamel`: the name will be transformed to `lowerCamelCase`.
//!   * `upcamel`: the name will be transformed to `UpperCamelCase`.
//! * `-v`, `--verbose`: log more. Repeat for even more detail. The
//!   `RUST_LOG` environment variable takes precedence.
//!
//! ## Exit Status
//!
//! The command-line compiler exits with status `0` if the compilation
//! succeeds. If the compilation fails, it exits with status `1`, and
//! the output file is left untouched.

#![doc(html_root_url = "https://docs.rs/crate/cuttlec/0.1.0")]
#![deny(missing_debug_implementations, missing_copy_implementations,
        trivial_casts, trivial_numeric_casts,
        unsafe_code,
        unused_import_braces, missing_docs)]

#[macro_use]
extern crate clap;

use std::fs::{ self, File };
use std::io::{ stderr, BufReader };
use std::io::prelude::*;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;
use cuttle::util::{ Diagnostic, DiagnosticKind, PACKAGE_INFO };
use cuttle::parser::parse;
use cuttle::dalgen::*;
use cuttle::error::Result;


// Reporting elapsed time for each stage of the compiler pipeline
macro_rules! stopwatch {
    ($msg: expr, $code: expr) => ({
        eprint!("    {:.<40}", $msg);
        stderr().flush().expect("Could not flush stderr");
        let t0 = Instant::now();
        let val = $code;
        let dt = t0.elapsed();
        let message = format!("{:6.1} ms", dt.as_secs_f64() * 1e3);
        eprintln!("{}", Diagnostic::new(message, DiagnosticKind::Info));
        val
    })
}

//
// Parsing Command-Line Arguments
//

type ArgResult<T> = std::result::Result<T, String>;

#[derive(Debug)]
struct CmdArgs {
    codegen_params: CodegenParams,
    input:          String,
    output:         String,
    verbosity:      u64,
}

impl CmdArgs {
    fn new() -> ArgResult<Self> {
        let args = clap_app!(cuttlec =>
            (name:    "cuttlec")
            (version: PACKAGE_INFO.version)
            (author:  PACKAGE_INFO.authors)
            (about:   PACKAGE_INFO.description)
            (@arg runtime:     -r --runtime    +takes_value           "Path of the cuttle runtime in generated code")
            (@arg type_xform:  -t --typexform  +takes_value           "Type name transform")
            (@arg func_xform:  -f --funcxform  +takes_value           "Method name transform")
            (@arg field_xform: -e --fieldxform +takes_value           "Argument and field name transform")
            (@arg const_xform: -c --constxform +takes_value           "Static name transform")
            (@arg verbose:     -v --verbose    +multiple              "Log more; repeat for more detail")
            (@arg INPUT:                                    +required "Annotated SQL script")
            (@arg OUTPUT:                                   +required "Generated Rust source file")
        ).get_matches();

        let codegen_params = CodegenParams {
            runtime_crate:        args.value_of("runtime").unwrap_or("cuttle").to_owned(),
            type_name_transform:  Self::name_transform(args.value_of("type_xform"))?,
            func_name_transform:  Self::name_transform(args.value_of("func_xform"))?,
            field_name_transform: Self::name_transform(args.value_of("field_xform"))?,
            const_name_transform: Self::name_transform(args.value_of("const_xform"))?,
        };

        let args = CmdArgs {
            codegen_params,
            input:     Self::required(args.value_of("INPUT"), "INPUT")?,
            output:    Self::required(args.value_of("OUTPUT"), "OUTPUT")?,
            verbosity: args.occurrences_of("verbose"),
        };

        Ok(args)
    }

    fn required(value: Option<&str>, name: &str) -> ArgResult<String> {
        value.map(str::to_owned).ok_or_else(|| format!("Missing argument {}", name))
    }

    fn name_transform(transform: Option<&str>) -> ArgResult<Option<NameTransform>> {
        Ok(match transform {
            None             => None,
            Some("default")  => None,
            Some("identity") => Some(NameTransform::Identity),
            Some("lowsnake") => Some(NameTransform::LowerSnakeCase),
            Some("upsnake")  => Some(NameTransform::UpperSnakeCase),
            Some("lowcamel") => Some(NameTransform::LowerCamelCase),
            Some("upcamel")  => Some(NameTransform::UpperCamelCase),
            Some(value)      => Self::arg_error("name transform", value)?,
        })
    }

    fn arg_error<T>(name: &str, value: &str) -> ArgResult<T> {
        Err(format!("Invalid {}: '{}'", name, Diagnostic::new(value, DiagnosticKind::Error)))
    }
}

//
// Logging
//

fn init_logging(verbosity: u64) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(stderr)
        .init();
}

//
// Entry point
//

fn cuttlec_main(args: &CmdArgs) -> Result<()> {
    let file = stopwatch!("Reading Source", {
        File::open(&args.input)?
    });

    let unit = stopwatch!("Parsing", {
        parse(BufReader::new(file), &args.input)?
    });

    info!(repositories = unit.repositories.len(), "parsed {}", args.input);

    let code = stopwatch!("Generating Repositories", {
        let mut buf = Vec::new();
        generate_dal(&unit, &args.codegen_params, &mut buf)?;
        buf
    });

    // Only touch the output once everything succeeded.
    stopwatch!("Writing Output", {
        fs::write(&args.output, code)?
    });

    info!("wrote {}", args.output);

    Ok(())
}

fn main() {
    eprintln!();
    eprintln!("    The Cuttle Compiler, version {}", PACKAGE_INFO.version);
    eprintln!();

    let args = CmdArgs::new().unwrap_or_else(|error| {
        eprint!("    {}\n\n", error);
        std::process::exit(1);
    });

    init_logging(args.verbosity);

    // Handle errors by printing them, then bailing out
    cuttlec_main(&args).unwrap_or_else(|error| {
        error.pretty_print(&mut stderr()).unwrap_or_else(
            |e| eprintln!("    Could not print error: {}", e)
        );
        std::process::exit(1);
    });

    eprintln!();
    eprintln!("    {}", Diagnostic::new("Compilation Successful", DiagnosticKind::Success));
    eprintln!();
}
