//
// dalgen/mod.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 08/03/2024
//

//! DALGen, the backend of the Cuttle compiler. This is the part that
//! lowers a parsed `Unit` into the source code of its repositories:
//! one contract per repository, one implementation bound to a resolved
//! dialect, and the per-query dispatch of dialect-specific statements.

mod rust;

use std::io;
use heck::{ ToSnakeCase, ToShoutySnakeCase, ToLowerCamelCase, ToUpperCamelCase };
use crate::error::Result;
use crate::ir::Unit;


/// The rewriting strategy applied to various kinds of named program elements,
/// such as function, variable, and type names.
/// In the `CodegenParams` struct, optional instances of this transform are
/// specified, where `None` means "the Rust convention for this kind of name".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NameTransform {
    /// Don't touch it!
    Identity,
    /// `lower_snake_case`.
    LowerSnakeCase,
    /// `UPPER_SNAKE_CASE`.
    UpperSnakeCase,
    /// `lowerCamelCase`.
    LowerCamelCase,
    /// `UpperCamelCase`, also known as `PascalCase`.
    UpperCamelCase,
}

/// A bunch of centralized settings governing the behavior of DALGen.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodegenParams {
    /// Path under which generated code reaches the `cuttle` runtime,
    /// e.g. `cuttle` or `crate::db::cuttle` for a re-export.
    pub runtime_crate: String,
    /// The transform applied to repository and row type names.
    pub type_name_transform: Option<NameTransform>,
    /// The transform applied to query method names.
    pub func_name_transform: Option<NameTransform>,
    /// The transform applied to argument names and row fields.
    pub field_name_transform: Option<NameTransform>,
    /// The transform applied to names of generated statics.
    pub const_name_transform: Option<NameTransform>,
}

/// The runtime path is `cuttle` and every name follows Rust conventions.
impl Default for CodegenParams {
    fn default() -> Self {
        CodegenParams {
            runtime_crate:        String::from("cuttle"),
            type_name_transform:  None,
            func_name_transform:  None,
            field_name_transform: None,
            const_name_transform: None,
        }
    }
}

/// Given the IR of a script, and some configuration parameters,
/// generates the repositories and writes their code into `wr`.
///
/// # Arguments:
///
/// * `unit`: the IR produced by the parser.
/// * `params`: code generation parameters; see the docs for `CodegenParams`.
/// * `wr`: the `io::Write` that will accumulate generated code.
///
/// # Return value:
///
/// * `Ok(())`, if code generation completed successfully.
/// * `Err(Error)`, if an error occurred. This is either an I/O error
///   (`Error::IO`) or an `Error::Codegen` caused by a name that cannot
///   be expressed in the generated code.
pub fn generate_dal(unit: &Unit, params: &CodegenParams, wr: &mut dyn io::Write) -> Result<()> {
    rust::generate_dal(unit, params, wr)
}

//
// Name Transforms
//

fn transform_type_name(name: &str, params: &CodegenParams) -> String {
    transform_name(name, params.type_name_transform, NameTransform::UpperCamelCase)
}

fn transform_func_name(name: &str, params: &CodegenParams) -> String {
    transform_name(name, params.func_name_transform, NameTransform::LowerSnakeCase)
}

fn transform_field_name(name: &str, params: &CodegenParams) -> String {
    transform_name(name, params.field_name_transform, NameTransform::LowerSnakeCase)
}

fn transform_const_name(name: &str, params: &CodegenParams) -> String {
    transform_name(name, params.const_name_transform, NameTransform::UpperSnakeCase)
}

fn transform_name(name: &str, transform: Option<NameTransform>, default: NameTransform) -> String {
    use self::NameTransform::*;

    match transform.unwrap_or(default) {
        Identity       => name.to_owned(),
        LowerSnakeCase => name.to_snake_case(),
        UpperSnakeCase => name.to_shouty_snake_case(),
        LowerCamelCase => name.to_lower_camel_case(),
        UpperCamelCase => name.to_upper_camel_case(),
    }
}
