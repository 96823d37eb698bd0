//
// dalgen/rust/mod.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 08/03/2024
//

use std::io;
use std::collections::HashSet;
use regex::Regex;
use lazy_static::lazy_static;
use tracing::debug;
use crate::error::{ Error, Result };
use crate::dialect::lookup;
use crate::ir::{ Unit, Repository, Query, QueryMode };
use crate::util::{ PACKAGE_INFO, grapheme_count, raw_string_literal };
use crate::dalgen::*;


lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref RUNTIME_PATH: Regex = Regex::new(
        r"^(::)?[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*$"
    ).unwrap();
}

static KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const",
    "continue", "crate", "do", "dyn", "else", "enum", "extern", "false",
    "final", "fn", "for", "if", "impl", "in", "let", "loop", "macro",
    "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "try", "type", "typeof", "unsafe", "unsized", "use", "virtual", "where",
    "while", "yield",
];

// Keywords that cannot be used even as raw identifiers.
static UNESCAPABLE: &[&str] = &["crate", "self", "Self", "super"];

// Parameter names of generated methods besides the declared arguments.
static RESERVED_PARAMS: &[&str] = &["tx", "callback"];

// Inherent methods of every generated implementation.
static RESERVED_METHODS: &[&str] = &["new", "dialect"];

//
// Public generator
//

pub fn generate_dal(unit: &Unit, params: &CodegenParams, wr: &mut dyn io::Write) -> Result<()> {
    if !RUNTIME_PATH.is_match(&params.runtime_crate) {
        return Err(Error::codegen(format!(
            "Invalid runtime crate path '{}'", params.runtime_crate
        )));
    }

    // Every name is resolved before anything is written.
    let plans = plan_unit(unit, params)?;

    write_comment_header(wr, unit)?;

    for plan in &plans {
        debug!(name = %plan.repo.name, queries = plan.queries.len(), "generating repository");

        RepoGen { plan, rt: &params.runtime_crate }.generate(wr)?;
    }

    Ok(())
}

fn write_comment_header(wr: &mut dyn io::Write, unit: &Unit) -> io::Result<()> {
    writeln!(wr, "// Code generated by {}. DO NOT EDIT.", PACKAGE_INFO.name)?;

    if let Some(name) = unit.header.get("name") {
        writeln!(wr, "// Unit: {}", name)?;
    }

    writeln!(wr)
}

//
// Name resolution
//

struct RepoPlan<'a> {
    repo:          &'a Repository,
    trait_name:    String,
    impl_name:     String,
    dialects_name: String,
    queries:       Vec<QueryPlan<'a>>,
}

struct QueryPlan<'a> {
    query:      &'a Query,
    func:       String,
    async_func: String,
    stmt_func:  String,
    row_type:   Option<String>,
    args:       Vec<String>,
    fields:     Vec<String>,
}

fn plan_unit<'a>(unit: &'a Unit, params: &CodegenParams) -> Result<Vec<RepoPlan<'a>>> {
    let mut types = HashSet::new();
    let mut statics = HashSet::new();
    let mut plans = Vec::with_capacity(unit.repositories.len());

    for repo in unit.repositories.values() {
        let what = format!("repository '{}'", repo.name);
        comment_safe(&repo.name, &what)?;

        let trait_name = identifier(transform_type_name(&repo.name, params), &what)?;
        let impl_name = identifier(transform_type_name(&(repo.name.clone() + "_Impl"), params), &what)?;
        let dialects_name = identifier(transform_const_name(&(repo.name.clone() + "_Dialects"), params), &what)?;

        unique(&mut types, &trait_name)?;
        unique(&mut types, &impl_name)?;
        unique(&mut statics, &dialects_name)?;

        let mut methods: HashSet<String> = RESERVED_METHODS.iter().map(|&m| m.to_owned()).collect();
        let queries = repo.queries.iter()
            .map(|query| plan_query(repo, query, params, &mut types, &mut methods))
            .collect::<Result<_>>()?;

        plans.push(RepoPlan { repo, trait_name, impl_name, dialects_name, queries });
    }

    Ok(plans)
}

fn plan_query<'a>(
    repo:    &Repository,
    query:   &'a Query,
    params:  &CodegenParams,
    types:   &mut HashSet<String>,
    methods: &mut HashSet<String>,
) -> Result<QueryPlan<'a>> {
    let what = format!("query '{}' of repository '{}'", query.name, repo.name);
    comment_safe(&query.name, &what)?;

    let func = identifier(transform_func_name(&query.name, params), &what)?;
    let async_func = identifier(transform_func_name(&(query.name.clone() + "_Async"), params), &what)?;
    let stmt_func = identifier(transform_func_name(&(query.name.clone() + "_Stmt"), params), &what)?;

    for method in &[&func, &async_func, &stmt_func] {
        unique(methods, method)?;
    }

    let row_type = if query.cols.is_empty() {
        None
    } else {
        let raw = format!("{}_{}_Row", repo.name, query.name);
        let name = identifier(transform_type_name(&raw, params), &what)?;
        unique(types, &name)?;
        Some(name)
    };

    let mut taken: HashSet<String> = RESERVED_PARAMS.iter().map(|&p| p.to_owned()).collect();
    let mut args = Vec::with_capacity(query.args.len());

    for arg in &query.args {
        let arg_what = format!("argument '{}' of {}", arg.name, what);
        let name = identifier(transform_field_name(&arg.name, params), &arg_what)?;
        type_expr(&arg.ty, &arg_what)?;

        if !taken.insert(name.clone()) {
            return Err(Error::codegen(format!(
                "Argument '{}' of {} clashes with another parameter named '{}'", arg.name, what, name
            )));
        }

        args.push(name);
    }

    let mut taken = HashSet::new();
    let mut fields = Vec::with_capacity(query.cols.len());

    for col in &query.cols {
        let col_what = format!("column '{}' of {}", col.name, what);
        let name = identifier(transform_field_name(&col.name, params), &col_what)?;
        type_expr(&col.ty, &col_what)?;

        if !taken.insert(name.clone()) {
            return Err(Error::codegen(format!(
                "Column '{}' of {} clashes with another field named '{}'", col.name, what, name
            )));
        }

        fields.push(name);
    }

    Ok(QueryPlan { query, func, async_func, stmt_func, row_type, args, fields })
}

// Validates a transformed name, escaping it if it is a keyword.
fn identifier(name: String, what: &str) -> Result<String> {
    if name == "_" || !IDENTIFIER.is_match(&name) || UNESCAPABLE.contains(&name.as_str()) {
        return Err(Error::codegen(format!(
            "Cannot use '{}' as a generated name for {}", name, what
        )));
    }

    if KEYWORDS.contains(&name.as_str()) {
        Ok(format!("r#{}", name))
    } else {
        Ok(name)
    }
}

// Repository and query names are copied into a SQL block comment.
fn comment_safe(name: &str, what: &str) -> Result<()> {
    if name.contains("*/") || name.contains("/*") {
        Err(Error::codegen(format!(
            "Name of {} must not contain a comment delimiter", what
        )))
    } else {
        Ok(())
    }
}

// A declared type is pasted verbatim into signatures and struct fields,
// so it must not be able to end either of them.
fn type_expr(ty: &str, what: &str) -> Result<()> {
    let invalid = |reason: &str| Err(Error::codegen(format!(
        "Invalid type '{}' for {}: {}", ty, what, reason
    )));

    if ty.trim().is_empty() {
        return invalid("type is empty");
    }

    if ty.contains("//") || ty.contains("/*") {
        return invalid("comments are not allowed");
    }

    let mut open = Vec::new();

    for (i, c) in ty.char_indices() {
        let expected = match c {
            '{' | '}' | ';' => return invalid("braces and ';' are not allowed"),
            '(' | '[' | '<' => {
                open.push(c);
                continue
            },
            ')' => '(',
            ']' => '[',
            '>' if ty[..i].ends_with('-') => continue,
            '>' => '<',
            _   => continue,
        };

        if open.pop() != Some(expected) {
            return invalid("unbalanced brackets");
        }
    }

    if open.is_empty() {
        Ok(())
    } else {
        invalid("unbalanced brackets")
    }
}

fn unique(taken: &mut HashSet<String>, name: &str) -> Result<()> {
    if taken.insert(name.to_owned()) {
        Ok(())
    } else {
        Err(Error::codegen(format!("Generated name '{}' is used more than once", name)))
    }
}

//
// Code emission, one repository at a time
//

struct RepoGen<'a> {
    plan: &'a RepoPlan<'a>,
    rt:   &'a str,
}

impl<'a> RepoGen<'a> {
    fn generate(&self, wr: &mut dyn io::Write) -> Result<()> {
        self.write_trait(wr)?;
        self.write_rows(wr)?;
        self.write_dialects(wr)?;
        self.write_impl(wr)?;
        self.write_trait_impl(wr)
    }

    fn write_trait(&self, wr: &mut dyn io::Write) -> Result<()> {
        writeln!(wr, "pub trait {} {{", self.plan.trait_name)?;

        for (i, q) in self.plan.queries.iter().enumerate() {
            if i > 0 {
                writeln!(wr)?;
            }

            write_docs(wr, q.query)?;
            writeln!(wr, "    {};", self.signature(q)?)?;
            writeln!(wr)?;
            write_docs(wr, q.query)?;
            writeln!(wr, "    {};", self.async_signature(q)?)?;
        }

        writeln!(wr, "}}\n").map_err(From::from)
    }

    fn write_rows(&self, wr: &mut dyn io::Write) -> Result<()> {
        let rt = self.rt;

        for q in &self.plan.queries {
            let row_type = match q.row_type {
                Some(ref name) => name,
                None => continue,
            };

            let max_len = q.fields.iter().map(|f| grapheme_count(f)).max().unwrap_or(0);

            writeln!(wr, "#[derive(Debug, Clone, PartialEq)]")?;
            writeln!(wr, "pub struct {} {{", row_type)?;

            for (field, col) in q.fields.iter().zip(&q.query.cols) {
                let pad = " ".repeat(max_len - grapheme_count(field));
                writeln!(wr, "    pub {}:{} {},", field, pad, col.ty)?;
            }

            writeln!(wr, "}}\n")?;
            writeln!(wr, "impl {}::runtime::FromRow for {} {{", rt, row_type)?;
            writeln!(wr, "    fn from_row(row: &{}::runtime::Row) -> {}::runtime::Result<Self> {{", rt, rt)?;
            writeln!(wr, "        Ok({} {{", row_type)?;

            for (index, field) in q.fields.iter().enumerate() {
                writeln!(wr, "            {}: row.get({})?,", field, index)?;
            }

            writeln!(wr, "        }})")?;
            writeln!(wr, "    }}")?;
            writeln!(wr, "}}\n")?;
        }

        Ok(())
    }

    fn write_dialects(&self, wr: &mut dyn io::Write) -> Result<()> {
        let rt = self.rt;
        let dialects = &self.plan.repo.dialects;

        writeln!(
            wr,
            "static {}: [{}::dialect::Dialect; {}] = [",
            self.plan.dialects_name,
            rt,
            dialects.len(),
        )?;

        for name in dialects {
            match lookup(name) {
                Some(predefined) => writeln!(wr, "    {}::dialect::{},", rt, predefined.name.to_uppercase())?,
                None => writeln!(wr, "    {}::dialect::Dialect::custom({:?}),", rt, name)?,
            }
        }

        writeln!(wr, "];\n").map_err(From::from)
    }

    fn write_impl(&self, wr: &mut dyn io::Write) -> Result<()> {
        let rt = self.rt;
        let impl_name = &self.plan.impl_name;
        let dialects_name = &self.plan.dialects_name;

        writeln!(wr, "#[derive(Debug, Clone, Copy)]")?;
        writeln!(wr, "pub struct {} {{", impl_name)?;
        writeln!(wr, "    dialect:       &'static {}::dialect::Dialect,", rt)?;
        writeln!(wr, "    dialect_index: usize,")?;
        writeln!(wr, "}}\n")?;

        writeln!(wr, "impl {} {{", impl_name)?;
        writeln!(wr, "    /// Binds the repository to the declared dialect that best serves `dialect`.")?;
        writeln!(wr, "    pub fn new(dialect: &{}::dialect::Dialect) -> {}::runtime::Result<Self> {{", rt, rt)?;
        writeln!(wr, "        let dialect_index = dialect.select(&{})?;", dialects_name)?;

        for q in &self.plan.queries {
            self.write_coverage_check(wr, q)?;
        }

        writeln!(wr)?;
        writeln!(wr, "        Ok({} {{", impl_name)?;
        writeln!(wr, "            dialect: &{}[dialect_index],", dialects_name)?;
        writeln!(wr, "            dialect_index,")?;
        writeln!(wr, "        }})")?;
        writeln!(wr, "    }}\n")?;

        writeln!(wr, "    /// The declared dialect this instance is bound to.")?;
        writeln!(wr, "    pub fn dialect(&self) -> &'static {}::dialect::Dialect {{", rt)?;
        writeln!(wr, "        self.dialect")?;
        writeln!(wr, "    }}")?;

        for q in &self.plan.queries {
            writeln!(wr)?;
            self.write_stmt_func(wr, q)?;
        }

        writeln!(wr, "}}\n").map_err(From::from)
    }

    // Fails construction when the query has no variant for the resolved dialect.
    fn write_coverage_check(&self, wr: &mut dyn io::Write, q: &QueryPlan) -> Result<()> {
        let covered = self.variant_indices(q.query);

        if covered.len() == self.plan.repo.dialects.len() {
            return Ok(());
        }

        let arms: Vec<_> = covered.iter().map(|&(index, _)| index.to_string()).collect();

        writeln!(wr)?;
        writeln!(wr, "        match dialect_index {{")?;
        writeln!(wr, "            {} => {{}},", arms.join(" | "))?;
        writeln!(wr, "            _ => return Err({}::runtime::Error::MissingVariant {{", self.rt)?;
        writeln!(wr, "                repository: {:?}.to_owned(),", self.plan.repo.name)?;
        writeln!(wr, "                query: {:?}.to_owned(),", q.query.name)?;
        writeln!(wr, "                dialect: {}[dialect_index].name.to_owned(),", self.plan.dialects_name)?;
        writeln!(wr, "            }}),")?;
        writeln!(wr, "        }}").map_err(From::from)
    }

    fn write_stmt_func(&self, wr: &mut dyn io::Write, q: &QueryPlan) -> Result<()> {
        writeln!(wr, "    fn {}(&self) -> &'static str {{", q.stmt_func)?;
        writeln!(wr, "        match self.dialect_index {{")?;

        for (index, stmt) in self.variant_indices(q.query) {
            let marked = format!("/* {}:{} */ {}", self.plan.repo.name, q.query.name, stmt);
            writeln!(wr, "            {} => {},", index, raw_string_literal(&marked))?;
        }

        writeln!(wr, "            _ => unreachable!(\"dialect index is checked by {}::new\"),", self.plan.impl_name)?;
        writeln!(wr, "        }}")?;
        writeln!(wr, "    }}").map_err(From::from)
    }

    fn write_trait_impl(&self, wr: &mut dyn io::Write) -> Result<()> {
        writeln!(wr, "impl {} for {} {{", self.plan.trait_name, self.plan.impl_name)?;

        for (i, q) in self.plan.queries.iter().enumerate() {
            if i > 0 {
                writeln!(wr)?;
            }

            debug!(repository = %self.plan.repo.name, name = %q.query.name, "generating query");

            writeln!(wr, "    {} {{", self.signature(q)?)?;
            self.write_sync_body(wr, q)?;
            writeln!(wr, "    }}\n")?;
            writeln!(wr, "    {} {{", self.async_signature(q)?)?;
            self.write_async_body(wr, q)?;
            writeln!(wr, "    }}")?;
        }

        writeln!(wr, "}}\n").map_err(From::from)
    }

    fn write_sync_body(&self, wr: &mut dyn io::Write, q: &QueryPlan) -> Result<()> {
        let rt = self.rt;
        let args = self.arg_values(q, "&[", "]", 8);

        match q.query.mode() {
            QueryMode::Exec => writeln!(
                wr,
                "        tx.exec(self.{}(), {}).map(|exec| exec.rows_affected())",
                q.stmt_func,
                args,
            )?,
            QueryMode::Rows => writeln!(
                wr,
                "        {}::runtime::decode_rows(tx.query(self.{}(), {})?)",
                rt,
                q.stmt_func,
                args,
            )?,
            QueryMode::Row => writeln!(
                wr,
                "        tx.query_row(self.{}(), {}).and_then(|row| <{} as {}::runtime::FromRow>::from_row(&row))",
                q.stmt_func,
                args,
                self.row_type(q)?,
                rt,
            )?,
        }

        Ok(())
    }

    fn write_async_body(&self, wr: &mut dyn io::Write, q: &QueryPlan) -> Result<()> {
        let rt = self.rt;

        let (method, outcome, forward) = match q.query.mode() {
            QueryMode::Exec => (
                "exec",
                "Exec",
                String::from("result.map(|exec| exec.rows_affected())"),
            ),
            QueryMode::Rows => (
                "query",
                "Rows",
                format!("result.and_then({}::runtime::decode_rows)", rt),
            ),
            QueryMode::Row => (
                "query_row",
                "Row",
                format!(
                    "result.and_then(|row| <{} as {}::runtime::FromRow>::from_row(&row))",
                    self.row_type(q)?,
                    rt,
                ),
            ),
        };

        writeln!(wr, "        tx.{}(", method)?;
        writeln!(wr, "            Box::new(move |result: {}::runtime::Result<{}::runtime::{}>| {{", rt, rt, outcome)?;
        writeln!(wr, "                callback({})", forward)?;
        writeln!(wr, "            }}),")?;
        writeln!(wr, "            self.{}(),", q.stmt_func)?;
        writeln!(wr, "            {},", self.arg_values(q, "vec![", "]", 12))?;
        writeln!(wr, "        );").map_err(From::from)
    }

    //
    // Helpers
    //

    fn signature(&self, q: &QueryPlan) -> Result<String> {
        Ok(format!(
            "fn {}(&self, tx: &mut dyn {}::runtime::{}{}) -> {}::runtime::Result<{}>",
            q.func,
            self.rt,
            tx_trait(q.query),
            self.arg_params(q),
            self.rt,
            self.result_type(q)?,
        ))
    }

    fn async_signature(&self, q: &QueryPlan) -> Result<String> {
        Ok(format!(
            "fn {}(&self, tx: &mut dyn {}::runtime::Async{}{}, callback: {}::runtime::AsyncHandler<{}>)",
            q.async_func,
            self.rt,
            tx_trait(q.query),
            self.arg_params(q),
            self.rt,
            self.result_type(q)?,
        ))
    }

    fn arg_params(&self, q: &QueryPlan) -> String {
        q.args.iter()
            .zip(&q.query.args)
            .map(|(name, arg)| format!(", {}: {}", name, arg.ty))
            .collect()
    }

    // One converted value per line, or `open` immediately followed
    // by `close` if the query takes no arguments.
    fn arg_values(&self, q: &QueryPlan, open: &str, close: &str, indent: usize) -> String {
        if q.args.is_empty() {
            return format!("{}{}", open, close);
        }

        let outer = " ".repeat(indent);
        let mut values = format!("{}\n", open);

        for name in &q.args {
            values += &format!("{}    {}::runtime::ToValue::to_value(&{}),\n", outer, self.rt, name);
        }

        values + &outer + close
    }

    fn result_type(&self, q: &QueryPlan) -> Result<String> {
        match q.query.mode() {
            QueryMode::Exec => Ok(String::from("i64")),
            QueryMode::Rows => Ok(format!("Vec<{}>", self.row_type(q)?)),
            QueryMode::Row  => self.row_type(q).map(str::to_owned),
        }
    }

    fn row_type<'b>(&self, q: &'b QueryPlan) -> Result<&'b str> {
        q.row_type.as_ref().map(String::as_str).ok_or_else(
            lazy_bug!("Query '{}' returns rows but has no row type", q.query.name)
        )
    }

    // (index into the declared dialects, statement) for every variant,
    // in declared dialect order.
    fn variant_indices<'b>(&self, query: &'b Query) -> Vec<(usize, &'b str)> {
        self.plan.repo.dialects.iter()
            .enumerate()
            .filter_map(|(index, dialect)| query.variant(dialect).map(|v| (index, v.stmt.as_str())))
            .collect()
    }
}

fn tx_trait(query: &Query) -> &'static str {
    match query.mode() {
        QueryMode::Exec                   => "WTx",
        QueryMode::Rows | QueryMode::Row  => "RTx",
    }
}

fn write_docs(wr: &mut dyn io::Write, query: &Query) -> io::Result<()> {
    let lines = query.doc.as_ref().map_or(&[][..], |doc| &doc.lines[..]);

    for line in lines {
        if line.is_empty() {
            writeln!(wr, "    ///")?;
        } else {
            writeln!(wr, "    /// {}", line)?;
        }
    }

    Ok(())
}
