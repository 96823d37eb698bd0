//
// runtime/mod.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 05/03/2024
//

//! The surface that generated repositories are compiled against.
//!
//! Database adapters implement `RTx` and `WTx` on top of a native
//! driver; generated code only ever talks to these traits. The
//! asynchronous entry points of a repository record their work on an
//! `AsyncRTx`/`AsyncWTx`, typically a `BatchR`/`BatchRW`, and learn
//! the outcome through an `AsyncHandler` invoked exactly once.

mod value;
mod batch;

use std::error;
use thiserror::Error as ThisError;

pub use self::value::{ Value, ToValue, FromValue };
pub use self::batch::{ BatchR, BatchRW };


/// An error raised by generated code or by a database adapter.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A single-row query matched no rows. This is an expected
    /// outcome, distinct from a failure of the database.
    #[error("no rows")]
    NoRows,
    /// None of a repository's dialects can serve the requested one.
    #[error("no compatible dialect for '{requested}'")]
    NoCompatibleDialect {
        /// Name of the requested dialect.
        requested: String,
    },
    /// A query has no SQL for the dialect its repository was bound to.
    #[error("query '{repository}:{query}' has no SQL for dialect '{dialect}'")]
    MissingVariant {
        /// Name of the repository.
        repository: String,
        /// Name of the query.
        query: String,
        /// Name of the resolved dialect.
        dialect: String,
    },
    /// A column index past the end of a row.
    #[error("column index {index} out of range for a row of {len} columns")]
    ColumnIndex {
        /// The requested index.
        index: usize,
        /// The number of columns in the row.
        len: usize,
    },
    /// A value could not be converted to the requested type.
    #[error("cannot decode {found} value as {expected}")]
    Decode {
        /// The requested Rust type.
        expected: &'static str,
        /// The kind of the stored value.
        found: &'static str,
    },
    /// An error reported by the underlying driver.
    #[error(transparent)]
    Driver(Box<dyn error::Error + Send + Sync>),
}

impl Error {
    /// Wraps an adapter-specific error.
    pub fn driver<E>(error: E) -> Self where E: Into<Box<dyn error::Error + Send + Sync>> {
        Error::Driver(error.into())
    }

    /// Whether this is the distinguished "no rows" outcome.
    pub fn is_no_rows(&self) -> bool {
        matches!(*self, Error::NoRows)
    }
}

/// Convenience type alias for results of runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The outcome of a write-mode statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Exec {
    rows_affected: i64,
}

impl Exec {
    /// Makes an outcome that affected `rows_affected` rows.
    pub fn new(rows_affected: i64) -> Self {
        Exec { rows_affected }
    }

    /// The number of rows inserted, updated, or deleted.
    pub fn rows_affected(&self) -> i64 {
        self.rows_affected
    }
}

/// One result row: its column values in select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Makes a row from its column values.
    pub fn new(values: Vec<Value>) -> Self {
        Row { values }
    }

    /// Decodes the value of the column at `index`.
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T> {
        let value = self.values.get(index).ok_or(Error::ColumnIndex {
            index,
            len: self.values.len(),
        })?;

        T::from_value(value)
    }

    /// The raw column values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row::new(values)
    }
}

/// Every row returned by a read-mode statement.
pub type Rows = Vec<Row>;

/// Types that can be built from a result row. Generated row
/// structs implement this by decoding each declared column.
pub trait FromRow: Sized {
    /// Decodes `row`.
    fn from_row(row: &Row) -> Result<Self>;
}

/// Decodes every row of `rows`, failing on the first bad one.
pub fn decode_rows<T: FromRow>(rows: Rows) -> Result<Vec<T>> {
    rows.iter().map(T::from_row).collect()
}

/// A read-only transaction.
pub trait RTx {
    /// Runs a read-mode statement and returns every row.
    fn query(&mut self, stmt: &str, args: &[Value]) -> Result<Rows>;

    /// Runs a read-mode statement and returns its first row,
    /// or `Error::NoRows` if there is none.
    fn query_row(&mut self, stmt: &str, args: &[Value]) -> Result<Row> {
        self.query(stmt, args)?.into_iter().next().ok_or(Error::NoRows)
    }
}

/// A read-write transaction.
pub trait WTx: RTx {
    /// Runs a write-mode statement.
    fn exec(&mut self, stmt: &str, args: &[Value]) -> Result<Exec>;
}

/// Completion callback of an asynchronous entry point. It receives
/// either a result or a failure, and its own result tells the
/// dispatcher whether to carry on (`Ok`) or abort (`Err`).
pub type AsyncHandler<T> = Box<dyn FnOnce(Result<T>) -> Result<()>>;

/// A recorder of read-mode work, dispatched later.
pub trait AsyncRTx {
    /// Records a read-mode statement returning every row.
    fn query(&mut self, handler: AsyncHandler<Rows>, stmt: &str, args: Vec<Value>);

    /// Records a read-mode statement returning its first row
    /// or `Error::NoRows`.
    fn query_row(&mut self, handler: AsyncHandler<Row>, stmt: &str, args: Vec<Value>);
}

/// A recorder of read-write work, dispatched later.
pub trait AsyncWTx: AsyncRTx {
    /// Records a write-mode statement.
    fn exec(&mut self, handler: AsyncHandler<Exec>, stmt: &str, args: Vec<Value>);
}
