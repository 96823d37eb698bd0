//
// runtime/batch.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 06/03/2024
//

//! Batches record asynchronous work and dispatch it in order
//! within one transaction. Each entry's handler is invoked exactly
//! once with that entry's own outcome; the first handler returning
//! an error stops the batch, and the error is handed back so that
//! the adapter can roll the transaction back.

use std::fmt::{ self, Debug, Formatter };
use tracing::trace;
use super::{ AsyncHandler, AsyncRTx, AsyncWTx, Exec, RTx, Result, Row, Rows, Value, WTx };


enum ReadEntry {
    Query {
        stmt:    String,
        args:    Vec<Value>,
        handler: AsyncHandler<Rows>,
    },
    QueryRow {
        stmt:    String,
        args:    Vec<Value>,
        handler: AsyncHandler<Row>,
    },
}

impl ReadEntry {
    fn stmt(&self) -> &str {
        match *self {
            ReadEntry::Query    { ref stmt, .. } => stmt,
            ReadEntry::QueryRow { ref stmt, .. } => stmt,
        }
    }

    fn dispatch<T: RTx + ?Sized>(self, tx: &mut T) -> Result<()> {
        match self {
            ReadEntry::Query { stmt, args, handler } => {
                trace!(stmt = %stmt, "dispatching batched query");
                handler(tx.query(&stmt, &args))
            },
            ReadEntry::QueryRow { stmt, args, handler } => {
                trace!(stmt = %stmt, "dispatching batched single-row query");
                handler(tx.query_row(&stmt, &args))
            },
        }
    }
}

enum WriteEntry {
    Read(ReadEntry),
    Exec {
        stmt:    String,
        args:    Vec<Value>,
        handler: AsyncHandler<Exec>,
    },
}

impl WriteEntry {
    fn stmt(&self) -> &str {
        match *self {
            WriteEntry::Read(ref entry)    => entry.stmt(),
            WriteEntry::Exec { ref stmt, .. } => stmt,
        }
    }
}

/// An ordered batch of read-mode statements.
#[derive(Default)]
pub struct BatchR {
    entries: Vec<ReadEntry>,
}

impl BatchR {
    /// Makes an empty batch.
    pub fn new() -> Self {
        BatchR::default()
    }

    /// The number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs every entry in recording order against `tx`, invoking
    /// each handler once with its entry's outcome. Stops at, and
    /// returns, the first error a handler returns.
    pub fn dispatch(self, tx: &mut dyn RTx) -> Result<()> {
        for entry in self.entries {
            entry.dispatch(tx)?;
        }

        Ok(())
    }
}

impl AsyncRTx for BatchR {
    fn query(&mut self, handler: AsyncHandler<Rows>, stmt: &str, args: Vec<Value>) {
        self.entries.push(ReadEntry::Query { stmt: stmt.to_owned(), args, handler });
    }

    fn query_row(&mut self, handler: AsyncHandler<Row>, stmt: &str, args: Vec<Value>) {
        self.entries.push(ReadEntry::QueryRow { stmt: stmt.to_owned(), args, handler });
    }
}

impl Debug for BatchR {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("BatchR")
            .field("stmts", &self.entries.iter().map(ReadEntry::stmt).collect::<Vec<_>>())
            .finish()
    }
}

/// An ordered batch of read-mode and write-mode statements.
#[derive(Default)]
pub struct BatchRW {
    entries: Vec<WriteEntry>,
}

impl BatchRW {
    /// Makes an empty batch.
    pub fn new() -> Self {
        BatchRW::default()
    }

    /// The number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs every entry in recording order against `tx`, invoking
    /// each handler once with its entry's outcome. Stops at, and
    /// returns, the first error a handler returns.
    pub fn dispatch(self, tx: &mut dyn WTx) -> Result<()> {
        for entry in self.entries {
            match entry {
                WriteEntry::Read(read) => read.dispatch(tx)?,
                WriteEntry::Exec { stmt, args, handler } => {
                    trace!(stmt = %stmt, "dispatching batched exec");
                    handler(tx.exec(&stmt, &args))?
                },
            }
        }

        Ok(())
    }
}

impl AsyncRTx for BatchRW {
    fn query(&mut self, handler: AsyncHandler<Rows>, stmt: &str, args: Vec<Value>) {
        let stmt = stmt.to_owned();
        self.entries.push(WriteEntry::Read(ReadEntry::Query { stmt, args, handler }));
    }

    fn query_row(&mut self, handler: AsyncHandler<Row>, stmt: &str, args: Vec<Value>) {
        let stmt = stmt.to_owned();
        self.entries.push(WriteEntry::Read(ReadEntry::QueryRow { stmt, args, handler }));
    }
}

impl AsyncWTx for BatchRW {
    fn exec(&mut self, handler: AsyncHandler<Exec>, stmt: &str, args: Vec<Value>) {
        self.entries.push(WriteEntry::Exec { stmt: stmt.to_owned(), args, handler });
    }
}

impl Debug for BatchRW {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("BatchRW")
            .field("stmts", &self.entries.iter().map(WriteEntry::stmt).collect::<Vec<_>>())
            .finish()
    }
}
