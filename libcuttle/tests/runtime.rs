//
// tests/runtime.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 13/03/2024
//

#![cfg(test)]
#![deny(missing_debug_implementations, missing_copy_implementations,
        trivial_numeric_casts,
        unsafe_code,
        unused_import_braces)]

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use cuttle::runtime::*;
use common::RecordingTx;


type Log = Rc<RefCell<Vec<String>>>;

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

// A handler that records the outcome under `label`, then
// hands any error back to the dispatcher.
fn recording<T: 'static>(log: &Log, label: &'static str, describe: fn(&T) -> String) -> AsyncHandler<T> {
    let log = Rc::clone(log);

    Box::new(move |result: Result<T>| -> Result<()> {
        match result {
            Ok(ref value) => log.borrow_mut().push(format!("{}: {}", label, describe(value))),
            Err(ref error) => log.borrow_mut().push(format!("{}: error: {}", label, error)),
        }

        result.map(|_| ())
    })
}

fn affected(exec: &Exec) -> String {
    exec.rows_affected().to_string()
}

fn count(rows: &Rows) -> String {
    format!("{} rows", rows.len())
}

fn first(row: &Row) -> String {
    format!("{:?}", row.values())
}

fn row(values: Vec<Value>) -> Row {
    Row::new(values)
}

//
// Batches
//

#[test]
fn empty_batches_dispatch_nothing() {
    let mut tx = RecordingTx::default();

    assert!(BatchR::new().is_empty());
    assert!(BatchRW::new().is_empty());
    BatchR::new().dispatch(&mut tx).unwrap();
    BatchRW::new().dispatch(&mut tx).unwrap();
    assert!(tx.calls.is_empty());
}

#[test]
fn read_batch_dispatches_in_recording_order() {
    let log = log();
    let mut batch = BatchR::new();

    AsyncRTx::query(&mut batch, recording(&log, "all", count), "SELECT 1", vec![]);
    AsyncRTx::query_row(&mut batch, recording(&log, "one", first), "SELECT 2", vec![Value::Integer(2)]);
    AsyncRTx::query(&mut batch, recording(&log, "again", count), "SELECT 3", vec![]);

    assert_eq!(batch.len(), 3);
    assert!(format!("{:?}", batch).contains("SELECT 2"));
    assert!(log.borrow().is_empty());

    let mut tx = RecordingTx::returning(vec![
        row(vec![Value::Integer(1)]),
        row(vec![Value::Integer(2)]),
    ]);

    batch.dispatch(&mut tx).unwrap();

    assert_eq!(tx.statements(), vec!["SELECT 1", "SELECT 2", "SELECT 3"]);
    assert_eq!(tx.calls[1].1, vec![Value::Integer(2)]);
    assert_eq!(*log.borrow(), vec!["all: 2 rows", "one: [Integer(1)]", "again: 2 rows"]);
}

#[test]
fn write_batch_mixes_reads_and_writes() {
    let log = log();
    let mut batch = BatchRW::new();

    AsyncWTx::exec(&mut batch, recording(&log, "insert", affected), "INSERT 1", vec![]);
    AsyncRTx::query(&mut batch, recording(&log, "select", count), "SELECT 1", vec![]);
    AsyncWTx::exec(&mut batch, recording(&log, "delete", affected), "DELETE 1", vec![]);

    let mut tx = RecordingTx { rows_affected: 4, ..RecordingTx::default() };

    batch.dispatch(&mut tx).unwrap();

    assert_eq!(tx.statements(), vec!["INSERT 1", "SELECT 1", "DELETE 1"]);
    assert_eq!(*log.borrow(), vec!["insert: 4", "select: 0 rows", "delete: 4"]);
}

#[test]
fn failing_handler_stops_the_batch() {
    let log = log();
    let mut batch = BatchRW::new();

    AsyncWTx::exec(&mut batch, recording(&log, "first", affected), "INSERT ok", vec![]);
    AsyncWTx::exec(&mut batch, recording(&log, "second", affected), "INSERT bad", vec![]);
    AsyncWTx::exec(&mut batch, recording(&log, "third", affected), "INSERT never", vec![]);

    let mut tx = RecordingTx { fail_on: Some("bad"), ..RecordingTx::default() };
    let error = batch.dispatch(&mut tx).unwrap_err();

    assert_eq!(error.to_string(), "statement failed: INSERT bad");
    assert_eq!(tx.statements(), vec!["INSERT ok", "INSERT bad"]);
    assert_eq!(*log.borrow(), vec![
        "first: 0",
        "second: error: statement failed: INSERT bad",
    ]);
}

#[test]
fn handlers_may_recover_from_their_own_errors() {
    let recovered = log();
    let mut batch = BatchRW::new();
    let seen = Rc::clone(&recovered);

    AsyncWTx::exec(&mut batch, Box::new(move |result: Result<Exec>| -> Result<()> {
        seen.borrow_mut().push(format!("recovered: {}", result.is_err()));
        Ok(())
    }), "INSERT bad", vec![]);
    AsyncWTx::exec(&mut batch, recording(&recovered, "next", affected), "INSERT good", vec![]);

    let mut tx = RecordingTx { fail_on: Some("bad"), ..RecordingTx::default() };

    batch.dispatch(&mut tx).unwrap();

    assert_eq!(*recovered.borrow(), vec!["recovered: true", "next: 0"]);
}

#[test]
fn handlers_may_abort_after_success() {
    let mut batch = BatchR::new();

    AsyncRTx::query(&mut batch, Box::new(|_: Result<Rows>| -> Result<()> {
        Err(Error::driver("validation failed"))
    }), "SELECT 1", vec![]);
    AsyncRTx::query(&mut batch, Box::new(|_: Result<Rows>| -> Result<()> {
        panic!("dispatched after an aborting handler")
    }), "SELECT 2", vec![]);

    let mut tx = RecordingTx::default();

    match batch.dispatch(&mut tx) {
        Err(Error::Driver(error)) => assert_eq!(error.to_string(), "validation failed"),
        other => panic!("expected a driver error, got {:?}", other),
    }

    assert_eq!(tx.statements(), vec!["SELECT 1"]);
}

#[test]
fn single_row_entries_report_no_rows() {
    let log = log();
    let mut batch = BatchR::new();

    AsyncRTx::query_row(&mut batch, Box::new({
        let log = Rc::clone(&log);
        move |result: Result<Row>| -> Result<()> {
            let outcome = match result {
                Err(ref error) if error.is_no_rows() => "no rows",
                Err(_) => "error",
                Ok(_) => "row",
            };
            log.borrow_mut().push(String::from(outcome));
            Ok(())
        }
    }), "SELECT nothing", vec![]);

    batch.dispatch(&mut RecordingTx::default()).unwrap();

    assert_eq!(*log.borrow(), vec!["no rows"]);
}

//
// Rows and values
//

#[test]
fn query_row_returns_the_first_row() {
    let mut tx = RecordingTx::returning(vec![
        row(vec![Value::Text(String::from("a"))]),
        row(vec![Value::Text(String::from("b"))]),
    ]);

    let first = tx.query_row("SELECT name", &[]).unwrap();

    assert_eq!(first.get::<String>(0).unwrap(), "a");
    assert!(RecordingTx::default().query_row("SELECT name", &[]).unwrap_err().is_no_rows());
}

#[test]
fn row_get_checks_index_and_type() {
    let row = row(vec![Value::Integer(1), Value::Null, Value::Blob(vec![1, 2])]);

    assert_eq!(row.len(), 3);
    assert_eq!(row.get::<i64>(0).unwrap(), 1);
    assert!(row.get::<bool>(0).unwrap());
    assert_eq!(row.get::<Option<String>>(1).unwrap(), None);
    assert_eq!(row.get::<Vec<u8>>(2).unwrap(), vec![1, 2]);

    match row.get::<i64>(3) {
        Err(Error::ColumnIndex { index: 3, len: 3 }) => {},
        other => panic!("expected a column index error, got {:?}", other),
    }

    match row.get::<String>(0) {
        Err(Error::Decode { expected: "String", found: "integer" }) => {},
        other => panic!("expected a decode error, got {:?}", other),
    }

    match row.get::<i64>(1) {
        Err(Error::Decode { expected: "i64", found: "null" }) => {},
        other => panic!("expected a decode error, got {:?}", other),
    }
}

#[test]
fn arguments_convert_to_values() {
    let name = String::from("ann");

    assert_eq!(ToValue::to_value(&7_i64), Value::Integer(7));
    assert_eq!(ToValue::to_value(&7_i32), Value::Integer(7));
    assert_eq!(ToValue::to_value(&true), Value::Integer(1));
    assert_eq!(ToValue::to_value(&1.5_f64), Value::Real(1.5));
    assert_eq!(ToValue::to_value(&"ann"), Value::Text(String::from("ann")));
    assert_eq!(ToValue::to_value(&name), Value::Text(String::from("ann")));
    assert_eq!(ToValue::to_value(&&b"ab"[..]), Value::Blob(vec![b'a', b'b']));
    assert_eq!(ToValue::to_value(&Some("x")), Value::Text(String::from("x")));
    assert_eq!(ToValue::to_value(&None::<&str>), Value::Null);
}

#[test]
fn errors_describe_themselves() {
    assert_eq!(Error::NoRows.to_string(), "no rows");
    assert_eq!(
        Error::MissingVariant {
            repository: String::from("Users"),
            query:      String::from("Create"),
            dialect:    String::from("mysql"),
        }.to_string(),
        "query 'Users:Create' has no SQL for dialect 'mysql'",
    );
    assert_eq!(
        Error::NoCompatibleDialect { requested: String::from("mysql") }.to_string(),
        "no compatible dialect for 'mysql'",
    );
}
