//! Guarded database transactions
//!
//! `run_in_transaction` begins a transaction, runs a unit of work against it
//! and then either commits or rolls back, never both. A panic inside the work
//! is caught and turned into an ordinary error after rolling back.

use crate::{Error, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Something that can open a transaction
pub trait TransactionSource {
    type Tx<'a>: TransactionHandle
    where
        Self: 'a;

    fn begin(&mut self) -> Result<Self::Tx<'_>>;
}

/// An open transaction; finishing it consumes the handle
pub trait TransactionHandle: Sized {
    fn commit(self) -> Result<()>;

    fn rollback(self) -> Result<()>;
}

impl TransactionSource for rusqlite::Connection {
    type Tx<'a> = rusqlite::Transaction<'a>;

    fn begin(&mut self) -> Result<rusqlite::Transaction<'_>> {
        self.transaction()
            .map_err(|e| Error::Transaction(format!("begin failed: {}", e)))
    }
}

impl TransactionHandle for rusqlite::Transaction<'_> {
    fn commit(self) -> Result<()> {
        rusqlite::Transaction::commit(self)
            .map_err(|e| Error::Transaction(format!("commit failed: {}", e)))
    }

    fn rollback(self) -> Result<()> {
        rusqlite::Transaction::rollback(self)
            .map_err(|e| Error::Transaction(format!("rollback failed: {}", e)))
    }
}

/// Run `work` inside a transaction on `db`
///
/// - `work` returns `Ok`: commit; a commit failure is returned instead.
/// - `work` returns `Err` or panics: roll back and return the work's error
///   (a panic becomes `Error::Fault`, or the `Error` itself when the panic
///   payload is one). A failed rollback is reported as `Error::Transaction`.
pub fn run_in_transaction<'db, S, T, F>(db: &'db mut S, work: F) -> Result<T>
where
    S: TransactionSource + 'db,
    F: FnOnce(&S::Tx<'db>) -> Result<T>,
{
    let tx = db.begin()?;

    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| work(&tx))) {
        Ok(outcome) => outcome,
        Err(payload) => Err(fault_from_panic(payload)),
    };

    match outcome {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            tracing::warn!(error = %err, "rolling back transaction");
            match tx.rollback() {
                Ok(()) => Err(err),
                Err(rollback_err) => Err(Error::Transaction(format!(
                    "{} (after: {})",
                    rollback_err, err
                ))),
            }
        }
    }
}

fn fault_from_panic(payload: Box<dyn Any + Send>) -> Error {
    let payload = match payload.downcast::<Error>() {
        Ok(err) => return *err,
        Err(payload) => payload,
    };

    if let Some(message) = payload.downcast_ref::<&str>() {
        Error::Fault(message.to_string())
    } else if let Some(message) = payload.downcast_ref::<String>() {
        Error::Fault(message.clone())
    } else {
        Error::Fault("panic with a non-string payload".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[derive(Default)]
    struct Recorder {
        begins: usize,
        commits: usize,
        rollbacks: usize,
        fail_begin: bool,
        fail_commit: bool,
        fail_rollback: bool,
    }

    struct RecordingTx<'a> {
        db: &'a mut Recorder,
    }

    impl TransactionSource for Recorder {
        type Tx<'a> = RecordingTx<'a>;

        fn begin(&mut self) -> Result<RecordingTx<'_>> {
            if self.fail_begin {
                return Err(Error::Transaction("begin refused".into()));
            }
            self.begins += 1;
            Ok(RecordingTx { db: self })
        }
    }

    impl TransactionHandle for RecordingTx<'_> {
        fn commit(self) -> Result<()> {
            self.db.commits += 1;
            if self.db.fail_commit {
                return Err(Error::Transaction("commit refused".into()));
            }
            Ok(())
        }

        fn rollback(self) -> Result<()> {
            self.db.rollbacks += 1;
            if self.db.fail_rollback {
                return Err(Error::Transaction("rollback refused".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_commits_once_on_success() {
        let mut db = Recorder::default();
        let value = run_in_transaction(&mut db, |_| Ok(42)).unwrap();

        assert_eq!(value, 42);
        assert_eq!((db.begins, db.commits, db.rollbacks), (1, 1, 0));
    }

    #[test]
    fn test_rolls_back_once_on_error() {
        let mut db = Recorder::default();
        let err = run_in_transaction(&mut db, |_| -> Result<()> {
            Err(Error::Config("work failed".into()))
        })
        .unwrap_err();

        assert!(matches!(err, Error::Config(ref m) if m == "work failed"));
        assert_eq!((db.begins, db.commits, db.rollbacks), (1, 0, 1));
    }

    #[test]
    fn test_panic_becomes_fault() {
        let mut db = Recorder::default();
        let err = run_in_transaction(&mut db, |_| -> Result<()> { panic!("boom") }).unwrap_err();

        assert!(matches!(err, Error::Fault(ref m) if m == "boom"));
        assert_eq!((db.commits, db.rollbacks), (0, 1));

        let err = run_in_transaction(&mut db, |_| -> Result<()> {
            panic!("formatted {}", 7)
        })
        .unwrap_err();
        assert!(matches!(err, Error::Fault(ref m) if m == "formatted 7"));
        assert_eq!((db.commits, db.rollbacks), (0, 2));
    }

    #[test]
    fn test_panic_with_error_payload_is_returned_as_is() {
        let mut db = Recorder::default();
        let err = run_in_transaction(&mut db, |_| -> Result<()> {
            std::panic::panic_any(Error::Transport("socket closed".into()))
        })
        .unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(db.rollbacks, 1);
    }

    #[test]
    fn test_commit_failure_supersedes_success() {
        let mut db = Recorder {
            fail_commit: true,
            ..Default::default()
        };
        let err = run_in_transaction(&mut db, |_| Ok(())).unwrap_err();

        assert!(matches!(err, Error::Transaction(_)));
        assert_eq!((db.commits, db.rollbacks), (1, 0));
    }

    #[test]
    fn test_rollback_failure_is_reported() {
        let mut db = Recorder {
            fail_rollback: true,
            ..Default::default()
        };
        let err = run_in_transaction(&mut db, |_| -> Result<()> {
            Err(Error::Config("work failed".into()))
        })
        .unwrap_err();

        match err {
            Error::Transaction(message) => assert!(message.contains("work failed")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!((db.commits, db.rollbacks), (0, 1));
    }

    #[test]
    fn test_begin_failure_skips_work() {
        let mut db = Recorder {
            fail_begin: true,
            ..Default::default()
        };
        let mut ran = false;
        let err = run_in_transaction(&mut db, |_| {
            ran = true;
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(err, Error::Transaction(_)));
        assert!(!ran);
        assert_eq!((db.commits, db.rollbacks), (0, 0));
    }

    fn sqlite() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE events (id INTEGER PRIMARY KEY, name TEXT NOT NULL)", [])
            .unwrap();
        conn
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_sqlite_commit() {
        let mut conn = sqlite();
        run_in_transaction(&mut conn, |tx| {
            tx.execute("INSERT INTO events (name) VALUES (?1)", ["created"])?;
            tx.execute("INSERT INTO events (name) VALUES (?1)", ["updated"])?;
            Ok(())
        })
        .unwrap();

        assert_eq!(count(&conn), 2);
    }

    #[test]
    fn test_sqlite_rollback_on_error() {
        let mut conn = sqlite();
        let err = run_in_transaction(&mut conn, |tx| {
            tx.execute("INSERT INTO events (name) VALUES (?1)", ["created"])?;
            tx.execute("INSERT INTO missing_table (name) VALUES (?1)", ["x"])?;
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(err, Error::Database(_)));
        assert_eq!(count(&conn), 0);
    }

    #[test]
    fn test_sqlite_rollback_on_panic() {
        let mut conn = sqlite();
        let err = run_in_transaction(&mut conn, |tx| -> Result<()> {
            tx.execute("INSERT INTO events (name) VALUES (?1)", ["created"])?;
            panic!("worker crashed");
        })
        .unwrap_err();

        assert!(matches!(err, Error::Fault(_)));
        assert_eq!(count(&conn), 0);
    }
}
