use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::warn;
use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};

use crate::config::DatabaseSettings;
use crate::errors::EngineError;

/// Runs `work` inside an IMMEDIATE transaction, so the write lock is held
/// from the first read. Any error rolls everything back. Lock contention
/// is retried up to `settings.max_attempts` times, then reported as
/// `EngineError::TransientConflict`.
pub fn in_transaction<T, F>(conn: &mut Connection, settings: &DatabaseSettings, mut work: F) -> Result<T>
where
    F: FnMut(&Transaction<'_>) -> Result<T>,
{
    let max_attempts = settings.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match run_once(conn, &mut work) {
            Err(err) if is_lock_conflict(&err) => {
                if attempt >= max_attempts {
                    return Err(err.context(EngineError::TransientConflict { attempts: attempt }));
                }
                warn!("Transaction conflict (attempt {}/{}), retrying", attempt, max_attempts);
                thread::sleep(Duration::from_millis(settings.retry_backoff_ms * attempt as u64));
            }
            outcome => return outcome,
        }
    }
}

fn run_once<T, F>(conn: &mut Connection, work: &mut F) -> Result<T>
where
    F: FnMut(&Transaction<'_>) -> Result<T>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let value = work(&tx)?;
    tx.commit()?;
    Ok(value)
}

fn is_lock_conflict(err: &anyhow::Error) -> bool {
    let top = err.downcast_ref::<rusqlite::Error>();
    top.into_iter()
        .chain(err.chain().filter_map(|cause| cause.downcast_ref::<rusqlite::Error>()))
        .any(|e| {
            matches!(
                e,
                rusqlite::Error::SqliteFailure(failure, _)
                    if matches!(failure.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::engine_error;

    fn settings() -> DatabaseSettings {
        DatabaseSettings {
            path: ":memory:".to_string(),
            max_attempts: 2,
            busy_timeout_ms: 0,
            retry_backoff_ms: 0,
        }
    }

    fn counter_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE counter (n INTEGER); INSERT INTO counter VALUES (0)")
            .unwrap();
        conn
    }

    fn read(conn: &Connection) -> i64 {
        conn.query_row("SELECT n FROM counter", [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn test_commits_on_success() {
        let mut conn = counter_conn();
        in_transaction(&mut conn, &settings(), |tx| {
            tx.execute("UPDATE counter SET n = n + 1", [])?;
            Ok(())
        })
        .unwrap();

        assert_eq!(read(&conn), 1);
    }

    #[test]
    fn test_rolls_back_on_error() {
        let mut conn = counter_conn();
        let result: Result<()> = in_transaction(&mut conn, &settings(), |tx| {
            tx.execute("UPDATE counter SET n = n + 1", [])?;
            Err(EngineError::DuplicateSeed(1).into())
        });

        assert_eq!(engine_error(&result.unwrap_err()), Some(&EngineError::DuplicateSeed(1)));
        assert_eq!(read(&conn), 0);
    }

    #[test]
    fn test_busy_exhausts_into_transient_conflict() {
        let mut conn = counter_conn();
        let mut calls = 0;
        let result: Result<()> = in_transaction(&mut conn, &settings(), |_| {
            calls += 1;
            Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
                None,
            )
            .into())
        });

        let err = result.unwrap_err();
        assert_eq!(calls, 2);
        assert_eq!(engine_error(&err), Some(&EngineError::TransientConflict { attempts: 2 }));
    }
}
