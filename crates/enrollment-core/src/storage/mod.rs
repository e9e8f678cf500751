//! SQLite persistence shared by the registry and the academic workflows.
//!
//! One connection lives behind a mutex. Callers lock it for the duration of a
//! synchronous repository call only; no guard is ever held across an `.await`.

mod error;
mod schema;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::debug;

pub use error::{RepositoryError, RepositoryResult};

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Cloneable handle to the shared SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file and bootstrap the schema.
    pub fn open(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened sqlite database");
        Self::from_connection(conn)
    }

    pub fn in_memory() -> RepositoryResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> RepositoryResult<Self> {
        configure_connection(&conn)?;
        schema::apply(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn connection(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Runs `f` inside an IMMEDIATE transaction, committing only when it returns `Ok`.
    ///
    /// The write lock is taken up front, so concurrent writers serialize on the
    /// transaction rather than failing halfway through.
    pub fn immediate<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut conn = self.connection()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let value = f(&tx)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(value)
    }

    /// Cheap round trip used by the readiness check.
    pub fn ping(&self) -> RepositoryResult<()> {
        let conn = self.connection()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}

/// Foreign keys and busy timeout are per-connection settings in SQLite.
fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(db: &Database) -> Vec<String> {
        let conn = db.connection().expect("lock");
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .expect("prepare");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .expect("query");
        rows.map(|row| row.expect("row")).collect()
    }

    #[test]
    fn bootstraps_schema_in_memory() {
        let db = Database::in_memory().expect("database opens");
        let tables = table_names(&db);
        for expected in ["courses", "enrollments", "evaluations", "students"] {
            assert!(tables.iter().any(|name| name == expected), "{expected} missing");
        }
        db.ping().expect("ping succeeds");
    }

    #[test]
    fn reopening_a_file_keeps_existing_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("enrollment.db");

        {
            let db = Database::open(&path).expect("first open");
            let conn = db.connection().expect("lock");
            conn.execute(
                "INSERT INTO courses (code, name, credits, cycle, active, registered_at)
                 VALUES ('MAT101', 'Matemática Básica', 4, 1, 1, '2024-03-01T00:00:00Z')",
                [],
            )
            .expect("insert");
        }

        let db = Database::open(&path).expect("second open");
        let conn = db.connection().expect("lock");
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 1);
    }

    #[test]
    fn failed_transactions_roll_back() {
        let db = Database::in_memory().expect("database opens");
        let result: Result<(), RepositoryError> = db.immediate(|tx| {
            tx.execute(
                "INSERT INTO courses (code, name, credits, cycle, active, registered_at)
                 VALUES ('LEN101', 'Lenguaje y Comunicación', 3, 1, 1, '2024-03-01T00:00:00Z')",
                [],
            )?;
            Err(RepositoryError::DatabaseQueryError("aborted".to_string()))
        });
        assert!(result.is_err());

        let conn = db.connection().expect("lock");
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 0);
    }

    #[test]
    fn unique_violations_are_classified() {
        let db = Database::in_memory().expect("database opens");
        let conn = db.connection().expect("lock");
        let insert = "INSERT INTO courses (code, name, credits, cycle, active, registered_at)
                      VALUES ('INF101', 'Introducción a la Programación', 3, 1, 1, '2024-03-01T00:00:00Z')";
        conn.execute(insert, []).expect("first insert");
        let err = RepositoryError::from(conn.execute(insert, []).expect_err("duplicate code"));
        assert!(err.is_unique_violation());
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let db = Database::in_memory().expect("database opens");
        let conn = db.connection().expect("lock");
        let err = conn
            .execute(
                "INSERT INTO enrollments
                 (student_id, course_id, home_cycle, enrollment_cycle, attempt_number, status, enrolled_at)
                 VALUES (99, 99, 1, 1, 1, 'ENROLLED', '2024-03-01T00:00:00Z')",
                [],
            )
            .expect_err("dangling references rejected");
        assert!(matches!(
            RepositoryError::from(err),
            RepositoryError::ForeignKeyViolation(_)
        ));
    }
}
