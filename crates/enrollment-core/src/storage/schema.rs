use rusqlite::Connection;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name    TEXT    NOT NULL,
    last_name     TEXT    NOT NULL,
    age           INTEGER NOT NULL,
    dni           TEXT    NOT NULL UNIQUE,
    email         TEXT,
    phone         TEXT,
    current_cycle INTEGER NOT NULL CHECK (current_cycle BETWEEN 1 AND 10),
    active        INTEGER NOT NULL DEFAULT 1,
    registered_at TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS courses (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    code          TEXT    NOT NULL UNIQUE,
    name          TEXT    NOT NULL,
    credits       INTEGER NOT NULL CHECK (credits BETWEEN 1 AND 5),
    cycle         INTEGER NOT NULL CHECK (cycle BETWEEN 1 AND 10),
    active        INTEGER NOT NULL DEFAULT 1,
    registered_at TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS enrollments (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id       INTEGER NOT NULL REFERENCES students (id),
    course_id        INTEGER NOT NULL REFERENCES courses (id),
    home_cycle       INTEGER NOT NULL,
    enrollment_cycle INTEGER NOT NULL,
    attempt_number   INTEGER NOT NULL DEFAULT 1,
    status           TEXT    NOT NULL DEFAULT 'ENROLLED'
                     CHECK (status IN ('ENROLLED', 'PASSED', 'FAILED')),
    enrolled_at      TEXT    NOT NULL,
    UNIQUE (student_id, course_id, enrollment_cycle)
);

CREATE TABLE IF NOT EXISTS evaluations (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    enrollment_id INTEGER NOT NULL REFERENCES enrollments (id) ON DELETE CASCADE,
    score         REAL    NOT NULL CHECK (score >= 0 AND score <= 20),
    approved      INTEGER NOT NULL,
    evaluated_at  TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_enrollments_student ON enrollments (student_id, course_id);
CREATE INDEX IF NOT EXISTS idx_enrollments_cycle ON enrollments (enrollment_cycle);
CREATE INDEX IF NOT EXISTS idx_evaluations_enrollment ON evaluations (enrollment_id);
"#;

pub(super) fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}
