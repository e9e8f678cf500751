use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::domain::{
    AttemptRecord, EnrollmentId, EnrollmentStatus, EnrollmentView, NewEnrollment,
};
use crate::storage::{Database, RepositoryError, RepositoryResult};
use crate::workflows::registry::{CourseId, StudentId};

const VIEW_SELECT: &str = r#"
    SELECT e.id, e.student_id, s.first_name || ' ' || s.last_name, e.course_id, c.code, c.name,
           e.home_cycle, e.enrollment_cycle, e.attempt_number, e.status, e.enrolled_at
    FROM enrollments e
    JOIN students s ON s.id = e.student_id
    JOIN courses c ON c.id = e.course_id
"#;

pub(crate) fn status_column(row: &Row<'_>, index: usize) -> rusqlite::Result<EnrollmentStatus> {
    let raw: String = row.get(index)?;
    EnrollmentStatus::from_db_str(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            Type::Text,
            format!("unknown enrollment status '{raw}'").into(),
        )
    })
}

fn view_from_row(row: &Row<'_>) -> rusqlite::Result<EnrollmentView> {
    let home_cycle: u8 = row.get(6)?;
    let enrollment_cycle: u8 = row.get(7)?;
    Ok(EnrollmentView {
        id: EnrollmentId(row.get(0)?),
        student_id: StudentId(row.get(1)?),
        student_name: row.get(2)?,
        course_id: CourseId(row.get(3)?),
        course_code: row.get(4)?,
        course_name: row.get(5)?,
        home_cycle,
        enrollment_cycle,
        attempt_number: row.get(8)?,
        status: status_column(row, 9)?,
        is_carry_over: home_cycle != enrollment_cycle,
        enrolled_at: row.get(10)?,
    })
}

fn attempt_from_row(row: &Row<'_>) -> rusqlite::Result<AttemptRecord> {
    Ok(AttemptRecord {
        enrollment_id: EnrollmentId(row.get(0)?),
        course_id: CourseId(row.get(1)?),
        course_code: row.get(2)?,
        course_name: row.get(3)?,
        credits: row.get(4)?,
        home_cycle: row.get(5)?,
        enrollment_cycle: row.get(6)?,
        attempt_number: row.get(7)?,
        status: status_column(row, 8)?,
        score: row.get(9)?,
        approved: row.get(10)?,
        evaluated_at: row.get(11)?,
    })
}

/// Enrollment table access for the planner, the writer and the read endpoints.
#[derive(Clone)]
pub struct EnrollmentRepository {
    db: Database,
}

impl EnrollmentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn list(&self) -> RepositoryResult<Vec<EnrollmentView>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&format!("{VIEW_SELECT} ORDER BY e.enrolled_at DESC, e.id DESC"))?;
        let rows = stmt
            .query_map([], view_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn fetch(&self, id: EnrollmentId) -> RepositoryResult<Option<EnrollmentView>> {
        let conn = self.db.connection()?;
        let view = conn
            .query_row(
                &format!("{VIEW_SELECT} WHERE e.id = ?1"),
                params![id.0],
                view_from_row,
            )
            .optional()?;
        Ok(view)
    }

    /// Every enrollment of the student with its evaluation, oldest cycle first.
    pub fn attempts_for_student(&self, student_id: StudentId) -> RepositoryResult<Vec<AttemptRecord>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT e.id, e.course_id, c.code, c.name, c.credits,
                   e.home_cycle, e.enrollment_cycle, e.attempt_number, e.status,
                   v.score, v.approved, v.evaluated_at
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            LEFT JOIN evaluations v ON v.enrollment_id = e.id
            WHERE e.student_id = ?1
            ORDER BY e.enrollment_cycle, c.code, e.attempt_number
            "#,
        )?;
        let rows = stmt
            .query_map(params![student_id.0], attempt_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Removes the enrollment; its evaluation goes with it.
    pub fn delete(&self, id: EnrollmentId) -> RepositoryResult<bool> {
        let conn = self.db.connection()?;
        let deleted = conn.execute("DELETE FROM enrollments WHERE id = ?1", params![id.0])?;
        Ok(deleted > 0)
    }

    /// Runs `f` in one IMMEDIATE transaction; an `Err` rolls back every write it made.
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&EnrollmentTransaction<'_>) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.db.immediate(|tx| f(&EnrollmentTransaction { conn: tx }))
    }
}

/// Writes available to the enrollment writer inside its transaction.
pub struct EnrollmentTransaction<'t> {
    conn: &'t Connection,
}

impl EnrollmentTransaction<'_> {
    pub fn exists_in_cycle(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        enrollment_cycle: u8,
    ) -> RepositoryResult<bool> {
        let found = self
            .conn
            .query_row(
                r#"
                SELECT 1 FROM enrollments
                WHERE student_id = ?1 AND course_id = ?2 AND enrollment_cycle = ?3
                "#,
                params![student_id.0, course_id.0, enrollment_cycle],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Prior enrollments for the pair, in any cycle.
    pub fn attempt_count(&self, student_id: StudentId, course_id: CourseId) -> RepositoryResult<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM enrollments WHERE student_id = ?1 AND course_id = ?2",
            params![student_id.0, course_id.0],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn insert(&self, enrollment: &NewEnrollment) -> RepositoryResult<EnrollmentId> {
        self.conn.execute(
            r#"
            INSERT INTO enrollments (
                student_id, course_id, home_cycle, enrollment_cycle,
                attempt_number, status, enrolled_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                enrollment.student_id.0,
                enrollment.course_id.0,
                enrollment.home_cycle,
                enrollment.enrollment_cycle,
                enrollment.attempt_number,
                EnrollmentStatus::Enrolled.as_db_str(),
                Utc::now(),
            ],
        )?;
        Ok(EnrollmentId(self.conn.last_insert_rowid()))
    }
}
