use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::domain::{Evaluation, EvaluationId, EvaluationView, PendingEvaluation, Score};
use crate::storage::{Database, RepositoryError, RepositoryResult};
use crate::workflows::enrollment::{EnrollmentId, EnrollmentStatus};
use crate::workflows::registry::{CourseId, StudentId};

const VIEW_SELECT: &str = r#"
    SELECT v.id, v.enrollment_id, e.student_id, s.first_name || ' ' || s.last_name,
           e.course_id, c.code, c.name, e.enrollment_cycle, e.attempt_number,
           v.score, v.approved, v.evaluated_at
    FROM evaluations v
    JOIN enrollments e ON e.id = v.enrollment_id
    JOIN students s ON s.id = e.student_id
    JOIN courses c ON c.id = e.course_id
"#;

const EVALUATION_COLUMNS: &str = "id, enrollment_id, score, approved, evaluated_at";

fn evaluation_from_row(row: &Row<'_>) -> rusqlite::Result<Evaluation> {
    Ok(Evaluation {
        id: EvaluationId(row.get(0)?),
        enrollment_id: EnrollmentId(row.get(1)?),
        score: row.get(2)?,
        approved: row.get(3)?,
        evaluated_at: row.get(4)?,
    })
}

fn view_from_row(row: &Row<'_>) -> rusqlite::Result<EvaluationView> {
    Ok(EvaluationView {
        id: EvaluationId(row.get(0)?),
        enrollment_id: EnrollmentId(row.get(1)?),
        student_id: StudentId(row.get(2)?),
        student_name: row.get(3)?,
        course_id: CourseId(row.get(4)?),
        course_code: row.get(5)?,
        course_name: row.get(6)?,
        enrollment_cycle: row.get(7)?,
        attempt_number: row.get(8)?,
        score: row.get(9)?,
        approved: row.get(10)?,
        evaluated_at: row.get(11)?,
    })
}

#[derive(Clone)]
pub struct EvaluationRepository {
    db: Database,
}

impl EvaluationRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn list(&self) -> RepositoryResult<Vec<EvaluationView>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&format!("{VIEW_SELECT} ORDER BY v.evaluated_at DESC, v.id DESC"))?;
        let rows = stmt
            .query_map([], view_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn find(&self, id: EvaluationId) -> RepositoryResult<Option<EvaluationView>> {
        let conn = self.db.connection()?;
        let view = conn
            .query_row(&format!("{VIEW_SELECT} WHERE v.id = ?1"), params![id.0], view_from_row)
            .optional()?;
        Ok(view)
    }

    /// Enrollments still `ENROLLED` with no evaluation attached.
    pub fn pending(&self) -> RepositoryResult<Vec<PendingEvaluation>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT e.id, e.student_id, s.first_name || ' ' || s.last_name,
                   e.course_id, c.code, c.name, e.enrollment_cycle, e.attempt_number
            FROM enrollments e
            JOIN students s ON s.id = e.student_id
            JOIN courses c ON c.id = e.course_id
            LEFT JOIN evaluations v ON v.enrollment_id = e.id
            WHERE e.status = 'ENROLLED' AND v.id IS NULL
            ORDER BY e.enrollment_cycle, s.last_name, c.code
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PendingEvaluation {
                    enrollment_id: EnrollmentId(row.get(0)?),
                    student_id: StudentId(row.get(1)?),
                    student_name: row.get(2)?,
                    course_id: CourseId(row.get(3)?),
                    course_code: row.get(4)?,
                    course_name: row.get(5)?,
                    enrollment_cycle: row.get(6)?,
                    attempt_number: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&EvaluationTransaction<'_>) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.db.immediate(|tx| f(&EvaluationTransaction { conn: tx }))
    }
}

/// Evaluation and enrollment-status writes that must commit together.
pub struct EvaluationTransaction<'t> {
    conn: &'t Connection,
}

impl EvaluationTransaction<'_> {
    pub fn fetch(&self, id: EvaluationId) -> RepositoryResult<Option<Evaluation>> {
        let evaluation = self
            .conn
            .query_row(
                &format!("SELECT {EVALUATION_COLUMNS} FROM evaluations WHERE id = ?1"),
                params![id.0],
                evaluation_from_row,
            )
            .optional()?;
        Ok(evaluation)
    }

    pub fn find_by_enrollment(&self, enrollment_id: EnrollmentId) -> RepositoryResult<Option<Evaluation>> {
        let evaluation = self
            .conn
            .query_row(
                &format!("SELECT {EVALUATION_COLUMNS} FROM evaluations WHERE enrollment_id = ?1"),
                params![enrollment_id.0],
                evaluation_from_row,
            )
            .optional()?;
        Ok(evaluation)
    }

    pub fn insert(&self, enrollment_id: EnrollmentId, score: Score) -> RepositoryResult<Evaluation> {
        let evaluated_at = Utc::now();
        let approved = score.is_passing();
        self.conn.execute(
            r#"
            INSERT INTO evaluations (enrollment_id, score, approved, evaluated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![enrollment_id.0, score.value(), approved, evaluated_at],
        )?;
        Ok(Evaluation {
            id: EvaluationId(self.conn.last_insert_rowid()),
            enrollment_id,
            score: score.value(),
            approved,
            evaluated_at,
        })
    }

    pub fn update_score(&self, existing: &Evaluation, score: Score) -> RepositoryResult<Evaluation> {
        let evaluated_at = Utc::now();
        let approved = score.is_passing();
        self.conn.execute(
            "UPDATE evaluations SET score = ?1, approved = ?2, evaluated_at = ?3 WHERE id = ?4",
            params![score.value(), approved, evaluated_at, existing.id.0],
        )?;
        Ok(Evaluation {
            id: existing.id,
            enrollment_id: existing.enrollment_id,
            score: score.value(),
            approved,
            evaluated_at,
        })
    }

    pub fn delete(&self, id: EvaluationId) -> RepositoryResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM evaluations WHERE id = ?1", params![id.0])?;
        Ok(deleted > 0)
    }

    /// Returns `false` when the enrollment no longer exists.
    pub fn set_enrollment_status(
        &self,
        enrollment_id: EnrollmentId,
        status: EnrollmentStatus,
    ) -> RepositoryResult<bool> {
        let updated = self.conn.execute(
            "UPDATE enrollments SET status = ?1 WHERE id = ?2",
            params![status.as_db_str(), enrollment_id.0],
        )?;
        Ok(updated > 0)
    }
}
