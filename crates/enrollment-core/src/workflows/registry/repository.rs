use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::domain::{Course, CourseId, NewCourse, NewStudent, Student, StudentId};
use crate::storage::{Database, RepositoryResult};

const STUDENT_COLUMNS: &str = "id, first_name, last_name, age, dni, email, phone, current_cycle, active, registered_at";
const COURSE_COLUMNS: &str = "id, code, name, credits, cycle, active, registered_at";

pub(crate) fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: StudentId(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        age: row.get(3)?,
        dni: row.get(4)?,
        email: row.get(5)?,
        phone: row.get(6)?,
        current_cycle: row.get(7)?,
        active: row.get(8)?,
        registered_at: row.get(9)?,
    })
}

pub(crate) fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: CourseId(row.get(0)?),
        code: row.get(1)?,
        name: row.get(2)?,
        credits: row.get(3)?,
        cycle: row.get(4)?,
        active: row.get(5)?,
        registered_at: row.get(6)?,
    })
}

/// Student table access. Holds no business rules.
#[derive(Clone)]
pub struct StudentRepository {
    db: Database,
}

impl StudentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn list_active(&self) -> RepositoryResult<Vec<Student>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE active = 1 ORDER BY last_name, first_name"
        ))?;
        let students = stmt
            .query_map([], student_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    pub fn find_active(&self, id: StudentId) -> RepositoryResult<Option<Student>> {
        let conn = self.db.connection()?;
        let student = conn
            .query_row(
                &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1 AND active = 1"),
                params![id.0],
                student_from_row,
            )
            .optional()?;
        Ok(student)
    }

    pub fn insert(&self, student: &NewStudent) -> RepositoryResult<Student> {
        let conn = self.db.connection()?;
        let registered_at = Utc::now();
        conn.execute(
            r#"
            INSERT INTO students (
                first_name, last_name, age, dni, email, phone, current_cycle, active, registered_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)
            "#,
            params![
                student.first_name,
                student.last_name,
                student.age,
                student.dni,
                student.email,
                student.phone,
                student.current_cycle,
                registered_at,
            ],
        )?;

        Ok(Student {
            id: StudentId(conn.last_insert_rowid()),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            age: student.age,
            dni: student.dni.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            current_cycle: student.current_cycle,
            active: true,
            registered_at,
        })
    }

    /// Replaces every editable field; `None` when no active student has the id.
    pub fn update(&self, id: StudentId, student: &NewStudent) -> RepositoryResult<Option<Student>> {
        let conn = self.db.connection()?;
        let updated = conn.execute(
            r#"
            UPDATE students
            SET first_name = ?1, last_name = ?2, age = ?3, dni = ?4,
                email = ?5, phone = ?6, current_cycle = ?7
            WHERE id = ?8 AND active = 1
            "#,
            params![
                student.first_name,
                student.last_name,
                student.age,
                student.dni,
                student.email,
                student.phone,
                student.current_cycle,
                id.0,
            ],
        )?;
        if updated == 0 {
            return Ok(None);
        }

        let student = conn
            .query_row(
                &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1"),
                params![id.0],
                student_from_row,
            )
            .optional()?;
        Ok(student)
    }

    /// Logical delete. Returns `false` when nothing active matched.
    pub fn deactivate(&self, id: StudentId) -> RepositoryResult<bool> {
        let conn = self.db.connection()?;
        let updated = conn.execute(
            "UPDATE students SET active = 0 WHERE id = ?1 AND active = 1",
            params![id.0],
        )?;
        Ok(updated > 0)
    }
}

/// Course table access.
#[derive(Clone)]
pub struct CourseRepository {
    db: Database,
}

impl CourseRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn list_active(&self) -> RepositoryResult<Vec<Course>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE active = 1 ORDER BY cycle, code"
        ))?;
        let courses = stmt
            .query_map([], course_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    pub fn active_in_cycle(&self, cycle: u8) -> RepositoryResult<Vec<Course>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE active = 1 AND cycle = ?1 ORDER BY code"
        ))?;
        let courses = stmt
            .query_map(params![cycle], course_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    pub fn find_active(&self, id: CourseId) -> RepositoryResult<Option<Course>> {
        let conn = self.db.connection()?;
        let course = conn
            .query_row(
                &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1 AND active = 1"),
                params![id.0],
                course_from_row,
            )
            .optional()?;
        Ok(course)
    }

    pub fn insert(&self, course: &NewCourse) -> RepositoryResult<Course> {
        let conn = self.db.connection()?;
        let registered_at = Utc::now();
        conn.execute(
            r#"
            INSERT INTO courses (code, name, credits, cycle, active, registered_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5)
            "#,
            params![course.code, course.name, course.credits, course.cycle, registered_at],
        )?;

        Ok(Course {
            id: CourseId(conn.last_insert_rowid()),
            code: course.code.clone(),
            name: course.name.clone(),
            credits: course.credits,
            cycle: course.cycle,
            active: true,
            registered_at,
        })
    }

    pub fn update(&self, id: CourseId, course: &NewCourse) -> RepositoryResult<Option<Course>> {
        let conn = self.db.connection()?;
        let updated = conn.execute(
            r#"
            UPDATE courses SET code = ?1, name = ?2, credits = ?3, cycle = ?4
            WHERE id = ?5 AND active = 1
            "#,
            params![course.code, course.name, course.credits, course.cycle, id.0],
        )?;
        if updated == 0 {
            return Ok(None);
        }

        let course = conn
            .query_row(
                &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1"),
                params![id.0],
                course_from_row,
            )
            .optional()?;
        Ok(course)
    }

    pub fn deactivate(&self, id: CourseId) -> RepositoryResult<bool> {
        let conn = self.db.connection()?;
        let updated = conn.execute(
            "UPDATE courses SET active = 0 WHERE id = ?1 AND active = 1",
            params![id.0],
        )?;
        Ok(updated > 0)
    }
}
