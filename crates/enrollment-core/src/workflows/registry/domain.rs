use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_CYCLE: u8 = 1;
pub const MAX_CYCLE: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub i64);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub i64);

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered student as exposed by the student service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub dni: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub current_cycle: u8,
    pub active: bool,
    pub registered_at: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Course offered in one home cycle of the curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    pub credits: u8,
    pub cycle: u8,
    pub active: bool,
    pub registered_at: DateTime<Utc>,
}

/// Raw student payload as submitted by clients; see [`super::validation::validate_student`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentDraft {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub age: Option<i64>,
    #[serde(default)]
    pub dni: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub current_cycle: Option<i64>,
}

/// Raw course payload as submitted by clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseDraft {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub credits: Option<i64>,
    pub cycle: Option<i64>,
}

/// Student fields that passed validation and are ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub dni: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub current_cycle: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub code: String,
    pub name: String,
    pub credits: u8,
    pub cycle: u8,
}
