use std::collections::BTreeMap;

use tracing::info;

use super::domain::{CycleSummary, HistoryFilter, HistoryRecord, StudentHistory};
use crate::context::RequestContext;
use crate::storage::{Database, RepositoryResult};
use crate::workflows::enrollment::{AttemptRecord, EnrollmentRepository};
use crate::workflows::registry::StudentId;
use crate::workflows::WorkflowError;

/// Read-only aggregation over enrollments and evaluations.
#[derive(Clone)]
pub struct HistoryReporter {
    db: Database,
    enrollments: EnrollmentRepository,
}

impl HistoryReporter {
    pub fn new(db: Database) -> Self {
        Self {
            enrollments: EnrollmentRepository::new(db.clone()),
            db,
        }
    }

    /// Unknown students simply have an empty history.
    pub fn history(
        &self,
        ctx: &RequestContext,
        student_id: StudentId,
        filter: HistoryFilter,
    ) -> Result<StudentHistory, WorkflowError> {
        let attempts = self.enrollments.attempts_for_student(student_id)?;
        let cycles = group_by_cycle(&attempts, filter);
        info!(
            trace_id = %ctx.trace_id(),
            student_id = %student_id,
            filter = %filter,
            cycles = cycles.len(),
            "academic history compiled"
        );
        Ok(StudentHistory {
            student_id,
            filter,
            cycles,
        })
    }

    /// Distinct students and enrollments per enrollment cycle.
    pub fn cycle_summary(&self) -> Result<Vec<CycleSummary>, WorkflowError> {
        Ok(self.summary_rows()?)
    }

    fn summary_rows(&self) -> RepositoryResult<Vec<CycleSummary>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT enrollment_cycle, COUNT(DISTINCT student_id), COUNT(id)
            FROM enrollments
            GROUP BY enrollment_cycle
            ORDER BY enrollment_cycle
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CycleSummary {
                    enrollment_cycle: row.get(0)?,
                    students: row.get(1)?,
                    enrollments: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Groups attempts by enrollment cycle, keeping only the most recent cycles the filter allows.
pub fn group_by_cycle(
    attempts: &[AttemptRecord],
    filter: HistoryFilter,
) -> BTreeMap<u8, Vec<HistoryRecord>> {
    let mut cycles: BTreeMap<u8, Vec<HistoryRecord>> = BTreeMap::new();
    for attempt in attempts {
        cycles
            .entry(attempt.enrollment_cycle)
            .or_default()
            .push(HistoryRecord::from(attempt));
    }

    if let Some(limit) = filter.cycle_limit() {
        let keep_from = cycles.keys().rev().take(limit).last().copied();
        if let Some(oldest_kept) = keep_from {
            cycles = cycles.split_off(&oldest_kept);
        }
    }

    for records in cycles.values_mut() {
        records.sort_by(|a, b| {
            a.course_code
                .cmp(&b.course_code)
                .then_with(|| a.attempt_number.cmp(&b.attempt_number))
        });
    }
    cycles
}
