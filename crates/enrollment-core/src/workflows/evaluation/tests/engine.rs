use std::sync::Arc;

use crate::workflows::enrollment::{EnrollmentId, EnrollmentStatus};
use crate::workflows::evaluation::{EvaluationEngine, EvaluationId, EvaluationRequest};
use crate::workflows::lookup::EntityKind;
use crate::workflows::testing::{ctx, Campus, OutageLookup};
use crate::workflows::WorkflowError;

async fn enrolled(campus: &Campus) -> EnrollmentId {
    let student = campus.student(1);
    let course = campus.course("MAT101", 1);
    campus.enroll(student.id, &[course.id]).await.enrolled[0].enrollment_id
}

fn status_of(campus: &Campus, enrollment_id: EnrollmentId) -> EnrollmentStatus {
    campus
        .services
        .enrollments
        .get(enrollment_id)
        .expect("enrollment readable")
        .status
}

#[tokio::test]
async fn failing_grade_marks_enrollment_failed_and_blocks_second_grade() {
    let campus = Campus::new();
    let enrollment_id = enrolled(&campus).await;

    let graded = campus.grade(enrollment_id, 9.5).await;
    assert!(!graded.evaluation.approved);
    assert_eq!(graded.evaluation.score, 9.5);
    assert_eq!(graded.enrollment_status, EnrollmentStatus::Failed);
    assert_eq!(status_of(&campus, enrollment_id), EnrollmentStatus::Failed);

    let err = campus
        .services
        .evaluations
        .create(
            &ctx(),
            EvaluationRequest {
                enrollment_id,
                score: 15.0,
            },
        )
        .await
        .expect_err("second evaluation");
    assert!(matches!(err, WorkflowError::Conflict(_)));
    assert_eq!(campus.services.evaluations.list().expect("list").len(), 1);
}

#[tokio::test]
async fn passing_grade_marks_enrollment_passed() {
    let campus = Campus::new();
    let enrollment_id = enrolled(&campus).await;
    let graded = campus.grade(enrollment_id, 10.5).await;
    assert!(graded.evaluation.approved);
    assert_eq!(status_of(&campus, enrollment_id), EnrollmentStatus::Passed);
}

#[tokio::test]
async fn invalid_scores_are_rejected_before_lookup() {
    let campus = Campus::new();
    for score in [-1.0, 20.5, f64::NAN] {
        let err = campus
            .services
            .evaluations
            .create(
                &ctx(),
                EvaluationRequest {
                    enrollment_id: EnrollmentId(1),
                    score,
                },
            )
            .await
            .expect_err("invalid score");
        assert!(matches!(err, WorkflowError::InvalidInput(_)));
    }
}

#[tokio::test]
async fn unknown_enrollment_is_not_found() {
    let campus = Campus::new();
    let err = campus
        .services
        .evaluations
        .create(
            &ctx(),
            EvaluationRequest {
                enrollment_id: EnrollmentId(321),
                score: 12.0,
            },
        )
        .await
        .expect_err("unknown enrollment");
    assert!(matches!(err, WorkflowError::NotFound(message) if message == "enrollment 321 not found"));
}

#[tokio::test]
async fn unreachable_enrollment_service_is_an_upstream_failure() {
    let campus = Campus::new();
    let enrollment_id = enrolled(&campus).await;
    let engine = EvaluationEngine::new(
        campus.db.clone(),
        Arc::new(OutageLookup::new(campus.db.clone(), EntityKind::Enrollment)),
    );

    let err = engine
        .create(
            &ctx(),
            EvaluationRequest {
                enrollment_id,
                score: 12.0,
            },
        )
        .await
        .expect_err("enrollment service down");
    assert!(matches!(err, WorkflowError::UpstreamUnavailable(_)));
    assert_eq!(status_of(&campus, enrollment_id), EnrollmentStatus::Enrolled);
}

#[tokio::test]
async fn update_recomputes_status() {
    let campus = Campus::new();
    let enrollment_id = enrolled(&campus).await;
    let graded = campus.grade(enrollment_id, 8.0).await;

    let updated = campus
        .services
        .evaluations
        .update(&ctx(), graded.evaluation.id, 16.0)
        .expect("score updated");
    assert!(updated.evaluation.approved);
    assert_eq!(updated.evaluation.enrollment_id, enrollment_id);
    assert_eq!(status_of(&campus, enrollment_id), EnrollmentStatus::Passed);

    assert!(matches!(
        campus.services.evaluations.update(&ctx(), graded.evaluation.id, 25.0),
        Err(WorkflowError::InvalidInput(_))
    ));
    assert!(matches!(
        campus.services.evaluations.update(&ctx(), EvaluationId(999), 12.0),
        Err(WorkflowError::NotFound(_))
    ));
}

#[tokio::test]
async fn delete_returns_enrollment_to_enrolled() {
    let campus = Campus::new();
    let enrollment_id = enrolled(&campus).await;
    let graded = campus.grade(enrollment_id, 17.0).await;

    campus
        .services
        .evaluations
        .delete(&ctx(), graded.evaluation.id)
        .expect("evaluation deleted");
    assert_eq!(status_of(&campus, enrollment_id), EnrollmentStatus::Enrolled);

    let pending = campus.services.evaluations.pending().expect("pending");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].enrollment_id, enrollment_id);

    assert!(matches!(
        campus.services.evaluations.delete(&ctx(), graded.evaluation.id),
        Err(WorkflowError::NotFound(_))
    ));
}

#[tokio::test]
async fn listing_includes_student_and_course_context() {
    let campus = Campus::new();
    let enrollment_id = enrolled(&campus).await;
    let graded = campus.grade(enrollment_id, 13.5).await;

    let view = campus
        .services
        .evaluations
        .get(graded.evaluation.id)
        .expect("evaluation readable");
    assert_eq!(view.course_code, "MAT101");
    assert_eq!(view.student_name, "Ana Torres Ruiz");
    assert_eq!(view.enrollment_cycle, 1);
    assert!(campus.services.evaluations.pending().expect("pending").is_empty());
}

#[tokio::test]
async fn orphaned_evaluation_is_not_found_and_left_untouched() {
    let campus = Campus::new();
    let enrollment_id = enrolled(&campus).await;
    let graded = campus.grade(enrollment_id, 13.0).await;
    {
        let conn = campus.db.connection().expect("connection");
        conn.execute_batch(&format!(
            "PRAGMA foreign_keys = OFF; DELETE FROM enrollments WHERE id = {};",
            enrollment_id.0
        ))
        .expect("enrollment removed");
    }
    let expected = format!("enrollment {enrollment_id} not found");

    let err = campus
        .services
        .evaluations
        .update(&ctx(), graded.evaluation.id, 5.0)
        .expect_err("missing enrollment");
    assert!(matches!(err, WorkflowError::NotFound(ref message) if *message == expected));

    let err = campus
        .services
        .evaluations
        .delete(&ctx(), graded.evaluation.id)
        .expect_err("missing enrollment");
    assert!(matches!(err, WorkflowError::NotFound(ref message) if *message == expected));

    let conn = campus.db.connection().expect("connection");
    let score: f64 = conn
        .query_row(
            "SELECT score FROM evaluations WHERE id = ?1",
            [graded.evaluation.id.0],
            |row| row.get(0),
        )
        .expect("evaluation kept");
    assert_eq!(score, 13.0);
}
