use std::sync::Arc;

use enrollment_core::context::RequestContext;
use enrollment_core::storage::Database;
use enrollment_core::workflows::enrollment::{
    EnrollmentId, EnrollmentRequest, EnrollmentStatus, RejectionReason,
};
use enrollment_core::workflows::evaluation::EvaluationRequest;
use enrollment_core::workflows::lookup::DirectoryLookup;
use enrollment_core::workflows::registry::{Course, CourseDraft, Student, StudentDraft};
use enrollment_core::workflows::reporting::{GradeStatus, HistoryFilter};
use enrollment_core::workflows::AcademicServices;
use tempfile::TempDir;

fn services(db: &Database) -> AcademicServices<DirectoryLookup> {
    AcademicServices::new(db.clone(), Arc::new(DirectoryLookup::new(db.clone())))
}

fn student_draft(cycle: i64) -> StudentDraft {
    StudentDraft {
        first_name: "María".to_string(),
        last_name: "López Sánchez".to_string(),
        age: Some(19),
        dni: "71234567".to_string(),
        email: Some("maria.lopez@univ.edu.pe".to_string()),
        phone: Some("912345678".to_string()),
        current_cycle: Some(cycle),
    }
}

fn course(services: &AcademicServices<DirectoryLookup>, code: &str, cycle: i64) -> Course {
    services
        .registry
        .create_course(CourseDraft {
            code: code.to_string(),
            name: format!("Curso {code}"),
            credits: Some(4),
            cycle: Some(cycle),
        })
        .expect("course created")
}

async fn grade(services: &AcademicServices<DirectoryLookup>, enrollment_id: EnrollmentId, score: f64) {
    services
        .evaluations
        .create(
            &RequestContext::new(),
            EvaluationRequest {
                enrollment_id,
                score,
            },
        )
        .await
        .expect("evaluation recorded");
}

#[tokio::test]
async fn failed_course_is_carried_into_the_next_cycle() {
    let dir = TempDir::new().expect("temp dir");
    let db = Database::open(dir.path().join("academic.db")).expect("database opens");
    let services = services(&db);
    let ctx = RequestContext::new();

    let student: Student = services
        .registry
        .create_student(student_draft(1))
        .expect("student created");
    let calculus = course(&services, "MAT101", 1);
    let physics = course(&services, "FIS101", 1);
    let chemistry = course(&services, "QUI201", 2);

    let first = services
        .enrollments
        .enroll(
            &ctx,
            EnrollmentRequest {
                student_id: student.id,
                courses: vec![calculus.id, physics.id],
            },
        )
        .await
        .expect("first cycle enrollment");
    assert_eq!(first.enrollment_cycle, 1);
    assert_eq!(first.enrolled.len(), 2);
    grade(&services, first.enrolled[0].enrollment_id, 8.0).await;
    grade(&services, first.enrolled[1].enrollment_id, 14.0).await;

    services
        .registry
        .update_student(student.id, student_draft(2))
        .expect("student promoted");

    let plan = services
        .enrollments
        .plan(&ctx, student.id)
        .await
        .expect("plan computed");
    assert_eq!(plan.current_cycle, 2);
    assert_eq!(plan.carry_over_courses.len(), 1);
    assert_eq!(plan.carry_over_courses[0].code, "MAT101");
    assert_eq!(plan.carry_over_courses[0].last_attempt, 1);
    assert_eq!(plan.carry_over_courses[0].last_score, Some(8.0));
    assert_eq!(plan.max_new_courses, 5);
    assert!(plan.can_enroll);
    let available: Vec<&str> = plan.available_courses.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(available, vec!["QUI201"]);

    let second = services
        .enrollments
        .enroll(
            &ctx,
            EnrollmentRequest {
                student_id: student.id,
                courses: vec![calculus.id, chemistry.id],
            },
        )
        .await
        .expect("second cycle enrollment");
    assert_eq!(second.enrollment_cycle, 2);
    let retake = &second.enrolled[0];
    assert_eq!(retake.course_code, "MAT101");
    assert_eq!(retake.attempt_number, 2);
    assert_eq!(retake.home_cycle, 1);
    assert!(retake.is_carry_over);
    assert!(!second.enrolled[1].is_carry_over);

    let repeat = services
        .enrollments
        .enroll(
            &ctx,
            EnrollmentRequest {
                student_id: student.id,
                courses: vec![calculus.id],
            },
        )
        .await
        .expect("duplicate submission processed");
    assert!(repeat.enrolled.is_empty());
    assert_eq!(repeat.rejected[0].reason, RejectionReason::AlreadyEnrolledThisCycle);

    grade(&services, retake.enrollment_id, 12.0).await;
    assert_eq!(
        services
            .enrollments
            .get(retake.enrollment_id)
            .expect("retake readable")
            .status,
        EnrollmentStatus::Passed
    );

    let history = services
        .reports
        .history(&ctx, student.id, HistoryFilter::All)
        .expect("history compiled");
    assert_eq!(history.cycles.len(), 2);
    let first_cycle: Vec<(&str, GradeStatus)> = history.cycles[&1]
        .iter()
        .map(|r| (r.course_code.as_str(), r.status))
        .collect();
    assert_eq!(
        first_cycle,
        vec![("FIS101", GradeStatus::Passed), ("MAT101", GradeStatus::Failed)]
    );
    let second_cycle = &history.cycles[&2];
    assert_eq!(second_cycle[0].course_code, "MAT101");
    assert_eq!(second_cycle[0].status, GradeStatus::Passed);
    assert_eq!(second_cycle[1].status, GradeStatus::NoGradeYet);
    assert!(second_cycle[0].evaluated_at.is_some());
    assert_eq!(second_cycle[1].evaluated_at, None);

    let latest = services
        .reports
        .history(&ctx, student.id, HistoryFilter::Last)
        .expect("latest cycle");
    assert_eq!(latest.cycles.keys().copied().collect::<Vec<_>>(), vec![2]);

    let plan = services
        .enrollments
        .plan(&ctx, student.id)
        .await
        .expect("plan after passing retake");
    assert!(plan.carry_over_courses.is_empty());
    assert!(plan.available_courses.is_empty());

    let summary = services.reports.cycle_summary().expect("summary");
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].enrollment_cycle, 1);
    assert_eq!(summary[0].students, 1);
    assert_eq!(summary[0].enrollments, 2);
    assert_eq!(summary[1].enrollments, 2);
}

#[tokio::test]
async fn records_survive_reopening_the_database() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("academic.db");
    let student_id = {
        let db = Database::open(&path).expect("database opens");
        let services = services(&db);
        let student = services
            .registry
            .create_student(student_draft(3))
            .expect("student created");
        let lab = course(&services, "LAB301", 3);
        services
            .enrollments
            .enroll(
                &RequestContext::new(),
                EnrollmentRequest {
                    student_id: student.id,
                    courses: vec![lab.id],
                },
            )
            .await
            .expect("enrollment accepted");
        student.id
    };

    let db = Database::open(&path).expect("database reopens");
    let services = services(&db);
    let enrollments = services.enrollments.list().expect("enrollments listed");
    assert_eq!(enrollments.len(), 1);
    assert_eq!(enrollments[0].student_id, student_id);
    assert_eq!(enrollments[0].enrollment_cycle, 3);
    assert_eq!(services.evaluations.pending().expect("pending").len(), 1);
}
