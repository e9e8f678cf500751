use crate::workflows::registry::StudentId;
use crate::workflows::testing::{ctx, Campus};
use crate::workflows::WorkflowError;

#[tokio::test]
async fn failed_course_is_carried_until_passed() {
    let campus = Campus::new();
    let student = campus.student(1);
    let physics = campus.course("FIS101", 1);
    campus.course("MAT201", 2);
    campus.course("FIS201", 2);

    let first = campus.enroll(student.id, &[physics.id]).await;
    campus.grade(first.enrolled[0].enrollment_id, 9.5).await;
    campus.move_to_cycle(student.id, 2);

    let plan = campus
        .services
        .enrollments
        .plan(&ctx(), student.id)
        .await
        .expect("plan computed");
    assert_eq!(plan.current_cycle, 2);
    assert_eq!(plan.carry_over_courses.len(), 1);
    assert_eq!(plan.carry_over_courses[0].code, "FIS101");
    assert_eq!(plan.carry_over_courses[0].last_score, Some(9.5));
    assert_eq!(plan.max_new_courses, 5);
    assert!(plan.can_enroll);
    assert!(plan.reason.is_none());
    let available: Vec<&str> = plan
        .available_courses
        .iter()
        .map(|course| course.code.as_str())
        .collect();
    assert_eq!(available, vec!["FIS201", "MAT201"]);

    let retake = campus.enroll(student.id, &[physics.id]).await;
    assert!(retake.enrolled[0].is_carry_over);
    assert_eq!(retake.enrolled[0].attempt_number, 2);
    campus.grade(retake.enrolled[0].enrollment_id, 13.0).await;

    let plan = campus
        .services
        .enrollments
        .plan(&ctx(), student.id)
        .await
        .expect("plan computed");
    assert!(plan.carry_over_courses.is_empty());
    assert_eq!(plan.max_new_courses, 6);
}

#[tokio::test]
async fn six_carry_overs_block_new_enrollment() {
    let campus = Campus::new();
    let student = campus.student(1);
    let ids: Vec<_> = ["MAT101", "LEN101", "FIS101", "QUI101", "INF101", "SOC101"]
        .iter()
        .map(|code| campus.course(code, 1).id)
        .collect();

    let receipt = campus.enroll(student.id, &ids).await;
    for enrolled in &receipt.enrolled {
        campus.grade(enrolled.enrollment_id, 6.0).await;
    }
    campus.move_to_cycle(student.id, 2);

    let plan = campus
        .services
        .enrollments
        .plan(&ctx(), student.id)
        .await
        .expect("plan computed");
    assert_eq!(plan.carry_over_courses.len(), 6);
    assert_eq!(plan.max_new_courses, 0);
    assert!(!plan.can_enroll);
    assert!(plan.reason.is_some());
}

#[tokio::test]
async fn courses_currently_held_are_not_offered_again() {
    let campus = Campus::new();
    let student = campus.student(1);
    let math = campus.course("MAT101", 1);
    campus.course("LEN101", 1);

    campus.enroll(student.id, &[math.id]).await;

    let plan = campus
        .services
        .enrollments
        .plan(&ctx(), student.id)
        .await
        .expect("plan computed");
    let available: Vec<&str> = plan
        .available_courses
        .iter()
        .map(|course| course.code.as_str())
        .collect();
    assert_eq!(available, vec!["LEN101"]);
    assert!(plan.carry_over_courses.is_empty());
}

#[tokio::test]
async fn planning_for_unknown_student_is_not_found() {
    let campus = Campus::new();
    let err = campus
        .services
        .enrollments
        .plan(&ctx(), StudentId(12))
        .await
        .expect_err("unknown student");
    assert!(matches!(err, WorkflowError::NotFound(_)));
}
