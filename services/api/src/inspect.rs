use std::fmt::Write;

use clap::Args;
use enrollment_core::context::RequestContext;
use enrollment_core::error::AppError;
use enrollment_core::workflows::enrollment::EnrollmentPlan;
use enrollment_core::workflows::registry::StudentId;
use enrollment_core::workflows::reporting::{HistoryFilter, StudentHistory};
use enrollment_core::workflows::WorkflowError;

use crate::infra::{offline_services, open_database};

#[derive(Args, Debug)]
pub(crate) struct PlanArgs {
    /// Student whose next enrollment is being planned
    #[arg(long)]
    pub(crate) student: i64,
    /// Override the configured SQLite database path
    #[arg(long)]
    pub(crate) database: Option<String>,
    /// Print the plan as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct HistoryArgs {
    /// Student whose academic history is printed
    #[arg(long)]
    pub(crate) student: i64,
    /// Recency window: ALL, LAST or LAST_3
    #[arg(long, default_value = "ALL")]
    pub(crate) filter: String,
    /// Override the configured SQLite database path
    #[arg(long)]
    pub(crate) database: Option<String>,
    /// Print the history as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_plan(args: PlanArgs) -> Result<(), AppError> {
    let config = crate::cli::load_config(args.database)?;
    let services = offline_services(&open_database(&config)?);

    let plan = services
        .enrollments
        .plan(&RequestContext::new(), StudentId(args.student))
        .await
        .map_err(|err| AppError::Command(err.to_string()))?;

    if args.json {
        println!("{}", to_json(&plan)?);
    } else {
        print!("{}", render_plan(&plan));
    }
    Ok(())
}

pub(crate) fn run_history(args: HistoryArgs) -> Result<(), AppError> {
    let filter: HistoryFilter = args
        .filter
        .parse()
        .map_err(|err: WorkflowError| AppError::Command(err.to_string()))?;
    let config = crate::cli::load_config(args.database)?;
    let services = offline_services(&open_database(&config)?);

    let history = services
        .reports
        .history(&RequestContext::new(), StudentId(args.student), filter)
        .map_err(|err| AppError::Command(err.to_string()))?;

    if args.json {
        println!("{}", to_json(&history)?);
    } else {
        print!("{}", render_history(&history));
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| AppError::Command(format!("failed to encode output: {err}")))
}

pub(crate) fn render_plan(plan: &EnrollmentPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Enrollment plan for student {} (cycle {})",
        plan.student_id, plan.current_cycle
    );

    if plan.carry_over_courses.is_empty() {
        let _ = writeln!(out, "\nNo carry-over courses");
    } else {
        let _ = writeln!(out, "\nCarry-over courses");
        for course in &plan.carry_over_courses {
            let score = course
                .last_score
                .map(|score| format!("{score:.1}"))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "  - {} {} (cycle {}, attempt {}, last score {})",
                course.code, course.name, course.home_cycle, course.last_attempt, score
            );
        }
    }

    let _ = writeln!(out, "\nAvailable courses");
    if plan.available_courses.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for course in &plan.available_courses {
        let _ = writeln!(
            out,
            "  - {} {} ({} credits)",
            course.code, course.name, course.credits
        );
    }

    let _ = writeln!(out, "\nNew courses allowed: {}", plan.max_new_courses);
    match &plan.reason {
        Some(reason) => {
            let _ = writeln!(out, "Enrollment blocked: {reason}");
        }
        None if plan.can_enroll => {
            let _ = writeln!(out, "Enrollment open");
        }
        None => {}
    }
    out
}

pub(crate) fn render_history(history: &StudentHistory) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Academic history for student {} ({})",
        history.student_id, history.filter
    );
    if history.cycles.is_empty() {
        let _ = writeln!(out, "\nNo enrollments recorded");
        return out;
    }

    for (cycle, records) in &history.cycles {
        let _ = writeln!(out, "\nCycle {cycle}");
        for record in records {
            let score = record
                .score
                .map(|score| format!("{score:>5.1}"))
                .unwrap_or_else(|| "    -".to_string());
            let carry = if record.is_carry_over { " [carry-over]" } else { "" };
            let _ = writeln!(
                out,
                "  {:<8} {:<40} attempt {} {} {}{}",
                record.course_code,
                record.course_name,
                record.attempt_number,
                score,
                record.status.label(),
                carry
            );
        }
    }
    out
}
