//! Field validation for registration payloads.
//!
//! Every rule is checked so clients receive the full list of problems in one response.

use super::domain::{CourseDraft, NewCourse, NewStudent, StudentDraft, MAX_CYCLE, MIN_CYCLE};

pub const MIN_STUDENT_AGE: i64 = 16;
pub const MAX_STUDENT_AGE: i64 = 120;
pub const DNI_DIGITS: usize = 8;
pub const PHONE_DIGITS: usize = 9;
pub const MIN_CREDITS: i64 = 1;
pub const MAX_CREDITS: i64 = 5;

pub fn validate_student(draft: &StudentDraft) -> Result<NewStudent, Vec<String>> {
    let mut errors = Vec::new();

    let first_name = draft.first_name.trim();
    check_person_name(first_name, "first_name", &mut errors);
    let last_name = draft.last_name.trim();
    check_person_name(last_name, "last_name", &mut errors);

    let dni = draft.dni.trim();
    if dni.is_empty() {
        errors.push("dni is required".to_string());
    } else if !is_digits(dni) {
        errors.push("dni may only contain digits".to_string());
    } else if dni.len() != DNI_DIGITS {
        errors.push(format!("dni must have exactly {DNI_DIGITS} digits"));
    }

    let age = match draft.age {
        None => {
            errors.push("age is required".to_string());
            None
        }
        Some(age) if age < MIN_STUDENT_AGE => {
            errors.push(format!("minimum enrollment age is {MIN_STUDENT_AGE}"));
            None
        }
        Some(age) if age > MAX_STUDENT_AGE => {
            errors.push(format!("age must be at most {MAX_STUDENT_AGE}"));
            None
        }
        Some(age) => u8::try_from(age).ok(),
    };

    let phone = non_blank(draft.phone.as_deref());
    if let Some(phone) = &phone {
        if !is_digits(phone) {
            errors.push("phone may only contain digits".to_string());
        }
        if phone.chars().count() != PHONE_DIGITS {
            errors.push(format!("phone must have exactly {PHONE_DIGITS} digits"));
        }
        if !phone.starts_with('9') {
            errors.push("phone must start with 9".to_string());
        }
    }

    let current_cycle = match draft.current_cycle {
        None => Some(MIN_CYCLE),
        Some(cycle) => {
            let cycle = cycle_in_range(cycle);
            if cycle.is_none() {
                errors.push(format!(
                    "current_cycle must be between {MIN_CYCLE} and {MAX_CYCLE}"
                ));
            }
            cycle
        }
    };

    match (age, current_cycle) {
        (Some(age), Some(current_cycle)) if errors.is_empty() => Ok(NewStudent {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age,
            dni: dni.to_string(),
            email: non_blank(draft.email.as_deref()),
            phone,
            current_cycle,
        }),
        _ => Err(errors),
    }
}

pub fn validate_course(draft: &CourseDraft) -> Result<NewCourse, Vec<String>> {
    let mut errors = Vec::new();

    let code = draft.code.trim();
    if code.is_empty() {
        errors.push("code is required".to_string());
    }
    let name = draft.name.trim();
    if name.is_empty() {
        errors.push("name is required".to_string());
    }

    let credits = draft
        .credits
        .filter(|credits| (MIN_CREDITS..=MAX_CREDITS).contains(credits))
        .and_then(|credits| u8::try_from(credits).ok());
    if credits.is_none() {
        errors.push(format!(
            "credits must be between {MIN_CREDITS} and {MAX_CREDITS}"
        ));
    }

    let cycle = draft.cycle.and_then(cycle_in_range);
    if cycle.is_none() {
        errors.push(format!("cycle must be between {MIN_CYCLE} and {MAX_CYCLE}"));
    }

    match (credits, cycle) {
        (Some(credits), Some(cycle)) if errors.is_empty() => Ok(NewCourse {
            code: code.to_uppercase(),
            name: name.to_string(),
            credits,
            cycle,
        }),
        _ => Err(errors),
    }
}

fn check_person_name(value: &str, field: &str, errors: &mut Vec<String>) {
    if value.is_empty() {
        errors.push(format!("{field} is required"));
    } else if !value.chars().all(|c| c.is_alphabetic() || c == ' ') {
        errors.push(format!("{field} may only contain letters and spaces"));
    }
}

fn cycle_in_range(cycle: i64) -> Option<u8> {
    u8::try_from(cycle)
        .ok()
        .filter(|cycle| (MIN_CYCLE..=MAX_CYCLE).contains(cycle))
}

fn is_digits(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_digit())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
