//! Demo catalog used to populate an empty database.
//!
//! Records go through the registry, the enrollment writer and the evaluation engine,
//! so seeded data obeys the same rules as data entered over HTTP.

use clap::Args;
use enrollment_core::context::RequestContext;
use enrollment_core::error::AppError;
use enrollment_core::workflows::enrollment::{EnrollmentId, EnrollmentRequest};
use enrollment_core::workflows::evaluation::EvaluationRequest;
use enrollment_core::workflows::lookup::EntityLookup;
use enrollment_core::workflows::registry::{CourseDraft, CourseId, StudentDraft, StudentId};
use enrollment_core::workflows::{AcademicServices, WorkflowError};
use tracing::info;

use crate::infra::{offline_services, open_database};

#[derive(Args, Debug, Default)]
pub(crate) struct SeedArgs {
    /// Override the configured SQLite database path
    #[arg(long)]
    pub(crate) database: Option<String>,
}

/// first name, last name, age, dni, email, phone, current cycle
type StudentRow = (&'static str, &'static str, i64, &'static str, &'static str, &'static str, i64);

const STUDENTS: &[StudentRow] = &[
    ("Juan", "Pérez García", 20, "72345678", "juan.perez@univ.edu.pe", "987654321", 1),
    ("María", "López Torres", 19, "73456789", "maria.lopez@univ.edu.pe", "987654322", 1),
    ("Carlos", "Ramírez Silva", 21, "74567890", "carlos.ramirez@univ.edu.pe", "987654323", 2),
    ("Ana", "Mendoza Flores", 20, "75678901", "ana.mendoza@univ.edu.pe", "987654324", 2),
    ("Luis", "Castillo Rojas", 22, "76789012", "luis.castillo@univ.edu.pe", "987654325", 3),
    ("Rosa", "Vega Morales", 19, "77890123", "rosa.vega@univ.edu.pe", "987654326", 1),
    ("Pedro", "Sánchez Cruz", 21, "78901234", "pedro.sanchez@univ.edu.pe", "987654327", 4),
    ("Laura", "Díaz Paredes", 20, "79012345", "laura.diaz@univ.edu.pe", "987654328", 3),
    ("Diego", "Fernández Quispe", 22, "70123456", "diego.fernandez@univ.edu.pe", "987654329", 5),
    ("Sofía", "Martínez Ramos", 19, "71234567", "sofia.martinez@univ.edu.pe", "987654330", 2),
    ("Miguel", "Torres Vargas", 21, "70234567", "miguel.torres@univ.edu.pe", "987654331", 3),
];

/// code, name, credits, cycle
const COURSES: &[(&str, &str, i64, i64)] = &[
    ("MAT101", "Matemática Básica", 4, 1),
    ("LEN101", "Lenguaje y Comunicación", 3, 1),
    ("FIS101", "Física I", 4, 1),
    ("QUI101", "Química General", 4, 1),
    ("INF101", "Introducción a la Informática", 3, 1),
    ("SOC101", "Realidad Nacional", 2, 1),
    ("MAT201", "Cálculo I", 5, 2),
    ("FIS201", "Física II", 4, 2),
    ("QUI201", "Química Orgánica", 4, 2),
    ("INF201", "Programación I", 4, 2),
    ("EST201", "Estadística I", 3, 2),
    ("ADM201", "Administración General", 3, 2),
    ("MAT301", "Cálculo II", 5, 3),
    ("INF301", "Programación II", 4, 3),
    ("EST301", "Estadística II", 3, 3),
    ("BD301", "Base de Datos I", 4, 3),
    ("ALG301", "Algoritmos y Estructuras de Datos", 4, 3),
    ("ING301", "Inglés Técnico I", 2, 3),
    ("MAT401", "Matemática Discreta", 4, 4),
    ("INF401", "Programación Orientada a Objetos", 4, 4),
    ("BD401", "Base de Datos II", 4, 4),
    ("RED401", "Redes de Computadoras I", 4, 4),
    ("SIS401", "Análisis de Sistemas I", 4, 4),
    ("ING401", "Inglés Técnico II", 2, 4),
    ("ARQ501", "Arquitectura de Computadoras", 4, 5),
    ("WEB501", "Desarrollo Web I", 4, 5),
    ("SIS501", "Análisis de Sistemas II", 4, 5),
    ("RED501", "Redes de Computadoras II", 4, 5),
    ("SEG501", "Seguridad Informática", 3, 5),
    ("GES501", "Gestión de Proyectos I", 3, 5),
    ("WEB601", "Desarrollo Web II", 4, 6),
    ("MOV601", "Desarrollo Móvil", 4, 6),
    ("IA601", "Inteligencia Artificial I", 4, 6),
    ("ARQ601", "Arquitectura de Software", 4, 6),
    ("CAL601", "Calidad de Software", 3, 6),
    ("GES601", "Gestión de Proyectos II", 3, 6),
    ("IA701", "Inteligencia Artificial II", 4, 7),
    ("BIG701", "Big Data", 4, 7),
    ("CLO701", "Computación en la Nube", 4, 7),
    ("IOT701", "Internet de las Cosas", 4, 7),
    ("ETI701", "Ética Profesional", 2, 7),
    ("INV701", "Metodología de la Investigación", 3, 7),
    ("TEL801", "Telecomunicaciones", 4, 8),
    ("AUD801", "Auditoría de Sistemas", 4, 8),
    ("EMP801", "Emprendimiento Digital", 3, 8),
    ("TES801", "Tesis I", 4, 8),
    ("ELE801", "Electivo I", 3, 8),
    ("TIC801", "Tecnologías Emergentes", 3, 8),
    ("TES901", "Tesis II", 5, 9),
    ("GOB901", "Gobierno de TI", 4, 9),
    ("BUS901", "Business Intelligence", 4, 9),
    ("ELE901", "Electivo II", 3, 9),
    ("SEM901", "Seminario de Investigación", 3, 9),
    ("PRA901", "Prácticas Pre-Profesionales", 4, 9),
    ("TES1001", "Tesis III", 5, 10),
    ("GER1001", "Gerencia de Proyectos TI", 4, 10),
    ("INN1001", "Innovación Tecnológica", 3, 10),
    ("ELE1001", "Electivo III", 3, 10),
    ("INT1001", "Integración de Sistemas", 4, 10),
    ("SUS1001", "Sustentación de Tesis", 3, 10),
];

/// Student position and the course positions enrolled in their current cycle.
const ENROLLMENTS: &[(usize, &[usize])] = &[
    (0, &[0, 1, 4]),
    (1, &[0, 1, 2, 4]),
    (2, &[6, 7, 9, 10]),
    (3, &[6, 9, 11]),
    (4, &[12, 13, 15, 16, 17]),
];

/// Scores in enrollment order; the remaining enrollments stay ungraded.
const SCORES: &[f64] = &[
    15.5, 12.0, 14.5, 16.0, 13.5, 9.5, 15.0, 14.0, 11.5, 17.0, 13.0, 10.5, 16.5, 8.0,
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub students: usize,
    pub courses: usize,
    pub enrollments: usize,
    pub evaluations: usize,
}

/// Loads the demo catalog. Refuses to touch a database that already has students.
pub async fn seed_catalog<L>(
    services: &AcademicServices<L>,
    ctx: &RequestContext,
) -> Result<SeedSummary, WorkflowError>
where
    L: EntityLookup + 'static,
{
    if !services.registry.list_students()?.is_empty() {
        return Err(WorkflowError::Conflict(
            "database already contains students; seed only runs on an empty catalog".to_string(),
        ));
    }

    let mut student_ids: Vec<StudentId> = Vec::with_capacity(STUDENTS.len());
    for (first_name, last_name, age, dni, email, phone, cycle) in STUDENTS.iter().copied() {
        let student = services.registry.create_student(StudentDraft {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age: Some(age),
            dni: dni.to_string(),
            email: Some(email.to_string()),
            phone: Some(phone.to_string()),
            current_cycle: Some(cycle),
        })?;
        student_ids.push(student.id);
    }

    let mut course_ids: Vec<CourseId> = Vec::with_capacity(COURSES.len());
    for (code, name, credits, cycle) in COURSES.iter().copied() {
        let course = services.registry.create_course(CourseDraft {
            code: code.to_string(),
            name: name.to_string(),
            credits: Some(credits),
            cycle: Some(cycle),
        })?;
        course_ids.push(course.id);
    }

    let mut enrollment_ids: Vec<EnrollmentId> = Vec::new();
    for (student, courses) in ENROLLMENTS.iter().copied() {
        let receipt = services
            .enrollments
            .enroll(
                ctx,
                EnrollmentRequest {
                    student_id: student_ids[student],
                    courses: courses.iter().map(|position| course_ids[*position]).collect(),
                },
            )
            .await?;
        enrollment_ids.extend(receipt.enrolled.iter().map(|course| course.enrollment_id));
    }

    let mut evaluations = 0;
    for (enrollment_id, score) in enrollment_ids.iter().copied().zip(SCORES.iter().copied()) {
        services
            .evaluations
            .create(
                ctx,
                EvaluationRequest {
                    enrollment_id,
                    score,
                },
            )
            .await?;
        evaluations += 1;
    }

    let summary = SeedSummary {
        students: student_ids.len(),
        courses: course_ids.len(),
        enrollments: enrollment_ids.len(),
        evaluations,
    };
    info!(
        trace_id = %ctx.trace_id(),
        students = summary.students,
        courses = summary.courses,
        enrollments = summary.enrollments,
        evaluations = summary.evaluations,
        "demo catalog seeded"
    );
    Ok(summary)
}

pub(crate) async fn run_seed(args: SeedArgs) -> Result<(), AppError> {
    let config = crate::cli::load_config(args.database)?;
    let db = open_database(&config)?;
    let services = offline_services(&db);

    let summary = seed_catalog(&services, &RequestContext::new())
        .await
        .map_err(|err| AppError::Command(format!("seed failed: {err}")))?;

    println!("Seeded {}", config.database.path);
    println!("  students:    {}", summary.students);
    println!("  courses:     {}", summary.courses);
    println!("  enrollments: {}", summary.enrollments);
    println!("  evaluations: {}", summary.evaluations);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use enrollment_core::storage::Database;
    use enrollment_core::workflows::enrollment::EnrollmentStatus;

    #[tokio::test]
    async fn seeds_the_demo_catalog_once() {
        let db = Database::in_memory().expect("in-memory database");
        let services = offline_services(&db);
        let ctx = RequestContext::new();

        let summary = seed_catalog(&services, &ctx).await.expect("catalog seeded");
        assert_eq!(
            summary,
            SeedSummary {
                students: 11,
                courses: 60,
                enrollments: 19,
                evaluations: 14,
            }
        );

        let enrollments = services.enrollments.list().expect("enrollments listed");
        let failed = enrollments
            .iter()
            .filter(|e| e.status == EnrollmentStatus::Failed)
            .count();
        let open = enrollments
            .iter()
            .filter(|e| e.status == EnrollmentStatus::Enrolled)
            .count();
        assert_eq!(failed, 2);
        assert_eq!(open, 5);

        let again = seed_catalog(&services, &ctx).await.expect_err("already seeded");
        assert!(matches!(again, WorkflowError::Conflict(_)));
    }
}
