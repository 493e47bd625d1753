//! Demo content served when the backend cannot be reached.

use crate::models::application::{Application, ApplicationStatus};
use crate::models::company::Company;
use crate::models::external_job::ExternalJob;
use crate::models::job::Job;
use crate::models::stats::{AdminStats, MonthlyPoint};
use std::collections::BTreeMap;

pub fn jobs() -> Vec<Job> {
    vec![
        demo_job(
            "demo-job-1",
            "Desarrollador Backend Junior",
            "Construcción de APIs REST y mantenimiento de servicios internos.",
            "Conocimientos de SQL, Git y al menos un lenguaje de backend.",
            "Santa Cruz de la Sierra",
            "full_time",
            "demo-company-1",
            "Tecnologías Andinas S.R.L.",
        ),
        demo_job(
            "demo-job-2",
            "Pasante de Análisis de Datos",
            "Apoyo en la elaboración de reportes y tableros de indicadores.",
            "Excel avanzado, nociones de Python o R.",
            "Santa Cruz de la Sierra",
            "internship",
            "demo-company-2",
            "Banco Oriental",
        ),
        demo_job(
            "demo-job-3",
            "Desarrollador Frontend",
            "Desarrollo de interfaces web accesibles y responsivas.",
            "HTML, CSS, JavaScript y experiencia con algún framework moderno.",
            "Remoto",
            "part_time",
            "demo-company-1",
            "Tecnologías Andinas S.R.L.",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn demo_job(
    id: &str,
    title: &str,
    description: &str,
    requirements: &str,
    location: &str,
    job_type: &str,
    company_id: &str,
    company_name: &str,
) -> Job {
    Job {
        id: id.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        requirements: Some(requirements.to_string()),
        location: Some(location.to_string()),
        salary_min: Some(3000.0),
        salary_max: Some(6000.0),
        job_type: Some(job_type.to_string()),
        is_active: true,
        deadline: None,
        company_id: Some(company_id.to_string()),
        company_name: Some(company_name.to_string()),
        applications_count: Some(0),
        created_at: None,
    }
}

pub fn companies() -> Vec<Company> {
    vec![
        Company {
            id: "demo-company-1".to_string(),
            name: "Tecnologías Andinas S.R.L.".to_string(),
            industry: Some("Software".to_string()),
            description: Some("Consultora de desarrollo de software.".to_string()),
            website: None,
            location: Some("Santa Cruz de la Sierra".to_string()),
            logo_url: None,
            is_verified: true,
        },
        Company {
            id: "demo-company-2".to_string(),
            name: "Banco Oriental".to_string(),
            industry: Some("Finanzas".to_string()),
            description: Some("Entidad financiera regional.".to_string()),
            website: None,
            location: Some("Santa Cruz de la Sierra".to_string()),
            logo_url: None,
            is_verified: true,
        },
    ]
}

pub fn applications_for_student(student_id: &str) -> Vec<Application> {
    vec![Application {
        id: "demo-application-1".to_string(),
        job_id: "demo-job-1".to_string(),
        student_id: student_id.to_string(),
        status: ApplicationStatus::Reviewed,
        cover_letter: None,
        resume_url: None,
        job_title: Some("Desarrollador Backend Junior".to_string()),
        applied_at: None,
        reviewed_at: None,
        interview_at: None,
        technical_test_at: None,
        final_interview_at: None,
        decided_at: None,
        updated_at: None,
    }]
}

pub fn admin_stats() -> AdminStats {
    let mut by_status = BTreeMap::new();
    for (status, count) in [
        (ApplicationStatus::Applied, 42),
        (ApplicationStatus::Reviewed, 18),
        (ApplicationStatus::Interview, 9),
        (ApplicationStatus::TechnicalTest, 6),
        (ApplicationStatus::FinalInterview, 3),
        (ApplicationStatus::Accepted, 4),
        (ApplicationStatus::Rejected, 11),
        (ApplicationStatus::Withdrawn, 2),
    ] {
        by_status.insert(status.as_str().to_string(), count);
    }
    AdminStats {
        total_students: 320,
        total_companies: 24,
        total_jobs: 57,
        active_jobs: 31,
        total_applications: by_status.values().sum(),
        applications_by_status: by_status,
        monthly: ["2026-05", "2026-06", "2026-07", "2026-08", "2026-09"]
            .iter()
            .zip([12, 19, 15, 23, 26])
            .zip([1, 0, 2, 1, 0])
            .map(|((month, applications), hires)| MonthlyPoint {
                month: month.to_string(),
                applications,
                hires,
            })
            .collect(),
    }
}

pub fn external_jobs() -> Vec<ExternalJob> {
    [
        ("Software Engineer Intern", "Jalasoft", "Santa Cruz, Bolivia"),
        ("QA Automation Trainee", "Unosquare", "Cochabamba, Bolivia"),
        ("Data Analyst Junior", "Banco Ganadero", "Santa Cruz, Bolivia"),
    ]
    .iter()
    .map(|(title, company, location)| ExternalJob {
        title: title.to_string(),
        company: company.to_string(),
        location: Some(location.to_string()),
        url: None,
        posted_at: None,
        source: "demo".to_string(),
    })
    .collect()
}
