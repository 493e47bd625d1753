use serde::{Deserialize, Serialize};

/// Everything a résumé template needs. Each part is optional because the
/// backend serves them from separate endpoints that may fail independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CvBundle {
    #[serde(default)]
    pub student: Option<StudentProfile>,
    #[serde(default)]
    pub academic: Option<AcademicInfo>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StudentProfile {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default, alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "linkedinUrl")]
    pub linkedin_url: Option<String>,
    #[serde(default, alias = "githubUrl")]
    pub github_url: Option<String>,
    #[serde(default, alias = "cvUrl")]
    pub cv_url: Option<String>,
}

impl StudentProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AcademicInfo {
    #[serde(default)]
    pub career: Option<String>,
    #[serde(default)]
    pub semester: Option<u32>,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default, alias = "registrationNumber")]
    pub registration_number: Option<String>,
    #[serde(default, alias = "graduationYear")]
    pub graduation_year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Certification {
    pub name: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default, alias = "issuedAt")]
    pub issued_at: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}
