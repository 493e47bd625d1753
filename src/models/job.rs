use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "salaryMin")]
    pub salary_min: Option<f64>,
    #[serde(default, alias = "salaryMax")]
    pub salary_max: Option<f64>,
    #[serde(default, rename = "type", alias = "job_type")]
    pub job_type: Option<String>,
    #[serde(default = "default_active", alias = "isActive")]
    pub is_active: bool,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, alias = "companyId")]
    pub company_id: Option<String>,
    #[serde(default, alias = "companyName")]
    pub company_name: Option<String>,
    #[serde(default, alias = "applicationsCount")]
    pub applications_count: Option<i64>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl Job {
    pub fn matches(&self, filter: &JobFilter) -> bool {
        if filter.active_only.unwrap_or(false) && !self.is_active {
            return false;
        }
        if let Some(search) = filter.search.as_deref().map(str::to_lowercase) {
            let in_title = self.title.to_lowercase().contains(&search);
            let in_description = self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&search))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }
        if let Some(location) = filter.location.as_deref().map(str::to_lowercase) {
            let here = self.location.as_deref().unwrap_or("").to_lowercase();
            if !here.contains(&location) {
                return false;
            }
        }
        if let Some(job_type) = filter.job_type.as_deref() {
            if self.job_type.as_deref() != Some(job_type) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobFilter {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub active_only: Option<bool>,
}
