use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminStats {
    #[serde(default, alias = "totalStudents")]
    pub total_students: i64,
    #[serde(default, alias = "totalCompanies")]
    pub total_companies: i64,
    #[serde(default, alias = "totalJobs")]
    pub total_jobs: i64,
    #[serde(default, alias = "activeJobs")]
    pub active_jobs: i64,
    #[serde(default, alias = "totalApplications")]
    pub total_applications: i64,
    #[serde(default, alias = "applicationsByStatus")]
    pub applications_by_status: BTreeMap<String, i64>,
    #[serde(default)]
    pub monthly: Vec<MonthlyPoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthlyPoint {
    pub month: String,
    #[serde(default)]
    pub applications: i64,
    #[serde(default)]
    pub hires: i64,
}
