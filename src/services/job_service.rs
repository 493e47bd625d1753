use crate::dto::envelope::{ApiResponse, Sourced};
use crate::dto::job_dto::{CreateJobPayload, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job::{Job, JobFilter};
use crate::services::backend_service::BackendClient;
use crate::services::mock_data;
use serde_json::Value as JsonValue;

#[derive(Clone)]
pub struct JobService {
    backend: BackendClient,
}

impl JobService {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Lists jobs, filtering on this side as well since older backend builds
    /// ignore the query string. Falls back to demo jobs.
    pub async fn list(&self, filter: &JobFilter) -> Sourced<Vec<Job>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(search) = &filter.search {
            query.push(("search", search.clone()));
        }
        if let Some(location) = &filter.location {
            query.push(("location", location.clone()));
        }
        if let Some(job_type) = &filter.job_type {
            query.push(("type", job_type.clone()));
        }
        if filter.active_only.unwrap_or(false) {
            query.push(("active", "true".to_string()));
        }

        let resp: ApiResponse<Vec<Job>> = self.backend.get_query("jobs", &query).await;
        let mut sourced = resp.or_demo("jobs", mock_data::jobs);
        sourced.data.retain(|job| job.matches(filter));
        sourced
    }

    pub async fn get(&self, id: &str) -> ApiResponse<Job> {
        self.backend.get(&format!("jobs/{}", id)).await
    }

    pub async fn list_by_company(&self, company_id: &str) -> ApiResponse<Vec<Job>> {
        self.backend
            .get(&format!("companies/{}/jobs", company_id))
            .await
    }

    pub async fn create(&self, payload: &CreateJobPayload) -> Result<Job> {
        if !payload.salary_range_is_valid() {
            return Err(Error::BadRequest(
                "salary_min must not exceed salary_max".to_string(),
            ));
        }
        self.backend.post("jobs", payload).await.into_result()
    }

    pub async fn update(&self, id: &str, payload: &UpdateJobPayload) -> Result<Job> {
        if let (Some(min), Some(max)) = (payload.salary_min, payload.salary_max) {
            if min > max {
                return Err(Error::BadRequest(
                    "salary_min must not exceed salary_max".to_string(),
                ));
            }
        }
        self.backend
            .patch(&format!("jobs/{}", id), payload)
            .await
            .into_result()
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let resp: ApiResponse<JsonValue> = self.backend.delete(&format!("jobs/{}", id)).await;
        resp.map(|_| ()).into_result()
    }
}
