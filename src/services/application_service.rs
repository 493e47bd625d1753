use crate::dto::application_dto::{ApplyPayload, UpdateStatusPayload};
use crate::dto::envelope::{ApiResponse, Sourced};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationHistoryEntry, ApplicationStatus};
use crate::services::backend_service::BackendClient;
use crate::services::mock_data;
use crate::utils::time::now;
use serde_json::json;

#[derive(Clone)]
pub struct ApplicationService {
    backend: BackendClient,
}

impl ApplicationService {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub async fn apply(&self, student_id: &str, payload: &ApplyPayload) -> Result<Application> {
        if payload.cover_letter.trim().is_empty() {
            return Err(Error::BadRequest("A cover letter is required".to_string()));
        }

        let existing: ApiResponse<Vec<Application>> = self
            .backend
            .get(&format!("students/{}/applications", student_id))
            .await;
        if let Ok(existing) = existing.into_result() {
            if existing
                .iter()
                .any(|a| a.job_id == payload.job_id && a.status != ApplicationStatus::Withdrawn)
            {
                return Err(Error::Conflict(
                    "You have already applied to this job".to_string(),
                ));
            }
        }

        let body = json!({
            "job_id": payload.job_id,
            "student_id": student_id,
            "cover_letter": payload.cover_letter.trim(),
            "resume_url": payload.resume_url,
            "status": ApplicationStatus::Applied,
            "applied_at": now(),
        });
        let app: Application = self.backend.post("applications", &body).await.into_result()?;
        tracing::info!(application_id = %app.id, job_id = %app.job_id, student_id, "application submitted");
        Ok(app)
    }

    pub async fn list_for_student(&self, student_id: &str) -> Sourced<Vec<Application>> {
        let resp: ApiResponse<Vec<Application>> = self
            .backend
            .get(&format!("students/{}/applications", student_id))
            .await;
        resp.or_demo("applications", || mock_data::applications_for_student(student_id))
    }

    pub async fn list_for_job(&self, job_id: &str) -> Result<Vec<Application>> {
        self.backend
            .get(&format!("jobs/{}/applications", job_id))
            .await
            .into_result()
    }

    pub async fn get(&self, id: &str) -> Result<Application> {
        self.backend
            .get(&format!("applications/{}", id))
            .await
            .into_result()
    }

    pub async fn update_status(
        &self,
        id: &str,
        payload: &UpdateStatusPayload,
        changed_by: &str,
    ) -> Result<Application> {
        let current = self.get(id).await?;
        if current.status == ApplicationStatus::Withdrawn {
            return Err(Error::Conflict(
                "A withdrawn application cannot change status".to_string(),
            ));
        }
        self.push_status(current, payload.status, payload.note.clone(), changed_by)
            .await
    }

    pub async fn withdraw(&self, id: &str, student_id: &str) -> Result<Application> {
        let current = self.get(id).await?;
        if current.student_id != student_id {
            return Err(Error::Forbidden(
                "Only the applicant can withdraw an application".to_string(),
            ));
        }
        if current.status.is_terminal() {
            return Err(Error::Conflict(format!(
                "Application is already {}",
                current.status
            )));
        }
        self.push_status(current, ApplicationStatus::Withdrawn, None, student_id)
            .await
    }

    pub async fn history(&self, id: &str) -> Result<Vec<ApplicationHistoryEntry>> {
        let mut entries: Vec<ApplicationHistoryEntry> = self
            .backend
            .get(&format!("applications/{}/history", id))
            .await
            .into_result()?;
        entries.sort_by_key(|e| e.changed_at);
        Ok(entries)
    }

    async fn push_status(
        &self,
        current: Application,
        status: ApplicationStatus,
        note: Option<String>,
        changed_by: &str,
    ) -> Result<Application> {
        let at = now();
        let body = json!({
            "status": status,
            "note": note,
            "changed_by": changed_by,
            "changed_at": at,
        });
        let resp: ApiResponse<Application> = self
            .backend
            .patch(&format!("applications/{}/status", current.id), &body)
            .await;
        let mut updated = resp.into_result()?;
        if updated.stage_at(status).is_none() {
            updated.advance(status, at);
        }
        tracing::info!(
            application_id = %updated.id,
            from = %current.status,
            to = %status,
            "application status changed"
        );
        Ok(updated)
    }
}
