use crate::dto::admin_dto::{
    AccountKind, CreateAnnouncementPayload, ModerationAction, ModerationPayload, ModerationResult,
};
use crate::dto::envelope::{ApiResponse, Sourced};
use crate::error::Result;
use crate::models::announcement::Announcement;
use crate::models::stats::AdminStats;
use crate::services::backend_service::BackendClient;
use crate::services::mock_data;
use serde_json::{json, Value as JsonValue};

#[derive(Clone)]
pub struct AdminService {
    backend: BackendClient,
}

impl AdminService {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub async fn stats(&self) -> ApiResponse<AdminStats> {
        self.backend.get("admin/stats").await
    }

    pub async fn stats_or_demo(&self) -> Sourced<AdminStats> {
        self.stats().await.or_demo("admin stats", mock_data::admin_stats)
    }

    pub async fn announcements(&self) -> Sourced<Vec<Announcement>> {
        let resp: ApiResponse<Vec<Announcement>> = self.backend.get("admin/announcements").await;
        resp.or_demo("announcements", Vec::new)
    }

    pub async fn create_announcement(
        &self,
        payload: &CreateAnnouncementPayload,
    ) -> Result<Announcement> {
        self.backend
            .post("admin/announcements", payload)
            .await
            .into_result()
    }

    pub async fn moderate(
        &self,
        kind: AccountKind,
        id: &str,
        payload: &ModerationPayload,
    ) -> Result<ModerationResult> {
        let status = match payload.action {
            ModerationAction::Approve | ModerationAction::Reactivate => "active",
            ModerationAction::Suspend => "suspended",
        };
        let body = json!({
            "status": status,
            "reason": payload.reason,
        });
        let _: JsonValue = self
            .backend
            .patch(&format!("admin/{}/{}/status", kind.resource(), id), &body)
            .await
            .into_result()?;
        tracing::info!(kind = kind.resource(), id, action = ?payload.action, "account moderated");
        Ok(ModerationResult {
            kind,
            id: id.to_string(),
            action: payload.action,
            applied: true,
        })
    }
}
