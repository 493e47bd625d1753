use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAnnouncementPayload {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Student,
    Company,
}

impl AccountKind {
    pub fn resource(&self) -> &'static str {
        match self {
            AccountKind::Student => "students",
            AccountKind::Company => "companies",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Approve,
    Suspend,
    Reactivate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationPayload {
    pub action: ModerationAction,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationResult {
    pub kind: AccountKind,
    pub id: String,
    pub action: ModerationAction,
    pub applied: bool,
}
