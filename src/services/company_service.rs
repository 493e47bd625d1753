use crate::dto::envelope::{ApiResponse, Sourced};
use crate::models::company::Company;
use crate::services::backend_service::BackendClient;
use crate::services::mock_data;

#[derive(Clone)]
pub struct CompanyService {
    backend: BackendClient,
}

impl CompanyService {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub async fn list(&self) -> Sourced<Vec<Company>> {
        let resp: ApiResponse<Vec<Company>> = self.backend.get("companies").await;
        resp.or_demo("companies", mock_data::companies)
    }

    pub async fn get(&self, id: &str) -> ApiResponse<Company> {
        self.backend.get(&format!("companies/{}", id)).await
    }
}
