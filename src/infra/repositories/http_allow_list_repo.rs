use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;

use crate::api::client::ApiClient;
use crate::domain::models::personnel::AllowedAgent;
use crate::domain::ports::AllowListRepository;
use crate::error::AppError;

pub struct HttpAllowListRepo {
    api: Arc<ApiClient>,
}

impl HttpAllowListRepo {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AllowListRepository for HttpAllowListRepo {
    async fn list(&self) -> Result<Vec<AllowedAgent>, AppError> {
        self.api.get_json(&["admin", "personnel"]).await
    }

    async fn add(&self, agent: &AllowedAgent) -> Result<AllowedAgent, AppError> {
        self.api.send_json(Method::POST, &["admin", "personnel"], Some(agent)).await
    }

    async fn remove(&self, staff_code: &str) -> Result<(), AppError> {
        self.api
            .send_mutation(Method::DELETE, &["admin", "personnel", staff_code], None::<&()>)
            .await?;
        Ok(())
    }
}
