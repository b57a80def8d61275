use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;

use crate::api::client::ApiClient;
use crate::domain::models::admin::{AdminAccount, NewAdmin};
use crate::domain::ports::AdminRepository;
use crate::error::AppError;

pub struct HttpAdminRepo {
    api: Arc<ApiClient>,
}

impl HttpAdminRepo {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AdminRepository for HttpAdminRepo {
    async fn list(&self) -> Result<Vec<AdminAccount>, AppError> {
        self.api.get_json(&["admin", "administrateurs"]).await
    }

    async fn create(&self, admin: &NewAdmin) -> Result<AdminAccount, AppError> {
        self.api.send_json(Method::POST, &["admin", "administrateurs"], Some(admin)).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.api
            .send_mutation(Method::DELETE, &["admin", "administrateurs", id], None::<&()>)
            .await?;
        Ok(())
    }
}
