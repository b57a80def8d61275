use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;

use crate::api::client::ApiClient;
use crate::domain::models::registration::Registration;
use crate::domain::ports::CheckInRepository;
use crate::error::AppError;

pub struct HttpCheckInRepo {
    api: Arc<ApiClient>,
}

impl HttpCheckInRepo {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CheckInRepository for HttpCheckInRepo {
    async fn search(&self, query: &str) -> Result<Vec<Registration>, AppError> {
        self.api.get_json_with_query(&["pointage", "recherche"], &[("q", query)]).await
    }

    async fn check_in(&self, staff_code: &str) -> Result<Registration, AppError> {
        self.api
            .send_json(Method::POST, &["pointage", staff_code], None::<&()>)
            .await
    }

    async fn undo_check_in(&self, staff_code: &str) -> Result<Registration, AppError> {
        self.api
            .send_json(Method::DELETE, &["pointage", staff_code], None::<&()>)
            .await
    }
}
