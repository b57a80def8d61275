use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use tracing::warn;

use crate::api::client::ApiClient;
use crate::domain::models::registration::{NewRegistration, Registration};
use crate::domain::ports::{MutationReceipt, RegistrationRepository};
use crate::error::AppError;

pub struct HttpRegistrationRepo {
    api: Arc<ApiClient>,
}

impl HttpRegistrationRepo {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// The registration is saved once the server says so. Slot figures that
    /// do not decode only cost the optimistic patch.
    async fn mutate(&self, method: Method, path: &[&str], registration: &NewRegistration) -> Result<MutationReceipt, AppError> {
        let info = self.api.send_mutation(method, path, Some(registration)).await?;
        let slot = info.and_then(|i| {
            i.into_patch()
                .map_err(|e| warn!(staff_code = %registration.staff_code, "Ignoring slot figures from the server: {}", e))
                .ok()
        });
        Ok(MutationReceipt { slot })
    }
}

#[async_trait]
impl RegistrationRepository for HttpRegistrationRepo {
    async fn create(&self, registration: &NewRegistration) -> Result<MutationReceipt, AppError> {
        self.mutate(Method::POST, &["inscriptions"], registration).await
    }

    async fn update(&self, staff_code: &str, registration: &NewRegistration) -> Result<MutationReceipt, AppError> {
        self.mutate(Method::PUT, &["inscriptions", staff_code], registration).await
    }

    async fn find_by_code(&self, staff_code: &str) -> Result<Option<Registration>, AppError> {
        match self.api.get_json(&["inscriptions", staff_code]).await {
            Ok(registration) => Ok(Some(registration)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list(&self) -> Result<Vec<Registration>, AppError> {
        self.api.get_json(&["admin", "inscriptions"]).await
    }

    async fn delete(&self, staff_code: &str) -> Result<(), AppError> {
        self.api
            .send_mutation(Method::DELETE, &["admin", "inscriptions", staff_code], None::<&()>)
            .await?;
        Ok(())
    }
}
