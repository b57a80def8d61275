use std::sync::Arc;
use tracing::info;

use crate::api::client::ApiClient;
use crate::config::Config;
use crate::domain::models::session::Session;
use crate::domain::services::session_store::SessionStore;
use crate::error::AppError;
use crate::infra::repositories::{
    http_admin_repo::HttpAdminRepo, http_allow_list_repo::HttpAllowListRepo,
    http_checkin_repo::HttpCheckInRepo, http_registration_repo::HttpRegistrationRepo,
    http_slot_repo::HttpSlotRepo,
};
use crate::state::AppState;

pub fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    let session = Arc::new(SessionStore::new(Session {
        token: config.api_token.clone(),
        role: config.role,
        user_id: None,
    }));

    bootstrap_state_with_session(config, session)
}

/// Wires every port to the remote API, sharing an existing session store.
pub fn bootstrap_state_with_session(config: &Config, session: Arc<SessionStore>) -> Result<AppState, AppError> {
    info!("Initializing registration API client for {}", config.api_base_url);

    let api = Arc::new(ApiClient::new(&config.api_base_url, config.request_timeout, session.clone())?);

    Ok(AppState {
        config: config.clone(),
        session,
        slot_repo: Arc::new(HttpSlotRepo::new(api.clone())),
        registration_repo: Arc::new(HttpRegistrationRepo::new(api.clone())),
        allow_list_repo: Arc::new(HttpAllowListRepo::new(api.clone())),
        admin_repo: Arc::new(HttpAdminRepo::new(api.clone())),
        checkin_repo: Arc::new(HttpCheckInRepo::new(api)),
    })
}
