use std::sync::Arc;
use crate::domain::ports::{
    AdminRepository, AllowListRepository, CheckInRepository, RegistrationRepository, SlotRepository,
};
use crate::domain::services::session_store::SessionStore;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub slot_repo: Arc<dyn SlotRepository>,
    pub registration_repo: Arc<dyn RegistrationRepository>,
    pub allow_list_repo: Arc<dyn AllowListRepository>,
    pub admin_repo: Arc<dyn AdminRepository>,
    pub checkin_repo: Arc<dyn CheckInRepository>,
}
