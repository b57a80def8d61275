use crate::domain::models::{
    admin::{AdminAccount, NewAdmin},
    personnel::AllowedAgent,
    registration::{NewRegistration, Registration},
    slot::{Capacity, SlotBoard, SlotLabel, SlotPatch},
};
use crate::error::AppError;
use async_trait::async_trait;

/// What a successful create or update reports back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MutationReceipt {
    /// Authoritative figures for the slot the registration now occupies.
    pub slot: Option<SlotPatch>,
}

#[async_trait]
pub trait SlotRepository: Send + Sync {
    async fn fetch_board(&self) -> Result<SlotBoard, AppError>;
    async fn set_capacity(&self, label: SlotLabel, capacity: Capacity) -> Result<(), AppError>;
    async fn block(&self, label: SlotLabel, reason: Option<&str>) -> Result<(), AppError>;
    async fn unblock(&self, label: SlotLabel) -> Result<(), AppError>;
    async fn set_restricted(&self, label: SlotLabel, restricted: bool) -> Result<(), AppError>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn create(&self, registration: &NewRegistration) -> Result<MutationReceipt, AppError>;
    async fn update(&self, staff_code: &str, registration: &NewRegistration) -> Result<MutationReceipt, AppError>;
    async fn find_by_code(&self, staff_code: &str) -> Result<Option<Registration>, AppError>;
    async fn list(&self) -> Result<Vec<Registration>, AppError>;
    async fn delete(&self, staff_code: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AllowListRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<AllowedAgent>, AppError>;
    async fn add(&self, agent: &AllowedAgent) -> Result<AllowedAgent, AppError>;
    async fn remove(&self, staff_code: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<AdminAccount>, AppError>;
    async fn create(&self, admin: &NewAdmin) -> Result<AdminAccount, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait CheckInRepository: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Registration>, AppError>;
    async fn check_in(&self, staff_code: &str) -> Result<Registration, AppError>;
    async fn undo_check_in(&self, staff_code: &str) -> Result<Registration, AppError>;
}
