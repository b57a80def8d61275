use serde::Serialize;

use crate::domain::models::slot::Capacity;

#[derive(Serialize)]
pub struct CapacityRequest {
    pub capacite: Capacity,
}

#[derive(Serialize)]
pub struct BlockSlotRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raison: Option<&'a str>,
}

#[derive(Serialize)]
pub struct AdminOnlyRequest {
    pub admin_only: bool,
}
