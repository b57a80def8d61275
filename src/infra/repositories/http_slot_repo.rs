use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use tracing::info;

use crate::api::client::ApiClient;
use crate::api::dtos::requests::{AdminOnlyRequest, BlockSlotRequest, CapacityRequest};
use crate::api::dtos::responses::SlotBoardResponse;
use crate::domain::models::slot::{Capacity, SlotBoard, SlotLabel};
use crate::domain::ports::SlotRepository;
use crate::error::AppError;

pub struct HttpSlotRepo {
    api: Arc<ApiClient>,
}

impl HttpSlotRepo {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SlotRepository for HttpSlotRepo {
    async fn fetch_board(&self) -> Result<SlotBoard, AppError> {
        let response: SlotBoardResponse = self.api.get_json(&["creneaux"]).await?;
        let board = response.into_board();
        info!(slots = board.len(), persons = board.total_persons(), "Slot board fetched");
        Ok(board)
    }

    async fn set_capacity(&self, label: SlotLabel, capacity: Capacity) -> Result<(), AppError> {
        let label = label.to_string();
        let path = ["admin", "creneaux", label.as_str(), "capacite"];
        self.api
            .send_mutation(Method::PUT, &path, Some(&CapacityRequest { capacite: capacity }))
            .await?;
        Ok(())
    }

    async fn block(&self, label: SlotLabel, reason: Option<&str>) -> Result<(), AppError> {
        let label = label.to_string();
        let path = ["admin", "creneaux", label.as_str(), "blocage"];
        self.api
            .send_mutation(Method::POST, &path, Some(&BlockSlotRequest { raison: reason }))
            .await?;
        Ok(())
    }

    async fn unblock(&self, label: SlotLabel) -> Result<(), AppError> {
        let label = label.to_string();
        let path = ["admin", "creneaux", label.as_str(), "blocage"];
        self.api.send_mutation(Method::DELETE, &path, None::<&()>).await?;
        Ok(())
    }

    async fn set_restricted(&self, label: SlotLabel, restricted: bool) -> Result<(), AppError> {
        let label = label.to_string();
        let path = ["admin", "creneaux", label.as_str(), "admin-only"];
        self.api
            .send_mutation(Method::PUT, &path, Some(&AdminOnlyRequest { admin_only: restricted }))
            .await?;
        Ok(())
    }
}
