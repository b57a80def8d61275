use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::controllers::until_cancelled;
use crate::domain::models::admin::{AdminAccount, NewAdmin};
use crate::domain::models::personnel::AllowedAgent;
use crate::domain::models::registration::Registration;
use crate::domain::models::session::Role;
use crate::domain::models::slot::{Capacity, Period, Remaining, SlotBoard, SlotLabel};
use crate::domain::services::validation::{normalize_staff_code, validate_allowed_agent, validate_new_admin};
use crate::error::AppError;
use crate::state::AppState;

/// Per-slot line of the administration overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSummary {
    pub label: SlotLabel,
    pub period: Period,
    pub capacity: Capacity,
    pub agents: u32,
    pub persons: u32,
    pub remaining: Remaining,
    pub blocked: bool,
    pub restricted: bool,
    /// Persons from registrations that asked for lunch on site.
    pub lunches: u32,
}

pub struct AdminConsole {
    state: Arc<AppState>,
    cancel: CancellationToken,
    board: Option<SlotBoard>,
    registrations: Vec<Registration>,
}

impl AdminConsole {
    pub fn new(state: Arc<AppState>, parent: &CancellationToken) -> Self {
        Self {
            state,
            cancel: parent.child_token(),
            board: None,
            registrations: Vec::new(),
        }
    }

    fn ensure_admin(&self) -> Result<(), AppError> {
        if self.state.session.role() == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Administrator access required".into()))
        }
    }

    pub async fn mount(&mut self) -> Result<(), AppError> {
        self.ensure_admin()?;
        self.refresh_board().await?;
        self.refresh_registrations().await
    }

    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    pub async fn refresh_board(&mut self) -> Result<(), AppError> {
        let board = until_cancelled(&self.cancel, self.state.slot_repo.fetch_board()).await?;
        self.board = Some(board);
        Ok(())
    }

    pub async fn refresh_registrations(&mut self) -> Result<(), AppError> {
        let mut registrations = until_cancelled(&self.cancel, self.state.registration_repo.list()).await?;
        registrations.sort_by(|a, b| {
            a.arrival
                .cmp(&b.arrival)
                .then_with(|| a.last_name.cmp(&b.last_name))
        });
        self.registrations = registrations;
        Ok(())
    }

    pub fn board(&self) -> Option<&SlotBoard> {
        self.board.as_ref()
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn filter_registrations(&self, query: &str) -> Vec<&Registration> {
        self.registrations.iter().filter(|r| r.matches(query)).collect()
    }

    pub fn slot_summaries(&self) -> Vec<SlotSummary> {
        let Some(board) = &self.board else {
            return Vec::new();
        };

        board
            .iter()
            .map(|slot| SlotSummary {
                label: slot.label,
                period: slot.period(),
                capacity: slot.capacity,
                agents: slot.registered_agents,
                persons: slot.registered_persons,
                remaining: slot.remaining(),
                blocked: slot.is_blocked(),
                restricted: slot.restricted,
                lunches: self
                    .registrations
                    .iter()
                    .filter(|r| r.arrival == slot.label && r.lunch_on_site)
                    .map(Registration::persons)
                    .sum(),
            })
            .collect()
    }

    fn ensure_known_slot(&self, label: SlotLabel) -> Result<(), AppError> {
        match &self.board {
            Some(board) if board.contains(label) => Ok(()),
            _ => Err(AppError::NotFound(format!("Slot {} does not exist", label))),
        }
    }

    pub async fn set_capacity(&mut self, label: SlotLabel, capacity: Capacity) -> Result<(), AppError> {
        self.ensure_admin()?;
        self.ensure_known_slot(label)?;

        if let (Capacity::Limited(cap), Some(slot)) = (capacity, self.board.as_ref().and_then(|b| b.get(label)))
            && cap < slot.registered_persons
        {
            warn!(slot = %label, capacity = cap, persons = slot.registered_persons, "Capacity set below current occupancy");
        }

        until_cancelled(&self.cancel, self.state.slot_repo.set_capacity(label, capacity)).await?;
        info!(slot = %label, capacity = capacity.raw(), "Slot capacity updated");
        self.refresh_board().await
    }

    pub async fn block(&mut self, label: SlotLabel, reason: Option<&str>) -> Result<(), AppError> {
        self.ensure_admin()?;
        self.ensure_known_slot(label)?;

        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        until_cancelled(&self.cancel, self.state.slot_repo.block(label, reason)).await?;
        info!(slot = %label, "Slot blocked");
        self.refresh_board().await
    }

    pub async fn unblock(&mut self, label: SlotLabel) -> Result<(), AppError> {
        self.ensure_admin()?;
        self.ensure_known_slot(label)?;

        until_cancelled(&self.cancel, self.state.slot_repo.unblock(label)).await?;
        info!(slot = %label, "Slot unblocked");
        self.refresh_board().await
    }

    pub async fn set_restricted(&mut self, label: SlotLabel, restricted: bool) -> Result<(), AppError> {
        self.ensure_admin()?;
        self.ensure_known_slot(label)?;

        until_cancelled(&self.cancel, self.state.slot_repo.set_restricted(label, restricted)).await?;
        info!(slot = %label, restricted, "Slot visibility updated");
        self.refresh_board().await
    }

    pub async fn delete_registration(&mut self, staff_code: &str) -> Result<(), AppError> {
        self.ensure_admin()?;
        let code = normalize_staff_code(staff_code)?;

        until_cancelled(&self.cancel, self.state.registration_repo.delete(&code)).await?;
        info!(staff_code = %code, "Registration deleted");
        self.refresh_board().await?;
        self.refresh_registrations().await
    }

    pub async fn allow_list(&self) -> Result<Vec<AllowedAgent>, AppError> {
        self.ensure_admin()?;
        until_cancelled(&self.cancel, self.state.allow_list_repo.list()).await
    }

    pub async fn add_allowed_agent(&self, agent: AllowedAgent) -> Result<AllowedAgent, AppError> {
        self.ensure_admin()?;

        let errors = validate_allowed_agent(&agent);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let normalized = AllowedAgent {
            staff_code: agent.staff_code.trim().to_uppercase(),
            last_name: agent.last_name.trim().to_string(),
            first_name: agent.first_name.trim().to_string(),
            service: agent.service.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        };

        let created = until_cancelled(&self.cancel, self.state.allow_list_repo.add(&normalized)).await?;
        info!(staff_code = %created.staff_code, "Agent added to the allow-list");
        Ok(created)
    }

    pub async fn remove_allowed_agent(&self, staff_code: &str) -> Result<(), AppError> {
        self.ensure_admin()?;
        let code = normalize_staff_code(staff_code)?;
        until_cancelled(&self.cancel, self.state.allow_list_repo.remove(&code)).await?;
        info!(staff_code = %code, "Agent removed from the allow-list");
        Ok(())
    }

    pub async fn admins(&self) -> Result<Vec<AdminAccount>, AppError> {
        self.ensure_admin()?;
        until_cancelled(&self.cancel, self.state.admin_repo.list()).await
    }

    pub async fn create_admin(&self, admin: NewAdmin) -> Result<AdminAccount, AppError> {
        self.ensure_admin()?;

        let errors = validate_new_admin(&admin);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let admin = NewAdmin { email: admin.email.trim().to_lowercase(), password: admin.password };
        let created = until_cancelled(&self.cancel, self.state.admin_repo.create(&admin)).await?;
        info!(admin_id = %created.id, "Administrator created");
        Ok(created)
    }

    pub async fn delete_admin(&self, id: &str) -> Result<(), AppError> {
        self.ensure_admin()?;

        if self.state.session.current().user_id.as_deref() == Some(id) {
            return Err(AppError::Forbidden("You cannot delete your own account".into()));
        }

        until_cancelled(&self.cancel, self.state.admin_repo.delete(id)).await?;
        info!(admin_id = id, "Administrator deleted");
        Ok(())
    }
}
