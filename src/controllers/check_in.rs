use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::controllers::until_cancelled;
use crate::domain::models::registration::Registration;
use crate::domain::services::validation::normalize_staff_code;
use crate::error::AppError;
use crate::state::AppState;

pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckInSummary {
    pub registrations: u32,
    pub expected_persons: u32,
    pub present_agents: u32,
    pub present_persons: u32,
}

impl CheckInSummary {
    pub fn from_registrations(registrations: &[Registration]) -> Self {
        registrations.iter().fold(Self::default(), |mut acc, r| {
            acc.registrations = acc.registrations.saturating_add(1);
            acc.expected_persons = acc.expected_persons.saturating_add(r.persons());
            if r.checked_in {
                acc.present_agents = acc.present_agents.saturating_add(1);
                acc.present_persons = acc.present_persons.saturating_add(r.persons());
            }
            acc
        })
    }
}

/// On-site desk: look agents up and mark them present.
pub struct CheckInDesk {
    state: Arc<AppState>,
    cancel: CancellationToken,
    results: Vec<Registration>,
}

impl CheckInDesk {
    pub fn new(state: Arc<AppState>, parent: &CancellationToken) -> Self {
        Self {
            state,
            cancel: parent.child_token(),
            results: Vec::new(),
        }
    }

    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    fn ensure_staff(&self) -> Result<(), AppError> {
        if self.state.session.is_privileged() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Check-in is reserved to on-site staff".into()))
        }
    }

    pub fn results(&self) -> &[Registration] {
        &self.results
    }

    pub fn summary(&self) -> CheckInSummary {
        CheckInSummary::from_registrations(&self.results)
    }

    pub async fn search(&mut self, query: &str) -> Result<&[Registration], AppError> {
        self.ensure_staff()?;

        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            self.results.clear();
            return Ok(&self.results);
        }

        let found = until_cancelled(&self.cancel, self.state.checkin_repo.search(query)).await?;
        info!(query, results = found.len(), "Check-in search");
        self.results = found;
        Ok(&self.results)
    }

    pub async fn check_in(&mut self, staff_code: &str) -> Result<Registration, AppError> {
        self.ensure_staff()?;
        let code = normalize_staff_code(staff_code)?;

        if let Some(existing) = self.results.iter().find(|r| r.staff_code == code)
            && existing.checked_in
        {
            return Err(AppError::Rejected(format!("{} is already checked in", existing.full_name())));
        }

        let updated = until_cancelled(&self.cancel, self.state.checkin_repo.check_in(&code)).await?;
        info!(staff_code = %code, persons = updated.persons(), "Agent checked in");
        self.replace(&updated);
        Ok(updated)
    }

    pub async fn undo_check_in(&mut self, staff_code: &str) -> Result<Registration, AppError> {
        self.ensure_staff()?;
        let code = normalize_staff_code(staff_code)?;

        let updated = until_cancelled(&self.cancel, self.state.checkin_repo.undo_check_in(&code)).await?;
        info!(staff_code = %code, "Check-in undone");
        self.replace(&updated);
        Ok(updated)
    }

    fn replace(&mut self, updated: &Registration) {
        if let Some(slot) = self.results.iter_mut().find(|r| r.staff_code == updated.staff_code) {
            *slot = updated.clone();
        }
    }
}
