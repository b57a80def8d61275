use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::controllers::until_cancelled;
use crate::domain::models::registration::{AgentIdentity, RegistrationDraft};
use crate::domain::models::slot::{Period, SlotBoard, SlotLabel};
use crate::domain::ports::MutationReceipt;
use crate::domain::services::availability::{compute_availability, SlotAvailability};
use crate::domain::services::eligibility::{can_select, is_visible};
use crate::domain::services::validation::{normalize_staff_code, validate_draft};
use crate::error::{AppError, ValidationError};
use crate::state::AppState;

/// One arrival time as the form renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotChoice {
    pub label: SlotLabel,
    pub period: Period,
    pub availability: SlotAvailability,
    pub selectable: bool,
    pub selected: bool,
    pub restricted: bool,
    pub blocked: bool,
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub staff_code: String,
    pub slot: SlotLabel,
    pub created: bool,
}

/// Drives one registration form, either creating a registration or editing
/// an existing one. Every remote call is tied to the form's cancellation token.
pub struct RegistrationFormController {
    state: Arc<AppState>,
    cancel: CancellationToken,
    board: Option<SlotBoard>,
    draft: RegistrationDraft,
    editing: Option<String>,
}

impl RegistrationFormController {
    pub fn new(state: Arc<AppState>, parent: &CancellationToken) -> Self {
        Self {
            state,
            cancel: parent.child_token(),
            board: None,
            draft: RegistrationDraft::new(),
            editing: None,
        }
    }

    pub async fn mount(&mut self) -> Result<(), AppError> {
        self.refresh_board().await
    }

    /// Cancels in-flight calls. The controller writes no state afterwards.
    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    pub async fn load_for_edit(&mut self, staff_code: &str) -> Result<(), AppError> {
        let code = normalize_staff_code(staff_code)?;
        let found = until_cancelled(&self.cancel, self.state.registration_repo.find_by_code(&code)).await?;
        let registration = found.ok_or_else(|| AppError::NotFound(format!("No registration found for {}", code)))?;

        info!(staff_code = %registration.staff_code, slot = %registration.arrival, "Editing registration");
        self.draft = RegistrationDraft::editing(&registration);
        self.editing = Some(registration.staff_code);

        if self.board.is_none() {
            self.refresh_board().await?;
        }
        Ok(())
    }

    pub async fn refresh_board(&mut self) -> Result<(), AppError> {
        let board = until_cancelled(&self.cancel, self.state.slot_repo.fetch_board()).await?;
        self.board = Some(board);
        Ok(())
    }

    pub fn board(&self) -> Option<&SlotBoard> {
        self.board.as_ref()
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    pub fn identity_mut(&mut self) -> &mut AgentIdentity {
        &mut self.draft.identity
    }

    pub fn set_lunch_on_site(&mut self, lunch_on_site: bool) {
        self.draft.lunch_on_site = lunch_on_site;
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    fn caller_is_privileged(&self) -> bool {
        self.state.session.is_privileged()
    }

    fn availability_of(&self, label: SlotLabel) -> Option<(bool, SlotAvailability)> {
        let snapshot = self.board.as_ref()?.get(label)?;
        let held = self.draft.held_slot();
        let availability = compute_availability(snapshot, self.draft.party_size, held.as_ref());
        let selectable = can_select(snapshot, &availability, self.caller_is_privileged());
        Some((selectable, availability))
    }

    /// Visible arrival times in chronological order.
    pub fn slot_choices(&self) -> Vec<SlotChoice> {
        let Some(board) = &self.board else {
            return Vec::new();
        };
        let privileged = self.caller_is_privileged();
        let held = self.draft.held_slot();
        let target = self.draft.target_slot();

        board
            .iter()
            .filter_map(|snapshot| {
                let availability = compute_availability(snapshot, self.draft.party_size, held.as_ref());
                if !is_visible(snapshot, &availability, privileged) {
                    return None;
                }
                Some(SlotChoice {
                    label: snapshot.label,
                    period: snapshot.period(),
                    availability,
                    selectable: can_select(snapshot, &availability, privileged),
                    selected: target == Some(snapshot.label),
                    restricted: snapshot.restricted,
                    blocked: snapshot.is_blocked(),
                    block_reason: snapshot.block_reason().map(str::to_string),
                })
            })
            .collect()
    }

    /// Selects `label`, or clears the selection if it is already selected.
    /// Deselecting is always allowed; selecting requires the slot to pass
    /// eligibility for the current party size.
    pub fn toggle_slot(&mut self, label: SlotLabel) -> Result<Option<SlotLabel>, AppError> {
        if self.draft.target_slot() == Some(label) {
            return Ok(self.draft.toggle_slot(label));
        }

        match self.availability_of(label) {
            None => Err(AppError::validation(ValidationError::UnknownSlot(label))),
            Some((false, _)) => Err(AppError::validation(ValidationError::SlotUnavailable(label))),
            Some((true, _)) => Ok(self.draft.toggle_slot(label)),
        }
    }

    /// Changes the number of guests. Returns the slot that had to be
    /// deselected because the party no longer fits, if any.
    pub fn set_party_size(&mut self, party_size: u32) -> Option<SlotLabel> {
        self.draft.party_size = party_size;
        self.reconcile_selection()
    }

    fn reconcile_selection(&mut self) -> Option<SlotLabel> {
        let label = self.draft.target_slot()?;
        self.board.as_ref()?;

        let still_selectable = matches!(self.availability_of(label), Some((true, _)));
        if still_selectable {
            return None;
        }

        info!(slot = %label, party_size = self.draft.party_size, "Selected slot no longer fits, clearing");
        self.draft.clear_slot()
    }

    /// Validates locally, sends the create or update call, then refreshes the
    /// board in two steps: the server's figures for the mutated slot are
    /// patched in at once, then the whole board is fetched again.
    pub async fn submit(&mut self) -> Result<SubmitReceipt, AppError> {
        let board = self
            .board
            .as_ref()
            .ok_or_else(|| AppError::NotFound("Arrival times are not loaded yet".into()))?;

        let errors = validate_draft(&self.draft, board, self.caller_is_privileged());
        if !errors.is_empty() {
            info!(violations = errors.len(), "Registration form rejected locally");
            return Err(AppError::Validation(errors));
        }

        let arrival = self
            .draft
            .target_slot()
            .ok_or_else(|| AppError::validation(ValidationError::NoSlotChosen))?;
        let request = self.draft.to_request(arrival);

        let result = match &self.editing {
            Some(code) => until_cancelled(&self.cancel, self.state.registration_repo.update(code, &request)).await,
            None => until_cancelled(&self.cancel, self.state.registration_repo.create(&request)).await,
        };

        match result {
            Ok(receipt) => {
                info!(staff_code = %request.staff_code, slot = %arrival, "Registration saved");
                self.apply_receipt(&receipt);

                if let Err(e) = self.refresh_board().await {
                    warn!("Reconciling slot fetch failed: {}", e);
                }

                let submitted = SubmitReceipt {
                    staff_code: request.staff_code,
                    slot: arrival,
                    created: self.editing.is_none(),
                };
                self.draft = RegistrationDraft::new();
                self.editing = None;
                Ok(submitted)
            }
            Err(e) if e.requires_refresh() => {
                warn!(slot = %arrival, "Capacity conflict reported by the server: {}", e);
                if let Err(refresh_err) = self.refresh_board().await {
                    warn!("Slot refresh after conflict failed: {}", refresh_err);
                }
                self.reconcile_selection();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn apply_receipt(&mut self, receipt: &MutationReceipt) {
        let Some(board) = self.board.as_mut() else {
            return;
        };
        let Some(patch) = &receipt.slot else {
            return;
        };

        let held = self.draft.held_slot();
        let stayed = held.is_some_and(|h| h.label == patch.label);
        board.apply_patch(patch, if stayed { 0 } else { 1 });

        if let Some(h) = held
            && h.label != patch.label
        {
            board.release(h.label, h.prior_persons());
        }
    }
}
