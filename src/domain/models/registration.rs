use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::slot::SlotLabel;

pub const MAX_GUESTS: u32 = 4;

/// A registration as stored by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(rename = "code_personnel")]
    pub staff_code: String,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "nombre_proches")]
    pub guests: u32,
    #[serde(rename = "heure_arrivee")]
    pub arrival: SlotLabel,
    #[serde(rename = "restauration_sur_place", default)]
    pub lunch_on_site: bool,
    #[serde(rename = "present", default)]
    pub checked_in: bool,
    #[serde(rename = "heure_pointage", default, skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl Registration {
    pub fn persons(&self) -> u32 {
        self.guests.saturating_add(1)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.staff_code.to_lowercase().contains(&q)
            || self.last_name.to_lowercase().contains(&q)
            || self.first_name.to_lowercase().contains(&q)
    }
}

/// Body of a create or update call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRegistration {
    #[serde(rename = "code_personnel")]
    pub staff_code: String,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "nombre_proches")]
    pub guests: u32,
    #[serde(rename = "heure_arrivee")]
    pub arrival: SlotLabel,
    #[serde(rename = "restauration_sur_place")]
    pub lunch_on_site: bool,
}

/// The slot a subject already occupies, with the guests already counted there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldSlot {
    pub label: SlotLabel,
    pub prior_party_size: u32,
}

impl HeldSlot {
    pub fn prior_persons(&self) -> u32 {
        self.prior_party_size.saturating_add(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentIdentity {
    pub staff_code: String,
    pub last_name: String,
    pub first_name: String,
}

/// Form state for one create or edit interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub identity: AgentIdentity,
    pub party_size: u32,
    pub lunch_on_site: bool,
    target_slot: Option<SlotLabel>,
    held_slot: Option<HeldSlot>,
}

impl RegistrationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft for editing an existing registration: the current slot is both
    /// held and pre-selected.
    pub fn editing(registration: &Registration) -> Self {
        Self {
            identity: AgentIdentity {
                staff_code: registration.staff_code.clone(),
                last_name: registration.last_name.clone(),
                first_name: registration.first_name.clone(),
            },
            party_size: registration.guests,
            lunch_on_site: registration.lunch_on_site,
            target_slot: Some(registration.arrival),
            held_slot: Some(HeldSlot {
                label: registration.arrival,
                prior_party_size: registration.guests,
            }),
        }
    }

    pub fn target_slot(&self) -> Option<SlotLabel> {
        self.target_slot
    }

    pub fn held_slot(&self) -> Option<HeldSlot> {
        self.held_slot
    }

    pub fn is_edit(&self) -> bool {
        self.held_slot.is_some()
    }

    /// Radio semantics: picking the selected slot again clears the choice,
    /// picking another one replaces it. Returns the new selection.
    pub fn toggle_slot(&mut self, label: SlotLabel) -> Option<SlotLabel> {
        self.target_slot = if self.target_slot == Some(label) {
            None
        } else {
            Some(label)
        };
        self.target_slot
    }

    pub fn clear_slot(&mut self) -> Option<SlotLabel> {
        self.target_slot.take()
    }

    pub fn to_request(&self, arrival: SlotLabel) -> NewRegistration {
        NewRegistration {
            staff_code: self.identity.staff_code.trim().to_uppercase(),
            last_name: self.identity.last_name.trim().to_string(),
            first_name: self.identity.first_name.trim().to_string(),
            guests: self.party_size,
            arrival,
            lunch_on_site: self.lunch_on_site,
        }
    }
}
