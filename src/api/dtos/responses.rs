use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::domain::models::slot::{
    Capacity, Period, SlotBoard, SlotLabel, SlotPatch, SlotSnapshot, UNLIMITED_CAPACITY,
};
use crate::error::AppError;

/// Slot that the remote API treated as admin-only before the flag existed.
const LEGACY_ADMIN_ONLY_SLOT: (u32, u32) = (15, 0);

#[derive(Debug, Deserialize)]
pub struct SlotFigures {
    pub agents_inscrits: u32,
    pub personnes_total: u32,
    pub places_restantes: i64,
    #[serde(default)]
    pub complet: bool,
    #[serde(default)]
    pub bloque: bool,
    pub raison_blocage: Option<String>,
    pub admin_only: Option<bool>,
    pub capacite: Option<u32>,
}

/// `GET /creneaux`
#[derive(Debug, Deserialize, Default)]
pub struct SlotBoardResponse {
    #[serde(default)]
    pub matin: BTreeMap<String, SlotFigures>,
    #[serde(rename = "apres-midi", default)]
    pub apres_midi: BTreeMap<String, SlotFigures>,
}

impl SlotFigures {
    fn capacity(&self) -> Capacity {
        if let Some(raw) = self.capacite {
            return Capacity::from(raw);
        }
        let remaining = u32::try_from(self.places_restantes.max(0)).unwrap_or(u32::MAX);
        let total = self.personnes_total.saturating_add(remaining);
        if total == UNLIMITED_CAPACITY {
            Capacity::Unlimited
        } else {
            Capacity::Limited(total)
        }
    }

    fn into_snapshot(self, label: SlotLabel) -> SlotSnapshot {
        if self.personnes_total < self.agents_inscrits {
            warn!(
                slot = %label,
                agents = self.agents_inscrits,
                persons = self.personnes_total,
                "Slot reports fewer persons than agents, clamping"
            );
        }

        let restricted = self.admin_only.unwrap_or_else(|| {
            SlotLabel::new(LEGACY_ADMIN_ONLY_SLOT.0, LEGACY_ADMIN_ONLY_SLOT.1) == Some(label)
        });

        let mut snapshot = SlotSnapshot::new(label, self.capacity())
            .with_occupancy(self.agents_inscrits, self.personnes_total)
            .restricted(restricted);

        if self.bloque {
            let reason = self.raison_blocage.as_deref().map(str::trim).filter(|r| !r.is_empty());
            snapshot = snapshot.blocked(reason);
        }

        snapshot
    }
}

impl SlotBoardResponse {
    /// Builds the read model. Entries with a malformed label are skipped; the
    /// period is always derived from the label, whichever bucket it came in.
    pub fn into_board(self) -> SlotBoard {
        let buckets = [(Period::Morning, self.matin), (Period::Afternoon, self.apres_midi)];

        let mut snapshots = Vec::new();
        for (bucket, entries) in buckets {
            for (raw_label, figures) in entries {
                let label = match raw_label.parse::<SlotLabel>() {
                    Ok(label) => label,
                    Err(e) => {
                        warn!("Skipping slot from {}: {}", bucket.wire_key(), e);
                        continue;
                    }
                };
                if label.period() != bucket {
                    warn!(slot = %label, bucket = bucket.wire_key(), "Slot listed under the wrong period");
                }
                snapshots.push(figures.into_snapshot(label));
            }
        }

        SlotBoard::from_snapshots(snapshots)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreneauInfo {
    pub heure: String,
    pub personnes_total: u32,
    pub places_restantes: i64,
    pub capacite: u32,
}

impl CreneauInfo {
    pub fn into_patch(self) -> Result<SlotPatch, AppError> {
        Ok(SlotPatch {
            label: self.heure.parse()?,
            registered_persons: self.personnes_total,
            capacity: Capacity::from(self.capacite),
        })
    }
}

/// Envelope of every mutating call.
#[derive(Debug, Deserialize)]
pub struct MutationResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    pub error: Option<String>,
    pub message: Option<String>,
    pub creneau_info: Option<CreneauInfo>,
}

fn default_success() -> bool {
    true
}

/// Text the remote API uses when a slot has no room left.
pub fn is_capacity_message(message: &str) -> bool {
    let m = message.to_lowercase();
    m.contains("complet") || m.contains("places") || m.contains("capacit")
}

impl MutationResponse {
    pub fn into_result(self) -> Result<Option<CreneauInfo>, AppError> {
        if self.success {
            return Ok(self.creneau_info);
        }
        let message = self
            .error
            .or(self.message)
            .unwrap_or_else(|| "The request was refused".to_string());
        if is_capacity_message(&message) {
            Err(AppError::CapacityConflict(message))
        } else {
            Err(AppError::Rejected(message))
        }
    }
}
