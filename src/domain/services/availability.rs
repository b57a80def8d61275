use crate::domain::models::registration::HeldSlot;
use crate::domain::models::slot::{Capacity, Remaining, SlotLabel, SlotSnapshot};

/// Figures for a slot as if the current draft were booked on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAvailability {
    pub label: SlotLabel,
    pub simulated_persons: u32,
    pub simulated_remaining: Remaining,
    pub simulated_is_full: bool,
    /// The subject already occupies this slot (edit flow).
    pub is_held: bool,
}

/// Simulates booking `party_size` guests plus the agent on `snapshot`.
///
/// When `held` names this slot, the subject's prior contribution is taken out
/// first so an edit never counts against itself. Inconsistent input that would
/// drive the adjusted count below zero clamps to zero. Out-of-range party sizes
/// are not rejected here.
pub fn compute_availability(
    snapshot: &SlotSnapshot,
    party_size: u32,
    held: Option<&HeldSlot>,
) -> SlotAvailability {
    let held_here = held.filter(|h| h.label == snapshot.label);

    let adjusted = match held_here {
        Some(h) => snapshot.registered_persons.saturating_sub(h.prior_persons()),
        None => snapshot.registered_persons,
    };

    let simulated_persons = adjusted.saturating_add(party_size).saturating_add(1);

    let simulated_is_full = match snapshot.capacity {
        Capacity::Limited(cap) => simulated_persons >= cap,
        Capacity::Unlimited => false,
    };

    SlotAvailability {
        label: snapshot.label,
        simulated_persons,
        simulated_remaining: Remaining::of(snapshot.capacity, simulated_persons),
        simulated_is_full,
        is_held: held_here.is_some(),
    }
}
