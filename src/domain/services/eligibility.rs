use crate::domain::models::slot::SlotSnapshot;
use crate::domain::services::availability::SlotAvailability;

/// Whether the caller may pick `snapshot` given the simulated figures.
///
/// A blocked slot is never selectable, not even by its current occupant: it can
/// only be vacated. A full slot stays selectable for the subject who already
/// holds it.
pub fn can_select(snapshot: &SlotSnapshot, availability: &SlotAvailability, caller_is_privileged: bool) -> bool {
    if snapshot.is_blocked() {
        return false;
    }
    if snapshot.restricted && !caller_is_privileged {
        return false;
    }
    !availability.simulated_is_full || availability.is_held
}

/// Restricted slots are hidden from the public unless the subject already holds
/// one. Blocked slots stay visible so the reason can be shown.
pub fn is_visible(snapshot: &SlotSnapshot, availability: &SlotAvailability, caller_is_privileged: bool) -> bool {
    !snapshot.restricted || caller_is_privileged || availability.is_held
}
