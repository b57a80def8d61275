use crate::domain::models::admin::NewAdmin;
use crate::domain::models::personnel::AllowedAgent;
use crate::domain::models::registration::{MAX_GUESTS, RegistrationDraft};
use crate::domain::models::slot::SlotBoard;
use crate::domain::services::availability::compute_availability;
use crate::domain::services::eligibility::can_select;
use crate::error::{AppError, ValidationError};

pub const STAFF_CODE_MIN: usize = 3;
pub const STAFF_CODE_MAX: usize = 12;
pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 8;

pub fn check_staff_code(code: &str, errors: &mut Vec<ValidationError>) {
    let code = code.trim();
    let len = code.chars().count();
    if !(STAFF_CODE_MIN..=STAFF_CODE_MAX).contains(&len) || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push(ValidationError::InvalidStaffCode { min: STAFF_CODE_MIN, max: STAFF_CODE_MAX });
    }
}

/// Trimmed, upper-cased personnel code, ready to be used as a lookup key.
pub fn normalize_staff_code(raw: &str) -> Result<String, AppError> {
    let mut errors = Vec::new();
    check_staff_code(raw, &mut errors);
    if errors.is_empty() {
        Ok(raw.trim().to_uppercase())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub fn check_name(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    let len = value.trim().chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        errors.push(ValidationError::NameLength { field, min: NAME_MIN, max: NAME_MAX });
    }
}

/// Every rule a draft must pass before it is sent. Returns all violations,
/// in form order.
pub fn validate_draft(draft: &RegistrationDraft, board: &SlotBoard, caller_is_privileged: bool) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_staff_code(&draft.identity.staff_code, &mut errors);
    check_name("Last name", &draft.identity.last_name, &mut errors);
    check_name("First name", &draft.identity.first_name, &mut errors);

    if draft.party_size > MAX_GUESTS {
        errors.push(ValidationError::PartySizeOutOfRange { got: draft.party_size, max: MAX_GUESTS });
    }

    match draft.target_slot() {
        None => errors.push(ValidationError::NoSlotChosen),
        Some(label) => match board.get(label) {
            None => errors.push(ValidationError::UnknownSlot(label)),
            Some(snapshot) => {
                let held = draft.held_slot();
                let availability = compute_availability(snapshot, draft.party_size, held.as_ref());
                if !can_select(snapshot, &availability, caller_is_privileged) {
                    errors.push(ValidationError::SlotUnavailable(label));
                }
            }
        },
    }

    errors
}

pub fn validate_allowed_agent(agent: &AllowedAgent) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_staff_code(&agent.staff_code, &mut errors);
    check_name("Last name", &agent.last_name, &mut errors);
    check_name("First name", &agent.first_name, &mut errors);
    errors
}

pub fn validate_new_admin(admin: &NewAdmin) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let email = admin.email.trim();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'));
    if !well_formed || email.contains(char::is_whitespace) {
        errors.push(ValidationError::InvalidEmail);
    }

    if admin.password.chars().count() < PASSWORD_MIN {
        errors.push(ValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }

    errors
}
