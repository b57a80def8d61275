pub mod availability;
pub mod eligibility;
pub mod session_store;
pub mod validation;
