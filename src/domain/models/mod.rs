pub mod admin;
pub mod personnel;
pub mod registration;
pub mod session;
pub mod slot;
