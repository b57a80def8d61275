pub mod http_admin_repo;
pub mod http_allow_list_repo;
pub mod http_checkin_repo;
pub mod http_registration_repo;
pub mod http_slot_repo;
