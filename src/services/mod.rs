//! Business logic services layer

pub mod session_service;
pub mod user_admin_service;

pub use session_service::{SessionGrant, SessionService};
pub use user_admin_service::UserAdminService;
