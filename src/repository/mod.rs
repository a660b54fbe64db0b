//! Database repository layer

pub mod refresh_token_repo;
pub mod user_repo;

pub use refresh_token_repo::*;
pub use user_repo::*;
