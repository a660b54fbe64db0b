//! Authentication module: password hashing, access tokens, refresh tokens and the request gate

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod refresh_token;

pub use jwt::{AccessTokenCodec, Claims};
pub use middleware::{parse_bearer, require_auth, AuthUser};
pub use password::PasswordHasher;
pub use refresh_token::{generate_raw_token, hash_token, RefreshCookiePolicy, REFRESH_COOKIE};
