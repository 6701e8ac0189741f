pub mod accounts;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::UserProfile;

// Re-export necessary items
pub use accounts::AccountService;
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{AuthFailure, Claims, TokenIssuer, TokenVerifier};

/// Represents the payload for a new user registration request.
///
/// Missing fields deserialize as empty strings so that they are reported as a
/// validation error rather than a body parse failure.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SignupRequest {
    /// Must look like an email address once trimmed and lower-cased.
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Display name, trimmed.
    #[serde(default)]
    #[validate(length(max = 100))]
    pub name: String,
}

/// Represents the payload for a user login request.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    /// The session token to send as `Authorization: Bearer <token>`.
    pub token: String,
    pub user: UserProfile,
}

/// Trims and lower-cases an email so lookups and the uniqueness constraint
/// agree on one spelling.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl SignupRequest {
    pub fn normalized(self) -> Self {
        Self {
            email: normalize_email(&self.email),
            password: self.password,
            name: self.name.trim().to_string(),
        }
    }
}
