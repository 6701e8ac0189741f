use crate::error::AppError;
use bcrypt::{hash, verify};

pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    Ok(hash(password, cost)?)
}

/// Checks `password` against a stored bcrypt hash. A malformed stored hash is
/// reported as a mismatch, so callers cannot tell it apart from a wrong password.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match verify(password, hashed_password) {
        Ok(matches) => matches,
        Err(e) => {
            log::error!("stored password hash could not be checked: {}", e);
            false
        }
    }
}
