//! Signup and login: the only entry points that do not pass through the
//! access guard.

use std::sync::Arc;

use actix_web::web;
use uuid::Uuid;
use validator::Validate;

use super::password::{hash_password, verify_password};
use super::token::TokenIssuer;
use super::{normalize_email, LoginRequest, LoginResponse, SignupRequest};
use crate::error::AppError;
use crate::models::User;
use crate::store::UserStore;

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    issuer: TokenIssuer,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, issuer: TokenIssuer, bcrypt_cost: u32) -> Self {
        Self {
            users,
            issuer,
            bcrypt_cost,
        }
    }

    /// Registers a new account and returns its id.
    ///
    /// Fails with `Validation` on missing or malformed fields and with `Conflict`
    /// when the normalized email is already registered.
    pub async fn signup(&self, request: SignupRequest) -> Result<Uuid, AppError> {
        let request = request.normalized();
        if request.email.is_empty() || request.password.is_empty() || request.name.is_empty() {
            return Err(AppError::Validation(
                "Missing email, password or name".into(),
            ));
        }
        request.validate()?;

        let SignupRequest {
            email,
            password,
            name,
        } = request;
        let cost = self.bcrypt_cost;
        let password_hash = web::block(move || hash_password(&password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))??;

        let user = User::new(email, password_hash, name);
        let id = self.users.insert(&user).await?;
        log::info!("registered user {}", id);
        Ok(id)
    }

    /// Checks credentials and issues a session token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let email = normalize_email(&request.email);
        if email.is_empty() || request.password.is_empty() {
            return Err(AppError::Validation("Missing email or password".into()));
        }

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => return Err(AppError::InvalidCredentials),
        };

        let password = request.password;
        let stored_hash = user.password_hash.clone();
        let matches = web::block(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))?;
        if !matches {
            log::info!("failed login for user {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issuer.issue(user.id)?;
        log::info!("user {} logged in", user.id);
        Ok(LoginResponse {
            message: "Login successful",
            token,
            user: user.profile(),
        })
    }
}
