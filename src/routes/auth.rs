use crate::{
    auth::{LoginRequest, SignupRequest},
    error::AppError,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;

/// Register a new user
///
/// Creates the account; the client logs in separately to obtain a token.
#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    signup_data: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    state.accounts.signup(signup_data.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "User created successfully"
    })))
}

/// Login user
///
/// Authenticates a user and returns a session token with their profile.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let response = state.accounts.login(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
