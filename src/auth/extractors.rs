use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::token::AuthFailure;
use crate::error::AppError;

/// The caller's identity as resolved by `AuthMiddleware`.
///
/// This is the only source of identity handlers may use; ids in request bodies
/// or query strings are never trusted. Extraction fails with 401 when the
/// middleware did not run on the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().copied() {
            Some(user) => ready(Ok(user)),
            None => {
                log::error!("no authenticated user on {}; is AuthMiddleware mounted?", req.path());
                ready(Err(AppError::Unauthenticated(AuthFailure::MissingToken).into()))
            }
        }
    }
}
