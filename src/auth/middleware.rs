use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthenticatedUser;
use crate::auth::token::{AuthFailure, TokenVerifier};
use crate::error::AppError;

/// Access guard for protected scopes.
///
/// Rejects the request with 401 unless its `Authorization` header carries a
/// valid token for an existing user. On success the resolved identity is
/// stored in request extensions as [`AuthenticatedUser`].
#[derive(Clone)]
pub struct AuthMiddleware {
    verifier: TokenVerifier,
}

impl AuthMiddleware {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    verifier: TokenVerifier,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = self.verifier.clone();

        Box::pin(async move {
            let raw = req
                .headers()
                .get(header::AUTHORIZATION)
                .map(|value| value.to_str().map(str::to_owned));

            let outcome = match raw {
                None => Err(AuthFailure::MissingToken.into()),
                Some(Ok(value)) if value.trim().is_empty() => {
                    Err(AuthFailure::MissingToken.into())
                }
                Some(Ok(value)) => verifier.verify(&value).await,
                Some(Err(_)) => Err(AuthFailure::InvalidToken.into()),
            };

            match outcome {
                Ok(user_id) => {
                    req.extensions_mut().insert(AuthenticatedUser(user_id));
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    reject(&req, &err);
                    let response = err.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

// Store failures are already logged where they are converted into `AppError`.
fn reject(req: &ServiceRequest, err: &AppError) {
    if let AppError::Unauthenticated(reason) = err {
        log::warn!(
            "rejected {} {}: {:?}",
            req.method(),
            req.path(),
            reason
        );
    }
}
