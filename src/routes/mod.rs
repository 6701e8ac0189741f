pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::{error, web};

use crate::auth::{AuthMiddleware, TokenVerifier};
use crate::error::AppError;

/// Mounts the `/auth` and `/tasks` scopes. Everything under `/tasks` sits
/// behind the access guard.
pub fn config(cfg: &mut web::ServiceConfig, verifier: TokenVerifier) {
    cfg.app_data(json_config())
        .service(
            web::scope("/auth")
                .service(auth::signup)
                .service(auth::login),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware::new(verifier))
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

/// Reports unreadable JSON bodies as validation errors rather than actix's
/// plain-text 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("rejected request body: {}", err);
        let message = match &err {
            error::JsonPayloadError::ContentType => "Expected a JSON body".to_string(),
            other => format!("Invalid JSON body: {}", other),
        };
        AppError::Validation(message).into()
    })
}
