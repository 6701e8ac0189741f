#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use taskforge::store::Stores;
use taskforge::{routes, AppState, Config};

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config() -> Config {
    Config::from_lookup(|name| match name {
        "DATABASE_URL" => Some("memory://".to_string()),
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        // Lowest cost bcrypt accepts, to keep the suite fast.
        "BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .expect("test config should be valid")
}

pub fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(&test_config(), Stores::memory()))
}

/// The full application, as `main` assembles it, over a fresh in-memory store.
pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    let verifier = state.verifier.clone();
    test::init_service(
        App::new()
            .wrap(Logger::default())
            .app_data(state)
            .service(routes::health::health)
            .configure(|cfg| routes::config(cfg, verifier)),
    )
    .await
}

/// Sends a request and returns the status with the decoded JSON body.
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: test::TestRequest,
) -> (StatusCode, Value) {
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            panic!(
                "response is not JSON ({}): {:?}",
                e,
                String::from_utf8_lossy(&body)
            )
        })
    };
    (status, json)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Signs up a user and logs in, returning the session token.
pub async fn signup_and_login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
    name: &str,
) -> String {
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/auth/signup").set_json(json!({
            "email": email,
            "password": password,
            "name": name
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);

    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/auth/login").set_json(json!({
            "email": email,
            "password": password
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);

    body["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}
