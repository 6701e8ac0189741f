mod common;

use std::net::TcpListener;

use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{rt, test, App, HttpServer};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use common::{bearer, init_app, send, signup_and_login, test_state};
use taskforge::routes;

#[test_log::test(actix_rt::test)]
async fn test_task_crud_flow() {
    let app = init_app(test_state()).await;
    let token = signup_and_login(&app, "crud@example.com", "PasswordCrud123!", "Crud").await;

    // 1. Create, with a foreign owner id in the body that must be ignored
    let foreign_owner = Uuid::new_v4();
    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/tasks")
            .insert_header(bearer(&token))
            .set_json(json!({
                "title": "  CRUD Task 1 Original ",
                "description": "Initial description",
                "due_date": "2030-01-15",
                "user_id": foreign_owner
            })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    assert_eq!(body["message"], "Task created successfully");
    let created = body["task"].clone();
    assert_eq!(created["title"], "CRUD Task 1 Original");
    assert_eq!(created["status"], "Pending");
    assert_eq!(created["priority"], "Medium");
    assert_eq!(created["due_date"], "2030-01-15T00:00:00Z");
    assert_ne!(created["user_id"], json!(foreign_owner));
    let task_id = created["id"].as_str().unwrap().to_string();

    // 2. Get round-trips exactly what create returned
    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/tasks/{}", task_id))
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"], created);

    // 3. Partial update: status changes, due date is cleared, rest untouched
    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/tasks/{}", task_id))
            .insert_header(bearer(&token))
            .set_json(json!({ "status": "In Progress", "due_date": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update failed: {}", body);
    assert_eq!(body["message"], "Task updated successfully");
    assert_eq!(body["task"]["status"], "In Progress");
    assert_eq!(body["task"]["due_date"], json!(null));
    assert_eq!(body["task"]["title"], "CRUD Task 1 Original");
    assert_eq!(body["task"]["description"], "Initial description");
    assert_eq!(body["task"]["created_at"], created["created_at"]);

    // A later read sees the cleared due date too
    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/tasks/{}", task_id))
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["due_date"], json!(null));
    assert_eq!(body["task"]["status"], "In Progress");

    // 4. List
    let (status, body) = send(
        &app,
        test::TestRequest::get().uri("/tasks").insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["tasks"][0]["id"], task_id.as_str());

    // 5. Delete twice
    let delete = || {
        test::TestRequest::delete()
            .uri(&format!("/tasks/{}", task_id))
            .insert_header(bearer(&token))
    };
    let (status, body) = send(&app, delete()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Task deleted successfully", "task_id": task_id })
    );
    let (status, body) = send(&app, delete()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[actix_rt::test]
async fn test_tasks_are_isolated_between_users() {
    let app = init_app(test_state()).await;
    let alice = signup_and_login(&app, "alice@example.com", "pw-alice", "Alice").await;
    let bob = signup_and_login(&app, "bob@example.com", "pw-bob", "Bob").await;

    let (_, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/tasks")
            .insert_header(bearer(&alice))
            .set_json(json!({ "title": "Alice's secret" })),
    )
    .await;
    let uri = format!("/tasks/{}", body["task"]["id"].as_str().unwrap());

    let attempts = vec![
        ("get", test::TestRequest::get().uri(&uri)),
        (
            "update",
            test::TestRequest::put()
                .uri(&uri)
                .set_json(json!({ "title": "Bob was here" })),
        ),
        ("delete", test::TestRequest::delete().uri(&uri)),
    ];
    for (what, req) in attempts {
        let (status, body) = send(&app, req.insert_header(bearer(&bob))).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "bob could {} alice's task", what);
        assert_eq!(body["message"], "Task not found");
    }

    let (_, body) = send(
        &app,
        test::TestRequest::get().uri("/tasks").insert_header(bearer(&bob)),
    )
    .await;
    assert_eq!(body["count"], 0);

    let (status, body) = send(
        &app,
        test::TestRequest::get().uri(&uri).insert_header(bearer(&alice)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["title"], "Alice's secret");
}

#[actix_rt::test]
async fn test_invalid_task_inputs() {
    let app = init_app(test_state()).await;
    let token = signup_and_login(&app, "v@example.com", "pw", "V").await;

    let test_cases = vec![
        (json!({}), "missing title"),
        (json!({ "title": "   " }), "blank title"),
        (json!({ "title": "t".repeat(201) }), "title too long"),
        (json!({ "title": "x", "status": "Bogus" }), "unknown status"),
        (json!({ "title": "x", "priority": "Urgent" }), "unknown priority"),
        (json!({ "title": "x", "due_date": "tomorrow" }), "bad due date"),
        (json!({ "title": 42 }), "title is not a string"),
    ];
    for (payload, description) in test_cases {
        let (status, body) = send(
            &app,
            test::TestRequest::post()
                .uri("/tasks")
                .insert_header(bearer(&token))
                .set_json(&payload),
        )
        .await;
        assert_eq!(
            status,
            StatusCode::BAD_REQUEST,
            "Test case failed: {}. Body: {}",
            description,
            body
        );
        assert_eq!(body["error"], "ValidationError", "{}", description);
    }

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri("/tasks/not-a-uuid")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid task ID");

    let (_, body) = send(
        &app,
        test::TestRequest::get().uri("/tasks").insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(body["count"], 0);
}

#[actix_rt::test]
async fn test_create_task_unauthorized() {
    let server_state = test_state();

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = HttpServer::new(move || {
        let verifier = server_state.verifier.clone();
        App::new()
            .wrap(Logger::default())
            .app_data(server_state.clone())
            .configure(|cfg| routes::config(cfg, verifier))
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to listen on test port")
    .run();
    let handle = server.handle();
    rt::spawn(server);

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/tasks", port))
        .json(&json!({ "title": "Unauthorized Task" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await.expect("error body is JSON");
    assert_eq!(body["error"], "Unauthenticated");
    assert_eq!(body["message"], "Token is missing");

    handle.stop(true).await;
}
