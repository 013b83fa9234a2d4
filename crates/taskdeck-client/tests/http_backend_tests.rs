//! End-to-end tests for `HttpBackend` against a mock HTTP server.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use serde_json::{Value, json};
use taskdeck_client::http::DEFAULT_TIMEOUT;
use taskdeck_client::{BackendError, HttpBackend, TaskBackend};
use taskdeck_core::{HexColor, Priority, Tag, Task, TaskId};
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(format!("{}/api.php", server.uri()), DEFAULT_TIMEOUT)
        .expect("backend must build")
}

async fn only_request_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    requests[0].body_json().expect("request body is JSON")
}

#[tokio::test]
async fn get_tasks_posts_action_and_decodes_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api.php"))
        .and(body_json(json!({"action": "getTasks"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "tasks": [{
                "id": 1,
                "title": "Buy milk",
                "description": "",
                "is_completed": false,
                "priority": "high",
                "created_at": "2024-01-01T00:00:00Z",
                "due_date": null,
                "tags": ["urgent"]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = backend(&server).get_tasks().await.expect("tasks load");

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, Some(TaskId(1)));
    assert_eq!(tasks[0].priority, Priority::High);
    assert_eq!(tasks[0].tags, vec!["urgent".to_owned()]);
}

#[tokio::test]
async fn add_task_sends_fields_without_id_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer abc123"))
        .and(body_partial_json(json!({
            "action": "addTask",
            "title": "Write tests",
            "tags": ["dev"]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "created"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let task = Task::new("Write tests")
        .with_id(TaskId(99))
        .with_tags(["dev"]);

    backend(&server)
        .with_bearer_token("abc123")
        .add_task(&task)
        .await
        .expect("add succeeds");

    let body = only_request_body(&server).await;
    assert!(body.get("id").is_none());
}

#[tokio::test]
async fn requests_carry_client_user_agent() {
    let server = MockServer::start().await;
    let agent = format!("taskdeck/{}", env!("CARGO_PKG_VERSION"));
    Mock::given(method("POST"))
        .and(header("user-agent", agent.as_str()))
        .and(body_partial_json(json!({"action": "getTags"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "tags": [{"name": "home", "color": "#4CAF50"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tags = backend(&server).get_tags().await.expect("tags load");
    assert_eq!(tags, vec![Tag::new("home", HexColor::from_rgb(0x004C_AF50))]);
}

#[tokio::test]
async fn add_tag_sends_name_and_color() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({"action": "addTag", "name": "home", "color": "#4CAF50"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    let tag = Tag::new("home", HexColor::from_rgb(0x004C_AF50));

    backend(&server).add_tag(&tag).await.expect("add tag succeeds");
}

#[tokio::test]
async fn logical_failure_surfaces_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({"action": "deleteTask", "id": 5})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "Task not found"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = backend(&server)
        .delete_task(TaskId(5))
        .await
        .expect_err("rejection expected");

    assert!(!err.is_transport());
    assert_eq!(err.describe_user_facing(), "Task not found");
}

#[tokio::test]
async fn error_status_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let err = backend(&server).get_tags().await.expect_err("status error expected");

    assert!(matches!(err, BackendError::Status(500)));
    assert!(err.is_transport());
}

#[tokio::test]
async fn non_json_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = backend(&server).get_tasks().await.expect_err("decode error expected");
    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let err = HttpBackend::new(format!("http://{addr}/api.php"), DEFAULT_TIMEOUT)
        .expect("backend must build")
        .get_tasks()
        .await
        .expect_err("connection must fail");
    assert!(matches!(err, BackendError::Network(_)));
}
