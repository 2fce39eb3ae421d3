use studypath_sync::{HttpRemote, RemoteApi, RemoteConfig, SyncError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn remote(server: &MockServer) -> HttpRemote {
    HttpRemote::new(RemoteConfig {
        base_url: server.uri(),
        ..RemoteConfig::default()
    })
}

#[test]
fn config_defaults() {
    let cfg = RemoteConfig::default();
    assert_eq!(cfg.base_url, "https://api.studypath.app/v1");
    assert!(cfg.bearer_token.is_empty());
    assert_eq!(cfg.timeout_secs, 30);
}

#[tokio::test]
async fn ping_issues_a_head_request_to_the_status_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    remote(&server).ping().await.unwrap();
}

#[tokio::test]
async fn ping_failure_surfaces_as_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = remote(&server).ping().await.unwrap_err();
    assert!(matches!(err, SyncError::Remote { status: 503, .. }));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Nothing listens on this port.
    let client = HttpRemote::new(RemoteConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        ..RemoteConfig::default()
    });
    let err = client.ping().await.unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
}

#[tokio::test]
async fn create_exam_posts_the_payload_as_json() {
    let server = MockServer::start().await;
    let payload = serde_json::json!({ "id": "exam-1", "title": "Paper 2" });
    Mock::given(method("POST"))
        .and(path("/exams"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    remote(&server).create_exam(&payload).await.unwrap();
}

#[tokio::test]
async fn bearer_token_is_attached_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpRemote::new(RemoteConfig {
        base_url: server.uri(),
        bearer_token: "secret-token".to_string(),
        ..RemoteConfig::default()
    });
    client
        .update_profile(&serde_json::json!({ "subject": "maths" }))
        .await
        .unwrap();
}

#[tokio::test]
async fn single_deletes_target_the_id_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/schedule/items/item-9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/exams/exam-3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = remote(&server);
    client.delete_schedule_item("item-9").await.unwrap();
    client.delete_exam("exam-3").await.unwrap();
}

#[tokio::test]
async fn batch_schedule_endpoints_have_their_own_paths() {
    let server = MockServer::start().await;
    for p in [
        "/schedule/items/batch",
        "/schedule/items/batch-delete",
        "/schedule/items/batch-move",
    ] {
        Mock::given(method("POST"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = remote(&server);
    let payload = serde_json::json!([{ "id": "a" }]);
    client.create_schedule_items(&payload).await.unwrap();
    client.delete_schedule_items(&payload).await.unwrap();
    client.move_schedule_items(&payload).await.unwrap();
}

#[tokio::test]
async fn remote_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/results"))
        .respond_with(ResponseTemplate::new(422).set_body_string("marks out of range"))
        .mount(&server)
        .await;

    let err = remote(&server)
        .update_result(&serde_json::json!({ "id": "r1" }))
        .await
        .unwrap_err();
    match err {
        SyncError::Remote { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "marks out of range");
        }
        other => panic!("unexpected error: {other}"),
    }
}
