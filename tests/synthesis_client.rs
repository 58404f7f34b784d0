//! Synthesis client and controller against a simulated backend

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use tts_studio::playback::{PlaybackController, StateKind};
use tts_studio::tts::{
    Catalog, HttpSynthesisClient, SoundModel, SynthesisBackend, SynthesisError, SynthesisRequest,
    SynthesisResult,
};

const GENERATE_PATH: &str = "/api/generate-sound";

fn request(text: &str) -> SynthesisRequest {
    SynthesisRequest {
        model_endpoint: "https://api/a".to_string(),
        text: text.to_string(),
        media_type: None,
    }
}

fn client_for(server: &MockServer) -> HttpSynthesisClient {
    HttpSynthesisClient::new(format!("{}{}", server.uri(), GENERATE_PATH)).unwrap()
}

#[tokio::test]
async fn test_posts_exact_body_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"input": "hello", "modelUrl": "https://api/a"})))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x01, 0x02]))
        .expect(1)
        .mount(&server)
        .await;

    let audio = client_for(&server).synthesize(&request("hello")).await.unwrap();

    assert_eq!(audio.bytes.as_ref(), &[0x01, 0x02]);
    assert_eq!(audio.media_type, "audio/mpeg");
}

#[tokio::test]
async fn test_non_success_status_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("model is loading"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).synthesize(&request("hello")).await.unwrap_err();

    assert_eq!(err, SynthesisError::BackendRejected(500));
}

#[tokio::test]
async fn test_result_variant_for_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client_for(&server).synthesize_result(&request("hello")).await;

    match result {
        SynthesisResult::Failed(reason) => assert!(reason.contains("503")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_media_type_from_response_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"fLaC0000".to_vec(), "audio/flac"))
        .mount(&server)
        .await;

    let audio = client_for(&server).synthesize(&request("hello")).await.unwrap();

    assert_eq!(audio.media_type, "audio/flac");
}

#[tokio::test]
async fn test_configured_media_type_wins() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"OggS0000".to_vec(), "audio/ogg"))
        .mount(&server)
        .await;

    let mut req = request("hello");
    req.media_type = Some("audio/wav".to_string());
    let audio = client_for(&server).synthesize(&req).await.unwrap();

    assert_eq!(audio.media_type, "audio/wav");
}

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = HttpSynthesisClient::new(format!("http://127.0.0.1:{}{}", port, GENERATE_PATH)).unwrap();
    let err = client.synthesize(&request("hello")).await.unwrap_err();

    assert!(matches!(err, SynthesisError::Transport(_)), "got {:?}", err);
}

fn controller_for(server: &MockServer) -> Arc<PlaybackController> {
    let catalog = Catalog::new(vec![SoundModel::new("Voice A", "https://api/a")]).unwrap();
    Arc::new(
        PlaybackController::new(Arc::new(catalog), Arc::new(client_for(server)))
            .with_timeout(Duration::from_secs(5)),
    )
}

#[tokio::test]
async fn test_submission_reaches_ready_with_exact_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_json(json!({"input": "hello", "modelUrl": "https://api/a"})))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x01, 0x02]))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    let submission = controller.submit("https://api/a", "  hello  ").await.unwrap();
    submission.task.await.unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.kind, StateKind::Ready);
    let resource = snapshot.resource.unwrap();
    assert_eq!(resource.media_type, "audio/mpeg");

    let audio = controller.audio(resource.id).unwrap();
    assert_eq!(audio.bytes.as_ref(), &[0x01, 0x02]);
}

#[tokio::test]
async fn test_submission_rejected_by_backend_reaches_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    controller
        .submit("https://api/a", "hello")
        .await
        .unwrap()
        .task
        .await
        .unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.kind, StateKind::Error);
    assert!(snapshot.resource.is_none());
    assert_eq!(controller.resources().created(), 0);
}

#[tokio::test]
async fn test_invalid_submission_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    assert!(controller.submit("https://api/unknown", "hello").await.is_err());
    assert!(controller.submit("https://api/a", " \n ").await.is_err());
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![1])
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let catalog = Catalog::new(vec![SoundModel::new("Voice A", "https://api/a")]).unwrap();
    let controller = Arc::new(
        PlaybackController::new(Arc::new(catalog), Arc::new(client_for(&server)))
            .with_timeout(Duration::from_millis(100)),
    );

    controller
        .submit("https://api/a", "hello")
        .await
        .unwrap()
        .task
        .await
        .unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.kind, StateKind::Error);
    assert!(snapshot.reason.unwrap().contains("timed out"));
}
