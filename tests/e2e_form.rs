//! End-to-end form submission tests.
//!
//! These drive a `ParameterForm` against real HTTP endpoints and against
//! gated transports to check the in-flight and teardown behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::post, Json, Router};
use playground::{
    config::ClientConfig,
    form::{run_submission, ParameterForm},
    models::ModelRegistry,
    story::{GenerationRequest, StoryResponse, GENERATE_PATH},
    transport::{HttpTransport, SendFuture, StoryTransport},
    USER_FACING_ERROR,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, Notify};
use tokio::time::timeout;

/// Serve `router` on an ephemeral port and return a client config for it
async fn spawn_endpoint(router: Router) -> (ClientConfig, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let config = ClientConfig {
        api_host: "http://127.0.0.1".to_string(),
        api_port: port,
        timeout_secs: 5,
    };
    (config, handle)
}

fn default_form() -> ParameterForm {
    ParameterForm::new(Arc::new(ModelRegistry::new()))
}

/// Transport that blocks inside `send` until released
struct GatedTransport {
    calls: AtomicUsize,
    entered: Notify,
    release: Notify,
}

impl GatedTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Notify::new(),
        })
    }
}

impl StoryTransport for GatedTransport {
    fn send<'a>(&'a self, _request: &'a GenerationRequest) -> SendFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(StoryResponse::new("The Gate", "It opened."))
        })
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

#[tokio::test]
async fn test_server_error_keeps_fields() {
    let router = Router::new().route(
        GENERATE_PATH,
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let (config, server) = spawn_endpoint(router).await;
    let transport = HttpTransport::new(&config).unwrap();

    let mut form = default_form();
    assert!(form.set_temperature(0.7));
    assert!(form.set_max_tokens(2000));

    let applied = timeout(Duration::from_secs(10), form.submit_with(&transport))
        .await
        .expect("Submission timed out")
        .unwrap();

    assert!(applied);
    assert_eq!(form.last_error(), Some(USER_FACING_ERROR));
    assert!(form.last_story().is_none());
    assert!(!form.is_submitting());
    assert_eq!(form.state().temperature, 0.7);
    assert_eq!(form.state().max_tokens, 2000);

    server.abort();
}

#[tokio::test]
async fn test_successful_submission_posts_form_values() {
    let router = Router::new().route(
        GENERATE_PATH,
        post(|Json(body): Json<Value>| async move {
            Json(json!({
                "title": "Echo",
                "story": format!(
                    "{} {} {}",
                    body["temperature"], body["maxTokens"], body["characters"]
                ),
            }))
        }),
    );
    let (config, server) = spawn_endpoint(router).await;
    let transport = HttpTransport::new(&config).unwrap();

    let mut form = default_form();
    assert!(form.set_temperature(0.25));
    assert!(form.set_max_tokens(300));
    assert!(form.set_characters(4));

    assert!(form.submit_with(&transport).await.unwrap());

    let story = form.last_story().expect("story applied");
    assert_eq!(story.title, "Echo");
    assert_eq!(story.story, "0.25 300 4");
    assert!(form.last_error().is_none());

    server.abort();
}

#[tokio::test]
async fn test_unreachable_service_reports_generic_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = ClientConfig {
        api_host: "http://127.0.0.1".to_string(),
        api_port: port,
        timeout_secs: 2,
    };
    let transport = HttpTransport::new(&config).unwrap();

    let mut form = default_form();
    assert!(form.submit_with(&transport).await.unwrap());
    assert_eq!(form.last_error(), Some(USER_FACING_ERROR));
}

#[tokio::test]
async fn test_second_submit_while_in_flight_sends_nothing() {
    let form = Arc::new(Mutex::new(default_form()));
    let transport = GatedTransport::new();

    let first = {
        let form = form.clone();
        let transport = transport.clone();
        tokio::spawn(async move { run_submission(&form, transport.as_ref()).await })
    };

    transport.entered.notified().await;
    assert!(form.lock().await.is_submitting());

    let second = run_submission(&form, transport.as_ref()).await.unwrap();
    assert!(!second);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

    transport.release.notify_one();
    let applied = first.await.unwrap().unwrap();
    assert!(applied);

    let form = form.lock().await;
    assert!(!form.is_submitting());
    assert_eq!(form.last_story().unwrap().title, "The Gate");
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_dispose_discards_in_flight_response() {
    let form = Arc::new(Mutex::new(default_form()));
    let transport = GatedTransport::new();

    let pending = {
        let form = form.clone();
        let transport = transport.clone();
        tokio::spawn(async move { run_submission(&form, transport.as_ref()).await })
    };

    transport.entered.notified().await;
    form.lock().await.dispose();
    transport.release.notify_one();

    let applied = pending.await.unwrap().unwrap();
    assert!(!applied);

    let form = form.lock().await;
    assert!(form.is_disposed());
    assert!(form.last_story().is_none());
    assert!(form.last_error().is_none());
}
