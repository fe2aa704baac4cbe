//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use super::generator::GenerationParams;
use super::state::AppState;
use crate::error::PlaygroundError;
use crate::models::ModelProfile;
use crate::story::{build_prompt, parse_story, ErrorDetail, GenerationRequest, GENERATE_PATH};

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors_enabled = state.config.cors_enabled;

    let router = Router::new()
        .route("/api/health", get(health_check))
        .route("/foundation-models", get(list_models))
        .route("/foundation-models/model/:model_id", get(get_model))
        .route(GENERATE_PATH, post(generate_story))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_enabled {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorDetail {
            detail: detail.into(),
        }),
    )
        .into_response()
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always "healthy" when the service answers
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Seconds since start
    pub uptime_secs: u64,
    /// Number of profiles in the catalog
    pub model_count: usize,
    /// Profile requests are validated against
    pub default_model: String,
    /// Whether an upstream API key is configured
    pub upstream_configured: bool,
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.uptime().as_secs(),
        model_count: state.registry.len(),
        default_model: state.active_profile().model_id.clone(),
        upstream_configured: state.config.api_key.is_some(),
    })
}

/// List the catalog in display order
async fn list_models(State(state): State<Arc<AppState>>) -> Json<Vec<ModelProfile>> {
    tracing::info!("Listing {} model profiles", state.registry.len());
    Json(state.registry.list_profiles().to_vec())
}

/// One profile by id
async fn get_model(State(state): State<Arc<AppState>>, Path(model_id): Path<String>) -> Response {
    match state.registry.lookup(&model_id) {
        Ok(profile) => Json(profile.clone()).into_response(),
        Err(e) => {
            tracing::warn!("{e}");
            error_response(StatusCode::NOT_FOUND, format!("Model '{model_id}' not found"))
        },
    }
}

/// Validate, prompt, generate, split title
async fn generate_story(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerationRequest>,
) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("generate", %request_id);

    async move {
        let profile = match state.resolve_profile(request.model_id.as_deref()) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Rejected request: {e}");
                return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
            },
        };
        if let Err(e) = request.validate(profile) {
            tracing::warn!("Rejected request: {e}");
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
        }

        let prompt = build_prompt(&request, &mut rand::thread_rng());
        tracing::debug!(%prompt, "Built prompt");

        let params = GenerationParams {
            prompt: &prompt,
            model: state.upstream_model(request.model_id.as_deref()),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        match state.generator.generate(params).await {
            Ok(text) => {
                let story = parse_story(&text);
                tracing::info!(title = %story.title, generator = state.generator.name(), "Story generated");
                Json(story).into_response()
            },
            Err(PlaygroundError::AccessDenied(cause)) => {
                tracing::error!(%cause, "Upstream denied access");
                error_response(StatusCode::FORBIDDEN, "Access denied to the story generator")
            },
            Err(e) => {
                tracing::error!(error = %e, "Story generation failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Story generation failed")
            },
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::error::Result;
    use crate::models::ModelRegistry;
    use crate::server::generator::{GenerateFuture, StoryGenerator};
    use crate::story::StoryResponse;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use tower::ServiceExt;

    enum Reply {
        Text(&'static str),
        Denied,
        Fail,
    }

    /// Generator returning a fixed reply and remembering the last params
    struct FixedGenerator {
        reply: Reply,
        seen: Mutex<Option<(String, String, f64, u32)>>,
    }

    impl FixedGenerator {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(None),
            })
        }
    }

    impl StoryGenerator for FixedGenerator {
        fn generate<'a>(&'a self, params: GenerationParams<'a>) -> GenerateFuture<'a> {
            *self.seen.lock().unwrap() = Some((
                params.prompt.to_string(),
                params.model.to_string(),
                params.temperature,
                params.max_tokens,
            ));
            let result: Result<String> = match self.reply {
                Reply::Text(text) => Ok(text.to_string()),
                Reply::Denied => Err(PlaygroundError::AccessDenied("403".into())),
                Reply::Fail => Err(PlaygroundError::Upstream("secret internals".into())),
            };
            Box::pin(async move { result })
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn app(generator: Arc<FixedGenerator>) -> Router {
        let state = AppState::new(
            ServerConfig::default(),
            Arc::new(ModelRegistry::new()),
            generator,
        );
        create_router(Arc::new(state))
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn post_generate(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(GENERATE_PATH)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(app(FixedGenerator::new(Reply::Fail)), get_request("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["default_model"], "anthropic.claude-3-5-sonnet-20240620-v1:0");
        assert_eq!(body["upstream_configured"], false);
    }

    #[tokio::test]
    async fn test_list_models() {
        let (status, body) =
            call(app(FixedGenerator::new(Reply::Fail)), get_request("/foundation-models")).await;
        assert_eq!(status, StatusCode::OK);
        let models = body.as_array().unwrap();
        assert_eq!(models.len(), ModelRegistry::new().len());
        assert_eq!(models[0]["modelName"], "Claude 3.5 Sonnet");
    }

    #[tokio::test]
    async fn test_get_model() {
        let (status, body) = call(
            app(FixedGenerator::new(Reply::Fail)),
            get_request("/foundation-models/model/ai21.j2-mid-v1"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["maxTokenRange"]["max"], 8191);

        let (status, body) = call(
            app(FixedGenerator::new(Reply::Fail)),
            get_request("/foundation-models/model/unknown"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Model 'unknown' not found");
    }

    #[tokio::test]
    async fn test_generate_story() {
        let generator = FixedGenerator::new(Reply::Text("Title: Test Story\n\nThis is a test story."));
        let (status, body) = call(
            app(generator.clone()),
            post_generate(json!({
                "theme": "mystery",
                "genre": "thriller",
                "characters": 3,
                "length": "short",
                "temperature": 0.8,
                "maxTokens": 200
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let story: StoryResponse = serde_json::from_value(body).unwrap();
        assert_eq!(story, StoryResponse::new("Test Story", "This is a test story."));

        let (prompt, model, temperature, max_tokens) = generator.seen.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("mystery theme"));
        assert!(prompt.contains("3 main characters"));
        assert_eq!(model, "anthropic.claude-3-5-sonnet-20240620-v1:0");
        assert_eq!(temperature, 0.8);
        assert_eq!(max_tokens, 200);
    }

    #[tokio::test]
    async fn test_generate_rejects_out_of_range() {
        let generator = FixedGenerator::new(Reply::Text("unused"));
        let (status, body) = call(
            app(generator.clone()),
            post_generate(json!({"temperature": 1.5, "maxTokens": 200})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("temperature"));
        assert!(generator.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_generate_with_named_profile() {
        let generator = FixedGenerator::new(Reply::Text("Title: Wide\n\nLong enough."));
        let (status, _) = call(
            app(generator.clone()),
            post_generate(json!({
                "temperature": 0.7,
                "maxTokens": 8000,
                "modelId": "ai21.j2-mid-v1"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, model, _, max_tokens) = generator.seen.lock().unwrap().clone().unwrap();
        assert_eq!(model, "ai21.j2-mid-v1");
        assert_eq!(max_tokens, 8000);
    }

    #[tokio::test]
    async fn test_generate_unknown_profile() {
        let generator = FixedGenerator::new(Reply::Text("unused"));
        let (status, body) = call(
            app(generator.clone()),
            post_generate(json!({"temperature": 0.5, "maxTokens": 100, "modelId": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("nope"));
        assert!(generator.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_generate_access_denied() {
        let (status, _) = call(
            app(FixedGenerator::new(Reply::Denied)),
            post_generate(json!({"temperature": 0.5, "maxTokens": 100})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_generate_failure_hides_cause() {
        let (status, body) = call(
            app(FixedGenerator::new(Reply::Fail)),
            post_generate(json!({"temperature": 0.5, "maxTokens": 100})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Story generation failed");
    }
}
