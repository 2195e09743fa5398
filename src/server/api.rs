//! HTTP API server implementation

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use regex::Regex;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::models::{
    BatchTranslationRequest, BatchTranslationResponse, ErrorDetail, ErrorResponse,
    TranslationRequest, TranslationResponse,
};
use crate::core::service::TranslationService;
use crate::core::transport::{BATCH_TRANSLATE_PATH, TRANSLATE_PATH};

/// Application state
#[derive(Clone)]
pub struct AppState {
    engine: Arc<dyn TranslationService>,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: ErrorDetail {
                message: message.into(),
                code: Some(code.to_string()),
            },
        }),
    )
}

/// Language tags such as `en`, `ja`, `zh-TW`, `zh_Hant`
fn language_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z]{2,3}([-_][A-Za-z0-9]{2,8})*$").expect("language pattern is valid")
    })
}

/// Whether `lang` looks like a language identifier.
///
/// Only the shape of the tag is checked: a 2-3 letter primary subtag
/// followed by `-` or `_` separated subtags. Well-formed codes are not
/// looked up in a registry, so an unknown code is left for the engine to
/// reject.
pub fn is_valid_language(lang: &str) -> bool {
    language_pattern().is_match(lang)
}

/// Canonical `-` separated form of a valid tag
pub fn normalize_language(lang: &str) -> Option<String> {
    is_valid_language(lang).then(|| lang.replace('_', "-"))
}

fn normalize_languages(source_lang: &mut String, target_lang: &mut String) -> Result<(), ApiError> {
    for lang in [source_lang, target_lang] {
        match normalize_language(lang) {
            Some(normalized) => *lang = normalized,
            None => {
                return Err(api_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_language",
                    format!("Invalid language identifier: {:?}", lang),
                ))
            }
        }
    }
    Ok(())
}

/// Health check handler
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `Translate` handler
async fn translate(
    State(state): State<Arc<AppState>>,
    Json(mut payload): Json<TranslationRequest>,
) -> ApiResult<TranslationResponse> {
    normalize_languages(&mut payload.source_lang, &mut payload.target_lang)?;

    match state.engine.translate(&payload).await {
        Ok(translated_text) => Ok(Json(TranslationResponse {
            translated_text: Some(translated_text),
        })),
        Err(e) => {
            warn!("Translation failed for {:?}: {}", payload.text, e);
            Err(api_error(
                StatusCode::BAD_GATEWAY,
                "translation_error",
                e.to_string(),
            ))
        }
    }
}

/// `BatchTranslate` handler; fails as a whole if any item fails
async fn batch_translate(
    State(state): State<Arc<AppState>>,
    Json(mut payload): Json<BatchTranslationRequest>,
) -> ApiResult<BatchTranslationResponse> {
    normalize_languages(&mut payload.source_lang, &mut payload.target_lang)?;
    debug!("Batch of {} texts ({}->{})", payload.len(), payload.source_lang, payload.target_lang);

    match state.engine.batch_translate(&payload).await {
        Ok(translated_texts) => Ok(Json(BatchTranslationResponse {
            translated_texts: Some(translated_texts),
        })),
        Err(e) => {
            warn!("Batch translation of {} texts failed: {}", payload.len(), e);
            Err(api_error(
                StatusCode::BAD_GATEWAY,
                "translation_error",
                e.to_string(),
            ))
        }
    }
}

/// Build the router for a translation engine
pub fn router(engine: Arc<dyn TranslationService>) -> Router {
    let state = Arc::new(AppState { engine });

    Router::new()
        .route("/", get(health_check))
        .route(TRANSLATE_PATH, post(translate))
        .route(BATCH_TRANSLATE_PATH, post(batch_translate))
        .with_state(state)
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, engine: Arc<dyn TranslationService>) -> anyhow::Result<()> {
    info!("Translation service listening on {}", listener.local_addr()?);
    axum::serve(listener, router(engine)).await?;
    Ok(())
}

/// Run the HTTP server
pub async fn run_server(
    host: String,
    port: u16,
    engine: Arc<dyn TranslationService>,
) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    serve(listener, engine).await
}
