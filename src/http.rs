//! HTTP transport for daydream
//!
//! Axum server exposing one streaming operation (start a run) plus plain
//! health and info endpoints.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::clients::{GeneratorFactory, create_factory};
use crate::concepts::ConceptPool;
use crate::config::Config;
use crate::error::{DaydreamError, Result};
use crate::pipeline::{TurnSequencer, event_stream_response};

const MISSING_FIELDS: &str = "Missing apiKey or turns";

/// Shared state for HTTP server
#[derive(Clone)]
pub struct HttpState {
    pub config: Arc<Config>,
    /// Loaded once at startup, read-only for every run.
    pub pool: Arc<ConceptPool>,
    pub generators: Arc<dyn GeneratorFactory>,
}

impl HttpState {
    pub fn new(config: Config, pool: ConceptPool, generators: Arc<dyn GeneratorFactory>) -> Self {
        Self {
            config: Arc::new(config),
            pool: Arc::new(pool),
            generators,
        }
    }
}

/// Raw request body. Field names follow the browser client (`apiKey`,
/// `turns`); `credential` and `turnCount` are accepted too.
#[derive(Debug, Default, Deserialize)]
pub struct StartRunBody {
    #[serde(default, rename = "apiKey", alias = "credential")]
    pub api_key: Option<String>,
    #[serde(default, alias = "turnCount")]
    pub turns: Option<Value>,
}

/// A validated run request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub credential: String,
    pub turns: u32,
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Integers, and floats with no fractional part (`2.0`).
fn whole_number(value: &Value) -> Option<u64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_u64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= f64::from(u32::MAX))
            .map(|f| f as u64)
    })
}

impl StartRunBody {
    pub fn validate(self) -> Result<RunRequest> {
        let credential = self.api_key.unwrap_or_default();
        let turns = self.turns.unwrap_or(Value::Null);
        if credential.is_empty() || is_falsy(&turns) {
            return Err(DaydreamError::validation(MISSING_FIELDS));
        }
        let turns = whole_number(&turns)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| DaydreamError::validation("turns must be a positive integer"))?;
        Ok(RunRequest { credential, turns })
    }
}

pub fn parse_run_request(body: &[u8]) -> Result<RunRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DaydreamError::validation(MISSING_FIELDS));
    }
    let parsed: StartRunBody = serde_json::from_slice(body)
        .map_err(|e| DaydreamError::validation(format!("Invalid request body: {}", e)))?;
    parsed.validate()
}

/// Start a run and stream its events. Validation happens before any stream
/// is opened; later failures end the stream instead.
pub async fn start_run_handler(State(state): State<HttpState>, body: Bytes) -> Result<Response> {
    let request = parse_run_request(&body)?;
    let generator = state.generators.for_credential(&request.credential)?;
    let sequencer = TurnSequencer::new(generator, state.pool.clone(), request.turns);
    info!(
        run_id = %sequencer.run_id(),
        turns = request.turns,
        provider = state.generators.provider(),
        "Accepted daydream run"
    );
    Ok(event_stream_response(sequencer.into_stream()))
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// Info endpoint
pub async fn info_handler(State(state): State<HttpState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "model": {
                "provider": state.generators.provider(),
                "model": state.generators.model(),
            },
            "concepts": {
                "count": state.pool.len(),
                "source": state.config.concepts.seeds_path.display().to_string(),
            },
            "server": {
                "route": state.config.server.route,
                "bind": state.config.server.http_bind.to_string(),
            }
        })),
    )
}

pub fn router(state: HttpState) -> Router {
    let route = state.config.server.route.clone();
    Router::new()
        .route("/health", get(health_handler))
        .route("/info", get(info_handler))
        .route(&route, post(start_run_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

/// Start the HTTP server and run until `shutdown` is cancelled
pub async fn start_http_server(config: Config, shutdown: CancellationToken) -> Result<()> {
    let pool = ConceptPool::load(&config.concepts.seeds_path)?;
    let generators = create_factory(&config.model)?;
    let bind = config.server.http_bind;
    let route = config.server.route.clone();
    let app = router(HttpState::new(config, pool, generators));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| DaydreamError::config(format!("Failed to bind HTTP listener: {}", e)))?;

    info!("Starting HTTP server on {} (runs at POST {})", bind, route);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| DaydreamError::transport(format!("HTTP server error: {}", e)))?;

    info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_browser_field_names() {
        let req = parse_run_request(br#"{"apiKey":"k","turns":3}"#).unwrap();
        assert_eq!(
            req,
            RunRequest {
                credential: "k".into(),
                turns: 3
            }
        );
    }

    #[test]
    fn accepts_aliases() {
        let req = parse_run_request(br#"{"credential":"k","turnCount":1}"#).unwrap();
        assert_eq!(req.turns, 1);
    }

    #[test]
    fn missing_or_falsy_fields_are_rejected() {
        for body in [
            &br#"{"turns":3}"#[..],
            br#"{"apiKey":"","turns":3}"#,
            br#"{"apiKey":null,"turns":3}"#,
            br#"{"apiKey":"k"}"#,
            br#"{"apiKey":"k","turns":0}"#,
            br#"{"apiKey":"k","turns":null}"#,
            b"",
        ] {
            let err = parse_run_request(body).unwrap_err();
            assert!(
                matches!(&err, DaydreamError::Validation { message } if message == MISSING_FIELDS),
                "{:?} -> {:?}",
                String::from_utf8_lossy(body),
                err
            );
        }
    }

    #[test]
    fn whole_float_turns_are_accepted() {
        let req = parse_run_request(br#"{"apiKey":"k","turns":2.0}"#).unwrap();
        assert_eq!(req.turns, 2);
    }

    #[test]
    fn non_integer_turns_are_rejected() {
        for body in [
            &br#"{"apiKey":"k","turns":-2}"#[..],
            br#"{"apiKey":"k","turns":1.5}"#,
            br#"{"apiKey":"k","turns":"3"}"#,
            br#"{"apiKey":"k","turns":99999999999}"#,
            br#"not json"#,
        ] {
            assert!(matches!(
                parse_run_request(body),
                Err(DaydreamError::Validation { .. })
            ));
        }
    }
}
