// SPDX-License-Identifier: MIT

//! HTTP surface over the expression facade and the permission checker

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Settings;
use crate::error::PermitError;
use crate::expression::{self, Context, ParseResult};
use crate::rules::{AccessContext, PermissionChecker, RulesLoader};

/// Shared handler state
pub struct AppState {
    pub settings: Settings,
    pub checker: Option<PermissionChecker>,
}

impl AppState {
    /// Load and validate the configured rules file, if any
    pub fn from_settings(settings: Settings) -> Result<Self, PermitError> {
        let checker = match &settings.rules_file {
            Some(path) => {
                let rules = RulesLoader::new().load_rules(path)?;
                Some(PermissionChecker::with_limits(rules, settings.limits)?)
            }
            None => None,
        };
        Ok(Self { settings, checker })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/validate", post(validate_expression))
        .route("/api/evaluate", post(evaluate_expression))
        .route("/api/permissions/check", post(check_permission))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(settings: Settings) -> Result<(), PermitError> {
    let port = settings.port;
    let state = Arc::new(AppState::from_settings(settings)?);
    match &state.checker {
        Some(checker) => log::info!(
            "Serving {} entities and {} workflows",
            checker.rules().entities.len(),
            checker.rules().workflows.len()
        ),
        None => log::warn!("No rules file configured; permission checks will deny everything"),
    }
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Deserialize)]
struct ValidateRequest {
    expression: String,
}

async fn validate_expression(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ValidateRequest>,
) -> Json<ParseResult> {
    Json(expression::validate_with(
        &payload.expression,
        &state.settings.limits,
    ))
}

#[derive(Deserialize)]
struct EvaluateRequest {
    expression: String,
    #[serde(default)]
    context: Value,
}

async fn evaluate_expression(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EvaluateRequest>,
) -> Json<ParseResult> {
    let ctx = match Context::try_from(payload.context) {
        Ok(ctx) => ctx,
        Err(e) => return Json(ParseResult::failure(e.to_string())),
    };
    Json(expression::evaluate_with(
        &payload.expression,
        &ctx,
        &state.settings.limits,
    ))
}

#[derive(Deserialize)]
struct PermissionRequest {
    entity: String,
    action: String,
    #[serde(default)]
    user: Option<Value>,
    #[serde(default)]
    record: Option<Value>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

async fn check_permission(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PermissionRequest>,
) -> Json<Value> {
    let Some(checker) = &state.checker else {
        return Json(json!({ "allowed": false, "error": "No rules loaded" }));
    };

    let mut access = match payload.user {
        Some(user) => AccessContext::for_user(user),
        None => AccessContext::anonymous(),
    };
    if let Some(record) = payload.record {
        access = access.with_entity(record);
    }
    if let Some(method) = payload.method {
        access = access.with_request(method, payload.path.unwrap_or_default());
    }

    let allowed = checker.can(&payload.entity, &payload.action, &access);
    log::debug!(
        "Permission {}.{} -> {}",
        payload.entity,
        payload.action,
        allowed
    );
    Json(json!({ "allowed": allowed }))
}
