use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::database;
use crate::gateway::PaymentGateway;

use super::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub gateway_available: bool,
    pub database: String,
}

pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let version = env!("CARGO_PKG_VERSION").to_string();

    let database = match database::health_check(&state.pool).await {
        Ok(()) => "up".to_string(),
        Err(_) => "down".to_string(),
    };

    let response = HealthResponse {
        status: "healthy".to_string(),
        version,
        environment: state.config.server.environment.clone(),
        gateway_available: state.gateway.is_available(),
        database,
    };

    Ok(Json(response))
}
