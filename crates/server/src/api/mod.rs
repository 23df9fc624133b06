//! Endpoint modules for the warehouse façade.
//!
//! One sub-module per data endpoint; shared response types and the
//! statement-running helper live here in mod.rs.

mod consume;
mod historico;
mod stock;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

use cancha_warehouse::{rows_to_objects, Statement};

use crate::state::AppState;

pub use consume::consume;
pub use historico::historico;
pub use stock::stock;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct QueryErrorResponse {
    pub error: String,
}

/// Row objects as returned to the client, or the 500 error payload.
pub type RowsResponse =
    Result<Json<Vec<Map<String, Value>>>, (StatusCode, Json<QueryErrorResponse>)>;

// ── Root ─────────────────────────────────────────────────────────

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "¡Bienvenido a la API de Databricks! Usa /api/stock para obtener datos.",
    })
}

// ── Statement runner ─────────────────────────────────────────────

/// Execute a statement and normalize its rows to JSON objects.
///
/// Every failure past the extractor boundary (execution, transport,
/// warehouse-side errors) maps to a 500 with an `{"error": ...}` body.
pub(crate) async fn run_statement(state: &AppState, statement: Statement) -> RowsResponse {
    match state.executor.execute(&statement).await {
        Ok(result) => Ok(Json(rows_to_objects(&result))),
        Err(e) => {
            error!(error = %e, "Statement execution failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(QueryErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
