//! End-of-day stock endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum_extra::extract::Query;
use serde::Deserialize;
use tracing::info;

use crate::queries;
use crate::state::AppState;

use super::{run_statement, RowsResponse};

/// Query parameters for `GET /api/stock`. The code lists bind from repeated
/// query keys (`?codigos_centros=4&codigos_centros=19`). All required; the
/// extractor rejects requests missing any of them before SQL is built.
#[derive(Debug, Deserialize)]
pub struct StockParams {
    /// Movement date, `YYYY-MM-DD`.
    pub fecha: String,
    /// Yard (centro) codes.
    pub codigos_centros: Vec<String>,
    /// Location (cancha) codes.
    pub codigos_canchas: Vec<String>,
}

pub async fn stock(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StockParams>,
) -> RowsResponse {
    info!(
        fecha = %params.fecha,
        centros = params.codigos_centros.len(),
        canchas = params.codigos_canchas.len(),
        "Stock query"
    );

    let statement = queries::stock(
        &state.catalogs,
        &params.fecha,
        &params.codigos_centros,
        &params.codigos_canchas,
    );
    run_statement(&state, statement).await
}
