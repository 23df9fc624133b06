//! Daily consumption endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum_extra::extract::Query;
use serde::Deserialize;
use tracing::info;

use crate::queries;
use crate::state::AppState;

use super::{run_statement, RowsResponse};

#[derive(Debug, Deserialize)]
pub struct ConsumeParams {
    /// Movement date, `DD-MM-YYYY`.
    pub fecha: String,
}

pub async fn consume(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConsumeParams>,
) -> RowsResponse {
    info!(fecha = %params.fecha, "Consumption query");

    let statement = queries::consume(&state.catalogs, &params.fecha);
    run_statement(&state, statement).await
}
