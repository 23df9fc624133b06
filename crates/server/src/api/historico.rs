//! Historical production endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum_extra::extract::Query;
use serde::Deserialize;
use tracing::info;

use crate::queries;
use crate::state::AppState;

use super::{run_statement, RowsResponse};

#[derive(Debug, Deserialize)]
pub struct HistoricoParams {
    /// Range start, `DD-MM-YYYY` (inclusive).
    pub fecha_inicio: String,
    /// Range end, `DD-MM-YYYY` (inclusive).
    pub fecha_fin: String,
    /// Plant identifier. The capitalised key is the published parameter name.
    #[serde(rename = "Id_planta")]
    pub id_planta: String,
}

pub async fn historico(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoricoParams>,
) -> RowsResponse {
    info!(
        fecha_inicio = %params.fecha_inicio,
        fecha_fin = %params.fecha_fin,
        id_planta = %params.id_planta,
        "Production history query"
    );

    let statement = queries::historico(
        &state.catalogs,
        &params.fecha_inicio,
        &params.fecha_fin,
        &params.id_planta,
    );
    run_statement(&state, statement).await
}
