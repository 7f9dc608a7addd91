use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mensajera_common::models::DestinatariosConfig;

use crate::context::ServerContext;
use crate::routes::ApiError;

#[derive(Debug, Deserialize)]
pub struct EjecutarBody {
    pub destinatarios: DestinatariosConfig,
}

#[derive(Debug, Serialize)]
pub struct EjecutarResponse {
    pub success: bool,
    pub enviados: usize,
    pub fallidos: usize,
    pub total: usize,
}

/// POST /api/campanas/{id}/ejecutar
///
/// Runs the whole campaign within the request. The response arrives after
/// the last recipient was attempted, with per-state counts.
pub async fn ejecutar(
    State(ctx): State<Arc<ServerContext>>,
    Path(id): Path<Uuid>,
    Json(body): Json<EjecutarBody>,
) -> Result<Json<EjecutarResponse>, ApiError> {
    let resumen = ctx.campaigns.ejecutar(id, &body.destinatarios).await?;

    Ok(Json(EjecutarResponse {
        success: true,
        enviados: resumen.enviados,
        fallidos: resumen.fallidos,
        total: resumen.total,
    }))
}
