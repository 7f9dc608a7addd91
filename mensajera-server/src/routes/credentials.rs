use std::str::FromStr;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mensajera_common::models::{Canal, Proveedor};
use mensajera_common::Error;

use crate::context::ServerContext;
use crate::routes::ApiError;

#[derive(Debug, Deserialize)]
pub struct InvalidarBody {
    pub credential_id: Option<Uuid>,
    pub canal: Option<String>,
    pub proveedor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvalidarResponse {
    pub success: bool,
}

/// POST /api/credenciales/invalidar
///
/// Drops cached credentials so the next resolve re-reads the database.
/// With a credential_id only that entry is dropped; with canal+proveedor
/// only that channel slot; with an empty body the whole cache.
pub async fn invalidar(
    State(ctx): State<Arc<ServerContext>>,
    Json(body): Json<InvalidarBody>,
) -> Result<Json<InvalidarResponse>, ApiError> {
    if let Some(id) = body.credential_id {
        ctx.resolver.invalidate_id(id);
    } else if let (Some(canal), Some(proveedor)) = (&body.canal, &body.proveedor) {
        let canal = Canal::from_str(canal).map_err(Error::Precondition)?;
        let proveedor = Proveedor::from_str(proveedor).map_err(Error::Precondition)?;
        ctx.resolver.invalidate(canal, proveedor);
    } else {
        ctx.resolver.invalidate_all();
    }

    Ok(Json(InvalidarResponse { success: true }))
}
