use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use mensajera_common::models::{
    EstadoMensaje, EventLogEntry, FalloEnvio, ResultadoEvento, TipoMensaje,
};
use mensajera_common::Error;
use mensajera_core::services::campaign::variables_posicionales;
use mensajera_core::services::{NoopObserver, SendKind, SendRequest};

use crate::context::ServerContext;
use crate::routes::ApiError;

const MASIVO_ENVIOS_POR_SEGUNDO: u64 = 10;

#[derive(Debug, Deserialize)]
pub struct EnviarBody {
    pub telefono: String,
    pub tipo: String,
    pub contenido_texto: Option<String>,
    pub media_url: Option<String>,
    pub template_id: Option<Uuid>,
    pub template_variables: Option<Value>,
    pub conversacion_id: Option<Uuid>,
    pub credential_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct EnviarResponse {
    pub success: bool,
    pub provider_message_id: String,
    pub mensaje_id: Option<Uuid>,
    pub estado: EstadoMensaje,
}

fn build_kind(
    tipo: TipoMensaje,
    contenido_texto: Option<String>,
    media_url: Option<String>,
    template_id: Option<Uuid>,
    template_variables: Option<&Value>,
) -> Result<SendKind, Error> {
    match tipo {
        TipoMensaje::Template => {
            let template_id = template_id
                .ok_or_else(|| Error::Precondition("falta template_id".to_string()))?;
            Ok(SendKind::Template {
                template_id,
                variables: variables_posicionales(template_variables),
            })
        }
        TipoMensaje::Session => {
            let texto = contenido_texto
                .ok_or_else(|| Error::Precondition("falta contenido_texto".to_string()))?;
            Ok(SendKind::Session {
                texto,
                media_url,
            })
        }
        TipoMensaje::Sms => {
            let texto = contenido_texto
                .ok_or_else(|| Error::Precondition("falta contenido_texto".to_string()))?;
            Ok(SendKind::Sms { texto })
        }
    }
}

/// POST /api/mensajes/send
pub async fn enviar(
    State(ctx): State<Arc<ServerContext>>,
    Json(body): Json<EnviarBody>,
) -> Result<Json<EnviarResponse>, ApiError> {
    if body.telefono.trim().is_empty() {
        return Err(Error::Precondition("falta el numero de telefono".to_string()).into());
    }

    let tipo = TipoMensaje::from_str(&body.tipo).map_err(Error::Precondition)?;
    let kind = build_kind(
        tipo,
        body.contenido_texto,
        body.media_url,
        body.template_id,
        body.template_variables.as_ref(),
    )?;

    let request = SendRequest {
        telefono: body.telefono,
        kind,
        conversacion_id: body.conversacion_id,
        campana_id: None,
        credential_id: Some(body.credential_id),
    };

    let result = ctx.dispatcher.enviar(&request).await?;

    let entry = EventLogEntry {
        evento_tipo: "mensaje.enviado".to_string(),
        conversacion_id: request.conversacion_id,
        campana_id: None,
        payload: json!({
            "telefono": result.outcome.numero,
            "provider_message_id": result.outcome.provider_message_id,
        }),
        resultado: ResultadoEvento::Success,
    };
    if let Err(e) = ctx.event_log.insert(&entry).await {
        warn!("Failed to record send event: {:?}", e);
    }

    Ok(Json(EnviarResponse {
        success: true,
        provider_message_id: result.outcome.provider_message_id,
        mensaje_id: result.mensaje_id,
        estado: result.outcome.estado,
    }))
}

#[derive(Debug, Deserialize)]
pub struct EnviarMasivoBody {
    pub telefonos: Vec<String>,
    pub tipo: Option<String>,
    pub contenido_texto: Option<String>,
    pub media_url: Option<String>,
    pub template_id: Option<Uuid>,
    pub template_variables: Option<Value>,
    pub campana_id: Option<Uuid>,
    pub credential_id: Option<Uuid>,
    pub max_envios_por_segundo: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct EnviarMasivoResponse {
    pub success: bool,
    pub total: usize,
    pub exitosos: usize,
    pub fallidos: usize,
    pub detalles_fallidos: Vec<FalloEnvio>,
}

/// POST /api/mensajes/send-bulk
///
/// Always answers 200 with a per-recipient breakdown once the batch ran;
/// only precondition failures (empty list, missing content) get a 4xx.
pub async fn enviar_masivo(
    State(ctx): State<Arc<ServerContext>>,
    Json(body): Json<EnviarMasivoBody>,
) -> Result<Json<EnviarMasivoResponse>, ApiError> {
    if body.telefonos.is_empty() {
        return Err(Error::Precondition("falta el array de telefonos".to_string()).into());
    }

    let tipo = match &body.tipo {
        Some(t) => TipoMensaje::from_str(t).map_err(Error::Precondition)?,
        None if body.template_id.is_some() => TipoMensaje::Template,
        None => TipoMensaje::Session,
    };
    // Validated once up front so a bad body fails the whole call instead of
    // producing N identical per-recipient failures.
    let kind = build_kind(
        tipo,
        body.contenido_texto.clone(),
        body.media_url.clone(),
        body.template_id,
        body.template_variables.as_ref(),
    )?;

    let por_segundo = body
        .max_envios_por_segundo
        .filter(|v| *v > 0)
        .unwrap_or(MASIVO_ENVIOS_POR_SEGUNDO);
    let delay = Duration::from_millis(1000 / por_segundo);

    let resultado = ctx
        .bulk
        .enviar_todos(
            &body.telefonos,
            |numero| SendRequest {
                telefono: numero.to_string(),
                kind: kind.clone(),
                conversacion_id: None,
                campana_id: body.campana_id,
                credential_id: body.credential_id,
            },
            delay,
            &NoopObserver,
        )
        .await;

    let entry = EventLogEntry {
        evento_tipo: "mensajes.masivo".to_string(),
        conversacion_id: None,
        campana_id: body.campana_id,
        payload: json!({
            "total": resultado.total(),
            "exitosos": resultado.exitosos.len(),
            "fallidos": resultado.fallidos.len(),
        }),
        resultado: if resultado.fallidos.is_empty() {
            ResultadoEvento::Success
        } else {
            ResultadoEvento::Partial
        },
    };
    if let Err(e) = ctx.event_log.insert(&entry).await {
        warn!("Failed to record bulk event: {:?}", e);
    }

    Ok(Json(EnviarMasivoResponse {
        success: true,
        total: resultado.total(),
        exitosos: resultado.exitosos.len(),
        fallidos: resultado.fallidos.len(),
        detalles_fallidos: resultado.fallidos,
    }))
}
