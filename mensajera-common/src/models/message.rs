use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Direccion {
    In,
    Out,
}

impl fmt::Display for Direccion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direccion::In => write!(f, "IN"),
            Direccion::Out => write!(f, "OUT"),
        }
    }
}

impl FromStr for Direccion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "IN" => Ok(Direccion::In),
            "OUT" => Ok(Direccion::Out),
            _ => Err(format!("Invalid direccion: {}", s)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum TipoMensaje {
    Template,
    Session,
    Sms,
}

impl fmt::Display for TipoMensaje {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TipoMensaje::Template => write!(f, "TEMPLATE"),
            TipoMensaje::Session => write!(f, "SESSION"),
            TipoMensaje::Sms => write!(f, "SMS"),
        }
    }
}

impl FromStr for TipoMensaje {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TEMPLATE" => Ok(TipoMensaje::Template),
            "SESSION" => Ok(TipoMensaje::Session),
            "SMS" => Ok(TipoMensaje::Sms),
            _ => Err(format!("Invalid tipo de mensaje: {}", s)),
        }
    }
}

/// Canonical delivery state, decoupled from any single provider's
/// vocabulary. Provider strings are translated through the per-provider
/// tables in `mensajera-core::providers::status`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum EstadoMensaje {
    Pending,
    Sent,
    Delivered,
    Read,
    Failed,
}

impl fmt::Display for EstadoMensaje {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstadoMensaje::Pending => write!(f, "PENDING"),
            EstadoMensaje::Sent => write!(f, "SENT"),
            EstadoMensaje::Delivered => write!(f, "DELIVERED"),
            EstadoMensaje::Read => write!(f, "READ"),
            EstadoMensaje::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for EstadoMensaje {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(EstadoMensaje::Pending),
            "SENT" => Ok(EstadoMensaje::Sent),
            "DELIVERED" => Ok(EstadoMensaje::Delivered),
            "READ" => Ok(EstadoMensaje::Read),
            "FAILED" => Ok(EstadoMensaje::Failed),
            _ => Err(format!("Invalid estado de mensaje: {}", s)),
        }
    }
}

/// One row of `marketing_mensaje`. Only written after a provider accepted
/// the send; dispatch failures never produce a row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mensaje {
    pub id: Uuid,
    pub conversacion_id: Option<Uuid>,
    pub campana_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub direccion: Direccion,
    pub tipo: TipoMensaje,
    pub contenido_texto: Option<String>,
    pub media_url: Option<String>,
    pub provider_message_id: String,
    pub estado: EstadoMensaje,
    pub sent_at: DateTime<Utc>,
}

/// Transient per-recipient success, used only to build batch aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOutcome {
    pub numero: String,
    pub provider_message_id: String,
    pub estado: EstadoMensaje,
    pub sent_at: DateTime<Utc>,
}

/// Transient per-recipient failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FalloEnvio {
    pub numero: String,
    pub error: String,
}
