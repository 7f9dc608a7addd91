use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Campaign lifecycle. DRAFT --(ejecutar)--> RUNNING --> COMPLETED, exactly
/// once. There is deliberately no FAILED terminal state: individual send
/// failures are absorbed into counters, never escalated to the campaign.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum EstadoCampana {
    Draft,
    Running,
    Completed,
}

impl fmt::Display for EstadoCampana {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstadoCampana::Draft => write!(f, "DRAFT"),
            EstadoCampana::Running => write!(f, "RUNNING"),
            EstadoCampana::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl FromStr for EstadoCampana {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Ok(EstadoCampana::Draft),
            "RUNNING" => Ok(EstadoCampana::Running),
            "COMPLETED" => Ok(EstadoCampana::Completed),
            _ => Err(format!("Invalid estado de campana: {}", s)),
        }
    }
}

/// One row of `marketing_campana`.
///
/// `variables_valores` is a JSON object whose *key order* is the positional
/// binding order of the template's body parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campana {
    pub id: Uuid,
    pub nombre: String,
    pub template_id: Uuid,
    pub credential_id: Uuid,
    pub variables_valores: Option<Value>,
    pub max_envios_por_segundo: i32,
    pub estado: EstadoCampana,
    pub total_enviados: i32,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub completado_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Recipient selection for a campaign run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "lowercase")]
pub enum DestinatariosConfig {
    /// Every active client with a phone number on file.
    Todos,
    /// Active clients of one project.
    Proyecto { proyecto_id: Uuid },
    /// A literal newline-delimited phone list.
    Manual { numeros: String },
}

/// What a finished campaign run reports back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumenCampana {
    pub enviados: usize,
    pub fallidos: usize,
    pub total: usize,
}
