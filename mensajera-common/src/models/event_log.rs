use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum ResultadoEvento {
    Success,
    Partial,
    Error,
}

impl fmt::Display for ResultadoEvento {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultadoEvento::Success => write!(f, "SUCCESS"),
            ResultadoEvento::Partial => write!(f, "PARTIAL"),
            ResultadoEvento::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for ResultadoEvento {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SUCCESS" => Ok(ResultadoEvento::Success),
            "PARTIAL" => Ok(ResultadoEvento::Partial),
            "ERROR" => Ok(ResultadoEvento::Error),
            _ => Err(format!("Invalid resultado de evento: {}", s)),
        }
    }
}

/// Append-only audit entry (`marketing_event_log`), one per campaign
/// execution and per bulk send. Write-only from the core's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub evento_tipo: String,
    pub conversacion_id: Option<Uuid>,
    pub campana_id: Option<Uuid>,
    pub payload: Value,
    pub resultado: ResultadoEvento,
}
