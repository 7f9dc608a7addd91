use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One row of `marketing_template`. Immutable reference data; `variables`
/// holds the declared variable slots as stored by the template editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plantilla {
    pub id: Uuid,
    pub nombre: String,
    pub idioma: String,
    pub variables: Option<Value>,
    pub created_at: DateTime<Utc>,
}
