use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of `marketing_conversacion`.
///
/// Whether the conversation may still receive free-form ("session") messages
/// is *derived*: the stored flag alone is not enough, `session_expires_at`
/// must also be in the future. See `SessionWindowTracker::esta_abierta`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversacion {
    pub id: Uuid,
    pub telefono: String,
    pub last_outbound_at: Option<DateTime<Utc>>,
    pub is_session_open: bool,
    pub session_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
