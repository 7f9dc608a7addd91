use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::Error;
use mensajera_common::models::Conversacion;
use mensajera_common::traits::repository_traits::ConversacionRepository;

/// Length of the provider-enforced session window.
pub const VENTANA_SESION_HORAS: i64 = 24;

/// Tracks the WhatsApp 24-hour session window per conversation.
///
/// Free-form ("session") messages are only allowed while the window is
/// open; outside it, only pre-approved templates may be sent, and a
/// successful template send reopens the window.
pub struct SessionWindowTracker {
    conversaciones: Arc<dyn ConversacionRepository>,
}

impl SessionWindowTracker {
    pub fn new(conversaciones: Arc<dyn ConversacionRepository>) -> Self {
        Self { conversaciones }
    }

    /// Open state is derived, not stored: the flag must be set AND the
    /// expiry must be strictly in the future. A conversation turns closed
    /// the instant `session_expires_at <= now`.
    pub fn esta_abierta(conversacion: &Conversacion) -> bool {
        conversacion.is_session_open
            && conversacion
                .session_expires_at
                .map_or(false, |expira| expira > Utc::now())
    }

    pub async fn cargar(&self, id: Uuid) -> Result<Option<Conversacion>, Error> {
        self.conversaciones.get_by_id(id).await
    }

    /// Reopen the window: `is_session_open = true`, expiry = now + 24h,
    /// `last_outbound_at = now`. Returns the new expiry.
    pub async fn extender(&self, id: Uuid) -> Result<DateTime<Utc>, Error> {
        let expira = Utc::now() + Duration::hours(VENTANA_SESION_HORAS);
        self.conversaciones.marcar_sesion_abierta(id, expira).await?;
        Ok(expira)
    }
}
