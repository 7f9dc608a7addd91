use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Error;
use crate::models::{
    Campana, Canal, ChannelCredential, Conversacion, EventLogEntry, Mensaje,
    Plantilla, Proveedor,
};

#[async_trait]
pub trait CredentialsRepository: Send + Sync {
    /// The single authoritative active credential for a (canal, proveedor)
    /// pair. If duplicates exist, the most recently updated row wins.
    async fn get_active(
        &self,
        canal: Canal,
        proveedor: Proveedor,
    ) -> Result<Option<ChannelCredential>, Error>;

    /// An explicitly requested credential. Inactive rows are treated the
    /// same as missing ones.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<ChannelCredential>, Error>;

    async fn store(&self, cred: &ChannelCredential) -> Result<(), Error>;
}

#[async_trait]
pub trait ConversacionRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Conversacion>, Error>;

    /// Reopens the 24h session window: `is_session_open = true`,
    /// `session_expires_at = expires`, `last_outbound_at = now`.
    async fn marcar_sesion_abierta(
        &self,
        id: Uuid,
        expires: DateTime<Utc>,
    ) -> Result<(), Error>;
}

#[async_trait]
pub trait PlantillaRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Plantilla>, Error>;
}

#[async_trait]
pub trait CampanaRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Campana>, Error>;

    async fn marcar_running(
        &self,
        id: Uuid,
        fecha_inicio: DateTime<Utc>,
    ) -> Result<(), Error>;

    /// Incremental counter persisted after each individual send so partial
    /// progress is observable mid-run.
    async fn actualizar_enviados(&self, id: Uuid, total_enviados: i32) -> Result<(), Error>;

    async fn marcar_completada(
        &self,
        id: Uuid,
        completado_at: DateTime<Utc>,
        total_enviados: i32,
    ) -> Result<(), Error>;
}

#[async_trait]
pub trait MensajeRepository: Send + Sync {
    async fn insert(&self, mensaje: &Mensaje) -> Result<(), Error>;
}

#[async_trait]
pub trait ClienteRepository: Send + Sync {
    /// Phone numbers of active clients, optionally filtered by project.
    async fn telefonos_activos(
        &self,
        proyecto_id: Option<Uuid>,
    ) -> Result<Vec<String>, Error>;
}

#[async_trait]
pub trait EventLogRepository: Send + Sync {
    async fn insert(&self, entry: &EventLogEntry) -> Result<(), Error>;
}
