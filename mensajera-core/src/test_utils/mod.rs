//! In-memory repository and provider fakes shared by the integration
//! tests. Not compiled into release binaries by anything outside tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::providers::{ProviderAccept, ProviderFactory, ProviderSend};
use crate::Error;
use mensajera_common::models::{
    Campana, Canal, ChannelCredential, Conversacion, EventLogEntry, Mensaje, Plantilla,
    Proveedor,
};
use mensajera_common::traits::repository_traits::{
    CampanaRepository, ClienteRepository, ConversacionRepository, CredentialsRepository,
    EventLogRepository, MensajeRepository, PlantillaRepository,
};

#[derive(Default)]
pub struct MemoryCredentialsRepo {
    pub rows: Mutex<Vec<ChannelCredential>>,
}

#[async_trait]
impl CredentialsRepository for MemoryCredentialsRepo {
    async fn get_active(
        &self,
        canal: Canal,
        proveedor: Proveedor,
    ) -> Result<Option<ChannelCredential>, Error> {
        let rows = self.rows.lock();
        // Most recently updated active row wins, like the SQL query.
        Ok(rows
            .iter()
            .filter(|c| c.canal == canal && c.proveedor == proveedor && c.activo)
            .max_by_key(|c| c.updated_at)
            .cloned())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<ChannelCredential>, Error> {
        let rows = self.rows.lock();
        Ok(rows.iter().find(|c| c.id == id && c.activo).cloned())
    }

    async fn store(&self, cred: &ChannelCredential) -> Result<(), Error> {
        let mut rows = self.rows.lock();
        rows.retain(|c| c.id != cred.id);
        rows.push(cred.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryConversacionRepo {
    pub rows: Mutex<HashMap<Uuid, Conversacion>>,
}

#[async_trait]
impl ConversacionRepository for MemoryConversacionRepo {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Conversacion>, Error> {
        Ok(self.rows.lock().get(&id).cloned())
    }

    async fn marcar_sesion_abierta(
        &self,
        id: Uuid,
        expires: DateTime<Utc>,
    ) -> Result<(), Error> {
        let mut rows = self.rows.lock();
        let conv = rows
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("conversation {} not found", id)))?;
        conv.is_session_open = true;
        conv.session_expires_at = Some(expires);
        conv.last_outbound_at = Some(Utc::now());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPlantillaRepo {
    pub rows: Mutex<HashMap<Uuid, Plantilla>>,
}

#[async_trait]
impl PlantillaRepository for MemoryPlantillaRepo {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Plantilla>, Error> {
        Ok(self.rows.lock().get(&id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryCampanaRepo {
    pub rows: Mutex<HashMap<Uuid, Campana>>,
    /// Every persisted value of `total_enviados`, in write order, so tests
    /// can assert that progress was recorded incrementally.
    pub contador_historial: Mutex<Vec<i32>>,
    /// When true, `marcar_completada` fails; exercises the lost
    /// terminal-state write after a fully dispatched run.
    pub fail_completar: Mutex<bool>,
}

#[async_trait]
impl CampanaRepository for MemoryCampanaRepo {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Campana>, Error> {
        Ok(self.rows.lock().get(&id).cloned())
    }

    async fn marcar_running(
        &self,
        id: Uuid,
        fecha_inicio: DateTime<Utc>,
    ) -> Result<(), Error> {
        let mut rows = self.rows.lock();
        let campana = rows
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("campaign {} not found", id)))?;
        campana.estado = mensajera_common::models::EstadoCampana::Running;
        campana.fecha_inicio = Some(fecha_inicio);
        Ok(())
    }

    async fn actualizar_enviados(&self, id: Uuid, total_enviados: i32) -> Result<(), Error> {
        let mut rows = self.rows.lock();
        let campana = rows
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("campaign {} not found", id)))?;
        campana.total_enviados = total_enviados;
        self.contador_historial.lock().push(total_enviados);
        Ok(())
    }

    async fn marcar_completada(
        &self,
        id: Uuid,
        completado_at: DateTime<Utc>,
        total_enviados: i32,
    ) -> Result<(), Error> {
        if *self.fail_completar.lock() {
            return Err(Error::Database(sqlx::Error::PoolClosed));
        }
        let mut rows = self.rows.lock();
        let campana = rows
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("campaign {} not found", id)))?;
        campana.estado = mensajera_common::models::EstadoCampana::Completed;
        campana.completado_at = Some(completado_at);
        campana.total_enviados = total_enviados;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryMensajeRepo {
    pub inserted: Mutex<Vec<Mensaje>>,
    /// When true, inserts fail; used to exercise the "provider accepted but
    /// local persistence failed" path.
    pub fail_inserts: Mutex<bool>,
}

#[async_trait]
impl MensajeRepository for MemoryMensajeRepo {
    async fn insert(&self, mensaje: &Mensaje) -> Result<(), Error> {
        if *self.fail_inserts.lock() {
            return Err(Error::Parse("simulated insert failure".to_string()));
        }
        self.inserted.lock().push(mensaje.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryClienteRepo {
    pub todos: Mutex<Vec<String>>,
    pub por_proyecto: Mutex<HashMap<Uuid, Vec<String>>>,
}

#[async_trait]
impl ClienteRepository for MemoryClienteRepo {
    async fn telefonos_activos(
        &self,
        proyecto_id: Option<Uuid>,
    ) -> Result<Vec<String>, Error> {
        match proyecto_id {
            None => Ok(self.todos.lock().clone()),
            Some(pid) => Ok(self
                .por_proyecto
                .lock()
                .get(&pid)
                .cloned()
                .unwrap_or_default()),
        }
    }
}

#[derive(Default)]
pub struct MemoryEventLogRepo {
    pub entries: Mutex<Vec<EventLogEntry>>,
}

#[async_trait]
impl EventLogRepository for MemoryEventLogRepo {
    async fn insert(&self, entry: &EventLogEntry) -> Result<(), Error> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }
}

/// Records every provider call and fails the phone numbers it was told to.
#[derive(Default)]
pub struct FakeProvider {
    pub fail_numbers: Mutex<Vec<String>>,
    pub raw_status: Mutex<Option<String>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    fn accept_or_fail(&self, to: &str) -> Result<ProviderAccept, Error> {
        self.calls.lock().push(to.to_string());
        if self.fail_numbers.lock().iter().any(|n| n == to) {
            return Err(Error::Provider("queue-full".to_string()));
        }
        Ok(ProviderAccept {
            provider_message_id: format!("wamid-{}", self.calls.lock().len()),
            raw_status: self.raw_status.lock().clone(),
        })
    }
}

#[async_trait]
impl ProviderSend for FakeProvider {
    async fn enviar_texto(
        &self,
        to: &str,
        _texto: &str,
        _media_url: Option<&str>,
    ) -> Result<ProviderAccept, Error> {
        self.accept_or_fail(to)
    }

    async fn enviar_plantilla(
        &self,
        to: &str,
        _nombre: &str,
        _idioma: &str,
        _variables: &[String],
    ) -> Result<ProviderAccept, Error> {
        self.accept_or_fail(to)
    }

    async fn enviar_sms(&self, to: &str, _texto: &str) -> Result<ProviderAccept, Error> {
        self.accept_or_fail(to)
    }
}

/// Hands every credential the same shared `FakeProvider`.
pub struct FakeProviderFactory {
    pub provider: Arc<FakeProvider>,
}

impl ProviderFactory for FakeProviderFactory {
    fn client_for(&self, _cred: &ChannelCredential) -> Arc<dyn ProviderSend> {
        self.provider.clone()
    }
}

/// A plausible active WhatsApp Business credential.
pub fn credencial_whatsapp() -> ChannelCredential {
    ChannelCredential {
        id: Uuid::new_v4(),
        canal: Canal::Whatsapp,
        proveedor: Proveedor::WhatsappBusiness,
        cuenta_id: "123456789012345".to_string(),
        token_acceso: "EAAG-test-token".to_string(),
        remitente_sms: None,
        remitente_whatsapp: Some("+15550001111".to_string()),
        activo: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// A plausible active Twilio credential.
pub fn credencial_twilio() -> ChannelCredential {
    ChannelCredential {
        id: Uuid::new_v4(),
        canal: Canal::Sms,
        proveedor: Proveedor::Twilio,
        cuenta_id: "AC00000000000000000000000000000000".to_string(),
        token_acceso: "twilio-auth-token".to_string(),
        remitente_sms: Some("+15550002222".to_string()),
        remitente_whatsapp: Some("+15550003333".to_string()),
        activo: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
