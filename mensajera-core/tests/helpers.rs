//! Shared fixture wiring for the service tests: a full dispatcher stack
//! on top of in-memory repositories and a scripted fake provider.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::Value;
use uuid::Uuid;

use mensajera_common::models::{Campana, Conversacion, EstadoCampana, Plantilla};
use mensajera_core::cache::CredentialCache;
use mensajera_core::services::{
    BulkSendCoordinator, CredentialResolver, MessageDispatcher, SessionWindowTracker,
};
use mensajera_core::test_utils::{
    FakeProvider, FakeProviderFactory, MemoryConversacionRepo, MemoryCredentialsRepo,
    MemoryMensajeRepo, MemoryPlantillaRepo,
};

pub struct Fixture {
    pub credentials: Arc<MemoryCredentialsRepo>,
    pub conversaciones: Arc<MemoryConversacionRepo>,
    pub plantillas: Arc<MemoryPlantillaRepo>,
    pub mensajes: Arc<MemoryMensajeRepo>,
    pub provider: Arc<FakeProvider>,
    pub resolver: Arc<CredentialResolver>,
    pub dispatcher: Arc<MessageDispatcher>,
    pub bulk: Arc<BulkSendCoordinator>,
}

pub fn fixture() -> Fixture {
    let credentials = Arc::new(MemoryCredentialsRepo::default());
    let conversaciones = Arc::new(MemoryConversacionRepo::default());
    let plantillas = Arc::new(MemoryPlantillaRepo::default());
    let mensajes = Arc::new(MemoryMensajeRepo::default());
    let provider = Arc::new(FakeProvider::default());

    let resolver = Arc::new(CredentialResolver::new(
        credentials.clone(),
        Arc::new(CredentialCache::new()),
    ));
    let sesiones = Arc::new(SessionWindowTracker::new(conversaciones.clone()));
    let dispatcher = Arc::new(MessageDispatcher::new(
        resolver.clone(),
        Arc::new(FakeProviderFactory {
            provider: provider.clone(),
        }),
        sesiones,
        mensajes.clone(),
        plantillas.clone(),
    ));
    let bulk = Arc::new(BulkSendCoordinator::new(dispatcher.clone()));

    Fixture {
        credentials,
        conversaciones,
        plantillas,
        mensajes,
        provider,
        resolver,
        dispatcher,
        bulk,
    }
}

pub fn plantilla(nombre: &str) -> Plantilla {
    Plantilla {
        id: Uuid::new_v4(),
        nombre: nombre.to_string(),
        idioma: "es".to_string(),
        variables: None,
        created_at: Utc::now(),
    }
}

pub fn conversacion_abierta() -> Conversacion {
    Conversacion {
        id: Uuid::new_v4(),
        telefono: "+5215550001111".to_string(),
        last_outbound_at: Some(Utc::now()),
        is_session_open: true,
        session_expires_at: Some(Utc::now() + Duration::hours(12)),
        created_at: Utc::now(),
    }
}

pub fn conversacion_expirada() -> Conversacion {
    Conversacion {
        session_expires_at: Some(Utc::now() - Duration::minutes(5)),
        ..conversacion_abierta()
    }
}

pub fn campana_draft(
    template_id: Uuid,
    credential_id: Uuid,
    variables_valores: Option<Value>,
) -> Campana {
    Campana {
        id: Uuid::new_v4(),
        nombre: "Lanzamiento Torre Norte".to_string(),
        template_id,
        credential_id,
        variables_valores,
        max_envios_por_segundo: 0,
        estado: EstadoCampana::Draft,
        total_enviados: 0,
        fecha_inicio: None,
        completado_at: None,
        created_at: Utc::now(),
    }
}
