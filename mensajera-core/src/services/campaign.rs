use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::bulk::{BulkSendCoordinator, SendObserver};
use crate::services::credential_resolver::CredentialResolver;
use crate::services::dispatcher::{SendKind, SendRequest};
use crate::Error;
use mensajera_common::models::{
    DestinatariosConfig, EstadoCampana, EventLogEntry, ResumenCampana, ResultadoEvento,
    SendOutcome,
};
use mensajera_common::traits::repository_traits::{
    CampanaRepository, ClienteRepository, EventLogRepository, PlantillaRepository,
};

const ENVIOS_POR_SEGUNDO_DEFECTO: i32 = 10;

/// Owns the campaign lifecycle: DRAFT --(ejecutar)--> RUNNING --> COMPLETED,
/// exactly once. Individual provider failures are absorbed into counters; a
/// run with 100% failed sends still completes.
pub struct CampaignOrchestrator {
    campanas: Arc<dyn CampanaRepository>,
    plantillas: Arc<dyn PlantillaRepository>,
    clientes: Arc<dyn ClienteRepository>,
    resolver: Arc<CredentialResolver>,
    bulk: Arc<BulkSendCoordinator>,
    event_log: Arc<dyn EventLogRepository>,
}

/// Persists `total_enviados` after every successful send so partial
/// progress is observable mid-run.
struct CampaignProgress {
    campanas: Arc<dyn CampanaRepository>,
    campana_id: Uuid,
    enviados: AtomicI32,
}

#[async_trait]
impl SendObserver for CampaignProgress {
    async fn on_exito(&self, _outcome: &SendOutcome) {
        let total = self.enviados.fetch_add(1, Ordering::SeqCst) + 1;
        if let Err(e) = self.campanas.actualizar_enviados(self.campana_id, total).await {
            warn!(
                "Failed to persist progress counter for campaign {}: {:?}",
                self.campana_id, e
            );
        }
    }
}

impl CampaignOrchestrator {
    pub fn new(
        campanas: Arc<dyn CampanaRepository>,
        plantillas: Arc<dyn PlantillaRepository>,
        clientes: Arc<dyn ClienteRepository>,
        resolver: Arc<CredentialResolver>,
        bulk: Arc<BulkSendCoordinator>,
        event_log: Arc<dyn EventLogRepository>,
    ) -> Self {
        Self {
            campanas,
            plantillas,
            clientes,
            resolver,
            bulk,
            event_log,
        }
    }

    pub async fn ejecutar(
        &self,
        campana_id: Uuid,
        destinatarios: &DestinatariosConfig,
    ) -> Result<ResumenCampana, Error> {
        // Preconditions first; the campaign is not transitioned to RUNNING
        // unless every one of them holds.
        let campana = self
            .campanas
            .get_by_id(campana_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("campaign {} not found", campana_id)))?;

        match campana.estado {
            EstadoCampana::Draft => {}
            EstadoCampana::Running => {
                return Err(Error::Precondition(
                    "la campana ya esta en ejecucion".to_string(),
                ));
            }
            EstadoCampana::Completed => {
                return Err(Error::Precondition(
                    "la campana ya fue ejecutada".to_string(),
                ));
            }
        }

        let plantilla = self
            .plantillas
            .get_by_id(campana.template_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("template {} not found", campana.template_id))
            })?;

        // Credential existence is a fatal precondition too; resolving it
        // here also warms the cache for the whole run.
        self.resolver.resolve_by_id(campana.credential_id).await?;

        let telefonos = self.resolver_destinatarios(destinatarios).await?;
        if telefonos.is_empty() {
            return Err(Error::Precondition(
                "no se encontraron destinatarios".to_string(),
            ));
        }

        let variables = variables_posicionales(campana.variables_valores.as_ref());

        self.campanas.marcar_running(campana_id, Utc::now()).await?;
        info!(
            "Campaign {} ('{}') running: {} recipients, template '{}'",
            campana_id,
            campana.nombre,
            telefonos.len(),
            plantilla.nombre
        );

        let por_segundo = if campana.max_envios_por_segundo > 0 {
            campana.max_envios_por_segundo
        } else {
            ENVIOS_POR_SEGUNDO_DEFECTO
        };
        let delay = Duration::from_millis(1000 / por_segundo as u64);

        let progreso = CampaignProgress {
            campanas: self.campanas.clone(),
            campana_id,
            enviados: AtomicI32::new(0),
        };

        let template_id = campana.template_id;
        let credential_id = campana.credential_id;
        let resultado = self
            .bulk
            .enviar_todos(
                &telefonos,
                |numero| SendRequest {
                    telefono: numero.to_string(),
                    kind: SendKind::Template {
                        template_id,
                        variables: variables.clone(),
                    },
                    conversacion_id: None,
                    campana_id: Some(campana_id),
                    credential_id: Some(credential_id),
                },
                delay,
                &progreso,
            )
            .await;

        let enviados = resultado.exitosos.len();
        let fallidos = resultado.fallidos.len();

        // Every provider send already happened; losing the terminal-state
        // write must not turn the whole run into an error for the caller.
        if let Err(e) = self
            .campanas
            .marcar_completada(campana_id, Utc::now(), enviados as i32)
            .await
        {
            warn!("Failed to mark campaign {} completed: {:?}", campana_id, e);
        }

        let entry = EventLogEntry {
            evento_tipo: "campana.ejecutada".to_string(),
            conversacion_id: None,
            campana_id: Some(campana_id),
            payload: json!({
                "total": telefonos.len(),
                "enviados": enviados,
                "fallidos": fallidos,
            }),
            resultado: if fallidos == 0 {
                ResultadoEvento::Success
            } else {
                ResultadoEvento::Partial
            },
        };
        if let Err(e) = self.event_log.insert(&entry).await {
            warn!("Failed to record event log for campaign {}: {:?}", campana_id, e);
        }

        info!(
            "Campaign {} completed: {} sent, {} failed of {}",
            campana_id,
            enviados,
            fallidos,
            telefonos.len()
        );

        Ok(ResumenCampana {
            enviados,
            fallidos,
            total: telefonos.len(),
        })
    }

    async fn resolver_destinatarios(
        &self,
        config: &DestinatariosConfig,
    ) -> Result<Vec<String>, Error> {
        match config {
            DestinatariosConfig::Todos => self.clientes.telefonos_activos(None).await,
            DestinatariosConfig::Proyecto { proyecto_id } => {
                self.clientes.telefonos_activos(Some(*proyecto_id)).await
            }
            DestinatariosConfig::Manual { numeros } => Ok(numeros
                .lines()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect()),
        }
    }
}

/// Flattens the campaign's bound variables into the positional order the
/// template's body parameters expect. Key order of the stored JSON object
/// is preserved end to end.
pub fn variables_posicionales(valores: Option<&Value>) -> Vec<String> {
    match valores.and_then(Value::as_object) {
        Some(map) => map
            .values()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                otro => otro.to_string(),
            })
            .collect(),
        None => Vec::new(),
    }
}
