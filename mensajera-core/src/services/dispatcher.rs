use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::providers::{status, ProviderFactory};
use crate::services::session_window::SessionWindowTracker;
use crate::services::credential_resolver::CredentialResolver;
use crate::Error;
use mensajera_common::models::{
    Canal, Direccion, Mensaje, Proveedor, SendOutcome, TipoMensaje,
};
use mensajera_common::traits::repository_traits::{MensajeRepository, PlantillaRepository};

/// The three things the engine knows how to send.
#[derive(Debug, Clone)]
pub enum SendKind {
    /// Pre-approved template; `variables` bind positionally to the body.
    Template {
        template_id: Uuid,
        variables: Vec<String>,
    },
    /// Free-form WhatsApp text, only valid inside an open session window.
    Session {
        texto: String,
        media_url: Option<String>,
    },
    Sms { texto: String },
}

/// One outbound message. `credential_id` pins a specific credential (the
/// single-send HTTP contract and campaigns both do); when absent, the
/// active credential for the kind's channel is used.
#[derive(Debug, Clone)]
pub struct SendRequest {
    pub telefono: String,
    pub kind: SendKind,
    pub conversacion_id: Option<Uuid>,
    pub campana_id: Option<Uuid>,
    pub credential_id: Option<Uuid>,
}

impl SendRequest {
    pub fn canal(&self) -> Canal {
        match self.kind {
            SendKind::Sms { .. } => Canal::Sms,
            SendKind::Template { .. } | SendKind::Session { .. } => Canal::Whatsapp,
        }
    }

    fn proveedor_por_defecto(&self) -> Proveedor {
        match self.kind {
            SendKind::Sms { .. } => Proveedor::Twilio,
            SendKind::Template { .. } | SendKind::Session { .. } => {
                Proveedor::WhatsappBusiness
            }
        }
    }

    pub fn tipo(&self) -> TipoMensaje {
        match self.kind {
            SendKind::Template { .. } => TipoMensaje::Template,
            SendKind::Session { .. } => TipoMensaje::Session,
            SendKind::Sms { .. } => TipoMensaje::Sms,
        }
    }
}

/// What a single dispatch produced. `mensaje_id` is `None` only when the
/// provider accepted the send but recording the row locally failed.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub outcome: SendOutcome,
    pub mensaje_id: Option<Uuid>,
}

/// Sends exactly one message through the resolved provider client.
///
/// Side effects per call: at most one provider network call, one Mensaje
/// insert, one conversation update. No retries here; retrying is a batch
/// or operator concern.
pub struct MessageDispatcher {
    resolver: Arc<CredentialResolver>,
    providers: Arc<dyn ProviderFactory>,
    sesiones: Arc<SessionWindowTracker>,
    mensajes: Arc<dyn MensajeRepository>,
    plantillas: Arc<dyn PlantillaRepository>,
}

impl MessageDispatcher {
    pub fn new(
        resolver: Arc<CredentialResolver>,
        providers: Arc<dyn ProviderFactory>,
        sesiones: Arc<SessionWindowTracker>,
        mensajes: Arc<dyn MensajeRepository>,
        plantillas: Arc<dyn PlantillaRepository>,
    ) -> Self {
        Self {
            resolver,
            providers,
            sesiones,
            mensajes,
            plantillas,
        }
    }

    pub async fn enviar(&self, request: &SendRequest) -> Result<DispatchResult, Error> {
        // 1) Resolve the credential.
        let credential = match request.credential_id {
            Some(id) => self.resolver.resolve_by_id(id).await?,
            None => {
                self.resolver
                    .resolve(request.canal(), request.proveedor_por_defecto())
                    .await?
            }
        };

        // 2) SESSION sends bound to a known conversation must pass the
        //    window check before any provider call.
        if matches!(request.kind, SendKind::Session { .. }) {
            if let Some(conv_id) = request.conversacion_id {
                let conversacion = self
                    .sesiones
                    .cargar(conv_id)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("conversation {} not found", conv_id)))?;

                if !SessionWindowTracker::esta_abierta(&conversacion) {
                    return Err(Error::SessionClosed(
                        "la sesion de 24h ha expirado; use una plantilla para reabrir la conversacion"
                            .to_string(),
                    ));
                }
            }
        }

        // 3) Build the payload and make the single provider call.
        let client = self.providers.client_for(&credential);
        let (accept, contenido_texto, media_url, template_id) = match &request.kind {
            SendKind::Template {
                template_id,
                variables,
            } => {
                let plantilla = self
                    .plantillas
                    .get_by_id(*template_id)
                    .await?
                    .ok_or_else(|| {
                        Error::NotFound(format!("template {} not found", template_id))
                    })?;

                let accept = client
                    .enviar_plantilla(
                        &request.telefono,
                        &plantilla.nombre,
                        &plantilla.idioma,
                        variables,
                    )
                    .await?;
                (accept, None, None, Some(*template_id))
            }
            SendKind::Session { texto, media_url } => {
                let accept = client
                    .enviar_texto(&request.telefono, texto, media_url.as_deref())
                    .await?;
                (accept, Some(texto.clone()), media_url.clone(), None)
            }
            SendKind::Sms { texto } => {
                let accept = client.enviar_sms(&request.telefono, texto).await?;
                (accept, Some(texto.clone()), None, None)
            }
        };

        // 4) Provider accepted: canonicalize the status and record the row.
        //    From here on nothing is reported as a send failure anymore,
        //    otherwise a client retry would double-send.
        let estado = status::map_estado(credential.proveedor, accept.raw_status.as_deref());
        let sent_at = Utc::now();

        let mensaje = Mensaje {
            id: Uuid::new_v4(),
            conversacion_id: request.conversacion_id,
            campana_id: request.campana_id,
            template_id,
            direccion: Direccion::Out,
            tipo: request.tipo(),
            contenido_texto,
            media_url,
            provider_message_id: accept.provider_message_id.clone(),
            estado,
            sent_at,
        };

        let mensaje_id = match self.mensajes.insert(&mensaje).await {
            Ok(()) => Some(mensaje.id),
            Err(e) => {
                warn!(
                    "Message {} accepted by provider but not recorded locally: {:?}",
                    accept.provider_message_id, e
                );
                None
            }
        };

        // 5) SESSION and TEMPLATE sends reset the 24h window.
        if let Some(conv_id) = request.conversacion_id {
            if !matches!(request.kind, SendKind::Sms { .. }) {
                if let Err(e) = self.sesiones.extender(conv_id).await {
                    warn!("Failed to extend session window for {}: {:?}", conv_id, e);
                }
            }
        }

        debug!(
            "Dispatched {} to {} via {} => {}",
            request.tipo(),
            request.telefono,
            credential.proveedor,
            estado
        );

        Ok(DispatchResult {
            outcome: SendOutcome {
                numero: request.telefono.clone(),
                provider_message_id: accept.provider_message_id,
                estado,
                sent_at,
            },
            mensaje_id,
        })
    }
}
