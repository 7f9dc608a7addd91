// src/providers/mod.rs

pub mod status;
pub mod twilio;
pub mod whatsapp;

use std::sync::Arc;

use async_trait::async_trait;

use crate::Error;
use mensajera_common::models::{ChannelCredential, Proveedor};

pub use twilio::TwilioClient;
pub use whatsapp::WhatsAppCloudClient;

/// What a provider hands back synchronously when it accepts a send.
///
/// `raw_status` is the provider's own vocabulary ("queued", "sent", ...);
/// WhatsApp Business returns no status in the accept response, so it stays
/// `None` there and the status mapper treats it as PENDING.
#[derive(Debug, Clone)]
pub struct ProviderAccept {
    pub provider_message_id: String,
    pub raw_status: Option<String>,
}

/// The dispatch engine's seam to the outside world: exactly one network
/// call per method, no retry. Mirrors the three request kinds the
/// dispatcher knows about. Mockable in tests without real network traffic.
#[async_trait]
pub trait ProviderSend: Send + Sync {
    async fn enviar_texto(
        &self,
        to: &str,
        texto: &str,
        media_url: Option<&str>,
    ) -> Result<ProviderAccept, Error>;

    async fn enviar_plantilla(
        &self,
        to: &str,
        nombre: &str,
        idioma: &str,
        variables: &[String],
    ) -> Result<ProviderAccept, Error>;

    async fn enviar_sms(&self, to: &str, texto: &str) -> Result<ProviderAccept, Error>;
}

/// Builds the concrete client for a resolved credential.
pub trait ProviderFactory: Send + Sync {
    fn client_for(&self, cred: &ChannelCredential) -> Arc<dyn ProviderSend>;
}

/// Default factory: one reqwest-backed client per credential.
#[derive(Default)]
pub struct DefaultProviderFactory;

impl ProviderFactory for DefaultProviderFactory {
    fn client_for(&self, cred: &ChannelCredential) -> Arc<dyn ProviderSend> {
        match cred.proveedor {
            Proveedor::Twilio => Arc::new(TwilioClient::from_credential(cred)),
            Proveedor::WhatsappBusiness => {
                Arc::new(WhatsAppCloudClient::from_credential(cred))
            }
        }
    }
}
