// File: mensajera-core/src/providers/twilio.rs

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;

use crate::Error;
use mensajera_common::models::ChannelCredential;

use super::{ProviderAccept, ProviderSend};

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Wrapper client for the Twilio message-create endpoint.
///
/// Twilio has no batch API; bulk flows call this once per recipient.
pub struct TwilioClient {
    http: Arc<ReqwestClient>,
    account_sid: String,
    auth_token: String,
    remitente_sms: Option<String>,
    remitente_whatsapp: Option<String>,
}

/// Subset of Twilio's message resource we care about. `status` is the
/// provider's immediate synchronous state ("queued", "sent", ...).
#[derive(Debug, Clone, Deserialize)]
pub struct TwilioMessageResponse {
    pub sid: String,
    pub status: String,
    pub to: String,
    pub from: String,
    pub body: Option<String>,
    pub date_created: Option<String>,
    pub date_sent: Option<String>,
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
}

impl TwilioClient {
    pub fn new(
        account_sid: &str,
        auth_token: &str,
        remitente_sms: Option<String>,
        remitente_whatsapp: Option<String>,
    ) -> Self {
        Self {
            http: Arc::new(ReqwestClient::new()),
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            remitente_sms,
            remitente_whatsapp,
        }
    }

    pub fn from_credential(cred: &ChannelCredential) -> Self {
        Self::new(
            &cred.cuenta_id,
            &cred.token_acceso,
            cred.remitente_sms.clone(),
            cred.remitente_whatsapp.clone(),
        )
    }

    fn remitente_sms(&self) -> Result<&str, Error> {
        self.remitente_sms
            .as_deref()
            .ok_or_else(|| Error::Precondition("credential has no SMS sender number".into()))
    }

    fn remitente_whatsapp(&self) -> Result<&str, Error> {
        self.remitente_whatsapp.as_deref().ok_or_else(|| {
            Error::Precondition("credential has no WhatsApp sender number".into())
        })
    }

    /// POST /Accounts/{sid}/Messages.json with basic auth.
    async fn create_message(
        &self,
        params: Vec<(&'static str, String)>,
    ) -> Result<TwilioMessageResponse, Error> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            TWILIO_API_BASE, self.account_sid
        );

        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("twilio network error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Provider(format!("twilio: HTTP {status} => {text}")));
        }

        let message: TwilioMessageResponse = resp.json().await?;
        Ok(message)
    }

    pub async fn send_sms(&self, to: &str, body: &str) -> Result<TwilioMessageResponse, Error> {
        let from = self.remitente_sms()?.to_string();
        self.create_message(vec![
            ("From", from),
            ("To", to.to_string()),
            ("Body", body.to_string()),
        ])
        .await
    }

    pub async fn send_whatsapp(
        &self,
        to: &str,
        body: &str,
        media_url: Option<&str>,
    ) -> Result<TwilioMessageResponse, Error> {
        let from = self.remitente_whatsapp()?.to_string();
        let mut params = vec![
            ("From", with_whatsapp_prefix(&from)),
            ("To", with_whatsapp_prefix(to)),
            ("Body", body.to_string()),
        ];
        if let Some(url) = media_url {
            params.push(("MediaUrl", url.to_string()));
        }
        self.create_message(params).await
    }
}

/// Twilio requires the `whatsapp:` scheme on both ends of a WhatsApp send.
fn with_whatsapp_prefix(numero: &str) -> String {
    if numero.starts_with("whatsapp:") {
        numero.to_string()
    } else {
        format!("whatsapp:{}", numero)
    }
}

#[async_trait]
impl ProviderSend for TwilioClient {
    async fn enviar_texto(
        &self,
        to: &str,
        texto: &str,
        media_url: Option<&str>,
    ) -> Result<ProviderAccept, Error> {
        let resp = self.send_whatsapp(to, texto, media_url).await?;
        Ok(ProviderAccept {
            provider_message_id: resp.sid,
            raw_status: Some(resp.status),
        })
    }

    async fn enviar_plantilla(
        &self,
        _to: &str,
        nombre: &str,
        _idioma: &str,
        _variables: &[String],
    ) -> Result<ProviderAccept, Error> {
        // Template sends go through the WhatsApp Business credential; the
        // Twilio path only carries free-form session text and SMS.
        Err(Error::Provider(format!(
            "twilio credential cannot send template '{nombre}'"
        )))
    }

    async fn enviar_sms(&self, to: &str, texto: &str) -> Result<ProviderAccept, Error> {
        let resp = self.send_sms(to, texto).await?;
        Ok(ProviderAccept {
            provider_message_id: resp.sid,
            raw_status: Some(resp.status),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whatsapp_prefix_is_idempotent() {
        assert_eq!(with_whatsapp_prefix("+51987654321"), "whatsapp:+51987654321");
        assert_eq!(
            with_whatsapp_prefix("whatsapp:+51987654321"),
            "whatsapp:+51987654321"
        );
    }
}
