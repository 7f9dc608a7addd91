// File: mensajera-core/src/providers/whatsapp.rs

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};

use crate::Error;
use mensajera_common::models::ChannelCredential;

use super::{ProviderAccept, ProviderSend};

const GRAPH_API_VERSION: &str = "v21.0";

/// Client for the WhatsApp Business Cloud API (Graph `/messages` endpoint,
/// one endpoint per business phone number).
pub struct WhatsAppCloudClient {
    http: Arc<ReqwestClient>,
    phone_number_id: String,
    access_token: String,
    api_version: String,
}

/// JSON envelope for `POST /{phone_number_id}/messages`. Exactly one of the
/// type-specific payloads is set, matching `type`.
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    messaging_product: &'static str,
    recipient_type: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<TextPayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<TemplatePayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<ImagePayload<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPayload<'a> {
    preview_url: bool,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct TemplatePayload<'a> {
    name: &'a str,
    language: LanguagePayload<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    components: Option<Vec<ComponentPayload>>,
}

#[derive(Debug, Serialize)]
struct LanguagePayload<'a> {
    code: &'a str,
}

#[derive(Debug, Serialize)]
struct ComponentPayload {
    #[serde(rename = "type")]
    kind: &'static str,
    parameters: Vec<ParameterPayload>,
}

#[derive(Debug, Serialize)]
struct ParameterPayload {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

#[derive(Debug, Serialize)]
struct ImagePayload<'a> {
    link: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageResponse {
    pub messages: Vec<MessageId>,
}

#[derive(Debug, Deserialize)]
pub struct MessageId {
    pub id: String,
}

impl WhatsAppCloudClient {
    pub fn new(phone_number_id: &str, access_token: &str) -> Self {
        Self {
            http: Arc::new(ReqwestClient::new()),
            phone_number_id: phone_number_id.to_string(),
            access_token: access_token.to_string(),
            api_version: GRAPH_API_VERSION.to_string(),
        }
    }

    pub fn from_credential(cred: &ChannelCredential) -> Self {
        Self::new(&cred.cuenta_id, &cred.token_acceso)
    }

    async fn enviar(&self, request: &SendMessageRequest<'_>) -> Result<SendMessageResponse, Error> {
        let url = format!(
            "https://graph.facebook.com/{}/{}/messages",
            self.api_version, self.phone_number_id
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("whatsapp network error: {e}")))?;

        if !resp.status().is_success() {
            // The Graph error body is surfaced verbatim so operators see
            // the provider's own error code and message.
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Provider(format!("whatsapp: HTTP {status} => {text}")));
        }

        let parsed: SendMessageResponse = resp.json().await?;
        if parsed.messages.is_empty() {
            return Err(Error::Provider(
                "whatsapp: accept response carried no message id".to_string(),
            ));
        }
        Ok(parsed)
    }

    /// Free-form session message.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<SendMessageResponse, Error> {
        self.enviar(&SendMessageRequest {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to,
            kind: "text",
            text: Some(TextPayload {
                preview_url: true,
                body,
            }),
            template: None,
            image: None,
        })
        .await
    }

    /// Pre-approved template. `variables` are bound positionally to the
    /// template's body parameters, in the order given.
    pub async fn send_template(
        &self,
        to: &str,
        nombre: &str,
        idioma: &str,
        variables: &[String],
    ) -> Result<SendMessageResponse, Error> {
        let components = if variables.is_empty() {
            None
        } else {
            Some(vec![ComponentPayload {
                kind: "body",
                parameters: variables
                    .iter()
                    .map(|v| ParameterPayload {
                        kind: "text",
                        text: v.clone(),
                    })
                    .collect(),
            }])
        };

        self.enviar(&SendMessageRequest {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to,
            kind: "template",
            text: None,
            template: Some(TemplatePayload {
                name: nombre,
                language: LanguagePayload { code: idioma },
                components,
            }),
            image: None,
        })
        .await
    }

    pub async fn send_image(
        &self,
        to: &str,
        link: &str,
        caption: Option<&str>,
    ) -> Result<SendMessageResponse, Error> {
        self.enviar(&SendMessageRequest {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to,
            kind: "image",
            text: None,
            template: None,
            image: Some(ImagePayload { link, caption }),
        })
        .await
    }
}

#[async_trait]
impl ProviderSend for WhatsAppCloudClient {
    async fn enviar_texto(
        &self,
        to: &str,
        texto: &str,
        media_url: Option<&str>,
    ) -> Result<ProviderAccept, Error> {
        let resp = match media_url {
            Some(url) => self.send_image(to, url, Some(texto)).await?,
            None => self.send_text(to, texto).await?,
        };
        Ok(ProviderAccept {
            // Presence of at least one id is checked in `enviar`.
            provider_message_id: resp.messages[0].id.clone(),
            raw_status: None,
        })
    }

    async fn enviar_plantilla(
        &self,
        to: &str,
        nombre: &str,
        idioma: &str,
        variables: &[String],
    ) -> Result<ProviderAccept, Error> {
        let resp = self.send_template(to, nombre, idioma, variables).await?;
        Ok(ProviderAccept {
            provider_message_id: resp.messages[0].id.clone(),
            raw_status: None,
        })
    }

    async fn enviar_sms(&self, _to: &str, _texto: &str) -> Result<ProviderAccept, Error> {
        Err(Error::Provider(
            "whatsapp business credential cannot send SMS".to_string(),
        ))
    }
}
