use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outbound channel a credential is bound to.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Canal {
    Sms,
    Whatsapp,
}

impl fmt::Display for Canal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Canal::Sms => write!(f, "SMS"),
            Canal::Whatsapp => write!(f, "WHATSAPP"),
        }
    }
}

impl FromStr for Canal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SMS" => Ok(Canal::Sms),
            "WHATSAPP" => Ok(Canal::Whatsapp),
            _ => Err(format!("Invalid canal: {}", s)),
        }
    }
}

/// Backing provider for a channel credential.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum Proveedor {
    #[sqlx(rename = "TWILIO")]
    Twilio,
    #[sqlx(rename = "WHATSAPP_BUSINESS")]
    WhatsappBusiness,
}

impl fmt::Display for Proveedor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Proveedor::Twilio => write!(f, "TWILIO"),
            Proveedor::WhatsappBusiness => write!(f, "WHATSAPP_BUSINESS"),
        }
    }
}

impl FromStr for Proveedor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TWILIO" => Ok(Proveedor::Twilio),
            "WHATSAPP_BUSINESS" => Ok(Proveedor::WhatsappBusiness),
            _ => Err(format!("Invalid proveedor: {}", s)),
        }
    }
}

/// One row of `marketing_channel_credential`.
///
/// `cuenta_id` is the Twilio account SID or the WhatsApp Business
/// phone-number id; `token_acceso` is stored encrypted and only ever
/// decrypted by the credentials repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelCredential {
    pub id: Uuid,
    pub canal: Canal,
    pub proveedor: Proveedor,
    pub cuenta_id: String,
    pub token_acceso: String,
    pub remitente_sms: Option<String>,
    pub remitente_whatsapp: Option<String>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
