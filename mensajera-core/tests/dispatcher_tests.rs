mod helpers;

use chrono::{Duration, Utc};
use uuid::Uuid;

use helpers::{conversacion_abierta, conversacion_expirada, fixture, plantilla};
use mensajera_common::models::{Direccion, EstadoMensaje, TipoMensaje};
use mensajera_core::services::{SendKind, SendRequest};
use mensajera_core::test_utils::{credencial_twilio, credencial_whatsapp};
use mensajera_core::Error;

fn session_request(conversacion_id: Uuid, credential_id: Uuid) -> SendRequest {
    SendRequest {
        telefono: "+5215550001111".to_string(),
        kind: SendKind::Session {
            texto: "Hola, seguimos con su cotizacion".to_string(),
            media_url: None,
        },
        conversacion_id: Some(conversacion_id),
        campana_id: None,
        credential_id: Some(credential_id),
    }
}

#[tokio::test]
async fn session_send_inside_open_window() -> Result<(), Error> {
    let fx = fixture();
    let cred = credencial_whatsapp();
    fx.credentials.rows.lock().push(cred.clone());

    let conv = conversacion_abierta();
    fx.conversaciones.rows.lock().insert(conv.id, conv.clone());

    let result = fx.dispatcher.enviar(&session_request(conv.id, cred.id)).await?;

    assert!(result.mensaje_id.is_some());
    assert_eq!(result.outcome.provider_message_id, "wamid-1");
    // No raw status from the fake, so the canonical mapping lands on PENDING.
    assert_eq!(result.outcome.estado, EstadoMensaje::Pending);

    let inserted = fx.mensajes.inserted.lock();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].direccion, Direccion::Out);
    assert_eq!(inserted[0].tipo, TipoMensaje::Session);
    assert_eq!(inserted[0].conversacion_id, Some(conv.id));
    Ok(())
}

#[tokio::test]
async fn session_send_extends_window() -> Result<(), Error> {
    let fx = fixture();
    let cred = credencial_whatsapp();
    fx.credentials.rows.lock().push(cred.clone());

    let conv = conversacion_abierta();
    fx.conversaciones.rows.lock().insert(conv.id, conv.clone());

    fx.dispatcher.enviar(&session_request(conv.id, cred.id)).await?;

    let updated = fx.conversaciones.rows.lock().get(&conv.id).cloned().unwrap();
    let expira = updated.session_expires_at.unwrap();
    assert!(updated.is_session_open);
    assert!(expira > Utc::now() + Duration::hours(23));
    assert!(expira <= Utc::now() + Duration::hours(24));
    Ok(())
}

#[tokio::test]
async fn session_send_rejected_when_window_expired() {
    let fx = fixture();
    let cred = credencial_whatsapp();
    fx.credentials.rows.lock().push(cred.clone());

    let conv = conversacion_expirada();
    fx.conversaciones.rows.lock().insert(conv.id, conv.clone());

    let err = fx
        .dispatcher
        .enviar(&session_request(conv.id, cred.id))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::SessionClosed(_)));
    // Rejection happens before any provider traffic or local row.
    assert!(fx.provider.calls.lock().is_empty());
    assert!(fx.mensajes.inserted.lock().is_empty());
}

#[tokio::test]
async fn session_send_rejected_for_unknown_conversation() {
    let fx = fixture();
    let cred = credencial_whatsapp();
    fx.credentials.rows.lock().push(cred.clone());

    let err = fx
        .dispatcher
        .enviar(&session_request(Uuid::new_v4(), cred.id))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(fx.provider.calls.lock().is_empty());
}

#[tokio::test]
async fn template_send_reopens_expired_window() -> Result<(), Error> {
    let fx = fixture();
    let cred = credencial_whatsapp();
    fx.credentials.rows.lock().push(cred.clone());

    let tpl = plantilla("reapertura_visita");
    fx.plantillas.rows.lock().insert(tpl.id, tpl.clone());

    let conv = conversacion_expirada();
    fx.conversaciones.rows.lock().insert(conv.id, conv.clone());

    let request = SendRequest {
        telefono: conv.telefono.clone(),
        kind: SendKind::Template {
            template_id: tpl.id,
            variables: vec!["Laura".to_string()],
        },
        conversacion_id: Some(conv.id),
        campana_id: None,
        credential_id: Some(cred.id),
    };
    let result = fx.dispatcher.enviar(&request).await?;

    assert!(result.mensaje_id.is_some());
    let inserted = fx.mensajes.inserted.lock();
    assert_eq!(inserted[0].template_id, Some(tpl.id));
    drop(inserted);

    let updated = fx.conversaciones.rows.lock().get(&conv.id).cloned().unwrap();
    assert!(updated.is_session_open);
    assert!(updated.session_expires_at.unwrap() > Utc::now());
    Ok(())
}

#[tokio::test]
async fn template_send_fails_when_template_missing() {
    let fx = fixture();
    let cred = credencial_whatsapp();
    fx.credentials.rows.lock().push(cred.clone());

    let request = SendRequest {
        telefono: "+5215550001111".to_string(),
        kind: SendKind::Template {
            template_id: Uuid::new_v4(),
            variables: vec![],
        },
        conversacion_id: None,
        campana_id: None,
        credential_id: Some(cred.id),
    };
    let err = fx.dispatcher.enviar(&request).await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(fx.provider.calls.lock().is_empty());
}

#[tokio::test]
async fn accepted_send_survives_persistence_failure() -> Result<(), Error> {
    let fx = fixture();
    let cred = credencial_whatsapp();
    fx.credentials.rows.lock().push(cred.clone());

    let conv = conversacion_abierta();
    fx.conversaciones.rows.lock().insert(conv.id, conv.clone());
    *fx.mensajes.fail_inserts.lock() = true;

    let result = fx.dispatcher.enviar(&session_request(conv.id, cred.id)).await?;

    // Provider traffic happened, so the caller still sees success; only
    // the local row is missing.
    assert!(result.mensaje_id.is_none());
    assert_eq!(result.outcome.provider_message_id, "wamid-1");
    Ok(())
}

#[tokio::test]
async fn sms_resolves_default_twilio_credential() -> Result<(), Error> {
    let fx = fixture();
    fx.credentials.rows.lock().push(credencial_twilio());

    let request = SendRequest {
        telefono: "+5215550009999".to_string(),
        kind: SendKind::Sms {
            texto: "Su cita es manana a las 10am".to_string(),
        },
        conversacion_id: None,
        campana_id: None,
        credential_id: None,
    };
    let result = fx.dispatcher.enviar(&request).await?;

    assert!(result.mensaje_id.is_some());
    assert_eq!(fx.mensajes.inserted.lock()[0].tipo, TipoMensaje::Sms);
    Ok(())
}

#[tokio::test]
async fn provider_status_flows_into_message_row() -> Result<(), Error> {
    let fx = fixture();
    let cred = credencial_twilio();
    fx.credentials.rows.lock().push(cred.clone());
    *fx.provider.raw_status.lock() = Some("queued".to_string());

    let request = SendRequest {
        telefono: "+5215550009999".to_string(),
        kind: SendKind::Sms {
            texto: "hola".to_string(),
        },
        conversacion_id: None,
        campana_id: None,
        credential_id: Some(cred.id),
    };
    let result = fx.dispatcher.enviar(&request).await?;

    assert_eq!(result.outcome.estado, EstadoMensaje::Pending);
    assert_eq!(fx.mensajes.inserted.lock()[0].estado, EstadoMensaje::Pending);
    Ok(())
}
