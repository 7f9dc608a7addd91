mod helpers;

use std::sync::Arc;

use chrono::{Duration, Utc};

use helpers::{conversacion_abierta, conversacion_expirada};
use mensajera_core::services::session_window::VENTANA_SESION_HORAS;
use mensajera_core::services::SessionWindowTracker;
use mensajera_core::test_utils::MemoryConversacionRepo;
use mensajera_core::Error;

#[test]
fn window_open_requires_flag_and_future_expiry() {
    assert!(SessionWindowTracker::esta_abierta(&conversacion_abierta()));
    assert!(!SessionWindowTracker::esta_abierta(&conversacion_expirada()));
}

#[test]
fn closed_flag_overrides_future_expiry() {
    let mut conv = conversacion_abierta();
    conv.is_session_open = false;
    assert!(!SessionWindowTracker::esta_abierta(&conv));
}

#[test]
fn missing_expiry_means_closed() {
    let mut conv = conversacion_abierta();
    conv.session_expires_at = None;
    assert!(!SessionWindowTracker::esta_abierta(&conv));
}

#[test]
fn expiry_in_the_past_means_closed_even_if_flag_is_stale() {
    let mut conv = conversacion_abierta();
    conv.session_expires_at = Some(Utc::now() - Duration::seconds(1));
    assert!(conv.is_session_open);
    assert!(!SessionWindowTracker::esta_abierta(&conv));
}

#[tokio::test]
async fn extender_reopens_for_a_full_day() -> Result<(), Error> {
    let repo = Arc::new(MemoryConversacionRepo::default());
    let conv = conversacion_expirada();
    repo.rows.lock().insert(conv.id, conv.clone());

    let tracker = SessionWindowTracker::new(repo.clone());
    let expira = tracker.extender(conv.id).await?;

    assert!(expira > Utc::now() + Duration::hours(VENTANA_SESION_HORAS - 1));

    let updated = repo.rows.lock().get(&conv.id).cloned().unwrap();
    assert!(updated.is_session_open);
    assert_eq!(updated.session_expires_at, Some(expira));
    assert!(updated.last_outbound_at.is_some());
    assert!(SessionWindowTracker::esta_abierta(&updated));
    Ok(())
}

#[tokio::test]
async fn extender_fails_for_unknown_conversation() {
    let repo = Arc::new(MemoryConversacionRepo::default());
    let tracker = SessionWindowTracker::new(repo);

    let err = tracker.extender(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
