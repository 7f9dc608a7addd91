mod helpers;

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use helpers::{campana_draft, fixture, plantilla, Fixture};
use mensajera_common::models::{DestinatariosConfig, EstadoCampana, ResultadoEvento};
use mensajera_core::services::CampaignOrchestrator;
use mensajera_core::test_utils::{
    credencial_whatsapp, MemoryCampanaRepo, MemoryClienteRepo, MemoryEventLogRepo,
};
use mensajera_core::Error;

struct CampaignFixture {
    fx: Fixture,
    campanas: Arc<MemoryCampanaRepo>,
    clientes: Arc<MemoryClienteRepo>,
    event_log: Arc<MemoryEventLogRepo>,
    orchestrator: CampaignOrchestrator,
}

fn campaign_fixture() -> CampaignFixture {
    let fx = fixture();
    let campanas = Arc::new(MemoryCampanaRepo::default());
    let clientes = Arc::new(MemoryClienteRepo::default());
    let event_log = Arc::new(MemoryEventLogRepo::default());

    let orchestrator = CampaignOrchestrator::new(
        campanas.clone(),
        fx.plantillas.clone(),
        clientes.clone(),
        fx.resolver.clone(),
        fx.bulk.clone(),
        event_log.clone(),
    );

    CampaignFixture {
        fx,
        campanas,
        clientes,
        event_log,
        orchestrator,
    }
}

fn manual(numeros: &str) -> DestinatariosConfig {
    DestinatariosConfig::Manual {
        numeros: numeros.to_string(),
    }
}

/// Seeds a draft campaign together with its template and credential.
fn seed_draft(cf: &CampaignFixture) -> Uuid {
    let cred = credencial_whatsapp();
    cf.fx.credentials.rows.lock().push(cred.clone());

    let tpl = plantilla("promo_departamentos");
    cf.fx.plantillas.rows.lock().insert(tpl.id, tpl.clone());

    let campana = campana_draft(
        tpl.id,
        cred.id,
        Some(json!({"nombre": "Laura", "proyecto": "Torre Norte"})),
    );
    let id = campana.id;
    cf.campanas.rows.lock().insert(id, campana);
    id
}

#[tokio::test]
async fn draft_campaign_runs_to_completion() -> Result<(), Error> {
    let cf = campaign_fixture();
    let id = seed_draft(&cf);

    let resumen = cf
        .orchestrator
        .ejecutar(id, &manual("+5215550000001\n+5215550000002\n+5215550000003"))
        .await?;

    assert_eq!(resumen.enviados, 3);
    assert_eq!(resumen.fallidos, 0);
    assert_eq!(resumen.total, 3);

    let campana = cf.campanas.rows.lock().get(&id).cloned().unwrap();
    assert_eq!(campana.estado, EstadoCampana::Completed);
    assert_eq!(campana.total_enviados, 3);
    assert!(campana.fecha_inicio.is_some());
    assert!(campana.completado_at.is_some());
    assert!(campana.completado_at.unwrap() <= Utc::now());

    // The counter was persisted after each send, not only at the end.
    assert_eq!(*cf.campanas.contador_historial.lock(), vec![1, 2, 3]);

    let entries = cf.event_log.entries.lock();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].evento_tipo, "campana.ejecutada");
    assert_eq!(entries[0].campana_id, Some(id));
    assert_eq!(entries[0].resultado, ResultadoEvento::Success);
    Ok(())
}

#[tokio::test]
async fn partial_failures_still_complete_the_campaign() -> Result<(), Error> {
    let cf = campaign_fixture();
    let id = seed_draft(&cf);
    cf.fx
        .provider
        .fail_numbers
        .lock()
        .push("+5215550000002".to_string());

    let resumen = cf
        .orchestrator
        .ejecutar(id, &manual("+5215550000001\n+5215550000002\n+5215550000003"))
        .await?;

    assert_eq!(resumen.enviados, 2);
    assert_eq!(resumen.fallidos, 1);

    let campana = cf.campanas.rows.lock().get(&id).cloned().unwrap();
    assert_eq!(campana.estado, EstadoCampana::Completed);
    assert_eq!(campana.total_enviados, 2);

    assert_eq!(cf.event_log.entries.lock()[0].resultado, ResultadoEvento::Partial);
    Ok(())
}

#[tokio::test]
async fn lost_completion_write_does_not_fail_the_run() -> Result<(), Error> {
    let cf = campaign_fixture();
    let id = seed_draft(&cf);
    *cf.campanas.fail_completar.lock() = true;

    // All sends went out; the caller still gets the summary even though
    // the terminal-state write was lost.
    let resumen = cf
        .orchestrator
        .ejecutar(id, &manual("+5215550000001\n+5215550000002"))
        .await?;

    assert_eq!(resumen.enviados, 2);
    assert_eq!(cf.fx.provider.calls.lock().len(), 2);

    // The campaign stays RUNNING with its incrementally persisted counter.
    let campana = cf.campanas.rows.lock().get(&id).cloned().unwrap();
    assert_eq!(campana.estado, EstadoCampana::Running);
    assert_eq!(campana.total_enviados, 2);

    // The audit row is still written.
    assert_eq!(cf.event_log.entries.lock().len(), 1);
    Ok(())
}

#[tokio::test]
async fn running_campaign_cannot_be_started_again() {
    let cf = campaign_fixture();
    let id = seed_draft(&cf);
    cf.campanas
        .rows
        .lock()
        .get_mut(&id)
        .unwrap()
        .estado = EstadoCampana::Running;

    let err = cf.orchestrator.ejecutar(id, &manual("+5215550000001")).await.unwrap_err();
    assert!(matches!(err, Error::Precondition(_)));
    assert!(cf.fx.provider.calls.lock().is_empty());
}

#[tokio::test]
async fn completed_campaign_cannot_be_re_executed() {
    let cf = campaign_fixture();
    let id = seed_draft(&cf);
    cf.campanas
        .rows
        .lock()
        .get_mut(&id)
        .unwrap()
        .estado = EstadoCampana::Completed;

    let err = cf.orchestrator.ejecutar(id, &manual("+5215550000001")).await.unwrap_err();
    assert!(matches!(err, Error::Precondition(_)));
    assert!(cf.fx.provider.calls.lock().is_empty());
}

#[tokio::test]
async fn unknown_campaign_is_not_found() {
    let cf = campaign_fixture();
    let err = cf
        .orchestrator
        .ejecutar(Uuid::new_v4(), &manual("+5215550000001"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn missing_template_blocks_the_run() {
    let cf = campaign_fixture();
    let cred = credencial_whatsapp();
    cf.fx.credentials.rows.lock().push(cred.clone());

    let campana = campana_draft(Uuid::new_v4(), cred.id, None);
    let id = campana.id;
    cf.campanas.rows.lock().insert(id, campana);

    let err = cf.orchestrator.ejecutar(id, &manual("+5215550000001")).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    // Failed preconditions leave the campaign untouched.
    assert_eq!(
        cf.campanas.rows.lock().get(&id).unwrap().estado,
        EstadoCampana::Draft
    );
}

#[tokio::test]
async fn missing_credential_blocks_the_run() {
    let cf = campaign_fixture();
    let tpl = plantilla("promo_departamentos");
    cf.fx.plantillas.rows.lock().insert(tpl.id, tpl.clone());

    let campana = campana_draft(tpl.id, Uuid::new_v4(), None);
    let id = campana.id;
    cf.campanas.rows.lock().insert(id, campana);

    let err = cf.orchestrator.ejecutar(id, &manual("+5215550000001")).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(
        cf.campanas.rows.lock().get(&id).unwrap().estado,
        EstadoCampana::Draft
    );
}

#[tokio::test]
async fn empty_recipient_list_blocks_the_run() {
    let cf = campaign_fixture();
    let id = seed_draft(&cf);

    let err = cf.orchestrator.ejecutar(id, &manual("  \n \n")).await.unwrap_err();
    assert!(matches!(err, Error::Precondition(_)));
    assert_eq!(
        cf.campanas.rows.lock().get(&id).unwrap().estado,
        EstadoCampana::Draft
    );
}

#[tokio::test]
async fn todos_selector_uses_every_active_client() -> Result<(), Error> {
    let cf = campaign_fixture();
    let id = seed_draft(&cf);
    *cf.clientes.todos.lock() = vec![
        "+5215550000010".to_string(),
        "+5215550000011".to_string(),
    ];

    let resumen = cf
        .orchestrator
        .ejecutar(id, &DestinatariosConfig::Todos)
        .await?;

    assert_eq!(resumen.total, 2);
    assert_eq!(
        *cf.fx.provider.calls.lock(),
        vec!["+5215550000010".to_string(), "+5215550000011".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn proyecto_selector_scopes_to_one_project() -> Result<(), Error> {
    let cf = campaign_fixture();
    let id = seed_draft(&cf);

    let proyecto_id = Uuid::new_v4();
    *cf.clientes.todos.lock() = vec!["+5215550000010".to_string()];
    cf.clientes
        .por_proyecto
        .lock()
        .insert(proyecto_id, vec!["+5215550000020".to_string()]);

    let resumen = cf
        .orchestrator
        .ejecutar(id, &DestinatariosConfig::Proyecto { proyecto_id })
        .await?;

    assert_eq!(resumen.total, 1);
    assert_eq!(*cf.fx.provider.calls.lock(), vec!["+5215550000020".to_string()]);
    Ok(())
}

#[tokio::test]
async fn campaign_messages_carry_the_campaign_id() -> Result<(), Error> {
    let cf = campaign_fixture();
    let id = seed_draft(&cf);

    cf.orchestrator
        .ejecutar(id, &manual("+5215550000001\n+5215550000002"))
        .await?;

    let inserted = cf.fx.mensajes.inserted.lock();
    assert_eq!(inserted.len(), 2);
    assert!(inserted.iter().all(|m| m.campana_id == Some(id)));
    Ok(())
}
