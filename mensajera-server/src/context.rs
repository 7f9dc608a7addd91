use std::sync::Arc;

use mensajera_common::traits::repository_traits::EventLogRepository;
use mensajera_core::cache::CredentialCache;
use mensajera_core::crypto::Encryptor;
use mensajera_core::providers::DefaultProviderFactory;
use mensajera_core::repositories::{
    PostgresCampanaRepository, PostgresClienteRepository, PostgresConversacionRepository,
    PostgresCredentialsRepository, PostgresEventLogRepository, PostgresMensajeRepository,
    PostgresPlantillaRepository,
};
use mensajera_core::services::{
    BulkSendCoordinator, CampaignOrchestrator, CredentialResolver, MessageDispatcher,
    SessionWindowTracker,
};
use mensajera_core::Database;

/// All services a request handler can reach, wired once at startup.
pub struct ServerContext {
    pub resolver: Arc<CredentialResolver>,
    pub dispatcher: Arc<MessageDispatcher>,
    pub bulk: Arc<BulkSendCoordinator>,
    pub campaigns: Arc<CampaignOrchestrator>,
    pub event_log: Arc<dyn EventLogRepository>,
}

impl ServerContext {
    pub fn new(db: &Database, encryptor: Encryptor) -> Self {
        let pool = db.pool().clone();

        let credentials = Arc::new(PostgresCredentialsRepository::new(pool.clone(), encryptor));
        let conversaciones = Arc::new(PostgresConversacionRepository::new(pool.clone()));
        let plantillas = Arc::new(PostgresPlantillaRepository::new(pool.clone()));
        let campanas = Arc::new(PostgresCampanaRepository::new(pool.clone()));
        let mensajes = Arc::new(PostgresMensajeRepository::new(pool.clone()));
        let clientes = Arc::new(PostgresClienteRepository::new(pool.clone()));
        let event_log = Arc::new(PostgresEventLogRepository::new(pool));

        let cache = Arc::new(CredentialCache::new());
        let resolver = Arc::new(CredentialResolver::new(credentials, cache));
        let sesiones = Arc::new(SessionWindowTracker::new(conversaciones));

        let dispatcher = Arc::new(MessageDispatcher::new(
            resolver.clone(),
            Arc::new(DefaultProviderFactory),
            sesiones,
            mensajes,
            plantillas.clone(),
        ));

        let bulk = Arc::new(BulkSendCoordinator::new(dispatcher.clone()));

        let campaigns = Arc::new(CampaignOrchestrator::new(
            campanas,
            plantillas,
            clientes,
            resolver.clone(),
            bulk.clone(),
            event_log.clone(),
        ));

        Self {
            resolver,
            dispatcher,
            bulk,
            campaigns,
            event_log,
        }
    }
}
