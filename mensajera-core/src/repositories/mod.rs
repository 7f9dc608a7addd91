// src/repositories/mod.rs

pub mod postgres;

pub use postgres::campanas::PostgresCampanaRepository;
pub use postgres::clientes::PostgresClienteRepository;
pub use postgres::conversaciones::PostgresConversacionRepository;
pub use postgres::credentials::PostgresCredentialsRepository;
pub use postgres::event_log::PostgresEventLogRepository;
pub use postgres::mensajes::PostgresMensajeRepository;
pub use postgres::plantillas::PostgresPlantillaRepository;
