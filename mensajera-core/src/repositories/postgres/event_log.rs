use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::Error;
use mensajera_common::models::EventLogEntry;
use mensajera_common::traits::repository_traits::EventLogRepository;

/// Append-only audit log. The core only ever writes here; nothing reads it
/// back.
#[derive(Clone)]
pub struct PostgresEventLogRepository {
    pool: Pool<Postgres>,
}

impl PostgresEventLogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventLogRepository for PostgresEventLogRepository {
    async fn insert(&self, entry: &EventLogEntry) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO marketing_event_log (
                evento_tipo,
                conversacion_id,
                campana_id,
                payload,
                resultado
            )
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&entry.evento_tipo)
        .bind(entry.conversacion_id)
        .bind(entry.campana_id)
        .bind(&entry.payload)
        .bind(entry.resultado.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
