use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::Error;
use mensajera_common::models::Conversacion;
use mensajera_common::traits::repository_traits::ConversacionRepository;

#[derive(Clone)]
pub struct PostgresConversacionRepository {
    pool: Pool<Postgres>,
}

impl PostgresConversacionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversacionRepository for PostgresConversacionRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Conversacion>, Error> {
        let row = sqlx::query(
            r#"
            SELECT
                id,
                telefono,
                last_outbound_at,
                is_session_open,
                session_expires_at,
                created_at
            FROM marketing_conversacion
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(r) = row {
            Ok(Some(Conversacion {
                id: r.try_get("id")?,
                telefono: r.try_get("telefono")?,
                last_outbound_at: r.try_get::<Option<DateTime<Utc>>, _>("last_outbound_at")?,
                is_session_open: r.try_get("is_session_open")?,
                session_expires_at: r
                    .try_get::<Option<DateTime<Utc>>, _>("session_expires_at")?,
                created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn marcar_sesion_abierta(
        &self,
        id: Uuid,
        expires: DateTime<Utc>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE marketing_conversacion
            SET is_session_open    = TRUE,
                session_expires_at = $1,
                last_outbound_at   = NOW()
            WHERE id = $2
            "#,
        )
        .bind(expires)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
