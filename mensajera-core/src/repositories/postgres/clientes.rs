use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::Error;
use mensajera_common::traits::repository_traits::ClienteRepository;

/// Read-only view over the CRM's client table. The core only ever needs
/// phone numbers of active clients for campaign fan-out.
#[derive(Clone)]
pub struct PostgresClienteRepository {
    pool: Pool<Postgres>,
}

impl PostgresClienteRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClienteRepository for PostgresClienteRepository {
    async fn telefonos_activos(
        &self,
        proyecto_id: Option<Uuid>,
    ) -> Result<Vec<String>, Error> {
        let rows = match proyecto_id {
            Some(pid) => {
                sqlx::query(
                    r#"
                    SELECT telefono
                    FROM cliente
                    WHERE activo = TRUE
                      AND telefono IS NOT NULL
                      AND proyecto_id = $1
                    "#,
                )
                .bind(pid)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT telefono
                    FROM cliente
                    WHERE activo = TRUE
                      AND telefono IS NOT NULL
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut telefonos = Vec::with_capacity(rows.len());
        for r in rows {
            let telefono: String = r.try_get("telefono")?;
            if !telefono.trim().is_empty() {
                telefonos.push(telefono);
            }
        }

        Ok(telefonos)
    }
}
