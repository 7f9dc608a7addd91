use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::Error;
use mensajera_common::models::{Campana, EstadoCampana};
use mensajera_common::traits::repository_traits::CampanaRepository;

#[derive(Clone)]
pub struct PostgresCampanaRepository {
    pool: Pool<Postgres>,
}

impl PostgresCampanaRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampanaRepository for PostgresCampanaRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Campana>, Error> {
        let row = sqlx::query(
            r#"
            SELECT
                id,
                nombre,
                template_id,
                credential_id,
                variables_valores,
                max_envios_por_segundo,
                estado,
                total_enviados,
                fecha_inicio,
                completado_at,
                created_at
            FROM marketing_campana
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(r) = row {
            Ok(Some(Campana {
                id: r.try_get("id")?,
                nombre: r.try_get("nombre")?,
                template_id: r.try_get("template_id")?,
                credential_id: r.try_get("credential_id")?,
                variables_valores: r.try_get("variables_valores")?,
                max_envios_por_segundo: r.try_get("max_envios_por_segundo")?,
                estado: EstadoCampana::from_str(&r.try_get::<String, _>("estado")?)
                    .map_err(Error::Parse)?,
                total_enviados: r.try_get("total_enviados")?,
                fecha_inicio: r.try_get::<Option<DateTime<Utc>>, _>("fecha_inicio")?,
                completado_at: r.try_get::<Option<DateTime<Utc>>, _>("completado_at")?,
                created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn marcar_running(
        &self,
        id: Uuid,
        fecha_inicio: DateTime<Utc>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE marketing_campana
            SET estado = 'RUNNING', fecha_inicio = $1
            WHERE id = $2
            "#,
        )
        .bind(fecha_inicio)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn actualizar_enviados(&self, id: Uuid, total_enviados: i32) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE marketing_campana
            SET total_enviados = $1
            WHERE id = $2
            "#,
        )
        .bind(total_enviados)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn marcar_completada(
        &self,
        id: Uuid,
        completado_at: DateTime<Utc>,
        total_enviados: i32,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE marketing_campana
            SET estado = 'COMPLETED', completado_at = $1, total_enviados = $2
            WHERE id = $3
            "#,
        )
        .bind(completado_at)
        .bind(total_enviados)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
