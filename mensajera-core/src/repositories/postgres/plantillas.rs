use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::Error;
use mensajera_common::models::Plantilla;
use mensajera_common::traits::repository_traits::PlantillaRepository;

#[derive(Clone)]
pub struct PostgresPlantillaRepository {
    pool: Pool<Postgres>,
}

impl PostgresPlantillaRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlantillaRepository for PostgresPlantillaRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Plantilla>, Error> {
        let row = sqlx::query(
            r#"
            SELECT id, nombre, idioma, variables, created_at
            FROM marketing_template
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(r) = row {
            Ok(Some(Plantilla {
                id: r.try_get("id")?,
                nombre: r.try_get("nombre")?,
                idioma: r.try_get("idioma")?,
                variables: r.try_get("variables")?,
                created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
            }))
        } else {
            Ok(None)
        }
    }
}
