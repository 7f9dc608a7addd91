use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::Error;
use mensajera_common::models::Mensaje;
use mensajera_common::traits::repository_traits::MensajeRepository;

#[derive(Clone)]
pub struct PostgresMensajeRepository {
    pool: Pool<Postgres>,
}

impl PostgresMensajeRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MensajeRepository for PostgresMensajeRepository {
    async fn insert(&self, mensaje: &Mensaje) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO marketing_mensaje (
                id,
                conversacion_id,
                campana_id,
                template_id,
                direccion,
                tipo,
                contenido_texto,
                media_url,
                provider_message_id,
                estado,
                sent_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(mensaje.id)
        .bind(mensaje.conversacion_id)
        .bind(mensaje.campana_id)
        .bind(mensaje.template_id)
        .bind(mensaje.direccion.to_string())
        .bind(mensaje.tipo.to_string())
        .bind(&mensaje.contenido_texto)
        .bind(&mensaje.media_url)
        .bind(&mensaje.provider_message_id)
        .bind(mensaje.estado.to_string())
        .bind(mensaje.sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
