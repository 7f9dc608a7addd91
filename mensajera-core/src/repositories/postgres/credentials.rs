use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::crypto::Encryptor;
use crate::Error;
use mensajera_common::models::{Canal, ChannelCredential, Proveedor};
use mensajera_common::traits::repository_traits::CredentialsRepository;

#[derive(Clone)]
pub struct PostgresCredentialsRepository {
    pool: Pool<Postgres>,
    encryptor: Encryptor,
}

impl PostgresCredentialsRepository {
    pub fn new(pool: Pool<Postgres>, encryptor: Encryptor) -> Self {
        Self { pool, encryptor }
    }

    fn row_to_credential(&self, r: &sqlx::postgres::PgRow) -> Result<ChannelCredential, Error> {
        let decrypted_token = self.encryptor.decrypt(r.try_get("token_acceso")?)?;

        Ok(ChannelCredential {
            id: r.try_get("id")?,
            canal: Canal::from_str(&r.try_get::<String, _>("canal")?)
                .map_err(Error::Parse)?,
            proveedor: Proveedor::from_str(&r.try_get::<String, _>("proveedor")?)
                .map_err(Error::Parse)?,
            cuenta_id: r.try_get("cuenta_id")?,
            token_acceso: decrypted_token,
            remitente_sms: r.try_get("remitente_sms")?,
            remitente_whatsapp: r.try_get("remitente_whatsapp")?,
            activo: r.try_get("activo")?,
            created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: r.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }
}

#[async_trait]
impl CredentialsRepository for PostgresCredentialsRepository {
    async fn get_active(
        &self,
        canal: Canal,
        proveedor: Proveedor,
    ) -> Result<Option<ChannelCredential>, Error> {
        // If duplicates exist, the most recently updated row is authoritative.
        let row = sqlx::query(
            r#"
            SELECT
                id,
                canal,
                proveedor,
                cuenta_id,
                token_acceso,
                remitente_sms,
                remitente_whatsapp,
                activo,
                created_at,
                updated_at
            FROM marketing_channel_credential
            WHERE canal = $1
              AND proveedor = $2
              AND activo = TRUE
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(canal.to_string())
        .bind(proveedor.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(self.row_to_credential(&r)?)),
            None => Ok(None),
        }
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<ChannelCredential>, Error> {
        let row = sqlx::query(
            r#"
            SELECT
                id,
                canal,
                proveedor,
                cuenta_id,
                token_acceso,
                remitente_sms,
                remitente_whatsapp,
                activo,
                created_at,
                updated_at
            FROM marketing_channel_credential
            WHERE id = $1
              AND activo = TRUE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(self.row_to_credential(&r)?)),
            None => Ok(None),
        }
    }

    async fn store(&self, cred: &ChannelCredential) -> Result<(), Error> {
        let encrypted_token = self.encryptor.encrypt(&cred.token_acceso)?;

        sqlx::query(
            r#"
            INSERT INTO marketing_channel_credential (
                id,
                canal,
                proveedor,
                cuenta_id,
                token_acceso,
                remitente_sms,
                remitente_whatsapp,
                activo,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE
               SET cuenta_id          = EXCLUDED.cuenta_id,
                   token_acceso       = EXCLUDED.token_acceso,
                   remitente_sms      = EXCLUDED.remitente_sms,
                   remitente_whatsapp = EXCLUDED.remitente_whatsapp,
                   activo             = EXCLUDED.activo,
                   updated_at         = EXCLUDED.updated_at
            "#,
        )
        .bind(cred.id)
        .bind(cred.canal.to_string())
        .bind(cred.proveedor.to_string())
        .bind(&cred.cuenta_id)
        .bind(encrypted_token)
        .bind(&cred.remitente_sms)
        .bind(&cred.remitente_whatsapp)
        .bind(cred.activo)
        .bind(cred.created_at)
        .bind(cred.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
