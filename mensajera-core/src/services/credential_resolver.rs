use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::cache::CredentialCache;
use crate::Error;
use mensajera_common::models::{Canal, ChannelCredential, Proveedor};
use mensajera_common::traits::repository_traits::CredentialsRepository;

/// Resolves the active provider credential for a channel, caching the
/// result until explicitly invalidated.
///
/// There is no TTL on the cache: whoever mutates credential rows must call
/// one of the `invalidate*` methods (the server exposes this as
/// `POST /api/credenciales/invalidar`).
pub struct CredentialResolver {
    repo: Arc<dyn CredentialsRepository>,
    cache: Arc<CredentialCache>,
}

impl CredentialResolver {
    pub fn new(repo: Arc<dyn CredentialsRepository>, cache: Arc<CredentialCache>) -> Self {
        Self { repo, cache }
    }

    /// The single authoritative active credential for (canal, proveedor).
    pub async fn resolve(
        &self,
        canal: Canal,
        proveedor: Proveedor,
    ) -> Result<ChannelCredential, Error> {
        if let Some(cred) = self.cache.get(canal, proveedor) {
            return Ok(cred);
        }

        match self.repo.get_active(canal, proveedor).await? {
            Some(cred) => {
                debug!("Resolved credential {} for {}/{}", cred.id, canal, proveedor);
                self.cache.put(cred.clone());
                Ok(cred)
            }
            None => Err(Error::NotFound(format!(
                "no active credential for {}/{}",
                canal, proveedor
            ))),
        }
    }

    /// An explicitly requested credential. Inactive and missing rows are
    /// the same not-found condition.
    pub async fn resolve_by_id(&self, id: Uuid) -> Result<ChannelCredential, Error> {
        if let Some(cred) = self.cache.get_by_id(id) {
            return Ok(cred);
        }

        match self.repo.get_by_id(id).await? {
            Some(cred) => {
                debug!("Resolved credential {} by id", cred.id);
                self.cache.put_by_id(cred.clone());
                Ok(cred)
            }
            None => Err(Error::NotFound(format!("credential {} not found", id))),
        }
    }

    pub fn invalidate(&self, canal: Canal, proveedor: Proveedor) {
        self.cache.invalidate(canal, proveedor);
    }

    pub fn invalidate_id(&self, id: Uuid) {
        self.cache.invalidate_id(id);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
