// File: src/cache/credential_cache.rs

use dashmap::DashMap;
use uuid::Uuid;

use mensajera_common::models::{Canal, ChannelCredential, Proveedor};

/// Process-wide cache of resolved channel credentials.
///
/// There is no TTL: correctness depends entirely on callers invalidating
/// whenever a credential row is written. The cache is shared across
/// concurrent campaign runs; dashmap keeps resolution and invalidation safe
/// without a lock around the whole map.
#[derive(Default)]
pub struct CredentialCache {
    by_channel: DashMap<(Canal, Proveedor), ChannelCredential>,
    by_id: DashMap<Uuid, ChannelCredential>,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, canal: Canal, proveedor: Proveedor) -> Option<ChannelCredential> {
        self.by_channel.get(&(canal, proveedor)).map(|c| c.clone())
    }

    pub fn get_by_id(&self, id: Uuid) -> Option<ChannelCredential> {
        self.by_id.get(&id).map(|c| c.clone())
    }

    /// Stores the authoritative credential for its (canal, proveedor) slot.
    /// Only channel-level resolution may call this; an explicitly pinned
    /// credential is not necessarily the active one for its channel.
    pub fn put(&self, cred: ChannelCredential) {
        self.by_id.insert(cred.id, cred.clone());
        self.by_channel.insert((cred.canal, cred.proveedor), cred);
    }

    /// Stores a credential that was looked up by explicit id. The channel
    /// slot is left alone.
    pub fn put_by_id(&self, cred: ChannelCredential) {
        self.by_id.insert(cred.id, cred);
    }

    pub fn invalidate(&self, canal: Canal, proveedor: Proveedor) {
        if let Some((_, cred)) = self.by_channel.remove(&(canal, proveedor)) {
            self.by_id.remove(&cred.id);
        }
    }

    pub fn invalidate_id(&self, id: Uuid) {
        if self.by_id.remove(&id).is_some() {
            // The channel slot may be occupied by a different credential;
            // only drop it when it is this one.
            self.by_channel.retain(|_, cred| cred.id != id);
        }
    }

    pub fn invalidate_all(&self) {
        self.by_channel.clear();
        self.by_id.clear();
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
