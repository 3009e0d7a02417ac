//! Locally addressable references to fetched sticker bytes.
//!
//! A [`BlobHandle`] owns its registration: dropping the handle revokes the URL,
//! so a replaced preview can never outlive its replacement.

use actix_web::web::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub trait BlobRegistry: Send + Sync {
    /// Make `data` addressable and return its URL.
    fn register(&self, data: Bytes, content_type: &str) -> String;
    fn revoke(&self, url: &str);
}

/// In-process registry, the default backing store for previews and downloads.
#[derive(Default)]
pub struct MemoryBlobRegistry {
    blobs: Mutex<HashMap<String, (Bytes, String)>>,
}

impl MemoryBlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.blobs.lock().contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<(Bytes, String)> {
        self.blobs.lock().get(url).cloned()
    }
}

impl BlobRegistry for MemoryBlobRegistry {
    fn register(&self, data: Bytes, content_type: &str) -> String {
        let url = format!("blob:sticker/{}", Uuid::new_v4());
        self.blobs
            .lock()
            .insert(url.clone(), (data, content_type.to_string()));
        url
    }

    fn revoke(&self, url: &str) {
        if self.blobs.lock().remove(url).is_none() {
            log::warn!("Revoking unknown blob {}", url);
        }
    }
}

/// Scoped ownership of one registered blob.
pub struct BlobHandle {
    url: String,
    data: Bytes,
    content_type: String,
    registry: Arc<dyn BlobRegistry>,
}

impl BlobHandle {
    pub fn acquire(registry: Arc<dyn BlobRegistry>, data: Bytes, content_type: &str) -> Self {
        let url = registry.register(data.clone(), content_type);
        log::debug!("Acquired blob {} ({} bytes)", url, data.len());
        Self {
            url,
            data,
            content_type: content_type.to_string(),
            registry,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Release now instead of waiting for the end of scope.
    pub fn release(self) {
        drop(self)
    }
}

impl std::fmt::Debug for BlobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobHandle")
            .field("url", &self.url)
            .field("len", &self.data.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

impl Drop for BlobHandle {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
        log::debug!("Released blob {}", self.url);
    }
}
