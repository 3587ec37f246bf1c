// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The Backend Registry (§4.3, component C3): a process-local mapping from
//! URL to attached backend. Lookups are by URL; insertions are idempotent
//! (attaching an already-attached URL returns the existing backend);
//! removal requires that nothing else still references the backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{BackendAttachError, BackendCreateError};
use crate::Backend;

/// Failure of [`BackendRegistry::remove`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RegistryRemoveError {
    /// No backend is registered under this URL.
    NotFound,
    /// Something else (typically an allocator, via `shmx-manager`) still
    /// holds a reference to this backend.
    StillInUse,
}

/// Process-local directory of attached backends, by URL.
pub struct BackendRegistry<B: Backend> {
    backends: Mutex<HashMap<String, Arc<B>>>,
}

impl<B: Backend> Default for BackendRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> BackendRegistry<B> {
    pub fn new() -> Self {
        Self {
            backends: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a new backend and registers it. Fails with
    /// [`BackendCreateError::BackendExists`] if this process already has a
    /// backend registered under `url` (it doesn't even attempt the OS-level
    /// create in that case, since §4.3 insertions are meant to be
    /// idempotent per-process).
    pub fn create(&self, url: &str, size: usize) -> Result<Arc<B>, BackendCreateError> {
        let mut backends = self.backends.lock().unwrap();
        if backends.contains_key(url) {
            return Err(BackendCreateError::BackendExists);
        }
        let backend = Arc::new(B::create(url, size)?);
        backends.insert(url.to_string(), Arc::clone(&backend));
        Ok(backend)
    }

    /// Attaches a backend created by another process. Idempotent: if this
    /// process already attached `url`, the existing handle is returned
    /// without touching the OS.
    pub fn attach(&self, url: &str, min_size: usize) -> Result<Arc<B>, BackendAttachError> {
        let mut backends = self.backends.lock().unwrap();
        if let Some(existing) = backends.get(url) {
            return Ok(Arc::clone(existing));
        }
        let backend = Arc::new(B::attach(url, min_size)?);
        backends.insert(url.to_string(), Arc::clone(&backend));
        Ok(backend)
    }

    /// Looks up an already-registered backend by URL.
    pub fn get(&self, url: &str) -> Option<Arc<B>> {
        self.backends.lock().unwrap().get(url).cloned()
    }

    /// Removes `url` from the registry. The caller (`shmx-manager`) is
    /// expected to have already unregistered every allocator that lived in
    /// this backend; if another `Arc` clone is still outstanding this
    /// fails with [`RegistryRemoveError::StillInUse`] and the registry is
    /// left unchanged.
    pub fn remove(&self, url: &str) -> Result<Arc<B>, RegistryRemoveError> {
        let mut backends = self.backends.lock().unwrap();
        let entry = backends.get(url).ok_or(RegistryRemoveError::NotFound)?;
        // One reference is the registry's own map entry; exactly one means
        // nobody else holds this backend.
        if Arc::strong_count(entry) > 1 {
            return Err(RegistryRemoveError::StillInUse);
        }
        Ok(backends.remove(url).unwrap())
    }

    pub fn len(&self) -> usize {
        self.backends.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnonymousSharedMemory;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn unique_url() -> String {
        format!("registry-test-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[test]
    fn attach_is_idempotent() {
        let url = unique_url();
        let creator_registry = BackendRegistry::<AnonymousSharedMemory>::new();
        creator_registry.create(&url, 4096).unwrap();

        let attacher_registry = BackendRegistry::<AnonymousSharedMemory>::new();
        let a = attacher_registry.attach(&url, 0).unwrap();
        let b = attacher_registry.attach(&url, 0).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(attacher_registry.len(), 1);

        drop(a);
        drop(b);
        drop(attacher_registry);
        creator_registry.get(&url).unwrap();
    }

    #[test]
    fn remove_fails_while_still_referenced() {
        let url = unique_url();
        let registry = BackendRegistry::<AnonymousSharedMemory>::new();
        let handle = registry.create(&url, 4096).unwrap();

        assert_eq!(registry.remove(&url).unwrap_err(), RegistryRemoveError::StillInUse);

        drop(handle);
        registry.remove(&url).unwrap();
    }
}
