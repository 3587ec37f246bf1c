// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The Memory Manager (§4.7, component C7): the process singleton that
//! binds backends to allocators by [`AllocatorId`]. §2's data flow: a
//! *creator* asks the manager for a backend of size `S` at URL `U`, then
//! for an allocator at the start of that window, recorded by id. An
//! *attacher* attaches the same URL, then asks the manager to reconstruct
//! the allocator from the header at the window's head.
//!
//! Construction order matters (§4.7): `create_backend` before
//! `create_*_allocator`; `attach_backend` before `attach_allocator`, and
//! `attach_allocator` before `get_allocator` succeeds for that id — a
//! `get_allocator` on an id nobody in this process has attached yet fails
//! with [`AllocatorUnknown`], never blocks.

mod any_allocator;
mod error;

pub use any_allocator::AnyAllocator;
pub use error::{
    AllocatorUnknown, AttachAllocatorError, AttachBackendError, CreateAllocatorError,
    CreateBackendError,
};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use shmx_allocator::{peek_kind, AllocatorKind, ScalablePageAllocator, ShmxAllocator, StackAllocator};
use shmx_backend::{Backend, BackendRegistry};
use shmx_log::fail;
use shmx_pointer::AllocatorId;

/// Process singleton holding the Backend Registry (§4.3) and an allocator
/// registry (id → allocator). Generic over the concrete [`Backend`]
/// strategy this process uses, matching `CreateBackend<BackendT>`'s
/// per-call type parameter in §4.7 with a type parameter on the manager
/// itself (one manager per backend kind in a given process; §1 scopes a
/// single node, and nothing in the spec requires mixing backend kinds
/// within one manager instance).
pub struct MemoryManager<B: Backend> {
    backends: BackendRegistry<B>,
    allocators: Mutex<HashMap<AllocatorId, Arc<AnyAllocator>>>,
    /// Remembers which URL backs a given allocator id, so
    /// `unregister_allocator` can tell whether its backend is now free of
    /// references without the caller having to track that itself.
    allocator_urls: Mutex<HashMap<AllocatorId, String>>,
}

impl<B: Backend> Default for MemoryManager<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> MemoryManager<B> {
    pub fn new() -> Self {
        shmx_log::init_verbosity();
        Self {
            backends: BackendRegistry::new(),
            allocators: Mutex::new(HashMap::new()),
            allocator_urls: Mutex::new(HashMap::new()),
        }
    }

    /// `CreateBackend<BackendT>(size, url)` (§4.7): constructs a backend and
    /// registers it. Must happen before `create_*_allocator` targets the
    /// same URL.
    pub fn create_backend(&self, url: &str, size: usize) -> Result<Arc<B>, CreateBackendError> {
        Ok(self.backends.create(url, size)?)
    }

    /// `AttachBackend(kind, url)` (§4.7): finds or maps an existing backend
    /// and registers it. Idempotent per process.
    pub fn attach_backend(&self, url: &str, min_size: usize) -> Result<Arc<B>, AttachBackendError> {
        Ok(self.backends.attach(url, min_size)?)
    }

    fn register_allocator(
        &self,
        id: AllocatorId,
        url: &str,
        allocator: AnyAllocator,
    ) -> Result<Arc<AnyAllocator>, CreateAllocatorError> {
        let mut allocators = self.allocators.lock().unwrap();
        if allocators.contains_key(&id) {
            return Err(CreateAllocatorError::AllocatorExists);
        }
        let allocator = Arc::new(allocator);
        allocators.insert(id, Arc::clone(&allocator));
        self.allocator_urls
            .lock()
            .unwrap()
            .insert(id, url.to_string());
        Ok(allocator)
    }

    /// `CreateAllocator<StackAllocator>(url, id, custom_header_size)`
    /// (§4.7): locates the backend already created at `url`, initialises a
    /// [`StackAllocator`] at its head, and registers it by `id`.
    pub fn create_stack_allocator(
        &self,
        url: &str,
        id: AllocatorId,
        custom_header_size: usize,
    ) -> Result<Arc<AnyAllocator>, CreateAllocatorError> {
        let msg = "Unable to create stack allocator";
        let backend = self
            .backends
            .get(url)
            .ok_or(CreateAllocatorError::BackendNotFound)?;
        if self.allocators.lock().unwrap().contains_key(&id) {
            fail!(with CreateAllocatorError::AllocatorExists,
                "{} with id {} since it is already registered.", msg, id);
        }
        let allocator =
            unsafe { StackAllocator::init(backend.base(), backend.size(), id, custom_header_size, ()) }?;
        self.register_allocator(id, url, AnyAllocator::Stack(allocator))
    }

    /// `CreateAllocator<ScalablePageAllocator>(url, id, custom_header_size)`
    /// (§4.7), with the size-class/thread-cache [`shmx_allocator::ScalablePageConfig`].
    pub fn create_scalable_allocator(
        &self,
        url: &str,
        id: AllocatorId,
        custom_header_size: usize,
        config: shmx_allocator::ScalablePageConfig,
    ) -> Result<Arc<AnyAllocator>, CreateAllocatorError> {
        let msg = "Unable to create scalable page allocator";
        let backend = self
            .backends
            .get(url)
            .ok_or(CreateAllocatorError::BackendNotFound)?;
        if self.allocators.lock().unwrap().contains_key(&id) {
            fail!(with CreateAllocatorError::AllocatorExists,
                "{} with id {} since it is already registered.", msg, id);
        }
        let allocator = unsafe {
            ScalablePageAllocator::init(backend.base(), backend.size(), id, custom_header_size, config)
        }?;
        self.register_allocator(id, url, AnyAllocator::ScalablePage(allocator))
    }

    /// Reconstructs the allocator already living at the head of the backend
    /// attached under `url`, per §2's data flow ("asks the Manager to
    /// reconstruct the allocator from a small self-describing header").
    /// The allocator's own id (read from the header) is used as the
    /// registry key, not a caller-supplied one.
    pub fn attach_allocator(&self, url: &str) -> Result<Arc<AnyAllocator>, AttachAllocatorError> {
        let backend = self
            .backends
            .get(url)
            .ok_or(AttachAllocatorError::BackendNotFound)?;

        let kind = unsafe { peek_kind(backend.base().as_ptr()) }
            .ok_or(AttachAllocatorError::UnknownKind)?;

        let allocator = match kind {
            AllocatorKind::Stack => {
                let a = unsafe { StackAllocator::attach(backend.base(), backend.size())? };
                let id = a.id();
                AnyAllocator::Stack(a).with_registered(self, id, url)
            }
            AllocatorKind::ScalablePage => {
                let a = unsafe { ScalablePageAllocator::attach(backend.base(), backend.size())? };
                let id = a.id();
                AnyAllocator::ScalablePage(a).with_registered(self, id, url)
            }
        };
        Ok(allocator)
    }

    /// `GetAllocator(id)` (§4.7): lookup only, never attaches. §4.7: "if
    /// `GetAllocator` is called before attach, it fails with
    /// `AllocatorUnknown`".
    pub fn get_allocator(&self, id: AllocatorId) -> Result<Arc<AnyAllocator>, AllocatorUnknown> {
        self.allocators.lock().unwrap().get(&id).cloned().ok_or(AllocatorUnknown)
    }

    /// `UnregisterAllocator(id)` (§4.7): idempotent teardown used by tests.
    /// Returns the backend's URL if this was the allocator's last
    /// reference in the registry.
    pub fn unregister_allocator(&self, id: AllocatorId) -> Option<String> {
        self.allocators.lock().unwrap().remove(&id);
        self.allocator_urls.lock().unwrap().remove(&id)
    }

    /// `UnregisterBackend(url)` (§4.7): idempotent teardown used by tests.
    /// Does not fail if nothing is registered under `url`.
    pub fn unregister_backend(&self, url: &str) {
        let _ = self.backends.remove(url);
    }

    pub fn backend(&self, url: &str) -> Option<Arc<B>> {
        self.backends.get(url)
    }
}

trait RegisterInto<B: Backend> {
    fn with_registered(self, manager: &MemoryManager<B>, id: AllocatorId, url: &str) -> Arc<AnyAllocator>;
}

impl<B: Backend> RegisterInto<B> for AnyAllocator {
    fn with_registered(self, manager: &MemoryManager<B>, id: AllocatorId, url: &str) -> Arc<AnyAllocator> {
        let mut allocators = manager.allocators.lock().unwrap();
        if let Some(existing) = allocators.get(&id) {
            return Arc::clone(existing);
        }
        let allocator = Arc::new(self);
        allocators.insert(id, Arc::clone(&allocator));
        manager
            .allocator_urls
            .lock()
            .unwrap()
            .insert(id, url.to_string());
        allocator
    }
}

/// [`shmx_pointer::BaseAddressResolver`] over a manager's
/// allocator registry: the one fact §4.1's translation contract needs from
/// the rest of the system.
impl<B: Backend> shmx_pointer::BaseAddressResolver for MemoryManager<B> {
    fn base_address(&self, id: AllocatorId) -> Option<core::ptr::NonNull<u8>> {
        let allocator = self.allocators.lock().unwrap().get(&id)?.clone();
        let base = unsafe { allocator.convert::<u8>(shmx_pointer::OffsetPointer::new(0)) };
        core::ptr::NonNull::new(base)
    }
}
