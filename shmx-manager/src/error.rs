// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle errors for the Memory Manager (§4.7, component C7, §7).

use core::fmt;

use shmx_allocator::{AllocatorAttachError, AllocatorInitError};
use shmx_backend::{BackendAttachError, BackendCreateError};

/// Failure of [`crate::MemoryManager::create_stack_allocator`] /
/// `create_scalable_allocator`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CreateAllocatorError {
    /// No backend is registered under this URL in this process; §4.7
    /// construction order requires `CreateBackend` before `CreateAllocator`.
    BackendNotFound,
    /// An allocator with this id is already registered in this process.
    AllocatorExists,
    /// The chosen strategy's own `init` failed (insufficient space, or the
    /// window already carries a valid header).
    Init(AllocatorInitError),
}

impl fmt::Display for CreateAllocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackendNotFound => write!(f, "no backend is registered under that URL"),
            Self::AllocatorExists => write!(f, "an allocator with that id is already registered"),
            Self::Init(e) => write!(f, "allocator initialisation failed: {e}"),
        }
    }
}

impl std::error::Error for CreateAllocatorError {}

impl From<AllocatorInitError> for CreateAllocatorError {
    fn from(e: AllocatorInitError) -> Self {
        Self::Init(e)
    }
}

/// Failure of [`crate::MemoryManager::attach_allocator`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AttachAllocatorError {
    /// No backend is registered under this URL in this process; §4.7
    /// requires `AttachBackend` before the allocator can be reconstructed.
    BackendNotFound,
    /// The window's header does not decode to a known [`shmx_allocator::AllocatorKind`].
    UnknownKind,
    /// The decoded strategy's own `attach` rejected the header.
    Attach(AllocatorAttachError),
}

impl fmt::Display for AttachAllocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackendNotFound => write!(f, "no backend is registered under that URL"),
            Self::UnknownKind => write!(f, "the allocator header's kind is not recognised"),
            Self::Attach(e) => write!(f, "allocator attach failed: {e}"),
        }
    }
}

impl std::error::Error for AttachAllocatorError {}

impl From<AllocatorAttachError> for AttachAllocatorError {
    fn from(e: AllocatorAttachError) -> Self {
        Self::Attach(e)
    }
}

/// Failure of [`crate::MemoryManager::get_allocator`]. §4.7: "if
/// `GetAllocator` is called before attach, it fails with `AllocatorUnknown`".
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct AllocatorUnknown;

impl fmt::Display for AllocatorUnknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no allocator with that id is known to this process")
    }
}

impl std::error::Error for AllocatorUnknown {}

/// Combines [`BackendCreateError`]/[`BackendAttachError`] with the manager's
/// own layer for `create_backend`/`attach_backend` convenience wrappers that
/// also populate the allocator registry in one call.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CreateBackendError {
    Backend(BackendCreateError),
}

impl fmt::Display for CreateBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CreateBackendError {}

impl From<BackendCreateError> for CreateBackendError {
    fn from(e: BackendCreateError) -> Self {
        Self::Backend(e)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AttachBackendError {
    Backend(BackendAttachError),
}

impl fmt::Display for AttachBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AttachBackendError {}

impl From<BackendAttachError> for AttachBackendError {
    fn from(e: BackendAttachError) -> Self {
        Self::Backend(e)
    }
}
