// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The Memory Backend layer (§4.2, component C2) and the process-local
//! Backend Registry (§4.3, component C3).
//!
//! A [`Backend`] is a named, fixed-size byte window `[base, base + size)`
//! addressable in the current process. `size` is set at creation and never
//! changes; `base` is process-local and may differ per attacher. The
//! backend places nothing in the window beyond its own header (§4.2,
//! "does NOT place any data beyond its own header"); everything else is
//! the allocator's to own.

mod anonymous;
mod error;
mod header;
mod posix;
mod registry;

pub use anonymous::AnonymousSharedMemory;
pub use error::{BackendAttachError, BackendCreateError, BackendDestroyError};
pub use header::{BackendHeader, BackendKind, MAGIC};
pub use posix::PosixSharedMemory;
pub use registry::BackendRegistry;

use core::fmt::Debug;
use core::ptr::NonNull;

/// Honoured by every backend variant (§4.2).
pub trait Backend: Sized + Debug + Send + Sync {
    /// Creates a new backend of `size` payload bytes under `url`. Fails
    /// with [`BackendCreateError::BackendExists`] if `url` is already
    /// taken.
    fn create(url: &str, size: usize) -> Result<Self, BackendCreateError>;

    /// Attaches the backend already created under `url` by another
    /// process. `min_size` is the smallest payload size the caller is
    /// willing to accept; pass `0` to accept whatever is there. Fails with
    /// [`BackendAttachError::BackendTooSmall`] if the existing backend's
    /// payload is smaller than `min_size`.
    fn attach(url: &str, min_size: usize) -> Result<Self, BackendAttachError>;

    /// The local base address of the payload window (after the backend's
    /// own header).
    fn base(&self) -> NonNull<u8>;

    /// The payload size in bytes, excluding the backend header. Identical
    /// across every attacher of the same backend.
    fn size(&self) -> usize;

    /// The URL this backend was created or attached under.
    fn url(&self) -> &str;

    /// True for the process that created this backend, false for every
    /// attacher.
    fn is_owner(&self) -> bool;

    /// Unmaps the window from this process. Every participant, owner or
    /// not, must call this (or let the value drop, which does the same)
    /// exactly once.
    fn detach(self) {
        drop(self);
    }

    /// Unlinks the named OS object so no further `attach` can succeed,
    /// then detaches. Only the creator may call this; non-owners get
    /// [`BackendDestroyError::NotOwner`] back without side effects
    /// (mirrors §3's "destroyed exactly when the last attacher releases it
    /// AND the creator has marked it for removal" — marking for removal is
    /// this call, the actual release happens as attachers drop their own
    /// mappings).
    fn destroy(self) -> Result<(), BackendDestroyError>;
}
