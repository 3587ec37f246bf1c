// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The Allocator Interface (§4.4, component C4) and its two concrete
//! strategies: the Stack Allocator (§4.5, C5) and the Scalable Page
//! Allocator (§4.6, C6).
//!
//! An allocator is handed a raw window (the [`shmx_backend::Backend`]
//! payload, or a sub-range of it) by the Memory Manager (§4.7) and places
//! its own header at the window's offset 0, per §6. Every offset an
//! allocator returns is relative to the *window base*, so a
//! [`shmx_pointer::OffsetPointer`] produced by one allocator is
//! meaningless to another — exactly the ambiguity [`shmx_pointer::Pointer`]
//! resolves one layer up by pairing it with an [`shmx_pointer::AllocatorId`].

pub mod error;
pub mod header;
pub mod kind;
pub mod ops;
pub mod scalable;
pub mod stack;

pub use error::{AllocationError, AllocatorAttachError, AllocatorInitError};
pub use header::{AllocatorHeader, peek_kind};
pub use kind::AllocatorKind;
pub use ops::AllocatorOps;
pub use scalable::{Config as ScalablePageConfig, ScalablePageAllocator};
pub use stack::StackAllocator;

use core::fmt::Debug;
use core::ptr::NonNull;

use shmx_pointer::{AllocatorId, OffsetPointer};

/// The offset every allocator reserves for zero-size allocations (§11,
/// "Zero-size allocation sentinel"). Offset 0 is always the start of the
/// allocator's own header, so it can never collide with a real
/// allocation's offset; `free` on it is defined to be a no-op.
pub const ZERO_SIZE_SENTINEL: OffsetPointer = OffsetPointer::new(0);

/// Honoured by every allocator strategy (§4.4).
pub trait ShmxAllocator: Sized + Debug + Send + Sync {
    /// Per-strategy construction parameters (size-class schedule, thread
    /// cache depth, ...), carried as an associated type the way
    /// `iceoryx2-cal`'s `ShmAllocator` trait carries a `Configuration`.
    type Config: Default + Clone + Debug;

    /// Initialises a fresh allocator at the head of `window`. Creator only.
    ///
    /// # Safety
    ///
    /// `window` must point to `window_size` bytes exclusively owned by the
    /// caller for the allocator's lifetime; no other allocator may overlap
    /// this range.
    unsafe fn init(
        window: NonNull<u8>,
        window_size: usize,
        id: AllocatorId,
        custom_header_size: usize,
        config: Self::Config,
    ) -> Result<Self, AllocatorInitError>;

    /// Attaches to an allocator already initialised by another process.
    ///
    /// # Safety
    ///
    /// `window`/`window_size` must describe the same range passed to the
    /// original [`ShmxAllocator::init`] call.
    unsafe fn attach(window: NonNull<u8>, window_size: usize) -> Result<Self, AllocatorAttachError>;

    fn id(&self) -> AllocatorId;

    /// Allocates `size` bytes at the allocator's default alignment.
    fn allocate(&self, size: usize) -> Result<OffsetPointer, AllocationError>;

    /// Allocates `size` bytes aligned to `align`, which must be a power of
    /// two.
    fn aligned_allocate(&self, size: usize, align: usize) -> Result<OffsetPointer, AllocationError>;

    /// Resizes a previous allocation, preserving `min(old_size, new_size)`
    /// bytes of content. `old_size` must match the size most recently
    /// requested for `p` (the allocator has no independent record of it).
    fn reallocate(
        &self,
        p: OffsetPointer,
        old_size: usize,
        new_size: usize,
    ) -> Result<OffsetPointer, AllocationError>;

    /// Releases `p`. `p` must have been returned by this allocator and not
    /// yet freed; violating this is a fatal misuse error (§7) and aborts
    /// the process rather than returning `Err`.
    fn free(&self, p: OffsetPointer);

    /// Bytes currently outstanding (allocated but not yet freed).
    fn currently_allocated(&self) -> usize;

    /// The caller-reserved custom header area, `custom_header_size` bytes
    /// as requested at `init`.
    fn custom_header(&self) -> NonNull<u8>;

    /// Resolves an in-window offset to a process-local pointer.
    ///
    /// # Safety
    ///
    /// `p` must be a valid, currently-allocated offset from this allocator
    /// (or null).
    unsafe fn convert<T>(&self, p: OffsetPointer) -> *mut T;

    /// The inverse of [`ShmxAllocator::convert`]: encodes a process-local
    /// pointer known to lie within this allocator's window.
    fn encode<T>(&self, ptr: *const T) -> OffsetPointer;

    /// True iff `ptr` falls within this allocator's window.
    fn contains(&self, ptr: *const u8) -> bool;
}
