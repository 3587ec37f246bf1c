// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`AllocatorOps`] — the object-safe subset of [`crate::ShmxAllocator`]
//! that callers need *after* construction (allocate/free/convert/encode/
//! custom-header/bookkeeping). [`crate::ShmxAllocator::init`]/`attach` carry
//! a per-strategy associated `Config` type and so cannot be part of a trait
//! object; everything downstream of construction can be, which is what the
//! Container Base Protocol (`shmx-container`, component C8) and the MPSC
//! queue (`shmx-queue`, component C9) are written against so they work
//! uniformly over `StackAllocator`, `ScalablePageAllocator`, or the Memory
//! Manager's `AnyAllocator` without a generic type parameter threaded
//! through every container.

use core::fmt::Debug;
use core::ptr::NonNull;

use shmx_pointer::{AllocatorId, OffsetPointer};

use crate::error::AllocationError;
use crate::ShmxAllocator;

/// Object-safe allocator surface; see the module documentation.
pub trait AllocatorOps: Debug + Send + Sync {
    fn id(&self) -> AllocatorId;
    fn allocate(&self, size: usize) -> Result<OffsetPointer, AllocationError>;
    fn aligned_allocate(&self, size: usize, align: usize) -> Result<OffsetPointer, AllocationError>;
    fn reallocate(
        &self,
        p: OffsetPointer,
        old_size: usize,
        new_size: usize,
    ) -> Result<OffsetPointer, AllocationError>;
    fn free(&self, p: OffsetPointer);
    fn currently_allocated(&self) -> usize;
    fn custom_header(&self) -> NonNull<u8>;

    /// # Safety
    /// `p` must be a valid, currently-allocated offset from this allocator
    /// (or null). Callers cast the returned pointer to the type they know
    /// belongs there; the trait itself has no type information.
    unsafe fn convert_raw(&self, p: OffsetPointer) -> *mut u8;

    fn encode_raw(&self, ptr: *const u8) -> OffsetPointer;
    fn contains(&self, ptr: *const u8) -> bool;
}

impl<T: ShmxAllocator> AllocatorOps for T {
    fn id(&self) -> AllocatorId {
        ShmxAllocator::id(self)
    }

    fn allocate(&self, size: usize) -> Result<OffsetPointer, AllocationError> {
        ShmxAllocator::allocate(self, size)
    }

    fn aligned_allocate(&self, size: usize, align: usize) -> Result<OffsetPointer, AllocationError> {
        ShmxAllocator::aligned_allocate(self, size, align)
    }

    fn reallocate(
        &self,
        p: OffsetPointer,
        old_size: usize,
        new_size: usize,
    ) -> Result<OffsetPointer, AllocationError> {
        ShmxAllocator::reallocate(self, p, old_size, new_size)
    }

    fn free(&self, p: OffsetPointer) {
        ShmxAllocator::free(self, p)
    }

    fn currently_allocated(&self) -> usize {
        ShmxAllocator::currently_allocated(self)
    }

    fn custom_header(&self) -> NonNull<u8> {
        ShmxAllocator::custom_header(self)
    }

    unsafe fn convert_raw(&self, p: OffsetPointer) -> *mut u8 {
        ShmxAllocator::convert::<u8>(self, p)
    }

    fn encode_raw(&self, ptr: *const u8) -> OffsetPointer {
        ShmxAllocator::encode(self, ptr)
    }

    fn contains(&self, ptr: *const u8) -> bool {
        ShmxAllocator::contains(self, ptr)
    }
}
