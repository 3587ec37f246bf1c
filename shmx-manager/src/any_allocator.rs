// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `AnyAllocator` — a closed, tagged union of the two `ShmxAllocator`
//! strategies this repo implements. `shmx_allocator::ShmxAllocator` cannot
//! be used as a trait object (it carries an associated `Config` type with a
//! different shape per strategy), so the Memory Manager's registry holds
//! this enum instead, mirroring §9's "Dynamic dispatch over allocators —
//! replaced by a tagged variant ... avoid open-ended inheritance".

use core::ptr::NonNull;

use shmx_allocator::{
    AllocationError, AllocatorKind, ScalablePageAllocator, ShmxAllocator, StackAllocator,
};
use shmx_pointer::{AllocatorId, OffsetPointer};

/// A live allocator of either strategy, reachable by the one set of
/// non-generic operations §4.4 actually requires callers to use after
/// construction.
#[derive(Debug)]
pub enum AnyAllocator {
    Stack(StackAllocator),
    ScalablePage(ScalablePageAllocator),
}

impl AnyAllocator {
    pub fn kind(&self) -> AllocatorKind {
        match self {
            Self::Stack(_) => AllocatorKind::Stack,
            Self::ScalablePage(_) => AllocatorKind::ScalablePage,
        }
    }

    pub fn id(&self) -> AllocatorId {
        match self {
            Self::Stack(a) => a.id(),
            Self::ScalablePage(a) => a.id(),
        }
    }

    pub fn allocate(&self, size: usize) -> Result<OffsetPointer, AllocationError> {
        match self {
            Self::Stack(a) => a.allocate(size),
            Self::ScalablePage(a) => a.allocate(size),
        }
    }

    pub fn aligned_allocate(
        &self,
        size: usize,
        align: usize,
    ) -> Result<OffsetPointer, AllocationError> {
        match self {
            Self::Stack(a) => a.aligned_allocate(size, align),
            Self::ScalablePage(a) => a.aligned_allocate(size, align),
        }
    }

    pub fn reallocate(
        &self,
        p: OffsetPointer,
        old_size: usize,
        new_size: usize,
    ) -> Result<OffsetPointer, AllocationError> {
        match self {
            Self::Stack(a) => a.reallocate(p, old_size, new_size),
            Self::ScalablePage(a) => a.reallocate(p, old_size, new_size),
        }
    }

    pub fn free(&self, p: OffsetPointer) {
        match self {
            Self::Stack(a) => a.free(p),
            Self::ScalablePage(a) => a.free(p),
        }
    }

    pub fn currently_allocated(&self) -> usize {
        match self {
            Self::Stack(a) => a.currently_allocated(),
            Self::ScalablePage(a) => a.currently_allocated(),
        }
    }

    pub fn custom_header(&self) -> NonNull<u8> {
        match self {
            Self::Stack(a) => a.custom_header(),
            Self::ScalablePage(a) => a.custom_header(),
        }
    }

    /// # Safety
    /// `p` must be a valid, currently-allocated offset from this allocator
    /// (or null).
    pub unsafe fn convert<T>(&self, p: OffsetPointer) -> *mut T {
        match self {
            Self::Stack(a) => a.convert(p),
            Self::ScalablePage(a) => a.convert(p),
        }
    }

    pub fn encode<T>(&self, ptr: *const T) -> OffsetPointer {
        match self {
            Self::Stack(a) => a.encode(ptr),
            Self::ScalablePage(a) => a.encode(ptr),
        }
    }

    pub fn contains(&self, ptr: *const u8) -> bool {
        match self {
            Self::Stack(a) => a.contains(ptr),
            Self::ScalablePage(a) => a.contains(ptr),
        }
    }
}

unsafe impl Send for AnyAllocator {}
unsafe impl Sync for AnyAllocator {}

/// Lets `AnyAllocator` stand in anywhere the Container Base Protocol
/// (`shmx-container`) or the MPSC queue (`shmx-queue`) expect a
/// [`shmx_allocator::AllocatorOps`] trait object, without those crates
/// depending on `shmx-manager`.
impl shmx_allocator::AllocatorOps for AnyAllocator {
    fn id(&self) -> AllocatorId {
        AnyAllocator::id(self)
    }

    fn allocate(&self, size: usize) -> Result<OffsetPointer, AllocationError> {
        AnyAllocator::allocate(self, size)
    }

    fn aligned_allocate(&self, size: usize, align: usize) -> Result<OffsetPointer, AllocationError> {
        AnyAllocator::aligned_allocate(self, size, align)
    }

    fn reallocate(
        &self,
        p: OffsetPointer,
        old_size: usize,
        new_size: usize,
    ) -> Result<OffsetPointer, AllocationError> {
        AnyAllocator::reallocate(self, p, old_size, new_size)
    }

    fn free(&self, p: OffsetPointer) {
        AnyAllocator::free(self, p)
    }

    fn currently_allocated(&self) -> usize {
        AnyAllocator::currently_allocated(self)
    }

    fn custom_header(&self) -> NonNull<u8> {
        AnyAllocator::custom_header(self)
    }

    unsafe fn convert_raw(&self, p: OffsetPointer) -> *mut u8 {
        AnyAllocator::convert::<u8>(self, p)
    }

    fn encode_raw(&self, ptr: *const u8) -> OffsetPointer {
        AnyAllocator::encode(self, ptr)
    }

    fn contains(&self, ptr: *const u8) -> bool {
        AnyAllocator::contains(self, ptr)
    }
}
