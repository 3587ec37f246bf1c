// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal process-local allocation traits. These operate on already-mapped
//! bytes (`NonNull<[u8]>`) and know nothing about offsets, backends, or
//! cross-process addressing — that translation lives one layer up, in
//! `shmx-allocator`. Kept separate so [`RelocatableContainer`] can be
//! defined generically without depending on the rest of the allocator
//! stack, mirroring how `iceoryx2-bb-elementary-traits` keeps its
//! `BaseAllocator`/`Allocator` traits free of any shared-memory specifics.

use core::alloc::Layout;
use core::fmt::Debug;
use core::ptr::NonNull;

/// Failure of a plain allocation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AllocationError {
    OutOfMemory,
    SizeTooLarge,
    SizeAlignmentFailure,
}

/// Failure of an in-place growth.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AllocationGrowError {
    OutOfMemory,
    SizeTooLarge,
    SizeAlignmentFailure,
    GrowSmallerThanOldSize,
}

/// Failure of an in-place shrink.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AllocationShrinkError {
    SizeTooLarge,
    SizeAlignmentFailure,
    ShrinkGreaterThanOldSize,
}

/// The plain allocate/deallocate contract every local sub-allocator honours.
pub trait BaseAllocator {
    /// Allocates a region satisfying `layout`. Contents are uninitialised.
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocationError>;

    /// Allocates a region satisfying `layout`, zeroed.
    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocationError> {
        let mem = self.allocate(layout)?;
        unsafe { (mem.as_ptr() as *mut u8).write_bytes(0, mem.len()) };
        Ok(mem)
    }

    /// Releases a region previously returned by `allocate`/`allocate_zeroed`.
    ///
    /// # Safety
    ///
    /// `ptr` and `layout` must match a prior, not-yet-released allocation.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// Extends [`BaseAllocator`] with in-place resizing.
pub trait Allocator: BaseAllocator {
    /// Grows a previously allocated region in place or by relocation.
    ///
    /// # Safety
    ///
    /// `ptr`/`old_layout` must match a prior allocation; `new_layout.size()`
    /// must be `>= old_layout.size()`.
    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<[u8]>, AllocationGrowError>;

    /// As [`Allocator::grow`] but the grown tail is zeroed.
    ///
    /// # Safety
    ///
    /// Same preconditions as [`Allocator::grow`].
    unsafe fn grow_zeroed(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<[u8]>, AllocationGrowError> {
        let mem = self.grow(ptr, old_layout, new_layout)?;
        let tail = (mem.as_ptr() as *mut u8).add(old_layout.size());
        tail.write_bytes(0, mem.len() - old_layout.size());
        Ok(mem)
    }

    /// Shrinks a previously allocated region in place or by relocation.
    ///
    /// # Safety
    ///
    /// `ptr`/`old_layout` must match a prior allocation; `new_layout.size()`
    /// must be `<= old_layout.size()`.
    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<[u8]>, AllocationShrinkError>;
}

/// A marker for types whose origin (allocator, backend, ...) is useful to
/// include in log messages without requiring a full `Display` impl.
pub trait Origin: Debug {}
impl<T: Debug> Origin for T {}
