// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `LocalPtr<T>` / `RemoteSlice` / `LocalSlice<T>` — supplemented from
//! `hermes_shm::ipc::LPointer<T>` / `Array<PointerT>` / `LArray<T, PointerT>`
//! (`original_source/include/hermes_shm/memory/memory.h`, §11 of
//! SPEC_FULL.md). These pair a process-local address with the
//! process-independent handle that produced it, so a caller who just
//! allocated or resolved something doesn't have to re-resolve it to get a
//! usable pointer.

use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::offset::OffsetPointer;
use crate::pointer::Pointer;

/// A process-local pointer paired with the [`Pointer`] that resolves to it,
/// mirroring `hermes_shm::ipc::LPointer<T>`.
#[derive(Clone, Copy)]
pub struct LocalPtr<T> {
    pub local: NonNull<T>,
    pub remote: Pointer,
}

impl<T> LocalPtr<T> {
    #[inline]
    pub const fn new(local: NonNull<T>, remote: Pointer) -> Self {
        Self { local, remote }
    }

    /// # Safety
    /// `self.local` must point to a live, initialised `T` for the duration
    /// of the borrow.
    #[inline]
    pub unsafe fn as_ref(&self) -> &T {
        unsafe { self.local.as_ref() }
    }

    /// # Safety
    /// Same as [`LocalPtr::as_ref`], plus exclusive access for the
    /// duration of the borrow.
    #[inline]
    pub unsafe fn as_mut(&mut self) -> &mut T {
        unsafe { self.local.as_mut() }
    }
}

impl<T> core::fmt::Debug for LocalPtr<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "LocalPtr {{ remote: {:?} }}", self.remote)
    }
}

/// A process-independent pointer together with an element count, mirroring
/// `hermes_shm::ipc::Array<PointerT>`. Used by containers that hand out a
/// contiguous run of elements (the Scalable Page Allocator's large-block
/// path, the MPSC queue's backing array) as a single handle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RemoteSlice {
    pub base: Pointer,
    pub len: usize,
}

impl RemoteSlice {
    #[inline]
    pub const fn new(base: Pointer, len: usize) -> Self {
        Self { base, len }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The [`Pointer`] of the element at `index`, computed by element size
    /// `elem_size` (the allocator has no type information to derive this
    /// itself).
    #[inline]
    pub fn element(&self, index: usize, elem_size: usize) -> Pointer {
        debug_assert!(index < self.len);
        self.base.offset_by((index * elem_size) as i64)
    }
}

/// [`RemoteSlice`] paired with a resolved local base address, mirroring
/// `hermes_shm::ipc::LArray<T, PointerT>`.
pub struct LocalSlice<T> {
    pub local_base: NonNull<T>,
    pub remote: RemoteSlice,
    _marker: PhantomData<T>,
}

impl<T> LocalSlice<T> {
    #[inline]
    pub const fn new(local_base: NonNull<T>, remote: RemoteSlice) -> Self {
        Self {
            local_base,
            remote,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.remote.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remote.is_empty()
    }

    /// # Safety
    /// `index` must be `< len()` and the backing storage must still be
    /// live and initialised at that slot.
    #[inline]
    pub unsafe fn get(&self, index: usize) -> &T {
        debug_assert!(index < self.len());
        unsafe { &*self.local_base.as_ptr().add(index) }
    }

    /// # Safety
    /// Same as [`LocalSlice::get`], plus exclusive access.
    #[inline]
    pub unsafe fn get_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len());
        unsafe { &mut *self.local_base.as_ptr().add(index) }
    }
}

impl<T> Clone for LocalSlice<T> {
    fn clone(&self) -> Self {
        Self {
            local_base: self.local_base,
            remote: self.remote,
            _marker: PhantomData,
        }
    }
}
impl<T> Copy for LocalSlice<T> {}

impl<T> core::fmt::Debug for LocalSlice<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "LocalSlice {{ remote: {:?} }}", self.remote)
    }
}

/// A type-tagged [`OffsetPointer`], carrying element-type information only
/// at the type level; representation is identical to the untyped offset
/// (§4.1 "Typed aliases").
#[derive(Eq, PartialEq, Hash)]
pub struct TypedOffsetPointer<T> {
    pub raw: OffsetPointer,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedOffsetPointer<T> {
    pub const NULL: TypedOffsetPointer<T> = TypedOffsetPointer {
        raw: OffsetPointer::NULL,
        _marker: PhantomData,
    };

    #[inline]
    pub const fn new(raw: OffsetPointer) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.raw.is_null()
    }
}

impl<T> Clone for TypedOffsetPointer<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for TypedOffsetPointer<T> {}

impl<T> core::fmt::Debug for TypedOffsetPointer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "TypedOffsetPointer({:?})", self.raw)
    }
}

/// A type-tagged [`Pointer`]; see [`TypedOffsetPointer`].
#[derive(Eq, PartialEq, Hash)]
pub struct TypedPointer<T> {
    pub raw: Pointer,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedPointer<T> {
    pub const NULL: TypedPointer<T> = TypedPointer {
        raw: Pointer::NULL,
        _marker: PhantomData,
    };

    #[inline]
    pub const fn new(raw: Pointer) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.raw.is_null()
    }
}

impl<T> Clone for TypedPointer<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for TypedPointer<T> {}

impl<T> core::fmt::Debug for TypedPointer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "TypedPointer({:?})", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator_id::AllocatorId;

    #[test]
    fn remote_slice_element_offsets() {
        let base = Pointer::new(AllocatorId::new(1, 0), OffsetPointer::new(100));
        let slice = RemoteSlice::new(base, 4);
        assert_eq!(slice.element(0, 8).offset.value(), 100);
        assert_eq!(slice.element(2, 8).offset.value(), 116);
    }

    #[test]
    fn typed_pointer_null_matches_untyped() {
        let p: TypedPointer<u32> = TypedPointer::NULL;
        assert!(p.is_null());
    }
}
