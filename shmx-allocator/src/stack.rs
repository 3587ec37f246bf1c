// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The Stack Allocator (§4.5, component C5): a plain bump pointer. Grounded
//! on `iceoryx2-bb-memory::bump_allocator::BumpAllocator`, adapted from a
//! process-local `usize` cursor to an in-window `AtomicOffsetPointer` so
//! every attacher's bump cursor is the same shared counter.
//!
//! `free` is a no-op: nothing is reclaimed until the whole backend is torn
//! down. Intended for scratch regions allocated once and discarded as a
//! unit, not for long-lived data structures (use [`crate::ScalablePageAllocator`]
//! for those).

use core::fmt;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicU32, Ordering};

use shmx_elementary::align_up;
use shmx_log::fatal_panic;
use shmx_pointer::{AllocatorId, AtomicOffsetPointer, OffsetPointer};

use crate::error::{AllocatorAttachError, AllocatorInitError, AllocationError};
use crate::header::AllocatorHeader;
use crate::kind::AllocatorKind;
use crate::ZERO_SIZE_SENTINEL;

const DEFAULT_ALIGN: usize = 8;
/// Bytes reserved before the custom header: the common [`AllocatorHeader`]
/// prefix, a readiness flag, and the bump cursor itself.
const TAIL_SIZE: usize = super::header::WIRE_SIZE + 4 + 4 + 8;

const READY: u32 = 0xA11C_u32;

#[repr(C)]
struct Layout {
    header: [u8; super::header::WIRE_SIZE],
    ready: AtomicU32,
    _pad: u32,
    region_off: AtomicOffsetPointer,
}

/// The bump-pointer allocator (§4.5).
pub struct StackAllocator {
    window: NonNull<u8>,
    window_size: usize,
    id: AllocatorId,
    custom_header_offset: usize,
    region_start: usize,
}

unsafe impl Send for StackAllocator {}
unsafe impl Sync for StackAllocator {}

impl fmt::Debug for StackAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackAllocator")
            .field("id", &self.id)
            .field("window_size", &self.window_size)
            .field("currently_allocated", &self.currently_allocated())
            .finish()
    }
}

impl StackAllocator {
    fn layout(&self) -> &Layout {
        unsafe { &*(self.window.as_ptr() as *const Layout) }
    }
}

impl crate::ShmxAllocator for StackAllocator {
    type Config = ();

    unsafe fn init(
        window: NonNull<u8>,
        window_size: usize,
        id: AllocatorId,
        custom_header_size: usize,
        _config: Self::Config,
    ) -> Result<Self, AllocatorInitError> {
        let layout = &*(window.as_ptr() as *const Layout);
        if layout.ready.load(Ordering::Acquire) == READY {
            return Err(AllocatorInitError::AllocatorExists);
        }

        let region_start = align_up(TAIL_SIZE + custom_header_size, DEFAULT_ALIGN);
        if region_start > window_size {
            return Err(AllocatorInitError::InsufficientSpace);
        }

        let header = AllocatorHeader::new(
            AllocatorKind::Stack,
            id,
            TAIL_SIZE as u64,
            custom_header_size as u64,
        );
        core::ptr::copy_nonoverlapping(
            header.to_bytes().as_ptr(),
            window.as_ptr(),
            super::header::WIRE_SIZE,
        );

        let layout = &*(window.as_ptr() as *const Layout);
        layout
            .region_off
            .store(OffsetPointer::new(region_start as u64), Ordering::Relaxed);
        layout.ready.store(READY, Ordering::Release);

        Ok(Self {
            window,
            window_size,
            id,
            custom_header_offset: TAIL_SIZE,
            region_start,
        })
    }

    unsafe fn attach(window: NonNull<u8>, window_size: usize) -> Result<Self, AllocatorAttachError> {
        let layout = &*(window.as_ptr() as *const Layout);
        if layout.ready.load(Ordering::Acquire) != READY {
            return Err(AllocatorAttachError::AllocatorHeaderInvalid);
        }

        let header_bytes = core::slice::from_raw_parts(window.as_ptr(), super::header::WIRE_SIZE);
        let header = AllocatorHeader::from_bytes(header_bytes)
            .ok_or(AllocatorAttachError::AllocatorHeaderInvalid)?;
        if header.kind() != Some(AllocatorKind::Stack) {
            return Err(AllocatorAttachError::AllocatorHeaderInvalid);
        }

        let region_start = align_up(
            TAIL_SIZE + header.custom_header_size as usize,
            DEFAULT_ALIGN,
        );
        if region_start > window_size {
            return Err(AllocatorAttachError::AllocatorHeaderInvalid);
        }

        Ok(Self {
            window,
            window_size,
            id: header.allocator_id(),
            custom_header_offset: TAIL_SIZE,
            region_start,
        })
    }

    fn id(&self) -> AllocatorId {
        self.id
    }

    fn allocate(&self, size: usize) -> Result<OffsetPointer, AllocationError> {
        self.aligned_allocate(size, DEFAULT_ALIGN)
    }

    fn aligned_allocate(&self, size: usize, align: usize) -> Result<OffsetPointer, AllocationError> {
        if size == 0 {
            return Ok(ZERO_SIZE_SENTINEL);
        }
        if !align.is_power_of_two() {
            return Err(AllocationError::BadAlignment);
        }

        let region_off = &self.layout().region_off;
        let mut current = region_off.load(Ordering::Acquire);
        loop {
            let aligned = align_up(current.value() as usize, align);
            let end = match aligned.checked_add(size) {
                Some(end) => end,
                None => return Err(AllocationError::OutOfMemory),
            };
            if end > self.window_size {
                return Err(AllocationError::OutOfMemory);
            }
            match region_off.compare_exchange_weak(
                current,
                OffsetPointer::new(end as u64),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(OffsetPointer::new(aligned as u64)),
                Err(observed) => current = observed,
            }
        }
    }

    fn reallocate(
        &self,
        p: OffsetPointer,
        old_size: usize,
        new_size: usize,
    ) -> Result<OffsetPointer, AllocationError> {
        if new_size == 0 {
            self.free(p);
            return Ok(ZERO_SIZE_SENTINEL);
        }

        let new_p = self.allocate(new_size)?;
        if p != ZERO_SIZE_SENTINEL && old_size > 0 {
            let copy_len = old_size.min(new_size);
            unsafe {
                let src: *const u8 = self.convert(p);
                let dst: *mut u8 = self.convert(new_p);
                core::ptr::copy_nonoverlapping(src, dst, copy_len);
            }
        }
        self.free(p);
        Ok(new_p)
    }

    fn free(&self, p: OffsetPointer) {
        if p == ZERO_SIZE_SENTINEL {
            return;
        }
        if p.is_null() {
            fatal_panic!(from self, "free(null) is not permitted");
        }
        // No per-allocation bookkeeping: bytes are reclaimed only when the
        // whole backend is torn down.
    }

    fn currently_allocated(&self) -> usize {
        let off = self.layout().region_off.load(Ordering::Acquire).value() as usize;
        off.saturating_sub(self.region_start)
    }

    fn custom_header(&self) -> NonNull<u8> {
        unsafe { NonNull::new_unchecked(self.window.as_ptr().add(self.custom_header_offset)) }
    }

    unsafe fn convert<T>(&self, p: OffsetPointer) -> *mut T {
        if p.is_null() {
            return core::ptr::null_mut();
        }
        self.window.as_ptr().add(p.value() as usize) as *mut T
    }

    fn encode<T>(&self, ptr: *const T) -> OffsetPointer {
        if ptr.is_null() {
            return OffsetPointer::NULL;
        }
        let delta = ptr as usize - self.window.as_ptr() as usize;
        OffsetPointer::new(delta as u64)
    }

    fn contains(&self, ptr: *const u8) -> bool {
        let base = self.window.as_ptr() as usize;
        let p = ptr as usize;
        p >= base && p < base + self.window_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShmxAllocator;
    use std::alloc::{alloc_zeroed, dealloc, Layout as StdLayout};

    struct Window {
        ptr: *mut u8,
        layout: StdLayout,
    }

    impl Window {
        fn new(size: usize) -> Self {
            let layout = StdLayout::from_size_align(size, 64).unwrap();
            let ptr = unsafe { alloc_zeroed(layout) };
            Self { ptr, layout }
        }

        fn base(&self) -> NonNull<u8> {
            NonNull::new(self.ptr).unwrap()
        }
    }

    impl Drop for Window {
        fn drop(&mut self) {
            unsafe { dealloc(self.ptr, self.layout) };
        }
    }

    #[test]
    fn allocate_bumps_past_region_start() {
        let window = Window::new(4096);
        let allocator = unsafe {
            StackAllocator::init(window.base(), 4096, AllocatorId::new(1, 0), 0, ()).unwrap()
        };

        let a = allocator.allocate(100).unwrap();
        let b = allocator.allocate(50).unwrap();
        assert!(b.value() > a.value());
        assert_eq!(allocator.currently_allocated(), (b.value() - a.value() + 50) as usize);
    }

    #[test]
    fn zero_size_allocation_returns_sentinel_and_frees_as_noop() {
        let window = Window::new(4096);
        let allocator = unsafe {
            StackAllocator::init(window.base(), 4096, AllocatorId::new(1, 0), 0, ()).unwrap()
        };

        let p = allocator.allocate(0).unwrap();
        assert_eq!(p, ZERO_SIZE_SENTINEL);
        allocator.free(p);
    }

    #[test]
    fn out_of_memory_when_window_exhausted() {
        let window = Window::new(256);
        let allocator = unsafe {
            StackAllocator::init(window.base(), 256, AllocatorId::new(1, 0), 0, ()).unwrap()
        };

        allocator.allocate(100).unwrap();
        let err = allocator.allocate(1_000_000).unwrap_err();
        assert_eq!(err, AllocationError::OutOfMemory);
    }

    #[test]
    fn reallocate_copies_prior_content() {
        let window = Window::new(4096);
        let allocator = unsafe {
            StackAllocator::init(window.base(), 4096, AllocatorId::new(1, 0), 0, ()).unwrap()
        };

        let p = allocator.allocate(8).unwrap();
        unsafe {
            let ptr: *mut u8 = allocator.convert(p);
            core::ptr::copy_nonoverlapping(b"shmxdata".as_ptr(), ptr, 8);
        }

        let grown = allocator.reallocate(p, 8, 16).unwrap();
        let bytes = unsafe { core::slice::from_raw_parts(allocator.convert::<u8>(grown), 8) };
        assert_eq!(bytes, b"shmxdata");
    }

    #[test]
    fn attach_observes_the_same_cursor() {
        let window = Window::new(4096);
        let creator = unsafe {
            StackAllocator::init(window.base(), 4096, AllocatorId::new(2, 0), 0, ()).unwrap()
        };
        creator.allocate(64).unwrap();

        let attacher = unsafe { StackAllocator::attach(window.base(), 4096).unwrap() };
        assert_eq!(attacher.currently_allocated(), creator.currently_allocated());
        assert_eq!(attacher.id(), creator.id());
    }

    #[test]
    fn double_init_is_rejected() {
        let window = Window::new(4096);
        unsafe { StackAllocator::init(window.base(), 4096, AllocatorId::new(1, 0), 0, ()).unwrap() };
        let err = unsafe { StackAllocator::init(window.base(), 4096, AllocatorId::new(1, 0), 0, ()) }
            .unwrap_err();
        assert_eq!(err, AllocatorInitError::AllocatorExists);
    }
}
