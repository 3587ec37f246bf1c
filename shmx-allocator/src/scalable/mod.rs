// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The Scalable Page Allocator (§4.6, component C6): size-classed free
//! lists with thread-local caches over a lock-free central stack, plus a
//! bump-from-the-high-end large-block path backed by a small
//! spinlock-guarded free-segment map. Grounded on
//! `iceoryx2-bb-memory::pool_allocator::PoolAllocator` for the
//! bucket/descriptor shape and on
//! `iceoryx2-bb-lock-free::mpmc::unique_index_set`'s `HeadDetails` for the
//! ABA-protected packed head (here [`shmx_elementary::PackedHead`]).
//!
//! Every block, small or large, is prefixed by a 24-byte in-window
//! [`Descriptor`] so `free` can dispatch without being told which path a
//! pointer came from. While a block is free, the 8 bytes immediately after
//! its descriptor double as the central free stack's intrusive `next`
//! link — safe since nothing else is live in that space until the block
//! is handed back out.

use core::cell::RefCell;
use core::fmt;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::collections::HashMap;

use shmx_elementary::align_up;
use shmx_elementary::packed_head::PackedHead;
use shmx_log::fatal_panic;
use shmx_pointer::{AllocatorId, OffsetPointer};

use crate::error::{AllocationError, AllocatorAttachError, AllocatorInitError};
use crate::header::AllocatorHeader;
use crate::kind::AllocatorKind;
use crate::ZERO_SIZE_SENTINEL;

const MAX_CLASSES: usize = 24;
const MAX_FREE_SEGMENTS: usize = 64;
const DESCRIPTOR_SIZE: usize = 24;
const LARGE_CLASS_INDEX: u32 = u32::MAX;
const STATE_FREE: u32 = 0;
const STATE_ALLOCATED: u32 = 1;

/// Per-strategy construction parameters (§10.3): the size-class schedule
/// and the per-thread cache depth, both runtime values so tests can shrink
/// them for determinism instead of the teacher's compile-time constants.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ascending block sizes; the last entry is `max_class` (§4.6).
    pub class_sizes: Vec<usize>,
    /// Bound `K` on each (thread, class) local cache (§4.6).
    pub thread_cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            class_sizes: default_class_sizes(),
            thread_cache_capacity: 32,
        }
    }
}

/// Generates an ascending schedule starting at 16 bytes, growing by a
/// factor of 1.125 (so any request rounds up to at most 12.5% overhead,
/// per §4.6), rounded to 8-byte boundaries and capped at [`MAX_CLASSES`]
/// distinct sizes.
fn default_class_sizes() -> Vec<usize> {
    let mut sizes = Vec::new();
    let mut next: f64 = 16.0;
    while sizes.len() < MAX_CLASSES {
        let rounded = align_up(next.ceil() as usize, 8);
        if sizes.last().copied() != Some(rounded) {
            sizes.push(rounded);
        }
        next *= 1.125;
    }
    sizes
}

#[repr(C)]
struct FreeSegment {
    offset: AtomicU64,
    size: AtomicU64,
}

#[repr(C)]
struct Layout {
    header: [u8; super::header::WIRE_SIZE],
    ready: AtomicU32,
    num_classes: AtomicU32,
    class_sizes: [AtomicU32; MAX_CLASSES],
    class_heads: [PackedHead; MAX_CLASSES],
    small_arena_cursor: AtomicU64,
    large_cursor: AtomicU64,
    live_bytes: AtomicU64,
    free_lock: AtomicU32,
    free_count: AtomicU32,
    free_segments: [FreeSegment; MAX_FREE_SEGMENTS],
}

const READY: u32 = 0x5ca1ab1e_u32;

thread_local! {
    static THREAD_CACHE: RefCell<HashMap<u64, HashMap<u32, Vec<u64>>>> =
        RefCell::new(HashMap::new());
}

/// The size-classed, thread-cached allocator (§4.6).
pub struct ScalablePageAllocator {
    window: NonNull<u8>,
    window_size: usize,
    id: AllocatorId,
    custom_header_offset: usize,
    class_sizes: Vec<usize>,
    thread_cache_capacity: usize,
}

unsafe impl Send for ScalablePageAllocator {}
unsafe impl Sync for ScalablePageAllocator {}

impl fmt::Debug for ScalablePageAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalablePageAllocator")
            .field("id", &self.id)
            .field("classes", &self.class_sizes.len())
            .field("currently_allocated", &self.currently_allocated())
            .finish()
    }
}

fn tail_size() -> usize {
    align_up(core::mem::size_of::<Layout>(), 16)
}

impl ScalablePageAllocator {
    fn layout(&self) -> &Layout {
        unsafe { &*(self.window.as_ptr() as *const Layout) }
    }

    fn max_class(&self) -> usize {
        *self.class_sizes.last().unwrap_or(&0)
    }

    fn class_for(&self, size: usize) -> Option<usize> {
        self.class_sizes.iter().position(|&s| s >= size)
    }

    fn block_stride(&self, class_index: usize) -> u64 {
        (DESCRIPTOR_SIZE + self.class_sizes[class_index]) as u64
    }

    unsafe fn descriptor_ptr(&self, desc_offset: u64) -> *mut u32 {
        self.window.as_ptr().add(desc_offset as usize) as *mut u32
    }

    unsafe fn write_descriptor(&self, desc_offset: u64, class_index: u32, block_size: u32, state: u32) {
        let p = self.descriptor_ptr(desc_offset);
        p.write(class_index);
        p.add(1).write(self.id.major);
        p.add(2).write(self.id.minor);
        p.add(3).write(state);
        p.add(4).write(block_size);
        p.add(5).write(0);
    }

    unsafe fn mark_free(&self, desc_offset: u64) {
        self.descriptor_ptr(desc_offset).add(3).write(STATE_FREE);
    }

    unsafe fn read_descriptor(&self, desc_offset: u64) -> (u32, AllocatorId, u32, u32) {
        let p = self.descriptor_ptr(desc_offset);
        let class_index = p.read();
        let allocator_id = AllocatorId::new(p.add(1).read(), p.add(2).read());
        let state = p.add(3).read();
        let block_size = p.add(4).read();
        (class_index, allocator_id, state, block_size)
    }

    fn next_link(&self, desc_offset: u64) -> &AtomicU64 {
        unsafe {
            &*(self
                .window
                .as_ptr()
                .add(desc_offset as usize + DESCRIPTOR_SIZE) as *const AtomicU64)
        }
    }

    fn central_push(&self, class_index: usize, desc_offset: u64) {
        let head = &self.layout().class_heads[class_index];
        let mut current = head.load(Ordering::Acquire);
        loop {
            self.next_link(desc_offset).store(current.offset, Ordering::Relaxed);
            match head.compare_exchange_weak(current, current.with_next_tag(desc_offset)) {
                Ok(()) => return,
                Err(observed) => current = observed,
            }
        }
    }

    fn central_pop(&self, class_index: usize) -> Option<u64> {
        let head = &self.layout().class_heads[class_index];
        let mut current = head.load(Ordering::Acquire);
        loop {
            if current.is_empty() {
                return None;
            }
            let next = self.next_link(current.offset).load(Ordering::Relaxed);
            match head.compare_exchange_weak(current, current.with_next_tag(next)) {
                Ok(()) => return Some(current.offset),
                Err(observed) => current = observed,
            }
        }
    }

    fn lock_free_segments<R>(&self, f: impl FnOnce(&Layout) -> R) -> R {
        let lock = &self.layout().free_lock;
        while lock
            .compare_exchange_weak(0, 1, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }
        let result = f(self.layout());
        lock.store(0, Ordering::Release);
        result
    }

    fn take_free_segment(&self, min_size: u64) -> Option<u64> {
        self.lock_free_segments(|layout| {
            let count = layout.free_count.load(Ordering::Relaxed) as usize;
            for i in 0..count {
                let seg = &layout.free_segments[i];
                if seg.size.load(Ordering::Relaxed) >= min_size {
                    let offset = seg.offset.load(Ordering::Relaxed);
                    let last = count - 1;
                    if i != last {
                        let last_off = layout.free_segments[last].offset.load(Ordering::Relaxed);
                        let last_size = layout.free_segments[last].size.load(Ordering::Relaxed);
                        seg.offset.store(last_off, Ordering::Relaxed);
                        seg.size.store(last_size, Ordering::Relaxed);
                    }
                    layout.free_count.store(last as u32, Ordering::Relaxed);
                    return Some(offset);
                }
            }
            None
        })
    }

    /// Drops the segment silently if the map is already at capacity: a
    /// bounded bookkeeping structure rather than an unbounded one, which
    /// only affects large-block reuse (§4.6 already tolerates a single
    /// lock here since large allocations are rare).
    fn push_free_segment(&self, offset: u64, size: u64) {
        self.lock_free_segments(|layout| {
            let count = layout.free_count.load(Ordering::Relaxed) as usize;
            if count < MAX_FREE_SEGMENTS {
                layout.free_segments[count].offset.store(offset, Ordering::Relaxed);
                layout.free_segments[count].size.store(size, Ordering::Relaxed);
                layout.free_count.store((count + 1) as u32, Ordering::Relaxed);
            }
        });
    }

    fn carve_small(&self, class_index: usize) -> Result<u64, AllocationError> {
        let stride = self.block_stride(class_index);
        let cursor = &self.layout().small_arena_cursor;
        loop {
            let cur = cursor.load(Ordering::Acquire);
            let end = cur + stride;
            if end > self.layout().large_cursor.load(Ordering::Acquire) {
                return Err(AllocationError::OutOfMemory);
            }
            match cursor.compare_exchange_weak(cur, end, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return Ok(cur),
                Err(_) => continue,
            }
        }
    }

    /// Number of descriptors moved in one central-stack transfer (§4.6:
    /// "refills by atomically detaching a batch from the central stack" /
    /// "drains a batch back to central"). Half the cache's capacity, so a
    /// cache that just refilled or drained isn't immediately at the
    /// opposite extreme on the very next operation.
    fn batch_size(&self) -> usize {
        (self.thread_cache_capacity / 2).max(1)
    }

    /// Refills the calling thread's cache for `class_index` by popping up
    /// to [`Self::batch_size`] descriptors off the central free-list in one
    /// go, then hands back one of them. `None` once the central stack itself
    /// is empty.
    fn cache_refill_batch(&self, class_index: usize, batch_size: usize) -> Option<u64> {
        THREAD_CACHE.with(|cache| {
            let mut cache = cache.borrow_mut();
            let bucket = cache
                .entry(self.id.to_u64())
                .or_default()
                .entry(class_index as u32)
                .or_default();
            for _ in 0..batch_size {
                match self.central_pop(class_index) {
                    Some(off) => bucket.push(off),
                    None => break,
                }
            }
            bucket.pop()
        })
    }

    /// Drains up to [`Self::batch_size`] descriptors from the calling
    /// thread's cache back to the central free-list, making room for a
    /// fresh push without sending every subsequent free straight to
    /// central.
    fn cache_drain_batch(&self, class_index: usize, batch_size: usize) {
        THREAD_CACHE.with(|cache| {
            let mut cache = cache.borrow_mut();
            let bucket = cache
                .entry(self.id.to_u64())
                .or_default()
                .entry(class_index as u32)
                .or_default();
            let drain = batch_size.min(bucket.len());
            for _ in 0..drain {
                if let Some(off) = bucket.pop() {
                    self.central_push(class_index, off);
                }
            }
        });
    }

    fn cache_pop(&self, class_index: usize) -> Option<u64> {
        THREAD_CACHE.with(|cache| {
            cache
                .borrow_mut()
                .entry(self.id.to_u64())
                .or_default()
                .entry(class_index as u32)
                .or_default()
                .pop()
        })
    }

    fn cache_push(&self, class_index: usize, desc_offset: u64) -> bool {
        THREAD_CACHE.with(|cache| {
            let mut cache = cache.borrow_mut();
            let bucket = cache
                .entry(self.id.to_u64())
                .or_default()
                .entry(class_index as u32)
                .or_default();
            if bucket.len() < self.thread_cache_capacity {
                bucket.push(desc_offset);
                true
            } else {
                false
            }
        })
    }

    fn allocate_small(&self, class_index: usize) -> Result<OffsetPointer, AllocationError> {
        let desc_offset = if let Some(off) = self.cache_pop(class_index) {
            off
        } else if let Some(off) = self.cache_refill_batch(class_index, self.batch_size()) {
            off
        } else {
            self.carve_small(class_index)?
        };

        let block_size = self.class_sizes[class_index] as u32;
        unsafe {
            self.write_descriptor(desc_offset, class_index as u32, block_size, STATE_ALLOCATED);
        }
        self.layout()
            .live_bytes
            .fetch_add(block_size as u64, Ordering::Relaxed);
        Ok(OffsetPointer::new(desc_offset + DESCRIPTOR_SIZE as u64))
    }

    fn free_small(&self, class_index: usize, desc_offset: u64) {
        let block_size = self.class_sizes[class_index] as u64;
        self.layout().live_bytes.fetch_sub(block_size, Ordering::Relaxed);
        unsafe { self.mark_free(desc_offset) };
        if !self.cache_push(class_index, desc_offset) {
            self.cache_drain_batch(class_index, self.batch_size());
            if !self.cache_push(class_index, desc_offset) {
                self.central_push(class_index, desc_offset);
            }
        }
    }

    fn allocate_large(&self, size: usize, align: usize) -> Result<OffsetPointer, AllocationError> {
        let align = align.max(8) as u64;
        let aligned_size = align_up(size, 8) as u64;

        if let Some(offset) = self.take_free_segment(aligned_size) {
            unsafe {
                self.write_descriptor(offset, LARGE_CLASS_INDEX, aligned_size as u32, STATE_ALLOCATED);
            }
            self.layout().live_bytes.fetch_add(aligned_size, Ordering::Relaxed);
            return Ok(OffsetPointer::new(offset + DESCRIPTOR_SIZE as u64));
        }

        loop {
            let cur = self.layout().large_cursor.load(Ordering::Acquire);
            let tentative_start = match cur.checked_sub(DESCRIPTOR_SIZE as u64 + aligned_size) {
                Some(v) => v,
                None => return Err(AllocationError::OutOfMemory),
            };
            let data_start = tentative_start + DESCRIPTOR_SIZE as u64;
            let aligned_data_start = data_start & !(align - 1);
            let block_start = aligned_data_start - DESCRIPTOR_SIZE as u64;
            if (block_start as usize) < self.layout().small_arena_cursor.load(Ordering::Acquire) as usize
            {
                return Err(AllocationError::OutOfMemory);
            }
            match self.layout().large_cursor.compare_exchange_weak(
                cur,
                block_start,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    unsafe {
                        self.write_descriptor(
                            block_start,
                            LARGE_CLASS_INDEX,
                            aligned_size as u32,
                            STATE_ALLOCATED,
                        );
                    }
                    self.layout()
                        .live_bytes
                        .fetch_add(aligned_size, Ordering::Relaxed);
                    return Ok(OffsetPointer::new(block_start + DESCRIPTOR_SIZE as u64));
                }
                Err(_) => continue,
            }
        }
    }

    fn free_large(&self, desc_offset: u64, block_size: u32) {
        self.layout()
            .live_bytes
            .fetch_sub(block_size as u64, Ordering::Relaxed);
        unsafe { self.mark_free(desc_offset) };
        self.push_free_segment(desc_offset, block_size as u64);
    }
}

impl crate::ShmxAllocator for ScalablePageAllocator {
    type Config = Config;

    unsafe fn init(
        window: NonNull<u8>,
        window_size: usize,
        id: AllocatorId,
        custom_header_size: usize,
        config: Self::Config,
    ) -> Result<Self, AllocatorInitError> {
        let layout = &*(window.as_ptr() as *const Layout);
        if layout.ready.load(Ordering::Acquire) == READY {
            return Err(AllocatorInitError::AllocatorExists);
        }

        let class_sizes: Vec<usize> = config.class_sizes.into_iter().take(MAX_CLASSES).collect();
        if class_sizes.is_empty() {
            return Err(AllocatorInitError::InsufficientSpace);
        }

        let custom_header_offset = tail_size();
        let small_arena_start = align_up(custom_header_offset + custom_header_size, 16);
        if small_arena_start + class_sizes[0] + DESCRIPTOR_SIZE > window_size {
            return Err(AllocatorInitError::InsufficientSpace);
        }

        let header = AllocatorHeader::new(
            AllocatorKind::ScalablePage,
            id,
            custom_header_offset as u64,
            custom_header_size as u64,
        );
        core::ptr::copy_nonoverlapping(
            header.to_bytes().as_ptr(),
            window.as_ptr(),
            super::header::WIRE_SIZE,
        );

        layout.num_classes.store(class_sizes.len() as u32, Ordering::Relaxed);
        for (i, size) in class_sizes.iter().enumerate() {
            layout.class_sizes[i].store(*size as u32, Ordering::Relaxed);
        }
        layout.small_arena_cursor.store(small_arena_start as u64, Ordering::Relaxed);
        layout.large_cursor.store(window_size as u64, Ordering::Relaxed);
        layout.live_bytes.store(0, Ordering::Relaxed);
        layout.free_lock.store(0, Ordering::Relaxed);
        layout.free_count.store(0, Ordering::Relaxed);
        layout.ready.store(READY, Ordering::Release);

        Ok(Self {
            window,
            window_size,
            id,
            custom_header_offset,
            class_sizes,
            thread_cache_capacity: config.thread_cache_capacity,
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
        if header.kind() != Some(AllocatorKind::ScalablePage) {
            return Err(AllocatorAttachError::AllocatorHeaderInvalid);
        }

        let num_classes = layout.num_classes.load(Ordering::Acquire) as usize;
        if num_classes == 0 || num_classes > MAX_CLASSES {
            return Err(AllocatorAttachError::AllocatorHeaderInvalid);
        }
        let class_sizes: Vec<usize> = (0..num_classes)
            .map(|i| layout.class_sizes[i].load(Ordering::Acquire) as usize)
            .collect();

        Ok(Self {
            window,
            window_size,
            id: header.allocator_id(),
            custom_header_offset: header.custom_header_offset as usize,
            class_sizes,
            thread_cache_capacity: Config::default().thread_cache_capacity,
        })
    }

    fn id(&self) -> AllocatorId {
        self.id
    }

    fn allocate(&self, size: usize) -> Result<OffsetPointer, AllocationError> {
        self.aligned_allocate(size, 8)
    }

    fn aligned_allocate(&self, size: usize, align: usize) -> Result<OffsetPointer, AllocationError> {
        if size == 0 {
            return Ok(ZERO_SIZE_SENTINEL);
        }
        if !align.is_power_of_two() {
            return Err(AllocationError::BadAlignment);
        }

        if align <= 8 {
            if let Some(class_index) = self.class_for(size) {
                if size <= self.max_class() {
                    return self.allocate_small(class_index);
                }
            }
        }
        self.allocate_large(size, align)
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

        let desc_offset = p.value() - DESCRIPTOR_SIZE as u64;
        let (class_index, allocator_id, state, block_size) = unsafe { self.read_descriptor(desc_offset) };

        if allocator_id != self.id || state != STATE_ALLOCATED {
            fatal_panic!(from self, "invalid free: double free or pointer foreign to this allocator");
        }

        if class_index == LARGE_CLASS_INDEX {
            self.free_large(desc_offset, block_size);
        } else {
            self.free_small(class_index as usize, desc_offset);
        }
    }

    fn currently_allocated(&self) -> usize {
        self.layout().live_bytes.load(Ordering::Relaxed) as usize
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
