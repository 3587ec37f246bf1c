// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `MpscPointerQueue<T>` — the MPSC Pointer Queue (§4.9, component C9), the
//! concurrency exemplar: a bounded lock-free ring buffer over an
//! [`AllocatorOps`] window, grounded in spirit on
//! `iceoryx2-bb-lock-free::spsc::queue::Queue` (ring buffer + read/write
//! position counters) generalised from single-producer to multi-producer
//! via a `fetch_add` ticket, and on `iceoryx2-bb-lock-free`'s
//! `unique_index_set::HeadDetails` for the "pack a readiness flag into the
//! top bit of an atomic word" idiom already used by
//! `shmx_elementary::PackedHead`.
//!
//! Layout: the in-window header holds `capacity`, the slot array's offset,
//! and `head`/`tail` — reused here as plain monotonic ticket counters
//! rather than byte offsets, matching §4.9's literal wording ("head
//! (AtomicOffsetPointer, ticket for the consumer)"). Each slot is two
//! `u64`s (see [`crate::payload`]): `hi` and a mark-bit-carrying `lo`.

use core::marker::PhantomData;
use core::mem::size_of;
use core::sync::atomic::{AtomicU64, Ordering};
use std::fmt;
use std::sync::Arc;

use shmx_allocator::AllocatorOps;
use shmx_pointer::{AtomicOffsetPointer, OffsetPointer, Pointer};

use crate::error::QueueError;
use crate::markbit;
use crate::payload::QueuePayload;
use crate::ticket::Ticket;

#[repr(C)]
struct Header {
    capacity: u64,
    slots_off: OffsetPointer,
    head: AtomicOffsetPointer,
    tail: AtomicOffsetPointer,
}

#[repr(C)]
struct Slot {
    hi: AtomicU64,
    lo: AtomicU64,
}

/// A bounded multi-producer single-consumer queue living inside a shared
/// memory window, carrying any [`QueuePayload`] (`u64`, `OffsetPointer`, or
/// `Pointer`).
///
/// Multiple producers may call [`MpscPointerQueue::enqueue`] /
/// [`MpscPointerQueue::try_enqueue`] concurrently from any number of
/// threads or processes attached to the same allocator. Exactly one
/// consumer may call [`MpscPointerQueue::dequeue`] at a time — the
/// protocol itself does not arbitrate multiple consumers (§4.9's "single
/// consumer" is a usage discipline, not something the queue enforces, the
/// same way the Scalable Page Allocator's thread-local caches rely on
/// threads not sharing them).
pub struct MpscPointerQueue<T: QueuePayload> {
    header_off: OffsetPointer,
    allocator: Arc<dyn AllocatorOps>,
    _marker: PhantomData<T>,
}

impl<T: QueuePayload> fmt::Debug for MpscPointerQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpscPointerQueue")
            .field("header_off", &self.header_off)
            .field("allocator_id", &self.allocator.id())
            .finish()
    }
}

impl<T: QueuePayload> MpscPointerQueue<T> {
    fn header(&self) -> *mut Header {
        unsafe { self.allocator.convert_raw(self.header_off) as *mut Header }
    }

    fn slot_ptr(&self, index: usize) -> *mut Slot {
        let slots_off = unsafe { (*self.header()).slots_off };
        let base = unsafe { self.allocator.convert_raw(slots_off) as *mut Slot };
        unsafe { base.add(index) }
    }

    /// Allocates a fresh queue of `capacity` slots through `allocator`.
    pub fn construct(allocator: Arc<dyn AllocatorOps>, capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }

        let slots_off = allocator.allocate(capacity * size_of::<Slot>())?;
        let slots_base = unsafe { allocator.convert_raw(slots_off) as *mut Slot };
        for i in 0..capacity {
            unsafe {
                slots_base.add(i).write(Slot {
                    hi: AtomicU64::new(0),
                    lo: AtomicU64::new(0),
                });
            }
        }

        let header_off = allocator.allocate(size_of::<Header>())?;
        let header = unsafe { allocator.convert_raw(header_off) as *mut Header };
        unsafe {
            header.write(Header {
                capacity: capacity as u64,
                slots_off,
                head: AtomicOffsetPointer::new(OffsetPointer::new(0)),
                tail: AtomicOffsetPointer::new(OffsetPointer::new(0)),
            });
        }

        Ok(Self {
            header_off,
            allocator,
            _marker: PhantomData,
        })
    }

    /// Releases the slot array and header back to the allocator. Any value
    /// still enqueued is dropped along with the slots (it was `Copy`, so
    /// nothing to finalize); per §4.9 "Resource release" a non-empty queue
    /// being destroyed is the caller's bookkeeping mistake, not a fault
    /// this call detects.
    pub fn destroy(self) -> Result<(), QueueError> {
        if self.header_off.is_null() {
            return Ok(());
        }
        let slots_off = unsafe { (*self.header()).slots_off };
        self.allocator.free(slots_off);
        self.allocator.free(self.header_off);
        Ok(())
    }

    /// A [`Pointer`] to this queue's header, for another container or a
    /// custom header to publish to attachers.
    pub fn serialize(&self) -> Pointer {
        Pointer::new(self.allocator.id(), self.header_off)
    }

    /// Rebuilds a local handle from a [`Pointer`] previously returned by
    /// [`MpscPointerQueue::serialize`].
    pub fn attach(allocator: Arc<dyn AllocatorOps>, pointer: Pointer) -> Result<Self, QueueError> {
        if pointer.is_null() {
            return Err(QueueError::NullPointer);
        }
        if pointer.allocator_id != allocator.id() {
            return Err(QueueError::WrongAllocator);
        }
        Ok(Self {
            header_off: pointer.offset,
            allocator,
            _marker: PhantomData,
        })
    }

    pub fn capacity(&self) -> usize {
        unsafe { (*self.header()).capacity as usize }
    }

    /// Approximate occupancy (`tail - head`); racy under concurrent
    /// producers, as with any such counter, but monotone from the single
    /// consumer's point of view.
    pub fn len(&self) -> usize {
        let header = self.header();
        let head = unsafe { (*header).head.load(Ordering::Acquire) }.value();
        let tail = unsafe { (*header).tail.load(Ordering::Acquire) }.value();
        tail.saturating_sub(head) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    fn write_slot(&self, index: usize, value: T) {
        let (hi, lo) = value.to_words();
        debug_assert!(
            lo & (1 << 63) == 0,
            "queue payload's low word must leave the top bit free for the mark bit"
        );
        let slot = self.slot_ptr(index);
        unsafe {
            (*slot).hi.store(hi, Ordering::Relaxed);
            (*slot).lo.store(markbit::mark(lo), Ordering::Release);
        }
    }

    /// Producer `enqueue(v)` (§4.9): claims a ticket via `tail.fetch_add`,
    /// then spins/yields until there is room for it before writing. Always
    /// succeeds, eventually, as long as the consumer keeps draining.
    pub fn enqueue(&self, value: T) -> Ticket {
        let header = self.header();
        let capacity = unsafe { (*header).capacity };
        let t = unsafe { (*header).tail.fetch_add(1, Ordering::AcqRel) }.value();

        loop {
            let h = unsafe { (*header).head.load(Ordering::Acquire) }.value();
            if t.wrapping_sub(h) < capacity {
                break;
            }
            std::thread::yield_now();
        }

        self.write_slot((t % capacity) as usize, value);
        Ticket::new(t)
    }

    /// Non-blocking variant (§7 "Transient returns ... queue enqueue on
    /// full"): returns `value` back to the caller instead of claiming a
    /// ticket when the queue is already full.
    pub fn try_enqueue(&self, value: T) -> Result<Ticket, T> {
        let header = self.header();
        let capacity = unsafe { (*header).capacity };

        loop {
            let tail = unsafe { (*header).tail.load(Ordering::Acquire) };
            let head = unsafe { (*header).head.load(Ordering::Acquire) }.value();
            if tail.value().wrapping_sub(head) >= capacity {
                return Err(value);
            }
            let next = OffsetPointer::new(tail.value() + 1);
            let cas = unsafe {
                (*header).tail.compare_exchange_weak(tail, next, Ordering::AcqRel, Ordering::Relaxed)
            };
            if cas.is_ok() {
                self.write_slot((tail.value() % capacity) as usize, value);
                return Ok(Ticket::new(tail.value()));
            }
        }
    }

    /// Consumer `dequeue()` (§4.9): `None` both when the queue is
    /// structurally empty (`head >= tail`) and when the slot at `head` has
    /// not yet been marked ready by its producer — the latter is a
    /// transient race, not a fault (§4.9 "Cancellation").
    pub fn dequeue(&self) -> Option<(T, Ticket)> {
        let header = self.header();
        let h = unsafe { (*header).head.load(Ordering::Acquire) }.value();
        let t = unsafe { (*header).tail.load(Ordering::Acquire) }.value();
        if h >= t {
            return None;
        }

        let capacity = unsafe { (*header).capacity };
        let slot = self.slot_ptr((h % capacity) as usize);
        let lo_raw = unsafe { (*slot).lo.load(Ordering::Acquire) };
        if !markbit::is_marked(lo_raw) {
            return None;
        }

        let hi = unsafe { (*slot).hi.load(Ordering::Relaxed) };
        let lo = markbit::unmark(lo_raw);
        unsafe { (*slot).lo.store(lo, Ordering::Release) };
        unsafe { (*header).head.fetch_add(1, Ordering::AcqRel) };
        Some((T::from_words(hi, lo), Ticket::new(h)))
    }
}

unsafe impl<T: QueuePayload> Send for MpscPointerQueue<T> {}
unsafe impl<T: QueuePayload> Sync for MpscPointerQueue<T> {}
