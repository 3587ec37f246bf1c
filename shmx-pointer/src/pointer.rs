// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `Pointer` / `AtomicPointer` — §3 "Pointer", `(AllocatorId, OffsetPointer)`.
//! Grounded on `hermes_shm::ipc::PointerBase<ATOMIC>`
//! (`original_source/include/hermes_shm/memory/memory.h`).

use core::cmp::Ordering as CmpOrdering;
use core::fmt;
use core::sync::atomic::Ordering;

use crate::allocator_id::AllocatorId;
use crate::offset::{AtomicOffsetPointer, OffsetPointer};

/// A fully self-describing handle: given any process that has attached the
/// named backend, a `Pointer` resolves unambiguously to a local address.
/// Null iff the allocator id is null (§3).
#[derive(Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct Pointer {
    pub allocator_id: AllocatorId,
    pub offset: OffsetPointer,
}

impl Pointer {
    pub const NULL: Pointer = Pointer {
        allocator_id: AllocatorId::NULL,
        offset: OffsetPointer::NULL,
    };

    #[inline]
    pub const fn new(allocator_id: AllocatorId, offset: OffsetPointer) -> Self {
        Self {
            allocator_id,
            offset,
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.allocator_id.is_null()
    }

    /// Adjusts the offset only; the allocator id is preserved (§4.1).
    #[inline]
    pub fn offset_by(self, delta: i64) -> Self {
        Self {
            allocator_id: self.allocator_id,
            offset: self.offset.offset_by(delta),
        }
    }

    /// 16-byte wire encoding from §6: `{ allocator_id: u64, offset: u64 }`,
    /// host-native endianness.
    pub fn to_bytes(self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&self.allocator_id.to_u64().to_ne_bytes());
        bytes[8..16].copy_from_slice(&self.offset.value().to_ne_bytes());
        bytes
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let allocator_id = u64::from_ne_bytes(bytes[0..8].try_into().unwrap());
        let offset = u64::from_ne_bytes(bytes[8..16].try_into().unwrap());
        Self {
            allocator_id: AllocatorId::from_u64(allocator_id),
            offset: OffsetPointer::new(offset),
        }
    }
}

impl fmt::Debug for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Pointer(null)")
        } else {
            write!(f, "Pointer({}, {:?})", self.allocator_id, self.offset)
        }
    }
}

/// Comparison is lexicographic on `(id, offset)` per §4.1.
impl Ord for Pointer {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        (self.allocator_id, self.offset.value()).cmp(&(other.allocator_id, other.offset.value()))
    }
}

impl PartialOrd for Pointer {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

/// Atomic flavour of [`Pointer`]. The allocator id is fixed at construction
/// (it never changes once a handle is born into a given allocator); only
/// the offset half is mutated atomically, mirroring
/// `hermes_shm::ipc::PointerBase<true>` where `off_` alone is the
/// `atomic<size_t>` member.
pub struct AtomicPointer {
    allocator_id: AllocatorId,
    offset: AtomicOffsetPointer,
}

impl AtomicPointer {
    pub fn new(value: Pointer) -> Self {
        Self {
            allocator_id: value.allocator_id,
            offset: AtomicOffsetPointer::new(value.offset),
        }
    }

    #[inline]
    pub fn load(&self, order: Ordering) -> Pointer {
        Pointer::new(self.allocator_id, self.offset.load(order))
    }

    #[inline]
    pub fn store(&self, value: Pointer, order: Ordering) {
        debug_assert_eq!(
            value.allocator_id, self.allocator_id,
            "AtomicPointer may not change the allocator it belongs to"
        );
        self.offset.store(value.offset, order);
    }

    #[inline]
    pub fn exchange(&self, value: Pointer, order: Ordering) -> Pointer {
        debug_assert_eq!(value.allocator_id, self.allocator_id);
        Pointer::new(self.allocator_id, self.offset.exchange(value.offset, order))
    }

    #[inline]
    pub fn compare_exchange_weak(
        &self,
        current: Pointer,
        new: Pointer,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Pointer, Pointer> {
        self.offset
            .compare_exchange_weak(current.offset, new.offset, success, failure)
            .map(|off| Pointer::new(self.allocator_id, off))
            .map_err(|off| Pointer::new(self.allocator_id, off))
    }

    #[inline]
    pub fn compare_exchange_strong(
        &self,
        current: Pointer,
        new: Pointer,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Pointer, Pointer> {
        self.offset
            .compare_exchange_strong(current.offset, new.offset, success, failure)
            .map(|off| Pointer::new(self.allocator_id, off))
            .map_err(|off| Pointer::new(self.allocator_id, off))
    }

    #[inline]
    pub fn fetch_add(&self, delta: u64, order: Ordering) -> Pointer {
        Pointer::new(self.allocator_id, self.offset.fetch_add(delta, order))
    }
}

impl fmt::Debug for AtomicPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtomicPointer({:?})", self.load(Ordering::Relaxed))
    }
}
