// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `OffsetPointer` / `AtomicOffsetPointer` — §3 "OffsetPointer" and §4.1.
//! Grounded on `hermes_shm::ipc::OffsetPointerBase<ATOMIC>`
//! (`original_source/include/hermes_shm/memory/memory.h`) and, for the
//! atomic flavour's API shape, on `iceoryx2-cal`'s
//! `shm_allocator::pointer_offset::PointerOffset`.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// The null sentinel offset, `!0` per §3.
pub const NULL_OFFSET: u64 = u64::MAX;

/// A raw byte offset into some implied backend. Used inside containers
/// where the allocator is known from context, saving 8 bytes per link
/// relative to [`crate::Pointer`].
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct OffsetPointer(u64);

impl OffsetPointer {
    pub const NULL: OffsetPointer = OffsetPointer(NULL_OFFSET);

    #[inline]
    pub const fn new(offset: u64) -> Self {
        Self(offset)
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == NULL_OFFSET
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Adjusts the offset by `delta`. Arithmetic on a null pointer stays
    /// null, matching the original's pointer arithmetic never being asked
    /// to resolve a null handle.
    #[inline]
    pub fn offset_by(self, delta: i64) -> Self {
        if self.is_null() {
            return self;
        }
        Self((self.0 as i64).wrapping_add(delta) as u64)
    }
}

impl fmt::Debug for OffsetPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "OffsetPointer(null)")
        } else {
            write!(f, "OffsetPointer({})", self.0)
        }
    }
}

impl Default for OffsetPointer {
    fn default() -> Self {
        Self::NULL
    }
}

/// Atomic flavour of [`OffsetPointer`]: `load`/`store`/`exchange`/
/// `compare_exchange_weak`/`compare_exchange_strong`/`fetch_add`, each
/// taking a caller-supplied [`Ordering`] per §4.1.
#[derive(Default)]
pub struct AtomicOffsetPointer(AtomicU64);

impl AtomicOffsetPointer {
    pub const fn new(offset: OffsetPointer) -> Self {
        Self(AtomicU64::new(offset.0))
    }

    #[inline]
    pub fn load(&self, order: Ordering) -> OffsetPointer {
        OffsetPointer(self.0.load(order))
    }

    #[inline]
    pub fn store(&self, value: OffsetPointer, order: Ordering) {
        self.0.store(value.0, order);
    }

    #[inline]
    pub fn exchange(&self, value: OffsetPointer, order: Ordering) -> OffsetPointer {
        OffsetPointer(self.0.swap(value.0, order))
    }

    #[inline]
    pub fn compare_exchange_weak(
        &self,
        current: OffsetPointer,
        new: OffsetPointer,
        success: Ordering,
        failure: Ordering,
    ) -> Result<OffsetPointer, OffsetPointer> {
        self.0
            .compare_exchange_weak(current.0, new.0, success, failure)
            .map(OffsetPointer)
            .map_err(OffsetPointer)
    }

    #[inline]
    pub fn compare_exchange_strong(
        &self,
        current: OffsetPointer,
        new: OffsetPointer,
        success: Ordering,
        failure: Ordering,
    ) -> Result<OffsetPointer, OffsetPointer> {
        self.0
            .compare_exchange(current.0, new.0, success, failure)
            .map(OffsetPointer)
            .map_err(OffsetPointer)
    }

    /// Adds `delta` to the raw offset value. Used by the Stack Allocator's
    /// bump-pointer fast path (§4.5).
    #[inline]
    pub fn fetch_add(&self, delta: u64, order: Ordering) -> OffsetPointer {
        OffsetPointer(self.0.fetch_add(delta, order))
    }

    #[inline]
    pub fn fetch_sub(&self, delta: u64, order: Ordering) -> OffsetPointer {
        OffsetPointer(self.0.fetch_sub(delta, order))
    }
}

impl fmt::Debug for AtomicOffsetPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtomicOffsetPointer({:?})", self.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_offset_is_all_ones() {
        assert!(OffsetPointer::NULL.is_null());
        assert_eq!(OffsetPointer::default(), OffsetPointer::NULL);
    }

    #[test]
    fn atomic_cas_round_trip() {
        let a = AtomicOffsetPointer::new(OffsetPointer::new(10));
        assert_eq!(
            a.compare_exchange_strong(
                OffsetPointer::new(10),
                OffsetPointer::new(20),
                Ordering::SeqCst,
                Ordering::SeqCst
            ),
            Ok(OffsetPointer::new(10))
        );
        assert_eq!(a.load(Ordering::SeqCst), OffsetPointer::new(20));
    }

    #[test]
    fn fetch_add_bumps_value() {
        let a = AtomicOffsetPointer::new(OffsetPointer::new(0));
        assert_eq!(a.fetch_add(8, Ordering::SeqCst), OffsetPointer::new(0));
        assert_eq!(a.load(Ordering::SeqCst), OffsetPointer::new(8));
    }
}
