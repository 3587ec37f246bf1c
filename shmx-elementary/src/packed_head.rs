// SPDX-License-Identifier: Apache-2.0 OR MIT

//! ABA-protected packed head word: a 48-bit offset plus a 16-bit
//! monotonically increasing tag, packed into a single `u64` so a Treiber
//! stack's head can be updated with one `compare_exchange`. Grounded on
//! `iceoryx2-bb-lock-free`'s `UniqueIndexSet::HeadDetails`
//! (`mpmc/unique_index_set.rs`), which packs a 24-bit head index, a
//! 16-bit ABA counter and a 24-bit borrowed-count into one `u64`; this
//! variant drops the borrowed-count field (the Scalable Page Allocator's
//! central stack has no notion of "locked, no more pops") and widens the
//! head field to 48 bits since it packs a byte offset rather than a small
//! index.

use core::sync::atomic::{AtomicU64, Ordering};

const OFFSET_BITS: u32 = 48;
const OFFSET_MASK: u64 = (1u64 << OFFSET_BITS) - 1;

/// Sentinel offset meaning "list is empty". `u64::MAX` is reserved
/// elsewhere (`OffsetPointer::NULL_OFFSET`) but does not fit in 48 bits;
/// the all-ones 48-bit pattern plays the same role here.
pub const NULL_OFFSET: u64 = OFFSET_MASK;

/// A decoded [`PackedHead`] value.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct HeadDetails {
    pub offset: u64,
    pub tag: u16,
}

impl HeadDetails {
    pub fn is_empty(&self) -> bool {
        self.offset == NULL_OFFSET
    }

    fn pack(self) -> u64 {
        debug_assert!(self.offset <= OFFSET_MASK, "offset exceeds 48 bits");
        ((self.tag as u64) << OFFSET_BITS) | (self.offset & OFFSET_MASK)
    }

    fn unpack(value: u64) -> Self {
        Self {
            offset: value & OFFSET_MASK,
            tag: (value >> OFFSET_BITS) as u16,
        }
    }

    /// The same offset with the tag incremented, wrapping on overflow.
    pub fn with_next_tag(self, offset: u64) -> Self {
        Self {
            offset,
            tag: self.tag.wrapping_add(1),
        }
    }
}

/// An atomic, ABA-protected stack head.
#[derive(Debug)]
pub struct PackedHead(AtomicU64);

impl PackedHead {
    pub const fn empty() -> Self {
        Self(AtomicU64::new(NULL_OFFSET))
    }

    pub fn load(&self, order: Ordering) -> HeadDetails {
        HeadDetails::unpack(self.0.load(order))
    }

    /// Attempts to replace `current` with `new`. On success returns `Ok(())`;
    /// on failure returns the observed value so the caller can retry its
    /// CAS loop without reloading.
    pub fn compare_exchange_weak(
        &self,
        current: HeadDetails,
        new: HeadDetails,
    ) -> Result<(), HeadDetails> {
        self.0
            .compare_exchange_weak(
                current.pack(),
                new.pack(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(HeadDetails::unpack)
    }
}

impl Default for PackedHead {
    fn default() -> Self {
        Self::empty()
    }
}
