// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`QueuePayload`] — what an [`crate::queue::MpscPointerQueue`] can carry.
//!
//! §4.9 describes the queue as carrying "values that are either scalars or
//! `Pointer`s (i.e. at most 64 bits wide)", but `shmx_pointer::Pointer` is
//! 16 bytes (`AllocatorId` plus `OffsetPointer`) and does not fit in one
//! marked machine word. This is the Open Question resolution recorded in
//! `SPEC_FULL.md` §11 and `DESIGN.md`: a slot holds two `u64` halves, `hi`
//! and `lo`; the mark bit lives only in the top bit of `lo`. A scalar
//! payload uses `hi = 0`; a [`shmx_pointer::Pointer`] splits across both
//! halves (`hi` = the allocator id, `lo` = the offset).
//!
//! Consequence (§9 Open Question (a)): the low 63 bits of `lo` must be the
//! whole value — a payload whose natural representation needs its own top
//! bit (an offset `>= 2^63`, or a scalar that legitimately uses bit 63) is
//! not representable here. No backend in this crate produces offsets that
//! large; enforcing that for arbitrary future payloads is left to callers,
//! exactly as the spec leaves it.

use shmx_pointer::{AllocatorId, OffsetPointer, Pointer};

/// A value small enough to travel through a queue slot's two-word payload.
pub trait QueuePayload: Copy {
    /// Splits `self` into `(hi, lo)`. `lo` must fit in 63 bits: bit 63 is
    /// reserved for the mark bit and is masked away before storage.
    fn to_words(self) -> (u64, u64);

    /// Rebuilds a value from the words written by [`QueuePayload::to_words`],
    /// `lo` already stripped of its mark bit.
    fn from_words(hi: u64, lo: u64) -> Self;
}

impl QueuePayload for u64 {
    #[inline]
    fn to_words(self) -> (u64, u64) {
        (0, self)
    }

    #[inline]
    fn from_words(_hi: u64, lo: u64) -> Self {
        lo
    }
}

impl QueuePayload for OffsetPointer {
    #[inline]
    fn to_words(self) -> (u64, u64) {
        (0, self.value())
    }

    #[inline]
    fn from_words(_hi: u64, lo: u64) -> Self {
        OffsetPointer::new(lo)
    }
}

impl QueuePayload for Pointer {
    #[inline]
    fn to_words(self) -> (u64, u64) {
        (self.allocator_id.to_u64(), self.offset.value())
    }

    #[inline]
    fn from_words(hi: u64, lo: u64) -> Self {
        Pointer::new(AllocatorId::from_u64(hi), OffsetPointer::new(lo))
    }
}
