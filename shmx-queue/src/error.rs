// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors for `MpscPointerQueue` construction (§7 resource/lifecycle
//! errors). Per-operation transient outcomes (empty/full) are not errors
//! here — §7 "Transient returns (not errors)" — they are plain `Option`/
//! `Result<Ticket, T>` returns on `dequeue`/`try_enqueue`.

use core::fmt;

use shmx_allocator::AllocationError;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum QueueError {
    /// The backing allocator could not satisfy the header or slot-array
    /// allocation.
    Allocation(AllocationError),
    /// `capacity` was zero; a queue must hold at least one slot.
    ZeroCapacity,
    /// `attach`/`deserialize` found a header whose allocator id does not
    /// match the allocator passed alongside it.
    WrongAllocator,
    /// `attach`/`deserialize` was handed a null pointer.
    NullPointer,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation(e) => write!(f, "queue allocation failed: {e}"),
            Self::ZeroCapacity => write!(f, "a queue must have a capacity of at least one"),
            Self::WrongAllocator => write!(f, "pointer belongs to a different allocator"),
            Self::NullPointer => write!(f, "cannot attach a null queue pointer"),
        }
    }
}

impl std::error::Error for QueueError {}

impl From<AllocationError> for QueueError {
    fn from(e: AllocationError) -> Self {
        Self::Allocation(e)
    }
}
