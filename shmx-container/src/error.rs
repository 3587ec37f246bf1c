// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors shared by every Container Base Protocol implementation (§4.8).

use core::fmt;

use shmx_allocator::AllocationError;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ContainerError {
    /// The backing allocator could not satisfy a node/header allocation.
    Allocation(AllocationError),
    /// `deserialize` was handed a [`shmx_pointer::Pointer`] whose allocator
    /// id does not match the allocator passed alongside it.
    WrongAllocator,
    /// `deserialize` was handed a null pointer.
    NullPointer,
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation(e) => write!(f, "container allocation failed: {e}"),
            Self::WrongAllocator => write!(f, "pointer belongs to a different allocator"),
            Self::NullPointer => write!(f, "cannot deserialize a null pointer"),
        }
    }
}

impl std::error::Error for ContainerError {}

impl From<AllocationError> for ContainerError {
    fn from(e: AllocationError) -> Self {
        Self::Allocation(e)
    }
}
