// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resource/lifecycle errors for the Allocator Interface (§4.4, §7).
//! `InvalidFree` is deliberately not a variant here: per §7 it is a fatal
//! misuse error and never reaches a caller as a `Result::Err` — both
//! [`crate::stack::StackAllocator::free`] and
//! [`crate::scalable::ScalablePageAllocator::free`] reach
//! `shmx_log::fatal_panic!` instead.

use core::fmt;

/// Failure of [`crate::ShmxAllocator::init`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AllocatorInitError {
    /// The target window already carries a valid allocator header.
    AllocatorExists,
    /// The window is too small to hold the header, the custom header and
    /// any minimum usable region.
    InsufficientSpace,
}

impl fmt::Display for AllocatorInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocatorExists => write!(f, "an allocator is already initialised at this window"),
            Self::InsufficientSpace => write!(f, "the window is too small for this allocator"),
        }
    }
}

impl std::error::Error for AllocatorInitError {}

/// Failure of [`crate::ShmxAllocator::attach`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AllocatorAttachError {
    /// The header's `kind` does not decode to this allocator's variant, or
    /// its custom-header bounds are inconsistent with the window size.
    AllocatorHeaderInvalid,
}

impl fmt::Display for AllocatorAttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocatorHeaderInvalid => write!(f, "the allocator header is invalid or unrecognised"),
        }
    }
}

impl std::error::Error for AllocatorAttachError {}

/// Failure of [`crate::ShmxAllocator::allocate`] / `aligned_allocate` /
/// `reallocate`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AllocationError {
    OutOfMemory,
    BadAlignment,
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "the allocator has no space left for this request"),
            Self::BadAlignment => write!(f, "the requested alignment is not a power of two"),
        }
    }
}

impl std::error::Error for AllocationError {}
