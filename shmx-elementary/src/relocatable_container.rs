// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A container whose body lives at a memory location unknown until
//! construction time (usually a backend window mapped at a different base
//! address per process). Grounded directly on
//! `iceoryx2-bb-elementary-traits::relocatable_container::RelocatableContainer`.

use crate::alloc::{AllocationError, BaseAllocator};

/// Implemented by any in-window structure whose storage is reserved by an
/// allocator rather than by Rust's own stack/heap placement.
pub trait RelocatableContainer: Sized {
    /// Creates the struct in an uninitialised state, with `capacity`
    /// logical slots. No allocation happens yet.
    ///
    /// # Safety
    ///
    /// The returned value must not be used until [`RelocatableContainer::init`]
    /// has succeeded.
    unsafe fn new_uninit(capacity: usize) -> Self;

    /// Reserves the struct's backing storage from `allocator` and finishes
    /// initialisation.
    ///
    /// # Safety
    ///
    /// Must be called exactly once, after `new_uninit`, before any other
    /// method.
    unsafe fn init<T: BaseAllocator>(&mut self, allocator: &T) -> Result<(), AllocationError>;

    /// Bytes of backing storage `init` will need for `capacity` slots.
    fn memory_size(capacity: usize) -> usize;
}
