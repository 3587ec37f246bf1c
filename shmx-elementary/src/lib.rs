// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Elementary, near-dependency-free building blocks shared by every other
//! `shmx-*` crate: size-rounding helpers, the process-local allocation
//! traits that the allocator layer builds on, and the
//! [`RelocatableContainer`] pattern used by any structure whose storage
//! is reserved inside a shared-memory window rather than placed by Rust
//! itself.

pub mod align;
pub mod alloc;
pub mod packed_head;
pub mod relocatable_container;

pub use align::{align_to_page_size, align_up, page_size};
pub use alloc::{
    AllocationError, AllocationGrowError, AllocationShrinkError, Allocator, BaseAllocator, Origin,
};
pub use packed_head::{HeadDetails, PackedHead};
pub use relocatable_container::RelocatableContainer;
