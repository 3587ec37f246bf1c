// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `shmx`: a shared-memory data-structure toolkit core.
//!
//! This crate is a facade over the workspace's nine components, the way
//! a top-level `iceoryx2` crate re-exports its `iceoryx2-bb-*` pieces:
//!
//! - [`pointer`] — the Pointer Model (§4.1, C1): [`pointer::Pointer`],
//!   [`pointer::OffsetPointer`], [`pointer::AllocatorId`], and their
//!   atomic flavours.
//! - [`backend`] — the Memory Backend (§4.2, C2) and Backend Registry
//!   (§4.3, C3): [`backend::PosixSharedMemory`],
//!   [`backend::AnonymousSharedMemory`], [`backend::BackendRegistry`].
//! - [`allocator`] — the Allocator Interface (§4.4, C4) and its two
//!   strategies, the Stack Allocator (§4.5, C5) and Scalable Page
//!   Allocator (§4.6, C6): [`allocator::StackAllocator`],
//!   [`allocator::ScalablePageAllocator`], and the object-safe
//!   [`allocator::AllocatorOps`] every higher layer is written against.
//! - [`manager`] — the Memory Manager (§4.7, C7):
//!   [`manager::MemoryManager`].
//! - [`container`] — the Container Base Protocol (§4.8, C8):
//!   [`container::ContainerHandle`] and the worked
//!   [`container::SinglyLinkedList`] example.
//! - [`queue`] — the MPSC Pointer Queue (§4.9, C9), this workspace's
//!   concurrency exemplar: [`queue::MpscPointerQueue`].
//!
//! `shmx-elementary`'s building blocks ([`elementary`]) and `shmx-log`'s
//! `fail!`/`fatal_panic!` macros ([`log_macros`]) back every layer above
//! but are not meant to be reached for directly by most callers.

pub mod elementary {
    //! Re-export of `shmx-elementary`: size-rounding, the process-local
    //! allocation traits, and [`RelocatableContainer`](relocatable_container::RelocatableContainer).
    pub use shmx_elementary::*;
}

pub mod pointer {
    //! Re-export of `shmx-pointer` (§4.1, C1).
    pub use shmx_pointer::*;
}

pub mod backend {
    //! Re-export of `shmx-backend` (§4.2/§4.3, C2/C3).
    pub use shmx_backend::*;
}

pub mod allocator {
    //! Re-export of `shmx-allocator` (§4.4/§4.5/§4.6, C4/C5/C6).
    pub use shmx_allocator::*;
}

pub mod manager {
    //! Re-export of `shmx-manager` (§4.7, C7).
    pub use shmx_manager::*;
}

pub mod container {
    //! Re-export of `shmx-container` (§4.8, C8).
    pub use shmx_container::*;
}

pub mod queue {
    //! Re-export of `shmx-queue` (§4.9, C9).
    pub use shmx_queue::*;
}

/// Re-export of the `log`/`shmx-log` facade (§10.1 Logging): `fail!`,
/// `fatal_panic!`, and [`shmx_log::init_verbosity`].
pub mod log_macros {
    pub use shmx_log::init_verbosity;
}

pub use allocator::{AllocatorOps, ScalablePageAllocator, ScalablePageConfig, StackAllocator};
pub use backend::{AnonymousSharedMemory, Backend, PosixSharedMemory};
pub use container::{ContainerHandle, SinglyLinkedList};
pub use manager::MemoryManager;
pub use pointer::{AllocatorId, OffsetPointer, Pointer};
pub use queue::{MpscPointerQueue, QueuePayload, Ticket};
