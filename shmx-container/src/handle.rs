// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The Container Base Protocol (§4.8, component C8): every in-region
//! container splits into an **in-window header** (plain-old-data — only
//! `OffsetPointer`s and primitives, never a process-local pointer) and a
//! **local handle** that pairs a pointer to that header with the allocator
//! it was built from. [`ContainerHandle`] is the contract every such
//! container implements; `shmx-queue`'s `MpscPointerQueue` is the
//! concurrency-heavy exemplar (C9), and [`crate::slist::SinglyLinkedList`]
//! in this crate is the worked single-threaded example used to prove the
//! protocol end to end (§8 scenario 1) — the list/vector/map "zoo" proper
//! is out of scope (`spec.md` §1).
//!
//! Every operation takes the allocator explicitly rather than reading it
//! from a global (§9 Design Notes: "make the dependency explicit in
//! container constructors by passing the allocator rather than reading a
//! global").

use std::sync::Arc;

use shmx_allocator::AllocatorOps;
use shmx_pointer::Pointer;

use crate::error::ContainerError;

/// Implemented by the process-local handle of every in-window container.
/// A type implementing this never stores a process-local pointer inside
/// the window itself — only in the local handle, which lives in ordinary
/// process memory and is rebuilt by every process that touches the
/// container.
pub trait ContainerHandle: Sized {
    /// Per-container construction parameters (e.g. initial contents,
    /// fixed capacity).
    type ConstructArgs;

    /// Initialises a fresh header in place via `allocator` (allocating
    /// whatever nodes the container needs up front) and returns the local
    /// handle.
    fn construct(
        allocator: Arc<dyn AllocatorOps>,
        args: Self::ConstructArgs,
    ) -> Result<Self, ContainerError>;

    /// Frees every node the container allocated through its allocator and
    /// marks the header empty. After this call `self` is consumed; any
    /// other handle still pointing at the same header is dangling.
    fn destroy(self) -> Result<(), ContainerError>;

    /// A [`Pointer`] to this container's header — what a creator stores in
    /// a custom header or another container's body so an attacher can find
    /// this one.
    fn serialize(&self) -> Pointer;

    /// Rebuilds a local handle from a [`Pointer`] previously returned by
    /// [`ContainerHandle::serialize`], given the allocator it names.
    /// Fails with [`ContainerError::WrongAllocator`] if `pointer`'s
    /// allocator id does not match `allocator.id()`.
    fn deserialize(allocator: Arc<dyn AllocatorOps>, pointer: Pointer) -> Result<Self, ContainerError>;

    /// True if the header pointer is null or the header has been marked
    /// empty/destroyed.
    fn is_null(&self) -> bool;
}
