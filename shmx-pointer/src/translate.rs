// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The translation contract from §4.1:
//!
//! ```text
//! resolve(p) = p.is_null() ? null : (backend_base_of(p.allocator_id) + p.offset)
//! encode(ptr) = (current_allocator_id, ptr - backend_base)
//! ```
//!
//! Both operations are constant-time and must not touch window contents.
//! This crate only owns the *shape* of the contract; the actual
//! `allocator_id -> backend base address` lookup is owned by whoever holds
//! the registry (`shmx-manager`), so it is expressed here as a trait rather
//! than a free function bound to a global.

use core::ptr::NonNull;

use crate::allocator_id::AllocatorId;
use crate::pointer::Pointer;

/// Supplies the one fact the translation contract needs from the rest of
/// the system: the current process's local base address for a given
/// allocator id.
pub trait BaseAddressResolver {
    /// Returns the local base address backing `id` in this process, or
    /// `None` if this process has not attached the corresponding backend.
    fn base_address(&self, id: AllocatorId) -> Option<NonNull<u8>>;
}

/// `resolve(p)`: translates a self-describing [`Pointer`] to a local
/// address using `resolver`. Returns `None` for a null pointer or when the
/// backend behind `p.allocator_id` is not attached in this process.
#[inline]
pub fn resolve<R: BaseAddressResolver>(resolver: &R, p: Pointer) -> Option<NonNull<u8>> {
    if p.is_null() {
        return None;
    }
    let base = resolver.base_address(p.allocator_id)?;
    // SAFETY: offset is a byte count within the window; base + offset stays
    // within the same allocation as long as the allocator honoured its own
    // invariants when it handed out `p`.
    Some(unsafe { NonNull::new_unchecked(base.as_ptr().add(p.offset.value() as usize)) })
}

/// `encode(ptr)`: the inverse of [`resolve`] given the allocator the
/// pointer belongs to and that allocator's local base address.
#[inline]
pub fn encode(allocator_id: AllocatorId, base: NonNull<u8>, ptr: *const u8) -> Pointer {
    let offset = (ptr as usize).wrapping_sub(base.as_ptr() as usize);
    Pointer::new(
        allocator_id,
        crate::offset::OffsetPointer::new(offset as u64),
    )
}
