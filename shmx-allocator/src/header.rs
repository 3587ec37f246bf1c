// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The allocator header common prefix (§6): `{ kind: u32, id: u64,
//! custom_header_offset: u64, custom_header_size: u64 }`. Placed at the
//! start of the window handed to the allocator by the Memory Manager
//! (§4.7, "initialise allocator at its head"); every concrete allocator
//! places its own algorithm-specific fields immediately after this.

use shmx_pointer::AllocatorId;

use crate::kind::AllocatorKind;

/// Byte size of the common prefix, independent of the algorithm-specific
/// tail that follows it in a concrete allocator's window layout.
pub const WIRE_SIZE: usize = 32;

#[derive(Debug, Clone, Copy)]
pub struct AllocatorHeader {
    pub kind: u32,
    pub id: u64,
    pub custom_header_offset: u64,
    pub custom_header_size: u64,
}

impl AllocatorHeader {
    pub fn new(kind: AllocatorKind, id: AllocatorId, custom_header_offset: u64, custom_header_size: u64) -> Self {
        Self {
            kind: kind.to_u32(),
            id: id.to_u64(),
            custom_header_offset,
            custom_header_size,
        }
    }

    pub fn to_bytes(self) -> [u8; WIRE_SIZE] {
        let mut bytes = [0u8; WIRE_SIZE];
        bytes[0..4].copy_from_slice(&self.kind.to_ne_bytes());
        // bytes[4..8] reserved for alignment of the u64 fields that follow.
        bytes[8..16].copy_from_slice(&self.id.to_ne_bytes());
        bytes[16..24].copy_from_slice(&self.custom_header_offset.to_ne_bytes());
        bytes[24..32].copy_from_slice(&self.custom_header_size.to_ne_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < WIRE_SIZE {
            return None;
        }
        Some(Self {
            kind: u32::from_ne_bytes(bytes[0..4].try_into().ok()?),
            id: u64::from_ne_bytes(bytes[8..16].try_into().ok()?),
            custom_header_offset: u64::from_ne_bytes(bytes[16..24].try_into().ok()?),
            custom_header_size: u64::from_ne_bytes(bytes[24..32].try_into().ok()?),
        })
    }

    pub fn kind(&self) -> Option<AllocatorKind> {
        AllocatorKind::from_u32(self.kind)
    }

    pub fn allocator_id(&self) -> AllocatorId {
        AllocatorId::from_u64(self.id)
    }
}

/// Reads just enough of `window` to learn which [`AllocatorKind`] is
/// already initialised there, without fully attaching. Used by
/// `shmx-manager`'s `GetAllocator` to dispatch to the right concrete
/// allocator type.
///
/// # Safety
///
/// `window` must point to at least [`WIRE_SIZE`] readable bytes.
pub unsafe fn peek_kind(window: *const u8) -> Option<AllocatorKind> {
    let bytes = core::slice::from_raw_parts(window, WIRE_SIZE);
    AllocatorHeader::from_bytes(bytes)?.kind()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let header = AllocatorHeader::new(AllocatorKind::ScalablePage, AllocatorId::new(1, 2), 32, 64);
        let bytes = header.to_bytes();
        let decoded = AllocatorHeader::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.kind(), Some(AllocatorKind::ScalablePage));
        assert_eq!(decoded.allocator_id(), AllocatorId::new(1, 2));
        assert_eq!(decoded.custom_header_offset, 32);
        assert_eq!(decoded.custom_header_size, 64);
    }

    #[test]
    fn unknown_kind_decodes_to_none() {
        let mut header = AllocatorHeader::new(AllocatorKind::Stack, AllocatorId::new(1, 0), 0, 0);
        header.kind = 0xffff;
        assert_eq!(header.kind(), None);
    }
}
