// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend header layout, §6: "at offset 0 of every backend:
//! `{ magic: u32, kind: u32, size: u64, reserved: u64 }` (little-endian)".

/// Distinguishes this crate's own backends from garbage/foreign shared
/// memory segments opened under the same name.
pub const MAGIC: u32 = 0x5348_4d58; // "SHMX" in ASCII, big-endian-read

/// Tags which [`crate::Backend`] implementation wrote a given header,
/// mirroring the allocator kind tag in `shmx-allocator` (§9 "Dynamic
/// dispatch over allocators").
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(u32)]
pub enum BackendKind {
    PosixSharedMemory = 0,
    Anonymous = 1,
}

impl BackendKind {
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::PosixSharedMemory),
            1 => Some(Self::Anonymous),
            _ => None,
        }
    }
}

/// The on-disk/in-window header every backend writes at offset 0, exactly
/// §6's four little-endian fields. `reserved` is currently unused and
/// always zero; it exists so a later revision can grow the header without
/// shifting the payload start for existing backends.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(C)]
pub struct BackendHeader {
    pub magic: u32,
    pub kind: u32,
    pub size: u64,
    pub reserved: u64,
}

impl BackendHeader {
    pub const WIRE_SIZE: usize = 24;

    pub const fn new(kind: BackendKind, size: u64) -> Self {
        Self {
            magic: MAGIC,
            kind: kind as u32,
            size,
            reserved: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC && BackendKind::from_u32(self.kind).is_some()
    }

    pub fn to_bytes(self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.magic.to_le_bytes());
        out[4..8].copy_from_slice(&self.kind.to_le_bytes());
        out[8..16].copy_from_slice(&self.size.to_le_bytes());
        out[16..24].copy_from_slice(&self.reserved.to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::WIRE_SIZE {
            return None;
        }
        Some(Self {
            magic: u32::from_le_bytes(bytes[0..4].try_into().ok()?),
            kind: u32::from_le_bytes(bytes[4..8].try_into().ok()?),
            size: u64::from_le_bytes(bytes[8..16].try_into().ok()?),
            reserved: u64::from_le_bytes(bytes[16..24].try_into().ok()?),
        })
    }
}
