// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Anonymous private mapping (§4.2): same [`Backend`] surface as
//! [`crate::PosixSharedMemory`], minus a kernel-visible name. Since there
//! is nothing an out-of-process `attach` could open, this variant is for
//! tests and single-process scenarios (§4.2): a process-local registry
//! keyed by `url` stands in for the kernel object, and every "attacher"
//! within the same process gets a reference-counted handle to the same
//! `mmap`ed region.

use core::ptr::NonNull;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;
use shmx_log::fail;

use crate::error::{BackendAttachError, BackendCreateError, BackendDestroyError};
use crate::header::{BackendHeader, BackendKind};
use crate::Backend;

const PAYLOAD_OFFSET: usize = 64;

struct MappedRegion {
    base: NonNull<u8>,
    len: usize,
}

unsafe impl Send for MappedRegion {}
unsafe impl Sync for MappedRegion {}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        unsafe { libc::munmap(self.base.as_ptr() as *mut libc::c_void, self.len) };
    }
}

lazy_static! {
    static ref REGISTRY: Mutex<HashMap<String, Arc<MappedRegion>>> = Mutex::new(HashMap::new());
}

/// Anonymous, unnamed-at-the-OS-level shared mapping, registered
/// process-locally under `url`.
#[derive(Debug)]
pub struct AnonymousSharedMemory {
    url: String,
    region: Arc<MappedRegion>,
    payload_size: usize,
    owner: bool,
}

impl AnonymousSharedMemory {
    fn payload_ptr(&self) -> NonNull<u8> {
        unsafe { NonNull::new_unchecked(self.region.base.as_ptr().add(PAYLOAD_OFFSET)) }
    }
}

impl Backend for AnonymousSharedMemory {
    fn create(url: &str, size: usize) -> Result<Self, BackendCreateError> {
        let msg = "Unable to create anonymous shared memory backend";
        if size == 0 {
            fail!(with BackendCreateError::SizeIsZero, "{} since the requested size is zero.", msg);
        }

        let mut registry = REGISTRY.lock().unwrap();
        if registry.contains_key(url) {
            fail!(with BackendCreateError::BackendExists,
                "{} since a backend already exists under \"{}\".", msg, url);
        }

        let mapped_len = PAYLOAD_OFFSET + size;
        let mapped = unsafe {
            libc::mmap(
                core::ptr::null_mut(),
                mapped_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if mapped == libc::MAP_FAILED {
            let err = std::io::Error::last_os_error();
            fail!(with BackendCreateError::OsResourceFailure,
                "{} since mmap failed: {}.", msg, err);
        }

        let base = unsafe { NonNull::new_unchecked(mapped as *mut u8) };
        let header = BackendHeader::new(BackendKind::Anonymous, size as u64);
        unsafe {
            core::ptr::copy_nonoverlapping(
                header.to_bytes().as_ptr(),
                base.as_ptr(),
                BackendHeader::WIRE_SIZE,
            );
        }

        let region = Arc::new(MappedRegion {
            base,
            len: mapped_len,
        });
        registry.insert(url.to_string(), Arc::clone(&region));

        Ok(Self {
            url: url.to_string(),
            region,
            payload_size: size,
            owner: true,
        })
    }

    fn attach(url: &str, min_size: usize) -> Result<Self, BackendAttachError> {
        let msg = "Unable to attach anonymous shared memory backend";
        let registry = REGISTRY.lock().unwrap();
        let region = match registry.get(url) {
            Some(r) => Arc::clone(r),
            None => {
                fail!(with BackendAttachError::BackendNotFound,
                    "{} since no backend exists under \"{}\".", msg, url);
            }
        };
        drop(registry);

        let header_bytes =
            unsafe { core::slice::from_raw_parts(region.base.as_ptr(), BackendHeader::WIRE_SIZE) };
        let header = match BackendHeader::from_bytes(header_bytes) {
            Some(h) if h.is_valid() => h,
            _ => {
                fail!(with BackendAttachError::HeaderInvalid,
                    "{} since the backend header at \"{}\" is invalid.", msg, url);
            }
        };

        if (header.size as usize) < min_size {
            fail!(with BackendAttachError::BackendTooSmall,
                "{} since the backend at \"{}\" has payload size {} but {} was requested.",
                msg, url, header.size, min_size);
        }

        Ok(Self {
            url: url.to_string(),
            region,
            payload_size: header.size as usize,
            owner: false,
        })
    }

    fn base(&self) -> NonNull<u8> {
        self.payload_ptr()
    }

    fn size(&self) -> usize {
        self.payload_size
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn is_owner(&self) -> bool {
        self.owner
    }

    fn destroy(self) -> Result<(), BackendDestroyError> {
        if !self.owner {
            return Err(BackendDestroyError::NotOwner);
        }
        REGISTRY.lock().unwrap().remove(&self.url);
        Ok(())
    }
}
