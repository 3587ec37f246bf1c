// SPDX-License-Identifier: Apache-2.0 OR MIT

//! POSIX named shared mapping (§4.2): backed by a kernel object opened with
//! `shm_open`, sized with `ftruncate`, then `mmap`ped. Grounded in spirit on
//! `iceoryx2-cal`'s `shared_memory::posix`/`dynamic_storage::posix_shared_memory`
//! pair, but talks to `libc` directly rather than through the teacher's
//! `NamedConcept`/`DynamicStorage` machinery: this core only needs
//! create/attach/detach/destroy (§4.2), not the teacher's full
//! named-concept listing and permission surface, which belongs to the
//! CLI/service layer this spec scopes out (§1).

use core::ptr::NonNull;
use std::ffi::CString;

use shmx_log::fail;

use crate::error::{BackendAttachError, BackendCreateError, BackendDestroyError};
use crate::header::{BackendHeader, BackendKind};
use crate::Backend;

/// Payload starts here, rounded up from [`BackendHeader::WIRE_SIZE`] so the
/// allocator header that follows it can itself start 64-byte aligned
/// (§6, "The allocator header begins immediately after, 64-byte aligned").
const PAYLOAD_OFFSET: usize = 64;

fn shm_name(url: &str) -> Result<CString, ()> {
    let name = if url.starts_with('/') {
        url.to_string()
    } else {
        format!("/{url}")
    };
    CString::new(name).map_err(|_| ())
}

/// A POSIX named shared mapping, created and attached by `url` (the name
/// of the kernel shared-memory object).
#[derive(Debug)]
pub struct PosixSharedMemory {
    url: String,
    fd: libc::c_int,
    mapped_base: NonNull<u8>,
    mapped_len: usize,
    payload_size: usize,
    owner: bool,
}

unsafe impl Send for PosixSharedMemory {}
unsafe impl Sync for PosixSharedMemory {}

impl PosixSharedMemory {
    fn payload_ptr(&self) -> NonNull<u8> {
        unsafe { NonNull::new_unchecked(self.mapped_base.as_ptr().add(PAYLOAD_OFFSET)) }
    }
}

impl Backend for PosixSharedMemory {
    fn create(url: &str, size: usize) -> Result<Self, BackendCreateError> {
        let msg = "Unable to create POSIX shared memory backend";
        if size == 0 {
            fail!(with BackendCreateError::SizeIsZero, "{} since the requested size is zero.", msg);
        }

        let name = shm_name(url).map_err(|_| BackendCreateError::OsResourceFailure)?;
        let mapped_len = PAYLOAD_OFFSET + size;

        let fd = unsafe {
            libc::shm_open(
                name.as_ptr(),
                libc::O_CREAT | libc::O_EXCL | libc::O_RDWR,
                0o600,
            )
        };
        if fd < 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EEXIST) {
                fail!(with BackendCreateError::BackendExists,
                    "{} since a backend already exists under \"{}\".", msg, url);
            }
            fail!(with BackendCreateError::OsResourceFailure,
                "{} since shm_open failed for \"{}\": {}.", msg, url, err);
        }

        if unsafe { libc::ftruncate(fd, mapped_len as libc::off_t) } != 0 {
            let err = std::io::Error::last_os_error();
            unsafe {
                libc::close(fd);
                let _ = libc::shm_unlink(name.as_ptr());
            }
            fail!(with BackendCreateError::OsResourceFailure,
                "{} since ftruncate to {} bytes failed: {}.", msg, mapped_len, err);
        }

        let mapped = unsafe {
            libc::mmap(
                core::ptr::null_mut(),
                mapped_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if mapped == libc::MAP_FAILED {
            let err = std::io::Error::last_os_error();
            unsafe {
                libc::close(fd);
                let _ = libc::shm_unlink(name.as_ptr());
            }
            fail!(with BackendCreateError::OsResourceFailure,
                "{} since mmap failed: {}.", msg, err);
        }

        let mapped_base = unsafe { NonNull::new_unchecked(mapped as *mut u8) };
        let header = BackendHeader::new(BackendKind::PosixSharedMemory, size as u64);
        unsafe {
            core::ptr::copy_nonoverlapping(
                header.to_bytes().as_ptr(),
                mapped_base.as_ptr(),
                BackendHeader::WIRE_SIZE,
            );
        }

        Ok(Self {
            url: url.to_string(),
            fd,
            mapped_base,
            mapped_len,
            payload_size: size,
            owner: true,
        })
    }

    fn attach(url: &str, min_size: usize) -> Result<Self, BackendAttachError> {
        let msg = "Unable to attach POSIX shared memory backend";
        let name = shm_name(url).map_err(|_| BackendAttachError::OsResourceFailure)?;

        let fd = unsafe { libc::shm_open(name.as_ptr(), libc::O_RDWR, 0o600) };
        if fd < 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::ENOENT) {
                fail!(with BackendAttachError::BackendNotFound,
                    "{} since no backend exists under \"{}\".", msg, url);
            }
            fail!(with BackendAttachError::OsResourceFailure,
                "{} since shm_open failed for \"{}\": {}.", msg, url, err);
        }

        // Map the header first to learn the real payload size.
        let header_map = unsafe {
            libc::mmap(
                core::ptr::null_mut(),
                PAYLOAD_OFFSET,
                libc::PROT_READ,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if header_map == libc::MAP_FAILED {
            let err = std::io::Error::last_os_error();
            unsafe { libc::close(fd) };
            fail!(with BackendAttachError::OsResourceFailure,
                "{} since mapping the header failed: {}.", msg, err);
        }
        let header_bytes =
            unsafe { core::slice::from_raw_parts(header_map as *const u8, BackendHeader::WIRE_SIZE) };
        let header = BackendHeader::from_bytes(header_bytes);
        unsafe { libc::munmap(header_map, PAYLOAD_OFFSET) };

        let header = match header {
            Some(h) if h.is_valid() => h,
            _ => {
                unsafe { libc::close(fd) };
                fail!(with BackendAttachError::HeaderInvalid,
                    "{} since the backend header at \"{}\" is invalid.", msg, url);
            }
        };

        if (header.size as usize) < min_size {
            unsafe { libc::close(fd) };
            fail!(with BackendAttachError::BackendTooSmall,
                "{} since the backend at \"{}\" has payload size {} but {} was requested.",
                msg, url, header.size, min_size);
        }

        let mapped_len = PAYLOAD_OFFSET + header.size as usize;
        let mapped = unsafe {
            libc::mmap(
                core::ptr::null_mut(),
                mapped_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if mapped == libc::MAP_FAILED {
            let err = std::io::Error::last_os_error();
            unsafe { libc::close(fd) };
            fail!(with BackendAttachError::OsResourceFailure,
                "{} since mmap failed: {}.", msg, err);
        }

        Ok(Self {
            url: url.to_string(),
            fd,
            mapped_base: unsafe { NonNull::new_unchecked(mapped as *mut u8) },
            mapped_len,
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
        let name = shm_name(&self.url).map_err(|_| BackendDestroyError::UnlinkFailed)?;
        let result = unsafe { libc::shm_unlink(name.as_ptr()) };
        if result != 0 {
            return Err(BackendDestroyError::UnlinkFailed);
        }
        Ok(())
    }
}

impl Drop for PosixSharedMemory {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.mapped_base.as_ptr() as *mut libc::c_void, self.mapped_len);
            libc::close(self.fd);
        }
    }
}
