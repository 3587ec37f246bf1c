// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Size-rounding helpers. Grounded on `hermes_shm::MemoryAlignment`
//! (`AlignTo`/`AlignToPageSize` in `original_source/include/hermes_shm/
//! memory/memory.h`), adapted to take the page size as a parameter instead
//! of reading a global `HERMES_SYSTEM_INFO` singleton.

/// Rounds `size` up to the next multiple of `alignment`. `alignment` must be
/// a power of two.
#[inline]
pub const fn align_up(size: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (size + alignment - 1) & !(alignment - 1)
}

/// Rounds `size` up to the next multiple of the host's page size.
#[inline]
pub fn align_to_page_size(size: usize) -> usize {
    align_up(size, page_size())
}

/// The host's memory page size. Falls back to 4096 if the platform query
/// fails, matching common defaults on every target this crate supports.
#[inline]
pub fn page_size() -> usize {
    #[cfg(unix)]
    {
        let sz = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if sz > 0 {
            return sz as usize;
        }
    }
    4096
}
