// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `Ticket` — the queue's `qtok` (§4.9, §11 supplement: the original's
//! `qtok_t`). A monotonically increasing 64-bit identifier returned by
//! `enqueue`/`dequeue` so callers can correlate the two without inspecting
//! payloads; `~0` is null, matching `shmx_pointer::OffsetPointer::NULL`.

use core::fmt;

#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub const NULL: Ticket = Ticket(u64::MAX);

    #[inline]
    pub(crate) const fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == u64::MAX
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Ticket(null)")
        } else {
            write!(f, "Ticket({})", self.0)
        }
    }
}

impl Default for Ticket {
    fn default() -> Self {
        Self::NULL
    }
}
