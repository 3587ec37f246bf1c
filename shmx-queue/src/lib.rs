// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The MPSC Pointer Queue (§4.9, component C9): a bounded lock-free ring
//! over an allocator's window, carrying scalars or [`shmx_pointer::Pointer`]
//! values, used as this workspace's concurrency exemplar — the one
//! container whose correctness genuinely depends on the atomic-ordering
//! contract the Allocator Interface and Pointer Model set up.

mod error;
mod markbit;
mod payload;
mod queue;
mod ticket;

pub use error::QueueError;
pub use payload::QueuePayload;
pub use queue::MpscPointerQueue;
pub use ticket::Ticket;
