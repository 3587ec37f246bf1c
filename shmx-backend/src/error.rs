// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle/resource errors for the Memory Backend layer, per §7.

use core::fmt;

/// Failure of [`crate::Backend::create`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BackendCreateError {
    /// A backend already exists under this URL (§4.2).
    BackendExists,
    /// The requested size is zero.
    SizeIsZero,
    /// The underlying OS resource could not be created or sized.
    OsResourceFailure,
}

impl fmt::Display for BackendCreateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackendExists => write!(f, "a backend already exists under that URL"),
            Self::SizeIsZero => write!(f, "requested backend size is zero"),
            Self::OsResourceFailure => {
                write!(f, "the backing OS resource could not be created")
            }
        }
    }
}

impl std::error::Error for BackendCreateError {}

/// Failure of [`crate::Backend::attach`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BackendAttachError {
    /// No backend exists under this URL (§4.2).
    BackendNotFound,
    /// The existing named object is smaller than the caller requested
    /// (§4.2 `BackendTooSmall`).
    BackendTooSmall,
    /// The backend header's magic/version does not match this
    /// implementation.
    HeaderInvalid,
    /// The underlying OS resource could not be mapped.
    OsResourceFailure,
}

impl fmt::Display for BackendAttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackendNotFound => write!(f, "no backend exists under that URL"),
            Self::BackendTooSmall => {
                write!(f, "the existing backend is smaller than requested")
            }
            Self::HeaderInvalid => write!(f, "the backend header is invalid or unrecognised"),
            Self::OsResourceFailure => write!(f, "the backing OS resource could not be mapped"),
        }
    }
}

impl std::error::Error for BackendAttachError {}

/// Failure of [`crate::Backend::destroy`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BackendDestroyError {
    /// Only the creator may destroy a backend (§4.2, "destroy (creator
    /// only)").
    NotOwner,
    /// The OS refused to unlink the named resource.
    UnlinkFailed,
}

impl fmt::Display for BackendDestroyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOwner => write!(f, "only the creator of a backend may destroy it"),
            Self::UnlinkFailed => write!(f, "the backing OS resource could not be unlinked"),
        }
    }
}

impl std::error::Error for BackendDestroyError {}
