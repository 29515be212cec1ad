// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use tessera_common::colour::{ColourDepth, ColourScheme};
use thiserror::Error;

/// Errors returned by drawing calls.
///
/// Apart from [`Error::BackendFault`], an error is returned before the operation is acquired:
/// the operation is left untouched and no pixel is written.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The target tile has no pixel memory.
    #[error("Target tile has no pixel memory")]
    MissingTarget,
    /// The target tile refers to read-only memory.
    #[error("Target tile refers to read-only memory")]
    ReadOnlyTarget,
    /// The target tile uses a colour scheme that cannot be drawn into.
    #[error("Cannot draw into a {0:?} tile")]
    UnsupportedTarget(ColourScheme),
    /// The mask tile has no pixel memory.
    #[error("Mask tile has no pixel memory")]
    MissingMask,
    /// The mask uses a colour scheme the operation does not accept.
    #[error("Mask colour scheme {0:?} is not accepted by this operation")]
    UnsupportedMask(ColourScheme),
    /// The mask tile covers no pixel.
    #[error("Mask tile is empty")]
    EmptyMask,
    /// Part of the mask tile lies outside the memory behind it, e.g. outside the valid region
    /// of a partial framebuffer.
    #[error("Mask tile is not fully backed by memory")]
    MaskNotBacked,
    /// The mask and the target refer to the same pixel buffer.
    #[error("Mask and target share a pixel buffer")]
    AliasedBuffers,
    /// A pixel buffer the call needs is borrowed elsewhere.
    #[error("Pixel buffer is borrowed elsewhere")]
    BufferInUse,
    /// The selected channel does not exist in pixels of the target depth.
    #[error("Channel {channel} does not exist in {depth:?} pixels")]
    InvalidChannel {
        /// The requested byte index.
        channel: u8,
        /// The depth of the target.
        depth: ColourDepth,
    },
    /// An accelerator reported a fault. The operation was released and its outstanding work
    /// dropped.
    #[error("Accelerator fault")]
    BackendFault,
}

pub(crate) type Result<T, E = Error> = core::result::Result<T, E>;

/// The outcome of a drawing call or a poll.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// All work has finished and the operation has been released.
    Complete,
    /// Work was handed to an accelerator; poll the operation until it completes.
    Pending,
    /// The operation or accelerator was busy, or work is still in flight; try again later.
    Ongoing,
}

impl Status {
    /// Whether all work has finished.
    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}
