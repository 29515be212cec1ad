// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::colour::{ColourDepth, ColourScheme};
use crate::geometry::{Region, Size};
use crate::tile::MAX_TILE_DEPTH;
use thiserror::Error;

/// Errors that can occur while describing tiles.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The memory handed to a root tile is shorter than `width * height * bytes_per_pixel`.
    #[error("Buffer holds {actual} bytes but the tile needs {required}")]
    BufferTooSmall {
        /// Bytes the tile needs.
        required: usize,
        /// Bytes the buffer holds.
        actual: usize,
    },
    /// A tile was given a negative size.
    #[error("Invalid tile size {0:?}")]
    InvalidSize(Size),
    /// A child region does not lie within the frame of its parent.
    #[error("Child region {0:?} does not lie within its parent")]
    ChildOutOfBounds(Region),
    /// The parent chain would exceed [`MAX_TILE_DEPTH`].
    #[error("Tile nesting exceeds {} levels", MAX_TILE_DEPTH)]
    TileTooDeep,
    /// A tile was reinterpreted with a colour scheme of another depth.
    #[error("Colour scheme {scheme:?} does not match the tile depth {expected:?}")]
    SchemeDepthMismatch {
        /// The requested scheme.
        scheme: ColourScheme,
        /// The depth of the tile's pixels.
        expected: ColourDepth,
    },
}
