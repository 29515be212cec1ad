// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate implements a 2D compositing engine for memory-constrained devices: colour fills,
//! masked fills and channel fills against caller-owned pixel buffers.
//!
//! Every drawing call goes through the same protocol. The caller owns an [`Operation`], one per
//! call site. A call validates its inputs, acquires the operation, splits the work into
//! sub-tasks and routes each of them through a [`DispatchTable`] to either a software kernel or
//! an [`Accelerator`]. The result is a three-valued [`Status`]:
//!
//! - [`Status::Complete`]: everything was drawn before the call returned.
//! - [`Status::Pending`]: an accelerator is still working; call [`Operation::poll`] later.
//! - [`Status::Ongoing`]: the operation (or the accelerator) was busy; retry the call later.
//!
//! Since the same call site works against software kernels and accelerators alike, callers
//! usually only distinguish "complete" from "not yet".
//!
//! ```
//! use tessera_cpu::color::Rgba8;
//! use tessera_cpu::tile::{Tile, TileMemory};
//! use tessera_cpu::{ColourScheme, Context, PixelBuffer, Size};
//!
//! let buffer = PixelBuffer::new(8 * 8 * 4);
//! let screen =
//!     Tile::root(Size::new(8, 8), ColourScheme::Cccn888, TileMemory::Buffer(&buffer)).unwrap();
//!
//! let mut ctx = Context::new();
//! let red = Rgba8 { r: 255, g: 0, b: 0, a: 255 };
//! let status = ctx.fill_colour(&screen, None, red).unwrap();
//!
//! assert!(status.is_complete());
//! assert_eq!(screen.pixel::<u32>(Default::default()), Some(0xFFFF_0000));
//! ```
//!
//! Partial framebuffers are described with [`Tile::virtual_screen`](tile::Tile::virtual_screen):
//! drawing calls use screen coordinates and only the part backed by memory is touched.
//!
//! # Features
//!
//! - `std` (enabled by default): Build `peniko` (and the error types) against the standard
//!   library.
//! - `libm`: Build `peniko` without the standard library, using [libm][] for its floating point
//!   functions. Tessera itself only uses integer arithmetic.
//!
//! At least one of `std` and `libm` is required; `std` overrides `libm`.
//!
//! [libm]: https://crates.io/crates/libm
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![expect(
    clippy::cast_possible_truncation,
    reason = "We cast u16s to u8 in various places where we know for sure that it's < 256"
)]
#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod context;
pub mod dispatch;
mod error;
pub mod kernel;
mod op;
mod scheduler;
mod util;

pub use context::{Context, Settings};
pub use dispatch::{Accelerator, AcceleratorError, DispatchTable, LowLevelIo, OpKind, Ticket};
pub use error::{Error, Status};
pub use op::{
    ChannelMode, Operation, fill_channel_with_horizontal_line_mask,
    fill_channel_with_vertical_line_mask, fill_colour, fill_colour_with_horizontal_line_mask,
    fill_colour_with_horizontal_line_mask_and_opacity, fill_colour_with_mask,
    fill_colour_with_mask_and_opacity, fill_colour_with_opacity,
    fill_colour_with_vertical_line_mask, fill_colour_with_vertical_line_mask_and_opacity,
};
pub use tessera_common::buffer::PixelBuffer;
pub use tessera_common::colour::{ColourDepth, ColourScheme, PixelWord};
pub use tessera_common::geometry::{Point, Region, Size};
pub use tessera_common::mask::MaskSampling;
pub use tessera_common::{color, peniko, tile};
