// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate includes the geometry representations, colour schemes, tiles and partial-framebuffer
//! clipping logic shared by [Tessera CPU][tessera_cpu] and accelerator backends.
//!
//! # Usage
//!
//! This crate should not be used on its own; use it together with a renderer such as
//! [Tessera CPU][tessera_cpu], which owns the operation lifecycle and the pixel kernels.
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
//! # Contents
//!
//! - [Points, sizes and regions](geometry), and the clip offset between a valid and a target region
//! - [Colour schemes](colour) and their native pixel encodings
//! - [Tiles](tile): nested, parent-relative views into caller-owned [pixel buffers](buffer)
//! - [Mask formats](mask) accepted by masking operations
//!
//! [tessera_cpu]: https://crates.io/crates/tessera_cpu
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
    reason = "Coordinates are `i16` by design; intersections and offsets of in-range regions \
stay in range, so narrowing back from `i32` is lossless."
)]
#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod buffer;
pub mod colour;
mod error;
pub mod geometry;
pub mod mask;
pub mod tile;

pub use error::Error;
pub use peniko;
pub use peniko::color;
