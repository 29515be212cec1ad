// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software pixel kernels and the sub-task they consume.
//!
//! A kernel processes one [`SubTask`]: a band of the valid region, already clipped, with the
//! target bytes starting at the band's top-left pixel. Kernels never allocate and never look
//! outside the copy size. Accelerators receive the same sub-tasks, so an accelerator can hand
//! work it cannot do back to these kernels.

mod channel;
mod fill;
mod mask;

use crate::dispatch::OpKind;
use crate::util::blend_channel;
use tessera_common::colour::{ColourDepth, PixelWord};
use tessera_common::geometry::{Point, Region, Size, compute_clip_offset};
use tessera_common::mask::{MaskFormat, MaskSampling};

pub use channel::fill_channel;
pub use fill::fill_colour;
pub use mask::fill_colour_with_mask;

/// A software kernel.
pub type KernelFn = fn(&mut SubTask<'_>);

/// The non-tile parameters of a call, copied into the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Params {
    /// The fill colour, encoded for the target depth.
    pub colour: u32,
    /// The opacity of the fill, 255 is opaque.
    pub opacity: u8,
    /// For channel fills, the byte of the target pixel that receives the mask value.
    pub channel: u8,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            colour: 0,
            opacity: 255,
            channel: 0,
        }
    }
}

/// The mask of a sub-task.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    /// The mask pixels, starting at the top-left pixel of the mask tile.
    pub bytes: &'a [u8],
    /// The distance between two mask rows, in pixels.
    pub stride: usize,
    /// The size of the mask tile.
    pub size: Size,
    /// Where the mask value sits inside a mask pixel.
    pub format: MaskFormat,
    /// How the mask is mapped onto the target region.
    pub sampling: MaskSampling,
}

impl Source<'_> {
    /// The mask value for the pixel at `(x, y)`, relative to the target region.
    #[inline(always)]
    pub fn sample(&self, x: usize, y: usize) -> u8 {
        let (mx, my) = match self.sampling {
            MaskSampling::Full => (x, y),
            MaskSampling::HorizontalLine => (x % self.size.width as usize, 0),
            MaskSampling::VerticalLine => (0, y % self.size.height as usize),
        };
        let index = (my * self.stride + mx) * self.format.bytes_per_pixel + self.format.channel;
        self.bytes[index]
    }
}

/// The target of a sub-task.
#[derive(Debug)]
pub struct Target<'a> {
    /// The target pixels, starting at the top-left pixel of `valid_region`.
    pub bytes: &'a mut [u8],
    /// The distance between two rows of the target, in pixels.
    pub stride: usize,
    /// The part of the target region this sub-task covers.
    pub valid_region: Region,
    /// The region the call draws into.
    pub target_region: Region,
}

impl Target<'_> {
    /// The bytes of row `y` of the valid region, `width` pixels wide.
    #[inline(always)]
    pub fn row_mut<P: PixelWord>(&mut self, y: usize, width: usize) -> &mut [u8] {
        let start = y * self.stride * P::BYTES;
        &mut self.bytes[start..start + width * P::BYTES]
    }

    /// The location of the valid region relative to the target region.
    #[inline]
    pub fn offset(&self) -> Point {
        compute_clip_offset(&self.valid_region, &self.target_region)
    }
}

/// One unit of dispatched work.
#[derive(Debug)]
pub struct SubTask<'a> {
    /// The operation being performed.
    pub kind: OpKind,
    /// The depth of the target pixels.
    pub depth: ColourDepth,
    /// The parameters of the call.
    pub params: Params,
    /// The mask, for operations that take one.
    pub source: Option<Source<'a>>,
    /// Where to draw.
    pub target: Target<'a>,
    /// The number of columns and rows to process.
    pub copy_size: Size,
}

impl SubTask<'_> {
    /// The copy size as unsigned column and row counts, `None` if it is empty.
    #[inline]
    pub(crate) fn extent(&self) -> Option<(usize, usize)> {
        if self.copy_size.is_empty() {
            return None;
        }
        Some((
            self.copy_size.width as usize,
            self.copy_size.height as usize,
        ))
    }
}

/// Blending of native pixel words.
pub trait Blend: PixelWord {
    /// Blend `src` over `dst` with the given alpha, channel by channel:
    /// `(src * alpha + dst * (255 - alpha)) / 255`.
    fn blend(src: Self, dst: Self, alpha: u8) -> Self;
}

impl Blend for u8 {
    #[inline(always)]
    fn blend(src: Self, dst: Self, alpha: u8) -> Self {
        blend_channel(src.into(), dst.into(), alpha) as Self
    }
}

impl Blend for u16 {
    /// RGB565 fields are blended at their native width.
    #[inline(always)]
    fn blend(src: Self, dst: Self, alpha: u8) -> Self {
        let r = blend_channel(src >> 11, dst >> 11, alpha);
        let g = blend_channel((src >> 5) & 0x3F, (dst >> 5) & 0x3F, alpha);
        let b = blend_channel(src & 0x1F, dst & 0x1F, alpha);
        (r << 11) | (g << 5) | b
    }
}

impl Blend for u32 {
    /// The three colour bytes are blended, the fourth byte of `dst` is kept.
    #[inline(always)]
    fn blend(src: Self, dst: Self, alpha: u8) -> Self {
        let mut out = dst & 0xFF00_0000;
        for shift in [0, 8, 16] {
            let s = ((src >> shift) & 0xFF) as u16;
            let d = ((dst >> shift) & 0xFF) as u16;
            out |= u32::from(blend_channel(s, d, alpha)) << shift;
        }
        out
    }
}
