// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colour schemes and their native pixel encodings.

use crate::color::Rgba8;
use bytemuck::Pod;
use core::mem::size_of;

/// The size class of a pixel word. Kernels are selected per depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColourDepth {
    /// One byte per pixel.
    Bits8 = 0,
    /// Two bytes per pixel.
    Bits16 = 1,
    /// Four bytes per pixel.
    Bits32 = 2,
}

impl ColourDepth {
    /// The number of colour depths.
    pub const COUNT: usize = 3;

    /// All colour depths, in index order.
    pub const ALL: [Self; Self::COUNT] = [Self::Bits8, Self::Bits16, Self::Bits32];

    /// A dense index, suitable for table lookups.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The size of one pixel in bytes.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bits8 => 1,
            Self::Bits16 => 2,
            Self::Bits32 => 4,
        }
    }

    /// Encode a colour into the native pixel word of this depth.
    ///
    /// - 8 bit: luma, `(77 r + 150 g + 29 b) >> 8`.
    /// - 16 bit: RGB565, red in the top bits.
    /// - 32 bit: `b | g << 8 | r << 16 | a << 24`.
    pub fn encode(self, colour: Rgba8) -> u32 {
        let Rgba8 { r, g, b, a } = colour;
        match self {
            Self::Bits8 => (77 * u32::from(r) + 150 * u32::from(g) + 29 * u32::from(b)) >> 8,
            Self::Bits16 => {
                ((u32::from(r) >> 3) << 11) | ((u32::from(g) >> 2) << 5) | (u32::from(b) >> 3)
            }
            Self::Bits32 => {
                u32::from(b) | (u32::from(g) << 8) | (u32::from(r) << 16) | (u32::from(a) << 24)
            }
        }
    }
}

/// The layout of the pixels in a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ColourScheme {
    /// 8-bit grayscale. Also the layout of 8-bit alpha masks.
    Gray8,
    /// 16-bit RGB565.
    Rgb565,
    /// 32-bit colour with three colour channels and an unused byte.
    #[default]
    Cccn888,
    /// 32-bit colour with three colour channels and an alpha channel.
    Ccca8888,
    /// One 8-bit channel inside a 32-bit word, selected by its byte index.
    Channel8in32 {
        /// The byte index of the channel, `0..4`.
        channel: u8,
    },
}

impl ColourScheme {
    /// The layout of 8-bit alpha masks.
    pub const A8: Self = Self::Gray8;

    /// The depth of a pixel in this scheme.
    pub const fn depth(self) -> ColourDepth {
        match self {
            Self::Gray8 => ColourDepth::Bits8,
            Self::Rgb565 => ColourDepth::Bits16,
            Self::Cccn888 | Self::Ccca8888 | Self::Channel8in32 { .. } => ColourDepth::Bits32,
        }
    }

    /// The size of one pixel in bytes.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self.depth().bytes_per_pixel()
    }
}

/// A native pixel word: `u8`, `u16` or `u32`.
///
/// Pixel buffers are plain bytes without alignment guarantees, so words are always read and
/// written unaligned in native byte order.
pub trait PixelWord: Pod {
    /// The depth this word encodes.
    const DEPTH: ColourDepth;

    /// The size of the word in bytes.
    const BYTES: usize = size_of::<Self>();

    /// Truncate a native colour value to this word.
    fn from_native(value: u32) -> Self;

    /// Widen this word to a native colour value.
    fn to_native(self) -> u32;

    /// Read a word from the start of `bytes`.
    #[inline(always)]
    fn read(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(&bytes[..Self::BYTES])
    }

    /// Write the word to the start of `bytes`.
    #[inline(always)]
    fn write(self, bytes: &mut [u8]) {
        bytes[..Self::BYTES].copy_from_slice(bytemuck::bytes_of(&self));
    }
}

impl PixelWord for u8 {
    const DEPTH: ColourDepth = ColourDepth::Bits8;

    #[inline(always)]
    fn from_native(value: u32) -> Self {
        value as Self
    }

    #[inline(always)]
    fn to_native(self) -> u32 {
        self.into()
    }
}

impl PixelWord for u16 {
    const DEPTH: ColourDepth = ColourDepth::Bits16;

    #[inline(always)]
    fn from_native(value: u32) -> Self {
        value as Self
    }

    #[inline(always)]
    fn to_native(self) -> u32 {
        self.into()
    }
}

impl PixelWord for u32 {
    const DEPTH: ColourDepth = ColourDepth::Bits32;

    #[inline(always)]
    fn from_native(value: u32) -> Self {
        value
    }

    #[inline(always)]
    fn to_native(self) -> u32 {
        self
    }
}
