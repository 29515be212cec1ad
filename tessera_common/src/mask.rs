// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mask layouts and how masks are sampled.

use crate::colour::ColourScheme;

/// How a mask tile is mapped onto the target region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MaskSampling {
    /// The mask covers the target region pixel for pixel, anchored at its top-left corner.
    #[default]
    Full,
    /// The first row of the mask is sampled along the x axis, repeating every `width` pixels,
    /// and reused for every row of the target region.
    HorizontalLine,
    /// The first column of the mask is sampled along the y axis, repeating every `height`
    /// pixels, and reused for every column of the target region.
    VerticalLine,
}

/// The byte layout of one mask pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskFormat {
    /// The size of one mask pixel in bytes.
    pub bytes_per_pixel: usize,
    /// The byte index of the 8-bit channel holding the mask value.
    pub channel: usize,
}

impl MaskFormat {
    /// The mask format of a colour scheme, if pixels of that scheme can act as a mask.
    pub fn of(scheme: ColourScheme) -> Option<Self> {
        match scheme {
            ColourScheme::Gray8 => Some(Self {
                bytes_per_pixel: 1,
                channel: 0,
            }),
            ColourScheme::Channel8in32 { channel } if channel < 4 => Some(Self {
                bytes_per_pixel: 4,
                channel: channel.into(),
            }),
            _ => None,
        }
    }
}

/// The set of mask layouts an operation accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MaskAllow {
    /// Accept 8-bit alpha masks.
    pub a8: bool,
    /// Accept one 8-bit channel inside 32-bit words.
    pub channel_8in32: bool,
}

impl MaskAllow {
    /// Accept nothing.
    pub const NONE: Self = Self {
        a8: false,
        channel_8in32: false,
    };

    /// Accept 8-bit alpha masks only.
    pub const A8: Self = Self {
        a8: true,
        channel_8in32: false,
    };

    /// Accept 8-bit alpha masks and 8-in-32 channel masks.
    pub const A8_AND_8IN32: Self = Self {
        a8: true,
        channel_8in32: true,
    };

    /// Restrict the set to what the platform supports.
    ///
    /// 8-in-32 masks need extended channel access.
    pub fn with_channel_access(self, enabled: bool) -> Self {
        Self {
            channel_8in32: self.channel_8in32 && enabled,
            ..self
        }
    }

    /// Whether a mask of the given scheme is accepted.
    pub fn permits(&self, scheme: ColourScheme) -> bool {
        match scheme {
            ColourScheme::Gray8 => self.a8,
            ColourScheme::Channel8in32 { channel } => self.channel_8in32 && channel < 4,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list() {
        let allow = MaskAllow::A8_AND_8IN32;

        assert!(allow.permits(ColourScheme::A8));
        assert!(allow.permits(ColourScheme::Channel8in32 { channel: 3 }));
        assert!(!allow.permits(ColourScheme::Channel8in32 { channel: 4 }));
        assert!(!allow.permits(ColourScheme::Rgb565));
        assert!(!allow.permits(ColourScheme::Cccn888));

        let restricted = allow.with_channel_access(false);
        assert!(restricted.permits(ColourScheme::A8));
        assert!(!restricted.permits(ColourScheme::Channel8in32 { channel: 0 }));
    }

    #[test]
    fn formats() {
        assert_eq!(
            MaskFormat::of(ColourScheme::Channel8in32 { channel: 2 }),
            Some(MaskFormat {
                bytes_per_pixel: 4,
                channel: 2
            })
        );
        assert_eq!(MaskFormat::of(ColourScheme::Rgb565), None);
    }
}
