// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer helpers shared by the kernels.

/// Perform an approximate division by 255.
///
/// This is cheaper than a real division, and the kernels only need the following properties:
/// - The result is the ceiling of `val / 256`.
/// - Values divisible by 255 are divided exactly, so `div_255(x * 255) == x`. Blending with an
///   alpha of 0 or 255 therefore reproduces the destination or the source exactly.
/// - If there is a discrepancy, the result is 1 higher than the exact quotient.
/// - This holds for values of `val` up to and including `65279`. You should not call this
///   function with higher values.
#[inline(always)]
pub(crate) const fn div_255(val: u16) -> u16 {
    debug_assert!(
        val < 65280,
        "the properties of `div_255` do not hold for values of `65280` or greater"
    );
    (val + 255) >> 8
}

/// Scale an 8-bit mask value by an 8-bit opacity.
#[inline(always)]
pub(crate) const fn scale_alpha(mask: u8, opacity: u8) -> u8 {
    div_255(mask as u16 * opacity as u16) as u8
}

/// Blend two channel values of up to 8 bits: `(src * alpha + dst * (255 - alpha)) / 255`.
#[inline(always)]
pub(crate) const fn blend_channel(src: u16, dst: u16, alpha: u8) -> u16 {
    let alpha = alpha as u16;
    div_255(src * alpha + dst * (255 - alpha))
}
