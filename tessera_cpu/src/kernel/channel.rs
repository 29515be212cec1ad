// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::SubTask;
use tessera_common::colour::PixelWord;

/// Copy the mask into one channel of the target.
///
/// Every written pixel holds the mask value in the byte selected by `params.channel` and zero
/// in all other bytes. The previous contents of the target are not read. Values are copied as
/// is, without rounding or saturation.
pub fn fill_channel<P: PixelWord>(task: &mut SubTask<'_>) {
    let Some((width, height)) = task.extent() else {
        return;
    };
    let Some(source) = task.source else {
        return;
    };
    let shift = 8 * u32::from(task.params.channel);
    debug_assert!((shift as usize) < 8 * P::BYTES, "channel outside the pixel word");

    let offset = task.target.offset();
    let (ox, oy) = (offset.x as usize, offset.y as usize);
    let target = &mut task.target;

    for y in 0..height {
        let row = target.row_mut::<P>(y, width);
        for (x, px) in row.chunks_exact_mut(P::BYTES).enumerate() {
            let value = source.sample(x + ox, y + oy);
            P::from_native(u32::from(value) << shift).write(px);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fill_channel;
    use crate::dispatch::OpKind;
    use crate::kernel::{Params, Source, SubTask, Target};
    use tessera_common::colour::{ColourDepth, PixelWord};
    use tessera_common::geometry::{Point, Region, Size};
    use tessera_common::mask::{MaskFormat, MaskSampling};

    #[test]
    fn reads_the_selected_mask_channel() {
        // Two 8-in-32 mask pixels, the mask value sits in byte 2.
        let mask = [1_u8, 2, 200, 4, 5, 6, 7, 8];
        let mut bytes = [0xFF_u8; 8];
        let region = Region::new(Point::ZERO, Size::new(2, 1));

        let mut task = SubTask {
            kind: OpKind::FillChannelWithMask,
            depth: ColourDepth::Bits32,
            params: Params {
                channel: 1,
                ..Params::default()
            },
            source: Some(Source {
                bytes: &mask,
                stride: 2,
                size: Size::new(2, 1),
                format: MaskFormat {
                    bytes_per_pixel: 4,
                    channel: 2,
                },
                sampling: MaskSampling::HorizontalLine,
            }),
            target: Target {
                bytes: &mut bytes,
                stride: 2,
                valid_region: region,
                target_region: region,
            },
            copy_size: region.size,
        };
        fill_channel::<u32>(&mut task);

        assert_eq!(u32::read(&bytes[..4]), 200 << 8);
        assert_eq!(u32::read(&bytes[4..]), 7 << 8);
    }
}
