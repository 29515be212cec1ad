// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Blend, SubTask};
use crate::util::scale_alpha;

/// Blend the colour into the copy rectangle, weighted per pixel by the mask and by the opacity.
pub fn fill_colour_with_mask<P: Blend>(task: &mut SubTask<'_>) {
    let Some((width, height)) = task.extent() else {
        return;
    };
    let Some(source) = task.source else {
        return;
    };
    let colour = P::from_native(task.params.colour);
    let opacity = task.params.opacity;
    let offset = task.target.offset();
    let (ox, oy) = (offset.x as usize, offset.y as usize);
    let target = &mut task.target;

    for y in 0..height {
        let row = target.row_mut::<P>(y, width);
        for (x, px) in row.chunks_exact_mut(P::BYTES).enumerate() {
            let mask = source.sample(x + ox, y + oy);
            let alpha = if opacity == 255 {
                mask
            } else {
                scale_alpha(mask, opacity)
            };

            match alpha {
                0 => {}
                255 => colour.write(px),
                alpha => P::blend(colour, P::read(px), alpha).write(px),
            }
        }
    }
}
