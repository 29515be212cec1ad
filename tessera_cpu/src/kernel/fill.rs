// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Blend, SubTask};

/// Fill the copy rectangle with the colour, blended with the opacity.
pub fn fill_colour<P: Blend>(task: &mut SubTask<'_>) {
    let Some((width, height)) = task.extent() else {
        return;
    };
    let colour = P::from_native(task.params.colour);
    let opacity = task.params.opacity;
    let target = &mut task.target;

    if opacity == 255 {
        let pattern = bytemuck::bytes_of(&colour);
        for y in 0..height {
            for px in target.row_mut::<P>(y, width).chunks_exact_mut(P::BYTES) {
                px.copy_from_slice(pattern);
            }
        }
    } else {
        for y in 0..height {
            for px in target.row_mut::<P>(y, width).chunks_exact_mut(P::BYTES) {
                P::blend(colour, P::read(px), opacity).write(px);
            }
        }
    }
}
