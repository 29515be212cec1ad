// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Splitting of a call into sub-tasks.

use crate::Settings;
use crate::dispatch::{Accelerator, AcceleratorError, DispatchTable, LowLevelIo, OpKind, Ticket};
use crate::error::{Error, Result, Status};
use crate::kernel::{Params, Source, SubTask, Target};
use alloc::sync::Arc;
use smallvec::SmallVec;
use tessera_common::colour::ColourDepth;
use tessera_common::geometry::{Point, Region, Size};

/// Work handed to an accelerator that has not been observed to finish.
#[derive(Debug)]
pub(crate) struct InFlight {
    pub(crate) accelerator: Arc<dyn Accelerator>,
    pub(crate) ticket: Ticket,
}

pub(crate) type InFlightList = SmallVec<[InFlight; 4]>;

/// A resolved call, ready to be cut into sub-tasks.
pub(crate) struct Job<'a> {
    pub(crate) kind: OpKind,
    pub(crate) depth: ColourDepth,
    pub(crate) params: Params,
    pub(crate) source: Option<Source<'a>>,
    /// The target pixels, starting at the top-left pixel of `valid`.
    pub(crate) target: &'a mut [u8],
    /// In pixels.
    pub(crate) stride: usize,
    pub(crate) valid: Region,
    pub(crate) target_region: Region,
}

/// Cut the valid region into bands of rows and dispatch them in order.
///
/// Returns `Pending` if any band went to an accelerator, and `Ongoing` if the accelerator was
/// busy before anything was written.
pub(crate) fn schedule(
    table: &DispatchTable,
    settings: &Settings,
    job: Job<'_>,
    in_flight: &mut InFlightList,
) -> Result<Status> {
    let Job {
        kind,
        depth,
        params,
        source,
        target,
        stride,
        valid,
        target_region,
    } = job;

    let height = valid.size.height;
    let band_height = match settings.rows_per_task {
        0 => height,
        rows => height.min(rows.min(i16::MAX as u16) as i16),
    };
    let row_bytes = stride * depth.bytes_per_pixel();
    let io = table.get(kind, depth);

    let mut remaining = target;
    let mut row = 0;
    let mut band = 0_usize;

    while row < height {
        let rows = band_height.min(height - row);
        let band_region = Region::new(
            Point::new(valid.location.x, valid.location.y + row),
            Size::new(valid.size.width, rows),
        );
        let split = (rows as usize * row_bytes).min(remaining.len());
        let (bytes, rest) = core::mem::take(&mut remaining).split_at_mut(split);
        remaining = rest;

        let mut task = SubTask {
            kind,
            depth,
            params,
            source,
            target: Target {
                bytes,
                stride,
                valid_region: band_region,
                target_region,
            },
            copy_size: band_region.size,
        };
        log::trace!("sub-task {band} of {kind:?} at {depth:?}: {band_region:?}");

        match io {
            LowLevelIo::Software(kernel) => kernel(&mut task),
            LowLevelIo::Accelerated(accelerator) => match accelerator.submit(&mut task) {
                Ok(ticket) => in_flight.push(InFlight {
                    accelerator: Arc::clone(accelerator),
                    ticket,
                }),
                Err(AcceleratorError::Busy) if band == 0 => {
                    log::debug!("accelerator busy, {kind:?} not started");
                    return Ok(Status::Ongoing);
                }
                Err(AcceleratorError::Fault) => {
                    log::warn!("accelerator fault while submitting {kind:?}");
                    return Err(Error::BackendFault);
                }
                Err(err) => {
                    log::debug!("{err}, running sub-task {band} of {kind:?} in software");
                    DispatchTable::software(kind, depth)(&mut task);
                }
            },
        }

        row += rows;
        band += 1;
    }

    Ok(if in_flight.is_empty() {
        Status::Complete
    } else {
        Status::Pending
    })
}
