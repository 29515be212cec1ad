// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility functions and emulated accelerators shared across different tests.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tessera_cpu::color::Rgba8;
use tessera_cpu::dispatch::{Accelerator, AcceleratorError, DispatchTable, LowLevelIo, OpKind, Ticket};
use tessera_cpu::kernel::SubTask;
use tessera_cpu::tile::{Tile, TileMemory};
use tessera_cpu::{ColourDepth, ColourScheme, Context, PixelBuffer, Point, Region, Settings, Size};

pub(crate) const RED: Rgba8 = Rgba8 {
    r: 255,
    g: 0,
    b: 0,
    a: 255,
};

pub(crate) const WHITE: Rgba8 = Rgba8 {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

pub(crate) fn region(x: i16, y: i16, width: i16, height: i16) -> Region {
    Region::new(Point::new(x, y), Size::new(width, height))
}

/// A zeroed buffer large enough for `width * height` pixels of `scheme`.
pub(crate) fn buffer(width: i16, height: i16, scheme: ColourScheme) -> PixelBuffer {
    PixelBuffer::new(Size::new(width, height).area() * scheme.bytes_per_pixel())
}

pub(crate) fn root<'a>(
    width: i16,
    height: i16,
    scheme: ColourScheme,
    buffer: &'a PixelBuffer,
) -> Tile<'a> {
    Tile::root(Size::new(width, height), scheme, TileMemory::Buffer(buffer)).unwrap()
}

/// A read-only 8-bit mask.
pub(crate) fn const_mask(width: i16, height: i16, data: &[u8]) -> Tile<'_> {
    Tile::root(
        Size::new(width, height),
        ColourScheme::A8,
        TileMemory::Const(data),
    )
    .unwrap()
}

/// Rows of the buffer as pixel words, for easy comparison.
pub(crate) fn rows<P: tessera_cpu::PixelWord>(buffer: &PixelBuffer, width: usize) -> Vec<Vec<P>> {
    buffer
        .to_pixels::<P>()
        .chunks(width)
        .map(<[P]>::to_vec)
        .collect()
}

/// A context that routes one slot to `accelerator`.
pub(crate) fn accelerated_context(
    kind: OpKind,
    depth: ColourDepth,
    accelerator: Arc<dyn Accelerator>,
    rows_per_task: u16,
) -> Context {
    let table = DispatchTable::builder()
        .override_kernel(kind, depth, LowLevelIo::Accelerated(accelerator))
        .build();
    Context::with_dispatch_table(
        table,
        Settings {
            rows_per_task,
            ..Settings::default()
        },
    )
}

/// Emulates a DMA engine: the work is done at submission, but each ticket only reports
/// completion after a number of polls.
#[derive(Debug)]
pub(crate) struct EmulatedDma {
    polls: u32,
    remaining: Mutex<Vec<u32>>,
}

impl EmulatedDma {
    pub(crate) fn new(polls: u32) -> Arc<Self> {
        Arc::new(Self {
            polls,
            remaining: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn submitted(&self) -> usize {
        self.remaining.lock().unwrap().len()
    }
}

impl Accelerator for EmulatedDma {
    fn submit(&self, task: &mut SubTask<'_>) -> Result<Ticket, AcceleratorError> {
        DispatchTable::software(task.kind, task.depth)(task);
        let mut remaining = self.remaining.lock().unwrap();
        remaining.push(self.polls);
        Ok(Ticket(remaining.len() as u64 - 1))
    }

    fn poll(&self, ticket: Ticket) -> Result<bool, AcceleratorError> {
        let mut remaining = self.remaining.lock().unwrap();
        let left = &mut remaining[ticket.0 as usize];
        *left = left.saturating_sub(1);
        Ok(*left == 0)
    }
}

/// Accepts work and never finishes it.
#[derive(Debug, Default)]
pub(crate) struct Stalled;

impl Accelerator for Stalled {
    fn submit(&self, _: &mut SubTask<'_>) -> Result<Ticket, AcceleratorError> {
        Ok(Ticket(0))
    }

    fn poll(&self, _: Ticket) -> Result<bool, AcceleratorError> {
        Ok(false)
    }
}

/// Reports `error` for submissions `skip..skip + times`, and does the work in software
/// otherwise.
#[derive(Debug)]
pub(crate) struct Refusing {
    error: AcceleratorError,
    refused: Range<usize>,
    attempts: AtomicUsize,
}

impl Refusing {
    pub(crate) fn new(error: AcceleratorError, skip: usize, times: usize) -> Arc<Self> {
        Arc::new(Self {
            error,
            refused: skip..skip.saturating_add(times),
            attempts: AtomicUsize::new(0),
        })
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }
}

impl Accelerator for Refusing {
    fn submit(&self, task: &mut SubTask<'_>) -> Result<Ticket, AcceleratorError> {
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed);
        if self.refused.contains(&attempt) {
            return Err(self.error);
        }
        DispatchTable::software(task.kind, task.depth)(task);
        Ok(Ticket(attempt as u64))
    }

    fn poll(&self, _: Ticket) -> Result<bool, AcceleratorError> {
        Ok(true)
    }
}

/// Accepts work, then faults when polled.
#[derive(Debug, Default)]
pub(crate) struct Faulty;

impl Accelerator for Faulty {
    fn submit(&self, _: &mut SubTask<'_>) -> Result<Ticket, AcceleratorError> {
        Ok(Ticket(0))
    }

    fn poll(&self, _: Ticket) -> Result<bool, AcceleratorError> {
        Err(AcceleratorError::Fault)
    }
}
