// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Operation instances and the drawing calls.

use crate::Context;
use crate::context::Settings;
use crate::dispatch::{DispatchTable, OpDescriptor, OpKind};
use crate::error::{Error, Result, Status};
use crate::kernel::{Params, Source};
use crate::scheduler::{self, InFlightList, Job};
use core::cell::Ref;
use core::sync::atomic::{AtomicBool, Ordering};
use tessera_common::buffer::PixelBuffer;
use tessera_common::color::Rgba8;
use tessera_common::colour::ColourScheme;
use tessera_common::geometry::Region;
use tessera_common::mask::{MaskFormat, MaskSampling};
use tessera_common::tile::{Tile, TileMemory};

/// Selects the channel a channel fill writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChannelMode {
    /// The byte index of the channel inside the target pixel word.
    pub channel: u8,
}

impl ChannelMode {
    /// The alpha byte of 32-bit pixels.
    pub const ALPHA_8888: Self = Self { channel: 3 };

    /// Write the given byte of the target pixel word.
    pub const fn new(channel: u8) -> Self {
        Self { channel }
    }
}

/// The persistent state of one drawing call site.
///
/// An operation runs one call at a time. While a call is in flight the operation is
/// *acquired*: further calls return [`Status::Ongoing`] without doing anything, until
/// [`poll`](Self::poll) observes that all outstanding work has finished.
///
/// An operation that is never polled again stays acquired for good.
#[derive(Debug, Default)]
pub struct Operation {
    acquired: AtomicBool,
    descriptor: Option<&'static OpDescriptor>,
    params: Params,
    in_flight: InFlightList,
}

impl Operation {
    /// Create an idle operation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the operation. Returns `false`, without changing anything, if it is
    /// already taken.
    pub fn acquire(&self) -> bool {
        self.acquired
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Give the operation back.
    pub fn release(&self) {
        self.acquired.store(false, Ordering::Release);
    }

    /// Whether the operation is acquired.
    pub fn is_busy(&self) -> bool {
        self.acquired.load(Ordering::Acquire)
    }

    /// The kind of the last call that was started.
    pub fn kind(&self) -> Option<OpKind> {
        self.descriptor.map(|d| d.kind)
    }

    /// The parameters of the last call that was started.
    pub fn params(&self) -> Params {
        self.params
    }

    /// Check on outstanding accelerator work.
    ///
    /// Returns [`Status::Complete`] and releases the operation once every sub-task has
    /// finished, [`Status::Ongoing`] otherwise. Sub-tasks are checked in submission order.
    pub fn poll(&mut self) -> Result<Status> {
        if !self.is_busy() {
            return Ok(Status::Complete);
        }
        if self.in_flight.is_empty() {
            // Acquired by hand, nothing to drive.
            return Ok(Status::Ongoing);
        }

        while let Some(first) = self.in_flight.first() {
            match first.accelerator.poll(first.ticket) {
                Ok(true) => {
                    self.in_flight.remove(0);
                }
                Ok(false) => return Ok(Status::Ongoing),
                Err(err) => {
                    log::warn!("{err} while polling {:?}", self.kind());
                    self.in_flight.clear();
                    self.release();
                    return Err(Error::BackendFault);
                }
            }
        }

        self.release();
        Ok(Status::Complete)
    }

    /// Poll until all outstanding work has finished.
    ///
    /// This spins forever on an operation that was acquired by hand and never released.
    pub fn wait_async(&mut self) -> Result<()> {
        loop {
            if self.poll()?.is_complete() {
                return Ok(());
            }
            core::hint::spin_loop();
        }
    }

    pub(crate) fn invoke(
        &mut self,
        table: &DispatchTable,
        settings: &Settings,
        request: Request<'_, '_>,
    ) -> Result<Status> {
        let kind = request.kind;
        let checked = check(settings, &request)
            .inspect_err(|err| log::warn!("rejected {kind:?}: {err}"))?;

        // Borrow first, so that a buffer in use elsewhere rejects the call before it starts.
        let mut target_bytes = checked
            .target
            .try_bytes_mut()
            .map_err(|_| Error::BufferInUse)?;
        let mask_bytes = match checked.mask {
            Some(checked_mask) => Some(MaskBytes::borrow(checked_mask.memory)?),
            None => None,
        };

        if !self.acquire() {
            log::debug!("{kind:?} is still in flight");
            return Ok(Status::Ongoing);
        }
        let depth = checked.scheme.depth();
        let params = Params {
            colour: depth.encode(request.colour),
            ..request.params
        };
        self.descriptor = Some(kind.descriptor());
        self.params = params;

        let mut region = request
            .region
            .copied()
            .unwrap_or_else(|| request.target.frame_extent());
        if let Some(mask) = &request.mask {
            if mask.sampling == MaskSampling::Full {
                region.size = region.size.min(mask.tile.size());
            }
        }

        let Some(placement) = request.target.place(&region) else {
            log::trace!("{kind:?} on {region:?} covers nothing");
            self.release();
            return Ok(Status::Complete);
        };

        let source = match (&request.mask, &checked.mask, &mask_bytes) {
            (Some(mask), Some(checked_mask), Some(bytes)) => {
                let window = mask.tile.window();
                let start = (window.origin.y as usize * window.stride + window.origin.x as usize)
                    * checked_mask.format.bytes_per_pixel;
                Some(Source {
                    bytes: &bytes.as_slice()[start..],
                    stride: window.stride,
                    size: window.size,
                    format: checked_mask.format,
                    sampling: mask.sampling,
                })
            }
            _ => None,
        };

        let start = {
            let pos = placement.valid.location - placement.origin;
            (pos.y as usize * placement.stride + pos.x as usize) * depth.bytes_per_pixel()
        };
        let job = Job {
            kind,
            depth,
            params,
            source,
            target: &mut target_bytes[start..],
            stride: placement.stride,
            valid: placement.valid,
            target_region: placement.target,
        };

        let status = scheduler::schedule(table, settings, job, &mut self.in_flight);
        match status {
            Ok(Status::Pending) => {}
            Ok(_) => self.release(),
            Err(_) => {
                self.in_flight.clear();
                self.release();
            }
        }
        status
    }
}

/// One drawing call, before validation.
pub(crate) struct Request<'t, 'a> {
    kind: OpKind,
    target: &'t Tile<'a>,
    region: Option<&'t Region>,
    mask: Option<MaskInput<'t, 'a>>,
    /// Encoded for the target depth once the request is checked.
    colour: Rgba8,
    params: Params,
}

struct MaskInput<'t, 'a> {
    tile: &'t Tile<'a>,
    sampling: MaskSampling,
}

impl<'t, 'a> Request<'t, 'a> {
    pub(crate) fn fill_colour(
        target: &'t Tile<'a>,
        region: Option<&'t Region>,
        colour: Rgba8,
        opacity: u8,
    ) -> Self {
        Self {
            kind: OpKind::FillColour,
            target,
            region,
            mask: None,
            colour,
            params: Params {
                opacity,
                ..Params::default()
            },
        }
    }

    pub(crate) fn fill_colour_with_mask(
        target: &'t Tile<'a>,
        region: Option<&'t Region>,
        mask: &'t Tile<'a>,
        sampling: MaskSampling,
        colour: Rgba8,
        opacity: u8,
    ) -> Self {
        Self {
            kind: OpKind::FillColourWithMask,
            target,
            region,
            mask: Some(MaskInput {
                tile: mask,
                sampling,
            }),
            colour,
            params: Params {
                opacity,
                ..Params::default()
            },
        }
    }

    pub(crate) fn fill_channel(
        target: &'t Tile<'a>,
        region: Option<&'t Region>,
        mask: &'t Tile<'a>,
        sampling: MaskSampling,
        mode: ChannelMode,
    ) -> Self {
        Self {
            kind: OpKind::FillChannelWithMask,
            target,
            region,
            mask: Some(MaskInput {
                tile: mask,
                sampling,
            }),
            colour: Rgba8 {
                r: 0,
                g: 0,
                b: 0,
                a: 0,
            },
            params: Params {
                channel: mode.channel,
                ..Params::default()
            },
        }
    }
}

/// The resources of a request that passed validation.
struct Checked<'a> {
    target: &'a PixelBuffer,
    scheme: ColourScheme,
    mask: Option<CheckedMask<'a>>,
}

#[derive(Clone, Copy)]
struct CheckedMask<'a> {
    memory: TileMemory<'a>,
    format: MaskFormat,
}

/// Validate a request without touching any buffer.
fn check<'a>(settings: &Settings, request: &Request<'_, 'a>) -> Result<Checked<'a>> {
    let descriptor = request.kind.descriptor();
    let scheme = request.target.colour_scheme();

    let target = match request.target.memory() {
        Some(TileMemory::Buffer(buffer)) => buffer,
        Some(TileMemory::Const(_)) => return Err(Error::ReadOnlyTarget),
        None => return Err(Error::MissingTarget),
    };
    if matches!(scheme, ColourScheme::Channel8in32 { .. }) {
        return Err(Error::UnsupportedTarget(scheme));
    }
    let depth = scheme.depth();
    if usize::from(request.params.channel) >= depth.bytes_per_pixel() {
        return Err(Error::InvalidChannel {
            channel: request.params.channel,
            depth,
        });
    }

    let mask = match (&request.mask, descriptor.has_source) {
        (Some(mask), true) => {
            let memory = mask.tile.memory().ok_or(Error::MissingMask)?;
            let mask_scheme = mask.tile.colour_scheme();
            let allow = descriptor
                .mask_allow
                .with_channel_access(settings.channel_access);
            let format = MaskFormat::of(mask_scheme)
                .filter(|_| allow.permits(mask_scheme))
                .ok_or(Error::UnsupportedMask(mask_scheme))?;
            if mask.tile.size().is_empty() {
                return Err(Error::EmptyMask);
            }
            let window = Region::from_size(mask.tile.size());
            if !mask
                .tile
                .place(&window)
                .is_some_and(|placement| placement.valid == placement.target)
            {
                return Err(Error::MaskNotBacked);
            }
            if memory.shares_buffer_with(&TileMemory::Buffer(target)) {
                return Err(Error::AliasedBuffers);
            }
            Some(CheckedMask { memory, format })
        }
        (None, true) => return Err(Error::MissingMask),
        (_, false) => None,
    };

    Ok(Checked {
        target,
        scheme,
        mask,
    })
}

/// Mask bytes, borrowed for the duration of a call.
enum MaskBytes<'a> {
    Const(&'a [u8]),
    Shared(Ref<'a, [u8]>),
}

impl<'a> MaskBytes<'a> {
    fn borrow(memory: TileMemory<'a>) -> Result<Self> {
        Ok(match memory {
            TileMemory::Const(bytes) => Self::Const(bytes),
            TileMemory::Buffer(buffer) => {
                Self::Shared(buffer.try_bytes().map_err(|_| Error::BufferInUse)?)
            }
        })
    }

    fn as_slice(&self) -> &[u8] {
        match self {
            Self::Const(bytes) => bytes,
            Self::Shared(bytes) => bytes,
        }
    }
}

/// Fill a region of `target` with `colour`.
///
/// `region` is relative to `target`; `None` fills the whole tile, or the whole screen of a
/// virtual screen.
pub fn fill_colour(
    ctx: &Context,
    op: &mut Operation,
    target: &Tile<'_>,
    region: Option<&Region>,
    colour: Rgba8,
) -> Result<Status> {
    fill_colour_with_opacity(ctx, op, target, region, colour, 255)
}

/// Blend `colour` into a region of `target` with a uniform opacity.
pub fn fill_colour_with_opacity(
    ctx: &Context,
    op: &mut Operation,
    target: &Tile<'_>,
    region: Option<&Region>,
    colour: Rgba8,
    opacity: u8,
) -> Result<Status> {
    op.invoke(
        ctx.table(),
        ctx.settings(),
        Request::fill_colour(target, region, colour, opacity),
    )
}

/// Blend `colour` into a region of `target`, weighted per pixel by `mask`.
///
/// The mask is anchored at the top-left corner of the region, and the region is shrunk to the
/// size of the mask. Accepted masks are 8-bit alpha and, when the context enables channel
/// access, 8-in-32 channel masks.
pub fn fill_colour_with_mask(
    ctx: &Context,
    op: &mut Operation,
    target: &Tile<'_>,
    region: Option<&Region>,
    mask: &Tile<'_>,
    colour: Rgba8,
) -> Result<Status> {
    fill_colour_with_mask_and_opacity(ctx, op, target, region, mask, colour, 255)
}

/// Like [`fill_colour_with_mask`], with the mask additionally scaled by `opacity`.
pub fn fill_colour_with_mask_and_opacity(
    ctx: &Context,
    op: &mut Operation,
    target: &Tile<'_>,
    region: Option<&Region>,
    mask: &Tile<'_>,
    colour: Rgba8,
    opacity: u8,
) -> Result<Status> {
    let request =
        Request::fill_colour_with_mask(target, region, mask, MaskSampling::Full, colour, opacity);
    op.invoke(ctx.table(), ctx.settings(), request)
}

/// Blend `colour` into a region of `target`, weighted by the first row of `mask` repeated
/// along x and reused for every row.
pub fn fill_colour_with_horizontal_line_mask(
    ctx: &Context,
    op: &mut Operation,
    target: &Tile<'_>,
    region: Option<&Region>,
    mask: &Tile<'_>,
    colour: Rgba8,
) -> Result<Status> {
    fill_colour_with_horizontal_line_mask_and_opacity(ctx, op, target, region, mask, colour, 255)
}

/// Like [`fill_colour_with_horizontal_line_mask`], with the mask scaled by `opacity`.
pub fn fill_colour_with_horizontal_line_mask_and_opacity(
    ctx: &Context,
    op: &mut Operation,
    target: &Tile<'_>,
    region: Option<&Region>,
    mask: &Tile<'_>,
    colour: Rgba8,
    opacity: u8,
) -> Result<Status> {
    let request = Request::fill_colour_with_mask(
        target,
        region,
        mask,
        MaskSampling::HorizontalLine,
        colour,
        opacity,
    );
    op.invoke(ctx.table(), ctx.settings(), request)
}

/// Blend `colour` into a region of `target`, weighted by the first column of `mask` repeated
/// along y and reused for every column.
pub fn fill_colour_with_vertical_line_mask(
    ctx: &Context,
    op: &mut Operation,
    target: &Tile<'_>,
    region: Option<&Region>,
    mask: &Tile<'_>,
    colour: Rgba8,
) -> Result<Status> {
    fill_colour_with_vertical_line_mask_and_opacity(ctx, op, target, region, mask, colour, 255)
}

/// Like [`fill_colour_with_vertical_line_mask`], with the mask scaled by `opacity`.
pub fn fill_colour_with_vertical_line_mask_and_opacity(
    ctx: &Context,
    op: &mut Operation,
    target: &Tile<'_>,
    region: Option<&Region>,
    mask: &Tile<'_>,
    colour: Rgba8,
    opacity: u8,
) -> Result<Status> {
    let request = Request::fill_colour_with_mask(
        target,
        region,
        mask,
        MaskSampling::VerticalLine,
        colour,
        opacity,
    );
    op.invoke(ctx.table(), ctx.settings(), request)
}

/// Copy the first row of `mask`, repeated along x, into one channel of every row of a region.
///
/// Written pixels hold the mask value in the selected channel and zero elsewhere.
pub fn fill_channel_with_horizontal_line_mask(
    ctx: &Context,
    op: &mut Operation,
    target: &Tile<'_>,
    region: Option<&Region>,
    mask: &Tile<'_>,
    mode: ChannelMode,
) -> Result<Status> {
    let request =
        Request::fill_channel(target, region, mask, MaskSampling::HorizontalLine, mode);
    op.invoke(ctx.table(), ctx.settings(), request)
}

/// Copy the first column of `mask`, repeated along y, into one channel of every column of a
/// region.
///
/// Written pixels hold the mask value in the selected channel and zero elsewhere.
pub fn fill_channel_with_vertical_line_mask(
    ctx: &Context,
    op: &mut Operation,
    target: &Tile<'_>,
    region: Option<&Region>,
    mask: &Tile<'_>,
    mode: ChannelMode,
) -> Result<Status> {
    let request = Request::fill_channel(target, region, mask, MaskSampling::VerticalLine, mode);
    op.invoke(ctx.table(), ctx.settings(), request)
}
