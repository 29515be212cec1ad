// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::dispatch::DispatchTable;
use crate::error::{Result, Status};
use crate::op::{ChannelMode, Operation, Request};
use tessera_common::color::Rgba8;
use tessera_common::geometry::Region;
use tessera_common::mask::MaskSampling;
use tessera_common::tile::Tile;

/// Settings that apply to every call made through a [`Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// The maximum number of rows per sub-task. 0 dispatches every call as a single sub-task.
    pub rows_per_task: u16,
    /// Whether masks may address one 8-bit channel inside 32-bit words.
    pub channel_access: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rows_per_task: 0,
            channel_access: true,
        }
    }
}

/// The state shared by drawing calls: the dispatch table, the settings, and a default
/// [`Operation`] for call sites that do not keep their own.
///
/// The methods of the context use the default operation, so at most one of them can be in
/// flight at a time.
#[derive(Debug, Default)]
pub struct Context {
    table: DispatchTable,
    settings: Settings,
    default_op: Operation,
}

impl Context {
    /// Create a context with software kernels and default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with software kernels and the given settings.
    pub fn with_settings(settings: Settings) -> Self {
        Self::with_dispatch_table(DispatchTable::default(), settings)
    }

    /// Create a context with the given dispatch table and settings.
    pub fn with_dispatch_table(table: DispatchTable, settings: Settings) -> Self {
        Self {
            table,
            settings,
            default_op: Operation::new(),
        }
    }

    /// The dispatch table.
    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// The settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The operation used by the methods of the context.
    pub fn default_op(&mut self) -> &mut Operation {
        &mut self.default_op
    }

    /// Wait for the default operation to finish.
    pub fn wait_async(&mut self) -> Result<()> {
        self.default_op.wait_async()
    }

    /// Wait for the default operation and every operation in `ops` to finish.
    ///
    /// Call this before reusing or reading back a buffer that accelerated calls draw into.
    pub fn wait_all<'o>(&mut self, ops: impl IntoIterator<Item = &'o mut Operation>) -> Result<()> {
        self.default_op.wait_async()?;
        for op in ops {
            op.wait_async()?;
        }
        Ok(())
    }

    fn submit(&mut self, request: Request<'_, '_>) -> Result<Status> {
        let Self {
            table,
            settings,
            default_op,
        } = self;
        default_op.invoke(table, settings, request)
    }

    /// See [`fill_colour`](crate::fill_colour).
    pub fn fill_colour(
        &mut self,
        target: &Tile<'_>,
        region: Option<&Region>,
        colour: Rgba8,
    ) -> Result<Status> {
        self.submit(Request::fill_colour(target, region, colour, 255))
    }

    /// See [`fill_colour_with_opacity`](crate::fill_colour_with_opacity).
    pub fn fill_colour_with_opacity(
        &mut self,
        target: &Tile<'_>,
        region: Option<&Region>,
        colour: Rgba8,
        opacity: u8,
    ) -> Result<Status> {
        self.submit(Request::fill_colour(target, region, colour, opacity))
    }

    /// See [`fill_colour_with_mask`](crate::fill_colour_with_mask).
    pub fn fill_colour_with_mask(
        &mut self,
        target: &Tile<'_>,
        region: Option<&Region>,
        mask: &Tile<'_>,
        colour: Rgba8,
    ) -> Result<Status> {
        self.fill_colour_with_mask_and_opacity(target, region, mask, colour, 255)
    }

    /// See [`fill_colour_with_mask_and_opacity`](crate::fill_colour_with_mask_and_opacity).
    pub fn fill_colour_with_mask_and_opacity(
        &mut self,
        target: &Tile<'_>,
        region: Option<&Region>,
        mask: &Tile<'_>,
        colour: Rgba8,
        opacity: u8,
    ) -> Result<Status> {
        self.submit(Request::fill_colour_with_mask(
            target,
            region,
            mask,
            MaskSampling::Full,
            colour,
            opacity,
        ))
    }

    /// See [`fill_colour_with_horizontal_line_mask`](crate::fill_colour_with_horizontal_line_mask).
    pub fn fill_colour_with_horizontal_line_mask(
        &mut self,
        target: &Tile<'_>,
        region: Option<&Region>,
        mask: &Tile<'_>,
        colour: Rgba8,
    ) -> Result<Status> {
        self.fill_colour_with_horizontal_line_mask_and_opacity(target, region, mask, colour, 255)
    }

    /// See [`fill_colour_with_horizontal_line_mask_and_opacity`](crate::fill_colour_with_horizontal_line_mask_and_opacity).
    pub fn fill_colour_with_horizontal_line_mask_and_opacity(
        &mut self,
        target: &Tile<'_>,
        region: Option<&Region>,
        mask: &Tile<'_>,
        colour: Rgba8,
        opacity: u8,
    ) -> Result<Status> {
        self.submit(Request::fill_colour_with_mask(
            target,
            region,
            mask,
            MaskSampling::HorizontalLine,
            colour,
            opacity,
        ))
    }

    /// See [`fill_colour_with_vertical_line_mask`](crate::fill_colour_with_vertical_line_mask).
    pub fn fill_colour_with_vertical_line_mask(
        &mut self,
        target: &Tile<'_>,
        region: Option<&Region>,
        mask: &Tile<'_>,
        colour: Rgba8,
    ) -> Result<Status> {
        self.fill_colour_with_vertical_line_mask_and_opacity(target, region, mask, colour, 255)
    }

    /// See [`fill_colour_with_vertical_line_mask_and_opacity`](crate::fill_colour_with_vertical_line_mask_and_opacity).
    pub fn fill_colour_with_vertical_line_mask_and_opacity(
        &mut self,
        target: &Tile<'_>,
        region: Option<&Region>,
        mask: &Tile<'_>,
        colour: Rgba8,
        opacity: u8,
    ) -> Result<Status> {
        self.submit(Request::fill_colour_with_mask(
            target,
            region,
            mask,
            MaskSampling::VerticalLine,
            colour,
            opacity,
        ))
    }

    /// See [`fill_channel_with_horizontal_line_mask`](crate::fill_channel_with_horizontal_line_mask).
    pub fn fill_channel_with_horizontal_line_mask(
        &mut self,
        target: &Tile<'_>,
        region: Option<&Region>,
        mask: &Tile<'_>,
        mode: ChannelMode,
    ) -> Result<Status> {
        self.submit(Request::fill_channel(
            target,
            region,
            mask,
            MaskSampling::HorizontalLine,
            mode,
        ))
    }

    /// See [`fill_channel_with_vertical_line_mask`](crate::fill_channel_with_vertical_line_mask).
    pub fn fill_channel_with_vertical_line_mask(
        &mut self,
        target: &Tile<'_>,
        region: Option<&Region>,
        mask: &Tile<'_>,
        mode: ChannelMode,
    ) -> Result<Status> {
        self.submit(Request::fill_channel(
            target,
            region,
            mask,
            MaskSampling::VerticalLine,
            mode,
        ))
    }
}
