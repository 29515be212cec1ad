// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tiles: rectangular views into caller-owned pixel memory.
//!
//! A tile is either a *root*, which refers to pixel memory directly, or a *child*, which
//! describes a sub-window of its parent and borrows it. Since a child can only be created from
//! an existing parent, tile hierarchies are trees by construction.
//!
//! There are two special kinds of roots:
//!
//! - A *virtual screen* root describes a partial framebuffer: the logical display surface is
//!   `screen` pixels large, but only the *valid region* of it is backed by memory. Children of a
//!   virtual screen use screen coordinates, and drawing is clipped to the valid region.
//! - A *derived resource* is a root-like tile whose pixels live inside its parent's memory, for
//!   example one glyph inside a font sheet. It starts a new coordinate frame of its own, but its
//!   memory is found by walking further up to the tile that owns the buffer.
//!
//! ```text
//!  Virtual Screen
//!  +--------------------------------------------------------+
//!  |      Target Region                                     |
//!  |     +-------------------------------------------+      |
//!  |     |                                           |      |
//!  |     |              +-------------------+        |      |
//!  |     |              | Valid Region      |        |      |
//!  |     |              +-------------------+        |      |
//!  |     |                                           |      |
//!  |     +-------------------------------------------+      |
//!  +--------------------------------------------------------+
//! ```

use crate::Error;
use crate::buffer::PixelBuffer;
use crate::colour::{ColourDepth, ColourScheme, PixelWord};
use crate::geometry::{Point, Region, Size};

/// The maximum number of tiles in a parent chain, the root included.
pub const MAX_TILE_DEPTH: usize = 16;

/// The memory a root tile refers to.
#[derive(Debug, Clone, Copy)]
pub enum TileMemory<'a> {
    /// Read-only bytes, e.g. a mask stored in a `static`.
    Const(&'a [u8]),
    /// A caller-owned buffer that can be drawn into.
    Buffer(&'a PixelBuffer),
}

impl TileMemory<'_> {
    /// The size of the memory in bytes.
    pub fn len(&self) -> usize {
        match self {
            Self::Const(bytes) => bytes.len(),
            Self::Buffer(buffer) => buffer.len(),
        }
    }

    /// Whether the memory holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both refer to the same pixel buffer.
    pub fn shares_buffer_with(&self, other: &TileMemory<'_>) -> bool {
        match (self, other) {
            (Self::Buffer(a), TileMemory::Buffer(b)) => core::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

/// Flags describing a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileInfo {
    /// The tile starts a coordinate frame of its own.
    pub is_root: bool,
    /// The tile is root-like, but its pixels live inside its parent's memory.
    pub derived_resource: bool,
    /// The tile is a partial framebuffer placed on a larger virtual screen.
    pub virtual_screen: bool,
    /// The colour scheme was set explicitly instead of being inherited from the parent.
    pub enforced_colour: bool,
    /// The layout of the tile's pixels.
    pub scheme: ColourScheme,
}

/// Where [`resolve_absolute_location`] stops walking up the parent chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Stop at the first root, including derived resources. The result is relative to the
    /// coordinate frame the tile is drawn in.
    Root,
    /// Walk through derived resources up to the tile owning the memory. The result is
    /// relative to that tile's frame: the virtual screen for partial framebuffers, the buffer
    /// itself otherwise.
    Buffer,
}

/// Where a region of a tile ends up in the frame of the tile owning the memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// The requested region, unclipped.
    pub target: Region,
    /// The part of `target` that is visible through every tile of the chain and backed by
    /// memory. Never empty, always inside `target`.
    pub valid: Region,
    /// The location of the first byte of the memory.
    pub origin: Point,
    /// The distance between two rows of the memory, in pixels.
    pub stride: usize,
}

/// A window into a memory-owning tile, as seen from the memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// The top-left pixel of the window, relative to the first pixel of the memory.
    pub origin: Point,
    /// The size of the window.
    pub size: Size,
    /// The distance between two rows of the memory, in pixels.
    pub stride: usize,
}

/// A rectangular pixel-buffer view.
#[derive(Debug, Clone, Copy)]
pub struct Tile<'a> {
    /// Location relative to the parent's frame, and size.
    region: Region,
    /// The size of the virtual screen, for partial framebuffers.
    screen: Size,
    parent: Option<&'a Tile<'a>>,
    memory: Option<TileMemory<'a>>,
    info: TileInfo,
}

impl<'a> Tile<'a> {
    /// Create a root tile over the given memory.
    ///
    /// The memory is addressed with a stride of `size.width` pixels.
    pub fn root(size: Size, scheme: ColourScheme, memory: TileMemory<'a>) -> Result<Self, Error> {
        check_size(size)?;
        check_memory(size, scheme, memory.len())?;

        Ok(Self {
            region: Region::from_size(size),
            screen: size,
            parent: None,
            memory: Some(memory),
            info: TileInfo {
                is_root: true,
                enforced_colour: true,
                scheme,
                ..TileInfo::default()
            },
        })
    }

    /// Create a root tile that only describes a size, without any pixel memory.
    ///
    /// Such a tile can be used for geometry, but operations reject it as a target or mask.
    pub fn unbacked(size: Size, scheme: ColourScheme) -> Result<Self, Error> {
        check_size(size)?;

        Ok(Self {
            region: Region::from_size(size),
            screen: size,
            parent: None,
            memory: None,
            info: TileInfo {
                is_root: true,
                enforced_colour: true,
                scheme,
                ..TileInfo::default()
            },
        })
    }

    /// Create a partial framebuffer: a virtual screen of `screen` pixels of which only `valid`
    /// is backed by `buffer`.
    ///
    /// The buffer is addressed with a stride of `valid.size.width` pixels.
    pub fn virtual_screen(
        screen: Size,
        valid: Region,
        scheme: ColourScheme,
        buffer: &'a PixelBuffer,
    ) -> Result<Self, Error> {
        check_size(screen)?;
        check_size(valid.size)?;
        if !Region::from_size(screen).contains_region(&valid) {
            return Err(Error::ChildOutOfBounds(valid));
        }
        check_memory(valid.size, scheme, buffer.len())?;

        Ok(Self {
            region: valid,
            screen,
            parent: None,
            memory: Some(TileMemory::Buffer(buffer)),
            info: TileInfo {
                is_root: true,
                virtual_screen: true,
                enforced_colour: true,
                scheme,
                ..TileInfo::default()
            },
        })
    }

    /// Create a child view of this tile.
    ///
    /// `region` is relative to this tile's frame and must lie within it.
    pub fn child(&'a self, region: Region) -> Result<Tile<'a>, Error> {
        self.derive(region, false)
    }

    /// Create a derived resource: a root-like tile whose pixels live inside this tile.
    ///
    /// `region` is relative to this tile's frame and must lie within it. Locations inside the
    /// resource are relative to the resource itself.
    pub fn derived_resource(&'a self, region: Region) -> Result<Tile<'a>, Error> {
        self.derive(region, true)
    }

    fn derive(&'a self, region: Region, derived_resource: bool) -> Result<Tile<'a>, Error> {
        check_size(region.size)?;
        if !self.frame_extent().contains_region(&region) {
            return Err(Error::ChildOutOfBounds(region));
        }
        if self.depth() + 1 >= MAX_TILE_DEPTH {
            return Err(Error::TileTooDeep);
        }

        Ok(Tile {
            region,
            screen: region.size,
            parent: Some(self),
            memory: None,
            info: TileInfo {
                is_root: derived_resource,
                derived_resource,
                virtual_screen: false,
                enforced_colour: false,
                scheme: self.info.scheme,
            },
        })
    }

    /// Reinterpret the pixels of this tile with another colour scheme of the same depth.
    ///
    /// This is mostly useful to view one channel of a 32-bit image as an 8-in-32 mask.
    pub fn with_colour_scheme(mut self, scheme: ColourScheme) -> Result<Self, Error> {
        let expected = self.info.scheme.depth();
        if scheme.depth() != expected {
            return Err(Error::SchemeDepthMismatch { scheme, expected });
        }
        self.info.scheme = scheme;
        self.info.enforced_colour = true;

        Ok(self)
    }

    /// The region of the tile, relative to its parent's frame.
    pub fn region(&self) -> Region {
        self.region
    }

    /// The size of the tile.
    pub fn size(&self) -> Size {
        self.region.size
    }

    /// The location of the tile, relative to its parent's frame.
    pub fn location(&self) -> Point {
        self.region.location
    }

    /// The parent tile, if any.
    pub fn parent(&self) -> Option<&'a Tile<'a>> {
        self.parent
    }

    /// The flags of the tile.
    pub fn info(&self) -> TileInfo {
        self.info
    }

    /// The colour scheme of the tile's pixels.
    pub fn colour_scheme(&self) -> ColourScheme {
        self.info.scheme
    }

    /// The number of tiles in the chain from this tile to its outermost root, minus one.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut tile = self;
        while let Some(parent) = tile.parent {
            depth += 1;
            tile = parent;
        }
        depth
    }

    /// The tile at the top of the chain, which owns the memory reference.
    pub fn memory_owner(&self) -> &Tile<'a> {
        let mut tile = self;
        while let Some(parent) = tile.parent {
            tile = parent;
        }
        tile
    }

    /// The memory behind this tile, if any.
    pub fn memory(&self) -> Option<TileMemory<'a>> {
        self.memory_owner().memory
    }

    /// The area children of this tile may occupy, in this tile's own coordinates.
    ///
    /// This is the whole screen for a virtual screen, and the tile itself otherwise. Drawing
    /// calls without an explicit region cover it.
    pub fn frame_extent(&self) -> Region {
        if self.info.virtual_screen {
            Region::from_size(self.screen)
        } else {
            Region::from_size(self.region.size)
        }
    }

    /// The area of a memory-owning tile that is backed by memory, in its own coordinates.
    fn memory_extent(&self) -> Region {
        if self.info.virtual_screen {
            self.region
        } else {
            Region::from_size(self.region.size)
        }
    }

    /// The location of `local` in the frame selected by `frame`.
    ///
    /// See [`resolve_absolute_location`].
    pub fn absolute_location(&self, local: Point, frame: Frame) -> Point {
        resolve_absolute_location(self, local, frame)
    }

    /// Work out where `region`, relative to this tile, lands in the memory.
    ///
    /// The region is clipped by every tile in the chain and by the memory itself. Returns `None`
    /// if nothing of it is backed by memory.
    pub fn place(&self, region: &Region) -> Option<Placement> {
        let mut target = *region;
        let mut valid = *region;
        let mut tile = self;

        loop {
            let Some(visible) = valid.intersect(&tile.frame_extent()) else {
                log::trace!("region {region:?} is clipped away by its tile chain");
                return None;
            };
            valid = visible;

            match tile.parent {
                Some(parent) => {
                    target = target.translate(tile.region.location);
                    valid = valid.translate(tile.region.location);
                    tile = parent;
                }
                None => break,
            }
        }

        let memory = tile.memory_extent();
        let Some(valid) = valid.intersect(&memory) else {
            log::trace!("region {target:?} lies outside the memory extent {memory:?}");
            return None;
        };

        Some(Placement {
            target,
            valid,
            origin: memory.location,
            stride: memory.size.width as usize,
        })
    }

    /// The window this tile occupies in the memory of its owner.
    pub fn window(&self) -> Window {
        let owner = self.memory_owner();
        let memory = owner.memory_extent();
        let origin = resolve_absolute_location(self, Point::ZERO, Frame::Buffer) - memory.location;

        Window {
            origin,
            size: self.region.size,
            stride: memory.size.width as usize,
        }
    }

    /// Whether any part of `region`, relative to this tile, is currently backed by memory.
    ///
    /// With partial framebuffers, drawing code uses this to skip work outside the valid region.
    pub fn is_region_active(&self, region: &Region) -> bool {
        self.place(region).is_some()
    }

    /// Read the pixel at `point`, relative to this tile.
    ///
    /// Returns `None` if the point is outside the tile, not backed by memory, or the tile has no
    /// memory.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is currently borrowed mutably.
    pub fn pixel<P: PixelWord>(&self, point: Point) -> Option<P> {
        if !Region::from_size(self.region.size).contains_point(point) {
            return None;
        }

        let owner = self.memory_owner();
        let extent = owner.memory_extent();
        let absolute = resolve_absolute_location(self, point, Frame::Buffer);
        if !extent.contains_point(absolute) {
            return None;
        }

        let pos = absolute - extent.location;
        let index = (pos.y as usize * extent.size.width as usize + pos.x as usize) * P::BYTES;
        match owner.memory? {
            TileMemory::Const(bytes) => bytes.get(index..index + P::BYTES).map(P::read),
            TileMemory::Buffer(buffer) => {
                let bytes = buffer.bytes();
                bytes.get(index..index + P::BYTES).map(P::read)
            }
        }
    }
}

/// Translate `local`, relative to `tile`, into the frame selected by `frame`.
///
/// The walk sums the location of every tile it passes. Roots contribute nothing: a plain root's
/// frame starts at its first pixel, and a virtual screen's frame is the screen itself. With
/// [`Frame::Root`] the walk stops at the first root it meets (derived resources included); with
/// [`Frame::Buffer`] it continues through derived resources to the memory owner.
pub fn resolve_absolute_location(tile: &Tile<'_>, local: Point, frame: Frame) -> Point {
    let mut location = local;
    let mut tile = tile;

    while let Some(parent) = tile.parent {
        if frame == Frame::Root && tile.info.is_root {
            break;
        }
        location += tile.region.location;
        tile = parent;
    }

    location
}

fn check_size(size: Size) -> Result<(), Error> {
    if size.width < 0 || size.height < 0 {
        return Err(Error::InvalidSize(size));
    }
    Ok(())
}

fn check_memory(size: Size, scheme: ColourScheme, actual: usize) -> Result<(), Error> {
    let required = size.area() * scheme.bytes_per_pixel();
    if actual < required {
        return Err(Error::BufferTooSmall { required, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn region(x: i16, y: i16, w: i16, h: i16) -> Region {
        Region::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn root_resolves_to_local() {
        let buffer = PixelBuffer::new(16 * 16);
        let root = Tile::root(Size::new(16, 16), ColourScheme::Gray8, TileMemory::Buffer(&buffer))
            .unwrap();

        let local = Point::new(3, -4);
        assert_eq!(root.absolute_location(local, Frame::Root), local);
        assert_eq!(root.absolute_location(local, Frame::Buffer), local);
        assert_eq!(root.depth(), 0);
    }

    #[test]
    fn nested_views_sum_locations() {
        let buffer = PixelBuffer::new(64 * 64);
        let root = Tile::root(Size::new(64, 64), ColourScheme::Gray8, TileMemory::Buffer(&buffer))
            .unwrap();
        let a = root.child(region(5, 7, 50, 50)).unwrap();
        let local = Point::new(1, 2);
        assert_eq!(a.absolute_location(local, Frame::Root), Point::new(6, 9));

        let b = a.child(region(10, 1, 30, 30)).unwrap();
        let c = b.child(region(0, 4, 20, 20)).unwrap();
        assert_eq!(c.absolute_location(local, Frame::Root), local + Point::new(15, 12));
        assert_eq!(c.depth(), 3);

        let d = c.child(region(3, 3, 5, 5)).unwrap();

        let expected = local + Point::new(5 + 10 + 3, 7 + 1 + 4 + 3);
        assert_eq!(d.absolute_location(local, Frame::Root), expected);
        assert_eq!(d.absolute_location(local, Frame::Buffer), expected);
        assert_eq!(d.depth(), 4);
    }

    #[test]
    fn derived_resource_starts_its_own_frame() {
        let sheet = PixelBuffer::new(32 * 8);
        let root = Tile::root(Size::new(32, 8), ColourScheme::A8, TileMemory::Buffer(&sheet))
            .unwrap();
        let glyph = root.derived_resource(region(8, 0, 8, 8)).unwrap();
        let stroke = glyph.child(region(2, 1, 4, 4)).unwrap();

        assert_eq!(
            stroke.absolute_location(Point::ZERO, Frame::Root),
            Point::new(2, 1)
        );
        assert_eq!(
            stroke.absolute_location(Point::ZERO, Frame::Buffer),
            Point::new(10, 1)
        );
        assert_eq!(
            stroke.window(),
            Window {
                origin: Point::new(10, 1),
                size: Size::new(4, 4),
                stride: 32,
            }
        );
    }

    #[test]
    fn child_must_fit_in_parent() {
        let buffer = PixelBuffer::new(10 * 10);
        let root = Tile::root(Size::new(10, 10), ColourScheme::Gray8, TileMemory::Buffer(&buffer))
            .unwrap();

        assert_eq!(
            root.child(region(5, 5, 6, 2)).unwrap_err(),
            Error::ChildOutOfBounds(region(5, 5, 6, 2))
        );
        assert_eq!(
            root.child(region(0, 0, -1, 2)).unwrap_err(),
            Error::InvalidSize(Size::new(-1, 2))
        );
        assert!(root.child(region(0, 0, 10, 10)).is_ok());
    }

    #[test]
    fn chain_depth_is_capped() {
        let buffer = PixelBuffer::new(4);
        let root = Tile::root(Size::new(2, 2), ColourScheme::Gray8, TileMemory::Buffer(&buffer))
            .unwrap();

        fn nest<'a>(tile: &'a Tile<'a>, remaining: usize) -> Result<usize, Error> {
            if remaining == 0 {
                return Ok(tile.depth());
            }
            let child = tile.child(Region::from_size(tile.size()))?;
            nest(&child, remaining - 1)
        }

        assert_eq!(nest(&root, MAX_TILE_DEPTH - 1), Ok(MAX_TILE_DEPTH - 1));
        assert_eq!(nest(&root, MAX_TILE_DEPTH), Err(Error::TileTooDeep));
    }

    #[test]
    fn memory_must_cover_root() {
        let buffer = PixelBuffer::new(10);

        assert!(
            Tile::root(Size::new(2, 2), ColourScheme::Rgb565, TileMemory::Buffer(&buffer)).is_ok()
        );
        assert_eq!(
            Tile::root(Size::new(3, 3), ColourScheme::Rgb565, TileMemory::Buffer(&buffer))
                .unwrap_err(),
            Error::BufferTooSmall {
                required: 18,
                actual: 10
            }
        );
    }

    #[test]
    fn placement_clips_to_partial_framebuffer() {
        let buffer = PixelBuffer::new(20 * 4);
        let screen = Tile::virtual_screen(
            Size::new(40, 30),
            region(10, 8, 20, 4),
            ColourScheme::Gray8,
            &buffer,
        )
        .unwrap();
        let panel = screen.child(region(5, 5, 30, 20)).unwrap();

        let placement = panel.place(&region(2, 1, 10, 10)).unwrap();
        assert_eq!(placement.target, region(7, 6, 10, 10));
        assert_eq!(placement.valid, region(10, 8, 7, 4));
        assert_eq!(placement.origin, Point::new(10, 8));
        assert_eq!(placement.stride, 20);

        assert!(panel.is_region_active(&region(0, 0, 30, 4)));
        assert!(!panel.is_region_active(&region(0, 0, 30, 2)));
        assert!(!panel.is_region_active(&region(26, 0, 4, 20)));

        assert_eq!(screen.frame_extent(), region(0, 0, 40, 30));
        assert_eq!(panel.frame_extent(), region(0, 0, 30, 20));
    }

    #[test]
    fn placement_clips_through_every_ancestor() {
        let buffer = PixelBuffer::new(16 * 16);
        let root = Tile::root(Size::new(16, 16), ColourScheme::Gray8, TileMemory::Buffer(&buffer))
            .unwrap();
        let outer = root.child(region(4, 4, 8, 8)).unwrap();
        let inner = outer.child(region(6, 6, 2, 2)).unwrap();

        let placement = inner.place(&region(-10, -10, 40, 40)).unwrap();
        assert_eq!(placement.valid, region(10, 10, 2, 2));
        assert_eq!(placement.target, region(0, 0, 40, 40));
        assert_eq!(inner.place(&region(2, 0, 3, 3)), None);
    }

    #[test]
    fn reads_pixels_through_views() {
        let data: alloc::vec::Vec<u8> = (0..16).collect();
        let root = Tile::root(Size::new(4, 4), ColourScheme::Gray8, TileMemory::Const(&data))
            .unwrap();
        let view = root.child(region(1, 2, 2, 2)).unwrap();

        assert_eq!(view.pixel::<u8>(Point::new(0, 0)), Some(9));
        assert_eq!(view.pixel::<u8>(Point::new(1, 1)), Some(14));
        assert_eq!(view.pixel::<u8>(Point::new(2, 0)), None);

        let unbacked = Tile::unbacked(Size::new(4, 4), ColourScheme::Gray8).unwrap();
        assert_eq!(unbacked.pixel::<u8>(Point::ZERO), None);
        assert!(unbacked.memory().is_none());
    }

    #[test]
    fn colour_scheme_reinterpretation_keeps_depth() {
        let data = vec![0_u8; 16];
        let image = Tile::root(Size::new(2, 2), ColourScheme::Ccca8888, TileMemory::Const(&data))
            .unwrap();

        let alpha = image
            .with_colour_scheme(ColourScheme::Channel8in32 { channel: 3 })
            .unwrap();
        assert_eq!(
            alpha.colour_scheme(),
            ColourScheme::Channel8in32 { channel: 3 }
        );
        assert!(alpha.info().enforced_colour);
        assert_eq!(
            image.with_colour_scheme(ColourScheme::Gray8).unwrap_err(),
            Error::SchemeDepthMismatch {
                scheme: ColourScheme::Gray8,
                expected: ColourDepth::Bits32,
            }
        );
    }

    #[test]
    fn shared_buffers_are_detected() {
        let a = PixelBuffer::new(4);
        let b = PixelBuffer::new(4);

        assert!(TileMemory::Buffer(&a).shares_buffer_with(&TileMemory::Buffer(&a)));
        assert!(!TileMemory::Buffer(&a).shares_buffer_with(&TileMemory::Buffer(&b)));
    }
}
