// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Points, sizes and regions.
//!
//! A [`Region`] carries no frame of its own: whether it is relative to a tile, to the
//! virtual screen or to another region is part of the contract of the function consuming it.

use core::ops::{Add, AddAssign, Neg, Sub};

/// A signed 2D offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// The horizontal component.
    pub x: i16,
    /// The vertical component.
    pub y: i16,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self::new(0, 0);

    /// Create a new point.
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// A 2D extent.
///
/// Sizes with a non-positive width or height are empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    /// The width in pixels.
    pub width: i16,
    /// The height in pixels.
    pub height: i16,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: i16, height: i16) -> Self {
        Self { width, height }
    }

    /// Whether the size covers no pixel.
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// The number of pixels covered, zero for empty sizes.
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }

    /// The component-wise minimum of two sizes.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.width.min(other.width), self.height.min(other.height))
    }
}

/// A location plus a size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Region {
    /// The top-left corner.
    pub location: Point,
    /// The extent.
    pub size: Size,
}

impl Region {
    /// Create a new region.
    pub const fn new(location: Point, size: Size) -> Self {
        Self { location, size }
    }

    /// Create a region of the given size anchored at the origin.
    pub const fn from_size(size: Size) -> Self {
        Self::new(Point::ZERO, size)
    }

    /// Whether the region covers no pixel.
    pub const fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// The exclusive right edge.
    pub fn right(&self) -> i32 {
        i32::from(self.location.x) + i32::from(self.size.width)
    }

    /// The exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        i32::from(self.location.y) + i32::from(self.size.height)
    }

    /// Move the region by `offset`.
    pub fn translate(self, offset: Point) -> Self {
        Self::new(self.location + offset, self.size)
    }

    /// Whether `point` lies inside the region.
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.location.x
            && point.y >= self.location.y
            && i32::from(point.x) < self.right()
            && i32::from(point.y) < self.bottom()
    }

    /// Whether `other` lies completely inside the region.
    ///
    /// Empty regions are contained in every region.
    pub fn contains_region(&self, other: &Self) -> bool {
        other.is_empty()
            || (other.location.x >= self.location.x
                && other.location.y >= self.location.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// The overlap of two regions, or `None` if they do not overlap.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x0 = self.location.x.max(other.location.x);
        let y0 = self.location.y.max(other.location.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());

        if x1 <= i32::from(x0) || y1 <= i32::from(y0) {
            return None;
        }

        Some(Self::new(
            Point::new(x0, y0),
            Size::new((x1 - i32::from(x0)) as i16, (y1 - i32::from(y0)) as i16),
        ))
    }
}

/// Compute the location of the valid region relative to the target region.
///
/// Both regions must be expressed in the same frame (usually the virtual screen). A pixel at
/// `(x, y)` of the valid region's buffer corresponds to `(x + offset.x, y + offset.y)` relative
/// to the target region's origin.
///
/// The valid region must lie inside the target region; anything else is a bug in the
/// scheduling layer.
pub fn compute_clip_offset(valid: &Region, target: &Region) -> Point {
    debug_assert!(
        target.contains_region(valid),
        "valid region {valid:?} escapes target region {target:?}"
    );

    valid.location - target.location
}
