// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chained item transform.
//!
//! The compositor descends target → view item → container, building one
//! [`ItemTransform`] per level. Each level maps the unit square of its child
//! onto a box in device pixels (`offset` + `scale`), multiplies a color, and
//! composes an [`Orientation`]. This covers exactly the subset of affine maps
//! the compositor needs, so there is no general matrix type.

use kurbo::Rect;

use crate::color::Color;
use crate::geometry::BoundsExt;
use crate::orientation::Orientation;

/// Scale, offset, color and orientation applied to one level of items.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemTransform {
    /// Horizontal offset in device pixels.
    pub xoffs: f64,
    /// Vertical offset in device pixels.
    pub yoffs: f64,
    /// Width in device pixels of the unit square.
    pub xscale: f64,
    /// Height in device pixels of the unit square.
    pub yscale: f64,
    /// Color multiplier.
    pub color: Color,
    /// Accumulated orientation.
    pub orientation: Orientation,
    /// When set, container scaling anchors at the origin instead of
    /// recentering around the box. Debug containers are placed this way.
    pub no_center: bool,
}

/// Per-container placement applied beneath an item transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Orientation of the container's own contents.
    pub orientation: Orientation,
    /// Horizontal scale of the contents.
    pub xscale: f64,
    /// Vertical scale of the contents.
    pub yscale: f64,
    /// Horizontal offset as a fraction of the box.
    pub xoffset: f64,
    /// Vertical offset as a fraction of the box.
    pub yoffset: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            orientation: Orientation::ROT0,
            xscale: 1.0,
            yscale: 1.0,
            xoffset: 0.0,
            yoffset: 0.0,
        }
    }
}

impl ItemTransform {
    /// A transform mapping the unit square onto the given device box.
    #[must_use]
    pub fn from_box(bounds: Rect, orientation: Orientation) -> Self {
        Self {
            xoffs: bounds.x0,
            yoffs: bounds.y0,
            xscale: bounds.width(),
            yscale: bounds.height(),
            color: Color::WHITE,
            orientation,
            no_center: false,
        }
    }

    /// The device box covered by the unit square under this transform.
    #[must_use]
    pub fn device_box(&self) -> Rect {
        Rect::from_xywh(self.xoffs, self.yoffs, self.xscale, self.yscale)
    }

    /// Composes a child transform for an item at `bounds` (unit space of
    /// `self`) with the item's own color and orientation.
    ///
    /// The bounds are first oriented by the parent orientation and
    /// normalized, so the child box is always expressed in device space.
    #[must_use]
    pub fn child(&self, bounds: Rect, color: Color, orientation: Orientation) -> Self {
        let b = self.orientation.apply_rect(bounds).normalized();
        Self {
            xoffs: self.xoffs + b.x0 * self.xscale,
            yoffs: self.yoffs + b.y0 * self.yscale,
            xscale: b.width() * self.xscale,
            yscale: b.height() * self.yscale,
            color: self.color * color,
            orientation: orientation + self.orientation,
            no_center: false,
        }
    }

    /// Composes the transform for a container's contents placed in this box.
    ///
    /// Scale and offset are given in the container's own axes; when the
    /// composed orientation swaps axes they are exchanged, and flips negate
    /// the offsets.
    #[must_use]
    pub fn place(&self, placement: &Placement) -> Self {
        let orientation = placement.orientation + self.orientation;
        let (xscale, yscale, mut xoff, mut yoff) = if orientation.swap_xy() {
            (
                placement.yscale,
                placement.xscale,
                placement.yoffset,
                placement.xoffset,
            )
        } else {
            (
                placement.xscale,
                placement.yscale,
                placement.xoffset,
                placement.yoffset,
            )
        };
        if orientation.flip_x() {
            xoff = -xoff;
        }
        if orientation.flip_y() {
            yoff = -yoff;
        }
        let (xoffs, yoffs) = if self.no_center {
            (
                self.xscale * xoff + self.xoffs,
                self.yscale * yoff + self.yoffs,
            )
        } else {
            (
                self.xscale * (0.5 - 0.5 * xscale + xoff) + self.xoffs,
                self.yscale * (0.5 - 0.5 * yscale + yoff) + self.yoffs,
            )
        };
        Self {
            xoffs,
            yoffs,
            xscale: self.xscale * xscale,
            yscale: self.yscale * yscale,
            color: self.color,
            orientation,
            no_center: self.no_center,
        }
    }

    /// Maps oriented unit-space bounds to device space without rounding.
    #[must_use]
    pub fn map_rect(&self, bounds: Rect) -> Rect {
        let b = self.orientation.apply_rect(bounds);
        Rect::new(
            self.xoffs + b.x0 * self.xscale,
            self.yoffs + b.y0 * self.yscale,
            self.xoffs + b.x1 * self.xscale,
            self.yoffs + b.y1 * self.yscale,
        )
    }
}
