// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounds helpers shared by every coordinate space.
//!
//! All floating-point bounds are [`kurbo::Rect`]s. Items arrive from
//! producers and layout files with arbitrary corner order; every consumer
//! normalizes before use so that `x0 <= x1` and `y0 <= y1`.

pub use kurbo::{Point, Rect};

/// Rounds to the nearest integer, halves rounding up.
///
/// Primitive bounds are snapped with this so adjacent items sharing an edge
/// land on the same pixel.
#[inline]
#[must_use]
pub fn round_nearest(f: f64) -> f64 {
    (f + 0.5).floor()
}

/// Extension methods on [`Rect`] used throughout the compositor.
pub trait BoundsExt {
    /// Returns the same rectangle with `x0 <= x1` and `y0 <= y1`.
    #[must_use]
    fn normalized(self) -> Rect;

    /// Builds a rectangle from an origin and a size.
    #[must_use]
    fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Rect;

    /// Returns `true` when `inner` lies entirely within `self`.
    #[must_use]
    fn contains_rect(&self, inner: &Rect) -> bool;

    /// Returns the union of two rectangles, treating `None` as empty.
    #[must_use]
    fn union_opt(acc: Option<Rect>, next: Rect) -> Option<Rect>;

    /// Maps `self` from the `from` space into the `to` space affinely.
    #[must_use]
    fn remap(&self, from: &Rect, to: &Rect) -> Rect;
}

impl BoundsExt for Rect {
    #[inline]
    fn normalized(self) -> Rect {
        self.abs()
    }

    #[inline]
    fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect::new(x, y, x + width, y + height)
    }

    #[inline]
    fn contains_rect(&self, inner: &Rect) -> bool {
        inner.x0 >= self.x0 && inner.x1 <= self.x1 && inner.y0 >= self.y0 && inner.y1 <= self.y1
    }

    #[inline]
    fn union_opt(acc: Option<Rect>, next: Rect) -> Option<Rect> {
        Some(match acc {
            Some(acc) => acc.union(next),
            None => next,
        })
    }

    fn remap(&self, from: &Rect, to: &Rect) -> Rect {
        let xscale = to.width() / from.width();
        let yscale = to.height() / from.height();
        Rect::new(
            to.x0 + (self.x0 - from.x0) * xscale,
            to.y0 + (self.y0 - from.y0) * yscale,
            to.x0 + (self.x1 - from.x0) * xscale,
            to.y0 + (self.y1 - from.y0) * yscale,
        )
    }
}

/// An integer sub-rectangle of a bitmap, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Creates a pixel rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin with the given size.
    #[inline]
    #[must_use]
    pub const fn sized(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// One past the right-most column.
    #[inline]
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the bottom-most row.
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The overlap of two rectangles; zero-sized when they do not meet.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.x.saturating_add(self.width).min(other.x.saturating_add(other.width));
        let y1 = self.y.saturating_add(self.height).min(other.y.saturating_add(other.height));
        Self::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    /// Converts fractional `bounds` (in 0..1 of a `width`×`height` surface)
    /// to rounded pixel coordinates, clamped to the surface.
    #[must_use]
    pub fn from_unit_bounds(bounds: &Rect, width: u32, height: u32) -> Self {
        let w = f64::from(width);
        let h = f64::from(height);
        let clamp = |v: f64, max: f64| round_nearest(v).clamp(0.0, max) as u32;
        let x0 = clamp(bounds.x0 * w, w);
        let y0 = clamp(bounds.y0 * h, h);
        let x1 = clamp(bounds.x1 * w, w).max(x0);
        let y1 = clamp(bounds.y1 * h, h).max(y0);
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_swaps_inverted_corners() {
        let r = Rect::new(5.0, 8.0, 1.0, 2.0).normalized();
        assert_eq!(r, Rect::new(1.0, 2.0, 5.0, 8.0));
    }

    #[test]
    fn normalization_preserves_the_rectangle() {
        let cases = [
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Rect::new(1.0, 0.0, 0.0, 1.0),
            Rect::new(0.0, 1.0, 1.0, 0.0),
            Rect::new(3.5, -2.0, -1.5, -7.0),
        ];
        for r in cases {
            let n = r.normalized();
            assert!(n.x0 <= n.x1 && n.y0 <= n.y1, "not normalized: {n:?}");
            assert_eq!(n.x0, r.x0.min(r.x1));
            assert_eq!(n.x1, r.x0.max(r.x1));
            assert_eq!(n.y0, r.y0.min(r.y1));
            assert_eq!(n.y1, r.y0.max(r.y1));
            assert_eq!(n.area(), r.abs().area());
        }
    }

    #[test]
    fn round_nearest_rounds_halves_up() {
        assert_eq!(round_nearest(1.5), 2.0);
        assert_eq!(round_nearest(1.49), 1.0);
        assert_eq!(round_nearest(-0.5), 0.0);
    }

    #[test]
    fn remap_maps_corners() {
        let from = Rect::new(0.0, 0.0, 4.0, 3.0);
        let to = Rect::new(0.0, 0.0, 1.0, 1.0);
        let r = Rect::new(1.0, 1.5, 3.0, 3.0).remap(&from, &to);
        assert_eq!(r, Rect::new(0.25, 0.5, 0.75, 1.0));
    }

    #[test]
    fn unit_bounds_to_pixels() {
        let px = PixelRect::from_unit_bounds(&Rect::new(0.25, 0.0, 0.75, 0.5), 100, 40);
        assert_eq!(px, PixelRect::new(25, 0, 50, 20));
    }

    #[test]
    fn pixel_rect_intersection() {
        let bitmap = PixelRect::sized(4, 2);
        assert_eq!(PixelRect::new(2, 0, 8, 8).intersect(&bitmap), PixelRect::new(2, 0, 2, 2));
        assert!(PixelRect::new(6, 0, 2, 2).intersect(&bitmap).is_empty());
    }
}
