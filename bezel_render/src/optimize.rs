// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Redraw-region optimization.
//!
//! Instead of clearing the whole device before drawing, the optimizer walks
//! the leading opaque quads of a primitive list and subtracts each from a
//! region that still needs clearing. Whatever remains is cleared with opaque
//! black quads placed at the front of the list, and the subtracted quads are
//! switched to unblended drawing, since they now land on a known black
//! background.
//!
//! The region is kept as horizontal bands, each holding the sorted x spans
//! still to clear. A quad is subtracted only if, in every band it touches,
//! a single span contains it; anything else ends the walk.

use bezel_core::color::Color;
use bezel_core::container::BlendMode;
use kurbo::Rect;

use crate::primitive::{Primitive, PrimitiveList};

#[derive(Clone, Debug, PartialEq)]
struct Band {
    y0: f64,
    y1: f64,
    spans: Vec<(f64, f64)>,
}

/// The part of the device that still needs clearing.
#[derive(Clone, Debug, Default)]
pub struct ClearRegion {
    bands: Vec<Band>,
}

impl ClearRegion {
    /// A region covering `bounds`.
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        let mut region = Self::default();
        region.reset(bounds);
        region
    }

    /// Resets the region to cover `bounds`, keeping allocations.
    pub fn reset(&mut self, bounds: Rect) {
        self.bands.clear();
        if bounds.width() > 0.0 && bounds.height() > 0.0 {
            self.bands.push(Band {
                y0: bounds.y0,
                y1: bounds.y1,
                spans: vec![(bounds.x0, bounds.x1)],
            });
        }
    }

    /// Removes `r` from the region.
    ///
    /// Returns `false`, leaving the region untouched, unless every band
    /// overlapping `r` has one span containing `r`'s horizontal extent.
    pub fn subtract(&mut self, r: Rect) -> bool {
        let mut touched = false;
        for band in self.bands.iter().filter(|b| b.y1 > r.y0 && b.y0 < r.y1) {
            touched = true;
            if !band.spans.iter().any(|&(x0, x1)| x0 <= r.x0 && r.x1 <= x1) {
                return false;
            }
        }
        if !touched {
            return false;
        }

        self.split_at(r.y0);
        self.split_at(r.y1);
        for band in self.bands.iter_mut().filter(|b| b.y0 >= r.y0 && b.y1 <= r.y1) {
            let Some(idx) = band
                .spans
                .iter()
                .position(|&(x0, x1)| x0 <= r.x0 && r.x1 <= x1)
            else {
                continue;
            };
            let (x0, x1) = band.spans.remove(idx);
            let mut at = idx;
            if x0 < r.x0 {
                band.spans.insert(at, (x0, r.x0));
                at += 1;
            }
            if r.x1 < x1 {
                band.spans.insert(at, (r.x1, x1));
            }
        }
        self.coalesce();
        true
    }

    fn split_at(&mut self, y: f64) {
        let Some(idx) = self.bands.iter().position(|b| b.y0 < y && y < b.y1) else {
            return;
        };
        let mut lower = self.bands[idx].clone();
        lower.y0 = y;
        self.bands[idx].y1 = y;
        self.bands.insert(idx + 1, lower);
    }

    fn coalesce(&mut self) {
        let mut i = 1;
        while i < self.bands.len() {
            if self.bands[i - 1].spans == self.bands[i].spans {
                let below = self.bands.remove(i);
                self.bands[i - 1].y1 = below.y1;
            } else {
                i += 1;
            }
        }
    }

    /// The rectangles still to clear.
    pub fn rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.bands.iter().flat_map(|band| {
            band.spans
                .iter()
                .map(move |&(x0, x1)| Rect::new(x0, band.y0, x1, band.y1))
        })
    }

    /// Total area still to clear.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.rects().map(|r| r.area()).sum()
    }
}

/// What one optimizer pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptimizeStats {
    /// Leading quads switched to unblended drawing.
    pub opaque_quads: u32,
    /// Clear quads inserted at the front of the list.
    pub clear_quads: u32,
}

/// Replaces a full-device clear with the minimal set of clear quads.
///
/// `region` is scratch storage reused across frames.
#[expect(
    clippy::cast_possible_truncation,
    reason = "clear quads are far fewer than u32::MAX"
)]
pub fn optimize(list: &mut PrimitiveList, device: Rect, region: &mut ClearRegion) -> OptimizeStats {
    region.reset(device);
    let mut stats = OptimizeStats::default();

    for prim in list.items_mut().iter_mut() {
        if !prim.is_quad() {
            break;
        }
        if prim
            .texture
            .as_ref()
            .is_some_and(|t| t.scaled.format.has_alpha())
        {
            break;
        }
        let covered = prim.bounds.intersect(device);
        if covered.width() <= 0.0 || covered.height() <= 0.0 {
            continue;
        }
        if !region.subtract(covered) {
            break;
        }
        if prim.blend == BlendMode::RgbMultiply {
            // Multiplying black leaves black.
            prim.color = Color::BLACK;
            prim.texture = None;
        } else {
            prim.color = prim.color.premultiplied_opaque();
        }
        prim.blend = BlendMode::None;
        stats.opaque_quads += 1;
    }

    let clears: Vec<Primitive> = region
        .rects()
        .map(|r| Primitive::quad(r, Color::BLACK, BlendMode::None))
        .collect();
    stats.clear_quads = clears.len() as u32;
    list.items_mut().splice(0..0, clears);
    stats
}
