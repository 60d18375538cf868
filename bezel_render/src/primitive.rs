// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive lists: the flat, clipped output of one target frame.

use bezel_core::bitmap::BitmapId;
use bezel_core::color::Color;
use bezel_core::container::{BlendMode, ColorTable};
use bezel_core::orientation::Orientation;
use bezel_core::texture::ScaledTexture;
use kurbo::{Point, Rect};

/// What a [`Primitive`] draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PrimitiveKind {
    /// A line from `(bounds.x0, bounds.y0)` to `(bounds.x1, bounds.y1)`.
    Line {
        /// Width in device pixels.
        width: f32,
    },
    /// A filled or textured rectangle.
    Quad,
}

/// Texture coordinates of a quad's four corners, in 0..1 of the texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TexCoords {
    /// Top-left corner.
    pub tl: Point,
    /// Top-right corner.
    pub tr: Point,
    /// Bottom-left corner.
    pub bl: Point,
    /// Bottom-right corner.
    pub br: Point,
}

impl Default for TexCoords {
    fn default() -> Self {
        Self::oriented(Orientation::ROT0)
    }
}

impl TexCoords {
    /// Corner coordinates sampling a texture drawn with `orientation`.
    #[must_use]
    pub fn oriented(orientation: Orientation) -> Self {
        let p = |x: f64, y: f64| Point::new(x, y);
        let [tl, tr, bl, br] = match orientation.bits() & 0x07 {
            0x00 => [p(0., 0.), p(1., 0.), p(0., 1.), p(1., 1.)],
            0x01 => [p(1., 0.), p(0., 0.), p(1., 1.), p(0., 1.)],
            0x02 => [p(0., 1.), p(1., 1.), p(0., 0.), p(1., 0.)],
            0x03 => [p(1., 1.), p(0., 1.), p(1., 0.), p(0., 0.)],
            0x04 => [p(0., 0.), p(0., 1.), p(1., 0.), p(1., 1.)],
            0x05 => [p(0., 1.), p(0., 0.), p(1., 1.), p(1., 0.)],
            0x06 => [p(1., 0.), p(1., 1.), p(0., 0.), p(0., 1.)],
            _ => [p(1., 1.), p(1., 0.), p(0., 1.), p(0., 0.)],
        };
        Self { tl, tr, bl, br }
    }
}

/// The sampled texture of a quad.
#[derive(Clone, Debug)]
pub struct PrimitiveTexture {
    /// Pixels at the size drawn.
    pub scaled: ScaledTexture,
    /// Bitmap the pixels derive from, for invalidation.
    pub source: Option<BitmapId>,
    /// Lookup to apply while sampling.
    pub color_table: Option<ColorTable>,
}

/// One drawable line or quad in device pixels.
#[derive(Clone, Debug)]
pub struct Primitive {
    /// Line or quad.
    pub kind: PrimitiveKind,
    /// Device-pixel bounds; for lines, the endpoints.
    pub bounds: Rect,
    /// Modulating color.
    pub color: Color,
    /// How the primitive combines with the destination.
    pub blend: BlendMode,
    /// Texture, for textured quads.
    pub texture: Option<PrimitiveTexture>,
    /// Corner texture coordinates, meaningful when textured.
    pub texcoords: TexCoords,
}

impl Primitive {
    /// An untextured quad.
    #[must_use]
    pub fn quad(bounds: Rect, color: Color, blend: BlendMode) -> Self {
        Self {
            kind: PrimitiveKind::Quad,
            bounds,
            color,
            blend,
            texture: None,
            texcoords: TexCoords::default(),
        }
    }

    /// A line between two device points.
    #[must_use]
    pub fn line(from: Point, to: Point, width: f32, color: Color, blend: BlendMode) -> Self {
        Self {
            kind: PrimitiveKind::Line { width },
            bounds: Rect::new(from.x, from.y, to.x, to.y),
            color,
            blend,
            texture: None,
            texcoords: TexCoords::default(),
        }
    }

    /// Whether this is a quad.
    #[must_use]
    pub fn is_quad(&self) -> bool {
        matches!(self.kind, PrimitiveKind::Quad)
    }

    /// Whether the primitive samples pixels derived from `bitmap`.
    #[must_use]
    pub fn references(&self, bitmap: BitmapId) -> bool {
        self.texture
            .as_ref()
            .is_some_and(|t| t.source == Some(bitmap))
    }
}

/// An ordered, back-to-front list of primitives for one frame.
#[derive(Clone, Debug, Default)]
pub struct PrimitiveList {
    items: Vec<Primitive>,
    frame_index: u64,
}

impl PrimitiveList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the list for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Appends a primitive.
    pub fn push(&mut self, primitive: Primitive) {
        self.items.push(primitive);
    }

    /// Primitives in draw order.
    #[must_use]
    pub fn items(&self) -> &[Primitive] {
        &self.items
    }

    /// Mutable access to the primitives, for optimization passes.
    pub fn items_mut(&mut self) -> &mut Vec<Primitive> {
        &mut self.items
    }

    /// Number of primitives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Frame counter of the target when the list was built.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub(crate) fn set_frame_index(&mut self, frame_index: u64) {
        self.frame_index = frame_index;
    }

    /// Whether any primitive samples pixels derived from `bitmap`.
    #[must_use]
    pub fn references(&self, bitmap: BitmapId) -> bool {
        self.items.iter().any(|p| p.references(bitmap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oriented_coords_follow_orientation() {
        let rot0 = TexCoords::oriented(Orientation::ROT0);
        assert_eq!(rot0.tl, Point::new(0.0, 0.0));
        assert_eq!(rot0.br, Point::new(1.0, 1.0));

        let fx = TexCoords::oriented(Orientation::FLIP_X);
        assert_eq!(fx.tl, Point::new(1.0, 0.0));
        assert_eq!(fx.tr, Point::new(0.0, 0.0));

        // Rotating the drawn quad by 90° means its top-left samples the
        // texture's bottom-left.
        let rot90 = TexCoords::oriented(Orientation::ROT90);
        assert_eq!(rot90.tl, Point::new(0.0, 1.0));
        assert_eq!(rot90.tr, Point::new(0.0, 0.0));
        assert_eq!(rot90.br, Point::new(1.0, 0.0));
    }

    #[test]
    fn list_clear_keeps_frame_index() {
        let mut list = PrimitiveList::new();
        list.set_frame_index(3);
        list.push(Primitive::quad(
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Color::WHITE,
            BlendMode::Alpha,
        ));
        assert_eq!(list.len(), 1);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.frame_index(), 3);
    }
}
