// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-source accumulators of draw items.
//!
//! Each producer (an emulated screen, the UI, a debug view) owns one
//! [`Container`]. During a frame it appends lines, quads and glyphs in its own
//! normalized 0..1 space; the compositor later walks the container under the
//! transform of whatever layout item shows it. A container also carries the
//! user's color correction and placement settings, and the color tables
//! derived from them.

use std::sync::Arc;

use kurbo::Rect;

use crate::adjust::{BcgTable, ColorAdjust};
use crate::arena::Key;
use crate::bitmap::PixelFormat;
use crate::color::Color;
use crate::orientation::Orientation;
use crate::texture::TextureId;
use crate::transform::Placement;

/// How a primitive combines with what is already on the device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Overwrite the destination.
    None,
    /// Straight alpha blending.
    #[default]
    Alpha,
    /// Multiply the destination's color channels.
    RgbMultiply,
    /// Add to the destination.
    Add,
}

/// Per-item drawing flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemFlags {
    /// Explicit blend mode; `None` defers to the enclosing layer's mode.
    pub blend: Option<BlendMode>,
    /// Orientation of the texture relative to the item.
    pub tex_orientation: Orientation,
}

impl ItemFlags {
    /// Flags with an explicit blend mode.
    #[must_use]
    pub fn blend(mode: BlendMode) -> Self {
        Self {
            blend: Some(mode),
            ..Self::default()
        }
    }
}

/// What a [`DrawItem`] draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ItemKind {
    /// A line segment from the top-left to the bottom-right bounds corner.
    Line {
        /// Width in container units before device scaling.
        width: f32,
    },
    /// A rectangle, textured or flat.
    Quad {
        /// Texture to sample, if any.
        texture: Option<TextureId>,
    },
    /// A character cell; sized from its origin rather than its far edge.
    Glyph {
        /// Glyph texture, if the font has one.
        texture: Option<TextureId>,
    },
}

impl ItemKind {
    /// The texture sampled by this item.
    #[must_use]
    pub fn texture(&self) -> Option<TextureId> {
        match *self {
            Self::Line { .. } => None,
            Self::Quad { texture } | Self::Glyph { texture } => texture,
        }
    }
}

/// One immediate-mode draw request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    /// Kind and kind-specific payload.
    pub kind: ItemKind,
    /// Bounds in container space; lines keep their endpoint order.
    pub bounds: Rect,
    /// Tint.
    pub color: Color,
    /// Blend and texture orientation flags.
    pub flags: ItemFlags,
}

/// User-adjustable settings of one container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UserSettings {
    /// Orientation of the container's contents.
    pub orientation: Orientation,
    /// Brightness, `1.0` neutral.
    pub brightness: f32,
    /// Contrast, `1.0` neutral.
    pub contrast: f32,
    /// Gamma, `1.0` neutral.
    pub gamma: f32,
    /// Horizontal stretch, `1.0` neutral.
    pub xscale: f32,
    /// Vertical stretch, `1.0` neutral.
    pub yscale: f32,
    /// Horizontal offset as a fraction of the item, `0.0` neutral.
    pub xoffset: f32,
    /// Vertical offset as a fraction of the item, `0.0` neutral.
    pub yoffset: f32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            orientation: Orientation::ROT0,
            brightness: 1.0,
            contrast: 1.0,
            gamma: 1.0,
            xscale: 1.0,
            yscale: 1.0,
            xoffset: 0.0,
            yoffset: 0.0,
        }
    }
}

impl UserSettings {
    /// The color adjustment part of the settings.
    #[must_use]
    pub fn adjust(&self) -> ColorAdjust {
        ColorAdjust {
            brightness: self.brightness,
            contrast: self.contrast,
            gamma: self.gamma,
        }
    }

    /// The placement part of the settings.
    #[must_use]
    pub fn placement(&self) -> Placement {
        Placement {
            orientation: self.orientation,
            xscale: f64::from(self.xscale),
            yscale: f64::from(self.yscale),
            xoffset: f64::from(self.xoffset),
            yoffset: f64::from(self.yoffset),
        }
    }
}

/// A color lookup the consumer applies while sampling a texture.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorTable {
    /// Adjusted palette for indexed sources.
    Palette(Arc<Vec<u32>>),
    /// Per-channel table for direct-color sources.
    Channel(Arc<BcgTable>),
}

/// Glyph metrics and textures for [`Container::add_glyph`].
pub trait Font {
    /// Advance width of `ch` at the given height and aspect, in container
    /// units.
    fn char_width(&self, height: f32, aspect: f32, ch: char) -> f32;

    /// Texture holding the rendered glyph, if `ch` has one.
    fn char_texture(&self, ch: char) -> Option<TextureId>;
}

/// An ordered list of draw items plus color correction state.
#[derive(Clone, Debug)]
pub struct Container {
    items: Vec<DrawItem>,
    settings: UserSettings,
    bcg: Arc<BcgTable>,
    palette: Vec<u32>,
    adjusted: Option<Arc<Vec<u32>>>,
    overlay: Option<TextureId>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Creates an empty container with neutral settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            settings: UserSettings::default(),
            bcg: Arc::new(BcgTable::default()),
            palette: Vec::new(),
            adjusted: None,
            overlay: None,
        }
    }

    /// Appends a line from `(x0, y0)` to `(x1, y1)`.
    pub fn add_line(
        &mut self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        width: f32,
        color: Color,
        flags: ItemFlags,
    ) {
        self.items.push(DrawItem {
            kind: ItemKind::Line { width },
            bounds: rect(x0, y0, x1, y1),
            color,
            flags,
        });
    }

    /// Appends a rectangle, textured when `texture` is set.
    pub fn add_quad(
        &mut self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        color: Color,
        texture: Option<TextureId>,
        flags: ItemFlags,
    ) {
        self.items.push(DrawItem {
            kind: ItemKind::Quad { texture },
            bounds: rect(x0, y0, x1, y1),
            color,
            flags,
        });
    }

    /// Appends one character cell at `(x0, y0)` and returns its advance.
    pub fn add_glyph(
        &mut self,
        x0: f32,
        y0: f32,
        height: f32,
        aspect: f32,
        color: Color,
        font: &dyn Font,
        ch: char,
    ) -> f32 {
        let width = font.char_width(height, aspect, ch);
        self.items.push(DrawItem {
            kind: ItemKind::Glyph {
                texture: font.char_texture(ch),
            },
            bounds: rect(x0, y0, x0 + width, y0 + height),
            color,
            flags: ItemFlags::default(),
        });
        width
    }

    /// Appends an untextured, alpha-blended rectangle.
    pub fn add_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color) {
        self.add_quad(
            x0,
            y0,
            x1,
            y1,
            color,
            None,
            ItemFlags::blend(BlendMode::Alpha),
        );
    }

    /// Appends a round point of the given diameter.
    pub fn add_point(&mut self, x0: f32, y0: f32, diameter: f32, color: Color, flags: ItemFlags) {
        self.add_line(x0, y0, x0, y0, diameter, color, flags);
    }

    /// Drops every item; called at the start of a producer's frame.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The items appended since the last [`clear`](Self::clear).
    #[must_use]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    /// Returns `true` if nothing has been drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current user settings.
    #[must_use]
    pub fn user_settings(&self) -> &UserSettings {
        &self.settings
    }

    /// Replaces the user settings and rebuilds the color tables.
    pub fn set_user_settings(&mut self, settings: UserSettings) {
        self.settings = settings;
        self.recompute_lookups();
    }

    /// Placement of the contents inside an item box.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.settings.placement()
    }

    /// Attaches a palette for indexed sources and adjusts every entry.
    pub fn set_palette(&mut self, palette: &[u32]) {
        self.palette = palette.to_vec();
        self.recompute_lookups();
    }

    /// Re-derives the adjusted entries whose bit is set in `dirty`.
    ///
    /// `dirty` holds one bit per palette entry, 32 entries per word. A palette
    /// of a different length than the attached one is treated as a full
    /// replacement.
    pub fn update_palette(&mut self, palette: &[u32], dirty: &[u32]) {
        if palette.len() != self.palette.len() {
            self.set_palette(palette);
            return;
        }
        let Some(adjusted) = self.adjusted.as_mut() else {
            return;
        };
        // Lists still holding the previous table keep it; otherwise the
        // entries are rewritten in place.
        let adjusted = Arc::make_mut(adjusted);
        for (word_idx, &word) in dirty.iter().enumerate() {
            let mut bits = word;
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                let idx = word_idx * 32 + bit;
                let Some(&px) = palette.get(idx) else {
                    break;
                };
                self.palette[idx] = px;
                adjusted[idx] = self.bcg.adjust_argb(px);
            }
        }
    }

    /// The adjusted palette, if one is attached.
    #[must_use]
    pub fn adjusted_palette(&self) -> Option<&Arc<Vec<u32>>> {
        self.adjusted.as_ref()
    }

    /// The current brightness/contrast/gamma table.
    #[must_use]
    pub fn bcg_table(&self) -> &Arc<BcgTable> {
        &self.bcg
    }

    /// Adjusts one floating-point color channel by the container's settings.
    #[must_use]
    pub fn apply_brightness_contrast_gamma_fp(&self, sample: f32) -> f32 {
        self.settings.adjust().apply_fp(sample)
    }

    /// Adjusts the color channels of an untextured item's color.
    #[must_use]
    pub fn adjust_color(&self, color: Color) -> Color {
        let adjust = self.settings.adjust();
        if adjust.is_identity() {
            return color;
        }
        Color::new(
            adjust.apply_fp(color.r),
            adjust.apply_fp(color.g),
            adjust.apply_fp(color.b),
            color.a,
        )
    }

    /// The table a consumer needs to sample a texture of `format`.
    ///
    /// Returns `None` when sampling needs no lookup: direct-color sources
    /// under neutral settings, or indexed sources without a palette.
    #[must_use]
    pub fn color_table_for(&self, format: PixelFormat) -> Option<ColorTable> {
        match format {
            PixelFormat::Palette16 | PixelFormat::PaletteA16 => {
                self.adjusted.clone().map(ColorTable::Palette)
            }
            PixelFormat::Argb32 | PixelFormat::Rgb32 | PixelFormat::Yuy16 => {
                if self.settings.adjust().is_identity() {
                    None
                } else {
                    Some(ColorTable::Channel(Arc::clone(&self.bcg)))
                }
            }
        }
    }

    /// Texture multiplied over the container's contents, if any.
    #[must_use]
    pub fn overlay(&self) -> Option<TextureId> {
        self.overlay
    }

    /// Sets or clears the overlay texture.
    pub fn set_overlay(&mut self, texture: Option<TextureId>) {
        self.overlay = texture;
    }

    fn recompute_lookups(&mut self) {
        self.bcg = Arc::new(BcgTable::new(&self.settings.adjust()));
        if self.palette.is_empty() {
            self.adjusted = None;
            return;
        }
        let adjusted: Vec<u32> = self
            .palette
            .iter()
            .map(|&px| self.bcg.adjust_argb(px))
            .collect();
        self.adjusted = Some(Arc::new(adjusted));
    }
}

fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Rect {
    Rect::new(f64::from(x0), f64::from(y0), f64::from(x1), f64::from(y1))
}

/// Handle to a container owned by the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContainerId(pub(crate) Key<Container>);

impl ContainerId {
    /// Wraps an arena key.
    #[must_use]
    pub fn from_key(key: Key<Container>) -> Self {
        Self(key)
    }

    /// The underlying arena key.
    #[must_use]
    pub fn key(self) -> Key<Container> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Mono;

    impl Font for Mono {
        fn char_width(&self, height: f32, aspect: f32, _ch: char) -> f32 {
            height * aspect * 0.5
        }

        fn char_texture(&self, _ch: char) -> Option<TextureId> {
            None
        }
    }

    #[test]
    fn items_keep_insertion_order() {
        let mut c = Container::new();
        c.add_rect(0.0, 0.0, 1.0, 1.0, Color::WHITE);
        c.add_line(0.0, 0.0, 1.0, 1.0, 1.0, Color::WHITE, ItemFlags::default());
        c.add_point(0.5, 0.5, 0.1, Color::WHITE, ItemFlags::default());
        assert_eq!(c.items().len(), 3);
        assert!(matches!(c.items()[0].kind, ItemKind::Quad { texture: None }));
        assert!(matches!(c.items()[1].kind, ItemKind::Line { .. }));
        assert_eq!(c.items()[2].bounds, Rect::new(0.5, 0.5, 0.5, 0.5));
        c.clear();
        assert!(c.is_empty());
    }

    #[test]
    fn glyph_width_comes_from_font() {
        let mut c = Container::new();
        let adv = c.add_glyph(0.25, 0.0, 0.5, 1.0, Color::WHITE, &Mono, 'A');
        assert_eq!(adv, 0.25);
        assert_eq!(c.items()[0].bounds, Rect::new(0.25, 0.0, 0.5, 0.5));
        assert!(matches!(c.items()[0].kind, ItemKind::Glyph { .. }));
    }

    #[test]
    fn neutral_settings_need_no_table() {
        let mut c = Container::new();
        assert!(c.color_table_for(PixelFormat::Rgb32).is_none());
        assert!(c.color_table_for(PixelFormat::Palette16).is_none());
        c.set_user_settings(UserSettings {
            contrast: 0.5,
            ..UserSettings::default()
        });
        assert!(matches!(
            c.color_table_for(PixelFormat::Rgb32),
            Some(ColorTable::Channel(_))
        ));
    }

    #[test]
    fn settings_rebuild_palette() {
        let mut c = Container::new();
        c.set_palette(&[0xffff_ffff, 0xff80_8080]);
        assert_eq!(c.adjusted_palette().unwrap()[0], 0xffff_ffff);
        c.set_user_settings(UserSettings {
            contrast: 0.0,
            ..UserSettings::default()
        });
        assert_eq!(&*c.adjusted_palette().unwrap().clone(), &[0xff00_0000, 0xff00_0000]);
    }

    #[test]
    fn update_palette_touches_only_dirty_entries() {
        let mut c = Container::new();
        c.set_palette(&[0; 40]);
        let mut next = vec![0xff11_1111; 40];
        next[33] = 0xff22_2222;
        // Entries 1 and 33 are dirty.
        c.update_palette(&next, &[0b10, 0b10]);
        let adjusted = c.adjusted_palette().unwrap();
        assert_eq!(adjusted[0], 0);
        assert_eq!(adjusted[1], 0xff11_1111);
        assert_eq!(adjusted[2], 0);
        assert_eq!(adjusted[33], 0xff22_2222);
        assert_eq!(adjusted[34], 0);
    }

    #[test]
    fn update_palette_writes_in_place_unless_shared() {
        let mut c = Container::new();
        c.set_palette(&[0; 4]);
        let before = Arc::clone(c.adjusted_palette().unwrap());
        c.update_palette(&[0xff11_1111; 4], &[0b1]);
        // A table still held elsewhere is left untouched.
        assert_eq!(before[0], 0);
        assert!(!Arc::ptr_eq(&before, c.adjusted_palette().unwrap()));
        drop(before);

        let table = Arc::as_ptr(c.adjusted_palette().unwrap());
        c.update_palette(&[0xff11_1111; 4], &[0b10]);
        assert_eq!(Arc::as_ptr(c.adjusted_palette().unwrap()), table);
        assert_eq!(c.adjusted_palette().unwrap()[..2], [0xff11_1111, 0xff11_1111]);
    }

    #[test]
    fn untextured_color_adjustment() {
        let mut c = Container::new();
        let color = Color::new(0.5, 0.25, 1.0, 0.5);
        assert_eq!(c.adjust_color(color), color);
        c.set_user_settings(UserSettings {
            brightness: 1.5,
            ..UserSettings::default()
        });
        let adjusted = c.adjust_color(color);
        assert!((adjusted.r - 1.0).abs() < 1e-6);
        assert_eq!(adjusted.a, 0.5);
        assert!((c.apply_brightness_contrast_gamma_fp(0.0) - 0.5).abs() < 1e-6);
    }
}
