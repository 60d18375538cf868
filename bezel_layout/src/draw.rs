// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rasterizing elements into bitmaps.
//!
//! Elements are drawn on demand at whatever pixel size the compositor asks
//! for, through an [`ElementScaler`] attached to the element's per-state
//! texture. Decoding image files and shaping text are left to the host via
//! the [`ImageLoader`] and [`TextRenderer`] traits.

use std::fmt;
use std::sync::Arc;

use bezel_core::bitmap::{Bitmap, PixelFormat};
use bezel_core::color::{Color, blend_over, red};
use bezel_core::geometry::PixelRect;
use bezel_core::texture::{Scaler, SourceRef};
use kurbo::{Line, ParamCurveNearest, Point};

use crate::element::{Component, ComponentKind, ImageSlot, LayoutElement, SegmentKind, TextAlign};

/// Decodes image files referenced by `image` components.
pub trait ImageLoader: Send + Sync {
    /// Returns the decoded image as ARGB, or `None` if it is missing or
    /// undecodable.
    fn load(&self, file: &str) -> Option<Bitmap>;
}

/// Draws `text` components.
pub trait TextRenderer: Send + Sync {
    /// Draws `text` into `bounds` of `dest` in the packed ARGB `color`.
    fn draw_text(
        &self,
        dest: &mut Bitmap,
        bounds: PixelRect,
        text: &str,
        color: u32,
        align: TextAlign,
    );
}

/// Host services used while drawing elements.
#[derive(Clone, Default)]
pub struct Assets {
    /// Image decoder; without one every image draws as a placeholder.
    pub images: Option<Arc<dyn ImageLoader>>,
    /// Text renderer; without one text components draw nothing.
    pub text: Option<Arc<dyn TextRenderer>>,
}

impl fmt::Debug for Assets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assets")
            .field("images", &self.images.is_some())
            .field("text", &self.text.is_some())
            .finish()
    }
}

/// The [`Scaler`] behind an element's per-state texture.
#[derive(Debug)]
pub struct ElementScaler {
    element: Arc<LayoutElement>,
    state: i32,
    assets: Assets,
}

impl ElementScaler {
    /// Draws `element` in `state`.
    #[must_use]
    pub fn new(element: Arc<LayoutElement>, state: i32, assets: Assets) -> Self {
        Self {
            element,
            state,
            assets,
        }
    }
}

impl Scaler for ElementScaler {
    fn scale(&self, dest: &mut Bitmap, _source: Option<SourceRef<'_>>) {
        self.element.draw(dest, self.state, &self.assets);
    }

    fn output_format(&self, _source: Option<PixelFormat>) -> PixelFormat {
        PixelFormat::Argb32
    }
}

impl LayoutElement {
    /// Draws every component matching `state` into `dest`, which is first
    /// cleared to transparent.
    pub fn draw(&self, dest: &mut Bitmap, state: i32, assets: &Assets) {
        dest.fill(0);
        for component in self.components() {
            if component.matches(state) {
                let rect = PixelRect::from_unit_bounds(&component.bounds, dest.width(), dest.height());
                if !rect.is_empty() {
                    draw_component(component, dest, rect, state, assets);
                }
            }
        }
    }
}

fn draw_component(c: &Component, dest: &mut Bitmap, rect: PixelRect, state: i32, assets: &Assets) {
    let color = c.color.to_argb();
    match &c.kind {
        ComponentKind::Rect => dest.blend_rect(rect, color),
        ComponentKind::Disk => draw_disk(dest, rect, color),
        ComponentKind::Image {
            file,
            alpha_file,
            cache,
        } => {
            let image = load_image(cache, file, alpha_file.as_deref(), assets);
            draw_image(dest, rect, &image, c.color);
        }
        ComponentKind::Text { string, align } => match &assets.text {
            Some(renderer) => renderer.draw_text(dest, rect, string, color, *align),
            None => log::warn!("no text renderer available; skipping text `{string}`"),
        },
        ComponentKind::Segments(kind) => {
            draw_segments(dest, rect, &segment_strokes(*kind), state, c.color);
        }
        ComponentKind::DotMatrix { dots } => draw_dots(dest, rect, *dots, state, c.color),
    }
}

fn unlit(color: Color) -> u32 {
    Color::new(color.r, color.g, color.b, color.a * (f32::from(0x20_u8) / 255.0)).to_argb()
}

fn draw_disk(dest: &mut Bitmap, rect: PixelRect, color: u32) {
    let rx = f64::from(rect.width) * 0.5;
    let ry = f64::from(rect.height) * 0.5;
    let cx = f64::from(rect.x) + rx;
    let cy = f64::from(rect.y) + ry;
    for y in rect.y..rect.bottom() {
        let dy = (f64::from(y) + 0.5 - cy) / ry;
        for x in rect.x..rect.right() {
            let dx = (f64::from(x) + 0.5 - cx) / rx;
            if dx * dx + dy * dy <= 1.0 {
                dest.blend_pixel(x, y, color);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

const PLACEHOLDER_SIZE: u32 = 16;

fn placeholder() -> Bitmap {
    let mut bm = Bitmap::new(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, PixelFormat::Argb32);
    for y in 0..PLACEHOLDER_SIZE {
        for x in 0..PLACEHOLDER_SIZE {
            let magenta = ((x / 4) + (y / 4)) % 2 == 0;
            bm.set_pixel(x, y, if magenta { 0xffff_00ff } else { 0xff00_0000 });
        }
    }
    bm
}

fn load_image(slot: &ImageSlot, file: &str, alpha_file: Option<&str>, assets: &Assets) -> Arc<Bitmap> {
    let image = slot.0.get_or_init(|| {
        let Some(loader) = &assets.images else {
            log::warn!("no image loader available; drawing placeholder for `{file}`");
            return Arc::new(placeholder());
        };
        let Some(mut image) = loader.load(file) else {
            log::warn!("unable to load image `{file}`; drawing placeholder");
            return Arc::new(placeholder());
        };
        if let Some(alpha_file) = alpha_file {
            match loader.load(alpha_file) {
                Some(alpha) => apply_alpha(&mut image, &alpha),
                None => log::warn!("unable to load alpha image `{alpha_file}`"),
            }
        }
        Arc::new(image)
    });
    Arc::clone(image)
}

/// Replaces the alpha of `image` with the red channel of `alpha`, sampled to
/// the image's size.
fn apply_alpha(image: &mut Bitmap, alpha: &Bitmap) {
    if alpha.width() == 0 || alpha.height() == 0 {
        return;
    }
    for y in 0..image.height() {
        let ay = y * alpha.height() / image.height().max(1);
        for x in 0..image.width() {
            let ax = x * alpha.width() / image.width().max(1);
            let a = alpha.pixel(ax, ay).map_or(0xff, red);
            if let Some(px) = image.pixel(x, y) {
                image.set_pixel(x, y, (px & 0x00ff_ffff) | (a << 24));
            }
        }
    }
}

fn draw_image(dest: &mut Bitmap, rect: PixelRect, image: &Bitmap, tint: Color) {
    if image.width() == 0 || image.height() == 0 {
        return;
    }
    let tinted = tint != Color::WHITE;
    for y in 0..rect.height {
        let sy = (u64::from(y) * u64::from(image.height()) / u64::from(rect.height)) as u32;
        let row = image.row(sy);
        for x in 0..rect.width {
            let sx = (u64::from(x) * u64::from(image.width()) / u64::from(rect.width)) as u32;
            let mut px = row[sx as usize];
            if tinted {
                px = (Color::from_argb(px) * tint).to_argb();
            }
            let (dx, dy) = (rect.x + x, rect.y + y);
            if let Some(dst) = dest.pixel(dx, dy) {
                dest.set_pixel(dx, dy, blend_over(dst, px));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Segment displays
// ---------------------------------------------------------------------------

/// Design-space size of one digit cell, including slant and point.
const SEG_W: f64 = 250.0;
const SEG_H: f64 = 400.0;
/// Horizontal shift of the top edge relative to the bottom.
const SEG_SKEW: f64 = 40.0;
const SEG_HALF: f64 = 20.0;
const SEG_GAP: f64 = 10.0;

const L: f64 = 20.0;
const C: f64 = 100.0;
const R: f64 = 180.0;
const T: f64 = 20.0;
const M: f64 = 200.0;
const B: f64 = 380.0;

#[derive(Clone, Copy, Debug)]
enum Stroke {
    Bar { line: Line, half_width: f64 },
    Dot { center: Point, radius: f64 },
}

impl Stroke {
    fn bar(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let (p0, p1) = (Point::new(x0, y0), Point::new(x1, y1));
        let dir = p1 - p0;
        let len = dir.hypot();
        let inset = if len > 2.0 * SEG_GAP {
            dir * (SEG_GAP / len)
        } else {
            kurbo::Vec2::ZERO
        };
        let diagonal = x0 != x1 && y0 != y1;
        Self::Bar {
            line: Line::new(p0 + inset, p1 - inset),
            half_width: if diagonal { SEG_HALF * 0.75 } else { SEG_HALF },
        }
    }

    fn contains(&self, p: Point) -> bool {
        match *self {
            Self::Bar { line, half_width } => {
                let nearest = line.nearest(p, 1e-6);
                nearest.distance_sq <= half_width * half_width
            }
            Self::Dot { center, radius } => (p - center).hypot2() <= radius * radius,
        }
    }
}

const DECIMAL_POINT: Stroke = Stroke::Dot {
    center: Point::new(215.0, B),
    radius: 18.0,
};

fn comma() -> Stroke {
    Stroke::Bar {
        line: Line::new((215.0, B), (200.0, 398.0)),
        half_width: 8.0,
    }
}

/// Strokes in bit order.
///
/// Seven-segment bits are `a` (top), `b`, `c` (right side, top to bottom),
/// `d` (bottom), `e`, `f` (left side, bottom to top), `g` (middle) and the
/// decimal point. Fourteen- and sixteen-segment displays add the split middle
/// bar, the two center verticals and the four diagonals; the `sc` variants end
/// with the decimal point and the comma.
fn segment_strokes(kind: SegmentKind) -> Vec<Stroke> {
    let a = Stroke::bar(L, T, R, T);
    let b = Stroke::bar(R, T, R, M);
    let c = Stroke::bar(R, M, R, B);
    let d = Stroke::bar(L, B, R, B);
    let e = Stroke::bar(L, M, L, B);
    let f = Stroke::bar(L, T, L, M);
    let g = Stroke::bar(L, M, R, M);
    let g1 = Stroke::bar(L, M, C, M);
    let g2 = Stroke::bar(C, M, R, M);
    let upper_left = Stroke::bar(L, T, C, M);
    let upper_mid = Stroke::bar(C, T, C, M);
    let upper_right = Stroke::bar(R, T, C, M);
    let lower_left = Stroke::bar(C, M, L, B);
    let lower_mid = Stroke::bar(C, M, C, B);
    let lower_right = Stroke::bar(C, M, R, B);
    match kind {
        SegmentKind::Led7 => vec![a, b, c, d, e, f, g, DECIMAL_POINT],
        SegmentKind::Led8Gts1 => vec![a, b, c, d, e, f, g, Stroke::bar(C, T, C, B)],
        SegmentKind::Led14 | SegmentKind::Led14Sc => {
            let mut strokes = vec![
                a,
                b,
                c,
                d,
                e,
                f,
                g1,
                g2,
                upper_left,
                upper_mid,
                upper_right,
                lower_left,
                lower_mid,
                lower_right,
            ];
            if kind == SegmentKind::Led14Sc {
                strokes.extend([DECIMAL_POINT, comma()]);
            }
            strokes
        }
        SegmentKind::Led16 | SegmentKind::Led16Sc => {
            let mut strokes = vec![
                Stroke::bar(L, T, C, T),
                Stroke::bar(C, T, R, T),
                b,
                c,
                Stroke::bar(C, B, R, B),
                Stroke::bar(L, B, C, B),
                e,
                f,
                upper_left,
                upper_mid,
                upper_right,
                g2,
                lower_right,
                lower_mid,
                lower_left,
                g1,
            ];
            if kind == SegmentKind::Led16Sc {
                strokes.extend([DECIMAL_POINT, comma()]);
            }
            strokes
        }
    }
}

fn draw_segments(dest: &mut Bitmap, rect: PixelRect, strokes: &[Stroke], state: i32, color: Color) {
    let on = color.to_argb();
    let off = unlit(color);
    let w = f64::from(rect.width);
    let h = f64::from(rect.height);
    for y in 0..rect.height {
        let v = (f64::from(y) + 0.5) / h * SEG_H;
        let shift = SEG_SKEW * (1.0 - v / SEG_H);
        for x in 0..rect.width {
            let u = (f64::from(x) + 0.5) / w * SEG_W - shift;
            let p = Point::new(u, v);
            let mut covered = false;
            let mut lit = false;
            for (bit, stroke) in strokes.iter().enumerate() {
                if stroke.contains(p) {
                    covered = true;
                    if (state >> bit) & 1 != 0 {
                        lit = true;
                        break;
                    }
                }
            }
            if covered {
                dest.blend_pixel(rect.x + x, rect.y + y, if lit { on } else { off });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Dot matrix
// ---------------------------------------------------------------------------

fn draw_dots(dest: &mut Bitmap, rect: PixelRect, dots: u8, state: i32, color: Color) {
    let on = color.to_argb();
    let off = unlit(color);
    let cell = f64::from(rect.width) / f64::from(dots.max(1));
    let h = f64::from(rect.height);
    let radius = cell.min(h) * 0.45;
    for i in 0..dots {
        let cx = f64::from(rect.x) + cell * (f64::from(i) + 0.5);
        let cy = f64::from(rect.y) + h * 0.5;
        let px = if (state >> i) & 1 != 0 { on } else { off };
        let x0 = (cx - radius).floor().max(0.0) as u32;
        let y0 = (cy - radius).floor().max(0.0) as u32;
        let x1 = ((cx + radius).ceil() as u32).min(rect.right());
        let y1 = ((cy + radius).ceil() as u32).min(rect.bottom());
        for y in y0..y1 {
            let dy = f64::from(y) + 0.5 - cy;
            for x in x0..x1 {
                let dx = f64::from(x) + 0.5 - cx;
                if dx * dx + dy * dy <= radius * radius {
                    dest.blend_pixel(x, y, px);
                }
            }
        }
    }
}
