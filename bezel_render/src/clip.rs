// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clipping of lines and quads against an axis-aligned rectangle.

use kurbo::{Point, Rect};

use crate::primitive::TexCoords;

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

fn outcode(p: Point, clip: &Rect) -> u8 {
    let mut code = INSIDE;
    if p.x < clip.x0 {
        code |= LEFT;
    } else if p.x > clip.x1 {
        code |= RIGHT;
    }
    if p.y < clip.y0 {
        code |= TOP;
    } else if p.y > clip.y1 {
        code |= BOTTOM;
    }
    code
}

/// Clips the line `(x0, y0) → (x1, y1)` to `clip` (Cohen–Sutherland).
///
/// Returns the clipped endpoints in their original order, or `None` when the
/// line lies entirely outside.
#[must_use]
pub fn clip_line(line: Rect, clip: &Rect) -> Option<Rect> {
    let mut p0 = Point::new(line.x0, line.y0);
    let mut p1 = Point::new(line.x1, line.y1);
    let mut code0 = outcode(p0, clip);
    let mut code1 = outcode(p1, clip);
    loop {
        if code0 | code1 == INSIDE {
            return Some(Rect::new(p0.x, p0.y, p1.x, p1.y));
        }
        if code0 & code1 != INSIDE {
            return None;
        }
        let out = if code0 != INSIDE { code0 } else { code1 };
        let (dx, dy) = (p1.x - p0.x, p1.y - p0.y);
        // The endpoints straddle the chosen edge, so its divisor is nonzero.
        let p = if out & BOTTOM != 0 {
            Point::new(p0.x + dx * (clip.y1 - p0.y) / dy, clip.y1)
        } else if out & TOP != 0 {
            Point::new(p0.x + dx * (clip.y0 - p0.y) / dy, clip.y0)
        } else if out & RIGHT != 0 {
            Point::new(clip.x1, p0.y + dy * (clip.x1 - p0.x) / dx)
        } else {
            Point::new(clip.x0, p0.y + dy * (clip.x0 - p0.x) / dx)
        };
        if out == code0 {
            p0 = p;
            code0 = outcode(p0, clip);
        } else {
            p1 = p;
            code1 = outcode(p1, clip);
        }
    }
}

/// Clips a normalized quad to `clip`, adjusting its texture coordinates in
/// proportion.
///
/// Returns `None` when the quad does not overlap `clip` with positive area
/// on either axis; a quad merely touching an edge is rejected.
#[must_use]
pub fn clip_quad(bounds: Rect, coords: TexCoords, clip: &Rect) -> Option<(Rect, TexCoords)> {
    if bounds.y1 <= clip.y0 || bounds.y0 >= clip.y1 || bounds.x1 <= clip.x0 || bounds.x0 >= clip.x1
    {
        return None;
    }
    let mut b = bounds;
    let mut c = coords;
    let lerp = |from: Point, to: Point, frac: f64| from + (to - from) * frac;

    if b.y0 < clip.y0 {
        let frac = (clip.y0 - b.y0) / b.height();
        b.y0 = clip.y0;
        c.tl = lerp(c.tl, c.bl, frac);
        c.tr = lerp(c.tr, c.br, frac);
    }
    if b.y1 > clip.y1 {
        let frac = (b.y1 - clip.y1) / b.height();
        b.y1 = clip.y1;
        c.bl = lerp(c.bl, c.tl, frac);
        c.br = lerp(c.br, c.tr, frac);
    }
    if b.x0 < clip.x0 {
        let frac = (clip.x0 - b.x0) / b.width();
        b.x0 = clip.x0;
        c.tl = lerp(c.tl, c.tr, frac);
        c.bl = lerp(c.bl, c.br, frac);
    }
    if b.x1 > clip.x1 {
        let frac = (b.x1 - clip.x1) / b.width();
        b.x1 = clip.x1;
        c.tr = lerp(c.tr, c.tl, frac);
        c.br = lerp(c.br, c.bl, frac);
    }
    Some((b, c))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIP: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn line_inside_is_unchanged() {
        let line = Rect::new(10.0, 90.0, 20.0, 5.0);
        assert_eq!(clip_line(line, &CLIP), Some(line));
    }

    #[test]
    fn line_crossing_is_trimmed_in_order() {
        let clipped = clip_line(Rect::new(-50.0, 50.0, 150.0, 50.0), &CLIP).unwrap();
        assert_eq!(clipped, Rect::new(0.0, 50.0, 100.0, 50.0));
        let diag = clip_line(Rect::new(150.0, 150.0, 50.0, 50.0), &CLIP).unwrap();
        assert_eq!(diag, Rect::new(100.0, 100.0, 50.0, 50.0));
    }

    #[test]
    fn line_outside_is_rejected() {
        assert_eq!(clip_line(Rect::new(-10.0, -5.0, -1.0, 200.0), &CLIP), None);
        assert_eq!(clip_line(Rect::new(150.0, -10.0, 210.0, 50.0), &CLIP), None);
    }

    #[test]
    fn quad_inside_is_unchanged() {
        let q = Rect::new(10.0, 10.0, 20.0, 20.0);
        let (b, c) = clip_quad(q, TexCoords::default(), &CLIP).unwrap();
        assert_eq!(b, q);
        assert_eq!(c, TexCoords::default());
    }

    #[test]
    fn quad_outside_or_touching_is_rejected() {
        let tc = TexCoords::default();
        assert!(clip_quad(Rect::new(100.0, 0.0, 150.0, 50.0), tc, &CLIP).is_none());
        assert!(clip_quad(Rect::new(-20.0, -20.0, -10.0, -10.0), tc, &CLIP).is_none());
    }

    #[test]
    fn quad_partial_overlap_adjusts_texcoords() {
        // Left half of the quad lies outside.
        let (b, c) = clip_quad(
            Rect::new(-100.0, 0.0, 100.0, 100.0),
            TexCoords::default(),
            &CLIP,
        )
        .unwrap();
        assert_eq!(b, CLIP);
        assert!(close(c.tl, Point::new(0.5, 0.0)));
        assert!(close(c.bl, Point::new(0.5, 1.0)));
        assert!(close(c.tr, Point::new(1.0, 0.0)));

        // Bottom quarter lies outside.
        let (b, c) = clip_quad(
            Rect::new(0.0, 20.0, 100.0, 120.0),
            TexCoords::default(),
            &CLIP,
        )
        .unwrap();
        assert_eq!(b, Rect::new(0.0, 20.0, 100.0, 100.0));
        assert!(close(c.bl, Point::new(0.0, 0.8)));
        assert!(close(c.br, Point::new(1.0, 0.8)));
    }
}
