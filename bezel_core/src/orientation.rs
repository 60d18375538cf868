// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis swap and flip flags.
//!
//! An [`Orientation`] applies, in order, an optional swap of the X and Y axes,
//! then an optional horizontal flip, then an optional vertical flip. The four
//! rotations are particular combinations:
//!
//! | rotation | flags               |
//! |----------|---------------------|
//! | 0°       | none                |
//! | 90°      | swap-XY + flip-X    |
//! | 180°     | flip-X + flip-Y     |
//! | 270°     | swap-XY + flip-Y    |
//!
//! `a + b` is the orientation equivalent to applying `a` and then `b`.

use core::fmt;
use core::ops::{Add, AddAssign};

use kurbo::{Point, Rect};

/// A composable set of swap-XY / flip-X / flip-Y flags.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Orientation(u8);

impl Orientation {
    /// Mirror horizontally.
    pub const FLIP_X: Self = Self(0x01);
    /// Mirror vertically.
    pub const FLIP_Y: Self = Self(0x02);
    /// Exchange the X and Y axes.
    pub const SWAP_XY: Self = Self(0x04);

    /// No rotation.
    pub const ROT0: Self = Self(0);
    /// Rotate 90° clockwise.
    pub const ROT90: Self = Self(0x04 | 0x01);
    /// Rotate 180°.
    pub const ROT180: Self = Self(0x01 | 0x02);
    /// Rotate 270° clockwise.
    pub const ROT270: Self = Self(0x04 | 0x02);

    const MASK: u8 = 0x07;

    /// Creates an orientation from raw flag bits; unknown bits are dropped.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    /// Raw flag bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the X and Y axes are exchanged.
    #[inline]
    #[must_use]
    pub const fn swap_xy(self) -> bool {
        self.0 & Self::SWAP_XY.0 != 0
    }

    /// Whether the result is mirrored horizontally.
    #[inline]
    #[must_use]
    pub const fn flip_x(self) -> bool {
        self.0 & Self::FLIP_X.0 != 0
    }

    /// Whether the result is mirrored vertically.
    #[inline]
    #[must_use]
    pub const fn flip_y(self) -> bool {
        self.0 & Self::FLIP_Y.0 != 0
    }

    /// Toggles the flags present in `other`.
    #[inline]
    #[must_use]
    pub const fn toggle(self, other: Self) -> Self {
        Self(self.0 ^ other.0)
    }

    /// Exchanges the flip-X and flip-Y bits, leaving swap-XY untouched.
    #[inline]
    #[must_use]
    pub const fn swap_flip_bits(self) -> Self {
        let fx = (self.0 & 0x01) << 1;
        let fy = (self.0 & 0x02) >> 1;
        Self((self.0 & 0x04) | fx | fy)
    }

    /// Returns the orientation that undoes `self`.
    #[inline]
    #[must_use]
    pub const fn reverse(self) -> Self {
        if self.swap_xy() {
            self.swap_flip_bits()
        } else {
            self
        }
    }

    /// Maps a rotation in degrees (0, 90, 180 or 270) to an orientation.
    #[must_use]
    pub const fn from_rotation(degrees: i64) -> Option<Self> {
        match degrees {
            0 => Some(Self::ROT0),
            90 => Some(Self::ROT90),
            180 => Some(Self::ROT180),
            270 => Some(Self::ROT270),
            _ => None,
        }
    }

    /// Returns the rotation in degrees if `self` is a pure rotation.
    #[must_use]
    pub fn rotation(self) -> Option<u16> {
        match self {
            Self::ROT0 => Some(0),
            Self::ROT90 => Some(90),
            Self::ROT180 => Some(180),
            Self::ROT270 => Some(270),
            _ => None,
        }
    }

    /// Applies the orientation to a point inside the unit square.
    #[must_use]
    pub fn apply_point(self, p: Point) -> Point {
        let (mut x, mut y) = (p.x, p.y);
        if self.swap_xy() {
            core::mem::swap(&mut x, &mut y);
        }
        if self.flip_x() {
            x = 1.0 - x;
        }
        if self.flip_y() {
            y = 1.0 - y;
        }
        Point::new(x, y)
    }

    /// Applies the orientation to bounds expressed in the unit square.
    ///
    /// The result may have inverted corners; normalize it before use.
    #[must_use]
    pub fn apply_rect(self, r: Rect) -> Rect {
        let p0 = self.apply_point(Point::new(r.x0, r.y0));
        let p1 = self.apply_point(Point::new(r.x1, r.y1));
        Rect::new(p0.x, p0.y, p1.x, p1.y)
    }
}

impl Add for Orientation {
    type Output = Self;

    /// Returns the orientation equivalent to applying `self`, then `rhs`.
    #[inline]
    fn add(self, rhs: Self) -> Self {
        let lhs = if rhs.swap_xy() {
            self.swap_flip_bits()
        } else {
            self
        };
        Self(lhs.0 ^ rhs.0)
    }
}

impl AddAssign for Orientation {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl fmt::Debug for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(deg) = self.rotation() {
            return write!(f, "Orientation(rot{deg})");
        }
        write!(
            f,
            "Orientation(swap_xy={}, flip_x={}, flip_y={})",
            self.swap_xy(),
            self.flip_x(),
            self.flip_y()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> impl Iterator<Item = Orientation> {
        (0..8).map(Orientation::from_bits)
    }

    const PROBES: [Point; 3] = [
        Point::new(0.1, 0.3),
        Point::new(0.7, 0.2),
        Point::new(0.0, 1.0),
    ];

    #[test]
    fn composition_matches_sequential_application() {
        for a in all() {
            for b in all() {
                let ab = a + b;
                for p in PROBES {
                    let seq = b.apply_point(a.apply_point(p));
                    let composed = ab.apply_point(p);
                    assert!(
                        (seq - composed).hypot() < 1e-12,
                        "{a:?} + {b:?} at {p:?}: {seq:?} != {composed:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn composition_is_associative() {
        for a in all() {
            for b in all() {
                for c in all() {
                    assert_eq!((a + b) + c, a + (b + c), "{a:?} {b:?} {c:?}");
                }
            }
        }
    }

    #[test]
    fn reverse_cancels() {
        for o in all() {
            assert_eq!(o + o.reverse(), Orientation::ROT0, "{o:?}");
            assert_eq!(o.reverse() + o, Orientation::ROT0, "{o:?}");
        }
    }

    #[test]
    fn rotations_compose_like_angles() {
        assert_eq!(Orientation::ROT90 + Orientation::ROT90, Orientation::ROT180);
        assert_eq!(Orientation::ROT90 + Orientation::ROT180, Orientation::ROT270);
        assert_eq!(Orientation::ROT270 + Orientation::ROT90, Orientation::ROT0);
    }

    #[test]
    fn rot90_moves_top_left_to_top_right() {
        let p = Orientation::ROT90.apply_point(Point::new(0.0, 0.0));
        assert_eq!(p, Point::new(1.0, 0.0));
    }

    #[test]
    fn from_rotation_rejects_odd_angles() {
        assert_eq!(Orientation::from_rotation(45), None);
        assert_eq!(Orientation::from_rotation(270), Some(Orientation::ROT270));
    }
}
