// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Floating-point colors and packed ARGB pixels.

use core::ops::Mul;

/// An RGBA color with `f32` channels nominally in `0.0..=1.0`.
///
/// Colors are used both as the tint of a drawn item and as the chained
/// multiplier carried by a [`ItemTransform`](crate::transform::ItemTransform),
/// so [`Mul`] multiplies channel-wise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Opaque white, the multiplicative identity.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a color from its four channels.
    #[inline]
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns `true` if alpha is exactly one.
    #[inline]
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// Returns `true` if every channel lies in `0.0..=1.0`.
    #[must_use]
    pub fn is_in_range(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }

    /// Multiplies the color channels by alpha and sets alpha to one.
    #[must_use]
    pub fn premultiplied_opaque(self) -> Self {
        Self::new(self.r * self.a, self.g * self.a, self.b * self.a, 1.0)
    }

    /// Packs the color into an `0xAARRGGBB` pixel, clamping each channel.
    #[must_use]
    pub fn to_argb(self) -> u32 {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u32;
        argb(q(self.a), q(self.r), q(self.g), q(self.b))
    }

    /// Unpacks an `0xAARRGGBB` pixel.
    #[must_use]
    pub fn from_argb(px: u32) -> Self {
        let f = |c: u32| c as f32 / 255.0;
        Self::new(f(red(px)), f(green(px)), f(blue(px)), f(alpha(px)))
    }
}

impl Default for Color {
    #[inline]
    fn default() -> Self {
        Self::WHITE
    }
}

impl Mul for Color {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.r * rhs.r,
            self.g * rhs.g,
            self.b * rhs.b,
            self.a * rhs.a,
        )
    }
}

/// Packs four 8-bit channels into an `0xAARRGGBB` pixel.
#[inline]
#[must_use]
pub const fn argb(a: u32, r: u32, g: u32, b: u32) -> u32 {
    ((a & 0xff) << 24) | ((r & 0xff) << 16) | ((g & 0xff) << 8) | (b & 0xff)
}

/// Alpha channel of a packed pixel.
#[inline]
#[must_use]
pub const fn alpha(px: u32) -> u32 {
    px >> 24
}

/// Red channel of a packed pixel.
#[inline]
#[must_use]
pub const fn red(px: u32) -> u32 {
    (px >> 16) & 0xff
}

/// Green channel of a packed pixel.
#[inline]
#[must_use]
pub const fn green(px: u32) -> u32 {
    (px >> 8) & 0xff
}

/// Blue channel of a packed pixel.
#[inline]
#[must_use]
pub const fn blue(px: u32) -> u32 {
    px & 0xff
}

/// Composites `src` over `dst` with straight (non-premultiplied) alpha.
#[must_use]
pub fn blend_over(dst: u32, src: u32) -> u32 {
    let sa = alpha(src);
    if sa == 0xff {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let da = alpha(dst);
    let inv = 0xff - sa;
    let out_a = sa + da * inv / 0xff;
    if out_a == 0 {
        return 0;
    }
    let mix = |s: u32, d: u32| (s * sa + d * da * inv / 0xff) / out_a;
    argb(
        out_a,
        mix(red(src), red(dst)),
        mix(green(src), green(dst)),
        mix(blue(src), blue(dst)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_is_multiplicative_identity() {
        let c = Color::new(0.2, 0.4, 0.6, 0.8);
        assert_eq!(c * Color::WHITE, c);
        assert_eq!(Color::WHITE * c, c);
    }

    #[test]
    fn argb_round_trip_of_extremes() {
        assert_eq!(Color::WHITE.to_argb(), 0xffff_ffff);
        assert_eq!(Color::BLACK.to_argb(), 0xff00_0000);
        assert_eq!(Color::from_argb(0x80ff_0000).r, 1.0);
    }

    #[test]
    fn premultiply_sets_alpha_to_one() {
        let c = Color::new(1.0, 0.5, 0.0, 0.5).premultiplied_opaque();
        assert_eq!(c, Color::new(0.5, 0.25, 0.0, 1.0));
    }

    #[test]
    fn blend_over_opaque_and_transparent() {
        assert_eq!(blend_over(0xff00_00ff, 0xffff_0000), 0xffff_0000);
        assert_eq!(blend_over(0xff00_00ff, 0x00ff_0000), 0xff00_00ff);
        assert_eq!(blend_over(0, 0x80ff_ffff), 0x80ff_ffff);
    }
}
