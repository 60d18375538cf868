// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Brightness, contrast and gamma adjustment.
//!
//! The adjusted value of a sample `s` in `0.0..=1.0` is
//!
//! ```text
//! s' = s^(1/gamma) * contrast + (brightness - 1)
//! ```
//!
//! With brightness, contrast and gamma all equal to one the mapping is the
//! identity, bit for bit: the power is skipped and the additive term is
//! exactly zero.

use crate::color::{alpha, argb, blue, green, red};

/// Brightness, contrast and gamma, each with a baseline of `1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorAdjust {
    /// Additive brightness; `1.0` leaves samples unchanged.
    pub brightness: f32,
    /// Multiplicative contrast; `1.0` leaves samples unchanged.
    pub contrast: f32,
    /// Gamma exponent denominator; `1.0` leaves samples unchanged.
    pub gamma: f32,
}

impl ColorAdjust {
    /// The baseline adjustment.
    pub const IDENTITY: Self = Self {
        brightness: 1.0,
        contrast: 1.0,
        gamma: 1.0,
    };

    /// Returns `true` if this adjustment leaves every sample unchanged.
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Adjusts a floating-point sample. See [`apply_bcg_fp`].
    #[inline]
    #[must_use]
    pub fn apply_fp(&self, sample: f32) -> f32 {
        apply_bcg_fp(sample, self.brightness, self.contrast, self.gamma)
    }

    /// Adjusts an 8-bit sample. See [`apply_bcg`].
    #[inline]
    #[must_use]
    pub fn apply(&self, sample: u8) -> u8 {
        apply_bcg(sample, self.brightness, self.contrast, self.gamma)
    }
}

impl Default for ColorAdjust {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Adjusts a floating-point sample by brightness, contrast and gamma.
///
/// The result is not clamped; callers that need a displayable value clamp it
/// themselves.
#[must_use]
pub fn apply_bcg_fp(sample: f32, brightness: f32, contrast: f32, gamma: f32) -> f32 {
    let s = if gamma == 1.0 {
        sample
    } else {
        sample.max(0.0).powf(1.0 / gamma)
    };
    s * contrast + (brightness - 1.0)
}

/// Adjusts an 8-bit sample by brightness, contrast and gamma, rounding and
/// clamping to `0..=255`.
#[must_use]
pub fn apply_bcg(sample: u8, brightness: f32, contrast: f32, gamma: f32) -> u8 {
    if brightness == 1.0 && contrast == 1.0 && gamma == 1.0 {
        return sample;
    }
    let f = apply_bcg_fp(f32::from(sample) / 255.0, brightness, contrast, gamma);
    (f * 255.0 + 0.5).clamp(0.0, 255.0) as u8
}

/// A 256-entry lookup table for direct-color sources.
#[derive(Clone, PartialEq, Eq)]
pub struct BcgTable([u8; 256]);

impl BcgTable {
    /// Builds the table for the given adjustment.
    #[must_use]
    pub fn new(adjust: &ColorAdjust) -> Self {
        let mut table = [0_u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = adjust.apply(i as u8);
        }
        Self(table)
    }

    /// Looks up one 8-bit sample.
    #[inline]
    #[must_use]
    pub fn get(&self, sample: u8) -> u8 {
        self.0[usize::from(sample)]
    }

    /// Adjusts the color channels of a packed `0xAARRGGBB` pixel, keeping
    /// alpha.
    #[must_use]
    pub fn adjust_argb(&self, px: u32) -> u32 {
        let lut = |c: u32| u32::from(self.0[c as usize]);
        argb(alpha(px), lut(red(px)), lut(green(px)), lut(blue(px)))
    }

    /// The raw table.
    #[must_use]
    pub fn as_slice(&self) -> &[u8; 256] {
        &self.0
    }

    /// Returns `true` if every entry maps to itself.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &v)| usize::from(v) == i)
    }
}

impl Default for BcgTable {
    fn default() -> Self {
        Self::new(&ColorAdjust::IDENTITY)
    }
}

impl core::fmt::Debug for BcgTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BcgTable")
            .field("identity", &self.is_identity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_is_exact_identity_fp() {
        let mut s = 0.0_f32;
        while s <= 1.0 {
            assert_eq!(apply_bcg_fp(s, 1.0, 1.0, 1.0), s);
            s += 0.013;
        }
        assert_eq!(apply_bcg_fp(0.1, 1.0, 1.0, 1.0), 0.1);
    }

    #[test]
    fn baseline_is_exact_identity_u8() {
        for s in 0..=255_u8 {
            assert_eq!(apply_bcg(s, 1.0, 1.0, 1.0), s);
        }
        assert!(BcgTable::default().is_identity());
    }

    #[test]
    fn brightness_offsets() {
        assert!((apply_bcg_fp(0.5, 1.25, 1.0, 1.0) - 0.75).abs() < 1e-6);
        assert_eq!(apply_bcg(255, 1.5, 1.0, 1.0), 255);
        assert_eq!(apply_bcg(0, 0.5, 1.0, 1.0), 0);
    }

    #[test]
    fn contrast_scales() {
        assert!((apply_bcg_fp(0.5, 1.0, 2.0, 1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn gamma_brightens_midtones() {
        let g = apply_bcg_fp(0.25, 1.0, 1.0, 2.0);
        assert!((g - 0.5).abs() < 1e-6);
        assert!(apply_bcg(64, 1.0, 1.0, 2.0) > 64);
    }

    #[test]
    fn table_adjusts_channels_not_alpha() {
        let table = BcgTable::new(&ColorAdjust {
            brightness: 1.0,
            contrast: 0.0,
            gamma: 1.0,
        });
        assert_eq!(table.adjust_argb(0x80ff_ffff), 0x8000_0000);
    }
}
