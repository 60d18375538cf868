// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute substitution and numeric literals.
//!
//! Attribute text may contain `~token~` references that expand to properties
//! of the live screens, so one layout can adapt to whatever resolution the
//! machine runs at. Unknown tokens are left in place, tildes included.
//!
//! Integers accept plain decimal, `$hex`, `0xhex` and `#decimal`; floats
//! accept anything [`str::parse::<f64>`] does plus the integer forms.

use std::collections::BTreeMap;

use crate::error::LayoutError;
use crate::node::Node;

/// Geometry of one live screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenInfo {
    /// Visible width in source pixels.
    pub native_width: u32,
    /// Visible height in source pixels.
    pub native_height: u32,
    /// Physical aspect numerator (for example 4 of 4:3).
    pub physical_xaspect: u32,
    /// Physical aspect denominator (for example 3 of 4:3).
    pub physical_yaspect: u32,
}

impl ScreenInfo {
    /// A screen with a 4:3 physical aspect.
    #[must_use]
    pub const fn new(native_width: u32, native_height: u32) -> Self {
        Self {
            native_width,
            native_height,
            physical_xaspect: 4,
            physical_yaspect: 3,
        }
    }

    /// Native pixel-grid aspect, reduced.
    #[must_use]
    pub fn native_aspect(&self) -> (u32, u32) {
        let g = gcd(self.native_width, self.native_height).max(1);
        (self.native_width / g, self.native_height / g)
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Token table for `~token~` expansion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Substitutions {
    tokens: BTreeMap<String, String>,
}

impl Substitutions {
    /// An empty table; every token is left verbatim.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The per-screen tokens for each screen, numbered from zero.
    ///
    /// Screen `N` defines `scrNnative_width`, `scrNnative_height`,
    /// `scrNnative_xaspect`, `scrNnative_yaspect`, `scrNnative_aspect`,
    /// `scrNphysical_xaspect`, `scrNphysical_yaspect`, and the aliases
    /// `scrNwidth` / `scrNheight`.
    #[must_use]
    pub fn for_screens(screens: &[ScreenInfo]) -> Self {
        let mut subst = Self::new();
        for (n, s) in screens.iter().enumerate() {
            let (xa, ya) = s.native_aspect();
            let aspect = if s.native_height == 0 {
                0.0
            } else {
                f64::from(s.native_width) / f64::from(s.native_height)
            };
            subst.set(format!("scr{n}native_width"), s.native_width);
            subst.set(format!("scr{n}native_height"), s.native_height);
            subst.set(format!("scr{n}width"), s.native_width);
            subst.set(format!("scr{n}height"), s.native_height);
            subst.set(format!("scr{n}native_xaspect"), xa);
            subst.set(format!("scr{n}native_yaspect"), ya);
            subst.set(format!("scr{n}native_aspect"), aspect);
            subst.set(format!("scr{n}physical_xaspect"), s.physical_xaspect);
            subst.set(format!("scr{n}physical_yaspect"), s.physical_yaspect);
        }
        subst
    }

    /// Defines or replaces a token.
    pub fn set(&mut self, token: impl Into<String>, value: impl ToString) {
        self.tokens.insert(token.into(), value.to_string());
    }

    /// Expands every known `~token~` in `text`.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find('~') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('~') else {
                out.push_str(&rest[start..]);
                return out;
            };
            let token = &after[..end];
            if let Some(value) = self.tokens.get(token) {
                out.push_str(value);
                rest = &after[end + 1..];
            } else {
                // Leave the opening tilde; the closing one may start a token.
                out.push('~');
                rest = after;
            }
        }
        out.push_str(rest);
        out
    }

    /// Attribute text after substitution.
    #[must_use]
    pub fn attr(&self, node: &Node, name: &str) -> Option<String> {
        node.attr(name).map(|raw| self.apply(&raw))
    }

    /// Integer attribute, or `default` when absent.
    pub fn attr_int(&self, node: &Node, name: &str, default: i64) -> Result<i64, LayoutError> {
        match self.attr(node, name) {
            None => Ok(default),
            Some(text) => parse_int(&text).ok_or_else(|| LayoutError::BadNumber {
                attr: name.to_owned(),
                value: text,
            }),
        }
    }

    /// Floating-point attribute, or `default` when absent.
    pub fn attr_float(&self, node: &Node, name: &str, default: f64) -> Result<f64, LayoutError> {
        match self.attr(node, name) {
            None => Ok(default),
            Some(text) => parse_float(&text).ok_or_else(|| LayoutError::BadNumber {
                attr: name.to_owned(),
                value: text,
            }),
        }
    }

    /// `yes` / `no` attribute, or `default` when absent.
    #[must_use]
    pub fn attr_flag(&self, node: &Node, name: &str, default: bool) -> bool {
        self.attr(node, name).map_or(default, |t| t.trim() == "yes")
    }
}

/// Parses an integer literal: decimal, `$hex`, `0xhex` or `#decimal`.
#[must_use]
pub fn parse_int(text: &str) -> Option<i64> {
    let t = text.trim();
    let (digits, radix, negative) = if let Some(hex) = t.strip_prefix('$') {
        (hex, 16, false)
    } else if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        (hex, 16, false)
    } else if let Some(dec) = t.strip_prefix('#') {
        (dec, 10, false)
    } else if let Some(dec) = t.strip_prefix('-') {
        (dec, 10, true)
    } else {
        (t, 10, false)
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    let value = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -value } else { value })
}

/// Parses a floating-point literal, also accepting the integer forms.
#[must_use]
pub fn parse_float(text: &str) -> Option<f64> {
    let t = text.trim();
    if t.starts_with(['$', '#']) || t.starts_with("0x") || t.starts_with("0X") {
        return parse_int(t).map(|v| v as f64);
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}
