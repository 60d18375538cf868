// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout elements and their components.
//!
//! An element is a small piece of artwork assembled from components: filled
//! rectangles and disks, images, text, segment displays and dot-matrix rows.
//! Components carry a state filter, so one element can show a different
//! picture for each value of the output that drives it.

use std::sync::{Arc, OnceLock};

use bezel_core::bitmap::Bitmap;
use bezel_core::color::Color;
use bezel_core::geometry::BoundsExt;
use kurbo::Rect;

use crate::error::LayoutError;
use crate::node::Node;
use crate::subst::Substitutions;

/// Horizontal alignment of a text component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// Centered (authored as `0`).
    #[default]
    Center,
    /// Flush left (authored as `1`).
    Left,
    /// Flush right (authored as `2`).
    Right,
}

/// Segment-display family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// Seven segments plus decimal point.
    Led7,
    /// Seven segments plus a center vertical bar.
    Led8Gts1,
    /// Fourteen segments.
    Led14,
    /// Fourteen segments plus decimal point and comma.
    Led14Sc,
    /// Sixteen segments.
    Led16,
    /// Sixteen segments plus decimal point and comma.
    Led16Sc,
}

impl SegmentKind {
    /// Largest state value the display can show.
    #[must_use]
    pub const fn max_state(self) -> i32 {
        match self {
            Self::Led7 | Self::Led8Gts1 => 255,
            Self::Led14 => 16383,
            Self::Led14Sc | Self::Led16 => 65535,
            Self::Led16Sc => 262_143,
        }
    }
}

/// Decoded pixels of an image component, loaded on first draw.
#[derive(Debug, Default)]
pub struct ImageSlot(pub(crate) OnceLock<Arc<Bitmap>>);

impl Clone for ImageSlot {
    fn clone(&self) -> Self {
        let slot = OnceLock::new();
        if let Some(bitmap) = self.0.get() {
            _ = slot.set(Arc::clone(bitmap));
        }
        Self(slot)
    }
}

/// What a component draws.
#[derive(Clone, Debug)]
pub enum ComponentKind {
    /// A bitmap image, optionally with a separate alpha image.
    Image {
        /// File name passed to the image loader.
        file: String,
        /// File whose red channel supplies alpha.
        alpha_file: Option<String>,
        /// Loaded pixels.
        cache: ImageSlot,
    },
    /// A filled rectangle.
    Rect,
    /// A filled ellipse.
    Disk,
    /// A line of text.
    Text {
        /// The text.
        string: String,
        /// Alignment within the bounds.
        align: TextAlign,
    },
    /// A segment display driven by the state's bits.
    Segments(SegmentKind),
    /// A row of dots driven by the state's low bits.
    DotMatrix {
        /// Number of dots in the row.
        dots: u8,
    },
}

impl ComponentKind {
    /// The element maximum state this kind implies, if any.
    #[must_use]
    pub const fn fixed_max_state(&self) -> Option<i32> {
        match self {
            Self::Segments(kind) => Some(kind.max_state()),
            Self::DotMatrix { dots } => Some((1_i32 << *dots) - 1),
            Self::Image { .. } | Self::Rect | Self::Disk | Self::Text { .. } => None,
        }
    }
}

/// One drawable part of an element.
#[derive(Clone, Debug)]
pub struct Component {
    /// What to draw.
    pub kind: ComponentKind,
    /// Bounds within the element, normalized to 0..1 of its union box.
    pub bounds: Rect,
    /// Color, or tint for images.
    pub color: Color,
    /// Only draw when the element is in this state.
    pub state: Option<i32>,
}

impl Component {
    /// Whether the component is drawn for `state`.
    #[must_use]
    pub fn matches(&self, state: i32) -> bool {
        self.state.is_none_or(|s| s == state)
    }
}

/// A named piece of artwork.
#[derive(Debug)]
pub struct LayoutElement {
    name: String,
    default_state: i32,
    max_state: i32,
    components: Vec<Component>,
}

impl LayoutElement {
    /// Creates an element from already-normalized components.
    #[must_use]
    pub fn new(name: impl Into<String>, default_state: i32, components: Vec<Component>) -> Self {
        let max_state = max_state_of(&components);
        Self {
            name: name.into(),
            default_state,
            max_state,
            components,
        }
    }

    /// Parses an `element` node.
    pub fn parse(node: &Node, subst: &Substitutions) -> Result<Self, LayoutError> {
        let name = subst
            .attr(node, "name")
            .ok_or_else(|| LayoutError::MissingAttribute {
                node: node.name.clone(),
                attr: "name",
            })?;
        let default_state = state_value(subst.attr_int(node, "defstate", -1)?);

        let mut components = Vec::with_capacity(node.children.len());
        for child in &node.children {
            components.push(parse_component(child, subst)?);
        }

        // Express every component relative to the union of all of them.
        let union = components
            .iter()
            .fold(None, |acc, c| Rect::union_opt(acc, c.bounds));
        if let Some(union) = union {
            let target = Rect::new(0.0, 0.0, 1.0, 1.0);
            let from = Rect::new(
                union.x0,
                union.y0,
                if union.width() > 0.0 { union.x1 } else { union.x0 + 1.0 },
                if union.height() > 0.0 { union.y1 } else { union.y0 + 1.0 },
            );
            for c in &mut components {
                c.bounds = c.bounds.remap(&from, &target);
            }
        }

        Ok(Self::new(name, default_state, components))
    }

    /// Element name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// State shown when nothing drives the element; negative values draw as state 0.
    #[must_use]
    pub fn default_state(&self) -> i32 {
        self.default_state
    }

    /// Largest drawable state.
    #[must_use]
    pub fn max_state(&self) -> i32 {
        self.max_state
    }

    /// Components in drawing order.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }
}

fn max_state_of(components: &[Component]) -> i32 {
    // A segment or dot-matrix component fixes the range outright.
    if let Some(fixed) = components
        .iter()
        .filter_map(|c| c.kind.fixed_max_state())
        .max()
    {
        return fixed;
    }
    components.iter().filter_map(|c| c.state).max().unwrap_or(0)
}

fn state_value(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn parse_component(node: &Node, subst: &Substitutions) -> Result<Component, LayoutError> {
    let kind = match node.name.as_str() {
        "image" => ComponentKind::Image {
            file: subst
                .attr(node, "file")
                .ok_or_else(|| LayoutError::MissingAttribute {
                    node: node.name.clone(),
                    attr: "file",
                })?,
            alpha_file: subst.attr(node, "alphafile"),
            cache: ImageSlot::default(),
        },
        "rect" => ComponentKind::Rect,
        "disk" => ComponentKind::Disk,
        "text" => ComponentKind::Text {
            string: subst.attr(node, "string").unwrap_or_default(),
            align: match subst.attr_int(node, "align", 0)? {
                1 => TextAlign::Left,
                2 => TextAlign::Right,
                _ => TextAlign::Center,
            },
        },
        "led7seg" => ComponentKind::Segments(SegmentKind::Led7),
        "led8seg_gts1" => ComponentKind::Segments(SegmentKind::Led8Gts1),
        "led14seg" => ComponentKind::Segments(SegmentKind::Led14),
        "led14segsc" => ComponentKind::Segments(SegmentKind::Led14Sc),
        "led16seg" => ComponentKind::Segments(SegmentKind::Led16),
        "led16segsc" => ComponentKind::Segments(SegmentKind::Led16Sc),
        "dotmatrix" => ComponentKind::DotMatrix { dots: 8 },
        "dotmatrix5dot" => ComponentKind::DotMatrix { dots: 5 },
        "dotmatrixdot" => ComponentKind::DotMatrix { dots: 1 },
        other => {
            return Err(LayoutError::UnknownNode {
                parent: "element".to_owned(),
                node: other.to_owned(),
            });
        }
    };
    let state = match subst.attr_int(node, "state", -1)? {
        s if s < 0 => None,
        s => Some(state_value(s)),
    };
    Ok(Component {
        kind,
        bounds: parse_bounds(node.child("bounds"), subst)?,
        color: parse_color(node.child("color"), subst)?,
        state,
    })
}

/// Reads a `bounds` node; a missing node means the unit square.
///
/// Either `left`/`top`/`right`/`bottom` or `x`/`y`/`width`/`height` may be
/// given; absent edges default to the unit square.
pub fn parse_bounds(node: Option<&Node>, subst: &Substitutions) -> Result<Rect, LayoutError> {
    let Some(node) = node else {
        return Ok(Rect::new(0.0, 0.0, 1.0, 1.0));
    };
    let r = if node.has_attr("left")
        || node.has_attr("top")
        || node.has_attr("right")
        || node.has_attr("bottom")
    {
        Rect::new(
            subst.attr_float(node, "left", 0.0)?,
            subst.attr_float(node, "top", 0.0)?,
            subst.attr_float(node, "right", 1.0)?,
            subst.attr_float(node, "bottom", 1.0)?,
        )
    } else {
        let x = subst.attr_float(node, "x", 0.0)?;
        let y = subst.attr_float(node, "y", 0.0)?;
        Rect::new(
            x,
            y,
            x + subst.attr_float(node, "width", 1.0)?,
            y + subst.attr_float(node, "height", 1.0)?,
        )
    };
    if r.x0 > r.x1 || r.y0 > r.y1 {
        return Err(LayoutError::Bounds {
            x0: r.x0,
            y0: r.y0,
            x1: r.x1,
            y1: r.y1,
        });
    }
    Ok(r)
}

/// Reads a `color` node; a missing node or channel means `1.0`.
pub fn parse_color(node: Option<&Node>, subst: &Substitutions) -> Result<Color, LayoutError> {
    let Some(node) = node else {
        return Ok(Color::WHITE);
    };
    let mut channels = [0.0_f32; 4];
    for (out, name) in channels.iter_mut().zip(["red", "green", "blue", "alpha"]) {
        let v = subst.attr_float(node, name, 1.0)?;
        if !(0.0..=1.0).contains(&v) {
            return Err(LayoutError::Color {
                channel: name,
                value: v,
            });
        }
        *out = v as f32;
    }
    let [r, g, b, a] = channels;
    Ok(Color::new(r, g, b, a))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(kind: &str, state: Option<i64>, bounds: Node) -> Node {
        let mut n = Node::new(kind).with_child(bounds);
        if let Some(s) = state {
            n = n.with_attr("state", s);
        }
        n
    }

    fn ltrb(l: f64, t: f64, r: f64, b: f64) -> Node {
        Node::new("bounds")
            .with_attr("left", l)
            .with_attr("top", t)
            .with_attr("right", r)
            .with_attr("bottom", b)
    }

    #[test]
    fn components_are_normalized_to_union() {
        let node = Node::new("element")
            .with_attr("name", "lamp")
            .with_child(component("rect", Some(0), ltrb(0.0, 0.0, 10.0, 5.0)))
            .with_child(component("disk", Some(1), ltrb(10.0, 5.0, 20.0, 10.0)));
        let el = LayoutElement::parse(&node, &Substitutions::new()).unwrap();
        assert_eq!(el.name(), "lamp");
        assert_eq!(el.components()[0].bounds, Rect::new(0.0, 0.0, 0.5, 0.5));
        assert_eq!(el.components()[1].bounds, Rect::new(0.5, 0.5, 1.0, 1.0));
        assert_eq!(el.max_state(), 1);
        assert_eq!(el.default_state(), -1);
    }

    #[test]
    fn degenerate_union_does_not_divide_by_zero() {
        let node = Node::new("element")
            .with_attr("name", "line")
            .with_child(component("rect", None, ltrb(2.0, 0.0, 2.0, 4.0)));
        let el = LayoutElement::parse(&node, &Substitutions::new()).unwrap();
        let b = el.components()[0].bounds;
        assert!(b.x0.is_finite() && b.x1.is_finite());
        assert_eq!(b.y1, 1.0);
    }

    #[test]
    fn segment_kinds_force_max_state() {
        let cases = [
            ("led7seg", 255),
            ("led8seg_gts1", 255),
            ("led14seg", 16383),
            ("led14segsc", 65535),
            ("led16seg", 65535),
            ("led16segsc", 262_143),
            ("dotmatrix", 255),
            ("dotmatrix5dot", 31),
            ("dotmatrixdot", 1),
        ];
        for (kind, max) in cases {
            let node = Node::new("element")
                .with_attr("name", "d")
                .with_child(Node::new(kind));
            let el = LayoutElement::parse(&node, &Substitutions::new()).unwrap();
            assert_eq!(el.max_state(), max, "{kind}");
        }
    }

    #[test]
    fn fixed_max_state_ignores_authored_states() {
        let cases = [("led7seg", 300, 255), ("dotmatrixdot", 5, 1)];
        for (kind, authored, max) in cases {
            let node = Node::new("element")
                .with_attr("name", "d")
                .with_child(Node::new(kind))
                .with_child(component("rect", Some(authored), ltrb(0.0, 0.0, 1.0, 1.0)));
            let el = LayoutElement::parse(&node, &Substitutions::new()).unwrap();
            assert_eq!(el.max_state(), max, "{kind}");
        }
    }

    #[test]
    fn unknown_component_is_an_error() {
        let node = Node::new("element")
            .with_attr("name", "x")
            .with_child(Node::new("triangle"));
        assert!(matches!(
            LayoutElement::parse(&node, &Substitutions::new()),
            Err(LayoutError::UnknownNode { .. })
        ));
    }

    #[test]
    fn bounds_forms_and_validation() {
        let s = Substitutions::new();
        assert_eq!(parse_bounds(None, &s).unwrap(), Rect::new(0.0, 0.0, 1.0, 1.0));
        let xywh = Node::new("bounds")
            .with_attr("x", 1.0)
            .with_attr("y", 2.0)
            .with_attr("width", 3.0)
            .with_attr("height", 4.0);
        assert_eq!(parse_bounds(Some(&xywh), &s).unwrap(), Rect::new(1.0, 2.0, 4.0, 6.0));
        let partial = Node::new("bounds").with_attr("right", 4.0);
        assert_eq!(parse_bounds(Some(&partial), &s).unwrap(), Rect::new(0.0, 0.0, 4.0, 1.0));
        assert!(matches!(
            parse_bounds(Some(&ltrb(2.0, 0.0, 1.0, 1.0)), &s),
            Err(LayoutError::Bounds { .. })
        ));
    }

    #[test]
    fn color_defaults_and_range() {
        let s = Substitutions::new();
        assert_eq!(parse_color(None, &s).unwrap(), Color::WHITE);
        let half = Node::new("color").with_attr("red", 0.5);
        assert_eq!(parse_color(Some(&half), &s).unwrap(), Color::new(0.5, 1.0, 1.0, 1.0));
        let bad = Node::new("color").with_attr("alpha", 1.5);
        assert!(matches!(
            parse_color(Some(&bad), &s),
            Err(LayoutError::Color { channel: "alpha", .. })
        ));
    }

    #[test]
    fn state_filter() {
        let c = Component {
            kind: ComponentKind::Rect,
            bounds: Rect::new(0.0, 0.0, 1.0, 1.0),
            color: Color::WHITE,
            state: Some(2),
        };
        assert!(c.matches(2));
        assert!(!c.matches(1));
    }
}
