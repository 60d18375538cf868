// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Views: arrangements of screens and artwork in four layers.
//!
//! Items are authored in an arbitrary coordinate space. [`LayoutView::recompute`]
//! unions the bounds of the enabled layers and remaps every item into the
//! 0..1 space the compositor draws in, optionally zooming so that the screens
//! alone fill that space.

use std::sync::Arc;

use bezel_core::color::Color;
use bezel_core::geometry::BoundsExt;
use bezel_core::orientation::Orientation;
use kurbo::Rect;

use crate::element::{LayoutElement, parse_bounds, parse_color};
use crate::error::LayoutError;
use crate::node::Node;
use crate::subst::Substitutions;

/// The four artwork layers of a view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Artwork behind the screens.
    Backdrop,
    /// Live screens.
    Screen,
    /// Artwork multiplied over the screens.
    Overlay,
    /// Artwork framing everything.
    Bezel,
}

impl LayerKind {
    /// All layers in authoring order.
    pub const ALL: [Self; 4] = [Self::Backdrop, Self::Screen, Self::Overlay, Self::Bezel];

    /// The node name of items in this layer.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Backdrop => "backdrop",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Bezel => "bezel",
        }
    }

    /// Index into per-layer arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Backdrop => 0,
            Self::Screen => 1,
            Self::Overlay => 2,
            Self::Bezel => 3,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.name() == name)
    }
}

/// Which optional layers are shown, and whether to zoom to the screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerConfig {
    /// Show backdrops.
    pub backdrops: bool,
    /// Show overlays.
    pub overlays: bool,
    /// Show bezels.
    pub bezels: bool,
    /// Scale so the screens fill the target, cropping artwork.
    pub zoom_to_screen: bool,
    /// Multiply a screen container's own overlay texture over it.
    pub screen_overlay: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            backdrops: true,
            overlays: true,
            bezels: true,
            zoom_to_screen: false,
            screen_overlay: true,
        }
    }
}

impl LayerConfig {
    /// Whether items of `layer` are drawn.
    #[must_use]
    pub fn enabled(&self, layer: LayerKind) -> bool {
        match layer {
            LayerKind::Backdrop => self.backdrops,
            LayerKind::Screen => true,
            LayerKind::Overlay => self.overlays,
            LayerKind::Bezel => self.bezels,
        }
    }
}

/// What a view item shows.
#[derive(Clone, Debug)]
pub enum ItemSource {
    /// A live screen by index.
    Screen(u32),
    /// An element, optionally driven by a named output.
    Element {
        /// The element.
        element: Arc<LayoutElement>,
        /// Output whose value selects the element's state.
        output: Option<String>,
    },
}

/// One item of a view layer.
#[derive(Clone, Debug)]
pub struct ViewItem {
    /// What is drawn.
    pub source: ItemSource,
    /// Input port tag for hit-testing.
    pub input_tag: Option<String>,
    /// Input port mask for hit-testing.
    pub input_mask: u32,
    /// Bounds as authored.
    pub raw_bounds: Rect,
    /// Bounds in the view's 0..1 space, from the last recompute.
    pub bounds: Rect,
    /// Color multiplier.
    pub color: Color,
    /// Orientation of the item's contents.
    pub orientation: Orientation,
}

impl ViewItem {
    /// The screen index, for screen items.
    #[must_use]
    pub fn screen(&self) -> Option<u32> {
        match self.source {
            ItemSource::Screen(index) => Some(index),
            ItemSource::Element { .. } => None,
        }
    }

    /// The element, for element items.
    #[must_use]
    pub fn element(&self) -> Option<&Arc<LayoutElement>> {
        match &self.source {
            ItemSource::Element { element, .. } => Some(element),
            ItemSource::Screen(_) => None,
        }
    }

    /// Current state: the output's value, else the element's default state.
    ///
    /// With an input tag and no output, the state is `1` while
    /// `input & input_mask` is nonzero and `0` otherwise.
    #[must_use]
    pub fn state(&self, output_value: Option<i32>, input_value: Option<u32>) -> i32 {
        let ItemSource::Element { element, output } = &self.source else {
            return 0;
        };
        if output.is_some() {
            return output_value.unwrap_or(element.default_state());
        }
        if self.input_tag.is_some() {
            return input_value.map_or(0, |v| i32::from(v & self.input_mask != 0));
        }
        element.default_state()
    }

    fn parse(
        node: &Node,
        layer: LayerKind,
        view: &str,
        elements: &[Arc<LayoutElement>],
        subst: &Substitutions,
    ) -> Result<Self, LayoutError> {
        let source = if layer == LayerKind::Screen {
            let index = subst.attr_int(node, "index", -1)?;
            let index = u32::try_from(index).map_err(|_| LayoutError::ScreenIndex {
                view: view.to_owned(),
                index,
            })?;
            ItemSource::Screen(index)
        } else {
            let name = subst
                .attr(node, "element")
                .ok_or_else(|| LayoutError::MissingAttribute {
                    node: node.name.clone(),
                    attr: "element",
                })?;
            let element = elements
                .iter()
                .find(|e| e.name() == name)
                .cloned()
                .ok_or_else(|| LayoutError::UnknownElement {
                    view: view.to_owned(),
                    element: name,
                })?;
            ItemSource::Element {
                element,
                output: subst.attr(node, "name"),
            }
        };
        let raw_bounds = parse_bounds(node.child("bounds"), subst)?;
        Ok(Self {
            source,
            input_tag: subst.attr(node, "inputtag"),
            input_mask: subst.attr_int(node, "inputmask", 0)? as u32,
            raw_bounds,
            bounds: raw_bounds,
            color: parse_color(node.child("color"), subst)?,
            orientation: parse_orientation(node.child("orientation"), subst)?,
        })
    }
}

/// Reads an `orientation` node: a rotation plus optional axis toggles.
pub fn parse_orientation(
    node: Option<&Node>,
    subst: &Substitutions,
) -> Result<Orientation, LayoutError> {
    let Some(node) = node else {
        return Ok(Orientation::ROT0);
    };
    let rotate = subst.attr_int(node, "rotate", 0)?;
    let mut o = Orientation::from_rotation(rotate).ok_or(LayoutError::Rotation(rotate))?;
    if subst.attr_flag(node, "swapxy", false) {
        o = o.toggle(Orientation::SWAP_XY);
    }
    if subst.attr_flag(node, "flipx", false) {
        o = o.toggle(Orientation::FLIP_X);
    }
    if subst.attr_flag(node, "flipy", false) {
        o = o.toggle(Orientation::FLIP_Y);
    }
    Ok(o)
}

/// A named arrangement of items.
#[derive(Clone, Debug)]
pub struct LayoutView {
    name: String,
    layers: [Vec<ViewItem>; 4],
    explicit_bounds: Option<Rect>,
    bounds: Rect,
    screen_bounds: Rect,
    aspect: f64,
    screen_aspect: f64,
    zoomed: bool,
    enabled: [bool; 4],
    screens: Vec<u32>,
}

impl LayoutView {
    /// Parses a `view` node and computes its default geometry.
    pub fn parse(
        node: &Node,
        elements: &[Arc<LayoutElement>],
        subst: &Substitutions,
    ) -> Result<Self, LayoutError> {
        let name = subst
            .attr(node, "name")
            .ok_or_else(|| LayoutError::MissingAttribute {
                node: node.name.clone(),
                attr: "name",
            })?;
        let mut layers: [Vec<ViewItem>; 4] = std::array::from_fn(|_| Vec::new());
        let mut explicit_bounds = None;
        for child in &node.children {
            if child.name == "bounds" {
                explicit_bounds = Some(parse_bounds(Some(child), subst)?);
                continue;
            }
            let Some(layer) = LayerKind::from_name(&child.name) else {
                return Err(LayoutError::UnknownNode {
                    parent: "view".to_owned(),
                    node: child.name.clone(),
                });
            };
            layers[layer.index()].push(ViewItem::parse(child, layer, &name, elements, subst)?);
        }
        Ok(Self::from_layers(name, layers, explicit_bounds))
    }

    /// Builds a view from already-parsed items.
    #[must_use]
    pub fn from_layers(
        name: impl Into<String>,
        layers: [Vec<ViewItem>; 4],
        explicit_bounds: Option<Rect>,
    ) -> Self {
        let mut view = Self {
            name: name.into(),
            layers,
            explicit_bounds,
            bounds: Rect::new(0.0, 0.0, 1.0, 1.0),
            screen_bounds: Rect::new(0.0, 0.0, 1.0, 1.0),
            aspect: 1.0,
            screen_aspect: 1.0,
            zoomed: false,
            enabled: [true; 4],
            screens: Vec::new(),
        };
        view.recompute(&LayerConfig::default());
        view
    }

    /// View name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Items of one layer in document order.
    #[must_use]
    pub fn items(&self, layer: LayerKind) -> &[ViewItem] {
        &self.layers[layer.index()]
    }

    /// Whether `layer` was enabled at the last recompute.
    #[must_use]
    pub fn layer_enabled(&self, layer: LayerKind) -> bool {
        self.enabled[layer.index()]
    }

    /// Screen indices shown by enabled layers, ascending.
    #[must_use]
    pub fn screens(&self) -> &[u32] {
        &self.screens
    }

    /// Whether the view shows the given screen.
    #[must_use]
    pub fn has_screen(&self, index: u32) -> bool {
        self.screens.binary_search(&index).is_ok()
    }

    /// Union of the enabled items' authored bounds, or the explicit bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Union of the screen items' authored bounds.
    #[must_use]
    pub fn screen_bounds(&self) -> Rect {
        self.screen_bounds
    }

    /// Width over height of whatever fills the target: the whole view, or
    /// just the screens when zoomed.
    #[must_use]
    pub fn effective_aspect(&self) -> f64 {
        if self.zoomed {
            self.screen_aspect
        } else {
            self.aspect
        }
    }

    /// Recomputes aggregate bounds and remaps every item for `config`.
    pub fn recompute(&mut self, config: &LayerConfig) {
        let mut bounds = None;
        let mut screen_bounds = None;
        self.screens.clear();
        for layer in LayerKind::ALL {
            let enabled = config.enabled(layer);
            self.enabled[layer.index()] = enabled;
            if !enabled {
                continue;
            }
            for item in &self.layers[layer.index()] {
                let raw = item.raw_bounds.normalized();
                bounds = Rect::union_opt(bounds, raw);
                if let Some(index) = item.screen() {
                    screen_bounds = Rect::union_opt(screen_bounds, raw);
                    self.screens.push(index);
                }
            }
        }
        self.screens.sort_unstable();
        self.screens.dedup();

        let unit = Rect::new(0.0, 0.0, 1.0, 1.0);
        self.bounds = match self.explicit_bounds {
            Some(explicit) if explicit.x1 > explicit.x0 => explicit,
            _ => bounds.filter(|b| b.width() > 0.0 && b.height() > 0.0).unwrap_or(unit),
        };
        self.screen_bounds = screen_bounds.unwrap_or(unit);
        self.aspect = self.bounds.width() / self.bounds.height();

        self.zoomed = config.zoom_to_screen
            && !self.screens.is_empty()
            && self.screen_bounds.width() > 0.0
            && self.screen_bounds.height() > 0.0;
        let target = if self.zoomed {
            self.screen_aspect = self.screen_bounds.width() / self.screen_bounds.height();
            let b = self.bounds;
            let s = self.screen_bounds;
            let targ_w = b.width() / s.width();
            let targ_h = b.height() / s.height();
            let x0 = (b.x0 - s.x0) / b.width() * targ_w;
            let y0 = (b.y0 - s.y0) / b.height() * targ_h;
            Rect::new(x0, y0, x0 + targ_w, y0 + targ_h)
        } else {
            unit
        };

        for items in &mut self.layers {
            for item in items {
                item.bounds = item.raw_bounds.normalized().remap(&self.bounds, &target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(l: f64, t: f64, r: f64, b: f64) -> Node {
        Node::new("bounds")
            .with_attr("left", l)
            .with_attr("top", t)
            .with_attr("right", r)
            .with_attr("bottom", b)
    }

    fn lamp() -> Arc<LayoutElement> {
        let node = Node::new("element")
            .with_attr("name", "lamp")
            .with_attr("defstate", 0_i64)
            .with_child(Node::new("rect").with_attr("state", 1_i64));
        Arc::new(LayoutElement::parse(&node, &Substitutions::new()).unwrap())
    }

    fn framed_view() -> LayoutView {
        let node = Node::new("view")
            .with_attr("name", "Framed")
            .with_child(
                Node::new("bezel")
                    .with_attr("element", "lamp")
                    .with_child(bounds(0.0, 0.0, 8.0, 4.0)),
            )
            .with_child(
                Node::new("screen")
                    .with_attr("index", 0_i64)
                    .with_child(bounds(2.0, 1.0, 6.0, 3.0)),
            );
        LayoutView::parse(&node, &[lamp()], &Substitutions::new()).unwrap()
    }

    #[test]
    fn items_normalize_into_unit_space() {
        let view = framed_view();
        assert_eq!(view.bounds(), Rect::new(0.0, 0.0, 8.0, 4.0));
        assert_eq!(view.effective_aspect(), 2.0);
        let screen = &view.items(LayerKind::Screen)[0];
        assert_eq!(screen.bounds, Rect::new(0.25, 0.25, 0.75, 0.75));
        assert_eq!(view.screens(), &[0]);
    }

    #[test]
    fn zoom_maps_screens_to_unit_square() {
        let mut view = framed_view();
        view.recompute(&LayerConfig {
            zoom_to_screen: true,
            ..LayerConfig::default()
        });
        let screen = &view.items(LayerKind::Screen)[0];
        let b = screen.bounds;
        assert!((b.x0 - 0.0).abs() < 1e-12 && (b.x1 - 1.0).abs() < 1e-12);
        assert!((b.y0 - 0.0).abs() < 1e-12 && (b.y1 - 1.0).abs() < 1e-12);
        let bezel = view.items(LayerKind::Bezel)[0].bounds;
        assert!((bezel.x0 + 0.5).abs() < 1e-12 && (bezel.x1 - 1.5).abs() < 1e-12);
        assert_eq!(view.effective_aspect(), 2.0);
    }

    #[test]
    fn disabled_layers_do_not_contribute_bounds() {
        let mut view = framed_view();
        view.recompute(&LayerConfig {
            bezels: false,
            ..LayerConfig::default()
        });
        assert_eq!(view.bounds(), Rect::new(2.0, 1.0, 6.0, 3.0));
        assert!(!view.layer_enabled(LayerKind::Bezel));
        assert_eq!(view.items(LayerKind::Screen)[0].bounds, Rect::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn explicit_bounds_override_union() {
        let node = Node::new("view")
            .with_attr("name", "Explicit")
            .with_child(bounds(0.0, 0.0, 4.0, 4.0))
            .with_child(
                Node::new("screen")
                    .with_attr("index", 0_i64)
                    .with_child(bounds(0.0, 0.0, 2.0, 2.0)),
            );
        let view = LayoutView::parse(&node, &[], &Substitutions::new()).unwrap();
        assert_eq!(view.items(LayerKind::Screen)[0].bounds, Rect::new(0.0, 0.0, 0.5, 0.5));
    }

    #[test]
    fn item_errors() {
        let s = Substitutions::new();
        let missing = Node::new("view")
            .with_attr("name", "v")
            .with_child(Node::new("bezel").with_attr("element", "nope"));
        assert!(matches!(
            LayoutView::parse(&missing, &[], &s),
            Err(LayoutError::UnknownElement { .. })
        ));
        let no_index = Node::new("view")
            .with_attr("name", "v")
            .with_child(Node::new("screen"));
        assert!(matches!(
            LayoutView::parse(&no_index, &[], &s),
            Err(LayoutError::ScreenIndex { index: -1, .. })
        ));
        let unknown = Node::new("view")
            .with_attr("name", "v")
            .with_child(Node::new("marquee"));
        assert!(matches!(
            LayoutView::parse(&unknown, &[], &s),
            Err(LayoutError::UnknownNode { .. })
        ));
    }

    #[test]
    fn orientation_parsing() {
        let s = Substitutions::new();
        let rot = Node::new("orientation").with_attr("rotate", 90_i64);
        assert_eq!(parse_orientation(Some(&rot), &s).unwrap(), Orientation::ROT90);
        let flip = Node::new("orientation")
            .with_attr("rotate", 180_i64)
            .with_attr("flipx", "yes");
        assert_eq!(parse_orientation(Some(&flip), &s).unwrap(), Orientation::FLIP_Y);
        let bad = Node::new("orientation").with_attr("rotate", 45_i64);
        assert!(matches!(
            parse_orientation(Some(&bad), &s),
            Err(LayoutError::Rotation(45))
        ));
    }

    #[test]
    fn item_state_sources() {
        let view = framed_view();
        let bezel = &view.items(LayerKind::Bezel)[0];
        assert_eq!(bezel.state(None, None), 0);
        let mut driven = bezel.clone();
        driven.source = ItemSource::Element {
            element: lamp(),
            output: Some("lamp0".into()),
        };
        assert_eq!(driven.state(Some(1), None), 1);
        assert_eq!(driven.state(None, None), 0);
        let mut input = bezel.clone();
        input.input_tag = Some("IN0".into());
        input.input_mask = 0x04;
        assert_eq!(input.state(None, Some(0x05)), 1);
        assert_eq!(input.state(None, Some(0x01)), 0);
    }
}
