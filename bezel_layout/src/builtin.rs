// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in layouts used when no layout file loads.
//!
//! Each generator returns the node tree a layout file would contain, so the
//! built-ins go through the same parser and substitution as user files.

use crate::file::{LAYOUT_VERSION, LayoutFile};
use crate::node::Node;
use crate::subst::Substitutions;

/// Gap between adjacent screens, in the 4:3 authoring units.
const GAP: f64 = 0.03;

fn bounds(x0: f64, y0: f64, x1: f64, y1: f64) -> Node {
    Node::new("bounds")
        .with_attr("left", x0)
        .with_attr("top", y0)
        .with_attr("right", x1)
        .with_attr("bottom", y1)
}

fn screen(index: i64, x0: f64, y0: f64, x1: f64, y1: f64) -> Node {
    Node::new("screen")
        .with_attr("index", index)
        .with_child(bounds(x0, y0, x1, y1))
}

fn view(name: impl Into<String>, items: impl IntoIterator<Item = Node>) -> Node {
    items
        .into_iter()
        .fold(Node::new("view").with_attr("name", name.into()), Node::with_child)
}

fn layout(children: impl IntoIterator<Item = Node>) -> Node {
    children.into_iter().fold(
        Node::new("mamelayout").with_attr("version", LAYOUT_VERSION),
        Node::with_child,
    )
}

fn standard(index: i64) -> Node {
    view(
        format!("Screen {index} Standard (4:3)"),
        [screen(index, 0.0, 0.0, 4.0, 3.0)],
    )
}

fn pixel_aspect(index: i64) -> Node {
    let scr = format!("~scr{index}");
    view(
        format!("Screen {index} Pixel Aspect ({scr}native_xaspect~:{scr}native_yaspect~)"),
        [Node::new("screen").with_attr("index", index).with_child(
            Node::new("bounds")
                .with_attr("x", 0.0)
                .with_attr("y", 0.0)
                .with_attr("width", format!("{scr}native_width~"))
                .with_attr("height", format!("{scr}native_height~")),
        )],
    )
}

/// A single screen: 4:3, native pixel aspect and a cocktail-table view.
#[must_use]
pub fn single_screen() -> Node {
    let cocktail = view(
        "Cocktail",
        [
            Node::new("screen")
                .with_attr("index", 0_i64)
                .with_child(bounds(0.0, -3.0 - GAP, 4.0, -GAP))
                .with_child(Node::new("orientation").with_attr("rotate", 180_i64)),
            screen(0, 0.0, 0.0, 4.0, 3.0),
        ],
    );
    layout([standard(0), pixel_aspect(0), cocktail])
}

/// Two screens: each alone, side by side, and over-under.
#[must_use]
pub fn dual_screen() -> Node {
    let side = view(
        "Dual Side-by-Side",
        [
            screen(0, 0.0, 0.0, 4.0, 3.0),
            screen(1, 4.0 + GAP, 0.0, 8.0 + GAP, 3.0),
        ],
    );
    let over = view(
        "Dual Over-Under",
        [
            screen(0, 0.0, 0.0, 4.0, 3.0),
            screen(1, 0.0, 3.0 + GAP, 4.0, 6.0 + GAP),
        ],
    );
    layout([side, over, standard(0), standard(1)])
}

/// Three screens: side by side, then each alone.
#[must_use]
pub fn triple_screen() -> Node {
    let side = view(
        "Triple Side-by-Side",
        (0..3).map(|i| {
            let x0 = i as f64 * (4.0 + GAP);
            screen(i, x0, 0.0, x0 + 4.0, 3.0)
        }),
    );
    layout([side, standard(0), standard(1), standard(2)])
}

/// A notice shown when the machine has no screens.
#[must_use]
pub fn no_screens() -> Node {
    let notice = Node::new("element")
        .with_attr("name", "notice")
        .with_child(
            Node::new("rect")
                .with_child(bounds(0.0, 0.0, 4.0, 3.0))
                .with_child(
                    Node::new("color")
                        .with_attr("red", 0.0)
                        .with_attr("green", 0.0)
                        .with_attr("blue", 0.0),
                ),
        )
        .with_child(
            Node::new("text")
                .with_attr("string", "No screens attached to the system")
                .with_child(bounds(0.0, 1.3, 4.0, 1.7)),
        );
    let v = view(
        "No screens",
        [Node::new("bezel")
            .with_attr("element", "notice")
            .with_child(bounds(0.0, 0.0, 4.0, 3.0))],
    );
    layout([notice, v])
}

/// The built-in layout for `count` screens.
///
/// More than three screens get the triple-screen layout. A built-in that
/// fails to parse falls back to the single-screen layout.
///
/// # Panics
///
/// Panics if the single-screen layout fails to parse; that is a defect in
/// this module, not in user data.
#[must_use]
pub fn for_screens(count: usize, subst: &Substitutions) -> LayoutFile {
    let root = match count {
        0 => no_screens(),
        1 => single_screen(),
        2 => dual_screen(),
        _ => triple_screen(),
    };
    match LayoutFile::parse(&root, subst) {
        Ok(file) => file,
        Err(err) if count != 1 => {
            log::warn!("built-in layout for {count} screens failed: {err}");
            LayoutFile::parse(&single_screen(), subst)
                .unwrap_or_else(|err| panic!("built-in single-screen layout is invalid: {err}"))
        }
        Err(err) => panic!("built-in single-screen layout is invalid: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subst::ScreenInfo;
    use crate::view::LayerKind;
    use kurbo::Rect;

    #[test]
    fn single_screen_views() {
        let subst = Substitutions::for_screens(&[ScreenInfo::new(320, 240)]);
        let file = for_screens(1, &subst);
        let names: Vec<_> = file.views().iter().map(|v| v.name()).collect();
        assert_eq!(
            names,
            ["Screen 0 Standard (4:3)", "Screen 0 Pixel Aspect (4:3)", "Cocktail"]
        );
        let standard = &file.views()[0];
        assert_eq!(standard.bounds(), Rect::new(0.0, 0.0, 4.0, 3.0));
        assert_eq!(
            standard.items(LayerKind::Screen)[0].bounds,
            Rect::new(0.0, 0.0, 1.0, 1.0)
        );
        let native = &file.views()[1];
        assert_eq!(native.bounds(), Rect::new(0.0, 0.0, 320.0, 240.0));
    }

    #[test]
    fn multi_screen_layouts_show_every_screen() {
        let screens = [ScreenInfo::new(256, 224); 3];
        let subst = Substitutions::for_screens(&screens);
        let dual = for_screens(2, &subst);
        assert_eq!(dual.views()[0].screens(), &[0, 1]);
        let triple = for_screens(3, &subst);
        assert_eq!(triple.views()[0].screens(), &[0, 1, 2]);
        let side = triple.views()[0].bounds();
        assert!((side.width() - (12.0 + 2.0 * GAP)).abs() < 1e-12);
    }

    #[test]
    fn no_screens_layout_has_a_notice() {
        let file = for_screens(0, &Substitutions::new());
        assert_eq!(file.views().len(), 1);
        assert!(file.views()[0].screens().is_empty());
        assert!(file.element("notice").is_some());
    }
}
