// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render targets.
//!
//! A [`Target`] is one output device: a layout with a selected view, the
//! visible layers, the device size, pixel aspect and orientation, and a ring
//! of primitive lists. Each call to [`Target::get_primitives`] fills the next
//! list in the ring by walking the view's layers back to front:
//!
//! ```text
//!   root transform (visible device area, target orientation)
//!     └─ item transform (view item box, item color and orientation)
//!          ├─ screen item ─► container placement ─► one primitive per item
//!          └─ element item ─► state texture ─► one quad
//! ```
//!
//! Every primitive is clipped, then debug containers and the UI container are
//! drawn over the full device, and finally the redraw-region optimizer
//! replaces the implicit full clear.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use bezel_core::arena::Arena;
use bezel_core::bitmap::BitmapStore;
use bezel_core::color::Color;
use bezel_core::container::{BlendMode, Container, ContainerId, ItemKind};
use bezel_core::geometry::{BoundsExt, round_nearest};
use bezel_core::orientation::Orientation;
use bezel_core::texture::{Texture, TextureId, TextureStore};
use bezel_core::trace::{FrameBeginEvent, FrameEndEvent, LayerEvent, OptimizeEvent, Tracer};
use bezel_core::transform::ItemTransform;
use bezel_layout::draw::{Assets, ElementScaler};
use bezel_layout::element::LayoutElement;
use bezel_layout::file::LayoutFile;
use bezel_layout::view::{ItemSource, LayerConfig, LayerKind, LayoutView, ViewItem};
use kurbo::{Point, Rect};
use parking_lot::Mutex;

use crate::clip::{clip_line, clip_quad};
use crate::compositor::{Compositor, TargetId};
use crate::config::{ConfigError, TargetConfig};
use crate::optimize::{ClearRegion, optimize};
use crate::primitive::{Primitive, PrimitiveKind, PrimitiveList, PrimitiveTexture, TexCoords};

/// Number of primitive lists each target cycles through.
pub const RING_SIZE: usize = 3;

/// Layer order when a view has several backdrops and no overlay.
const BACKDROP_FIRST: [(LayerKind, BlendMode); 4] = [
    (LayerKind::Backdrop, BlendMode::Alpha),
    (LayerKind::Screen, BlendMode::Add),
    (LayerKind::Overlay, BlendMode::RgbMultiply),
    (LayerKind::Bezel, BlendMode::Alpha),
];

/// Layer order for every other view.
const SCREEN_FIRST: [(LayerKind, BlendMode); 4] = [
    (LayerKind::Screen, BlendMode::Add),
    (LayerKind::Overlay, BlendMode::RgbMultiply),
    (LayerKind::Backdrop, BlendMode::Add),
    (LayerKind::Bezel, BlendMode::Alpha),
];

/// The layers of `view` in drawing order, each with its default blend mode.
#[must_use]
pub fn layer_order(view: &LayoutView) -> &'static [(LayerKind, BlendMode); 4] {
    if view.items(LayerKind::Backdrop).len() > 1 && view.items(LayerKind::Overlay).is_empty() {
        &BACKDROP_FIRST
    } else {
        &SCREEN_FIRST
    }
}

/// Input metadata of the topmost item under a device point.
#[derive(Clone, Debug, PartialEq)]
pub struct InputHit {
    /// Input port tag.
    pub tag: String,
    /// Input port mask.
    pub mask: u32,
    /// The point in the item's 0..1 space.
    pub point: Point,
}

/// One output device and its view of the layout.
#[derive(Debug)]
pub struct Target {
    id: TargetId,
    layout: LayoutFile,
    view: usize,
    base_view: usize,
    layer_config: LayerConfig,
    base_layer_config: LayerConfig,
    orientation: Orientation,
    base_orientation: Orientation,
    width: u32,
    height: u32,
    pixel_aspect: Option<f64>,
    max_refresh: Option<u32>,
    ring: [Arc<Mutex<PrimitiveList>>; RING_SIZE],
    next_slot: usize,
    frame_index: u64,
    clear_region: ClearRegion,
    element_textures: HashMap<(usize, i32), TextureId>,
}

impl Target {
    pub(crate) fn new(id: TargetId, mut layout: LayoutFile, screen_count: usize) -> Self {
        let view = initial_view(&layout, screen_count);
        let layer_config = LayerConfig::default();
        if let Some(v) = layout.views_mut().get_mut(view) {
            v.recompute(&layer_config);
        }
        Self {
            id,
            layout,
            view,
            base_view: view,
            layer_config,
            base_layer_config: layer_config,
            orientation: Orientation::ROT0,
            base_orientation: Orientation::ROT0,
            width: 640,
            height: 480,
            pixel_aspect: Some(1.0),
            max_refresh: None,
            ring: std::array::from_fn(|_| Arc::new(Mutex::new(PrimitiveList::new()))),
            next_slot: 0,
            frame_index: 0,
            clear_region: ClearRegion::default(),
            element_textures: HashMap::new(),
        }
    }

    pub(crate) fn ring_handles(&self) -> Vec<Weak<Mutex<PrimitiveList>>> {
        self.ring.iter().map(Arc::downgrade).collect()
    }

    pub(crate) fn element_textures(&self) -> impl Iterator<Item = TextureId> + '_ {
        self.element_textures.values().copied()
    }

    /// This target's identifier.
    #[must_use]
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// The layout this target shows.
    #[must_use]
    pub fn layout(&self) -> &LayoutFile {
        &self.layout
    }

    // -- views --------------------------------------------------------------

    /// Index of the current view.
    #[must_use]
    pub fn view_index(&self) -> usize {
        self.view
    }

    /// The current view.
    #[must_use]
    pub fn current_view(&self) -> &LayoutView {
        &self.layout.views()[self.view]
    }

    /// Number of views.
    #[must_use]
    pub fn view_count(&self) -> usize {
        self.layout.views().len()
    }

    /// Name of view `index`.
    #[must_use]
    pub fn view_name(&self, index: usize) -> Option<&str> {
        self.layout.views().get(index).map(LayoutView::name)
    }

    /// Index of the view called `name`.
    #[must_use]
    pub fn view_by_name(&self, name: &str) -> Option<usize> {
        self.layout.views().iter().position(|v| v.name() == name)
    }

    /// Selects view `index`. Returns `false` if there is no such view.
    pub fn set_view(&mut self, index: usize) -> bool {
        if index >= self.view_count() {
            return false;
        }
        self.view = index;
        self.recompute();
        true
    }

    /// The visible layers.
    #[must_use]
    pub fn layer_config(&self) -> LayerConfig {
        self.layer_config
    }

    /// Changes the visible layers and recomputes the view geometry.
    pub fn set_layer_config(&mut self, config: LayerConfig) {
        self.layer_config = config;
        self.recompute();
    }

    fn recompute(&mut self) {
        let config = self.layer_config;
        if let Some(view) = self.layout.views_mut().get_mut(self.view) {
            view.recompute(&config);
        }
    }

    // -- device -------------------------------------------------------------

    /// Device orientation.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Sets the device orientation.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Sets the orientation saved rotations are relative to, and makes it
    /// current.
    pub fn set_base_orientation(&mut self, orientation: Orientation) {
        self.base_orientation = orientation;
        self.orientation = orientation;
    }

    /// Device size in pixels.
    #[must_use]
    pub fn bounds(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Device pixel aspect; `None` stretches the view to fill the device.
    #[must_use]
    pub fn pixel_aspect(&self) -> Option<f64> {
        self.pixel_aspect
    }

    /// Sets the device size and pixel aspect.
    pub fn set_bounds(&mut self, width: u32, height: u32, pixel_aspect: Option<f64>) {
        self.width = width;
        self.height = height;
        self.pixel_aspect = pixel_aspect;
    }

    /// Maximum refresh rate the device wants, in Hz.
    #[must_use]
    pub fn max_update_rate(&self) -> Option<u32> {
        self.max_refresh
    }

    /// Limits the refresh rate.
    pub fn set_max_update_rate(&mut self, hz: Option<u32>) {
        self.max_refresh = hz;
    }

    /// Size of the area the current view occupies on a device of the given
    /// size, pixel aspect and orientation.
    ///
    /// With a pixel aspect the view keeps its proportions and is fitted by
    /// width or height; without one it is stretched to the whole device.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "visible sizes are rounded and bounded by the device size"
    )]
    pub fn compute_visible_area(
        &self,
        target_width: u32,
        target_height: u32,
        pixel_aspect: Option<f64>,
        orientation: Orientation,
    ) -> (u32, u32) {
        let (tw, th) = (f64::from(target_width), f64::from(target_height));
        let (width, height, scale) = match pixel_aspect {
            Some(aspect) if aspect > 0.0 => {
                let mut width = self.current_view().effective_aspect();
                let mut height = 1.0;
                if orientation.swap_xy() {
                    core::mem::swap(&mut width, &mut height);
                }
                height *= aspect;
                let scale = if width / height > tw / th {
                    tw / width
                } else {
                    th / height
                };
                (width, height, scale)
            }
            _ => (tw, th, 1.0),
        };
        (
            round_nearest(width * scale).max(0.0) as u32,
            round_nearest(height * scale).max(0.0) as u32,
        )
    }

    fn visible_box(&self) -> Rect {
        let (vw, vh) =
            self.compute_visible_area(self.width, self.height, self.pixel_aspect, self.orientation);
        let xoffs = self.width.saturating_sub(vw) / 2;
        let yoffs = self.height.saturating_sub(vh) / 2;
        Rect::from_xywh(
            f64::from(xoffs),
            f64::from(yoffs),
            f64::from(vw),
            f64::from(vh),
        )
    }

    /// Smallest device size at which every screen of the current view is
    /// shown at its native resolution, or 640×480 without screens.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "sizes are rounded pixel counts"
    )]
    pub fn compute_minimum_size(&self, compositor: &Compositor) -> (u32, u32) {
        let mut max: Option<(f64, f64)> = None;
        for item in self.current_view().items(LayerKind::Screen) {
            let Some(index) = item.screen() else {
                continue;
            };
            let Some(info) = compositor.screen_info(index as usize) else {
                continue;
            };
            let (bw, bh) = (item.bounds.width(), item.bounds.height());
            if bw <= 0.0 || bh <= 0.0 {
                continue;
            }
            let mut size = (f64::from(info.native_width), f64::from(info.native_height));
            let placed = compositor
                .screen_container(index as usize)
                .and_then(|c| compositor.container(c))
                .map_or(Orientation::ROT0, |c| c.user_settings().orientation);
            if (placed + item.orientation).swap_xy() {
                size = (size.1, size.0);
            }
            let (xs, ys) = (size.0 / bw, size.1 / bh);
            max = Some(max.map_or((xs, ys), |(mx, my)| (mx.max(xs), my.max(ys))));
        }
        let (mut w, mut h) = max.unwrap_or((640.0, 480.0));
        if self.orientation.swap_xy() {
            core::mem::swap(&mut w, &mut h);
        }
        (round_nearest(w) as u32, round_nearest(h) as u32)
    }

    // -- frame --------------------------------------------------------------

    /// Builds the next primitive list and returns it.
    ///
    /// The list stays valid until it comes around again in the ring, or
    /// until a bitmap it references is freed.
    pub fn get_primitives(&mut self, compositor: &mut Compositor) -> Arc<Mutex<PrimitiveList>> {
        self.get_primitives_traced(compositor, &mut Tracer::none())
    }

    /// [`get_primitives`](Self::get_primitives) reporting to `tracer`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "ring slots and per-frame primitive counts are small"
    )]
    pub fn get_primitives_traced(
        &mut self,
        compositor: &mut Compositor,
        tracer: &mut Tracer<'_>,
    ) -> Arc<Mutex<PrimitiveList>> {
        let slot = self.next_slot;
        self.next_slot = (slot + 1) % RING_SIZE;
        self.frame_index += 1;
        let frame_index = self.frame_index;
        tracer.frame_begin(&FrameBeginEvent {
            frame_index,
            width: self.width,
            height: self.height,
            ring_slot: slot as u8,
        });

        let ring = Arc::clone(&self.ring[slot]);
        let mut list = ring.lock();
        list.clear();
        list.set_frame_index(frame_index);

        compositor.textures.begin_frame();
        let visible = self.visible_box();
        let device = Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height));
        let is_ui = compositor.is_ui_target(self.id);
        let root = ItemTransform::from_box(visible, self.orientation);
        let screens: Vec<ContainerId> = (0..compositor.screen_count())
            .filter_map(|i| compositor.screen_container(i))
            .collect();

        let Compositor {
            bitmaps,
            textures,
            containers,
            ui_container,
            debug_containers,
            outputs,
            inputs,
            assets,
            ..
        } = compositor;

        let mut frame = Frame {
            list: &mut list,
            bitmaps,
            textures,
            containers,
            assets,
            element_textures: &mut self.element_textures,
            screen_overlay: self.layer_config.screen_overlay,
        };

        let view = &self.layout.views()[self.view];
        for &(layer, blend) in layer_order(view) {
            let enabled = view.layer_enabled(layer);
            let before = frame.list.len();
            if enabled {
                for item in view.items(layer) {
                    let xform = root.child(item.bounds, item.color, item.orientation);
                    match &item.source {
                        ItemSource::Screen(index) => {
                            if let Some(&container) = screens.get(*index as usize) {
                                frame.container(&xform, visible, container, blend);
                            }
                        }
                        ItemSource::Element { element, output } => {
                            let state = item.state(
                                output.as_deref().and_then(|o| outputs.get(o).copied()),
                                item.input_tag.as_deref().and_then(|t| inputs.get(t).copied()),
                            );
                            frame.element(&xform, visible, element, state, blend);
                        }
                    }
                }
            }
            tracer.layer(&LayerEvent {
                frame_index,
                layer: layer.name(),
                blend,
                enabled,
                primitives: (frame.list.len() - before) as u32,
            });
        }

        let ui_xform = ItemTransform::from_box(device, self.orientation);
        // Scaled debug contents grow from the device origin.
        let debug_xform = ItemTransform {
            no_center: true,
            ..ui_xform
        };
        for &debug in debug_containers.iter() {
            frame.container(&debug_xform, device, debug, BlendMode::Alpha);
        }
        if is_ui {
            frame.container(&ui_xform, device, *ui_container, BlendMode::Alpha);
        }

        let stats = optimize(frame.list, device, &mut self.clear_region);
        tracer.optimize(&OptimizeEvent {
            frame_index,
            opaque_quads: stats.opaque_quads,
            clear_quads: stats.clear_quads,
        });
        tracer.frame_end(&FrameEndEvent {
            frame_index,
            primitives: list.len() as u32,
        });
        drop(list);
        ring
    }

    // -- hit testing --------------------------------------------------------

    /// Maps a device point into the 0..1 space of the view.
    fn view_point(&self, x: f64, y: f64) -> Option<Point> {
        let visible = self.visible_box();
        if visible.width() <= 0.0 || visible.height() <= 0.0 {
            return None;
        }
        let p = Point::new(
            (x - visible.x0) / visible.width(),
            (y - visible.y0) / visible.height(),
        );
        Some(self.orientation.reverse().apply_point(p))
    }

    /// Maps a device point into the 0..1 space of `container`, if a screen
    /// item showing it lies under the point.
    #[must_use]
    pub fn map_point_container(
        &self,
        x: f64,
        y: f64,
        container: ContainerId,
        compositor: &Compositor,
    ) -> Option<Point> {
        let p = self.view_point(x, y)?;
        self.current_view()
            .items(LayerKind::Screen)
            .iter()
            .filter(|item| {
                item.screen()
                    .and_then(|i| compositor.screen_container(i as usize))
                    == Some(container)
            })
            .find_map(|item| item_point(item, p))
    }

    /// Finds the topmost item with input metadata under a device point.
    #[must_use]
    pub fn map_point_input(&self, x: f64, y: f64) -> Option<InputHit> {
        let p = self.view_point(x, y)?;
        let view = self.current_view();
        layer_order(view)
            .iter()
            .rev()
            .filter(|(layer, _)| view.layer_enabled(*layer))
            .flat_map(|&(layer, _)| view.items(layer).iter().rev())
            .find_map(|item| {
                let tag = item.input_tag.as_ref()?;
                Some(InputHit {
                    tag: tag.clone(),
                    mask: item.input_mask,
                    point: item_point(item, p)?,
                })
            })
    }

    // -- settings -----------------------------------------------------------

    /// Settings that differ from those the target started with.
    #[must_use]
    pub fn save_config(&self) -> TargetConfig {
        let changed = |now: bool, base: bool| (now != base).then_some(now);
        let (now, base) = (&self.layer_config, &self.base_layer_config);
        TargetConfig {
            view: (self.view != self.base_view).then(|| self.current_view().name().to_owned()),
            backdrops: changed(now.backdrops, base.backdrops),
            overlays: changed(now.overlays, base.overlays),
            bezels: changed(now.bezels, base.bezels),
            zoom: changed(now.zoom_to_screen, base.zoom_to_screen),
            rotate: (self.orientation + self.base_orientation.reverse())
                .rotation()
                .filter(|&r| r != 0),
        }
    }

    /// Applies saved settings.
    ///
    /// An unknown view name is ignored with a warning; an invalid rotation is
    /// an error and leaves the target unchanged.
    pub fn load_config(&mut self, config: &TargetConfig) -> Result<(), ConfigError> {
        let rotation = match config.rotate {
            Some(deg) => Some(
                Orientation::from_rotation(i64::from(deg)).ok_or(ConfigError::Rotation(deg))?,
            ),
            None => None,
        };
        if let Some(rotation) = rotation {
            self.orientation = rotation + self.base_orientation;
        }
        if let Some(name) = &config.view {
            match self.view_by_name(name) {
                Some(index) => self.view = index,
                None => log::warn!("saved view `{name}` is not in the layout"),
            }
        }
        let lc = &mut self.layer_config;
        lc.backdrops = config.backdrops.unwrap_or(lc.backdrops);
        lc.overlays = config.overlays.unwrap_or(lc.overlays);
        lc.bezels = config.bezels.unwrap_or(lc.bezels);
        lc.zoom_to_screen = config.zoom.unwrap_or(lc.zoom_to_screen);
        self.recompute();
        Ok(())
    }
}

fn initial_view(layout: &LayoutFile, screen_count: usize) -> usize {
    layout
        .views()
        .iter()
        .position(|v| (0..screen_count).all(|i| u32::try_from(i).is_ok_and(|i| v.has_screen(i))))
        .unwrap_or(0)
}

fn item_point(item: &ViewItem, p: Point) -> Option<Point> {
    let b = item.bounds.normalized();
    if b.width() <= 0.0 || b.height() <= 0.0 || !b.contains(p) {
        return None;
    }
    Some(Point::new(
        (p.x - b.x0) / b.width(),
        (p.y - b.y0) / b.height(),
    ))
}

/// Rounds the corners of a device rectangle to whole pixels.
fn snap(r: Rect) -> Rect {
    Rect::new(
        round_nearest(r.x0),
        round_nearest(r.y0),
        round_nearest(r.x1),
        round_nearest(r.y1),
    )
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "snapped sizes are small non-negative pixel counts"
)]
fn pixel_size(r: Rect, orientation: Orientation) -> (u32, u32) {
    let w = r.width().max(0.0) as u32;
    let h = r.height().max(0.0) as u32;
    if orientation.swap_xy() { (h, w) } else { (w, h) }
}

/// Borrowed state for building one primitive list.
struct Frame<'a> {
    list: &'a mut PrimitiveList,
    bitmaps: &'a BitmapStore,
    textures: &'a mut TextureStore,
    containers: &'a Arena<Container>,
    assets: &'a Assets,
    element_textures: &'a mut HashMap<(usize, i32), TextureId>,
    screen_overlay: bool,
}

impl Frame<'_> {
    fn push_clipped(&mut self, mut prim: Primitive, clip: &Rect) {
        match prim.kind {
            PrimitiveKind::Line { .. } => {
                let Some(bounds) = clip_line(prim.bounds, clip) else {
                    return;
                };
                prim.bounds = bounds;
            }
            PrimitiveKind::Quad => {
                let Some((bounds, coords)) = clip_quad(prim.bounds, prim.texcoords, clip) else {
                    return;
                };
                prim.bounds = bounds;
                prim.texcoords = coords;
            }
        }
        self.list.push(prim);
    }

    fn textured(
        &mut self,
        texture: TextureId,
        size: (u32, u32),
        container: Option<&Container>,
    ) -> Option<PrimitiveTexture> {
        let tex = self.textures.get_mut(texture)?;
        let source = tex.source();
        let scaled = tex.get_scaled(self.bitmaps, size.0, size.1)?;
        let color_table = container.and_then(|c| c.color_table_for(scaled.format));
        Some(PrimitiveTexture {
            scaled,
            source,
            color_table,
        })
    }

    /// Emits the items of a container placed in `xform`'s box.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "line widths are display-scale values"
    )]
    fn container(&mut self, xform: &ItemTransform, clip: Rect, id: ContainerId, blend: BlendMode) {
        let containers = self.containers;
        let Some(container) = containers.get(id.key()) else {
            return;
        };
        let clip = clip.intersect(xform.device_box());
        if clip.width() <= 0.0 || clip.height() <= 0.0 {
            return;
        }
        let cxf = xform.place(&container.placement());

        for item in container.items() {
            let item_blend = item.flags.blend.unwrap_or(blend);
            let color = item.color * cxf.color;
            let prim = match item.kind {
                ItemKind::Line { width } => {
                    let mapped = cxf.map_rect(item.bounds);
                    let scale = cxf.xscale.abs().min(cxf.yscale.abs()) as f32;
                    Primitive::line(
                        Point::new(mapped.x0, mapped.y0),
                        Point::new(mapped.x1, mapped.y1),
                        width * scale,
                        container.adjust_color(color),
                        item_blend,
                    )
                }
                ItemKind::Quad { texture } | ItemKind::Glyph { texture } => {
                    let mapped = cxf.map_rect(item.bounds).normalized();
                    let bounds = if matches!(item.kind, ItemKind::Glyph { .. }) {
                        // Glyphs keep their advance width regardless of position.
                        let (x0, y0) = (round_nearest(mapped.x0), round_nearest(mapped.y0));
                        Rect::new(
                            x0,
                            y0,
                            x0 + round_nearest(mapped.width()),
                            y0 + round_nearest(mapped.height()),
                        )
                    } else {
                        snap(mapped)
                    };
                    match texture {
                        Some(texture) => {
                            let orient = item.flags.tex_orientation + cxf.orientation;
                            let size = pixel_size(bounds, orient);
                            let Some(tex) = self.textured(texture, size, Some(container)) else {
                                continue;
                            };
                            Primitive {
                                texture: Some(tex),
                                texcoords: TexCoords::oriented(orient),
                                ..Primitive::quad(bounds, color, item_blend)
                            }
                        }
                        None => Primitive::quad(bounds, container.adjust_color(color), item_blend),
                    }
                }
            };
            self.push_clipped(prim, &clip);
        }

        if self.screen_overlay
            && let Some(overlay) = container.overlay()
        {
            let bounds = snap(xform.device_box());
            let size = pixel_size(bounds, xform.orientation);
            if let Some(tex) = self.textured(overlay, size, None) {
                let prim = Primitive {
                    texture: Some(tex),
                    texcoords: TexCoords::oriented(xform.orientation),
                    ..Primitive::quad(bounds, Color::WHITE, BlendMode::RgbMultiply)
                };
                self.push_clipped(prim, &clip);
            }
        }
    }

    /// Emits one quad showing `element` in `state`.
    fn element(
        &mut self,
        xform: &ItemTransform,
        clip: Rect,
        element: &Arc<LayoutElement>,
        state: i32,
        blend: BlendMode,
    ) {
        if state > element.max_state() {
            return;
        }
        let state = state.max(0);
        let bounds = snap(xform.device_box());
        if xform.color.a <= 0.0 || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return;
        }
        let key = (Arc::as_ptr(element).addr(), state);
        let texture = *self.element_textures.entry(key).or_insert_with(|| {
            let scaler = ElementScaler::new(Arc::clone(element), state, self.assets.clone());
            self.textures.insert(Texture::new(Some(Box::new(scaler))))
        });
        let size = pixel_size(bounds, xform.orientation);
        let Some(tex) = self.textured(texture, size, None) else {
            return;
        };
        let prim = Primitive {
            texture: Some(tex),
            texcoords: TexCoords::oriented(xform.orientation),
            ..Primitive::quad(bounds, xform.color, blend)
        };
        self.push_clipped(prim, &clip);
    }
}
