// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The compositor context.
//!
//! A [`Compositor`] owns everything targets share: the bitmap, texture and
//! container registries, the live screens, the UI container and the debug
//! containers, and the output and input values that drive element states.
//! Targets are owned by the caller; the compositor only remembers their
//! primitive-list rings weakly, so it can purge lists that still reference a
//! bitmap before freeing it.

use std::collections::HashMap;
use std::sync::Weak;

use bezel_core::arena::Arena;
use bezel_core::bitmap::{Bitmap, BitmapId, BitmapStore};
use bezel_core::container::{Container, ContainerId, UserSettings};
use bezel_core::texture::{Scaler, Texture, TextureId, TextureStore};
use bezel_layout::draw::Assets;
use bezel_layout::file::{LayoutFile, LayoutRequest, load_layout};
use bezel_layout::subst::ScreenInfo;
use parking_lot::Mutex;

use crate::config::{ConfigError, ContainerConfig, RenderConfig};
use crate::primitive::PrimitiveList;
use crate::target::Target;

/// Identifies a target created by a [`Compositor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetId(u32);

#[derive(Clone, Debug)]
struct Screen {
    info: ScreenInfo,
    container: ContainerId,
}

#[derive(Debug)]
struct RingEntry {
    target: TargetId,
    lists: Vec<Weak<Mutex<PrimitiveList>>>,
}

/// Shared state for every render target.
#[derive(Debug)]
pub struct Compositor {
    pub(crate) bitmaps: BitmapStore,
    pub(crate) textures: TextureStore,
    pub(crate) containers: Arena<Container>,
    screens: Vec<Screen>,
    pub(crate) ui_container: ContainerId,
    pub(crate) debug_containers: Vec<ContainerId>,
    ui_target: Option<TargetId>,
    next_target: u32,
    rings: Vec<RingEntry>,
    pub(crate) outputs: HashMap<String, i32>,
    pub(crate) inputs: HashMap<String, u32>,
    pub(crate) assets: Assets,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    /// Creates a compositor with no screens and an empty UI container.
    #[must_use]
    pub fn new() -> Self {
        let mut containers = Arena::new();
        let ui_container = ContainerId::from_key(containers.insert(Container::new()));
        Self {
            bitmaps: BitmapStore::new(),
            textures: TextureStore::new(),
            containers,
            screens: Vec::new(),
            ui_container,
            debug_containers: Vec::new(),
            ui_target: None,
            next_target: 0,
            rings: Vec::new(),
            outputs: HashMap::new(),
            inputs: HashMap::new(),
            assets: Assets::default(),
        }
    }

    // -- screens ------------------------------------------------------------

    /// Adds a live screen and returns its index.
    ///
    /// Screens are numbered in the order they are added; layouts refer to
    /// them by that index.
    pub fn add_screen(&mut self, info: ScreenInfo) -> usize {
        let container = self.create_container();
        self.screens.push(Screen { info, container });
        self.screens.len() - 1
    }

    /// Number of live screens.
    #[must_use]
    pub fn screen_count(&self) -> usize {
        self.screens.len()
    }

    /// Container that screen `index` draws into.
    #[must_use]
    pub fn screen_container(&self, index: usize) -> Option<ContainerId> {
        self.screens.get(index).map(|s| s.container)
    }

    /// Geometry of screen `index`.
    #[must_use]
    pub fn screen_info(&self, index: usize) -> Option<ScreenInfo> {
        self.screens.get(index).map(|s| s.info)
    }

    /// Updates the geometry of screen `index`, for example after a
    /// resolution change.
    pub fn set_screen_info(&mut self, index: usize, info: ScreenInfo) {
        if let Some(screen) = self.screens.get_mut(index) {
            screen.info = info;
        }
    }

    /// Geometry of every screen in index order.
    #[must_use]
    pub fn screen_infos(&self) -> Vec<ScreenInfo> {
        self.screens.iter().map(|s| s.info).collect()
    }

    // -- containers ---------------------------------------------------------

    /// Creates an empty container.
    pub fn create_container(&mut self) -> ContainerId {
        ContainerId::from_key(self.containers.insert(Container::new()))
    }

    /// Destroys a container. Screen and UI containers cannot be destroyed.
    pub fn destroy_container(&mut self, id: ContainerId) -> Option<Container> {
        if id == self.ui_container || self.screens.iter().any(|s| s.container == id) {
            log::warn!("refusing to destroy a screen or UI container");
            return None;
        }
        self.debug_containers.retain(|&c| c != id);
        self.containers.remove(id.key())
    }

    /// Shared access to a container.
    #[must_use]
    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.key())
    }

    /// Exclusive access to a container.
    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.containers.get_mut(id.key())
    }

    /// The container drawn over the UI target's full device area.
    #[must_use]
    pub fn ui_container(&self) -> ContainerId {
        self.ui_container
    }

    /// Draws `id` over every target, beneath the UI container.
    pub fn add_debug_container(&mut self, id: ContainerId) {
        if !self.debug_containers.contains(&id) {
            self.debug_containers.push(id);
        }
    }

    /// Stops drawing a debug container.
    pub fn remove_debug_container(&mut self, id: ContainerId) {
        self.debug_containers.retain(|&c| c != id);
    }

    // -- bitmaps and textures -----------------------------------------------

    /// The bitmap registry.
    #[must_use]
    pub fn bitmaps(&self) -> &BitmapStore {
        &self.bitmaps
    }

    /// Mutable access to the bitmap registry.
    pub fn bitmaps_mut(&mut self) -> &mut BitmapStore {
        &mut self.bitmaps
    }

    /// Registers a bitmap.
    pub fn add_bitmap(&mut self, bitmap: Bitmap) -> BitmapId {
        self.bitmaps.insert(bitmap)
    }

    /// Frees a bitmap once nothing can read it.
    ///
    /// Every primitive list still referencing the bitmap is cleared, and every
    /// texture sourced from it is detached, before the registry slot is
    /// released. Returns `false` if the bitmap was not registered.
    pub fn free_bitmap(&mut self, id: BitmapId) -> bool {
        self.rings
            .retain(|entry| entry.lists.iter().any(|w| w.strong_count() > 0));
        for entry in &self.rings {
            for list in entry.lists.iter().filter_map(Weak::upgrade) {
                let mut list = list.lock();
                if list.references(id) {
                    log::debug!(
                        "clearing frame {} of {:?} before freeing a bitmap",
                        list.frame_index(),
                        entry.target
                    );
                    list.clear();
                }
            }
        }
        self.textures.clear_source_for(id);
        self.bitmaps.remove(id).is_some()
    }

    /// The texture registry.
    #[must_use]
    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }

    /// Mutable access to the texture registry.
    pub fn textures_mut(&mut self) -> &mut TextureStore {
        &mut self.textures
    }

    /// Creates a texture with an optional scaler.
    pub fn create_texture(&mut self, scaler: Option<Box<dyn Scaler>>) -> TextureId {
        self.textures.insert(Texture::new(scaler))
    }

    /// Destroys a texture.
    pub fn destroy_texture(&mut self, id: TextureId) -> Option<Texture> {
        self.textures.remove(id)
    }

    // -- element state ------------------------------------------------------

    /// Sets a named output; elements bound to it show that state.
    pub fn set_output(&mut self, name: impl Into<String>, value: i32) {
        self.outputs.insert(name.into(), value);
    }

    /// Current value of a named output.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<i32> {
        self.outputs.get(name).copied()
    }

    /// Sets the value of an input port.
    pub fn set_input(&mut self, tag: impl Into<String>, value: u32) {
        self.inputs.insert(tag.into(), value);
    }

    /// Current value of an input port.
    #[must_use]
    pub fn input(&self, tag: &str) -> Option<u32> {
        self.inputs.get(tag).copied()
    }

    /// Sets the image loader and text renderer used by artwork elements.
    ///
    /// Element textures created afterwards use the new assets.
    pub fn set_assets(&mut self, assets: Assets) {
        self.assets = assets;
    }

    // -- targets ------------------------------------------------------------

    /// Creates a target with the first layout found for `request`.
    #[must_use]
    pub fn create_target(&mut self, request: &LayoutRequest) -> Target {
        let layout = load_layout(request, &self.screen_infos());
        self.create_target_with_layout(layout)
    }

    /// Creates a target showing an already loaded layout.
    #[must_use]
    pub fn create_target_with_layout(&mut self, layout: LayoutFile) -> Target {
        let id = TargetId(self.next_target);
        self.next_target += 1;
        let target = Target::new(id, layout, self.screens.len());
        self.rings.push(RingEntry {
            target: id,
            lists: target.ring_handles(),
        });
        target
    }

    /// Releases a target's element textures and ring registration.
    pub fn destroy_target(&mut self, target: Target) {
        let id = target.id();
        for texture in target.element_textures() {
            self.textures.remove(texture);
        }
        self.rings.retain(|entry| entry.target != id);
        if self.ui_target == Some(id) {
            self.ui_target = None;
        }
    }

    /// Designates the target that draws the UI container.
    pub fn set_ui_target(&mut self, target: &Target) {
        self.ui_target = Some(target.id());
    }

    /// Whether `id` is the UI target.
    #[must_use]
    pub fn is_ui_target(&self, id: TargetId) -> bool {
        self.ui_target == Some(id)
    }

    // -- settings -----------------------------------------------------------

    /// Collects the deviations of `targets` and of every screen from their
    /// baselines.
    #[must_use]
    pub fn save_config(&self, targets: &[&Target]) -> RenderConfig {
        let mut config = RenderConfig::default();
        for (index, target) in targets.iter().enumerate() {
            config.set_target(index, target.save_config());
        }
        let baseline = UserSettings::default();
        for (index, screen) in self.screens.iter().enumerate() {
            if let Some(container) = self.containers.get(screen.container.key()) {
                let diff = ContainerConfig::diff(container.user_settings(), &baseline);
                config.set_screen(index, diff);
            }
        }
        config
    }

    /// Applies saved settings to `targets` and the screens.
    ///
    /// Entries for targets or screens that do not exist are ignored.
    pub fn load_config(
        &mut self,
        targets: &mut [&mut Target],
        config: &RenderConfig,
    ) -> Result<(), ConfigError> {
        for (index, target) in targets.iter_mut().enumerate() {
            if let Some(saved) = config.target(index) {
                target.load_config(saved)?;
            }
        }
        for (index, screen) in self.screens.iter().enumerate() {
            let (Some(saved), Some(container)) = (
                config.screen(index),
                self.containers.get_mut(screen.container.key()),
            ) else {
                continue;
            };
            let mut settings = *container.user_settings();
            saved.apply(&mut settings);
            container.set_user_settings(settings);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bezel_core::bitmap::PixelFormat;
    use bezel_core::color::Color;
    use bezel_core::container::ItemFlags;
    use bezel_core::geometry::PixelRect;
    use bezel_core::texture::NearestScaler;
    use kurbo::Rect;

    fn one_screen() -> Compositor {
        let mut c = Compositor::new();
        c.add_screen(ScreenInfo::new(320, 240));
        c
    }

    fn draw_bitmap(c: &mut Compositor) -> BitmapId {
        let bitmap = c.add_bitmap(Bitmap::new(320, 240, PixelFormat::Rgb32));
        let texture = c.create_texture(Some(Box::new(NearestScaler)));
        c.textures_mut().get_mut(texture).unwrap().set_source(
            bitmap,
            PixelRect::sized(320, 240),
            PixelFormat::Rgb32,
            None,
        );
        let screen = c.screen_container(0).unwrap();
        c.container_mut(screen).unwrap().add_quad(
            0.0,
            0.0,
            1.0,
            1.0,
            Color::WHITE,
            Some(texture),
            ItemFlags::default(),
        );
        bitmap
    }

    #[test]
    fn free_bitmap_clears_referencing_lists() {
        let mut c = one_screen();
        let bitmap = draw_bitmap(&mut c);
        let mut target = c.create_target(&LayoutRequest::default());
        target.set_bounds(320, 240, None);
        let list = target.get_primitives(&mut c);
        assert!(list.lock().references(bitmap));

        assert!(c.free_bitmap(bitmap));
        assert!(list.lock().is_empty());
        assert!(!c.bitmaps().contains(bitmap));
        assert!(!c.free_bitmap(bitmap));
    }

    #[test]
    fn screen_and_ui_containers_are_protected() {
        let mut c = one_screen();
        let screen = c.screen_container(0).unwrap();
        assert!(c.destroy_container(screen).is_none());
        assert!(c.destroy_container(c.ui_container()).is_none());
        let debug = c.create_container();
        c.add_debug_container(debug);
        assert!(c.destroy_container(debug).is_some());
        assert!(c.debug_containers.is_empty());
    }

    #[test]
    fn ui_target_designation() {
        let mut c = one_screen();
        let a = c.create_target(&LayoutRequest::default());
        let b = c.create_target(&LayoutRequest::default());
        assert_ne!(a.id(), b.id());
        c.set_ui_target(&b);
        assert!(c.is_ui_target(b.id()));
        assert!(!c.is_ui_target(a.id()));
        let b_id = b.id();
        c.destroy_target(b);
        assert!(!c.is_ui_target(b_id));
    }

    #[test]
    fn ui_container_draws_only_on_ui_target() {
        let mut c = Compositor::new();
        let ui = c.ui_container();
        c.container_mut(ui)
            .unwrap()
            .add_rect(0.0, 0.0, 0.5, 0.5, Color::WHITE);
        let mut plain = c.create_target(&LayoutRequest::default());
        let mut main = c.create_target(&LayoutRequest::default());
        plain.set_bounds(100, 100, None);
        main.set_bounds(100, 100, None);
        c.set_ui_target(&main);

        let drawn = main.get_primitives(&mut c);
        let drawn = drawn.lock();
        assert!(
            drawn
                .items()
                .iter()
                .any(|p| p.bounds == Rect::new(0.0, 0.0, 50.0, 50.0))
        );
        let other = plain.get_primitives(&mut c);
        assert!(
            !other
                .lock()
                .items()
                .iter()
                .any(|p| p.bounds == Rect::new(0.0, 0.0, 50.0, 50.0))
        );
    }

    #[test]
    fn settings_round_trip_through_config() {
        let mut c = one_screen();
        let mut target = c.create_target(&LayoutRequest::default());
        assert!(c.save_config(&[&target]).is_empty());

        let screen = c.screen_container(0).unwrap();
        let mut settings = *c.container(screen).unwrap().user_settings();
        settings.gamma = 1.5;
        c.container_mut(screen).unwrap().set_user_settings(settings);
        let saved = c.save_config(&[&target]);
        assert_eq!(saved.screen(0).unwrap().gamma, Some(1.5));

        let mut fresh = one_screen();
        fresh.load_config(&mut [&mut target], &saved).unwrap();
        let screen = fresh.screen_container(0).unwrap();
        assert_eq!(fresh.container(screen).unwrap().user_settings().gamma, 1.5);
        assert_eq!(fresh.save_config(&[&target]), saved);
    }
}
