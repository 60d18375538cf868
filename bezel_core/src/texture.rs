// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Source-bitmap wrapper with a bounded cache of scaled copies.
//!
//! A [`Texture`] names a sub-rectangle of a registered [`Bitmap`] and keeps up
//! to [`MAX_TEXTURE_SCALES`] rescaled copies of it. [`Texture::get_scaled`]
//! returns either the source itself (when no rescaling is needed or possible)
//! or a cached copy, replacing the least recently created unreferenced copy
//! when a new size is requested.
//!
//! Copies are reference counted, so evicting a slot never invalidates a
//! primitive list that was built from it; the per-frame referenced mark only
//! keeps one frame from evicting a copy it is still using.

use std::sync::Arc;

use crate::arena::{Arena, Key};
use crate::bitmap::{Bitmap, BitmapId, BitmapStore, PixelFormat};
use crate::geometry::PixelRect;

/// Number of scaled copies one texture can hold at a time.
pub const MAX_TEXTURE_SCALES: usize = 16;

/// A borrowed view of a texture's source pixels.
#[derive(Clone, Copy, Debug)]
pub struct SourceRef<'a> {
    /// The source bitmap.
    pub bitmap: &'a Bitmap,
    /// The region of `bitmap` the texture covers.
    pub sub: PixelRect,
}

/// Produces the contents of a scaled copy.
///
/// `dest` is already allocated at the requested size and format. `source` is
/// `None` for textures whose content is generated rather than resampled, such
/// as artwork elements.
pub trait Scaler {
    /// Fills `dest`.
    fn scale(&self, dest: &mut Bitmap, source: Option<SourceRef<'_>>);

    /// Format of the copies this scaler produces.
    fn output_format(&self, source: Option<PixelFormat>) -> PixelFormat {
        source.unwrap_or(PixelFormat::Argb32)
    }
}

/// Nearest-neighbour resampling that preserves the source format.
#[derive(Clone, Copy, Debug, Default)]
pub struct NearestScaler;

impl Scaler for NearestScaler {
    fn scale(&self, dest: &mut Bitmap, source: Option<SourceRef<'_>>) {
        let Some(src) = source else {
            dest.fill(0);
            return;
        };
        if src.sub.is_empty() {
            dest.fill(0);
            return;
        }
        let (dw, dh) = (u64::from(dest.width()), u64::from(dest.height()));
        for y in 0..dest.height() {
            let sy = src.sub.y + (u64::from(y) * u64::from(src.sub.height) / dh) as u32;
            let row = src.bitmap.row(sy);
            for x in 0..dest.width() {
                let sx = src.sub.x + (u64::from(x) * u64::from(src.sub.width) / dw) as u32;
                dest.set_pixel(x, y, row[sx as usize]);
            }
        }
    }
}

/// The pixels to draw for one primitive.
#[derive(Clone, Debug)]
pub struct ScaledTexture {
    /// Pixel storage; for a direct source this is the whole source bitmap.
    pub bitmap: Arc<Bitmap>,
    /// Region of `bitmap` to sample.
    pub sub: PixelRect,
    /// Pixel format.
    pub format: PixelFormat,
    /// Palette attached to the source, if any.
    pub palette: Option<Arc<[u32]>>,
    /// Sequence id; changes whenever the pixel contents may have changed.
    pub seqid: u64,
}

impl ScaledTexture {
    /// Pixels per row of the underlying storage.
    #[inline]
    #[must_use]
    pub fn stride(&self) -> u32 {
        self.bitmap.stride()
    }

    /// Width of the sampled region.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.sub.width
    }

    /// Height of the sampled region.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.sub.height
    }
}

#[derive(Clone, Debug, Default)]
struct ScaleSlot {
    bitmap: Option<Arc<Bitmap>>,
    seqid: u64,
    referenced: bool,
}

/// A source bitmap reference plus its scaled copies.
pub struct Texture {
    source: Option<BitmapId>,
    sub: PixelRect,
    format: PixelFormat,
    palette: Option<Arc<[u32]>>,
    scaler: Option<Box<dyn Scaler>>,
    curseq: u64,
    slots: [ScaleSlot; MAX_TEXTURE_SCALES],
}

impl core::fmt::Debug for Texture {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Texture")
            .field("source", &self.source)
            .field("sub", &self.sub)
            .field("format", &self.format)
            .field("has_scaler", &self.scaler.is_some())
            .field("cached", &self.cached_count())
            .finish_non_exhaustive()
    }
}

impl Default for Texture {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Texture {
    /// Creates a texture with no source and an optional scaler.
    #[must_use]
    pub fn new(scaler: Option<Box<dyn Scaler>>) -> Self {
        Self {
            source: None,
            sub: PixelRect::default(),
            format: PixelFormat::Argb32,
            palette: None,
            scaler,
            curseq: 0,
            slots: <[ScaleSlot; MAX_TEXTURE_SCALES]>::default(),
        }
    }

    /// Points the texture at a region of a registered bitmap.
    ///
    /// Cached copies are discarded since they were scaled from the previous
    /// contents.
    pub fn set_source(
        &mut self,
        bitmap: BitmapId,
        sub: PixelRect,
        format: PixelFormat,
        palette: Option<Arc<[u32]>>,
    ) {
        self.source = Some(bitmap);
        self.sub = sub;
        self.format = format;
        self.palette = palette;
        self.invalidate();
    }

    /// Detaches the texture from its source bitmap.
    pub fn clear_source(&mut self) {
        self.source = None;
        self.sub = PixelRect::default();
        self.palette = None;
        self.invalidate();
    }

    /// Returns the current source bitmap handle.
    #[must_use]
    pub fn source(&self) -> Option<BitmapId> {
        self.source
    }

    /// Format of the source pixels.
    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Size of the source region, or `None` without a source.
    #[must_use]
    pub fn source_size(&self) -> Option<(u32, u32)> {
        self.source.map(|_| (self.sub.width, self.sub.height))
    }

    /// Drops every cached copy.
    pub fn invalidate(&mut self) {
        for slot in &mut self.slots {
            *slot = ScaleSlot::default();
        }
    }

    /// Clears the per-frame referenced marks.
    pub fn begin_frame(&mut self) {
        for slot in &mut self.slots {
            slot.referenced = false;
        }
    }

    /// Number of slots currently holding a copy.
    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.slots.iter().filter(|s| s.bitmap.is_some()).count()
    }

    /// Returns pixels for drawing at `width`×`height`.
    ///
    /// Sizes are clamped to at least one pixel. Returns `None` when the
    /// texture has nothing to draw: no source and no scaler, or a source
    /// bitmap that is no longer registered.
    ///
    /// # Panics
    ///
    /// Panics if a new size is requested while all [`MAX_TEXTURE_SCALES`]
    /// copies are referenced in the current frame.
    pub fn get_scaled(
        &mut self,
        bitmaps: &BitmapStore,
        width: u32,
        height: u32,
    ) -> Option<ScaledTexture> {
        let width = width.max(1);
        let height = height.max(1);

        let source = match self.source {
            Some(id) => Some(bitmaps.get(id)?),
            None => None,
        };
        // The source region never reaches past the bitmap it names.
        let sub = source.map_or(self.sub, |b| self.sub.intersect(&b.bounds()));

        let direct = self.scaler.is_none()
            || (source.is_some() && sub.width == width && sub.height == height);
        if direct {
            let bitmap = Arc::clone(source?);
            self.curseq += 1;
            return Some(ScaledTexture {
                bitmap,
                sub,
                format: self.format,
                palette: self.palette.clone(),
                seqid: self.curseq,
            });
        }

        let idx = match self.find_slot(width, height) {
            Some(idx) => idx,
            None => self.fill_slot(source.map(|b| &**b), sub, width, height)?,
        };
        let slot = &mut self.slots[idx];
        slot.referenced = true;
        let bitmap = Arc::clone(slot.bitmap.as_ref()?);
        Some(ScaledTexture {
            sub: bitmap.bounds(),
            format: bitmap.format(),
            bitmap,
            palette: self.palette.clone(),
            seqid: slot.seqid,
        })
    }

    fn find_slot(&self, width: u32, height: u32) -> Option<usize> {
        self.slots.iter().position(|s| {
            s.bitmap
                .as_ref()
                .is_some_and(|b| b.width() == width && b.height() == height)
        })
    }

    fn fill_slot(
        &mut self,
        source: Option<&Bitmap>,
        sub: PixelRect,
        width: u32,
        height: u32,
    ) -> Option<usize> {
        let scaler = self.scaler.as_deref()?;
        let victim = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.referenced)
            .min_by_key(|(_, s)| if s.bitmap.is_some() { s.seqid } else { 0 })
            .map(|(i, _)| i);
        let Some(idx) = victim else {
            panic!(
                "texture cache exhausted: all {MAX_TEXTURE_SCALES} scaled copies are referenced \
                 this frame ({width}x{height} requested)"
            );
        };

        let format = scaler.output_format(source.map(Bitmap::format));
        let mut dest = Bitmap::new(width, height, format);
        let src = source.map(|bitmap| SourceRef { bitmap, sub });
        scaler.scale(&mut dest, src);

        self.curseq += 1;
        log::debug!("scaled texture to {width}x{height} in slot {idx}");
        self.slots[idx] = ScaleSlot {
            bitmap: Some(Arc::new(dest)),
            seqid: self.curseq,
            referenced: false,
        };
        Some(idx)
    }
}

/// Handle to a texture registered with a [`TextureStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(Key<Texture>);

/// Registry of textures.
#[derive(Debug, Default)]
pub struct TextureStore {
    textures: Arena<Texture>,
}

impl TextureStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture.
    pub fn insert(&mut self, texture: Texture) -> TextureId {
        TextureId(self.textures.insert(texture))
    }

    /// Shared access to a texture.
    #[must_use]
    pub fn get(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0)
    }

    /// Exclusive access to a texture.
    pub fn get_mut(&mut self, id: TextureId) -> Option<&mut Texture> {
        self.textures.get_mut(id.0)
    }

    /// Unregisters a texture.
    pub fn remove(&mut self, id: TextureId) -> Option<Texture> {
        self.textures.remove(id.0)
    }

    /// Clears every texture's referenced marks.
    pub fn begin_frame(&mut self) {
        for texture in self.textures.values_mut() {
            texture.begin_frame();
        }
    }

    /// Detaches every texture sourced from `bitmap`.
    pub fn clear_source_for(&mut self, bitmap: BitmapId) {
        for texture in self.textures.values_mut() {
            if texture.source == Some(bitmap) {
                texture.clear_source();
            }
        }
    }

    /// Number of registered textures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Returns `true` if no textures are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sourced(store: &mut BitmapStore, scaler: bool) -> Texture {
        let mut bm = Bitmap::new(4, 2, PixelFormat::Rgb32);
        for (i, px) in bm.pixels_mut().iter_mut().enumerate() {
            *px = i as u32;
        }
        let id = store.insert(bm);
        let mut tex = Texture::new(scaler.then(|| Box::new(NearestScaler) as Box<dyn Scaler>));
        tex.set_source(id, PixelRect::sized(4, 2), PixelFormat::Rgb32, None);
        tex
    }

    #[test]
    fn matching_size_returns_source() {
        let mut store = BitmapStore::new();
        let mut tex = sourced(&mut store, true);
        let a = tex.get_scaled(&store, 4, 2).unwrap();
        assert!(Arc::ptr_eq(&a.bitmap, store.get(tex.source().unwrap()).unwrap()));
        let b = tex.get_scaled(&store, 4, 2).unwrap();
        assert!(b.seqid > a.seqid);
        assert_eq!(tex.cached_count(), 0);
    }

    #[test]
    fn no_scaler_always_returns_source() {
        let mut store = BitmapStore::new();
        let mut tex = sourced(&mut store, false);
        let s = tex.get_scaled(&store, 100, 100).unwrap();
        assert_eq!((s.width(), s.height()), (4, 2));
    }

    #[test]
    fn repeated_size_hits_cache() {
        let mut store = BitmapStore::new();
        let mut tex = sourced(&mut store, true);
        let a = tex.get_scaled(&store, 8, 4).unwrap();
        let b = tex.get_scaled(&store, 8, 4).unwrap();
        assert!(Arc::ptr_eq(&a.bitmap, &b.bitmap));
        assert_eq!(a.seqid, b.seqid);
        assert_eq!(tex.cached_count(), 1);
        // Nearest sampling doubles every source pixel.
        assert_eq!(a.bitmap.pixel(1, 1), Some(0));
        assert_eq!(a.bitmap.pixel(2, 2), Some(5));
    }

    #[test]
    fn zero_size_is_clamped() {
        let mut store = BitmapStore::new();
        let mut tex = sourced(&mut store, true);
        let s = tex.get_scaled(&store, 0, 0).unwrap();
        assert_eq!((s.width(), s.height()), (1, 1));
    }

    #[test]
    fn evicts_lowest_sequence_unreferenced_slot() {
        let mut store = BitmapStore::new();
        let mut tex = sourced(&mut store, true);
        for w in 1..=MAX_TEXTURE_SCALES as u32 {
            tex.get_scaled(&store, 10 + w, 10).unwrap();
        }
        tex.begin_frame();
        let held = tex.get_scaled(&store, 11, 10).unwrap();
        tex.get_scaled(&store, 99, 99).unwrap();
        assert_eq!(tex.cached_count(), MAX_TEXTURE_SCALES);
        // The oldest copy (11x10) was referenced again, so 12x10 went instead.
        assert!(tex.find_slot(11, 10).is_some());
        assert!(tex.find_slot(12, 10).is_none());
        assert_eq!(held.bitmap.width(), 11);
    }

    #[test]
    fn evicted_copy_outlives_its_slot() {
        let mut store = BitmapStore::new();
        let mut tex = sourced(&mut store, true);
        let old = tex.get_scaled(&store, 8, 8).unwrap();
        tex.invalidate();
        assert_eq!(old.bitmap.width(), 8);
    }

    #[test]
    #[should_panic(expected = "texture cache exhausted")]
    fn exhaustion_panics() {
        let mut store = BitmapStore::new();
        let mut tex = sourced(&mut store, true);
        for w in 0..=MAX_TEXTURE_SCALES as u32 {
            let _ = tex.get_scaled(&store, 10 + w, 10);
        }
    }

    #[test]
    fn oversized_sub_rect_is_clamped_to_bitmap() {
        let mut store = BitmapStore::new();
        let mut tex = sourced(&mut store, true);
        let id = tex.source().unwrap();
        tex.set_source(id, PixelRect::new(2, 0, 8, 8), PixelFormat::Rgb32, None);
        let s = tex.get_scaled(&store, 16, 16).unwrap();
        assert_eq!((s.width(), s.height()), (16, 16));
        // Only columns 2 and 3 of the 4x2 source remain.
        assert_eq!(s.bitmap.pixel(0, 0), Some(2));
        assert_eq!(s.bitmap.pixel(15, 15), Some(7));

        let direct = tex.get_scaled(&store, 2, 2).unwrap();
        assert_eq!(direct.sub, PixelRect::new(2, 0, 2, 2));
    }

    #[test]
    fn stale_source_yields_nothing() {
        let mut store = BitmapStore::new();
        let mut tex = sourced(&mut store, true);
        store.remove(tex.source().unwrap());
        assert!(tex.get_scaled(&store, 8, 8).is_none());
    }

    #[test]
    fn generated_texture_always_scales() {
        struct Solid;
        impl Scaler for Solid {
            fn scale(&self, dest: &mut Bitmap, source: Option<SourceRef<'_>>) {
                assert!(source.is_none());
                dest.fill(0xff12_3456);
            }
        }
        let store = BitmapStore::new();
        let mut tex = Texture::new(Some(Box::new(Solid)));
        let s = tex.get_scaled(&store, 3, 5).unwrap();
        assert_eq!((s.width(), s.height()), (3, 5));
        assert_eq!(s.format, PixelFormat::Argb32);
        assert_eq!(s.bitmap.pixel(2, 4), Some(0xff12_3456));
    }
}
