// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Source bitmaps and the registry that owns them.
//!
//! Producers draw into [`Bitmap`]s they register with a [`BitmapStore`];
//! textures refer to them by [`BitmapId`] and never keep them alive. Bitmaps
//! are held behind an [`Arc`] so that a scaled copy, or a source handed out
//! directly to a primitive list, stays valid while the consumer reads it even
//! if the producer has since redrawn.

use std::sync::Arc;

use crate::arena::{Arena, Key};
use crate::color::{alpha, blend_over};
use crate::geometry::PixelRect;

/// Storage format of a bitmap's pixels.
///
/// Every format stores one `u32` per pixel; indexed and packed YUV formats use
/// only the low 16 bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// `0xAARRGGBB` with meaningful alpha.
    #[default]
    Argb32,
    /// `0x00RRGGBB`; alpha is ignored.
    Rgb32,
    /// 16-bit palette indices, opaque palette.
    Palette16,
    /// 16-bit palette indices, palette entries carry alpha.
    PaletteA16,
    /// Packed Y/Cb or Y/Cr pairs.
    Yuy16,
}

impl PixelFormat {
    /// Whether pixels of this format may be translucent.
    #[inline]
    #[must_use]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Argb32 | Self::PaletteA16)
    }

    /// Whether pixels are palette indices.
    #[inline]
    #[must_use]
    pub const fn is_indexed(self) -> bool {
        matches!(self, Self::Palette16 | Self::PaletteA16)
    }
}

/// A rectangular block of pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u32>,
}

impl core::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl Bitmap {
    /// Creates a zero-filled bitmap.
    #[must_use]
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    /// Wraps existing pixel data.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len()` is not `width * height`.
    #[must_use]
    pub fn from_pixels(width: u32, height: u32, format: PixelFormat, pixels: Vec<u32>) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize,
            "pixel buffer does not match {width}x{height}"
        );
        Self {
            width,
            height,
            format,
            pixels,
        }
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Pixels per row.
    #[inline]
    #[must_use]
    pub const fn stride(&self) -> u32 {
        self.width
    }

    /// Pixel format.
    #[inline]
    #[must_use]
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// The full extent of the bitmap.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> PixelRect {
        PixelRect::sized(self.width, self.height)
    }

    /// All pixels, row-major.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// All pixels, row-major, mutably.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// One row of pixels.
    #[must_use]
    pub fn row(&self, y: u32) -> &[u32] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    /// The pixel at `(x, y)`, or `None` outside the bitmap.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        (x < self.width && y < self.height)
            .then(|| self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Sets the pixel at `(x, y)`; writes outside the bitmap are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, px: u32) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = px;
        }
    }

    /// Composites `px` over the pixel at `(x, y)`.
    pub fn blend_pixel(&mut self, x: u32, y: u32, px: u32) {
        if x < self.width && y < self.height {
            let dst = &mut self.pixels[y as usize * self.width as usize + x as usize];
            *dst = blend_over(*dst, px);
        }
    }

    /// Fills the whole bitmap with one value.
    pub fn fill(&mut self, px: u32) {
        self.pixels.fill(px);
    }

    /// Fills `rect`, clipped to the bitmap, with one value.
    pub fn fill_rect(&mut self, rect: PixelRect, px: u32) {
        let x1 = rect.right().min(self.width);
        let y1 = rect.bottom().min(self.height);
        for y in rect.y..y1 {
            let start = y as usize * self.width as usize;
            self.pixels[start + rect.x as usize..start + x1 as usize].fill(px);
        }
    }

    /// Composites `px` over every pixel of `rect`, clipped to the bitmap.
    pub fn blend_rect(&mut self, rect: PixelRect, px: u32) {
        if alpha(px) == 0xff {
            self.fill_rect(rect, px);
            return;
        }
        let x1 = rect.right().min(self.width);
        let y1 = rect.bottom().min(self.height);
        for y in rect.y..y1 {
            for x in rect.x..x1 {
                self.blend_pixel(x, y, px);
            }
        }
    }
}

/// Handle to a bitmap registered with a [`BitmapStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitmapId(Key<Arc<Bitmap>>);

/// Registry of producer bitmaps.
#[derive(Debug, Default)]
pub struct BitmapStore {
    bitmaps: Arena<Arc<Bitmap>>,
}

impl BitmapStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bitmap.
    pub fn insert(&mut self, bitmap: Bitmap) -> BitmapId {
        BitmapId(self.bitmaps.insert(Arc::new(bitmap)))
    }

    /// Shared handle to a bitmap's current contents.
    #[must_use]
    pub fn get(&self, id: BitmapId) -> Option<&Arc<Bitmap>> {
        self.bitmaps.get(id.0)
    }

    /// Mutable access for redrawing.
    ///
    /// If a primitive list still holds the current contents, they are copied
    /// first so the list keeps seeing the frame it was built from.
    pub fn get_mut(&mut self, id: BitmapId) -> Option<&mut Bitmap> {
        self.bitmaps.get_mut(id.0).map(Arc::make_mut)
    }

    /// Unregisters a bitmap, returning its last contents.
    pub fn remove(&mut self, id: BitmapId) -> Option<Arc<Bitmap>> {
        self.bitmaps.remove(id.0)
    }

    /// Whether `id` refers to a registered bitmap.
    #[must_use]
    pub fn contains(&self, id: BitmapId) -> bool {
        self.bitmaps.contains(id.0)
    }

    /// Number of registered bitmaps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bitmaps.len()
    }

    /// Returns `true` if no bitmaps are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bitmaps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_clips_to_bitmap() {
        let mut bm = Bitmap::new(4, 4, PixelFormat::Argb32);
        bm.fill_rect(PixelRect::new(2, 2, 10, 10), 0xffff_ffff);
        assert_eq!(bm.pixel(1, 1), Some(0));
        assert_eq!(bm.pixel(3, 3), Some(0xffff_ffff));
        assert_eq!(bm.pixel(4, 0), None);
    }

    #[test]
    fn get_mut_detaches_shared_contents() {
        let mut store = BitmapStore::new();
        let id = store.insert(Bitmap::new(2, 2, PixelFormat::Rgb32));
        let held = Arc::clone(store.get(id).unwrap());
        store.get_mut(id).unwrap().fill(0x00ff_0000);
        assert_eq!(held.pixel(0, 0), Some(0));
        assert_eq!(store.get(id).unwrap().pixel(0, 0), Some(0x00ff_0000));
    }

    #[test]
    fn removed_ids_go_stale() {
        let mut store = BitmapStore::new();
        let id = store.insert(Bitmap::new(1, 1, PixelFormat::Argb32));
        assert!(store.remove(id).is_some());
        assert!(!store.contains(id));
        assert!(store.get(id).is_none());
    }

    #[test]
    fn alpha_formats() {
        assert!(PixelFormat::Argb32.has_alpha());
        assert!(PixelFormat::PaletteA16.has_alpha());
        assert!(!PixelFormat::Rgb32.has_alpha());
        assert!(!PixelFormat::Palette16.has_alpha());
        assert!(!PixelFormat::Yuy16.has_alpha());
    }
}
