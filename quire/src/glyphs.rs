// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-face cache of rasterized glyphs.

use crate::face::Face;
use crate::handle::Resource;
use core::fmt;
use hashbrown::HashMap;
use peniko::Blob;
use std::sync::{OnceLock, RwLock};

/// Key identifying one rasterization of a glyph.
///
/// The floating-point inputs are quantized so that lookups hash and compare
/// exactly: the size keeps its bit pattern and the transform is snapped to
/// 16.16 fixed point.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct GlyphKey {
    glyph_id: u32,
    size_bits: u32,
    transform_bits: [i32; 4],
}

impl GlyphKey {
    /// Creates a key for `glyph_id` at `size` pixels per em under
    /// `transform` (a row-major 2x2 matrix).
    #[allow(
        clippy::cast_possible_truncation,
        reason = "transform coefficients are clamped into 16.16 range before the cast"
    )]
    pub fn new(glyph_id: u32, size: f32, transform: [f32; 4]) -> Self {
        fn quantize(value: f32) -> i32 {
            const LIMIT: f32 = i32::MAX as f32;
            (value * 65536.0).round().clamp(-LIMIT, LIMIT) as i32
        }
        Self {
            glyph_id,
            size_bits: size.to_bits(),
            transform_bits: transform.map(quantize),
        }
    }

    /// Returns the glyph identifier.
    pub fn glyph_id(&self) -> u32 {
        self.glyph_id
    }

    /// Returns the size in pixels per em.
    pub fn size(&self) -> f32 {
        f32::from_bits(self.size_bits)
    }
}

/// Pixel format of a rasterized glyph.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BitmapFormat {
    /// 8-bit coverage mask, tinted with the fill color at composite time.
    Alpha8,
    /// 32-bit RGBA, used for color glyphs.
    Rgba8,
}

impl BitmapFormat {
    /// Bytes per pixel for this format.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Alpha8 => 1,
            Self::Rgba8 => 4,
        }
    }
}

/// A rasterized glyph.
///
/// The pixel data is shared; cloning a bitmap does not copy pixels.
#[derive(Clone, Debug)]
pub struct GlyphBitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Horizontal offset from the pen position to the left edge.
    pub left: i32,
    /// Vertical offset from the baseline to the top edge.
    pub top: i32,
    /// Horizontal advance in pixels.
    pub advance: f32,
    /// Pixel format of `data`.
    pub format: BitmapFormat,
    /// The pixels, `width * height * bytes_per_pixel` bytes.
    pub data: Blob<u8>,
}

/// Produces bitmaps for the glyph cache's slow path.
///
/// Implemented by the rasterization pipeline. `rasterize` is invoked
/// without any cache lock held and may run concurrently on several threads,
/// possibly for the same glyph; when that happens the first bitmap
/// installed wins and the duplicates are discarded.
pub trait GlyphRasterizer {
    /// Rasterizes one glyph of `face`.
    ///
    /// Returns `None` if the glyph cannot be rendered.
    fn rasterize(&self, face: &Face, key: &GlyphKey) -> Option<GlyphBitmap>;
}

/// Cache of rasterized glyphs for a single face.
///
/// While live, lookups take the shared side of a reader/writer lock and
/// misses rasterize with no lock held. Once frozen, the cache serves an
/// immutable snapshot: lookups are lock-free and allocation-free, and
/// misses are final (no insertions). Freezing is one-way for the lifetime
/// of the cache.
pub struct GlyphCache {
    face: Face,
    live: RwLock<HashMap<GlyphKey, Resource<GlyphBitmap>>>,
    frozen: OnceLock<HashMap<GlyphKey, Resource<GlyphBitmap>>>,
}

impl GlyphCache {
    /// Creates an empty cache for `face`.
    pub fn new(face: Face) -> Self {
        Self {
            face,
            live: RwLock::new(HashMap::new()),
            frozen: OnceLock::new(),
        }
    }

    /// Returns the face this cache rasterizes from.
    pub fn face(&self) -> &Face {
        &self.face
    }

    /// Returns the cached bitmap for `key`, without side effects.
    pub fn get(&self, key: &GlyphKey) -> Option<Resource<GlyphBitmap>> {
        if let Some(snapshot) = self.frozen.get() {
            return snapshot.get(key).cloned();
        }
        self.live.read().unwrap().get(key).cloned()
    }

    /// Returns the bitmap for `key`, rasterizing and caching it on a miss.
    ///
    /// In the frozen state the rasterizer is never invoked; an uncached
    /// glyph is simply absent. While live, the shared lock covers the fast
    /// path, rasterization runs unlocked, and the exclusive lock is taken
    /// only to install the result after a re-check.
    pub fn get_or_insert(
        &self,
        key: GlyphKey,
        rasterizer: &dyn GlyphRasterizer,
    ) -> Option<Resource<GlyphBitmap>> {
        if let Some(snapshot) = self.frozen.get() {
            return snapshot.get(&key).cloned();
        }
        if let Some(hit) = self.live.read().unwrap().get(&key) {
            return Some(hit.clone());
        }

        // Rasterize with no lock held.
        let bitmap = rasterizer.rasterize(&self.face, &key)?;

        let mut live = self.live.write().unwrap();
        if let Some(existing) = live.get(&key) {
            // Lost the insert race; first bitmap wins.
            return Some(existing.clone());
        }
        if let Some(snapshot) = self.frozen.get() {
            // Froze while rasterizing; the snapshot is authoritative.
            return snapshot.get(&key).cloned();
        }
        let resource = Resource::new(bitmap);
        live.insert(key, resource.clone());
        Some(resource)
    }

    /// Snapshots the current contents and switches lookups to them.
    ///
    /// Idempotent. Must not race cache population; the coordinator enables
    /// read-only mode strictly before spawning workers.
    pub fn freeze(&self) {
        let live = self.live.read().unwrap();
        if self.frozen.set(live.clone()).is_ok() {
            log::trace!(
                "glyph cache for {:?} frozen with {} glyphs",
                self.face.key(),
                live.len()
            );
        }
    }

    /// Returns `true` once the cache has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen.get().is_some()
    }

    /// Number of cached glyphs.
    pub fn len(&self) -> usize {
        match self.frozen.get() {
            Some(snapshot) => snapshot.len(),
            None => self.live.read().unwrap().len(),
        }
    }

    /// Returns `true` if no glyphs are cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for GlyphCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphCache")
            .field("face", &self.face.key())
            .field("len", &self.len())
            .field("frozen", &self.is_frozen())
            .finish_non_exhaustive()
    }
}
