// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Top-level cache mapping font faces to their glyph caches.

use crate::face::{Face, FaceKey};
use crate::glyphs::GlyphCache;
use crate::handle::Resource;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use hashbrown::HashMap;
use std::sync::{OnceLock, RwLock};

/// Options for a font cache.
#[derive(Copy, Clone, Default, Debug)]
pub struct FontCacheOptions {
    /// Initial capacity hint for each face map, in faces.
    ///
    /// The default value is zero.
    pub face_capacity: usize,
}

/// One of the two face-to-glyph-cache maps, with its frozen snapshot.
struct FaceMap {
    live: RwLock<HashMap<FaceKey, Resource<GlyphCache>>>,
    frozen: OnceLock<HashMap<FaceKey, Resource<GlyphCache>>>,
}

impl FaceMap {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            live: RwLock::new(HashMap::with_capacity(capacity)),
            frozen: OnceLock::new(),
        }
    }

    fn frozen_get(&self, key: &FaceKey) -> Option<Resource<GlyphCache>> {
        self.frozen.get().and_then(|map| map.get(key).cloned())
    }

    fn get_or_create(&self, face: &Face) -> Resource<GlyphCache> {
        let key = face.key();
        if let Some(hit) = self.live.read().unwrap().get(&key) {
            return hit.clone();
        }
        let mut live = self.live.write().unwrap();
        if let Some(hit) = live.get(&key) {
            return hit.clone();
        }
        let cache = Resource::new(GlyphCache::new(face.clone()));
        live.insert(key, cache.clone());
        cache
    }

    /// Freezes the map and every glyph cache in it. Returns the face count.
    fn freeze(&self) -> usize {
        let live = self.live.read().unwrap();
        for cache in live.values() {
            cache.freeze();
        }
        let _ = self.frozen.set(live.clone());
        live.len()
    }

    fn len(&self) -> usize {
        match self.frozen.get() {
            Some(map) => map.len(),
            None => self.live.read().unwrap().len(),
        }
    }
}

/// Shared cache of glyph caches, keyed by face identity.
///
/// Registered and external faces are kept in separate maps. Outside
/// read-only mode, lookups use the shared-lock fast path with an
/// exclusive-lock double check on miss. In read-only mode every lookup is a
/// lock-free read of a frozen snapshot and unknown faces are absent; the
/// page-job driver is responsible for touching every face the document
/// needs before flipping the switch.
pub struct FontCache {
    read_only: AtomicBool,
    registered: FaceMap,
    external: FaceMap,
}

impl FontCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::with_options(FontCacheOptions::default())
    }

    /// Creates an empty cache with the given options.
    pub fn with_options(options: FontCacheOptions) -> Self {
        Self {
            read_only: AtomicBool::new(false),
            registered: FaceMap::with_capacity(options.face_capacity),
            external: FaceMap::with_capacity(options.face_capacity),
        }
    }

    fn map_for(&self, key: &FaceKey) -> &FaceMap {
        match key {
            FaceKey::Registered(_) => &self.registered,
            FaceKey::External { .. } => &self.external,
        }
    }

    /// Returns the shared glyph cache for `face`, creating it on first use.
    ///
    /// In read-only mode nothing is created: faces touched during the
    /// pre-warm pass are served from the frozen snapshot and anything else
    /// returns `None`.
    pub fn glyph_cache(&self, face: &Face) -> Option<Resource<GlyphCache>> {
        let key = face.key();
        let map = self.map_for(&key);
        if self.read_only.load(Ordering::Acquire) {
            return map.frozen_get(&key);
        }
        Some(map.get_or_create(face))
    }

    /// Switches the cache (and every glyph cache it holds) into read-only
    /// mode.
    ///
    /// Enabling is idempotent and one-way: the snapshots taken here serve
    /// all subsequent lookups, so the switch must complete before worker
    /// threads start. Passing `false` before any freeze is a no-op; passing
    /// `false` after a freeze is rejected, since the snapshots cannot be
    /// re-published. A new document session gets a fresh cache instead.
    pub fn enable_read_only(&self, enabled: bool) {
        if !enabled {
            if self.read_only.load(Ordering::Acquire) {
                log::warn!("read-only mode cannot be disabled once enabled");
            }
            return;
        }
        if self.read_only.load(Ordering::Acquire) {
            return;
        }
        let registered = self.registered.freeze();
        let external = self.external.freeze();
        log::debug!(
            "font cache frozen ({registered} registered faces, {external} external faces)"
        );
        self.read_only.store(true, Ordering::Release);
    }

    /// Returns `true` once read-only mode has been enabled.
    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::Acquire)
    }

    /// Number of faces with a glyph cache, across both maps.
    pub fn face_count(&self) -> usize {
        self.registered.len() + self.external.len()
    }
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FontCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCache")
            .field("registered", &self.registered.len())
            .field("external", &self.external.len())
            .field("read_only", &self.is_read_only())
            .finish_non_exhaustive()
    }
}
