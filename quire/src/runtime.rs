// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explicitly owned module set shared by all document operations.

use crate::face::Face;
use crate::font_cache::{FontCache, FontCacheOptions};
use crate::fonts::FontManager;
use core::fmt;
use peniko::Blob;
use std::sync::{Arc, OnceLock};

/// Hooks into the host platform.
///
/// `initialize` and `shutdown` bracket the lifetime of the module set;
/// each runs at most once per [`Runtime::create`]/[`Runtime::destroy`]
/// cycle.
pub trait Platform: Send + Sync {
    /// Called once when the module set is constructed.
    fn initialize(&self) {}

    /// Called once when the module set is torn down.
    fn shutdown(&self) {}

    /// Loads the data for a system face of the given family.
    fn load_face(&self, family: &str) -> Option<Blob<u8>> {
        let _ = family;
        None
    }
}

/// Platform with no system services; the default.
#[derive(Copy, Clone, Default, Debug)]
pub struct NullPlatform;

impl Platform for NullPlatform {}

/// Face data to register when the module set is constructed.
#[derive(Clone, Debug)]
pub struct FaceSource {
    /// The face data.
    pub data: Blob<u8>,
    /// Index of the face within a collection file.
    pub index: u32,
    /// Family name to register the face under.
    pub family: String,
}

/// Options for constructing the module set.
#[derive(Default)]
pub struct RuntimeConfig {
    /// Platform hooks; [`NullPlatform`] if absent.
    pub platform: Option<Box<dyn Platform>>,
    /// Options for the font cache.
    pub font_cache: FontCacheOptions,
    /// Faces to register up front.
    pub faces: Vec<FaceSource>,
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("platform", &self.platform.is_some())
            .field("font_cache", &self.font_cache)
            .field("faces", &self.faces.len())
            .finish()
    }
}

/// The services shared by every operation on a loaded document.
pub struct Modules {
    platform: Box<dyn Platform>,
    fonts: FontManager,
    font_cache: FontCache,
}

impl Modules {
    fn build(config: RuntimeConfig) -> Self {
        let platform = config
            .platform
            .unwrap_or_else(|| Box::new(NullPlatform));
        platform.initialize();
        let fonts = FontManager::new();
        for face in config.faces {
            fonts.register(face.data, face.index, &face.family);
        }
        let font_cache = FontCache::with_options(config.font_cache);
        log::debug!("modules initialized ({} preregistered faces)", fonts.len());
        Self {
            platform,
            fonts,
            font_cache,
        }
    }

    /// Returns the platform hooks.
    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    /// Returns the font manager.
    pub fn fonts(&self) -> &FontManager {
        &self.fonts
    }

    /// Returns the font cache.
    pub fn font_cache(&self) -> &FontCache {
        &self.font_cache
    }

    /// Returns a face for `family`, consulting the font manager and then
    /// the platform.
    pub fn find_face(&self, family: &str) -> Option<Face> {
        let id = self.fonts.find_or_load(family, self.platform.as_ref())?;
        self.fonts.face(id)
    }
}

impl fmt::Debug for Modules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modules")
            .field("fonts", &self.fonts)
            .field("font_cache", &self.font_cache)
            .finish_non_exhaustive()
    }
}

/// Owner of the process's module set.
///
/// Exactly one `Runtime` is created by the embedding process and passed by
/// reference into every entry point; there is no ambient global. The module
/// set inside is constructed at most once: the first [`create`] builds and
/// publishes it, concurrent callers block until construction completes and
/// then observe the fully initialized set, and later calls return it
/// unchanged. [`get`] is a lock-free read of the published pointer.
///
/// [`create`]: Self::create
/// [`get`]: Self::get
pub struct Runtime {
    modules: OnceLock<Arc<Modules>>,
}

impl Runtime {
    /// Creates a runtime with no module set constructed.
    pub const fn new() -> Self {
        Self {
            modules: OnceLock::new(),
        }
    }

    /// Constructs the module set, or returns the existing one.
    ///
    /// Idempotent: only the first call's configuration is used; a later
    /// call's configuration is dropped.
    pub fn create(&self, config: RuntimeConfig) -> &Arc<Modules> {
        let mut config = Some(config);
        let modules = self.modules.get_or_init(|| {
            Arc::new(Modules::build(
                config.take().expect("initializer runs once"),
            ))
        });
        if config.is_some() {
            log::debug!("runtime already created; configuration ignored");
        }
        modules
    }

    /// Returns the module set.
    ///
    /// # Panics
    ///
    /// Panics if called before [`Self::create`]; that is a broken caller
    /// contract, not a recoverable condition.
    pub fn get(&self) -> &Arc<Modules> {
        self.modules
            .get()
            .expect("runtime used before Runtime::create")
    }

    /// Returns the module set if one has been constructed.
    pub fn try_get(&self) -> Option<&Arc<Modules>> {
        self.modules.get()
    }

    /// Tears the module set down.
    ///
    /// Idempotent. Requires exclusive access, so all worker threads must
    /// have been joined first; a following [`Self::create`] builds a fresh
    /// module set. Outstanding `Arc<Modules>` clones keep the memory alive
    /// but the platform is shut down here.
    pub fn destroy(&mut self) {
        if let Some(modules) = self.modules.take() {
            modules.platform.shutdown();
            log::debug!("modules destroyed");
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("created", &self.modules.get().is_some())
            .finish()
    }
}
