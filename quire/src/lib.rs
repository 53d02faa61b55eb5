// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concurrent resource caches for parallel document rendering.
//!
//! Quire is the shared-state core of a document rendering engine that
//! renders the pages of one document on several worker threads at once. The
//! expensive resources those workers share are held in caches designed so
//! that steady-state rendering takes no exclusive locks:
//!
//! - [`Resource`] — a shared-ownership handle for cache-resident values,
//!   released on whichever thread drops it last.
//! - [`ObjectStore`] — a per-document table mapping object numbers to
//!   lazily parsed [`Object`]s, with a shared-lock fast path and a
//!   placeholder protocol that guarantees each number is parsed at most
//!   once.
//! - [`FontCache`] and [`GlyphCache`] — nested caches for rasterized
//!   glyphs, with a pre-warm-then-freeze mode that makes every lookup in
//!   the parallel phase lock-free.
//! - [`Runtime`] — an explicitly owned module set (platform hooks, font
//!   manager, font cache) constructed once and shared by reference.
//!
//! Parsing and rasterization are not implemented here; they are supplied by
//! the embedding engine through the [`ObjectParser`] and
//! [`GlyphRasterizer`] traits.

mod error;
mod face;
mod font_cache;
mod fonts;
mod glyphs;
mod handle;
mod object;
mod runtime;
mod store;

pub use peniko::Blob;

pub use error::ParseError;
pub use face::{Face, FaceId, FaceKey};
pub use font_cache::{FontCache, FontCacheOptions};
pub use fonts::FontManager;
pub use glyphs::{BitmapFormat, GlyphBitmap, GlyphCache, GlyphKey, GlyphRasterizer};
pub use handle::{Resource, ResourceId, WeakResource};
pub use object::{Dict, INVALID_OBJECT_NUMBER, ObjRef, Object, Stream, is_valid_object_number};
pub use runtime::{FaceSource, Modules, NullPlatform, Platform, Runtime, RuntimeConfig};
pub use store::{ObjectParser, ObjectStore, StoreOptions};
