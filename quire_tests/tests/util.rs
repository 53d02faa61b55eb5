// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared parser and rasterizer doubles.

use core::sync::atomic::{AtomicUsize, Ordering};
use peniko::Blob;
use quire::{
    BitmapFormat, Face, GlyphBitmap, GlyphKey, GlyphRasterizer, Object, ObjectParser, ParseError,
};
use std::sync::Arc;
use std::time::Duration;

pub(crate) fn data_blob(fill: u8) -> Blob<u8> {
    Blob::new(Arc::new(vec![fill; 32]))
}

pub(crate) fn test_face(fill: u8) -> Face {
    Face::external(data_blob(fill), 0)
}

pub(crate) fn identity_key(glyph_id: u32, size: f32) -> GlyphKey {
    GlyphKey::new(glyph_id, size, [1.0, 0.0, 0.0, 1.0])
}

/// Parser yielding `Integer(num)`, counting invocations, optionally
/// dawdling to widen race windows.
pub(crate) struct CountingParser {
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingParser {
    pub(crate) fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Some(delay),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ObjectParser for CountingParser {
    fn parse(&self, num: u32) -> Result<(Object, u16), ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        Ok((Object::Integer(i64::from(num)), 0))
    }
}

/// Parser that always fails, optionally slowly.
pub(crate) struct FailingParser {
    pub(crate) delay: Option<Duration>,
}

impl ObjectParser for FailingParser {
    fn parse(&self, num: u32) -> Result<(Object, u16), ParseError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        Err(ParseError::NotFound { num })
    }
}

/// Rasterizer producing a one-pixel bitmap and counting invocations.
pub(crate) struct CountingRasterizer {
    calls: AtomicUsize,
}

impl CountingRasterizer {
    pub(crate) fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GlyphRasterizer for CountingRasterizer {
    fn rasterize(&self, _face: &Face, key: &GlyphKey) -> Option<GlyphBitmap> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(GlyphBitmap {
            width: 1,
            height: 1,
            left: 0,
            top: 0,
            advance: key.size(),
            format: BitmapFormat::Alpha8,
            data: Blob::new(Arc::new(vec![0xFF_u8])),
        })
    }
}

/// Rasterizer that must never be reached.
pub(crate) struct PanickingRasterizer;

impl GlyphRasterizer for PanickingRasterizer {
    fn rasterize(&self, _face: &Face, key: &GlyphKey) -> Option<GlyphBitmap> {
        panic!("rasterizer invoked for glyph {} in read-only mode", key.glyph_id());
    }
}
