// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font face identity.

use core::sync::atomic::{AtomicU64, Ordering};
use peniko::Blob;

/// Unique identifier for a face registered with the font manager.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct FaceId(u64);

impl FaceId {
    /// Creates a new unique identifier.
    pub(crate) fn next() -> Self {
        static ID_COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying integer value.
    pub fn to_u64(self) -> u64 {
        self.0
    }
}

/// Cache identity of a font face.
///
/// Faces owned by the engine's font manager and faces whose data the caller
/// supplies directly are kept in separate cache maps, so their identities
/// are distinct key kinds. Each key maps to at most one glyph cache.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum FaceKey {
    /// Face registered with the font manager.
    Registered(FaceId),
    /// Caller-supplied face data.
    External {
        /// Identity of the backing data blob.
        blob: u64,
        /// Index of the face within a collection file.
        index: u32,
    },
}

/// A font face: cache identity plus the data a rasterizer needs.
///
/// Cloning is cheap; the face data blob is shared.
#[derive(Clone, Debug)]
pub struct Face {
    key: FaceKey,
    data: Blob<u8>,
    index: u32,
}

impl Face {
    /// Creates a face owned by the font manager.
    pub(crate) fn registered(id: FaceId, data: Blob<u8>, index: u32) -> Self {
        Self {
            key: FaceKey::Registered(id),
            data,
            index,
        }
    }

    /// Creates a face from caller-supplied data.
    ///
    /// Identity follows the blob: two faces built from the same blob and
    /// index share a glyph cache, two copies of the same bytes do not.
    pub fn external(data: Blob<u8>, index: u32) -> Self {
        Self {
            key: FaceKey::External {
                blob: data.id(),
                index,
            },
            data,
            index,
        }
    }

    /// Returns the cache identity of this face.
    pub fn key(&self) -> FaceKey {
        self.key
    }

    /// Returns the face data.
    pub fn data(&self) -> &Blob<u8> {
        &self.data
    }

    /// Returns the index of the face within a collection file.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns `true` if the face data was supplied by the caller.
    pub fn is_external(&self) -> bool {
        matches!(self.key, FaceKey::External { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn external_identity_follows_blob() {
        let blob = Blob::new(Arc::new(vec![0_u8; 4]));
        let a = Face::external(blob.clone(), 0);
        let b = Face::external(blob.clone(), 0);
        let c = Face::external(blob, 1);
        let d = Face::external(Blob::new(Arc::new(vec![0_u8; 4])), 0);
        assert_eq!(a.key(), b.key(), "same blob and index, same identity");
        assert_ne!(a.key(), c.key(), "index distinguishes collection faces");
        assert_ne!(a.key(), d.key(), "copies of the bytes are distinct");
    }
}
