// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry of font faces available to the engine.

use crate::face::{Face, FaceId};
use crate::runtime::Platform;
use core::fmt;
use hashbrown::HashMap;
use peniko::Blob;
use smallvec::SmallVec;
use std::sync::RwLock;

struct FaceRecord {
    data: Blob<u8>,
    index: u32,
    family: Box<str>,
}

#[derive(Default)]
struct ManagerData {
    faces: HashMap<FaceId, FaceRecord>,
    /// Deduplication by data identity: one face per (blob, index).
    by_source: HashMap<(u64, u32), FaceId>,
    /// Case-insensitive family name to the faces registered under it.
    families: HashMap<Box<str>, SmallVec<[FaceId; 2]>>,
}

impl ManagerData {
    fn register(&mut self, data: Blob<u8>, index: u32, family: &str) -> FaceId {
        if let Some(id) = self.by_source.get(&(data.id(), index)) {
            return *id;
        }
        let id = FaceId::next();
        self.by_source.insert((data.id(), index), id);
        self.families
            .entry(family.to_lowercase().into())
            .or_default()
            .push(id);
        self.faces.insert(
            id,
            FaceRecord {
                data,
                index,
                family: family.into(),
            },
        );
        id
    }

    fn first_of_family(&self, family: &str) -> Option<FaceId> {
        self.families
            .get(family.to_lowercase().as_str())
            .and_then(|ids| ids.first().copied())
    }
}

/// Registry of font faces owned by the engine.
///
/// Registration deduplicates by data identity and groups faces by family
/// name (compared case-insensitively). The manager hands out [`Face`]
/// values whose identity is the registered [`FaceId`], so every consumer
/// of a face shares one glyph cache for it.
pub struct FontManager {
    data: RwLock<ManagerData>,
}

impl FontManager {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(ManagerData::default()),
        }
    }

    /// Registers a face, returning its identifier.
    ///
    /// Registering the same blob and index again returns the original
    /// identifier regardless of the family name given.
    pub fn register(&self, data: Blob<u8>, index: u32, family: &str) -> FaceId {
        self.data.write().unwrap().register(data, index, family)
    }

    /// Returns the face registered under `id`.
    pub fn face(&self, id: FaceId) -> Option<Face> {
        self.data
            .read()
            .unwrap()
            .faces
            .get(&id)
            .map(|record| Face::registered(id, record.data.clone(), record.index))
    }

    /// Returns the family name a face was registered under.
    pub fn family_name(&self, id: FaceId) -> Option<String> {
        self.data
            .read()
            .unwrap()
            .faces
            .get(&id)
            .map(|record| record.family.to_string())
    }

    /// Returns the faces registered under `family`, in registration order.
    pub fn family(&self, family: &str) -> impl Iterator<Item = FaceId> {
        let ids: SmallVec<[FaceId; 2]> = self
            .data
            .read()
            .unwrap()
            .families
            .get(family.to_lowercase().as_str())
            .cloned()
            .unwrap_or_default();
        ids.into_iter()
    }

    /// Returns a face for `family`, asking the platform to load one if
    /// none is registered.
    ///
    /// The platform load runs with no registry lock held; if two threads
    /// race the load, the first registration wins and the duplicate data is
    /// dropped.
    pub fn find_or_load(&self, family: &str, platform: &dyn Platform) -> Option<FaceId> {
        if let Some(id) = self.data.read().unwrap().first_of_family(family) {
            return Some(id);
        }
        let data = platform.load_face(family)?;
        let mut guard = self.data.write().unwrap();
        if let Some(id) = guard.first_of_family(family) {
            return Some(id);
        }
        Some(guard.register(data, 0, family))
    }

    /// Number of registered faces.
    pub fn len(&self) -> usize {
        self.data.read().unwrap().faces.len()
    }

    /// Returns `true` if no faces are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FontManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontManager")
            .field("faces", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::NullPlatform;
    use std::sync::Arc;

    fn blob(bytes: u8) -> Blob<u8> {
        Blob::new(Arc::new(vec![bytes; 8]))
    }

    #[test]
    fn register_deduplicates_by_data_identity() {
        let fonts = FontManager::new();
        let data = blob(1);
        let a = fonts.register(data.clone(), 0, "Body");
        let b = fonts.register(data.clone(), 0, "Other");
        let c = fonts.register(data, 1, "Body");
        assert_eq!(a, b, "same blob and index is one face");
        assert_ne!(a, c, "collection index distinguishes faces");
        assert_eq!(fonts.len(), 2);
    }

    #[test]
    fn family_lookup_is_case_insensitive() {
        let fonts = FontManager::new();
        let id = fonts.register(blob(1), 0, "Body Text");
        assert_eq!(fonts.family("body text").next(), Some(id));
        assert_eq!(fonts.family("BODY TEXT").next(), Some(id));
        assert_eq!(fonts.family_name(id).as_deref(), Some("Body Text"));
        assert!(fonts.family("other").next().is_none());
    }

    #[test]
    fn find_or_load_misses_without_platform_face() {
        let fonts = FontManager::new();
        assert!(fonts.find_or_load("Body", &NullPlatform).is_none());
        let id = fonts.register(blob(1), 0, "Body");
        assert_eq!(fonts.find_or_load("Body", &NullPlatform), Some(id));
    }
}
