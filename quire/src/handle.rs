// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared-ownership handles for cache-resident values.

use core::fmt;
use core::ops::Deref;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Unique identifier for a cache-resident allocation.
///
/// Every call to [`Resource::new`] produces a fresh identifier; clones of
/// the same handle share it. Caches use the identifier as a cheap identity
/// key where the C heritage of the engine would have compared pointers.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct ResourceId(u64);

impl ResourceId {
    fn next() -> Self {
        static ID_COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying integer value.
    pub fn to_u64(self) -> u64 {
        self.0
    }
}

struct Inner<T> {
    id: ResourceId,
    value: T,
}

/// Shared-ownership handle to an immutable cache-resident value.
///
/// Cloning increments the reference count and dropping decrements it; the
/// value is destroyed exactly when the last handle is released, on
/// whichever thread performs that release. Values stored in the caches must
/// therefore be safe to drop on an arbitrary thread.
///
/// The count lives with the value and is updated with atomic operations, so
/// handles may be cloned and dropped freely from any thread without an
/// external lock.
pub struct Resource<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Resource<T> {
    /// Allocates the value and takes the first reference to it.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: ResourceId::next(),
                value,
            }),
        }
    }

    /// Returns the identifier of the underlying allocation.
    pub fn id(&self) -> ResourceId {
        self.inner.id
    }

    /// Returns the number of strong handles to the value.
    ///
    /// Like [`Arc::strong_count`], the result is already stale when other
    /// threads hold handles; it is reliable only for diagnostics and for
    /// single-owner checks.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Returns `true` if both handles refer to the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Creates a non-owning handle.
    ///
    /// Weak handles are the form handed out where a strong handle would
    /// create an ownership cycle back into a cache; they never keep the
    /// value alive.
    pub fn downgrade(&self) -> WeakResource<T> {
        WeakResource {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Reclaims the value if this is the only strong handle.
    ///
    /// Otherwise returns the handle unchanged.
    pub fn try_unwrap(self) -> Result<T, Self> {
        Arc::try_unwrap(self.inner)
            .map(|inner| inner.value)
            .map_err(|inner| Self { inner })
    }

    /// Returns a mutable reference if this is the only handle, strong or
    /// weak.
    ///
    /// Used to finish constructing a value before it is published to a
    /// cache.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        Arc::get_mut(&mut self.inner).map(|inner| &mut inner.value)
    }
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Deref for Resource<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner.value
    }
}

impl<T> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.inner.id)
            .field("ref_count", &Arc::strong_count(&self.inner))
            .finish_non_exhaustive()
    }
}

/// Non-owning companion to [`Resource`].
pub struct WeakResource<T> {
    inner: Weak<Inner<T>>,
}

impl<T> WeakResource<T> {
    /// Attempts to obtain a strong handle.
    ///
    /// Returns `None` once the last strong handle has been released.
    pub fn upgrade(&self) -> Option<Resource<T>> {
        self.inner.upgrade().map(|inner| Resource { inner })
    }
}

impl<T> Clone for WeakResource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for WeakResource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakResource").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicUsize;

    struct CountsDrops(Arc<AtomicUsize>);

    impl Drop for CountsDrops {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn value_dropped_once_after_last_handle() {
        let drops = Arc::new(AtomicUsize::new(0));
        let first = Resource::new(CountsDrops(drops.clone()));
        let second = first.clone();
        let third = second.clone();
        drop(first);
        drop(third);
        assert_eq!(drops.load(Ordering::SeqCst), 0, "two handles released");
        drop(second);
        assert_eq!(drops.load(Ordering::SeqCst), 1, "last handle released");
    }

    #[test]
    fn clones_share_identity() {
        let a = Resource::new(7_u32);
        let b = a.clone();
        let c = Resource::new(7_u32);
        assert_eq!(a.id(), b.id(), "clones share the allocation id");
        assert!(a.ptr_eq(&b), "clones share the allocation");
        assert_ne!(a.id(), c.id(), "distinct allocations get distinct ids");
        assert!(!a.ptr_eq(&c), "distinct allocations are not pointer-equal");
    }

    #[test]
    fn weak_does_not_keep_value_alive() {
        let drops = Arc::new(AtomicUsize::new(0));
        let strong = Resource::new(CountsDrops(drops.clone()));
        let weak = strong.downgrade();
        assert!(weak.upgrade().is_some(), "upgrade while strong handle lives");
        drop(strong);
        assert_eq!(drops.load(Ordering::SeqCst), 1, "weak did not keep value");
        assert!(weak.upgrade().is_none(), "upgrade after last strong drop");
    }

    #[test]
    fn try_unwrap_requires_unique_ownership() {
        let a = Resource::new(String::from("unique"));
        let b = a.clone();
        let a = a.try_unwrap().unwrap_err();
        drop(b);
        assert_eq!(a.try_unwrap().unwrap(), "unique");
    }

    #[test]
    fn get_mut_only_when_unique() {
        let mut a = Resource::new(1_u32);
        *a.get_mut().unwrap() = 2;
        let b = a.clone();
        assert!(a.get_mut().is_none(), "shared handle must not be mutable");
        assert_eq!(*b, 2);
    }
}
