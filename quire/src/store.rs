// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-document store of lazily parsed indirect objects.

use crate::error::ParseError;
use crate::handle::Resource;
use crate::object::{is_valid_object_number, ObjRef, Object};
use core::fmt;
use hashbrown::HashMap;
use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::thread::{self, ThreadId};

/// Supplies parsed objects for the store's slow path.
///
/// Implemented by the document's parser/tokenizer. `parse` is invoked
/// without any store lock held and may be called from several threads at
/// once for distinct object numbers; an implementation that cannot tolerate
/// that must serialize internally. Resolving nested references by calling
/// back into [`ObjectStore::get_or_parse`] from within `parse` is
/// supported, except for the number currently being parsed (see
/// [`ObjectStore::get_or_parse`]).
pub trait ObjectParser {
    /// Materializes object `num`, returning the object and its generation.
    fn parse(&self, num: u32) -> Result<(Object, u16), ParseError>;
}

/// Options for an object store.
#[derive(Copy, Clone, Default, Debug)]
pub struct StoreOptions {
    /// Initial capacity hint for the slot table, in objects.
    ///
    /// The default value is zero.
    pub capacity: usize,
}

enum PendingState {
    InFlight,
    Done(Option<Resource<Object>>),
}

/// Placeholder claiming an object number while its parse is in flight.
struct PendingParse {
    owner: ThreadId,
    state: Mutex<PendingState>,
    done: Condvar,
}

impl PendingParse {
    fn new() -> Self {
        Self {
            owner: thread::current().id(),
            state: Mutex::new(PendingState::InFlight),
            done: Condvar::new(),
        }
    }

    /// Blocks until the owning thread settles the parse.
    ///
    /// Returns `None` without blocking when called from the owning thread
    /// itself: that is a reference cycle inside the in-flight parse.
    fn wait(&self, num: u32) -> Option<Resource<Object>> {
        if thread::current().id() == self.owner {
            log::debug!("object {num} referenced from within its own parse");
            return None;
        }
        let mut state = self.state.lock().unwrap();
        loop {
            match &*state {
                PendingState::Done(result) => return result.clone(),
                PendingState::InFlight => state = self.done.wait(state).unwrap(),
            }
        }
    }

    fn settle(&self, result: Option<Resource<Object>>) {
        *self.state.lock().unwrap() = PendingState::Done(result);
        self.done.notify_all();
    }
}

enum Slot {
    Ready {
        object: Resource<Object>,
        r#gen: u16,
    },
    Pending(Arc<PendingParse>),
}

#[derive(Default)]
struct Slots {
    map: HashMap<u32, Slot>,
    /// Highest object number seen, for appending fresh objects.
    highest: u32,
}

impl Slots {
    fn note(&mut self, num: u32) {
        self.highest = self.highest.max(num);
    }
}

/// Per-document cache mapping object numbers to lazily parsed objects.
///
/// The store is shared by every worker thread rendering pages of one
/// document. Lookups of already parsed objects take only the shared side of
/// a reader/writer lock, which is the common case during parallel
/// rendering: nearly all objects a page needs were parsed by earlier pages.
/// Population is insert-once; whichever thread wins the claim for a number
/// determines the object every other thread observes.
pub struct ObjectStore {
    slots: RwLock<Slots>,
}

impl ObjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Creates an empty store with the given options.
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            slots: RwLock::new(Slots {
                map: HashMap::with_capacity(options.capacity),
                highest: 0,
            }),
        }
    }

    /// Returns the cached object for `num`, without side effects.
    ///
    /// Returns `None` for invalid numbers, absent entries, and entries
    /// whose parse is still in flight.
    pub fn get(&self, num: u32) -> Option<Resource<Object>> {
        if !is_valid_object_number(num) {
            return None;
        }
        match self.slots.read().unwrap().map.get(&num) {
            Some(Slot::Ready { object, .. }) => Some(object.clone()),
            _ => None,
        }
    }

    /// Returns the object for `num`, parsing and caching it on a miss.
    ///
    /// The fast path takes the shared lock and returns the cached object.
    /// On a miss the exclusive lock is taken, the slot re-checked (another
    /// thread may have won meanwhile), and a placeholder installed to claim
    /// the number; the parse itself then runs with no lock held, and the
    /// exclusive lock is re-taken only to install the result or roll the
    /// placeholder back. Threads that lose the claim race block until the
    /// winner settles and then return the winner's result.
    ///
    /// A failed parse removes the placeholder and returns `None`; it is not
    /// retried here and does not affect other numbers.
    ///
    /// `parse` may itself resolve nested references through this method.
    /// The one unsupported shape is a cycle back to the number currently
    /// being parsed on the same thread, which returns `None` instead of
    /// deadlocking.
    pub fn get_or_parse(
        &self,
        num: u32,
        parser: &dyn ObjectParser,
    ) -> Option<Resource<Object>> {
        if !is_valid_object_number(num) {
            return None;
        }

        // Fast path: shared lock only.
        {
            let slots = self.slots.read().unwrap();
            match slots.map.get(&num) {
                Some(Slot::Ready { object, .. }) => return Some(object.clone()),
                Some(Slot::Pending(pending)) => {
                    let pending = pending.clone();
                    drop(slots);
                    return pending.wait(num);
                }
                None => {}
            }
        }

        // Slow path: claim the slot with a placeholder.
        let pending = {
            let mut slots = self.slots.write().unwrap();
            match slots.map.get(&num) {
                Some(Slot::Ready { object, .. }) => return Some(object.clone()),
                Some(Slot::Pending(pending)) => {
                    let pending = pending.clone();
                    drop(slots);
                    return pending.wait(num);
                }
                None => {
                    let pending = Arc::new(PendingParse::new());
                    slots.map.insert(num, Slot::Pending(pending.clone()));
                    slots.note(num);
                    pending
                }
            }
        };

        // Parse with no lock held; the placeholder absorbs the race window.
        let result = match parser.parse(num) {
            Ok((object, r#gen)) => Some((Resource::new(object), r#gen)),
            Err(err) => {
                log::warn!("parse of object {num} failed: {err}");
                None
            }
        };

        {
            let mut slots = self.slots.write().unwrap();
            match &result {
                Some((object, r#gen)) => {
                    slots.map.insert(
                        num,
                        Slot::Ready {
                            object: object.clone(),
                            r#gen: *r#gen,
                        },
                    );
                }
                // Roll back the claim; the number stays parseable later.
                None => {
                    slots.map.remove(&num);
                }
            }
        }
        pending.settle(result.as_ref().map(|(object, _)| object.clone()));
        result.map(|(object, _)| object)
    }

    /// Inserts a freshly created object, assigning the next unused number.
    pub fn add(&self, object: Object) -> ObjRef {
        let mut slots = self.slots.write().unwrap();
        let num = slots
            .highest
            .checked_add(1)
            .filter(|num| is_valid_object_number(*num))
            .expect("object number space exhausted");
        slots.highest = num;
        slots.map.insert(
            num,
            Slot::Ready {
                object: Resource::new(object),
                r#gen: 0,
            },
        );
        ObjRef { num, r#gen: 0 }
    }

    /// Installs `object` under `num` only if `gen` is strictly newer.
    ///
    /// An absent slot counts as older than any generation. A slot whose
    /// parse is in flight is never replaced; the parse owns it. Returns
    /// `true` if the object was installed.
    pub fn replace_if_newer_generation(&self, num: u32, r#gen: u16, object: Object) -> bool {
        if !is_valid_object_number(num) {
            return false;
        }
        let mut slots = self.slots.write().unwrap();
        match slots.map.get(&num) {
            Some(Slot::Pending(_)) => return false,
            Some(Slot::Ready { r#gen: current, .. }) if *current >= r#gen => return false,
            _ => {}
        }
        slots.map.insert(
            num,
            Slot::Ready {
                object: Resource::new(object),
                r#gen,
            },
        );
        slots.note(num);
        true
    }

    /// Erases the entry for `num`. Returns `true` if an entry was removed.
    ///
    /// An in-flight placeholder is not removable; outstanding handles to a
    /// removed object stay valid until their holders release them.
    pub fn remove(&self, num: u32) -> bool {
        let mut slots = self.slots.write().unwrap();
        match slots.map.get(&num) {
            Some(Slot::Ready { .. }) => {
                slots.map.remove(&num);
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if a parsed object is cached under `num`.
    pub fn contains(&self, num: u32) -> bool {
        matches!(
            self.slots.read().unwrap().map.get(&num),
            Some(Slot::Ready { .. })
        )
    }

    /// Returns the generation of the object cached under `num`.
    pub fn generation(&self, num: u32) -> Option<u16> {
        match self.slots.read().unwrap().map.get(&num) {
            Some(Slot::Ready { r#gen, .. }) => Some(*r#gen),
            _ => None,
        }
    }

    /// Number of entries, including in-flight placeholders.
    pub fn len(&self) -> usize {
        self.slots.read().unwrap().map.len()
    }

    /// Returns `true` if the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest object number seen so far.
    pub fn highest_object_number(&self) -> u32 {
        self.slots.read().unwrap().highest
    }
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.read().unwrap();
        f.debug_struct("ObjectStore")
            .field("len", &slots.map.len())
            .field("highest", &slots.highest)
            .finish_non_exhaustive()
    }
}
