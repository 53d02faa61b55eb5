// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime lifecycle tests across threads.

use crate::util::data_blob;
use core::sync::atomic::{AtomicUsize, Ordering};
use quire::{FaceSource, Modules, Platform, Runtime, RuntimeConfig};
use std::sync::{Arc, Barrier};
use std::thread;

#[derive(Default)]
struct CountingPlatform {
    initialized: Arc<AtomicUsize>,
}

impl Platform for CountingPlatform {
    fn initialize(&self) {
        self.initialized.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn runtime_concurrent_create_constructs_once() {
    let initialized = Arc::new(AtomicUsize::new(0));
    let runtime = Arc::new(Runtime::new());
    let barrier = Arc::new(Barrier::new(8));
    let workers: Vec<_> = (0..8)
        .map(|_| {
            let runtime = runtime.clone();
            let barrier = barrier.clone();
            let initialized = initialized.clone();
            thread::spawn(move || {
                barrier.wait();
                let config = RuntimeConfig {
                    platform: Some(Box::new(CountingPlatform {
                        initialized: initialized.clone(),
                    })),
                    ..Default::default()
                };
                Arc::clone(runtime.create(config))
            })
        })
        .collect();
    let modules: Vec<Arc<Modules>> =
        workers.into_iter().map(|w| w.join().unwrap()).collect();

    assert_eq!(
        initialized.load(Ordering::SeqCst),
        1,
        "platform initialized exactly once"
    );
    for pair in modules.windows(2) {
        assert!(
            Arc::ptr_eq(&pair[0], &pair[1]),
            "every creator observes the same module set"
        );
    }
    // A reader that did not create sees the published set.
    assert!(Arc::ptr_eq(runtime.get(), &modules[0]));
}

#[test]
fn runtime_modules_shared_by_worker_threads() {
    let runtime = Runtime::new();
    let config = RuntimeConfig {
        faces: vec![FaceSource {
            data: data_blob(7),
            index: 0,
            family: String::from("Body"),
        }],
        ..Default::default()
    };
    let modules = Arc::clone(runtime.create(config));
    let face_id = modules.fonts().family("body").next().expect("preregistered");

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let modules = modules.clone();
            thread::spawn(move || {
                let face = modules.fonts().face(face_id).expect("face resolves");
                modules.font_cache().glyph_cache(&face).expect("cache created")
            })
        })
        .collect();
    let caches: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    for pair in caches.windows(2) {
        assert!(pair[0].ptr_eq(&pair[1]), "workers share one glyph cache");
    }
    assert_eq!(modules.font_cache().face_count(), 1);
}
