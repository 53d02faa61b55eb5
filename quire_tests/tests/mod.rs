// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `quire`.
//!
//! - The `util` module contains shared parser/rasterizer doubles needed by
//!   different test methods.
//! - We do not use the default Rust test harness, but instead use this
//!   `mod.rs` file as the entry point to run all other tests, so that the
//!   shared utilities can live in one place.
//! - Tests are grouped by component (`store`, `glyphs`, `runtime`,
//!   `handle`); cross-thread scenarios live next to the single-threaded
//!   tests for the same component.

#![allow(missing_docs, reason = "we don't need docs for testing")]

mod runtime;
mod util;
