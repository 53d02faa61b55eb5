// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

/// Reason an indirect object could not be materialized.
///
/// A parse failure is recovered locally by the [`ObjectStore`]: the
/// placeholder claiming the object number is rolled back and callers see an
/// absent object. The store does not retry; retry policy belongs to the
/// caller.
///
/// [`ObjectStore`]: crate::ObjectStore
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The indirection table has no entry for the object number.
    #[error("object {num} not found in document")]
    NotFound {
        /// The requested object number.
        num: u32,
    },
    /// The object's byte range could not be parsed.
    #[error("object {num} could not be parsed: {message}")]
    Syntax {
        /// The requested object number.
        num: u32,
        /// Parser diagnostic.
        message: String,
    },
    /// The byte range for the object is not available.
    #[error("byte range for object {num} is unavailable")]
    MissingData {
        /// The requested object number.
        num: u32,
    },
}
