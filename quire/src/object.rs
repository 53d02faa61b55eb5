// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Model for parsed document objects.

use core::fmt;
use hashbrown::HashMap;
use peniko::Blob;

/// Sentinel marking an invalid object number.
///
/// The document format reserves the all-ones value; object number zero is
/// the free-list head of the indirection table and is equally invalid.
pub const INVALID_OBJECT_NUMBER: u32 = 0xFFFF_FFFF;

/// Returns `true` if `num` can name an object in the indirection table.
pub fn is_valid_object_number(num: u32) -> bool {
    num != 0 && num < INVALID_OBJECT_NUMBER
}

/// Reference to an indirect object: object number plus generation.
///
/// The generation distinguishes successive revisions stored under one
/// number in incrementally updated documents.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ObjRef {
    /// Object number within the document's indirection table.
    pub num: u32,
    /// Generation number of the revision.
    pub r#gen: u16,
}

impl ObjRef {
    /// Creates a reference to generation zero of `num`.
    pub fn new(num: u32) -> Self {
        Self { num, r#gen: 0 }
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.num, self.r#gen)
    }
}

/// Dictionary of named values.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Dict(HashMap<Box<str>, Object>);

impl Dict {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key`, replacing any existing entry.
    pub fn insert(&mut self, key: &str, value: Object) {
        self.0.insert(key.into(), value);
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Object> {
        self.0.get(key)
    }

    /// Returns the integer stored under `key`.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_int()
    }

    /// Returns the name stored under `key`.
    pub fn get_name(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_name()
    }

    /// Returns the dictionary stored under `key`.
    pub fn get_dict(&self, key: &str) -> Option<&Dict> {
        self.get(key)?.as_dict()
    }

    /// Returns the array stored under `key`.
    pub fn get_array(&self, key: &str) -> Option<&[Object]> {
        self.get(key)?.as_array()
    }

    /// Returns the indirect reference stored under `key`.
    pub fn get_reference(&self, key: &str) -> Option<ObjRef> {
        self.get(key)?.as_reference()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Object)> {
        self.0.iter().map(|(k, v)| (&**k, v))
    }
}

/// Stream object: a dictionary describing a byte payload.
///
/// The payload is shared; cloning a stream does not copy the bytes.
#[derive(Clone, Debug)]
pub struct Stream {
    /// Attributes of the payload (length, filters, dimensions).
    pub dict: Dict,
    /// The payload bytes.
    pub data: Blob<u8>,
}

/// Streams compare by dictionary and payload identity: two streams holding
/// equal bytes in distinct blobs are unequal.
impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        self.dict == other.dict && self.data.id() == other.data.id()
    }
}

/// A parsed document object.
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    /// The null object.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// Real value.
    Real(f64),
    /// Name (an atom, written `/Name` in the document grammar).
    Name(Box<str>),
    /// Text string.
    Text(Box<str>),
    /// Array of objects.
    Array(Vec<Object>),
    /// Dictionary of named objects.
    Dict(Dict),
    /// Stream with attributes and a byte payload.
    Stream(Stream),
    /// Reference to an indirect object.
    Ref(ObjRef),
}

impl Object {
    /// Returns `true` for the null object.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the numeric value, widening integers to `f64`.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Real(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the name, if this is a name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the text string, if this is a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the array elements, if this is an array.
    pub fn as_array(&self) -> Option<&[Object]> {
        match self {
            Self::Array(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the dictionary, if this is a dictionary or a stream.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(value) => Some(value),
            Self::Stream(stream) => Some(&stream.dict),
            _ => None,
        }
    }

    /// Returns the stream, if this is a stream.
    pub fn as_stream(&self) -> Option<&Stream> {
        match self {
            Self::Stream(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the indirect reference, if this is a reference.
    pub fn as_reference(&self) -> Option<ObjRef> {
        match self {
            Self::Ref(value) => Some(*value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn object_number_validity() {
        assert!(!is_valid_object_number(0));
        assert!(is_valid_object_number(1));
        assert!(is_valid_object_number(INVALID_OBJECT_NUMBER - 1));
        assert!(!is_valid_object_number(INVALID_OBJECT_NUMBER));
    }

    #[test]
    fn dict_typed_accessors() {
        let mut dict = Dict::new();
        dict.insert("Type", Object::Name("Page".into()));
        dict.insert("Count", Object::Integer(12));
        dict.insert("Parent", Object::Ref(ObjRef::new(3)));
        assert_eq!(dict.get_name("Type"), Some("Page"));
        assert_eq!(dict.get_int("Count"), Some(12));
        assert_eq!(dict.get_reference("Parent"), Some(ObjRef::new(3)));
        assert_eq!(dict.get_name("Count"), None, "type mismatch is a miss");
        assert_eq!(dict.get("Missing"), None);
    }

    #[test]
    fn stream_exposes_its_dict() {
        let mut dict = Dict::new();
        dict.insert("Length", Object::Integer(3));
        let stream = Object::Stream(Stream {
            dict,
            data: Blob::new(Arc::new(vec![1_u8, 2, 3])),
        });
        assert_eq!(stream.as_dict().unwrap().get_int("Length"), Some(3));
        assert_eq!(stream.as_stream().unwrap().data.len(), 3);
    }

    #[test]
    fn as_real_widens_integers() {
        assert_eq!(Object::Integer(2).as_real(), Some(2.0));
        assert_eq!(Object::Real(0.5).as_real(), Some(0.5));
        assert_eq!(Object::Null.as_real(), None);
    }

    #[test]
    fn obj_ref_display() {
        assert_eq!(ObjRef { num: 12, r#gen: 2 }.to_string(), "12 2 R");
    }
}
