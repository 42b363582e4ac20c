//! The read side of a JSON document as seen by union decoders.
//!
//! A [`Document`] only borrows the parsed tree, so peeking a field can never
//! disturb a later full decode of the same document.
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{BodyError, EncodeError};
use crate::literal::{LiteralValue, ScalarKind};

#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    root: &'a Value,
}

impl<'a> Document<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// One top-level field, or `None` when absent or the document is not an object.
    pub fn peek_field(&self, name: &str) -> Option<&'a Value> {
        self.root.as_object()?.get(name)
    }

    /// Full serde decode of the whole document as `T`.
    pub fn decode_as<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        crate::path_de::from_value_with_path(self.root)
    }

    /// Strict scalar read of the whole document.
    pub fn decode_scalar_as(&self, kind: ScalarKind) -> Option<LiteralValue> {
        kind.read(self.root)
    }
}

impl<'a> From<&'a Value> for Document<'a> {
    fn from(root: &'a Value) -> Self {
        Self::new(root)
    }
}

pub fn encode_scalar(literal: &LiteralValue) -> Value {
    literal.to_wire()
}

/// Encode a shape through its own `Serialize` impl.
pub fn encode_shape<T: Serialize>(shape: &str, value: &T) -> Result<Value, EncodeError> {
    serde_json::to_value(value).map_err(|e| EncodeError::Serialize {
        shape: shape.to_string(),
        message: e.to_string(),
    })
}
