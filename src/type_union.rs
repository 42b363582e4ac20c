//! Type unions: a closed, ordered set of record shapes treated as one type.
//!
//! A union value is encoded as its active variant's payload, unwrapped and
//! untagged. Decoding goes through [`crate::dispatch`].
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::discriminator::{self, DiscriminatorBinding};
use crate::dispatch::{self, Decoded};
use crate::document::{encode_shape, Document};
use crate::error::{BodyError, DecodeError, DeclarationError, EncodeError};
use crate::shape::Shape;

pub type ShapeDecoder<T> = Arc<dyn Fn(&Document<'_>) -> Result<T, BodyError> + Send + Sync>;
pub type ShapeEncoder<T> = Arc<dyn Fn(&T) -> Result<Value, EncodeError> + Send + Sync>;

/// A union value that knows which variant (by declared index) it holds.
pub trait UnionValue {
    fn variant_index(&self) -> usize;
}

/// A Rust enum over shapes, usually produced by [`type_union!`](crate::type_union!).
pub trait TypeUnion: UnionValue + Sized + 'static {
    fn spec() -> &'static TypeUnionSpec<Self>;

    fn variant_name(&self) -> &'static str {
        Self::spec().variants()[self.variant_index()].name()
    }
}

pub struct Variant<T> {
    name: String,
    decoder: ShapeDecoder<T>,
    encoder: ShapeEncoder<T>,
    discriminator: Option<DiscriminatorBinding>,
}

impl<T> Variant<T> {
    pub fn new<D, E>(name: impl Into<String>, decoder: D, encoder: E) -> Self
    where
        D: Fn(&Document<'_>) -> Result<T, BodyError> + Send + Sync + 'static,
        E: Fn(&T) -> Result<Value, EncodeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            decoder: Arc::new(decoder),
            encoder: Arc::new(encoder),
            discriminator: None,
        }
    }

    pub fn with_discriminator(mut self, binding: Option<DiscriminatorBinding>) -> Self {
        self.discriminator = binding;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn discriminator(&self) -> Option<&DiscriminatorBinding> {
        self.discriminator.as_ref()
    }

    pub fn decode(&self, doc: &Document<'_>) -> Result<T, BodyError> {
        (self.decoder)(doc)
    }

    pub fn encode(&self, value: &T) -> Result<Value, EncodeError> {
        (self.encoder)(value)
    }
}

impl<T> Clone for Variant<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            decoder: Arc::clone(&self.decoder),
            encoder: Arc::clone(&self.encoder),
            discriminator: self.discriminator.clone(),
        }
    }
}

impl<T> fmt::Debug for Variant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("name", &self.name)
            .field("discriminator", &self.discriminator.as_ref().map(|b| b.field()))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct TypeUnionSpec<T> {
    name: String,
    variants: Vec<Variant<T>>,
}

impl<T> TypeUnionSpec<T> {
    pub fn builder(name: impl Into<String>) -> TypeUnionBuilder<T> {
        TypeUnionBuilder { name: name.into(), variants: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[Variant<T>] {
        &self.variants
    }

    pub fn variant_names(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.name()).collect()
    }

    pub fn decode(&self, doc: &Document<'_>) -> Result<T, DecodeError> {
        self.decode_detailed(doc).map(|d| d.value)
    }

    /// Decode and also report the winning variant and route.
    pub fn decode_detailed(&self, doc: &Document<'_>) -> Result<Decoded<T>, DecodeError> {
        dispatch::dispatch(&self.name, &self.variants, doc)
    }

    pub fn decode_value(&self, value: &Value) -> Result<T, DecodeError> {
        self.decode(&Document::new(value))
    }
}

impl<T: UnionValue> TypeUnionSpec<T> {
    pub fn encode(&self, value: &T) -> Result<Value, EncodeError> {
        let index = value.variant_index();
        let variant = self.variants.get(index).ok_or_else(|| EncodeError::VariantMismatch {
            union: self.name.clone(),
            variant: format!("#{index}"),
        })?;
        variant.encode(value)
    }
}

pub struct TypeUnionBuilder<T> {
    name: String,
    variants: Vec<Variant<T>>,
}

impl<T: 'static> TypeUnionBuilder<T> {
    pub fn variant(mut self, variant: Variant<T>) -> Self {
        self.variants.push(variant);
        self
    }

    /// Add a serde shape as a variant. `wrap` tags a decoded payload, `unwrap`
    /// gets it back out of a union value (returning `None` for other variants).
    /// The shape's discriminator, if it declares one, is validated here.
    pub fn shape<S: Shape>(
        self,
        name: impl Into<String>,
        wrap: fn(S) -> T,
        unwrap: fn(&T) -> Option<&S>,
    ) -> Result<Self, DeclarationError> {
        let binding = discriminator::register_shape::<S>()?;
        let name: String = name.into();
        let union = self.name.clone();
        let variant = name.clone();
        let encoder = move |value: &T| match unwrap(value) {
            Some(shape) => encode_shape(&variant, shape),
            None => Err(EncodeError::VariantMismatch {
                union: union.clone(),
                variant: variant.clone(),
            }),
        };
        let decoder = move |doc: &Document<'_>| doc.decode_as::<S>().map(wrap);
        Ok(self.variant(Variant::new(name, decoder, encoder).with_discriminator(binding)))
    }

    pub fn build(self) -> Result<TypeUnionSpec<T>, DeclarationError> {
        if self.variants.is_empty() {
            return Err(DeclarationError::EmptyUnion { union: self.name });
        }
        for (i, v) in self.variants.iter().enumerate() {
            if self.variants[..i].iter().any(|w| w.name == v.name) {
                return Err(DeclarationError::DuplicateVariant {
                    union: self.name.clone(),
                    variant: v.name.clone(),
                });
            }
        }
        Ok(TypeUnionSpec { name: self.name, variants: self.variants })
    }
}
