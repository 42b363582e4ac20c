//! Decode and encode JSON *unions*: closed sets of literal constants and
//! closed sets of record shapes.
//!
//! A literal union is one of N scalar constants and travels as the bare
//! scalar. A type union is one of N record shapes and travels as the bare
//! object of whichever shape is active; the decoder works out which one it
//! is, using a discriminator field when a shape declares one and an ordered
//! trial decode otherwise.
//!
//! Unions can be declared in code ([`literal_union!`], [`type_union!`] or the
//! builders) or at runtime from a JSON declaration file ([`Catalog`]).
pub mod declare;
pub mod discriminator;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod literal;
pub mod literal_union;
pub mod path_de;
pub mod shape;
pub mod type_union;

mod macros;

pub use declare::{Catalog, Tagged, UnionKind};
pub use discriminator::{DiscriminatorBinding, DiscriminatorRegistry};
pub use dispatch::{Decoded, Route};
pub use document::Document;
pub use error::{BindingProblem, BodyError, DecodeError, DeclarationError, EncodeError};
pub use literal::{LiteralValue, ScalarKind};
pub use literal_union::{LiteralUnion, LiteralUnionSpec, Representation};
pub use shape::{Field, FieldType, Record, Shape, ShapeSchema};
pub use type_union::{TypeUnion, TypeUnionSpec, UnionValue, Variant};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
    pub use serde;
    pub use serde_json::Value;
}
