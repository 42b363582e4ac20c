//! Unions declared at runtime from a JSON document.
//!
//! ```json
//! {
//!   "literal_unions": { "ClickType": ["click"] },
//!   "shapes": {
//!     "ClickEvent": {
//!       "discriminator": "type",
//!       "fields": {
//!         "type": { "literal": "ClickType" },
//!         "coordinates": { "array": "string" },
//!         "label": { "optional": "string" }
//!       }
//!     }
//!   },
//!   "type_unions": { "UIEvent": ["ClickEvent"] }
//! }
//! ```
//!
//! Field types are `any`, `null`, `boolean`, `integer`, `number`, `string`,
//! `object`, or one of `{"literal": U}`, `{"shape": S}`, `{"array": T}`,
//! `{"nullable": T}`, `{"optional": T}` (top level of a field only).
//! References must name something declared earlier in the document.
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::discriminator::DiscriminatorRegistry;
use crate::dispatch::Route;
use crate::document::Document;
use crate::error::{DecodeError, DeclarationError, EncodeError};
use crate::literal::LiteralValue;
use crate::literal_union::{LiteralCase, LiteralUnionSpec};
use crate::shape::{Field, FieldType, Record, ShapeSchema};
use crate::type_union::{TypeUnionSpec, UnionValue, Variant};

// ————————————————————————————————————————————————————————————————————————————
// DECLARATION FORMAT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Declarations {
    #[serde(default)]
    literal_unions: IndexMap<String, Vec<Value>>,
    #[serde(default)]
    shapes: IndexMap<String, ShapeDecl>,
    #[serde(default)]
    type_unions: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ShapeDecl {
    #[serde(default)]
    discriminator: Option<String>,
    fields: IndexMap<String, TypeDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TypeDecl {
    Keyword(Keyword),
    Composite(Composite),
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Keyword {
    Any,
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Object,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Composite {
    Literal(String),
    Shape(String),
    Array(Box<TypeDecl>),
    Nullable(Box<TypeDecl>),
    Optional(Box<TypeDecl>),
}

// ————————————————————————————————————————————————————————————————————————————
// CATALOG
// ————————————————————————————————————————————————————————————————————————————

/// A runtime-declared shape's value inside a type union.
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged {
    pub variant: usize,
    pub record: Record,
}

impl UnionValue for Tagged {
    fn variant_index(&self) -> usize {
        self.variant
    }
}

/// Every union, shape and discriminator from one declaration document.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    literal_unions: IndexMap<String, LiteralUnionSpec>,
    shapes: IndexMap<String, ShapeSchema>,
    registry: DiscriminatorRegistry,
    type_unions: IndexMap<String, TypeUnionSpec<Tagged>>,
}

/// A union looked up by name.
#[derive(Debug, Clone, Copy)]
pub enum UnionKind<'a> {
    Literal(&'a LiteralUnionSpec),
    Type(&'a TypeUnionSpec<Tagged>),
}

/// The outcome of decoding through a [`UnionKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Matched {
    Literal(LiteralCase),
    Type { variant: String, route: Route, value: Tagged },
}

impl Matched {
    /// Case identifier or variant name.
    pub fn name(&self) -> &str {
        match self {
            Matched::Literal(case) => &case.identifier,
            Matched::Type { variant, .. } => variant,
        }
    }

    pub fn route(&self) -> Option<Route> {
        match self {
            Matched::Literal(_) => None,
            Matched::Type { route, .. } => Some(*route),
        }
    }
}

impl UnionKind<'_> {
    pub fn name(&self) -> &str {
        match self {
            UnionKind::Literal(spec) => spec.name(),
            UnionKind::Type(spec) => spec.name(),
        }
    }

    pub fn decode(&self, doc: &Document<'_>) -> Result<Matched, DecodeError> {
        match self {
            UnionKind::Literal(spec) => spec.case_for(doc.root()).cloned().map(Matched::Literal),
            UnionKind::Type(spec) => {
                let decoded = spec.decode_detailed(doc)?;
                Ok(Matched::Type {
                    variant: spec.variants()[decoded.variant].name().to_string(),
                    route: decoded.route,
                    value: decoded.value,
                })
            }
        }
    }

    pub fn encode(&self, matched: &Matched) -> Result<Value, EncodeError> {
        match (self, matched) {
            (UnionKind::Literal(spec), Matched::Literal(case)) => spec.encode(&case.value),
            (UnionKind::Type(spec), Matched::Type { value, .. }) => spec.encode(value),
            _ => Err(EncodeError::VariantMismatch {
                union: self.name().to_string(),
                variant: matched.name().to_string(),
            }),
        }
    }
}

impl Catalog {
    pub fn from_str(src: &str) -> Result<Self, DeclarationError> {
        let decls = crate::path_de::from_str_with_path::<Declarations>(src)
            .map_err(|e| DeclarationError::Malformed(e.to_string()))?;
        Self::from_declarations(decls)
    }

    pub fn from_value(value: &Value) -> Result<Self, DeclarationError> {
        let decls = crate::path_de::from_value_with_path::<Declarations>(value)
            .map_err(|e| DeclarationError::Malformed(e.to_string()))?;
        Self::from_declarations(decls)
    }

    fn from_declarations(decls: Declarations) -> Result<Self, DeclarationError> {
        let mut catalog = Catalog::default();

        for (name, raw) in decls.literal_unions {
            let mut literals = Vec::with_capacity(raw.len());
            for v in &raw {
                let literal = LiteralValue::from_wire(v).ok_or_else(|| {
                    DeclarationError::Malformed(format!(
                        "literal union `{name}`: {v} is not a string, number or boolean"
                    ))
                })?;
                literals.push(literal);
            }
            let spec = LiteralUnionSpec::new(name.clone(), literals)?;
            catalog.literal_unions.insert(name, spec);
        }

        for (name, decl) in decls.shapes {
            let mut schema = ShapeSchema::new(name.clone());
            for (field, ty) in decl.fields {
                let (ty, required) = match ty {
                    TypeDecl::Composite(Composite::Optional(inner)) => {
                        (catalog.resolve(&name, *inner)?, false)
                    }
                    other => (catalog.resolve(&name, other)?, true),
                };
                schema.push(Field { name: field, ty, required })?;
            }
            catalog.registry.register(&schema, decl.discriminator.as_deref())?;
            catalog.shapes.insert(name, schema);
        }

        for (name, members) in decls.type_unions {
            if catalog.literal_unions.contains_key(&name) {
                return Err(DeclarationError::Malformed(format!(
                    "`{name}` is declared both as a literal union and as a type union"
                )));
            }
            let mut builder = TypeUnionSpec::builder(name.clone());
            for (index, shape) in members.iter().enumerate() {
                let schema = catalog.shapes.get(shape).ok_or_else(|| {
                    DeclarationError::UnknownReference {
                        from: name.clone(),
                        kind: "shape",
                        name: shape.clone(),
                    }
                })?;
                builder = builder.variant(catalog.variant(index, schema));
            }
            catalog.type_unions.insert(name, builder.build()?);
        }

        Ok(catalog)
    }

    fn resolve(&self, from: &str, decl: TypeDecl) -> Result<FieldType, DeclarationError> {
        let ty = match decl {
            TypeDecl::Keyword(k) => match k {
                Keyword::Any => FieldType::Any,
                Keyword::Null => FieldType::Null,
                Keyword::Boolean => FieldType::Bool,
                Keyword::Integer => FieldType::Integer,
                Keyword::Number => FieldType::Number,
                Keyword::String => FieldType::String,
                Keyword::Object => FieldType::Object,
            },
            TypeDecl::Composite(Composite::Literal(name)) => {
                let spec = self.literal_unions.get(&name).ok_or_else(|| {
                    DeclarationError::UnknownReference {
                        from: from.to_string(),
                        kind: "literal union",
                        name: name.clone(),
                    }
                })?;
                FieldType::Literal(spec.clone())
            }
            TypeDecl::Composite(Composite::Shape(name)) => {
                let schema = self.shapes.get(&name).ok_or_else(|| {
                    DeclarationError::UnknownReference {
                        from: from.to_string(),
                        kind: "shape",
                        name: name.clone(),
                    }
                })?;
                FieldType::Shape(Box::new(schema.clone()))
            }
            TypeDecl::Composite(Composite::Array(inner)) => {
                FieldType::Array(Box::new(self.resolve(from, *inner)?))
            }
            TypeDecl::Composite(Composite::Nullable(inner)) => {
                FieldType::Nullable(Box::new(self.resolve(from, *inner)?))
            }
            TypeDecl::Composite(Composite::Optional(_)) => {
                return Err(DeclarationError::Malformed(format!(
                    "`{from}`: `optional` is only allowed at the top of a field type"
                )));
            }
        };
        Ok(ty)
    }

    fn variant(&self, index: usize, schema: &ShapeSchema) -> Variant<Tagged> {
        let binding = self.registry.get(schema.name()).cloned();
        let schema = Arc::new(schema.clone());
        let for_decode = Arc::clone(&schema);
        Variant::new(
            schema.name().to_string(),
            move |doc: &Document<'_>| {
                for_decode.decode(doc).map(|record| Tagged { variant: index, record })
            },
            move |value: &Tagged| schema.encode(&value.record),
        )
        .with_discriminator(binding)
    }

    pub fn literal_union(&self, name: &str) -> Option<&LiteralUnionSpec> {
        self.literal_unions.get(name)
    }

    pub fn type_union(&self, name: &str) -> Option<&TypeUnionSpec<Tagged>> {
        self.type_unions.get(name)
    }

    pub fn shape(&self, name: &str) -> Option<&ShapeSchema> {
        self.shapes.get(name)
    }

    pub fn union(&self, name: &str) -> Option<UnionKind<'_>> {
        self.literal_union(name)
            .map(UnionKind::Literal)
            .or_else(|| self.type_union(name).map(UnionKind::Type))
    }

    pub fn literal_unions(&self) -> impl Iterator<Item = &LiteralUnionSpec> {
        self.literal_unions.values()
    }

    pub fn type_unions(&self) -> impl Iterator<Item = &TypeUnionSpec<Tagged>> {
        self.type_unions.values()
    }

    pub fn shapes(&self) -> impl Iterator<Item = &ShapeSchema> {
        self.shapes.values()
    }

    pub fn discriminators(&self) -> &DiscriminatorRegistry {
        &self.registry
    }
}
