//! Discriminator bindings: "field F, a literal union, identifies this shape".
//!
//! The allowed values always come from the field's own literal union in the
//! shape schema, so a tag that the binding recognizes is also a tag the
//! shape's field decoder accepts.
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::{BindingProblem, DeclarationError};
use crate::literal::LiteralValue;
use crate::literal_union::LiteralUnionSpec;
use crate::shape::{FieldType, Shape, ShapeSchema};

#[derive(Debug, Clone, PartialEq)]
pub struct DiscriminatorBinding {
    shape: String,
    field: String,
    allowed: LiteralUnionSpec,
}

/// What a discriminator peek found in one document.
#[derive(Debug, Clone, PartialEq)]
pub enum TagMatch<'a> {
    Absent,
    /// Present but not one of this binding's allowed values.
    Unrecognized(&'a Value),
    Recognized(LiteralValue),
}

impl DiscriminatorBinding {
    /// Bind `field` of `schema` as its discriminator.
    pub fn bind(schema: &ShapeSchema, field: &str) -> Result<Self, DeclarationError> {
        let invalid = |problem| DeclarationError::InvalidDiscriminatorBinding {
            shape: schema.name().to_string(),
            field: field.to_string(),
            problem,
        };
        let declared = schema.get(field).ok_or_else(|| invalid(BindingProblem::MissingField))?;
        match &declared.ty {
            FieldType::Literal(spec) if declared.required => Ok(Self {
                shape: schema.name().to_string(),
                field: field.to_string(),
                allowed: spec.clone(),
            }),
            _ => Err(invalid(BindingProblem::NotLiteralUnion)),
        }
    }

    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn allowed(&self) -> &LiteralUnionSpec {
        &self.allowed
    }

    pub fn classify<'a>(&self, doc: &Document<'a>) -> TagMatch<'a> {
        match lookup(doc, &self.field) {
            None => TagMatch::Absent,
            Some(raw) => match self.allowed.decode(raw) {
                Ok(tag) => TagMatch::Recognized(tag),
                Err(_) => TagMatch::Unrecognized(raw),
            },
        }
    }
}

/// Non-destructive peek at one top-level field.
pub fn lookup<'a>(doc: &Document<'a>, field: &str) -> Option<&'a Value> {
    doc.peek_field(field)
}

/// Validate the discriminator a shape declares, if it declares one.
pub fn register(
    schema: &ShapeSchema,
    discriminator: Option<&str>,
) -> Result<Option<DiscriminatorBinding>, DeclarationError> {
    discriminator.map(|field| DiscriminatorBinding::bind(schema, field)).transpose()
}

/// Validate a typed shape's discriminator against its schema, then check that
/// the serde struct itself accepts every allowed tag in that field.
pub fn register_shape<S: Shape>() -> Result<Option<DiscriminatorBinding>, DeclarationError> {
    let binding = register(&S::schema(), S::discriminator())?;
    if let Some(binding) = &binding {
        check_tags_decode::<S>(binding)?;
    }
    Ok(binding)
}

/// Decode `{field: tag}` alone as `S` for each tag. Other fields may be
/// reported missing, but the tag field itself must not be the failure.
fn check_tags_decode<S: Shape>(binding: &DiscriminatorBinding) -> Result<(), DeclarationError> {
    for literal in binding.allowed().literals() {
        let mut lone = Map::new();
        lone.insert(binding.field.clone(), literal.to_wire());
        if let Err(error) = crate::path_de::from_value_with_path::<S>(&Value::Object(lone)) {
            if error.path == binding.field {
                return Err(DeclarationError::InvalidDiscriminatorBinding {
                    shape: binding.shape.clone(),
                    field: binding.field.clone(),
                    problem: BindingProblem::TagRejected,
                });
            }
        }
    }
    Ok(())
}

/// Bindings validated once per shape name.
#[derive(Debug, Default, Clone)]
pub struct DiscriminatorRegistry {
    bindings: IndexMap<String, Option<DiscriminatorBinding>>,
}

impl DiscriminatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        schema: &ShapeSchema,
        discriminator: Option<&str>,
    ) -> Result<Option<DiscriminatorBinding>, DeclarationError> {
        if let Some(known) = self.bindings.get(schema.name()) {
            let known_field = known.as_ref().map(|b| b.field());
            if known_field != discriminator {
                return Err(DeclarationError::InvalidDiscriminatorBinding {
                    shape: schema.name().to_string(),
                    field: discriminator.or(known_field).unwrap_or_default().to_string(),
                    problem: BindingProblem::Conflicting,
                });
            }
            return Ok(known.clone());
        }
        let binding = register(schema, discriminator)?;
        self.bindings.insert(schema.name().to_string(), binding.clone());
        Ok(binding)
    }

    pub fn get(&self, shape: &str) -> Option<&DiscriminatorBinding> {
        self.bindings.get(shape).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}
