//! Record shapes: the field layout a union variant decodes into.
//!
//! Typed shapes (plain serde structs) publish a [`ShapeSchema`] through the
//! [`Shape`] trait so that their discriminator field can be checked when a
//! union is declared. Shapes declared at runtime also *decode* through their
//! schema, producing a [`Record`].
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::{BodyError, DeclarationError, EncodeError};
use crate::literal::json_type_name;
use crate::literal_union::{LiteralUnion, LiteralUnionSpec};

/// A serde struct that can be a type-union variant.
///
/// The schema is written by hand and must describe the struct's wire form.
/// The discriminator is bound against the schema, and registration also
/// decodes each of its allowed tags through the struct, so a schema whose
/// literal union disagrees with the struct's field type is rejected.
pub trait Shape: Serialize + DeserializeOwned + 'static {
    fn schema() -> ShapeSchema;

    /// Name of the field whose literal value identifies this shape, if any.
    fn discriminator() -> Option<&'static str> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Any,
    Null,
    Bool,
    Integer,
    Number,
    String,
    Object,
    Array(Box<FieldType>),
    Nullable(Box<FieldType>),
    Literal(LiteralUnionSpec),
    Shape(Box<ShapeSchema>),
}

impl FieldType {
    pub fn array(item: FieldType) -> Self {
        FieldType::Array(Box::new(item))
    }

    pub fn nullable(inner: FieldType) -> Self {
        FieldType::Nullable(Box::new(inner))
    }

    pub fn literal<L: LiteralUnion>() -> Self {
        FieldType::Literal(L::spec().clone())
    }

    pub fn shape<S: Shape>() -> Self {
        FieldType::Shape(Box::new(S::schema()))
    }

    pub fn describe(&self) -> String {
        match self {
            FieldType::Any => "any".into(),
            FieldType::Null => "null".into(),
            FieldType::Bool => "boolean".into(),
            FieldType::Integer => "integer".into(),
            FieldType::Number => "number".into(),
            FieldType::String => "string".into(),
            FieldType::Object => "object".into(),
            FieldType::Array(item) => format!("array of {}", item.describe()),
            FieldType::Nullable(inner) => format!("{} or null", inner.describe()),
            FieldType::Literal(spec) => format!("literal union `{}`", spec.name()),
            FieldType::Shape(schema) => format!("shape `{}`", schema.name()),
        }
    }

    /// Check `value` against this type, returning the normalized value
    /// (nested shapes drop undeclared fields).
    fn check(&self, value: &Value, path: &str) -> Result<Value, BodyError> {
        let ok = match (self, value) {
            (FieldType::Any, _) => true,
            (FieldType::Null, Value::Null) => true,
            (FieldType::Bool, Value::Bool(_)) => true,
            (FieldType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (FieldType::Number, Value::Number(_)) => true,
            (FieldType::String, Value::String(_)) => true,
            (FieldType::Object, Value::Object(_)) => true,
            (FieldType::Array(item), Value::Array(xs)) => {
                let mut out = Vec::with_capacity(xs.len());
                for (i, x) in xs.iter().enumerate() {
                    out.push(item.check(x, &index_path(path, i))?);
                }
                return Ok(Value::Array(out));
            }
            (FieldType::Nullable(_), Value::Null) => true,
            (FieldType::Nullable(inner), _) => return inner.check(value, path),
            (FieldType::Literal(spec), _) => {
                spec.decode_index(value)
                    .map_err(|e| BodyError::new(path, e.to_string()))?;
                true
            }
            (FieldType::Shape(schema), _) => {
                let record = schema.decode_value(value, path)?;
                return Ok(Value::Object(record.fields.into_iter().collect()));
            }
            _ => false,
        };
        if ok {
            Ok(value.clone())
        } else {
            Err(BodyError::new(
                path,
                format!("invalid type: {}, expected {}", json_type_name(value), self.describe()),
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    pub required: bool, // absent or null is allowed when false
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSchema {
    name: String,
    fields: Vec<Field>,
}

/// A runtime-declared shape's decoded payload: declared fields only, in
/// declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub shape: String,
    pub fields: IndexMap<String, Value>,
}

impl ShapeSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    /// Builder: add (or replace) a required field.
    pub fn field(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.with(Field { name: name.into(), ty, required: true })
    }

    /// Builder: add (or replace) an optional field.
    pub fn optional(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.with(Field { name: name.into(), ty, required: false })
    }

    fn with(mut self, field: Field) -> Self {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(slot) => *slot = field,
            None => self.fields.push(field),
        }
        self
    }

    /// Add a field, rejecting a repeated name.
    pub fn push(&mut self, field: Field) -> Result<(), DeclarationError> {
        if self.get(&field.name).is_some() {
            return Err(DeclarationError::DuplicateField {
                shape: self.name.clone(),
                field: field.name,
            });
        }
        self.fields.push(field);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Decode a whole document as this shape. Undeclared fields are ignored.
    pub fn decode(&self, doc: &Document<'_>) -> Result<Record, BodyError> {
        self.decode_value(doc.root(), ".")
    }

    fn decode_value(&self, value: &Value, path: &str) -> Result<Record, BodyError> {
        let Value::Object(object) = value else {
            return Err(BodyError::new(
                path,
                format!("invalid type: {}, expected shape `{}`", json_type_name(value), self.name),
            ));
        };
        let mut fields = IndexMap::with_capacity(self.fields.len());
        for field in &self.fields {
            let field_path = field_path(path, &field.name);
            match object.get(&field.name) {
                None if field.required => {
                    return Err(BodyError::new(path, format!("missing field `{}`", field.name)));
                }
                None => {}
                Some(Value::Null)
                    if !field.required && !matches!(field.ty, FieldType::Nullable(_) | FieldType::Null | FieldType::Any) => {}
                Some(v) => {
                    fields.insert(field.name.clone(), field.ty.check(v, &field_path)?);
                }
            }
        }
        Ok(Record { shape: self.name.clone(), fields })
    }

    /// Encode a record as an object in declared field order.
    pub fn encode(&self, record: &Record) -> Result<Value, EncodeError> {
        let mut out = Map::new();
        for field in &self.fields {
            match record.fields.get(&field.name) {
                Some(v) => {
                    out.insert(field.name.clone(), v.clone());
                }
                None if field.required => {
                    return Err(EncodeError::Serialize {
                        shape: self.name.clone(),
                        message: format!("missing field `{}`", field.name),
                    });
                }
                None => {}
            }
        }
        Ok(Value::Object(out))
    }
}

fn field_path(parent: &str, name: &str) -> String {
    if parent == "." { name.to_string() } else { format!("{parent}.{name}") }
}

fn index_path(parent: &str, i: usize) -> String {
    if parent == "." { format!("[{i}]") } else { format!("{parent}[{i}]") }
}
