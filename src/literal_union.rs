//! Literal unions: a closed, ordered set of scalar constants treated as one type.
//!
//! On the wire a literal union is the bare scalar. A union whose literals all
//! share one kind is *homogeneous* and reads the wire value strictly as that
//! kind; otherwise it is *mixed* and tries each declared literal's own kind
//! in declaration order.
use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{DecodeError, DeclarationError, EncodeError};
use crate::literal::{json_type_name, LiteralValue, ScalarKind};

static NON_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("identifier pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Homogeneous(ScalarKind),
    Mixed,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Representation::Homogeneous(kind) => write!(f, "homogeneous({kind})"),
            Representation::Mixed => f.write_str("mixed"),
        }
    }
}

/// One declared literal and its stable case identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralCase {
    pub identifier: String,
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralUnionSpec {
    name: String,
    cases: Vec<LiteralCase>,
    index: IndexMap<LiteralValue, usize>,
    representation: Representation,
}

impl LiteralUnionSpec {
    /// Declare a literal union. Fails on an empty set or a repeated literal.
    pub fn new<I, L>(name: impl Into<String>, literals: I) -> Result<Self, DeclarationError>
    where
        I: IntoIterator<Item = L>,
        L: Into<LiteralValue>,
    {
        let name = name.into();
        let mut index = IndexMap::new();
        for literal in literals {
            let literal = literal.into();
            if index.contains_key(&literal) {
                return Err(DeclarationError::DuplicateLiteral {
                    union: name,
                    literal: literal.to_string(),
                });
            }
            let at = index.len();
            index.insert(literal, at);
        }
        let Some(first) = index.keys().next() else {
            return Err(DeclarationError::EmptyUnion { union: name });
        };
        let first_kind = first.kind();
        let representation = if index.keys().all(|l| l.kind() == first_kind) {
            Representation::Homogeneous(first_kind)
        } else {
            Representation::Mixed
        };
        let identifiers = derive_identifiers(index.keys());
        let cases = index
            .keys()
            .cloned()
            .zip(identifiers)
            .map(|(value, identifier)| LiteralCase { identifier, value })
            .collect();
        Ok(Self { name, cases, index, representation })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    pub fn cases(&self) -> &[LiteralCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn literals(&self) -> impl Iterator<Item = &LiteralValue> {
        self.cases.iter().map(|c| &c.value)
    }

    pub fn contains(&self, literal: &LiteralValue) -> bool {
        self.index.contains_key(literal)
    }

    pub fn index_of(&self, literal: &LiteralValue) -> Option<usize> {
        self.index.get(literal).copied()
    }

    pub fn case_identifiers(&self) -> Vec<&str> {
        self.cases.iter().map(|c| c.identifier.as_str()).collect()
    }

    /// Wire scalar of the case named `identifier`.
    pub fn wire_value_for(&self, identifier: &str) -> Option<Value> {
        self.cases
            .iter()
            .find(|c| c.identifier == identifier)
            .map(|c| c.value.to_wire())
    }

    /// The declared case a wire scalar decodes to.
    pub fn case_for(&self, wire: &Value) -> Result<&LiteralCase, DecodeError> {
        self.decode_index(wire).map(|i| &self.cases[i])
    }

    pub fn decode(&self, wire: &Value) -> Result<LiteralValue, DecodeError> {
        self.case_for(wire).map(|c| c.value.clone())
    }

    /// Position (in declaration order) of the literal `wire` decodes to.
    pub fn decode_index(&self, wire: &Value) -> Result<usize, DecodeError> {
        match self.representation {
            Representation::Homogeneous(kind) => {
                let read = kind.read(wire).ok_or_else(|| self.type_mismatch(wire))?;
                self.index_of(&read).ok_or_else(|| self.unknown_literal(wire))
            }
            Representation::Mixed => {
                // a literal of the wire value's own JSON type wins over a cross-kind read
                if let Some(natural) = LiteralValue::from_wire(wire) {
                    if let Some(i) = self.index_of(&natural) {
                        return Ok(i);
                    }
                }
                let mut readable = false;
                for (i, case) in self.cases.iter().enumerate() {
                    if let Some(read) = case.value.kind().read(wire) {
                        readable = true;
                        if read == case.value {
                            return Ok(i);
                        }
                    }
                }
                if readable {
                    Err(self.unknown_literal(wire))
                } else {
                    Err(self.type_mismatch(wire))
                }
            }
        }
    }

    pub fn encode(&self, literal: &LiteralValue) -> Result<Value, EncodeError> {
        if !self.contains(literal) {
            return Err(EncodeError::UnknownLiteral {
                union: self.name.clone(),
                literal: literal.to_string(),
            });
        }
        Ok(literal.to_wire())
    }

    /// Accepted kinds, first-declared first, e.g. `string | integer`.
    pub fn expected(&self) -> String {
        match self.representation {
            Representation::Homogeneous(kind) => kind.to_string(),
            Representation::Mixed => {
                let mut kinds: Vec<ScalarKind> = Vec::new();
                for l in self.literals() {
                    if !kinds.contains(&l.kind()) {
                        kinds.push(l.kind());
                    }
                }
                kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(" | ")
            }
        }
    }

    fn type_mismatch(&self, wire: &Value) -> DecodeError {
        DecodeError::TypeMismatch {
            union: self.name.clone(),
            expected: self.expected(),
            found: json_type_name(wire),
        }
    }

    fn unknown_literal(&self, wire: &Value) -> DecodeError {
        DecodeError::UnknownLiteral { union: self.name.clone(), value: wire.clone() }
    }
}

/// A Rust enum whose variants are the cases of one literal union, in
/// declaration order. Usually produced by [`literal_union!`](crate::literal_union!).
pub trait LiteralUnion: Sized + Copy + 'static {
    fn spec() -> &'static LiteralUnionSpec;

    fn case_index(self) -> usize;

    fn from_case_index(index: usize) -> Option<Self>;

    fn literal(self) -> &'static LiteralValue {
        &Self::spec().cases()[self.case_index()].value
    }

    fn identifier(self) -> &'static str {
        &Self::spec().cases()[self.case_index()].identifier
    }

    fn to_wire(self) -> Value {
        self.literal().to_wire()
    }

    fn from_wire(wire: &Value) -> Result<Self, DecodeError> {
        let spec = Self::spec();
        let index = spec.decode_index(wire)?;
        Self::from_case_index(index).ok_or_else(|| spec.unknown_literal(wire))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CASE IDENTIFIERS
// ————————————————————————————————————————————————————————————————————————————

fn base_identifier(literal: &LiteralValue) -> String {
    match literal {
        LiteralValue::String(s) => {
            let cleaned = NON_IDENT.replace_all(s, "_");
            let cleaned = cleaned.trim_matches('_');
            let starts_with_digit = cleaned.chars().next().is_some_and(|c| c.is_ascii_digit());
            if cleaned.is_empty() || starts_with_digit {
                format!("str_{cleaned}")
            } else {
                cleaned.to_string()
            }
        }
        LiteralValue::Integer(i) if *i < 0 => format!("int_neg_{}", i.unsigned_abs()),
        LiteralValue::Integer(i) => format!("int_{i}"),
        LiteralValue::Float(x) => {
            let printed = format!("{:?}", x.0).replace('-', "neg_");
            format!("float_{}", NON_IDENT.replace_all(&printed, "_"))
        }
        LiteralValue::Boolean(b) => format!("bool_{b}"),
    }
}

/// Identifiers in declaration order; later collisions get `_2`, `_3`, ...
fn derive_identifiers<'a>(literals: impl Iterator<Item = &'a LiteralValue>) -> Vec<String> {
    let mut taken = HashSet::new();
    let mut out = Vec::new();
    for literal in literals {
        let base = base_identifier(literal);
        let mut candidate = base.clone();
        let mut n = 2;
        while taken.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}
