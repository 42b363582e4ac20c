//! Decode dispatcher: picks which variant of a type union a document is.
//!
//! 1. Variants that carry a discriminator are checked first, in declared
//!    order. A recognized tag commits to that variant: its body either
//!    decodes or the whole decode fails with
//!    [`DecodeError::DiscriminatorMatchedButBodyInvalid`].
//! 2. Otherwise every variant is tried in declared order and the first one
//!    whose decoder accepts the document wins. When several shapes accept
//!    the same document, the earlier declaration is chosen.
//! 3. If nothing accepts it, [`DecodeError::NoMatchingVariant`] lists why
//!    each variant refused.
use tracing::{debug, trace};

use crate::discriminator::TagMatch;
use crate::document::Document;
use crate::error::{DecodeError, VariantFailure};
use crate::type_union::Variant;

/// How the dispatcher reached its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Discriminator,
    Fallback,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::Discriminator => "discriminator",
            Route::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    /// Index of the winning variant in declared order.
    pub variant: usize,
    pub route: Route,
    pub value: T,
}

pub fn dispatch<T>(
    union: &str,
    variants: &[Variant<T>],
    doc: &Document<'_>,
) -> Result<Decoded<T>, DecodeError> {
    let discriminated = variants
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.discriminator().map(|b| (i, v, b)));

    for (index, variant, binding) in discriminated {
        match binding.classify(doc) {
            TagMatch::Recognized(tag) => {
                debug!(union, variant = variant.name(), %tag, "discriminator matched");
                return match variant.decode(doc) {
                    Ok(value) => Ok(Decoded { variant: index, route: Route::Discriminator, value }),
                    Err(source) => Err(DecodeError::DiscriminatorMatchedButBodyInvalid {
                        union: union.to_string(),
                        variant: variant.name().to_string(),
                        field: binding.field().to_string(),
                        source,
                    }),
                };
            }
            TagMatch::Unrecognized(raw) => {
                trace!(union, variant = variant.name(), %raw, "discriminator value not recognized");
            }
            TagMatch::Absent => {
                trace!(union, variant = variant.name(), field = binding.field(), "discriminator absent");
            }
        }
    }

    let mut attempts = Vec::new();
    for (index, variant) in variants.iter().enumerate() {
        match variant.decode(doc) {
            Ok(value) => {
                debug!(union, variant = variant.name(), "fallback matched");
                return Ok(Decoded { variant: index, route: Route::Fallback, value });
            }
            Err(error) => {
                trace!(%error, "try variant `{}::{}`, failed", union, variant.name());
                attempts.push(VariantFailure { variant: variant.name().to_string(), error });
            }
        }
    }
    Err(DecodeError::NoMatchingVariant { union: union.to_string(), attempts })
}
