//! Mock value synthesis.
//!
//! Walks a [`TypeDesc`] and builds one representative sample value per shape:
//! - primitives → fixed number / boolean, strings from the injected generator
//! - arrays → exactly one element (or none when the element type is absent)
//! - objects → one entry per field, declaration order kept
//! - all-literal unions → the unquoted literals, as a list of options
//! - anything unrecognized → `null`, never an error
//!
//! Synthesis is pure: the same description and settings give the same value.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::{debug, trace};

use crate::ir::{self, PropertyBag, Primitive, TypeDesc, Variant};
use crate::strgen::{Placeholder, StringGenerator};

pub const DEFAULT_MAX_DEPTH: usize = 32;
pub const DEFAULT_NUMBER: i64 = 123;
pub const DEFAULT_BOOLEAN: bool = true;

/// What a union that is not all string literals turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum UnionPolicy {
    /// Degrade to `null`, same as an unknown shape.
    #[default]
    Null,
    /// Synthesize the first variant; a literal first variant gives its unquoted text.
    FirstVariant,
}

pub struct Synthesizer {
    strings: Box<dyn StringGenerator>,
    union_policy: UnionPolicy,
    max_depth: usize,
    number: Number,
    boolean: bool,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(Box::new(Placeholder::default()))
    }
}

impl Synthesizer {
    pub fn new(strings: Box<dyn StringGenerator>) -> Self {
        Self {
            strings,
            union_policy: UnionPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            number: Number::from(DEFAULT_NUMBER),
            boolean: DEFAULT_BOOLEAN,
        }
    }

    pub fn with_union_policy(mut self, policy: UnionPolicy) -> Self {
        self.union_policy = policy;
        self
    }

    /// Values nested deeper than `max_depth` below the root become `null`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_number(mut self, number: Number) -> Self {
        self.number = number;
        self
    }

    pub fn with_boolean(mut self, boolean: bool) -> Self {
        self.boolean = boolean;
        self
    }

    /// Sample value for a single description declared under `field_name`.
    pub fn synthesize(&self, ty: &TypeDesc, field_name: Option<&str>) -> Value {
        self.synth_at(ty, field_name, 0)
    }

    /// One sample per property, same keys in the same order.
    pub fn synthesize_props(&self, props: &PropertyBag) -> Map<String, Value> {
        props
            .iter()
            .map(|(name, ty)| (name.clone(), self.synthesize(ty, Some(name))))
            .collect()
    }

    fn synth_at(&self, ty: &TypeDesc, field_name: Option<&str>, depth: usize) -> Value {
        if depth > self.max_depth {
            debug!(depth, field = field_name, "depth limit reached, degrading to null");
            return Value::Null;
        }
        match ty {
            TypeDesc::Primitive(Primitive::String) => Value::String(self.strings.generate(field_name)),
            TypeDesc::Primitive(Primitive::Number) => Value::Number(self.number.clone()),
            TypeDesc::Primitive(Primitive::Boolean) => Value::Bool(self.boolean),
            // array elements are named after the array field (`tags` → tag values)
            TypeDesc::Array(Some(element)) => Value::Array(vec![self.synth_at(element, field_name, depth + 1)]),
            TypeDesc::Array(None) => Value::Array(Vec::new()),
            TypeDesc::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|f| (f.name.clone(), self.synth_at(&f.ty, Some(&f.name), depth + 1)))
                    .collect(),
            ),
            TypeDesc::Union(variants) => self.synth_union(variants, field_name, depth),
            TypeDesc::Unknown => {
                trace!(field = field_name, "unknown shape, degrading to null");
                Value::Null
            }
        }
    }

    fn synth_union(&self, variants: &[Variant], field_name: Option<&str>, depth: usize) -> Value {
        if ir::is_literal_union(variants) {
            return Value::Array(
                variants
                    .iter()
                    .filter_map(|v| match v {
                        Variant::Literal(text) => Some(Value::String(ir::unquote(text).to_string())),
                        Variant::Type(_) => None,
                    })
                    .collect(),
            );
        }
        match (self.union_policy, variants.first()) {
            (UnionPolicy::FirstVariant, Some(Variant::Literal(text))) => Value::String(ir::unquote(text).to_string()),
            (UnionPolicy::FirstVariant, Some(Variant::Type(ty))) => self.synth_at(ty, field_name, depth + 1),
            (UnionPolicy::FirstVariant, None) | (UnionPolicy::Null, _) => {
                trace!(field = field_name, variants = variants.len(), "general union, degrading to null");
                Value::Null
            }
        }
    }
}
