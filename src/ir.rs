// Structural type descriptions consumed by the synthesizer. Built once, never mutated.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::path_de::{self, DecodeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    String,
    Number,
    Boolean,
}

/// Decoding never fails: any node that cannot be read becomes [`TypeDesc::Unknown`]
/// on its own, leaving its siblings intact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "RawDesc")]
pub enum TypeDesc {
    Primitive(Primitive),
    Array(Option<Box<TypeDesc>>), // None: untyped array
    Object(Vec<Field>),           // declaration order, names unique
    Union(Vec<Variant>),
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDesc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Variant {
    /// Textual form as printed by the type checker, quotes included (`"admin"`).
    Literal(String),
    Type(TypeDesc),
}

/// Component input names → declared types, in declaration order.
pub type PropertyBag = IndexMap<String, TypeDesc>;

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTORS
// ————————————————————————————————————————————————————————————————————————————

impl TypeDesc {
    pub fn string() -> Self { TypeDesc::Primitive(Primitive::String) }
    pub fn number() -> Self { TypeDesc::Primitive(Primitive::Number) }
    pub fn boolean() -> Self { TypeDesc::Primitive(Primitive::Boolean) }

    pub fn array_of(element: TypeDesc) -> Self {
        TypeDesc::Array(Some(Box::new(element)))
    }

    /// Later duplicates of a field name are dropped.
    pub fn object<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, TypeDesc)>,
        S: Into<String>,
    {
        TypeDesc::Object(dedup_fields(
            fields.into_iter().map(|(name, ty)| Field { name: name.into(), ty }),
        ))
    }

    /// Union of literal texts, e.g. `["\"admin\"", "\"guest\""]`.
    pub fn literal_union<I, S>(literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeDesc::Union(literals.into_iter().map(|s| Variant::Literal(s.into())).collect())
    }
}

fn dedup_fields(fields: impl Iterator<Item = Field>) -> Vec<Field> {
    let mut seen = HashSet::new();
    fields.filter(|f| seen.insert(f.name.clone())).collect()
}

// ————————————————————————————————————————————————————————————————————————————
// LITERAL UNIONS
// ————————————————————————————————————————————————————————————————————————————

/// True for a non-empty union whose every variant is a literal.
pub fn is_literal_union(variants: &[Variant]) -> bool {
    !variants.is_empty() && variants.iter().all(|v| matches!(v, Variant::Literal(_)))
}

/// Strip one layer of matching surrounding quotes (`"`, `'` or backtick).
pub fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && matches!(first, b'"' | b'\'' | b'`') {
            return &text[1..text.len() - 1];
        }
    }
    text
}

// ————————————————————————————————————————————————————————————————————————————
// JSON ENCODING
// ————————————————————————————————————————————————————————————————————————————

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawDesc {
    String,
    Number,
    Boolean,
    Array {
        #[serde(skip_serializing_if = "Option::is_none")]
        element: Option<Box<TypeDesc>>,
    },
    Object {
        fields: Vec<Field>,
    },
    Union {
        variants: Vec<Variant>,
    },
    Unknown,
}

/// One level of a description; children stay as raw JSON and are decoded
/// separately so a bad child only degrades itself.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawNode {
    String,
    Number,
    Boolean,
    Array {
        #[serde(default)]
        element: Option<Value>,
    },
    Object {
        #[serde(default)]
        fields: Vec<Value>,
    },
    Union {
        #[serde(default)]
        variants: Vec<Value>,
    },
    // any tag we don't know degrades instead of failing the whole document
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize)]
struct RawField {
    name: String,
    #[serde(rename = "type", default)]
    ty: Value,
}

impl<'de> Deserialize<'de> for TypeDesc {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(decode_node)
    }
}

/// Strings are type text; objects are tagged descriptions; anything else is unknown.
fn decode_node(raw: Value) -> TypeDesc {
    match raw {
        Value::String(text) => crate::typetext::parse(&text),
        Value::Object(map) => match serde_json::from_value::<RawNode>(Value::Object(map)) {
            Ok(node) => node.into_desc(),
            Err(error) => {
                debug!(%error, "undecodable type description, degrading to unknown");
                TypeDesc::Unknown
            }
        },
        other => {
            debug!(found = %other, "type description is neither text nor an object");
            TypeDesc::Unknown
        }
    }
}

fn decode_field(raw: Value) -> Option<Field> {
    match serde_json::from_value::<RawField>(raw) {
        Ok(RawField { name, ty }) => Some(Field { name, ty: decode_node(ty) }),
        Err(error) => {
            debug!(%error, "dropping field without a usable name");
            None
        }
    }
}

fn decode_variant(raw: Value) -> Variant {
    match raw {
        Value::String(text) => Variant::Literal(text),
        other => Variant::Type(decode_node(other)),
    }
}

impl RawNode {
    fn into_desc(self) -> TypeDesc {
        match self {
            RawNode::String => TypeDesc::string(),
            RawNode::Number => TypeDesc::number(),
            RawNode::Boolean => TypeDesc::boolean(),
            RawNode::Array { element } => TypeDesc::Array(element.map(|e| Box::new(decode_node(e)))),
            RawNode::Object { fields } => {
                TypeDesc::Object(dedup_fields(fields.into_iter().filter_map(decode_field)))
            }
            RawNode::Union { variants } => TypeDesc::Union(variants.into_iter().map(decode_variant).collect()),
            RawNode::Unknown => TypeDesc::Unknown,
        }
    }
}

impl From<TypeDesc> for RawDesc {
    fn from(ty: TypeDesc) -> Self {
        match ty {
            TypeDesc::Primitive(Primitive::String) => RawDesc::String,
            TypeDesc::Primitive(Primitive::Number) => RawDesc::Number,
            TypeDesc::Primitive(Primitive::Boolean) => RawDesc::Boolean,
            TypeDesc::Array(element) => RawDesc::Array { element },
            TypeDesc::Object(fields) => RawDesc::Object { fields },
            TypeDesc::Union(variants) => RawDesc::Union { variants },
            TypeDesc::Unknown => RawDesc::Unknown,
        }
    }
}

/// Decode a property bag document: a JSON object whose values are either
/// type descriptions or type text strings.
///
/// Only a non-object document is an error. Entries that fail to decode
/// degrade to [`TypeDesc::Unknown`] so their siblings still get values.
pub fn bag_from_value(value: Value) -> Result<PropertyBag, DecodeError> {
    let entries: IndexMap<String, Value> = path_de::from_value_with_path(value)?;
    Ok(entries
        .into_iter()
        .map(|(name, raw)| {
            let ty = decode_entry(&name, raw);
            (name, ty)
        })
        .collect())
}

fn decode_entry(name: &str, raw: Value) -> TypeDesc {
    let ty = decode_node(raw);
    if ty == TypeDesc::Unknown {
        debug!(prop = name, "prop type is unknown");
    }
    ty
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_tagged_descriptions() {
        let ty: TypeDesc = serde_json::from_value(json!({
            "kind": "object",
            "fields": [
                { "name": "tags", "type": { "kind": "array", "element": { "kind": "string" } } },
                { "name": "role", "type": { "kind": "union", "variants": ["\"admin\"", "\"guest\""] } },
                { "name": "raw",  "type": { "kind": "array" } }
            ]
        }))
        .unwrap();
        assert_eq!(
            ty,
            TypeDesc::object([
                ("tags", TypeDesc::array_of(TypeDesc::string())),
                ("role", TypeDesc::literal_union(["\"admin\"", "\"guest\""])),
                ("raw", TypeDesc::Array(None)),
            ])
        );
    }

    #[test]
    fn unknown_kind_degrades() {
        let ty: TypeDesc = serde_json::from_value(json!({ "kind": "function" })).unwrap();
        assert_eq!(ty, TypeDesc::Unknown);
    }

    #[test]
    fn duplicate_field_names_keep_first() {
        let ty: TypeDesc = serde_json::from_value(json!({
            "kind": "object",
            "fields": [
                { "name": "a", "type": { "kind": "string" } },
                { "name": "a", "type": { "kind": "number" } }
            ]
        }))
        .unwrap();
        assert_eq!(ty, TypeDesc::object([("a", TypeDesc::string())]));
    }

    #[test]
    fn mixed_union_variants() {
        let ty: TypeDesc = serde_json::from_value(json!({
            "kind": "union",
            "variants": ["\"on\"", { "kind": "number" }]
        }))
        .unwrap();
        let TypeDesc::Union(variants) = ty else { panic!("expected union") };
        assert_eq!(variants[0], Variant::Literal("\"on\"".into()));
        assert_eq!(variants[1], Variant::Type(TypeDesc::number()));
        assert!(!is_literal_union(&variants));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let out = serde_json::to_value(TypeDesc::array_of(TypeDesc::Unknown)).unwrap();
        assert_eq!(out, json!({ "kind": "array", "element": { "kind": "unknown" } }));
        let out = serde_json::to_value(TypeDesc::Array(None)).unwrap();
        assert_eq!(out, json!({ "kind": "array" }));
    }

    #[test]
    fn unquote_strips_one_matching_layer() {
        assert_eq!(unquote("\"admin\""), "admin");
        assert_eq!(unquote("'guest'"), "guest");
        assert_eq!(unquote("`x`"), "x");
        assert_eq!(unquote("\"\"a\"\""), "\"a\"");
        assert_eq!(unquote("\"mismatch'"), "\"mismatch'");
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("plain"), "plain");
    }

    #[test]
    fn empty_union_is_not_literal() {
        assert!(!is_literal_union(&[]));
    }

    #[test]
    fn bag_mixes_text_and_descriptions() {
        let bag = bag_from_value(json!({
            "name": "string",
            "age": { "kind": "number" },
            "broken": { "no_kind": true },
            "active": "boolean"
        }))
        .unwrap();
        let keys: Vec<&str> = bag.keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "age", "broken", "active"]);
        assert_eq!(bag["name"], TypeDesc::string());
        assert_eq!(bag["age"], TypeDesc::number());
        assert_eq!(bag["broken"], TypeDesc::Unknown);
        assert_eq!(bag["active"], TypeDesc::boolean());
    }

    #[test]
    fn bad_nested_field_degrades_alone() {
        let bag = bag_from_value(json!({
            "user": {
                "kind": "object",
                "fields": [
                    { "name": "name", "type": { "kind": "string" } },
                    { "name": "meta", "type": "Meta" },
                    { "name": "score", "type": 7 },
                    { "name": "tags", "type": { "kind": "array", "element": { "kind": ["string"] } } },
                    { "type": { "kind": "string" } },
                    { "name": "nick" }
                ]
            },
            "mode": { "kind": "union", "variants": ["\"a\"", 5, { "kind": "number" }] }
        }))
        .unwrap();
        assert_eq!(
            bag["user"],
            TypeDesc::object([
                ("name", TypeDesc::string()),
                ("meta", TypeDesc::Unknown),
                ("score", TypeDesc::Unknown),
                ("tags", TypeDesc::array_of(TypeDesc::Unknown)),
                ("nick", TypeDesc::Unknown),
            ])
        );
        assert_eq!(
            bag["mode"],
            TypeDesc::Union(vec![
                Variant::Literal("\"a\"".into()),
                Variant::Type(TypeDesc::Unknown),
                Variant::Type(TypeDesc::number()),
            ])
        );
    }

    #[test]
    fn nested_type_text_is_parsed() {
        let ty: TypeDesc = serde_json::from_value(json!({
            "kind": "object",
            "fields": [{ "name": "ids", "type": "number[]" }]
        }))
        .unwrap();
        assert_eq!(ty, TypeDesc::object([("ids", TypeDesc::array_of(TypeDesc::number()))]));
    }

    #[test]
    fn bag_must_be_an_object() {
        let err = bag_from_value(json!(["string"])).unwrap_err();
        assert!(err.to_string().contains("JSON path"));
    }
}
