//! Schema-less document tree shared by the YAML and JSON codecs.
//!
//! Versioning documents are decoded into a [`Node`] tree, navigated with a
//! [`DocumentPath`], and encoded back. Mappings keep their key order.

pub mod codec;
pub mod path;

pub use codec::{decode, encode, read_document, write_document, DocumentFormat};
pub use path::DocumentPath;

use indexmap::IndexMap;
use serde::Serialize;

/// Ordered string-keyed mapping
pub type Mapping = IndexMap<String, Node>;

/// A node of a decoded document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(Mapping),
}

/// Leaf value of a document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    String(String),
}

impl Node {
    pub fn string(value: impl Into<String>) -> Self {
        Node::Scalar(Scalar::String(value.into()))
    }

    /// The text of a string leaf; `None` for every other node
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Node::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Convert a YAML value. Mapping keys must be scalars; they are rendered
    /// as strings.
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self, String> {
        use serde_yaml::Value;

        Ok(match value {
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Node::Scalar(yaml_number(&n)),
            Value::String(s) => Node::string(s),
            Value::Sequence(items) => Node::Sequence(
                items
                    .into_iter()
                    .map(Node::from_yaml)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Mapping(map) => {
                let mut out = Mapping::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(yaml_key(key)?, Node::from_yaml(value)?);
                }
                Node::Mapping(out)
            }
            Value::Tagged(tagged) => Node::from_yaml(tagged.value)?,
        })
    }

    /// Convert a JSON value
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Node::Scalar(if let Some(i) = n.as_i64() {
                Scalar::Integer(i)
            } else if let Some(u) = n.as_u64() {
                Scalar::Unsigned(u)
            } else {
                Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
            }),
            Value::String(s) => Node::string(s),
            Value::Array(items) => Node::Sequence(items.into_iter().map(Node::from_json).collect()),
            Value::Object(map) => Node::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, Node::from_json(v)))
                    .collect(),
            ),
        }
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Integer(i)
    } else if let Some(u) = n.as_u64() {
        Scalar::Unsigned(u)
    } else {
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, String> {
    use serde_yaml::Value;

    match key {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Tagged(tagged) => yaml_key(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => {
            Err("complex mapping keys are not supported".to_string())
        }
    }
}
