//! Node representation in the entity graph

use super::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique identifier for a node, typically a resource path like "patient/1"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a NodeId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Typed payload values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<PropertyValue>),
    Object(BTreeMap<String, PropertyValue>),
    Null,
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Int(n)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Float(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

/// Payload collection, keyed in sorted order so exports are stable
pub type Properties = BTreeMap<String, PropertyValue>;

/// An entity in the graph: a patient, an observation, an imaging study...
///
/// `id` and `kind` are fixed at creation. The payload may be enriched later
/// through [`Node::update_payload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode")]
pub struct Node {
    id: NodeId,
    /// Open-ended category tag (e.g., "Patient", "Observation", "ImagingStudy")
    kind: String,
    #[serde(default)]
    payload: Properties,
}

impl Node {
    /// Create a node with an empty payload
    pub fn new(id: impl Into<NodeId>, kind: impl Into<String>) -> Result<Self, ValidationError> {
        Self::create(id, kind, Properties::new())
    }

    /// Create a node with the given payload
    pub fn create(
        id: impl Into<NodeId>,
        kind: impl Into<String>,
        payload: Properties,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::EmptyNodeId);
        }
        Ok(Self {
            id,
            kind: kind.into(),
            payload,
        })
    }

    /// Add a payload field
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn payload(&self) -> &Properties {
        &self.payload
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.payload.get(key)
    }

    /// Overwrite payload fields with the entries of `merge`.
    ///
    /// Keys absent from `merge` are left untouched.
    pub fn update_payload(&mut self, merge: Properties) {
        self.payload.extend(merge);
    }
}

#[derive(Deserialize)]
struct RawNode {
    id: NodeId,
    kind: String,
    #[serde(default)]
    payload: Properties,
}

impl TryFrom<RawNode> for Node {
    type Error = ValidationError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        Node::create(raw.id, raw.kind, raw.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_is_rejected() {
        assert_eq!(Node::new("", "Patient").unwrap_err(), ValidationError::EmptyNodeId);
    }

    #[test]
    fn update_payload_overwrites_only_merged_keys() {
        let mut node = Node::new("patient/1", "Patient")
            .unwrap()
            .with_property("family", "Nakamura")
            .with_property("birth_year", 1961_i64);

        let mut merge = Properties::new();
        merge.insert("birth_year".into(), PropertyValue::Int(1962));
        merge.insert("deceased".into(), PropertyValue::Bool(false));
        node.update_payload(merge);

        assert_eq!(node.id().as_str(), "patient/1");
        assert_eq!(node.kind(), "Patient");
        assert_eq!(node.property("family"), Some(&PropertyValue::from("Nakamura")));
        assert_eq!(node.property("birth_year"), Some(&PropertyValue::Int(1962)));
        assert_eq!(node.property("deceased"), Some(&PropertyValue::Bool(false)));
    }

    #[test]
    fn payload_values_keep_their_shape_through_json() {
        let node = Node::new("obs/1", "Observation")
            .unwrap()
            .with_property("value", 7.2_f64)
            .with_property("unit", "mmol/L")
            .with_property("interpretation", PropertyValue::Null);

        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
