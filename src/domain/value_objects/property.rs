//! Declared property values
//!
//! Inputs of a resource may embed references to outputs of other resources.
//! Those references are what build the dependency graph, and they stay
//! unresolved until the referenced resource has been applied (or read back).

use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::{Secret, Urn};

/// JSON form of a value as it is diffed and persisted.
///
/// Secrets appear only as `{"secret": "sha256:..."}`.
pub type Fingerprint = Value;

/// A reference to output `key` of resource `urn`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputRef {
    pub urn: Urn,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
    Secret(Secret),
    Output(OutputRef),
}

impl PropertyValue {
    pub fn output(urn: &Urn, key: impl Into<String>) -> Self {
        PropertyValue::Output(OutputRef {
            urn: urn.clone(),
            key: key.into(),
        })
    }

    pub fn map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, PropertyValue)>,
        K: Into<String>,
    {
        PropertyValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn list(items: impl IntoIterator<Item = PropertyValue>) -> Self {
        PropertyValue::List(items.into_iter().collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_secret(&self) -> Option<&Secret> {
        match self {
            PropertyValue::Secret(s) => Some(s),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        match self {
            PropertyValue::Map(m) => m.get(key),
            _ => None,
        }
    }

    /// All output references, depth-first in declaration order
    pub fn references(&self) -> Vec<&OutputRef> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a OutputRef>) {
        match self {
            PropertyValue::Output(r) => out.push(r),
            PropertyValue::List(items) => items.iter().for_each(|v| v.collect_references(out)),
            PropertyValue::Map(m) => m.values().for_each(|v| v.collect_references(out)),
            _ => {}
        }
    }

    /// Substitute every output reference through `lookup`
    pub fn resolve<E>(
        &self,
        lookup: &mut impl FnMut(&OutputRef) -> Result<PropertyValue, E>,
    ) -> Result<PropertyValue, E> {
        Ok(match self {
            PropertyValue::Output(r) => lookup(r)?,
            PropertyValue::List(items) => PropertyValue::List(
                items
                    .iter()
                    .map(|v| v.resolve(lookup))
                    .collect::<Result<_, _>>()?,
            ),
            PropertyValue::Map(m) => PropertyValue::Map(
                m.iter()
                    .map(|(k, v)| Ok((k.clone(), v.resolve(lookup)?)))
                    .collect::<Result<_, _>>()?,
            ),
            other => other.clone(),
        })
    }

    /// Fingerprint of a fully resolved value; `None` if a reference remains
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint_with(&|_| None)
    }

    /// Fingerprint, resolving references to already-known fingerprints.
    ///
    /// Returns `None` when any reference is unknown.
    pub fn fingerprint_with(
        &self,
        lookup: &impl Fn(&OutputRef) -> Option<Fingerprint>,
    ) -> Option<Fingerprint> {
        Some(match self {
            PropertyValue::Bool(b) => json!(b),
            PropertyValue::Int(i) => json!(i),
            PropertyValue::String(s) => json!(s),
            PropertyValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|v| v.fingerprint_with(lookup))
                    .collect::<Option<_>>()?,
            ),
            PropertyValue::Map(m) => Value::Object(
                m.iter()
                    .map(|(k, v)| Some((k.clone(), v.fingerprint_with(lookup)?)))
                    .collect::<Option<_>>()?,
            ),
            PropertyValue::Secret(s) => json!({ "secret": s.fingerprint().as_str() }),
            PropertyValue::Output(r) => lookup(r)?,
        })
    }

    /// Plain JSON with secrets in the clear, for provider request bodies only
    pub fn to_exposed_json(&self) -> Option<Value> {
        Some(match self {
            PropertyValue::Bool(b) => json!(b),
            PropertyValue::Int(i) => json!(i),
            PropertyValue::String(s) => json!(s),
            PropertyValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|v| v.to_exposed_json())
                    .collect::<Option<_>>()?,
            ),
            PropertyValue::Map(m) => Value::Object(
                m.iter()
                    .map(|(k, v)| Some((k.clone(), v.to_exposed_json()?)))
                    .collect::<Option<_>>()?,
            ),
            PropertyValue::Secret(s) => json!(s.expose()),
            PropertyValue::Output(_) => return None,
        })
    }
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

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<u16> for PropertyValue {
    fn from(i: u16) -> Self {
        PropertyValue::Int(i64::from(i))
    }
}

impl From<u32> for PropertyValue {
    fn from(i: u32) -> Self {
        PropertyValue::Int(i64::from(i))
    }
}

impl From<Secret> for PropertyValue {
    fn from(s: Secret) -> Self {
        PropertyValue::Secret(s)
    }
}
