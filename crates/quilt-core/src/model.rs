//! Dataset shape as published: `{ name, children: [ { name, children: [ { name, category, value } ] } ] }`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RawNode>>,
}

impl RawNode {
    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: Some(Value::from(value)),
            ..Self::default()
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<RawNode>) -> Self {
        Self {
            name: name.into(),
            children: Some(children),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_json_value(serde_json::from_str(text)?)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_json_value(serde_json::from_slice(bytes)?)
    }

    /// Rejects documents whose top level is not an object; everything below is lenient.
    pub fn from_json_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidDataset {
                message: "top-level dataset must be a JSON object".to_string(),
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    /// `children: []` counts as a leaf.
    pub fn is_leaf(&self) -> bool {
        self.children.as_ref().is_none_or(|c| c.is_empty())
    }

    /// The declared `value`, coerced with [`coerce_value`].
    pub fn declared_value(&self) -> f64 {
        self.value.as_ref().map(coerce_value).unwrap_or(0.0)
    }
}

/// Coerces a loosely typed JSON `value` into a non-negative, finite weight.
///
/// The published dataset stores sales figures as strings (`"82.74"`), so numeric strings are
/// accepted. Anything that does not produce a finite, non-negative number weighs `0`.
pub fn coerce_value(v: &Value) -> f64 {
    let n = match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    };
    if n.is_finite() && n > 0.0 {
        n
    } else {
        if n != 0.0 {
            tracing::debug!(value = %v, "treating out-of-range value as 0");
        }
        0.0
    }
}
