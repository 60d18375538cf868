// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The generic node tree layouts are read from.
//!
//! A layout is a tree of named nodes with string attributes. On disk the tree
//! is JSON:
//!
//! ```json
//! { "name": "mamelayout", "attrs": { "version": 2 }, "children": [ ... ] }
//! ```
//!
//! `attrs` and `children` may be omitted. Attribute values may be written as
//! JSON strings, numbers or booleans; they are all read back as text so that
//! `~token~` substitution and the `$hex` / `0x` / `#` number forms apply
//! uniformly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One attribute value as written in the file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// A string.
    Text(String),
    /// A number.
    Number(serde_json::Number),
    /// A boolean, read back as `yes` / `no`.
    Flag(bool),
}

impl AttrValue {
    /// The value as text.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Flag(true) => "yes".to_owned(),
            Self::Flag(false) => "no".to_owned(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        serde_json::Number::from_f64(v).map_or_else(|| Self::Text(v.to_string()), Self::Number)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Number(v.into())
    }
}

/// A named node with attributes and ordered children.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node name.
    pub name: String,
    /// Attributes by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, AttrValue>,
    /// Child nodes in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Creates a node with no attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.to_owned(), value.into());
        self
    }

    /// Builder-style child append.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Raw attribute text, before substitution.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<String> {
        self.attrs.get(name).map(AttrValue::to_text)
    }

    /// Returns `true` if the attribute is present.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// The first child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Parses a tree from its JSON form.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serializes the tree to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
