//! Language-neutral syntax trees and their schema-driven JSON export.
//!
//! A frontend converts its native syntax tree into [`AstNode`]s whose leaves are
//! [`Token`]s. An [`AstSchema`] fixes, per node kind, which fields are exported
//! and in which order; [`AstSchema::export`] renders a tree as
//!
//! ```json
//! {"Constructor": "LocalStmt", "Fields": {"let_token": {"Constructor": "SyntaxToken", "Value": "let", "Position": 0}, ...}}
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{Error, Result};
use crate::token::{Token, TokenIndex};

/// Value of a field of an [`AstNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstValue {
    Node(AstNode),
    Token(Token),
    List(Vec<AstValue>),
    Absent,
}

impl From<AstNode> for AstValue {
    fn from(node: AstNode) -> Self {
        Self::Node(node)
    }
}

impl From<Token> for AstValue {
    fn from(token: Token) -> Self {
        Self::Token(token)
    }
}

impl<T: Into<AstValue>> From<Option<T>> for AstValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

/// A syntax node: a kind and named fields in natural order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub kind: String,
    pub fields: Vec<(String, AstValue)>,
}

impl AstNode {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field append.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<AstValue>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&AstValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// All token leaves, depth-first in field order.
    #[must_use]
    pub fn tokens(&self) -> Vec<&Token> {
        fn walk<'a>(value: &'a AstValue, out: &mut Vec<&'a Token>) {
            match value {
                AstValue::Node(node) => {
                    for (_, v) in &node.fields {
                        walk(v, out);
                    }
                }
                AstValue::Token(t) => out.push(t),
                AstValue::List(items) => items.iter().for_each(|v| walk(v, out)),
                AstValue::Absent => {}
            }
        }
        let mut out = Vec::new();
        for (_, v) in &self.fields {
            walk(v, &mut out);
        }
        out
    }
}

/// How a schema field is exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Token,
    Node,
    List,
}

impl FieldKind {
    /// Classify a grammar type name: anything mentioning `List` is a list,
    /// anything mentioning `Token` is a token, everything else a node.
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        if name.contains("List") {
            Self::List
        } else if name.contains("Token") {
            Self::Token
        } else {
            Self::Node
        }
    }

    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Token => "Token",
            Self::Node => "Node",
            Self::List => "List",
        }
    }
}

/// One exported field of a node kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
}

#[derive(Debug, Serialize, Deserialize)]
struct GrammarEntry {
    constructor: String,
    fields: Vec<GrammarField>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GrammarField {
    name: String,
    #[serde(rename = "type")]
    ty: String,
}

/// Registry `node kind → ordered fields`.
#[derive(Debug, Clone, Default)]
pub struct AstSchema {
    kinds: HashMap<String, Vec<FieldDescriptor>>,
    order: Vec<String>,
}

impl AstSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a kind.
    pub fn insert(&mut self, kind: &str, fields: &[(&str, FieldKind)]) {
        let fields = fields
            .iter()
            .map(|(name, kind)| FieldDescriptor {
                name: (*name).to_string(),
                kind: *kind,
            })
            .collect();
        if self.kinds.insert(kind.to_string(), fields).is_none() {
            self.order.push(kind.to_string());
        }
    }

    #[must_use]
    pub fn fields(&self, kind: &str) -> Option<&[FieldDescriptor]> {
        self.kinds.get(kind).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Parse a grammar document `[{"constructor": .., "fields": [{"name": .., "type": ..}]}]`.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let entries: Vec<GrammarEntry> = serde_json::from_str(text)?;
        let mut schema = Self::new();
        for entry in entries {
            let fields: Vec<_> = entry
                .fields
                .iter()
                .map(|f| (f.name.as_str(), FieldKind::from_type_name(&f.ty)))
                .collect();
            schema.insert(&entry.constructor, &fields);
        }
        Ok(schema)
    }

    /// Load a grammar file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text).map_err(|e| Error::Grammar {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The schema as a grammar document, kinds in registration order.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let entries: Vec<GrammarEntry> = self
            .order
            .iter()
            .map(|kind| GrammarEntry {
                constructor: kind.clone(),
                fields: self.kinds[kind]
                    .iter()
                    .map(|f| GrammarField {
                        name: f.name.clone(),
                        ty: f.kind.type_name().to_string(),
                    })
                    .collect(),
            })
            .collect();
        serde_json::to_value(entries).unwrap_or(Value::Null)
    }

    /// Export `value` as JSON, annotating tokens with their position in `index`.
    #[must_use]
    pub fn export(&self, value: &AstValue, index: &TokenIndex) -> Value {
        match value {
            AstValue::Absent => Value::Null,
            AstValue::Token(token) => json!({
                "Constructor": "SyntaxToken",
                "Value": token.text,
                "Position": index.position_of(token.span),
            }),
            AstValue::List(items) => {
                Value::Array(items.iter().map(|v| self.export(v, index)).collect())
            }
            AstValue::Node(node) => self.export_node(node, index),
        }
    }

    fn export_node(&self, node: &AstNode, index: &TokenIndex) -> Value {
        let mut fields = Map::new();
        match self.kinds.get(&node.kind) {
            Some(descriptors) => {
                for desc in descriptors {
                    let value = node.field(&desc.name).unwrap_or(&AstValue::Absent);
                    let exported = match (desc.kind, value) {
                        (FieldKind::List, AstValue::List(_)) => self.export(value, index),
                        (FieldKind::List, AstValue::Absent) => Value::Array(Vec::new()),
                        (FieldKind::List, single) => {
                            Value::Array(vec![self.export(single, index)])
                        }
                        _ => self.export(value, index),
                    };
                    fields.insert(desc.name.clone(), exported);
                }
            }
            None => {
                for (name, value) in &node.fields {
                    fields.insert(name.clone(), self.export(value, index));
                }
            }
        }
        json!({
            "Constructor": node.kind,
            "Fields": Value::Object(fields),
        })
    }
}
