//! Node metadata for the document tree.

use std::fmt;

use mongodb::bson::Bson;

use crate::bson::{DbRef, PathSegment, bson_to_json_string};

/// What a node is called in its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeLabel {
    /// Synthetic root listing one page of a result set.
    Results { collection: String },
    /// Root of a single document being edited.
    Root,
    /// A document within a result page, numbered from the start of the result set.
    Document { index: usize },
    Key(String),
    Index(usize),
}

impl NodeLabel {
    /// Label text as shown in the key column.
    pub fn text(&self) -> String {
        match self {
            NodeLabel::Results { collection } => format!("results of '{collection}'"),
            NodeLabel::Root => "{}".to_string(),
            NodeLabel::Document { index } | NodeLabel::Index(index) => format!("[{index}]"),
            NodeLabel::Key(key) => format!("\"{key}\""),
        }
    }
}

/// Semantic kind of a node's value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Null,
    Document,
    Array,
    Reference(DbRef),
    /// ObjectId, dates, binary and the remaining BSON scalars.
    Other,
}

impl ValueKind {
    pub fn of(value: &Bson) -> Self {
        match value {
            Bson::String(_) | Bson::Symbol(_) => ValueKind::String,
            Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => {
                ValueKind::Number
            }
            Bson::Boolean(_) => ValueKind::Boolean,
            Bson::Null | Bson::Undefined => ValueKind::Null,
            Bson::Document(doc) => match DbRef::from_document(doc) {
                Some(reference) => ValueKind::Reference(reference),
                None => ValueKind::Document,
            },
            Bson::Array(_) => ValueKind::Array,
            _ => ValueKind::Other,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, ValueKind::Document | ValueKind::Array | ValueKind::Reference(_))
    }
}

/// Display style tag, resolved to colors by [`TextStyle::attributes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Index,
    Key,
    Number,
    Boolean,
    String,
    Null,
    Container,
    Reference,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Plain,
    Bold,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextAttributes {
    pub rgb: (u8, u8, u8),
    pub weight: FontWeight,
}

impl TextStyle {
    pub fn attributes(self) -> TextAttributes {
        let (rgb, weight) = match self {
            TextStyle::Index => ((0, 0, 0), FontWeight::Bold),
            TextStyle::Key => ((102, 14, 122), FontWeight::Bold),
            TextStyle::Number | TextStyle::Boolean => ((0, 0, 255), FontWeight::Plain),
            TextStyle::String => ((0, 128, 0), FontWeight::Plain),
            TextStyle::Null => ((128, 128, 128), FontWeight::Italic),
            TextStyle::Container => ((128, 128, 128), FontWeight::Bold),
            TextStyle::Reference => ((0, 0, 255), FontWeight::Bold),
            TextStyle::Other => ((0, 0, 0), FontWeight::Plain),
        };
        TextAttributes { rgb, weight }
    }
}

/// Metadata for a node in the document tree.
#[derive(Debug, Clone)]
pub struct NodeDescriptor {
    pub label: NodeLabel,
    pub kind: ValueKind,
    /// The stored value for leaves. Containers rebuild theirs from children.
    pub scalar: Option<Bson>,
    /// Display projection of the value, capped at `MAX_LENGTH`.
    pub value_text: String,
    pub type_label: &'static str,
    /// Path from the enclosing document.
    pub path: Vec<PathSegment>,
    pub is_id: bool,
    pub is_editable: bool,
}

impl NodeDescriptor {
    pub fn label_text(&self) -> String {
        self.label.text()
    }

    pub fn label_style(&self) -> TextStyle {
        match self.label {
            NodeLabel::Key(_) => TextStyle::Key,
            _ => TextStyle::Index,
        }
    }

    pub fn value_style(&self) -> TextStyle {
        match self.kind {
            ValueKind::String => TextStyle::String,
            ValueKind::Number => TextStyle::Number,
            ValueKind::Boolean => TextStyle::Boolean,
            ValueKind::Null => TextStyle::Null,
            ValueKind::Document | ValueKind::Array => TextStyle::Container,
            ValueKind::Reference(_) => TextStyle::Reference,
            ValueKind::Other => TextStyle::Other,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.scalar.is_some()
    }

    pub fn key(&self) -> Option<&str> {
        match &self.label {
            NodeLabel::Key(key) => Some(key),
            _ => None,
        }
    }

    pub fn db_ref(&self) -> Option<&DbRef> {
        match &self.kind {
            ValueKind::Reference(reference) => Some(reference),
            _ => None,
        }
    }
}

/// `"key": <json>` for leaves, the bare label for containers.
impl fmt::Display for NodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.label, &self.scalar) {
            (NodeLabel::Key(key), Some(value)) => {
                write!(f, "\"{key}\" : {}", bson_to_json_string(value))
            }
            (_, Some(value)) => f.write_str(&bson_to_json_string(value)),
            (label, None) => f.write_str(&label.text()),
        }
    }
}
