//! Document tree model: an arena of nodes built from BSON documents.
//!
//! Nodes are addressed by [`NodeId`]. Each node owns the ids of its children and
//! records its parent id; the tree is rebuilt from documents rather than patched.

mod builder;
mod descriptor;
mod table;

pub use builder::*;
pub use descriptor::*;
pub use table::*;

use mongodb::bson::{Bson, Document};

use crate::bson::{PathSegment, bson_to_json_string, document_to_relaxed_extjson_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub descriptor: NodeDescriptor,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// One visible row when the tree is rendered fully expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: NodeId,
    pub depth: usize,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<TreeNode>,
}

impl DocumentTree {
    pub(crate) fn with_root(descriptor: NodeDescriptor) -> Self {
        Self { nodes: vec![TreeNode { descriptor, parent: None, children: Vec::new() }] }
    }

    pub(crate) fn push(&mut self, parent: NodeId, descriptor: NodeDescriptor) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode { descriptor, parent: Some(parent), children: Vec::new() });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn descriptor(&self, id: NodeId) -> Option<&NodeDescriptor> {
        self.node(id).map(|node| &node.descriptor)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Node ids in depth-first (display) order, starting at `id`.
    pub fn preorder(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !self.contains(next) {
                continue;
            }
            order.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        order
    }

    /// The document node enclosing `id` in a result tree, or the root of an edition tree.
    pub fn document_node(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            let descriptor = self.descriptor(node)?;
            if matches!(descriptor.label, NodeLabel::Document { .. } | NodeLabel::Root) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Locate a node by its path inside the document rooted at `document`.
    pub fn find_by_path(&self, document: NodeId, path: &[PathSegment]) -> Option<NodeId> {
        let mut current = document;
        for segment in path {
            current = self.children(current).iter().copied().find(|child| {
                self.descriptor(*child).is_some_and(|d| d.path.last() == Some(segment))
            })?;
        }
        Some(current)
    }

    /// Rebuild the BSON value held by a node.
    pub fn value(&self, id: NodeId) -> Option<Bson> {
        let descriptor = self.descriptor(id)?;
        if let Some(scalar) = &descriptor.scalar {
            return Some(scalar.clone());
        }
        match descriptor.kind {
            // results roots are arrays of their documents
            ValueKind::Array => {
                Some(Bson::Array(self.children(id).iter().filter_map(|c| self.value(*c)).collect()))
            }
            _ => self.to_document(id).map(Bson::Document),
        }
    }

    /// Rebuild a document from a document-like node (document, reference, root).
    pub fn to_document(&self, id: NodeId) -> Option<Document> {
        let descriptor = self.descriptor(id)?;
        if !matches!(descriptor.kind, ValueKind::Document | ValueKind::Reference(_)) {
            return None;
        }
        let mut doc = Document::new();
        for (key, value) in self.entries(id) {
            doc.insert(key, value);
        }
        Some(doc)
    }

    /// Direct children of a node as `(key-or-index, value)` pairs, in order.
    pub fn entries(&self, id: NodeId) -> Vec<(String, Bson)> {
        self.children(id)
            .iter()
            .filter_map(|child| {
                let descriptor = self.descriptor(*child)?;
                let key = match &descriptor.label {
                    NodeLabel::Key(key) => key.clone(),
                    NodeLabel::Index(idx) | NodeLabel::Document { index: idx } => idx.to_string(),
                    NodeLabel::Results { .. } | NodeLabel::Root => return None,
                };
                Some((key, self.value(*child)?))
            })
            .collect()
    }

    /// All rows below `id` (inclusive) as they appear fully expanded.
    pub fn rows(&self, id: NodeId) -> Vec<TreeRow> {
        let base = self.depth(id);
        self.preorder(id)
            .into_iter()
            .filter_map(|node| {
                let descriptor = self.descriptor(node)?;
                Some(TreeRow {
                    id: node,
                    depth: self.depth(node) - base,
                    label: descriptor.label_text(),
                    value: descriptor.value_text.clone(),
                })
            })
            .collect()
    }

    /// `(label, value)` pairs of every node below the root, depth first.
    pub fn flatten(&self) -> Vec<(String, String)> {
        self.rows(self.root()).into_iter().skip(1).map(|row| (row.label, row.value)).collect()
    }

    /// Text copied to the clipboard for a node.
    ///
    /// The results root renders as `[ doc, doc ]`, documents as pretty JSON, leaves as
    /// `"key" : value`.
    pub fn stringify(&self, id: NodeId) -> Option<String> {
        let descriptor = self.descriptor(id)?;
        match &descriptor.label {
            NodeLabel::Results { .. } => {
                let docs: Vec<String> = self
                    .children(id)
                    .iter()
                    .filter_map(|child| self.value(*child).map(|v| bson_to_json_string(&v)))
                    .collect();
                Some(format!("[ {} ]", docs.join(", ")))
            }
            _ if descriptor.is_leaf() => Some(descriptor.to_string()),
            _ => match self.value(id)? {
                Bson::Document(doc) => Some(document_to_relaxed_extjson_string(&doc)),
                other => Some(bson_to_json_string(&other)),
            },
        }
    }
}
