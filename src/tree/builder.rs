//! Document tree building utilities.

use mongodb::bson::{Bson, Document};

use crate::bson::{MAX_LENGTH, PathSegment, bson_type_label, bson_value_preview, is_editable_value};

use super::descriptor::{NodeDescriptor, NodeLabel, ValueKind};
use super::{DocumentTree, NodeId};

/// Build the tree for one page of a result set.
///
/// The root lists the documents, labeled by their position in the whole result set
/// (`start_index + i`), each expanded recursively.
pub fn build_result_tree(
    collection: &str,
    documents: &[Document],
    start_index: usize,
) -> DocumentTree {
    let mut tree = DocumentTree::with_root(NodeDescriptor {
        label: NodeLabel::Results { collection: collection.to_string() },
        kind: ValueKind::Array,
        scalar: None,
        value_text: format!("[{} documents]", documents.len()),
        type_label: "Results",
        path: Vec::new(),
        is_id: false,
        is_editable: false,
    });

    let root = tree.root();
    for (offset, doc) in documents.iter().enumerate() {
        let label = NodeLabel::Document { index: start_index + offset };
        let doc_node = tree.push(root, document_descriptor(label, doc));
        build_document_children(&mut tree, doc_node, &[], doc);
    }

    tree
}

/// Build the tree for a single document, as shown while editing it.
pub fn build_document_tree(document: &Document) -> DocumentTree {
    let mut tree = DocumentTree::with_root(document_descriptor(NodeLabel::Root, document));
    let root = tree.root();
    build_document_children(&mut tree, root, &[], document);
    tree
}

fn document_descriptor(label: NodeLabel, doc: &Document) -> NodeDescriptor {
    let value = Bson::Document(doc.clone());
    NodeDescriptor {
        label,
        kind: ValueKind::Document,
        scalar: None,
        value_text: bson_value_preview(&value, MAX_LENGTH),
        type_label: "Document",
        path: Vec::new(),
        is_id: false,
        is_editable: false,
    }
}

fn build_document_children(
    tree: &mut DocumentTree,
    parent: NodeId,
    path: &[PathSegment],
    doc: &Document,
) {
    for (key, value) in doc {
        let mut child_path = path.to_vec();
        child_path.push(PathSegment::Key(key.clone()));
        build_bson_node(tree, parent, NodeLabel::Key(key.clone()), child_path, value);
    }
}

/// Add the node for a BSON value under `parent`, recursing into containers.
fn build_bson_node(
    tree: &mut DocumentTree,
    parent: NodeId,
    label: NodeLabel,
    path: Vec<PathSegment>,
    value: &Bson,
) -> NodeId {
    let kind = ValueKind::of(value);
    let is_container = kind.is_container();
    let is_id = matches!(&label, NodeLabel::Key(key) if key == "_id");

    let descriptor = NodeDescriptor {
        label,
        scalar: if is_container { None } else { Some(value.clone()) },
        value_text: bson_value_preview(value, MAX_LENGTH),
        type_label: match kind {
            ValueKind::Reference(_) => "DBRef",
            _ => bson_type_label(value),
        },
        is_id,
        is_editable: is_editable_value(value, &path),
        kind,
        path: path.clone(),
    };
    let node = tree.push(parent, descriptor);

    match value {
        Bson::Document(doc) => build_document_children(tree, node, &path, doc),
        Bson::Array(arr) => {
            for (idx, item) in arr.iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(PathSegment::Index(idx));
                build_bson_node(tree, node, NodeLabel::Index(idx), child_path, item);
            }
        }
        _ => {}
    }

    node
}
