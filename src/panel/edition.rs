//! Editing one document in a working copy before writing it back.

use mongodb::bson::{Bson, Document};

use crate::bson::{
    PathSegment, array_at_path_mut, document_at_path_mut, format_path, get_bson_at_path,
    parse_literal, remove_bson_at_path, set_bson_at_path,
};
use crate::error::{Error, Result};
use crate::models::{CollectionRef, ServerConfiguration};
use crate::operations::DocumentOperations;
use crate::tree::{DocumentTree, NodeId, build_document_tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditionState {
    Closed,
    Open,
    /// A save is being written through the collaborator.
    Committing,
}

#[derive(Debug)]
pub enum EditionOutcome {
    Saved { short: String, detail: String },
    /// The write failed; the buffer is still open.
    Failed(Error),
    Cancelled(String),
}

/// The working copy of the document being edited.
#[derive(Debug, Clone)]
pub struct EditionBuffer {
    document: Document,
    is_new: bool,
    tree: DocumentTree,
    selected: Vec<PathSegment>,
}

impl EditionBuffer {
    fn new(document: Document, is_new: bool) -> Self {
        let tree = build_document_tree(&document);
        Self { document, is_new, tree, selected: Vec::new() }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    /// Path of the selected node; empty when the document itself is selected.
    pub fn selected(&self) -> &[PathSegment] {
        &self.selected
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    fn value_at(&self, path: &[PathSegment]) -> Option<&Bson> {
        get_bson_at_path(&self.document, path)
    }

    fn path_of(&self, node: NodeId) -> Result<Vec<PathSegment>> {
        self.tree
            .descriptor(node)
            .map(|descriptor| descriptor.path.clone())
            .ok_or_else(|| Error::Edit("Unknown node".to_string()))
    }

    /// The container a new entry goes into: the selection itself when it matches
    /// `is_target`, otherwise the container holding the selection.
    fn insertion_path(&self, is_target: impl Fn(&Bson) -> bool) -> Vec<PathSegment> {
        match self.selected.split_last() {
            Some((_, parent)) => match self.value_at(&self.selected) {
                Some(value) if is_target(value) => self.selected.clone(),
                _ => parent.to_vec(),
            },
            None => Vec::new(),
        }
    }

    fn rebuild(&mut self) {
        self.tree = build_document_tree(&self.document);
    }
}

/// Owns at most one open edition buffer.
#[derive(Debug)]
pub struct EditionController {
    state: EditionState,
    buffer: Option<EditionBuffer>,
}

impl Default for EditionController {
    fn default() -> Self {
        Self::new()
    }
}

impl EditionController {
    pub fn new() -> Self {
        Self { state: EditionState::Closed, buffer: None }
    }

    pub fn state(&self) -> EditionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != EditionState::Closed
    }

    pub fn buffer(&self) -> Option<&EditionBuffer> {
        self.buffer.as_ref()
    }

    /// Open a working copy of `document`, or of an empty document when adding a new one.
    pub fn begin_edit(&mut self, document: Option<Document>) -> Result<()> {
        if self.is_open() {
            return Err(Error::Edit("Another document is already being edited".to_string()));
        }
        let is_new = document.is_none();
        self.buffer = Some(EditionBuffer::new(document.unwrap_or_default(), is_new));
        self.state = EditionState::Open;
        Ok(())
    }

    /// Select a node of the edition tree.
    pub fn select(&mut self, node: NodeId) -> Result<()> {
        let buffer = self.buffer_mut()?;
        buffer.selected = buffer.path_of(node)?;
        Ok(())
    }

    /// Select a node by path; an empty path selects the document itself.
    pub fn select_path(&mut self, path: Vec<PathSegment>) -> Result<()> {
        let buffer = self.buffer_mut()?;
        if !path.is_empty() && buffer.value_at(&path).is_none() {
            return Err(Error::Edit(format!("No value at '{}'", format_path(&path))));
        }
        buffer.selected = path;
        Ok(())
    }

    /// Add `key` to the document holding the selected node.
    pub fn add_key(&mut self, key: &str, literal: &str) -> Result<()> {
        let buffer = self.buffer_mut()?;
        if key.is_empty() {
            return Err(Error::Edit("Key must not be empty".to_string()));
        }

        let target = buffer.insertion_path(|value| matches!(value, Bson::Document(_)));
        let document = document_at_path_mut(&mut buffer.document, &target)
            .ok_or_else(|| Error::Edit("Keys can only be added to a document".to_string()))?;
        if document.contains_key(key) {
            return Err(Error::Edit(format!("Key '{key}' already exists")));
        }
        document.insert(key, parse_literal(literal));
        buffer.rebuild();
        Ok(())
    }

    /// Append a value to the selected array, or to the array holding the selected node.
    pub fn add_value(&mut self, literal: &str) -> Result<()> {
        let buffer = self.buffer_mut()?;
        let target = buffer.insertion_path(|value| matches!(value, Bson::Array(_)));
        let array = array_at_path_mut(&mut buffer.document, &target)
            .ok_or_else(|| Error::Edit("Values can only be added to an array".to_string()))?;
        array.push(parse_literal(literal));
        buffer.rebuild();
        Ok(())
    }

    /// Replace the value of a leaf, keeping its key or position.
    pub fn edit_value(&mut self, node: NodeId, literal: &str) -> Result<()> {
        let buffer = self.buffer_mut()?;
        let path = buffer.path_of(node)?;
        let editable = buffer.tree.descriptor(node).is_some_and(|d| d.is_editable);
        if !editable {
            return Err(Error::Edit(format!("'{}' cannot be edited", format_path(&path))));
        }
        if !set_bson_at_path(&mut buffer.document, &path, parse_literal(literal)) {
            return Err(Error::Edit(format!("No value at '{}'", format_path(&path))));
        }
        buffer.rebuild();
        Ok(())
    }

    /// Remove a key or an array element.
    pub fn delete(&mut self, node: NodeId) -> Result<()> {
        let buffer = self.buffer_mut()?;
        let path = buffer.path_of(node)?;
        let Some((_, parent)) = path.split_last() else {
            return Err(Error::Edit("The document itself cannot be deleted".to_string()));
        };
        if remove_bson_at_path(&mut buffer.document, &path).is_none() {
            return Err(Error::Edit(format!("No value at '{}'", format_path(&path))));
        }
        if buffer.selected.starts_with(&path) || buffer.value_at(&buffer.selected).is_none() {
            buffer.selected = parent.to_vec();
        }
        buffer.rebuild();
        Ok(())
    }

    /// Write the working copy through `ops`.
    ///
    /// The buffer closes on success and stays open on failure so the user can retry.
    pub fn save(
        &mut self,
        ops: &dyn DocumentOperations,
        config: &ServerConfiguration,
        collection: &CollectionRef,
    ) -> EditionOutcome {
        let Some(buffer) = self.buffer.as_ref().filter(|_| self.state == EditionState::Open)
        else {
            return EditionOutcome::Failed(Error::Edit("No document is being edited".to_string()));
        };
        let document = buffer.document.clone();
        let detail = match document.get("_id") {
            Some(id) => format!("Document {id} saved in {collection}"),
            None => format!("New document saved in {collection}"),
        };

        self.state = EditionState::Committing;
        match ops.update_document(config, collection, document) {
            Ok(()) => {
                self.close();
                log::debug!("{detail}");
                EditionOutcome::Saved { short: "Document saved".to_string(), detail }
            }
            Err(e) => {
                self.state = EditionState::Open;
                log::warn!("Saving document in {collection} failed: {e}");
                EditionOutcome::Failed(e)
            }
        }
    }

    /// Discard the working copy without writing anything.
    pub fn cancel(&mut self) -> EditionOutcome {
        self.close();
        EditionOutcome::Cancelled("Modification canceled".to_string())
    }

    fn close(&mut self) {
        self.buffer = None;
        self.state = EditionState::Closed;
    }

    fn buffer_mut(&mut self) -> Result<&mut EditionBuffer> {
        match (self.state, self.buffer.as_mut()) {
            (EditionState::Open, Some(buffer)) => Ok(buffer),
            _ => Err(Error::Edit("No document is being edited".to_string())),
        }
    }
}
