//! The result area: a tree or a flat table over one page of the current results.

use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

use crate::bson::{DbRef, PathSegment};
use crate::error::Result;
use crate::models::SharedResultSet;
use crate::pagination::Pagination;
use crate::tree::{DocumentTree, NodeId, ResultTable, build_result_table, build_result_tree};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Tree,
    Table,
}

/// What the result area currently shows.
#[derive(Debug, Clone)]
pub enum Projection {
    Empty,
    Tree(DocumentTree),
    Table(ResultTable),
    /// The last query failed; the previous results are still cached.
    Error(String),
}

#[derive(Debug, Clone)]
pub struct ResultView {
    view_mode: ViewMode,
    results: Option<SharedResultSet>,
    projection: Projection,
    selected: Option<NodeId>,
}

impl ResultView {
    pub fn new(view_mode: ViewMode) -> Self {
        Self { view_mode, results: None, projection: Projection::Empty, selected: None }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn results(&self) -> Option<&SharedResultSet> {
        self.results.as_ref()
    }

    pub fn total(&self) -> usize {
        self.results.as_ref().map_or(0, |results| results.len())
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn tree(&self) -> Option<&DocumentTree> {
        match &self.projection {
            Projection::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn table(&self) -> Option<&ResultTable> {
        match &self.projection {
            Projection::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.projection {
            Projection::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Attach a new result set and rebuild the projection for the current page.
    pub fn render(&mut self, results: SharedResultSet, pagination: &Pagination) -> Result<()> {
        self.results = Some(results);
        self.rerender(pagination)
    }

    /// Rebuild the projection from the cached results.
    pub fn rerender(&mut self, pagination: &Pagination) -> Result<()> {
        self.selected = None;
        let Some(results) = &self.results else {
            self.projection = Projection::Empty;
            return Ok(());
        };

        let page = pagination.slice(&results.documents)?;
        self.projection = match self.view_mode {
            ViewMode::Tree => Projection::Tree(build_result_tree(
                &results.collection,
                page,
                pagination.start_index(),
            )),
            ViewMode::Table => Projection::Table(build_result_table(page)),
        };
        Ok(())
    }

    /// Switch between tree and table. Returns whether the mode changed.
    pub fn set_view_mode(&mut self, view_mode: ViewMode, pagination: &Pagination) -> Result<bool> {
        if self.view_mode == view_mode {
            return Ok(false);
        }
        self.view_mode = view_mode;
        self.rerender(pagination)?;
        Ok(true)
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.selected = None;
        self.projection = Projection::Error(message.into());
    }

    /// Select a node of the tree projection. Returns false if there is no such node.
    pub fn select(&mut self, node: NodeId) -> bool {
        let exists = self.tree().is_some_and(|tree| tree.contains(node));
        self.selected = exists.then_some(node);
        exists
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// True when the selected node is a document's `_id`.
    pub fn is_selected_node_id(&self) -> bool {
        self.selected_descriptor().is_some_and(|descriptor| descriptor.is_id)
    }

    /// `_id` of the document enclosing the selected node.
    pub fn selected_document_id(&self) -> Option<Bson> {
        let tree = self.tree()?;
        let document = tree.document_node(self.selected?)?;
        let id_node = tree.find_by_path(document, &[PathSegment::Key("_id".to_string())])?;
        tree.value(id_node)
    }

    /// The reference held by the selected node, or by its parent when a field of a
    /// DBRef is selected.
    pub fn selected_db_ref(&self) -> Option<DbRef> {
        let tree = self.tree()?;
        let selected = self.selected?;
        if let Some(reference) = tree.descriptor(selected).and_then(|d| d.db_ref()) {
            return Some(reference.clone());
        }
        let parent = tree.parent(selected)?;
        tree.descriptor(parent).and_then(|d| d.db_ref()).cloned()
    }

    /// Copyable text for the selection, or for the whole page when nothing is selected.
    pub fn selected_text(&self) -> Option<String> {
        let tree = self.tree()?;
        tree.stringify(self.selected.unwrap_or_else(|| tree.root()))
    }

    fn selected_descriptor(&self) -> Option<&crate::tree::NodeDescriptor> {
        self.tree()?.descriptor(self.selected?)
    }
}
