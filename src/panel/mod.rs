//! The panel: runs queries in the background and owns the result view, the edition
//! buffer and the navigation history.
//!
//! Queries run on the Tokio blocking pool and post their outcome over a channel.
//! Nothing touches panel state off the owning thread; it applies results when it
//! calls [`Panel::process_pending`] or [`Panel::process_next_blocking`].

mod edition;
mod result_view;

pub use edition::*;
pub use result_view::*;

use std::collections::VecDeque;
use std::sync::Arc;

use mongodb::bson::{Bson, doc};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::error::{Error, Result};
use crate::models::{CollectionRef, QueryOptions, ResultSet, ServerConfiguration};
use crate::navigation::Navigation;
use crate::operations::DocumentOperations;
use crate::pagination::{PageSize, Pagination};
use crate::state::{PanelEvent, PanelSettings};
use crate::tree::NodeId;

/// Messages posted from query workers to the owning thread.
#[derive(Debug)]
pub enum PanelMessage {
    Loaded { request_id: u64, result: Result<ResultSet> },
    LoadingFinished,
}

/// Posts `LoadingFinished` when the worker is done, however it exits.
struct LoadingGuard {
    sender: UnboundedSender<PanelMessage>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let _ = self.sender.send(PanelMessage::LoadingFinished);
    }
}

pub struct Panel {
    ops: Arc<dyn DocumentOperations>,
    config: ServerConfiguration,
    runtime: Handle,
    settings: PanelSettings,
    navigation: Navigation,
    pagination: Pagination,
    result_view: ResultView,
    edition: EditionController,
    sender: UnboundedSender<PanelMessage>,
    receiver: UnboundedReceiver<PanelMessage>,
    request_id: u64,
    in_flight: usize,
    events: VecDeque<PanelEvent>,
}

impl Panel {
    pub fn new(
        ops: Arc<dyn DocumentOperations>,
        config: ServerConfiguration,
        runtime: Handle,
        collection: CollectionRef,
        settings: PanelSettings,
    ) -> Self {
        let (sender, receiver) = unbounded_channel();
        let collection = config.resolve(collection);
        let query_options = QueryOptions { limit: settings.row_limit, ..QueryOptions::default() };
        Self {
            ops,
            config,
            runtime,
            navigation: Navigation::new(collection, query_options),
            pagination: Pagination::new(settings.page_size),
            result_view: ResultView::new(settings.view_mode),
            edition: EditionController::new(),
            settings,
            sender,
            receiver,
            request_id: 0,
            in_flight: 0,
            events: VecDeque::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &ServerConfiguration {
        &self.config
    }

    pub fn collection(&self) -> &CollectionRef {
        &self.navigation.current().collection
    }

    pub fn query_options(&self) -> &QueryOptions {
        &self.navigation.current().query_options
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn result_view(&self) -> &ResultView {
        &self.result_view
    }

    pub fn edition(&self) -> &EditionController {
        &self.edition
    }

    /// The edition buffer operations (add key, add value, edit, delete) go through here.
    pub fn edition_mut(&mut self) -> &mut EditionController {
        &mut self.edition
    }

    /// Current settings, reflecting page size and view mode changes.
    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn drain_events(&mut self) -> Vec<PanelEvent> {
        self.events.drain(..).collect()
    }

    fn emit(&mut self, event: PanelEvent) {
        self.events.push_back(event);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Run the current way point's query in the background.
    ///
    /// Returns the request id; only the response to the latest request is applied.
    pub fn execute_query(&mut self) -> u64 {
        self.request_id += 1;
        self.in_flight += 1;
        let request_id = self.request_id;

        let ops = self.ops.clone();
        let config = self.config.clone();
        let collection = self.collection().clone();
        let options = self.query_options().clone();
        let sender = self.sender.clone();
        log::debug!("Dispatching query {request_id} on {collection}");

        self.emit(PanelEvent::QueryStarted { request_id, collection: collection.clone() });
        self.runtime.spawn_blocking(move || {
            let _guard = LoadingGuard { sender: sender.clone() };
            let result = ops.load_collection_values(&config, &collection, &options);
            let _ = sender.send(PanelMessage::Loaded { request_id, result });
        });
        request_id
    }

    /// Validate the raw query inputs, then run them from the first page.
    pub fn execute_query_with_inputs(
        &mut self,
        filter: &str,
        projection: &str,
        sort: &str,
        row_limit: &str,
    ) -> Result<u64> {
        let default_limit = self.settings.row_limit;
        let parsed = QueryOptions::from_raw(filter, projection, sort, row_limit, default_limit);
        let options = match parsed {
            Ok(options) => options,
            Err(e) => {
                self.emit(PanelEvent::InvalidInput { error: e.to_string() });
                return Err(e);
            }
        };
        self.navigation.current_mut().query_options = options;
        self.pagination.reset();
        Ok(self.execute_query())
    }

    /// Apply every message already posted by workers. Returns how many were handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.receiver.try_recv() {
            self.apply(message);
            handled += 1;
        }
        handled
    }

    /// Wait for the next worker message and apply it.
    ///
    /// Returns false without blocking when nothing is in flight and nothing is queued.
    /// Must not be called from async code.
    pub fn process_next_blocking(&mut self) -> bool {
        if self.process_pending() > 0 {
            return true;
        }
        if self.in_flight == 0 {
            return false;
        }
        match self.receiver.blocking_recv() {
            Some(message) => {
                self.apply(message);
                true
            }
            None => false,
        }
    }

    /// Block until every dispatched query has been applied or discarded.
    pub fn wait_until_idle(&mut self) {
        while self.process_next_blocking() {}
    }

    fn apply(&mut self, message: PanelMessage) {
        match message {
            PanelMessage::LoadingFinished => {
                self.in_flight = self.in_flight.saturating_sub(1);
            }
            PanelMessage::Loaded { request_id, .. } if request_id != self.request_id => {
                log::warn!(
                    "Discarding stale response to query {request_id} (latest is {})",
                    self.request_id
                );
            }
            PanelMessage::Loaded { result: Ok(results), .. } => {
                let count = results.len();
                let collection = results.collection.clone();
                self.pagination.clamp_to(count);
                if let Err(e) = self.result_view.render(Arc::new(results), &self.pagination) {
                    self.result_view.show_error(e.to_string());
                }
                self.emit(PanelEvent::ResultsLoaded { collection, count });
            }
            PanelMessage::Loaded { result: Err(e), .. } => {
                log::error!("Query on {} failed: {e}", self.collection());
                self.result_view.show_error(e.to_string());
                self.emit(PanelEvent::QueryFailed { error: e.to_string() });
            }
        }
    }

    // =========================================================================
    // View and pagination
    // =========================================================================

    pub fn set_view_mode(&mut self, view_mode: ViewMode) -> bool {
        self.settings.view_mode = view_mode;
        match self.result_view.set_view_mode(view_mode, &self.pagination) {
            Ok(true) => {
                self.emit(PanelEvent::ViewModeChanged(view_mode));
                true
            }
            Ok(false) => false,
            Err(e) => {
                self.result_view.show_error(e.to_string());
                true
            }
        }
    }

    pub fn select(&mut self, node: NodeId) -> bool {
        self.result_view.select(node)
    }

    /// Text to copy for the selected node.
    pub fn selected_text(&self) -> Option<String> {
        self.result_view.selected_text()
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.pagination.next_page(self.result_view.total());
        if moved {
            self.page_changed();
        }
        moved
    }

    pub fn previous_page(&mut self) -> bool {
        let moved = self.pagination.previous_page();
        if moved {
            self.page_changed();
        }
        moved
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.settings.page_size = page_size;
        self.pagination.set_page_size(page_size, self.result_view.total());
        self.page_changed();
    }

    fn page_changed(&mut self) {
        let total = self.result_view.total();
        if let Err(e) = self.result_view.rerender(&self.pagination) {
            self.result_view.show_error(e.to_string());
        }
        self.emit(PanelEvent::PageChanged {
            page: self.pagination.current_page(),
            page_count: self.pagination.page_count(total),
        });
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Open the document holding the selected node for edition, fetched fresh.
    pub fn edit_selected_document(&mut self) -> Result<()> {
        if self.edition.is_open() {
            return self.reject(Error::Edit("Another document is already being edited".into()));
        }
        let id = self.selected_document_id()?;
        let document = match self.ops.find_document_by_id(&self.config, self.collection(), &id) {
            Ok(document) => document,
            Err(e) => {
                log::warn!("Loading document {id} from {} failed: {e}", self.collection());
                self.emit(PanelEvent::DocumentLoadFailed { error: e.to_string() });
                return Err(e);
            }
        };
        let Some(document) = document else {
            self.emit(PanelEvent::DocumentNotFound { id: id.to_string() });
            return Err(Error::NotFound(format!("Document {id}")));
        };
        if let Err(e) = self.edition.begin_edit(Some(document)) {
            return self.reject(e);
        }
        self.emit(PanelEvent::EditionOpened { is_new: false });
        Ok(())
    }

    /// Open an empty edition buffer for a new document.
    pub fn add_document(&mut self) -> Result<()> {
        if let Err(e) = self.edition.begin_edit(None) {
            return self.reject(e);
        }
        self.emit(PanelEvent::EditionOpened { is_new: true });
        Ok(())
    }

    /// Save the edition buffer, then run the query again on success.
    pub fn save_edition(&mut self) -> EditionOutcome {
        let collection = self.collection().clone();
        let outcome = self.edition.save(self.ops.as_ref(), &self.config, &collection);
        match &outcome {
            EditionOutcome::Saved { short, detail } => {
                self.emit(PanelEvent::DocumentSaved {
                    short: short.clone(),
                    detail: detail.clone(),
                });
                self.execute_query();
            }
            EditionOutcome::Failed(e) => {
                self.emit(PanelEvent::DocumentSaveFailed { error: e.to_string() });
            }
            EditionOutcome::Cancelled(message) => {
                self.emit(PanelEvent::EditionCancelled { message: message.clone() });
            }
        }
        outcome
    }

    pub fn cancel_edition(&mut self) -> EditionOutcome {
        let outcome = self.edition.cancel();
        if let EditionOutcome::Cancelled(message) = &outcome {
            self.emit(PanelEvent::EditionCancelled { message: message.clone() });
        }
        outcome
    }

    /// Delete the document holding the selected node, then run the query again.
    pub fn delete_selected_document(&mut self) -> Result<()> {
        let id = self.selected_document_id()?;
        let collection = self.collection().clone();
        if let Err(e) = self.ops.delete_document(&self.config, &collection, &id) {
            self.emit(PanelEvent::DocumentDeleteFailed { error: e.to_string() });
            return Err(e);
        }
        self.emit(PanelEvent::DocumentDeleted { collection });
        self.execute_query();
        Ok(())
    }

    fn selected_document_id(&mut self) -> Result<Bson> {
        match self.result_view.selected_document_id() {
            Some(id) => Ok(id),
            None => self.reject(Error::Edit("Select a document with an _id first".to_string())),
        }
    }

    /// Report an action that does not apply in the current state.
    fn reject<T>(&mut self, error: Error) -> Result<T> {
        self.emit(PanelEvent::ActionRejected { error: error.to_string() });
        Err(error)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Follow the selected DBRef: open its collection filtered on the referenced `_id`.
    ///
    /// A dangling reference leaves the panel where it is.
    pub fn go_to_referenced_document(&mut self) -> Result<()> {
        let Some(reference) = self.result_view.selected_db_ref() else {
            return self.reject(Error::Edit("The selected node is not a DBRef".to_string()));
        };
        let database = reference.database_or(&self.collection().database).to_string();

        let found = match self.ops.find_referenced_document(
            &self.config,
            &reference.collection,
            &reference.id,
            &database,
        ) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("Resolving {reference} failed: {e}");
                self.emit(PanelEvent::DocumentLoadFailed { error: e.to_string() });
                return Err(e);
            }
        };
        if found.is_none() {
            self.emit(PanelEvent::ReferenceNotFound { reference: reference.to_string() });
            return Err(Error::NotFound(reference.to_string()));
        }

        let collection = CollectionRef::new(database, reference.collection.clone());
        let options = QueryOptions {
            limit: self.settings.row_limit,
            ..QueryOptions::default().with_filter(doc! { "_id": reference.id.clone() })
        };
        self.navigation.add_way_point(collection.clone(), options);
        self.pagination.reset();
        self.emit(PanelEvent::Navigated { collection });
        self.execute_query();
        Ok(())
    }

    /// Return to the previous way point and re-run its query.
    pub fn navigate_backward(&mut self) -> bool {
        if !self.navigation.move_backward() {
            return false;
        }
        self.pagination.reset();
        let collection = self.collection().clone();
        self.emit(PanelEvent::Navigated { collection });
        self.execute_query();
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;

    use mongodb::bson::Document;
    use parking_lot::Mutex;

    use super::*;
    use crate::bson::PathSegment;

    /// In-memory collections keyed by name; filters match top-level equality only.
    #[derive(Default)]
    struct FakeOperations {
        collections: Mutex<HashMap<String, Vec<Document>>>,
        fail_next_query: Mutex<Option<String>>,
        fail_lookups: Mutex<Option<String>>,
        slow: Mutex<Option<(Document, mpsc::Receiver<()>)>>,
        queries: AtomicUsize,
        updates: Mutex<Vec<Document>>,
    }

    impl FakeOperations {
        fn with(collection: &str, documents: Vec<Document>) -> Self {
            let fake = Self::default();
            fake.collections.lock().insert(collection.to_string(), documents);
            fake
        }

        fn matching(&self, collection: &str, filter: Option<&Document>) -> Vec<Document> {
            let collections = self.collections.lock();
            let documents = collections.get(collection).cloned().unwrap_or_default();
            documents
                .into_iter()
                .filter(|doc| {
                    filter.is_none_or(|filter| filter.iter().all(|(k, v)| doc.get(k) == Some(v)))
                })
                .collect()
        }
    }

    impl DocumentOperations for FakeOperations {
        fn load_collection_values(
            &self,
            _config: &ServerConfiguration,
            collection: &CollectionRef,
            options: &QueryOptions,
        ) -> Result<ResultSet> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            let gate = {
                let mut slow = self.slow.lock();
                match slow.as_ref() {
                    Some((filter, _)) if options.filter.as_ref() == Some(filter) => slow.take(),
                    _ => None,
                }
            };
            if let Some((_, release)) = gate {
                let _ = release.recv();
            }
            if let Some(error) = self.fail_next_query.lock().take() {
                return Err(Error::Query(error));
            }
            let documents = self.matching(&collection.collection, options.filter.as_ref());
            Ok(ResultSet::new(collection.collection.clone(), documents))
        }

        fn find_document_by_id(
            &self,
            _config: &ServerConfiguration,
            collection: &CollectionRef,
            id: &Bson,
        ) -> Result<Option<Document>> {
            if let Some(error) = self.fail_lookups.lock().clone() {
                return Err(Error::Query(error));
            }
            let filter = doc! { "_id": id.clone() };
            Ok(self.matching(&collection.collection, Some(&filter)).into_iter().next())
        }

        fn update_document(
            &self,
            _config: &ServerConfiguration,
            collection: &CollectionRef,
            document: Document,
        ) -> Result<()> {
            self.updates.lock().push(document.clone());
            let mut collections = self.collections.lock();
            let documents = collections.entry(collection.collection.clone()).or_default();
            match documents.iter_mut().find(|doc| doc.get("_id") == document.get("_id")) {
                Some(existing) => *existing = document,
                None => documents.push(document),
            }
            Ok(())
        }

        fn delete_document(
            &self,
            _config: &ServerConfiguration,
            collection: &CollectionRef,
            id: &Bson,
        ) -> Result<()> {
            if let Some(documents) = self.collections.lock().get_mut(&collection.collection) {
                documents.retain(|doc| doc.get("_id") != Some(id));
            }
            Ok(())
        }
    }

    fn books() -> Vec<Document> {
        vec![
            doc! { "_id": 1, "title": "Dune", "author": { "$ref": "authors", "$id": 10 } },
            doc! { "_id": 2, "title": "Emma", "author": { "$ref": "authors", "$id": 99 } },
            doc! { "_id": 3, "title": "Ubik" },
        ]
    }

    fn panel(ops: Arc<FakeOperations>, runtime: &tokio::runtime::Runtime) -> Panel {
        panel_with(ops, runtime, PanelSettings::default())
    }

    fn panel_with(
        ops: Arc<FakeOperations>,
        runtime: &tokio::runtime::Runtime,
        settings: PanelSettings,
    ) -> Panel {
        Panel::new(
            ops,
            ServerConfiguration::new("local", "mongodb://localhost:27017"),
            runtime.handle().clone(),
            CollectionRef::new("library", "books"),
            settings,
        )
    }

    fn loaded(panel: &Panel) -> Vec<Document> {
        panel.result_view().results().map(|r| r.documents.clone()).unwrap_or_default()
    }

    fn select_path(panel: &mut Panel, document: usize, path: &[PathSegment]) {
        let tree = panel.result_view().tree().expect("tree projection");
        let document = tree.children(tree.root())[document];
        let node = tree.find_by_path(document, path).expect("node exists");
        assert!(panel.select(node));
    }

    fn key(name: &str) -> PathSegment {
        PathSegment::Key(name.to_string())
    }

    #[test]
    fn query_results_are_rendered_on_the_owning_thread() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ops = Arc::new(FakeOperations::with("books", books()));
        let mut panel = panel(ops, &runtime);

        panel.execute_query();
        assert!(panel.is_loading());
        assert!(panel.result_view().results().is_none());

        panel.wait_until_idle();
        assert!(!panel.is_loading());
        assert_eq!(loaded(&panel).len(), 3);
        let tree = panel.result_view().tree().unwrap();
        assert_eq!(tree.children(tree.root()).len(), 3);

        let events = panel.drain_events();
        assert!(matches!(events[0], PanelEvent::QueryStarted { request_id: 1, .. }));
        assert_eq!(events[1], PanelEvent::ResultsLoaded { collection: "books".into(), count: 3 });
    }

    #[test]
    fn stale_response_never_replaces_a_newer_one() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ops = Arc::new(FakeOperations::with("books", books()));
        let (release, gate) = mpsc::channel();
        *ops.slow.lock() = Some((doc! { "_id": 1 }, gate));
        let mut panel = panel(ops.clone(), &runtime);

        panel.execute_query_with_inputs(r#"{ "_id": 1 }"#, "", "", "").unwrap();
        panel.execute_query_with_inputs(r#"{ "_id": 2 }"#, "", "", "").unwrap();

        while loaded(&panel).is_empty() {
            assert!(panel.process_next_blocking());
        }
        assert_eq!(loaded(&panel)[0].get_i32("_id").unwrap(), 2);

        release.send(()).unwrap();
        panel.wait_until_idle();
        assert_eq!(loaded(&panel).len(), 1);
        assert_eq!(loaded(&panel)[0].get_i32("_id").unwrap(), 2);
        assert_eq!(ops.queries.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_query_keeps_previous_results() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ops = Arc::new(FakeOperations::with("books", books()));
        let mut panel = panel(ops.clone(), &runtime);
        panel.execute_query();
        panel.wait_until_idle();

        *ops.fail_next_query.lock() = Some("server selection timeout".to_string());
        panel.execute_query();
        panel.wait_until_idle();

        assert_eq!(panel.result_view().error(), Some("Query failed: server selection timeout"));
        assert_eq!(loaded(&panel), books());
        assert!(
            panel.drain_events().iter().any(|event| matches!(event, PanelEvent::QueryFailed { .. }))
        );
    }

    #[test]
    fn invalid_inputs_are_rejected_before_dispatch() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ops = Arc::new(FakeOperations::with("books", books()));
        let mut panel = panel(ops.clone(), &runtime);

        assert!(matches!(
            panel.execute_query_with_inputs("{ broken", "", "", ""),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            panel.execute_query_with_inputs("", "", "", "-5"),
            Err(Error::Validation(_))
        ));
        assert!(!panel.is_loading());
        assert_eq!(ops.queries.load(Ordering::SeqCst), 0);
        assert_eq!(panel.drain_events().len(), 2);
    }

    #[test]
    fn pages_and_view_mode_reuse_cached_results() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ops = Arc::new(FakeOperations::with("books", books()));
        let mut panel = panel(ops.clone(), &runtime);
        panel.set_page_size(PageSize::limited(2).unwrap());
        panel.execute_query();
        panel.wait_until_idle();

        assert!(panel.next_page());
        assert!(!panel.next_page());
        let tree = panel.result_view().tree().unwrap();
        assert_eq!(tree.children(tree.root()).len(), 1);

        assert!(panel.set_view_mode(ViewMode::Table));
        assert_eq!(panel.result_view().table().unwrap().rows.len(), 1);
        assert_eq!(panel.settings().view_mode, ViewMode::Table);

        assert!(panel.previous_page());
        assert_eq!(panel.result_view().table().unwrap().rows.len(), 2);
        assert_eq!(ops.queries.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_reference_target_does_not_navigate() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ops = Arc::new(FakeOperations::with("books", books()));
        ops.collections.lock().insert("authors".into(), vec![doc! { "_id": 10, "name": "Frank" }]);
        let mut panel = panel(ops.clone(), &runtime);
        panel.execute_query();
        panel.wait_until_idle();
        panel.drain_events();

        select_path(&mut panel, 1, &[key("author")]);
        assert!(matches!(panel.go_to_referenced_document(), Err(Error::NotFound(_))));
        assert!(!panel.navigation().has_history());
        assert!(!panel.is_loading());
        assert!(matches!(
            panel.drain_events().as_slice(),
            [PanelEvent::ReferenceNotFound { .. }]
        ));
    }

    #[test]
    fn following_a_reference_and_back() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ops = Arc::new(FakeOperations::with("books", books()));
        ops.collections.lock().insert("authors".into(), vec![doc! { "_id": 10, "name": "Frank" }]);
        let mut panel = panel(ops.clone(), &runtime);
        panel.execute_query();
        panel.wait_until_idle();

        select_path(&mut panel, 0, &[key("author"), key("$id")]);
        panel.go_to_referenced_document().unwrap();
        panel.wait_until_idle();
        assert_eq!(panel.collection(), &CollectionRef::new("library", "authors"));
        assert_eq!(loaded(&panel), vec![doc! { "_id": 10, "name": "Frank" }]);

        assert!(panel.navigate_backward());
        panel.wait_until_idle();
        assert_eq!(panel.collection().collection, "books");
        assert_eq!(loaded(&panel).len(), 3);
        assert!(!panel.navigate_backward());
    }

    #[test]
    fn saving_an_edit_reruns_the_query() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ops = Arc::new(FakeOperations::with("books", books()));
        let mut panel = panel(ops.clone(), &runtime);
        panel.execute_query();
        panel.wait_until_idle();

        select_path(&mut panel, 2, &[key("title")]);
        panel.edit_selected_document().unwrap();
        assert!(matches!(panel.add_document(), Err(Error::Edit(_))));

        let edition = panel.edition_mut();
        edition.select_path(Vec::new()).unwrap();
        edition.add_key("year", "1969").unwrap();
        assert!(matches!(panel.save_edition(), EditionOutcome::Saved { .. }));
        assert!(!panel.edition().is_open());

        panel.wait_until_idle();
        assert_eq!(ops.queries.load(Ordering::SeqCst), 2);
        let expected = doc! { "_id": 3, "title": "Ubik", "year": 1969 };
        assert_eq!(ops.updates.lock().as_slice(), &[expected]);
        assert_eq!(loaded(&panel)[2].get_i32("year").unwrap(), 1969);
    }

    #[test]
    fn deleting_the_selected_document() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ops = Arc::new(FakeOperations::with("books", books()));
        let mut panel = panel(ops.clone(), &runtime);
        assert!(matches!(panel.delete_selected_document(), Err(Error::Edit(_))));

        panel.execute_query();
        panel.wait_until_idle();
        select_path(&mut panel, 0, &[key("_id")]);
        assert!(panel.result_view().is_selected_node_id());
        panel.delete_selected_document().unwrap();
        panel.wait_until_idle();

        assert_eq!(loaded(&panel).len(), 2);
        assert!(matches!(panel.cancel_edition(), EditionOutcome::Cancelled(_)));
    }

    #[test]
    fn failed_lookups_are_reported_as_events() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ops = Arc::new(FakeOperations::with("books", books()));
        let mut panel = panel(ops.clone(), &runtime);
        panel.execute_query();
        panel.wait_until_idle();
        panel.drain_events();
        *ops.fail_lookups.lock() = Some("connection reset".to_string());

        select_path(&mut panel, 0, &[key("title")]);
        assert!(matches!(panel.edit_selected_document(), Err(Error::Query(_))));
        assert!(!panel.edition().is_open());
        let events = panel.drain_events();
        assert_eq!(
            events,
            vec![PanelEvent::DocumentLoadFailed { error: "Query failed: connection reset".into() }]
        );
        assert!(events[0].status().unwrap().is_error());

        select_path(&mut panel, 0, &[key("author"), key("$id")]);
        assert!(matches!(panel.go_to_referenced_document(), Err(Error::Query(_))));
        assert!(!panel.navigation().has_history());
        assert!(matches!(
            panel.drain_events().as_slice(),
            [PanelEvent::DocumentLoadFailed { .. }]
        ));
    }

    #[test]
    fn rejected_actions_are_reported_as_events() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ops = Arc::new(FakeOperations::with("books", books()));
        let mut panel = panel(ops.clone(), &runtime);
        panel.execute_query();
        panel.wait_until_idle();
        panel.drain_events();

        assert!(matches!(panel.go_to_referenced_document(), Err(Error::Edit(_))));
        assert!(matches!(panel.edit_selected_document(), Err(Error::Edit(_))));

        panel.add_document().unwrap();
        assert!(matches!(panel.add_document(), Err(Error::Edit(_))));
        select_path(&mut panel, 2, &[key("title")]);
        assert!(matches!(panel.edit_selected_document(), Err(Error::Edit(_))));

        let events = panel.drain_events();
        assert_eq!(events.len(), 5);
        assert_eq!(events[2], PanelEvent::EditionOpened { is_new: true });
        let rejected = events
            .iter()
            .filter(|event| matches!(event, PanelEvent::ActionRejected { .. }))
            .count();
        assert_eq!(rejected, 4);
    }

    #[test]
    fn blank_row_limit_uses_the_saved_setting() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ops = Arc::new(FakeOperations::with("books", books()));
        let settings = PanelSettings { row_limit: 50, ..PanelSettings::default() };
        let mut panel = panel_with(ops, &runtime, settings);
        assert_eq!(panel.query_options().limit, 50);

        panel.execute_query_with_inputs("", "", "", "").unwrap();
        assert_eq!(panel.query_options().limit, 50);

        panel.execute_query_with_inputs("", "", "", "7").unwrap();
        assert_eq!(panel.query_options().limit, 7);
        panel.wait_until_idle();
    }

    #[test]
    fn cancelled_edit_leaves_store_and_results_untouched() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ops = Arc::new(FakeOperations::with("books", books()));
        let mut panel = panel(ops.clone(), &runtime);
        panel.execute_query();
        panel.wait_until_idle();

        select_path(&mut panel, 0, &[key("title")]);
        panel.edit_selected_document().unwrap();
        let edition = panel.edition_mut();
        let tree = edition.buffer().unwrap().tree();
        let title = tree.find_by_path(tree.root(), &[key("title")]).unwrap();
        edition.edit_value(title, "Children of Dune").unwrap();
        edition.add_key("year", "1976").unwrap();
        assert_ne!(edition.buffer().unwrap().document(), &books()[0]);

        assert!(matches!(panel.cancel_edition(), EditionOutcome::Cancelled(_)));
        assert!(!panel.edition().is_open());
        assert!(!panel.is_loading());
        assert!(ops.updates.lock().is_empty());
        assert_eq!(ops.collections.lock()["books"], books());
        assert_eq!(loaded(&panel), books());
    }

    #[test]
    fn collection_without_database_uses_the_server_default() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ops = Arc::new(FakeOperations::with("books", books()));
        let config = ServerConfiguration::new("local", "mongodb://localhost:27017")
            .with_default_database("library");
        let panel = Panel::new(
            ops,
            config,
            runtime.handle().clone(),
            CollectionRef::new("", "books"),
            PanelSettings::default(),
        );
        assert_eq!(panel.collection(), &CollectionRef::new("library", "books"));
    }
}
