//! Panel events for reactive UI updates

use crate::models::CollectionRef;
use crate::panel::ViewMode;
use crate::state::StatusMessage;

/// Events emitted by the panel, drained by the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    // Queries
    QueryStarted {
        request_id: u64,
        collection: CollectionRef,
    },
    ResultsLoaded {
        collection: String,
        count: usize,
    },
    QueryFailed {
        error: String,
    },
    InvalidInput {
        error: String,
    },

    // Result view
    ViewModeChanged(ViewMode),
    PageChanged {
        page: usize,
        page_count: usize,
    },

    // Edition
    EditionOpened {
        is_new: bool,
    },
    DocumentSaved {
        short: String,
        detail: String,
    },
    DocumentSaveFailed {
        error: String,
    },
    EditionCancelled {
        message: String,
    },
    DocumentDeleted {
        collection: CollectionRef,
    },
    DocumentDeleteFailed {
        error: String,
    },
    DocumentNotFound {
        id: String,
    },
    /// Fetching a single document (for edition or a DBRef target) failed.
    DocumentLoadFailed {
        error: String,
    },
    /// The action does not apply to the current selection or edition state.
    ActionRejected {
        error: String,
    },

    // Navigation
    Navigated {
        collection: CollectionRef,
    },
    ReferenceNotFound {
        reference: String,
    },
}

impl PanelEvent {
    /// The status line shown for this event, if any.
    pub fn status(&self) -> Option<StatusMessage> {
        match self {
            PanelEvent::ResultsLoaded { collection, count } => {
                Some(StatusMessage::info(format!("{count} documents loaded from '{collection}'")))
            }
            PanelEvent::QueryFailed { error }
            | PanelEvent::InvalidInput { error }
            | PanelEvent::DocumentSaveFailed { error }
            | PanelEvent::DocumentDeleteFailed { error }
            | PanelEvent::DocumentLoadFailed { error }
            | PanelEvent::ActionRejected { error } => Some(StatusMessage::error(error)),
            PanelEvent::DocumentSaved { short, .. } => Some(StatusMessage::info(short)),
            PanelEvent::EditionCancelled { message } => Some(StatusMessage::info(message)),
            PanelEvent::DocumentDeleted { collection } => {
                Some(StatusMessage::info(format!("Document deleted from {collection}")))
            }
            PanelEvent::DocumentNotFound { id } => {
                Some(StatusMessage::error(format!("Document {id} not found")))
            }
            PanelEvent::ReferenceNotFound { reference } => {
                Some(StatusMessage::error(format!("Referenced document {reference} not found")))
            }
            PanelEvent::QueryStarted { .. }
            | PanelEvent::ViewModeChanged(_)
            | PanelEvent::PageChanged { .. }
            | PanelEvent::EditionOpened { .. }
            | PanelEvent::Navigated { .. } => None,
        }
    }
}
