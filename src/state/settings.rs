//! Panel settings with persistence.

use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_RESULT_LIMIT;
use crate::pagination::PageSize;
use crate::panel::ViewMode;

/// Panel settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSettings {
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default = "default_row_limit")]
    pub row_limit: usize,
    #[serde(default)]
    pub view_mode: ViewMode,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            row_limit: default_row_limit(),
            view_mode: ViewMode::default(),
        }
    }
}

fn default_row_limit() -> usize {
    DEFAULT_RESULT_LIMIT
}
