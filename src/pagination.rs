//! Page windows over a result set.

use std::fmt;
use std::num::NonZeroUsize;

use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How many documents a page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    /// Show the whole result set on one page.
    All,
    Limited(NonZeroUsize),
}

impl PageSize {
    pub const PRESETS: [PageSize; 5] = [
        PageSize::Limited(NonZeroUsize::new(10).unwrap()),
        PageSize::Limited(NonZeroUsize::new(20).unwrap()),
        PageSize::Limited(NonZeroUsize::new(50).unwrap()),
        PageSize::Limited(NonZeroUsize::new(100).unwrap()),
        PageSize::All,
    ];

    pub fn limited(size: usize) -> Option<Self> {
        NonZeroUsize::new(size).map(PageSize::Limited)
    }

    /// Parse the page-size field: `all` or a positive integer.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(PageSize::All);
        }
        trimmed
            .parse::<usize>()
            .ok()
            .and_then(Self::limited)
            .ok_or_else(|| Error::Validation(format!("Invalid page size '{trimmed}'")))
    }

    pub fn get(self) -> Option<usize> {
        match self {
            PageSize::All => None,
            PageSize::Limited(size) => Some(size.get()),
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::PRESETS[1]
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::All => f.write_str("All"),
            PageSize::Limited(size) => write!(f, "{size}"),
        }
    }
}

/// Return the documents of one page: `[start_index, start_index + size)`, clamped to the
/// number of documents.
pub fn slice(
    documents: &[Document],
    page_size: PageSize,
    start_index: usize,
) -> Result<&[Document]> {
    let PageSize::Limited(size) = page_size else {
        return Ok(documents);
    };
    if start_index > documents.len() {
        return Err(Error::Index { index: start_index, len: documents.len() });
    }
    let end = start_index.saturating_add(size.get()).min(documents.len());
    Ok(&documents[start_index..end])
}

/// Current page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    page_size: PageSize,
    start_index: usize,
}

impl Pagination {
    pub fn new(page_size: PageSize) -> Self {
        Self { page_size, start_index: 0 }
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// One past the last index shown, for `total` documents.
    pub fn end_index(&self, total: usize) -> usize {
        match self.page_size {
            PageSize::All => total,
            PageSize::Limited(size) => self.start_index.saturating_add(size.get()).min(total),
        }
    }

    /// Zero-based number of the current page.
    pub fn current_page(&self) -> usize {
        match self.page_size {
            PageSize::All => 0,
            PageSize::Limited(size) => self.start_index / size.get(),
        }
    }

    pub fn page_count(&self, total: usize) -> usize {
        match self.page_size {
            PageSize::All => usize::from(total > 0),
            PageSize::Limited(size) => total.div_ceil(size.get()),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.start_index > 0
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.end_index(total) < total
    }

    pub fn next_page(&mut self, total: usize) -> bool {
        let PageSize::Limited(size) = self.page_size else {
            return false;
        };
        if !self.has_next(total) {
            return false;
        }
        self.start_index += size.get();
        true
    }

    pub fn previous_page(&mut self) -> bool {
        let PageSize::Limited(size) = self.page_size else {
            return false;
        };
        if !self.has_previous() {
            return false;
        }
        self.start_index = self.start_index.saturating_sub(size.get());
        true
    }

    /// Change the page size, keeping the page that contains the current start document.
    pub fn set_page_size(&mut self, page_size: PageSize, total: usize) {
        self.page_size = page_size;
        self.start_index = match page_size {
            PageSize::All => 0,
            PageSize::Limited(size) => self.start_index / size.get() * size.get(),
        };
        self.clamp_to(total);
    }

    /// Pull the window back in range after the result set shrank.
    pub fn clamp_to(&mut self, total: usize) {
        if total == 0 {
            self.start_index = 0;
            return;
        }
        if self.start_index >= total {
            self.start_index = match self.page_size {
                PageSize::All => 0,
                PageSize::Limited(size) => (total - 1) / size.get() * size.get(),
            };
        }
    }

    pub fn reset(&mut self) {
        self.start_index = 0;
    }

    /// The documents of the current page.
    pub fn slice<'a>(&self, documents: &'a [Document]) -> Result<&'a [Document]> {
        slice(documents, self.page_size, self.start_index)
    }
}
