//! Flat table projection of a result page.

use mongodb::bson::Document;

use crate::bson::{MAX_LENGTH, bson_value_preview};

/// One column per top-level key, one row per document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).and_then(|r| r.get(idx)).map(String::as_str)
    }
}

/// Columns are the union of keys in first-seen order; absent fields render empty.
pub fn build_result_table(documents: &[Document]) -> ResultTable {
    let mut columns: Vec<String> = Vec::new();
    for doc in documents {
        for key in doc.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = documents
        .iter()
        .map(|doc| {
            columns
                .iter()
                .map(|column| {
                    doc.get(column)
                        .map(|value| bson_value_preview(value, MAX_LENGTH))
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    ResultTable { columns, rows }
}
