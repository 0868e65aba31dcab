//! Test fixtures for integration tests.

#![allow(dead_code)]

use mongodb::bson::{Document, doc, oid::ObjectId};

/// Numbered documents with a nested sub-document each.
pub fn numbered_documents(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| {
            doc! {
                "_id": i as i32,
                "name": format!("Document {}", i),
                "category": if i % 2 == 0 { "even" } else { "odd" },
                "nested": { "field": format!("nested_{}", i) },
            }
        })
        .collect()
}

/// A document covering the value kinds the tree distinguishes.
pub fn document_with_all_types() -> Document {
    doc! {
        "_id": ObjectId::new(),
        "string": "hello world",
        "int32": 42_i32,
        "int64": 9_000_000_000_000_i64,
        "double": std::f64::consts::PI,
        "boolean": true,
        "null": null,
        "array": ["a", "b", "c"],
        "nested": { "key": "value", "deep": { "deeper": "bottom" } },
        "date": mongodb::bson::DateTime::now(),
    }
}

/// Books pointing at authors through DBRefs; the second reference dangles.
pub fn books(authors_db: &str) -> Vec<Document> {
    vec![
        doc! {
            "_id": 1,
            "title": "Dune",
            "author": { "$ref": "authors", "$id": 10, "$db": authors_db },
        },
        doc! {
            "_id": 2,
            "title": "Emma",
            "author": { "$ref": "authors", "$id": 99, "$db": authors_db },
        },
    ]
}

pub fn authors() -> Vec<Document> {
    vec![doc! { "_id": 10, "name": "Frank Herbert" }]
}
