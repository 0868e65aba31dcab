//! BSON path navigation and manipulation utilities.

use std::fmt;

use mongodb::bson::{Bson, Document};

/// Represents a segment in a path through a BSON document.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A key in a document
    Key(String),
    /// An index in an array
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(idx) => write!(f, "[{idx}]"),
        }
    }
}

/// Render a path as `a.b[2].c` for messages.
pub fn format_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        if matches!(segment, PathSegment::Key(_)) && !out.is_empty() {
            out.push('.');
        }
        out.push_str(&segment.to_string());
    }
    out
}

/// Check if a BSON value at the given path is editable inline.
pub fn is_editable_value(value: &Bson, path: &[PathSegment]) -> bool {
    // top-level _id identifies the document and is never rewritten
    if matches!(path, [PathSegment::Key(key)] if key == "_id") {
        return false;
    }

    !matches!(value, Bson::Document(_) | Bson::Array(_))
}

/// Get a reference to a BSON value at the given path within a document.
pub fn get_bson_at_path<'a>(doc: &'a Document, path: &[PathSegment]) -> Option<&'a Bson> {
    if path.is_empty() {
        return None;
    }

    match &path[0] {
        PathSegment::Key(key) => {
            doc.get(key).and_then(|value| get_bson_in_value(value, &path[1..]))
        }
        PathSegment::Index(_) => None,
    }
}

fn get_bson_in_value<'a>(value: &'a Bson, path: &[PathSegment]) -> Option<&'a Bson> {
    if path.is_empty() {
        return Some(value);
    }

    match (&path[0], value) {
        (PathSegment::Key(key), Bson::Document(doc)) => {
            doc.get(key).and_then(|inner| get_bson_in_value(inner, &path[1..]))
        }
        (PathSegment::Index(idx), Bson::Array(arr)) => {
            arr.get(*idx).and_then(|inner| get_bson_in_value(inner, &path[1..]))
        }
        _ => None,
    }
}

fn get_bson_in_value_mut<'a>(value: &'a mut Bson, path: &[PathSegment]) -> Option<&'a mut Bson> {
    if path.is_empty() {
        return Some(value);
    }

    match (&path[0], value) {
        (PathSegment::Key(key), Bson::Document(doc)) => {
            doc.get_mut(key).and_then(|inner| get_bson_in_value_mut(inner, &path[1..]))
        }
        (PathSegment::Index(idx), Bson::Array(arr)) => {
            arr.get_mut(*idx).and_then(|inner| get_bson_in_value_mut(inner, &path[1..]))
        }
        _ => None,
    }
}

/// Get the document at `path` (the root document when `path` is empty).
pub fn document_at_path_mut<'a>(
    doc: &'a mut Document,
    path: &[PathSegment],
) -> Option<&'a mut Document> {
    let Some((first, rest)) = path.split_first() else {
        return Some(doc);
    };
    let PathSegment::Key(key) = first else {
        return None;
    };
    match doc.get_mut(key).and_then(|value| get_bson_in_value_mut(value, rest)) {
        Some(Bson::Document(inner)) => Some(inner),
        _ => None,
    }
}

/// Get the array at `path`.
pub fn array_at_path_mut<'a>(
    doc: &'a mut Document,
    path: &[PathSegment],
) -> Option<&'a mut Vec<Bson>> {
    let (first, rest) = path.split_first()?;
    let PathSegment::Key(key) = first else {
        return None;
    };
    match doc.get_mut(key).and_then(|value| get_bson_in_value_mut(value, rest)) {
        Some(Bson::Array(arr)) => Some(arr),
        _ => None,
    }
}

/// Set a BSON value at the given path within a document.
/// Returns true if the value was successfully set.
pub fn set_bson_at_path(doc: &mut Document, path: &[PathSegment], new_value: Bson) -> bool {
    if path.is_empty() {
        return false;
    }

    match &path[0] {
        PathSegment::Key(key) => {
            if path.len() == 1 {
                doc.insert(key.clone(), new_value);
                return true;
            }

            if let Some(value) = doc.get_mut(key) {
                return set_bson_in_value(value, &path[1..], new_value);
            }
        }
        PathSegment::Index(_) => return false,
    }

    false
}

fn set_bson_in_value(value: &mut Bson, path: &[PathSegment], new_value: Bson) -> bool {
    if path.is_empty() {
        *value = new_value;
        return true;
    }

    match (&path[0], value) {
        (PathSegment::Key(key), Bson::Document(doc)) => {
            if path.len() == 1 {
                doc.insert(key.clone(), new_value);
                return true;
            }

            if let Some(next) = doc.get_mut(key) {
                return set_bson_in_value(next, &path[1..], new_value);
            }
        }
        (PathSegment::Index(index), Bson::Array(arr)) => {
            if *index >= arr.len() {
                return false;
            }
            if path.len() == 1 {
                arr[*index] = new_value;
                return true;
            }
            return set_bson_in_value(&mut arr[*index], &path[1..], new_value);
        }
        _ => {}
    }

    false
}

/// Remove the value at `path`, returning it.
///
/// Removing an array element shifts the following elements down by one.
pub fn remove_bson_at_path(doc: &mut Document, path: &[PathSegment]) -> Option<Bson> {
    let (last, parent) = path.split_last()?;
    match last {
        PathSegment::Key(key) => document_at_path_mut(doc, parent)?.remove(key),
        PathSegment::Index(idx) => {
            let arr = array_at_path_mut(doc, parent)?;
            (*idx < arr.len()).then(|| arr.remove(*idx))
        }
    }
}
