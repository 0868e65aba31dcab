//! BSON utilities for document manipulation, formatting, and parsing.

mod dbref;
mod formatter;
mod parser;
mod path;

pub use dbref::*;
pub use formatter::*;
pub use parser::*;
pub use path::*;
