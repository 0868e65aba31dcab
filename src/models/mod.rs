// Data structures and types

pub mod connection;
pub mod query;

pub use connection::ServerConfiguration;
pub use query::{
    CollectionRef, DEFAULT_RESULT_LIMIT, QueryOptions, ResultSet, SharedResultSet, parse_row_limit,
};
