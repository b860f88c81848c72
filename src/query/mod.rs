//! Query requests, validation, results and the named analytical queries.

pub mod builders;
pub mod normalize;
pub mod request;
pub mod result;

pub use request::{validate, QueryRequest, RoutingTarget, ValidatedRequest};
pub use result::{QueryResult, Record, ResultMetadata};
