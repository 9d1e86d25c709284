//! Climate Policy Database API client
//!
//! Builds filtered policy queries and turns the JSON answer into a
//! [`Dataset`](crate::core::Dataset).

pub mod request;
pub mod response;

pub use request::PolicyRequest;
pub use response::PolicyResponse;
