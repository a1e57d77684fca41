//! Data Transfer Objects for API requests and responses.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
