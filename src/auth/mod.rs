//! Authentication: password hashing and the bearer token extractor.

mod extractor;
pub mod password;

pub use extractor::BearerAuth;
