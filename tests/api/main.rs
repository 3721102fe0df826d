//! HTTP end-to-end test suite.
//!
//! Runs the full route table against the in-memory store and a local blob
//! store in a temporary directory; no database is required.
//!
//! Run with: cargo test --test api

mod test_helpers;

mod test_accounts;
mod test_attachments;
mod test_health;
mod test_incidents;
