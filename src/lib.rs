//! Occurrence book server library.
//!
//! Residents file incident reports, attach comments and evidence files, and
//! administrators triage them through a status workflow. This crate holds
//! the HTTP layer, the domain services and the persistence backends.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
pub mod storage;
pub mod store;
