//! Core types, engines and the storage trait for the Linkboard job-link
//! tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Engines are plain async functions generic over [`store::LinkStore`]; the
//! acting user is always passed in as an already-verified id.

pub mod browse;
pub mod error;
pub mod ingest;
pub mod link;
pub mod open;
pub mod store;
pub mod tag;
pub mod user;

pub use error::{Error, Result};
