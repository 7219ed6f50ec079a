//! Core types and trait definitions for the agriculture advisory service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::AdvisoryStore`]; the HTTP layer drives
//! [`lifecycle::AdvisoryService`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod advisory;
pub mod error;
pub mod generator;
pub mod lifecycle;
pub mod store;

pub use error::{Error, Result};
