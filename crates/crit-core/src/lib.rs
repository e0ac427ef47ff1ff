//! Core types and trait definitions for the crit review store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod media;
pub mod merge;
pub mod photos;
pub mod profile;
pub mod rating;
pub mod review;
pub mod reviewable;
pub mod store;
pub mod submit;

pub use error::{Error, ErrorKind, Result, StoreError};
