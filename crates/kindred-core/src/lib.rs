//! Core types, graph engine, and permission resolver for the Kindred
//! family-tree platform.
//!
//! Storage and HTTP live in sibling crates; everything here works against
//! the [`store::TreeStore`] trait and carries no backend of its own.

pub mod access;
pub mod engine;
pub mod error;
pub mod family;
pub mod ids;
pub mod permission;
pub mod person;
pub mod relationship;
pub mod service;
pub mod social;
pub mod store;

pub use error::{Error, Result};
