//! Domain types shared across the Lumeo workspace.
//!
//! This crate contains only pure types with no framework dependencies, so
//! any layer of a service can depend on it without pulling one in.

pub mod action;
pub mod id;
pub mod media;
pub mod pagination;
pub mod plan;
