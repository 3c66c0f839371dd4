//! Generic table framework for the restaurant data store.
//!
//! This module provides the building blocks for type-safe tables that manage
//! rows with CRUD operations, custom actions and a realtime change feed.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that row types implement to be stored in a table
//! - [`ResourceActor`] - Generic actor that owns the rows of one table
//! - [`ResourceClient`] - Type-safe client for talking to a table
//! - [`FrameworkError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test clients without spawning full tables.

pub mod core;
pub mod mock;

// Re-export core types for convenience
pub use core::*;
