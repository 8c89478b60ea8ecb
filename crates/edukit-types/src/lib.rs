//! Shared types, adapter traits, and error types for the Edukit platform.
//!
//! This crate contains the foundational types shared between the engine
//! crate and all adapter implementations. Extracting these into a separate
//! crate allows adapter crates to compile in parallel with the engine's
//! feature modules.

pub mod directory_adapter;
pub mod error;
pub mod prelude;
pub mod store_adapter;
pub mod types;

// vim: ts=4
