//! Access-control resolution engine for the Edukit platform.
//!
//! Resolves, for a given user and resource, whether that user may see or
//! act on it, across four independent axes: tenant-level feature gating
//! (cohort membership), course enrollment, activity group-visibility mode,
//! and per-entry shared-access grants with expiry. The dashboard and CRUD
//! surfaces consuming these decisions live outside this workspace.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod cohort;
pub mod entries;
pub mod prelude;
pub mod registry;
pub mod sharing;
pub mod visibility;

// Re-export commonly used types
pub use app::{App, AppOpts, AppState};
pub use registry::{FeaturePlugin, FeatureRegistry};

// vim: ts=4
