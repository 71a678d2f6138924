//! Pipeline orchestration: stage sequencing, artifact derivation, and
//! output staging.
//!
//! # Architecture
//!
//! ```text
//! run()
//!     ├── resolver      validate scan, templates, BEaST library
//!     ├── Workspace     open scratch directory (removed on every exit)
//!     ├── staging       prepare output subdir (overwrite-or-reject)
//!     ├── stages        Materialize → Convert → Denoise → Normalize →
//!     │                 Segment → Extract → Nonlinear → Dbm →
//!     │                 Reshape → Export
//!     └── staging       copy all/subset artifacts out
//! ```
//!
//! The stage chain is data: [`stages::build_stage_plan`] produces an
//! ordered list of command descriptors that the driver feeds through the
//! [`crate::runner::CommandRunner`] one at a time, stopping at the first
//! nonzero exit.

mod artifacts;
mod pipeline;
mod stages;
mod staging;

pub use artifacts::{ArtifactMap, ArtifactRole};
pub use pipeline::{run, RunReport};
pub use stages::{build_stage_plan, Stage};
pub use staging::{prepare_output_dir, stage_outputs};
