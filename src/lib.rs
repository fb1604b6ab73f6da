//! UI-SPEC Preflight - cross-document consistency engine
//!
//! # Ground Rules
//! 1. Meta Is Authority: every breakpoint check derives from meta.yml
//! 2. Every Subsystem Runs: one pass surfaces the full defect set
//! 3. One Bad File Is One Issue: siblings are always still checked
//! 4. Warnings Are Advisory: only errors fail a run
//! 5. Reports Are Deterministic: same tree, same bytes

pub mod tree;
pub mod breakpoints;
pub mod documents;
pub mod loader;
pub mod config;
pub mod report;
pub mod rules;
pub mod assets;
pub mod routes;
pub mod preflight;
pub mod references;
pub mod hashing;
pub mod manifest;

pub use tree::{FsTree, MemoryTree, ResourceResolver, SpecTree};
pub use breakpoints::{Breakpoint, BreakpointAuthority};
pub use config::PreflightConfig;
pub use report::{Category, Issue, Outcome, Report, Severity, Summary};
pub use assets::AssetCatalog;
pub use routes::{RouteStats, RouteValidator};
pub use preflight::{Preflight, PreflightError, PreflightRun, RunStats, Stage};
pub use references::{scan_references, ReferenceCounts, ReferenceScan};
pub use manifest::{generate_manifest, write_manifest, Manifest, ManifestError};

/// Exit code for a run that could not complete (meta.yml unusable, report unwritable).
pub const EXIT_FATAL: u8 = 2;
