// src/core/mod.rs

// Root of the `core` module: everything needed to run a scan, independent of
// how the report is shown.

/// Report, target and per-probe result types.
pub mod models;

/// Error kinds raised by targets and collaborators.
pub mod error;

/// Normalization of the user-supplied URL.
pub mod target;

/// The external services a scan talks to, behind swappable traits.
pub mod collaborators;

/// The probes and the aggregator that runs them concurrently.
pub mod scanner;

/// The technology keyword vocabulary.
pub mod knowledge_base;

#[cfg(test)]
pub mod testing;
