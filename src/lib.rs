//
// lib.rs
// Dicom-Study-rs
//
// Exposes the decoding and assembly modules and re-exports the main entry points.
//
// Thales Matheus Mendonça Santos - November 2025

// Leaf modules first: tag access, then per-kind decoders, then assembly and presentation.
pub mod annotation;
pub mod assembler;
pub mod classify;
pub mod cli;
pub mod content_tree;
pub mod dicom_access;
pub mod error;
pub mod metadata;
pub mod models;
pub mod overlay;
pub mod progress;
pub mod references;
pub mod scan;
pub mod summary;
pub mod tags;

#[cfg(test)]
mod test_support;

pub use assembler::{load_directory, load_files, LoadOptions, LoadedStudy};
pub use cli::{run as run_cli, Cli, Commands};
pub use error::{EmptyReason, FileError, LoadError};
