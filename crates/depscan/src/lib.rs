//! Static dependency scanner for Python source trees
//!
//! Walks a project, extracts absolute imports, separates third-party packages from the
//! standard library and the project's own modules, and reports import cycles between
//! local modules.

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod dependency_graph;
pub mod dirs;
pub mod graph_builder;
pub mod module_catalog;
pub mod orchestrator;
pub mod report;
pub mod stdlib_detection;
pub mod tables;
pub mod types;
pub mod visitors;
