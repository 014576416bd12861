//! Circular dependency analysis over the module graph

pub mod circular_analyzer;
pub mod circular_deps;

pub use circular_analyzer::CircularDependencyAnalyzer;
pub use circular_deps::{CircularDependencyAnalysis, Cycle};
