//! AST visitor implementations
//!
//! This module contains visitor patterns for traversing Python AST nodes.

mod import_discovery;

pub use import_discovery::{
    FileImports, ImportDiscoveryVisitor, ImportReference, extract_imports,
};
