//! Import discovery visitor that finds all absolute imports in a Python module,
//! including those nested within functions, classes, and other scopes.

use anyhow::{Result, anyhow};
use indexmap::IndexSet;
use ruff_python_ast::{
    Stmt, StmtImport, StmtImportFrom,
    visitor::{Visitor, walk_stmt},
};
use ruff_python_parser::parse_module;

/// An absolute import target, e.g. `pkg.util` for `from pkg.util import helper`
///
/// Aliases are not kept. Classification only looks at [`ImportReference::root`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImportReference {
    module: String,
}

impl ImportReference {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
        }
    }

    /// Full dotted module name
    pub fn module(&self) -> &str {
        &self.module
    }

    /// First dotted segment of the module name
    pub fn root(&self) -> &str {
        self.module.split('.').next().unwrap_or(&self.module)
    }
}

/// Imports discovered in a single file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileImports {
    /// Absolute import targets in source order, without duplicates
    pub references: IndexSet<ImportReference>,
    /// Number of relative import statements that were skipped
    pub relative_imports: usize,
}

impl FileImports {
    /// Distinct root names in source order
    pub fn root_names(&self) -> IndexSet<&str> {
        self.references.iter().map(ImportReference::root).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

/// Visitor that collects the absolute imports of a module
#[derive(Debug, Default)]
pub struct ImportDiscoveryVisitor {
    imports: FileImports,
}

impl ImportDiscoveryVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_imports(self) -> FileImports {
        self.imports
    }

    /// `import a.b.c` and `import a.b.c as d` both reference `a.b.c`
    fn record_import(&mut self, import_stmt: &StmtImport) {
        for alias in &import_stmt.names {
            self.imports
                .references
                .insert(ImportReference::new(alias.name.as_str()));
        }
    }

    /// Relative imports (`from . import x`, `from ..pkg import y`) always point inside
    /// the project and are skipped
    fn record_import_from(&mut self, import_from: &StmtImportFrom) {
        if import_from.level > 0 {
            self.imports.relative_imports += 1;
            return;
        }
        if let Some(module) = &import_from.module {
            self.imports
                .references
                .insert(ImportReference::new(module.as_str()));
        }
    }
}

impl<'a> Visitor<'a> for ImportDiscoveryVisitor {
    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Import(import_stmt) => self.record_import(import_stmt),
            Stmt::ImportFrom(import_from) => self.record_import_from(import_from),
            _ => {}
        }
        walk_stmt(self, stmt);
    }
}

/// Parse `source` and collect its absolute imports
pub fn extract_imports(source: &str) -> Result<FileImports> {
    let parsed = parse_module(source).map_err(|e| anyhow!("{e}"))?;
    let mut visitor = ImportDiscoveryVisitor::new();
    visitor.visit_body(&parsed.syntax().body);
    Ok(visitor.into_imports())
}
