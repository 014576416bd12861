use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::{
    analysis::{CircularDependencyAnalysis, CircularDependencyAnalyzer},
    classifier::Classifier,
    config::Config,
    dependency_graph::DependencyGraph,
    graph_builder::GraphBuilder,
    module_catalog::{CatalogOptions, ModuleCatalog},
    tables::NameTables,
    types::{ScanFailure, ScannedFile},
    visitors::{FileImports, extract_imports},
};

/// Everything derived from one pass over the source tree
#[derive(Debug)]
pub struct ScanResults {
    pub root: PathBuf,
    pub catalog: ModuleCatalog,
    /// Every discovered file; files that failed to scan carry no imports
    pub files: Vec<ScannedFile>,
    pub failures: Vec<ScanFailure>,
    pub graph: DependencyGraph,
    pub circular_deps: CircularDependencyAnalysis,
}

impl ScanResults {
    pub fn classifier<'a>(&'a self, tables: &'a NameTables) -> Classifier<'a> {
        Classifier::new(&self.catalog, tables)
    }
}

#[derive(Debug)]
pub struct DependencyScanner {
    config: Config,
    tables: NameTables,
}

impl DependencyScanner {
    pub fn new(config: Config) -> Result<Self> {
        let tables = NameTables::from_config(&config)?;
        Ok(Self::with_tables(config, tables))
    }

    pub fn with_tables(config: Config, tables: NameTables) -> Self {
        Self { config, tables }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tables(&self) -> &NameTables {
        &self.tables
    }

    /// Catalog the tree, extract imports, build the graph and search it for cycles
    pub fn scan(&self) -> Result<ScanResults> {
        let root = self.config.root.clone();
        info!("Scanning {}", root.display());
        debug!(
            "Using target Python version: {} (Python 3.{})",
            self.config.target_version,
            self.tables.python_version()
        );

        let catalog = ModuleCatalog::discover(&root, &CatalogOptions::from_config(&self.config))?;
        info!(
            "Found {} source files and {} local module names",
            catalog.source_files().len(),
            catalog.local_modules().len()
        );

        let mut files = Vec::with_capacity(catalog.source_files().len());
        let mut failures = Vec::new();
        for relative in catalog.source_files() {
            let imports = match scan_file(&root, relative) {
                Ok(imports) => {
                    debug!(
                        "{}: {} imports, {} relative imports skipped",
                        relative.display(),
                        imports.references.len(),
                        imports.relative_imports
                    );
                    imports
                }
                Err(e) => {
                    warn!("Could not scan {}: {e:#}", relative.display());
                    failures.push(ScanFailure {
                        path: relative.clone(),
                        message: format!("{e:#}"),
                    });
                    FileImports::default()
                }
            };
            files.push(ScannedFile {
                path: relative.clone(),
                module_id: catalog.module_for_file(relative).map(str::to_owned),
                imports,
            });
        }
        for failure in catalog.unreadable_files() {
            files.push(ScannedFile {
                path: failure.path.clone(),
                module_id: None,
                imports: FileImports::default(),
            });
            failures.push(failure.clone());
        }

        let graph = GraphBuilder::build(&files, Classifier::new(&catalog, &self.tables));
        debug!(
            "Graph has {} modules and {} dependencies",
            graph.module_count(),
            graph.dependency_count()
        );

        let circular_deps = CircularDependencyAnalyzer::new(&graph).analyze();
        if circular_deps.has_cycles() {
            info!(
                "Detected {} circular dependencies",
                circular_deps.total_cycles_detected()
            );
        }

        Ok(ScanResults {
            root,
            catalog,
            files,
            failures,
            graph,
            circular_deps,
        })
    }
}

fn scan_file(root: &Path, relative: &Path) -> Result<FileImports> {
    let path = root.join(relative);
    let source = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    extract_imports(&source).with_context(|| format!("Failed to parse {}", path.display()))
}
