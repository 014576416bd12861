/// Graph builder that creates the module dependency graph from scanned files
/// This module bridges the per-file import sets and the project-wide graph
use indexmap::IndexSet;
use log::trace;

use crate::{
    classifier::{Classifier, ImportClass},
    dependency_graph::DependencyGraph,
    types::ScannedFile,
    visitors::FileImports,
};

/// Accumulates edges from each file's owning module to the local modules it imports
#[derive(Debug)]
pub struct GraphBuilder<'a> {
    classifier: Classifier<'a>,
    graph: DependencyGraph,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(classifier: Classifier<'a>) -> Self {
        Self {
            classifier,
            graph: DependencyGraph::new(),
        }
    }

    /// Build the graph for a whole scan
    pub fn build(files: &[ScannedFile], classifier: Classifier<'a>) -> DependencyGraph {
        let mut builder = Self::new(classifier);
        for file in files {
            builder.add_file(file.module_id.as_deref(), &file.imports);
        }
        builder.finish()
    }

    /// Record the local imports of one file
    ///
    /// Files without an owning module contribute no edges.
    pub fn add_file(&mut self, owner: Option<&str>, imports: &FileImports) {
        let Some(owner) = owner else {
            return;
        };
        self.graph.add_module(owner);
        for target in local_targets(imports, &self.classifier) {
            if self.graph.add_dependency(owner, target) {
                trace!("{owner} -> {target}");
            }
        }
    }

    pub fn finish(self) -> DependencyGraph {
        self.graph
    }
}

/// Local modules targeted by a file's imports
///
/// An import whose root classifies as local targets the most specific local module
/// named by it: `import pkg.util` targets `pkg.util`, `from pkg import util` targets
/// `pkg`.
pub fn local_targets<'i>(
    imports: &'i FileImports,
    classifier: &Classifier<'_>,
) -> IndexSet<&'i str> {
    imports
        .references
        .iter()
        .filter(|reference| classifier.classify(reference.root()) == ImportClass::Local)
        .map(|reference| {
            classifier
                .catalog()
                .resolve_local(reference.module())
                .unwrap_or_else(|| reference.root())
        })
        .collect()
}
