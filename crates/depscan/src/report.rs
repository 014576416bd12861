//! Report assembly
//!
//! Turns scan results into the requirements manifest, the JSON report and the console
//! summary. All lists are sorted so repeated runs over the same tree produce identical
//! files.

use std::{
    fs,
    io::{self, Write},
    path::{MAIN_SEPARATOR_STR, Path},
};

use anyhow::{Context, Result};
use cow_utils::CowUtils;
use indexmap::{IndexMap, IndexSet};
use log::debug;
use pep508_rs::PackageName;
use serde::Serialize;

use crate::{
    analysis::Cycle,
    classifier::ImportClass,
    graph_builder::local_targets,
    orchestrator::ScanResults,
    tables::NameTables,
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyReport {
    /// Every import root seen in the project
    pub all_imports: Vec<String>,
    /// Import roots per file
    pub file_imports: IndexMap<String, Vec<String>>,
    /// Local modules imported per file
    pub local_imports: IndexMap<String, Vec<String>>,
    /// Third-party import roots as written in the sources
    pub third_party: Vec<String>,
    /// Distribution names of the third-party imports
    pub third_party_packages: Vec<String>,
    pub local_modules: Vec<String>,
    pub dependency_graph: IndexMap<String, Vec<String>>,
    pub circular_dependencies: Vec<Cycle>,
    /// Module count of the longest reported cycle, 0 without cycles
    pub largest_cycle_size: usize,
    pub strongly_connected_components: Vec<Vec<String>>,
    /// Files that could not be read or parsed, with the cause
    pub parse_errors: IndexMap<String, String>,
}

impl DependencyReport {
    pub fn from_scan(results: &ScanResults, tables: &NameTables) -> Self {
        let classifier = results.classifier(tables);

        let mut all_imports = IndexSet::new();
        let mut file_imports = IndexMap::new();
        let mut local_imports = IndexMap::new();
        for file in &results.files {
            let path = display_path(&file.path);

            let roots = sorted(file.imports.root_names().into_iter().map(str::to_owned));
            all_imports.extend(roots.iter().cloned());
            file_imports.insert(path.clone(), roots);

            let locals = sorted(
                local_targets(&file.imports, &classifier)
                    .into_iter()
                    .map(str::to_owned),
            );
            local_imports.insert(path, locals);
        }
        file_imports.sort_keys();
        local_imports.sort_keys();

        let all_imports = sorted(all_imports);
        let third_party: Vec<String> = all_imports
            .iter()
            .filter(|name| classifier.classify(name) == ImportClass::ThirdParty)
            .cloned()
            .collect();

        let mut packages: IndexMap<String, String> = IndexMap::new();
        for name in &third_party {
            let package = classifier.package_name(name);
            packages
                .entry(normalized_package_name(package))
                .or_insert_with(|| package.to_owned());
        }
        let third_party_packages = sorted(packages.into_values());

        let mut parse_errors: IndexMap<String, String> = results
            .failures
            .iter()
            .map(|failure| (display_path(&failure.path), failure.message.clone()))
            .collect();
        parse_errors.sort_keys();

        Self {
            all_imports,
            file_imports,
            local_imports,
            third_party,
            third_party_packages,
            local_modules: results
                .catalog
                .sorted_local_modules()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            dependency_graph: results.graph.to_adjacency(),
            circular_dependencies: results.circular_deps.cycles.clone(),
            largest_cycle_size: results.circular_deps.largest_cycle_size,
            strongly_connected_components: results.circular_deps.components.clone(),
            parse_errors,
        }
    }

    /// Manifest contents: one distribution name per line
    pub fn requirements(&self) -> String {
        let mut contents = String::new();
        for package in &self.third_party_packages {
            contents.push_str(package);
            contents.push('\n');
        }
        contents
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize dependency report")
    }

    pub fn write_requirements(&self, path: &Path) -> Result<()> {
        write_file(path, &self.requirements())
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut json = self.to_json()?;
        json.push('\n');
        write_file(path, &json)
    }

    /// Human-readable summary of the scan
    pub fn write_summary(&self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "Scanned {} files", self.file_imports.len())?;
        if self.parse_errors.is_empty() {
            writeln!(out)?;
        } else {
            writeln!(out, " ({} could not be read or parsed)", self.parse_errors.len())?;
        }

        if self.third_party_packages.is_empty() {
            writeln!(out, "No third-party packages found")?;
        } else {
            writeln!(
                out,
                "Third-party packages ({}): {}",
                self.third_party_packages.len(),
                self.third_party_packages.join(", ")
            )?;
        }

        if self.circular_dependencies.is_empty() {
            writeln!(out, "No circular dependencies found")?;
        } else {
            writeln!(
                out,
                "Circular dependencies ({}, largest spans {} modules):",
                self.circular_dependencies.len(),
                self.largest_cycle_size
            )?;
            for cycle in &self.circular_dependencies {
                writeln!(out, "  {cycle}")?;
            }
        }
        Ok(())
    }
}

fn sorted(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut items: Vec<String> = items.into_iter().collect();
    items.sort_unstable();
    items.dedup();
    items
}

/// Forward-slash path, independent of the platform separator
fn display_path(path: &Path) -> String {
    path.to_string_lossy()
        .cow_replace(MAIN_SEPARATOR_STR, "/")
        .into_owned()
}

/// PEP 503 form used to tell distributions apart (`PyYAML` and `pyyaml` are one)
fn normalized_package_name(name: &str) -> String {
    PackageName::new(name.to_owned()).map_or_else(
        |_| name.cow_to_ascii_lowercase().into_owned(),
        |package| package.to_string(),
    )
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(())
}
