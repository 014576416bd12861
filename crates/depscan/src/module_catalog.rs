//! Catalog of the project's own modules
//!
//! The catalog is built from a single walk of the scan root. It maps every source file
//! to its dotted module id and collects the set of names that must be treated as local
//! when classifying imports: each module id, every ancestor package of it, the bare
//! stem of plain modules (optional) and the configured allow-list.

use std::{
    ffi::OsStr,
    fs,
    path::{Component, Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use indexmap::{IndexMap, IndexSet};
use log::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

use crate::{config::Config, types::ScanFailure};

/// Extension of the files the catalog picks up
pub const SOURCE_EXTENSION: &str = "py";

const PACKAGE_INIT: &str = "__init__.py";

#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    /// Names unioned into the local set unconditionally
    pub known_local: IndexSet<String>,
    /// Directory names whose subtrees are not scanned
    pub exclude: IndexSet<String>,
    /// Also register `util` for `pkg/util.py`
    pub bare_module_aliases: bool,
}

impl CatalogOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            known_local: config.known_local.clone(),
            exclude: config.exclude.clone(),
            bare_module_aliases: config.bare_module_aliases,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    local_modules: IndexSet<String>,
    file_modules: IndexMap<PathBuf, String>,
    source_files: Vec<PathBuf>,
    unreadable: Vec<ScanFailure>,
}

impl ModuleCatalog {
    /// Walk `root` and catalog every `.py` file below it
    ///
    /// Fails only when the root itself cannot be read. Symlinks are followed. Source
    /// files that cannot be opened get no module id and are kept in
    /// [`ModuleCatalog::unreadable_files`]; other unreadable entries are logged and
    /// skipped.
    pub fn discover(root: &Path, options: &CatalogOptions) -> Result<Self> {
        let metadata = fs::metadata(root)
            .with_context(|| format!("Cannot access scan root {}", root.display()))?;
        if !metadata.is_dir() {
            bail!("Scan root {} is not a directory", root.display());
        }
        fs::read_dir(root)
            .with_context(|| format!("Cannot read scan root {}", root.display()))?;

        let mut source_files = Vec::new();
        let mut unreadable = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_excluded_dir(entry, &options.exclude));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    match e.path() {
                        Some(path) if is_source_file(path) => {
                            unreadable.extend(unreadable_file(root, path, &e));
                        }
                        _ => {
                            warn!("Skipping unreadable entry under {}: {e}", root.display());
                        }
                    }
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_source_file(entry.path()) {
                continue;
            }
            if let Err(e) = fs::File::open(entry.path()) {
                unreadable.extend(unreadable_file(root, entry.path(), &e));
                continue;
            }
            match entry.path().strip_prefix(root) {
                Ok(relative) => source_files.push(relative.to_path_buf()),
                Err(e) => warn!("Skipping {}: {e}", entry.path().display()),
            }
        }

        debug!(
            "Discovered {} source files under {}",
            source_files.len(),
            root.display()
        );
        let mut catalog = Self::from_source_files(source_files, options);
        catalog.unreadable = unreadable;
        Ok(catalog)
    }

    /// Build a catalog from paths relative to the scan root
    pub fn from_source_files(
        files: impl IntoIterator<Item = PathBuf>,
        options: &CatalogOptions,
    ) -> Self {
        let mut catalog = Self::default();
        for relative in files {
            catalog.register(relative, options);
        }
        catalog
            .local_modules
            .extend(options.known_local.iter().cloned());
        catalog
    }

    fn register(&mut self, relative: PathBuf, options: &CatalogOptions) {
        self.source_files.push(relative.clone());

        let Some(module_id) = module_id_for_path(&relative) else {
            debug!("No module id for {}", relative.display());
            return;
        };
        trace!("{} -> {module_id}", relative.display());

        self.insert_with_ancestors(&module_id);
        if options.bare_module_aliases
            && !is_package_init(&relative)
            && let Some(stem) = relative.file_stem().and_then(OsStr::to_str)
        {
            self.local_modules.insert(stem.to_owned());
        }
        self.file_modules.insert(relative, module_id);
    }

    fn insert_with_ancestors(&mut self, module_id: &str) {
        for (idx, _) in module_id.match_indices('.') {
            self.local_modules.insert(module_id[..idx].to_owned());
        }
        self.local_modules.insert(module_id.to_owned());
    }

    pub fn is_local(&self, name: &str) -> bool {
        self.local_modules.contains(name)
    }

    /// Longest dotted prefix of `module` that is a local name
    ///
    /// `pkg.util.helpers` resolves to `pkg.util` when only `pkg` and `pkg.util` exist.
    pub fn resolve_local<'a>(&self, module: &'a str) -> Option<&'a str> {
        if self.is_local(module) {
            return Some(module);
        }
        module
            .rmatch_indices('.')
            .map(|(idx, _)| &module[..idx])
            .find(|prefix| self.is_local(prefix))
    }

    /// Owning module id of a file, by path relative to the scan root
    pub fn module_for_file(&self, relative: &Path) -> Option<&str> {
        self.file_modules.get(relative).map(String::as_str)
    }

    pub fn local_modules(&self) -> &IndexSet<String> {
        &self.local_modules
    }

    pub fn sorted_local_modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = self.local_modules.iter().map(String::as_str).collect();
        modules.sort_unstable();
        modules
    }

    /// Every readable source file, including those without a module id
    pub fn source_files(&self) -> &[PathBuf] {
        &self.source_files
    }

    /// Source files found during the walk that could not be opened
    pub fn unreadable_files(&self) -> &[ScanFailure] {
        &self.unreadable
    }
}

/// Dotted module id for a source path relative to the scan root
///
/// `pkg/sub/__init__.py` maps to `pkg.sub`, `pkg/util.py` to `pkg.util`. A top-level
/// `__init__.py` and paths that are not valid UTF-8 have no module id.
pub fn module_id_for_path(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }

    let file_name = parts.pop()?;
    let stem = file_name.strip_suffix(".py")?;
    if file_name != PACKAGE_INIT {
        parts.push(stem);
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("."))
}

fn unreadable_file(
    root: &Path,
    path: &Path,
    error: &dyn std::error::Error,
) -> Option<ScanFailure> {
    let relative = path.strip_prefix(root).ok()?;
    warn!("Skipping unreadable file {}: {error}", path.display());
    Some(ScanFailure {
        path: relative.to_path_buf(),
        message: format!("Failed to read {}: {error}", path.display()),
    })
}

fn is_package_init(path: &Path) -> bool {
    path.file_name() == Some(OsStr::new(PACKAGE_INIT))
}

fn is_source_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(OsStr::to_str) else {
        return false;
    };
    !name.starts_with('.') && path.extension() == Some(OsStr::new(SOURCE_EXTENSION))
}

fn is_excluded_dir(entry: &DirEntry, exclude: &IndexSet<String>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| exclude.contains(name))
}
