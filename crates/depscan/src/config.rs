//! Layered configuration
//!
//! Settings are resolved from, in increasing precedence: built-in defaults, the user
//! configuration file, the project configuration file (or the one given with
//! `--config`), and finally command line flags applied by the caller.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use cow_utils::CowUtils;
use indexmap::{IndexMap, IndexSet};
use log::debug;
use pep508_rs::PackageName;
use serde::Deserialize;

use crate::dirs;

/// File name looked up in the scan root and the working directory
pub const CONFIG_FILE_NAME: &str = "depscan.toml";

const DEFAULT_TARGET_VERSION: &str = "py310";
const SUPPORTED_MINOR_VERSIONS: std::ops::RangeInclusive<u8> = 8..=14;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory containing the Python sources to scan
    pub root: PathBuf,
    /// Directory receiving the manifest and the JSON report
    pub output_dir: PathBuf,
    pub requirements_file: String,
    pub report_file: String,
    /// Target interpreter, e.g. `py310`; selects the stdlib database
    pub target_version: String,
    /// Names always treated as local even when no file defines them
    pub known_local: IndexSet<String>,
    pub extra_builtins: IndexSet<String>,
    pub extra_stdlib: IndexSet<String>,
    /// Directory names pruned from the scan
    pub exclude: IndexSet<String>,
    /// Register the bare stem of every plain module as a local name
    pub bare_module_aliases: bool,
    /// Import name -> distribution name overrides
    pub package_map: IndexMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("agent"),
            output_dir: PathBuf::from("tools/py_deps"),
            requirements_file: "requirements.txt".to_owned(),
            report_file: "dependency_report.json".to_owned(),
            target_version: DEFAULT_TARGET_VERSION.to_owned(),
            known_local: IndexSet::new(),
            extra_builtins: IndexSet::new(),
            extra_stdlib: IndexSet::new(),
            exclude: IndexSet::new(),
            bare_module_aliases: true,
            package_map: IndexMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from the user and project files on top of the defaults
    ///
    /// When `explicit` is given it replaces the project file lookup and must exist.
    /// Otherwise `depscan.toml` is searched in `root_hint` and then in the working
    /// directory.
    pub fn load(explicit: Option<&Path>, root_hint: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_file) = dirs::user_config_file()
            && user_file.is_file()
        {
            debug!("Loading user configuration from {}", user_file.display());
            config.apply(ConfigFile::from_path(&user_file)?)?;
        }

        if let Some(path) = explicit {
            if !path.is_file() {
                bail!("Configuration file {} does not exist", path.display());
            }
            debug!("Loading configuration from {}", path.display());
            config.apply(ConfigFile::from_path(path)?)?;
        } else if let Some(project_file) = find_project_config(root_hint) {
            debug!(
                "Loading project configuration from {}",
                project_file.display()
            );
            config.apply(ConfigFile::from_path(&project_file)?)?;
        }

        config.python_version()?;
        Ok(config)
    }

    /// Merge the values present in a parsed configuration file
    pub fn apply(&mut self, file: ConfigFile) -> Result<()> {
        if let Some(root) = file.root {
            self.root = root;
        }
        if let Some(output_dir) = file.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(requirements_file) = file.requirements_file {
            self.requirements_file = requirements_file;
        }
        if let Some(report_file) = file.report_file {
            self.report_file = report_file;
        }
        if let Some(target_version) = file.target_version {
            self.target_version = target_version;
        }
        if let Some(bare_module_aliases) = file.bare_module_aliases {
            self.bare_module_aliases = bare_module_aliases;
        }
        self.known_local.extend(file.known_local);
        self.extra_builtins.extend(file.extra_builtins);
        self.extra_stdlib.extend(file.extra_stdlib);
        self.exclude.extend(file.exclude);

        for (import_name, distribution) in file.package_map {
            PackageName::new(distribution.clone()).map_err(|e| {
                anyhow!("Invalid distribution name '{distribution}' for '{import_name}': {e}")
            })?;
            self.package_map.insert(import_name, distribution);
        }
        Ok(())
    }

    /// Python minor version selected by `target_version` (`py310` -> 10)
    pub fn python_version(&self) -> Result<u8> {
        let normalized = self.target_version.cow_to_ascii_lowercase();
        let minor = normalized
            .strip_prefix("py3")
            .and_then(|minor| minor.parse::<u8>().ok())
            .ok_or_else(|| {
                anyhow!(
                    "Invalid target version '{}', expected a value like 'py310'",
                    self.target_version
                )
            })?;
        if !SUPPORTED_MINOR_VERSIONS.contains(&minor) {
            bail!(
                "Unsupported target version '{}', supported versions are py38 to py314",
                self.target_version
            );
        }
        Ok(minor)
    }

    pub fn requirements_path(&self) -> PathBuf {
        self.output_dir.join(&self.requirements_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }
}

fn find_project_config(root_hint: Option<&Path>) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(root) = root_hint {
        candidates.push(root.join(CONFIG_FILE_NAME));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(CONFIG_FILE_NAME));
    }
    candidates.into_iter().find(|candidate| candidate.is_file())
}

/// On-disk representation of a configuration file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub root: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub requirements_file: Option<String>,
    pub report_file: Option<String>,
    pub target_version: Option<String>,
    pub bare_module_aliases: Option<bool>,
    #[serde(default)]
    pub known_local: Vec<String>,
    #[serde(default)]
    pub extra_builtins: Vec<String>,
    #[serde(default)]
    pub extra_stdlib: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub package_map: IndexMap<String, String>,
}

impl ConfigFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::parse(&source)
            .with_context(|| format!("Failed to parse configuration file {}", path.display()))
    }

    pub fn parse(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}
