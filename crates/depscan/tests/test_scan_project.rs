#![allow(clippy::disallowed_methods)]

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use depscan::{config::Config, orchestrator::DependencyScanner, report::DependencyReport};
use indexmap::IndexSet;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write_source(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn scan(root: &Path) -> DependencyReport {
    scan_with(Config {
        root: root.to_path_buf(),
        ..Default::default()
    })
}

fn scan_with(config: Config) -> DependencyReport {
    let scanner = DependencyScanner::new(config).unwrap();
    let results = scanner.scan().unwrap();
    DependencyReport::from_scan(&results, scanner.tables())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_owned()).collect()
}

#[test]
fn test_package_importing_its_submodule() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_source(root, "pkg/__init__.py", "import os\nimport pkg.util\n");
    write_source(root, "pkg/util.py", "import requests\n");

    let report = scan(root);

    assert_eq!(report.third_party, strings(&["requests"]));
    assert_eq!(report.third_party_packages, strings(&["requests"]));
    assert_eq!(report.all_imports, strings(&["os", "pkg", "requests"]));
    assert_eq!(report.local_modules, strings(&["pkg", "pkg.util", "util"]));
    assert_eq!(report.dependency_graph["pkg"], strings(&["pkg.util"]));
    assert!(report.dependency_graph["pkg.util"].is_empty());
    assert_eq!(report.local_imports["pkg/__init__.py"], strings(&["pkg.util"]));
    assert_eq!(report.file_imports["pkg/util.py"], strings(&["requests"]));
    assert!(report.circular_dependencies.is_empty());
    assert!(report.parse_errors.is_empty());
}

#[test]
fn test_cycle_between_modules() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_source(root, "app/__init__.py", "");
    write_source(root, "app/models.py", "from app.views import render\n");
    write_source(root, "app/views.py", "import app.models\n");
    write_source(root, "app/helpers.py", "import app.helpers\n");

    let report = scan(root);

    let cycles: Vec<String> = report
        .circular_dependencies
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        cycles,
        strings(&[
            "app.helpers -> app.helpers",
            "app.models -> app.views -> app.models",
        ])
    );
    assert_eq!(
        report.strongly_connected_components,
        vec![
            strings(&["app.helpers"]),
            strings(&["app.models", "app.views"]),
        ]
    );
}

#[test]
fn test_unparseable_file_is_reported_and_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_source(root, "good.py", "import numpy\n");
    write_source(root, "broken.py", "import pandas\ndef broken(:\n");

    let report = scan(root);

    assert_eq!(report.third_party_packages, strings(&["numpy"]));
    assert!(report.file_imports["broken.py"].is_empty());
    assert_eq!(
        report.parse_errors.keys().collect::<Vec<_>>(),
        vec!["broken.py"]
    );
    assert!(report.parse_errors["broken.py"].contains("Failed to parse"));
}

#[test]
fn test_relative_and_nested_imports() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_source(root, "pkg/__init__.py", "from . import sibling\n");
    write_source(
        root,
        "pkg/worker.py",
        "from .sibling import helper\n\
         import sys, json\n\
         \n\
         def load():\n\
         \x20   import yaml\n\
         \x20   from sklearn.linear_model import LinearRegression\n\
         \n\
         class Runner:\n\
         \x20   if True:\n\
         \x20       import attr\n",
    );

    let report = scan(root);

    assert!(report.file_imports["pkg/__init__.py"].is_empty());
    assert_eq!(report.third_party, strings(&["attr", "sklearn", "yaml"]));
    assert_eq!(
        report.third_party_packages,
        strings(&["PyYAML", "attrs", "scikit-learn"])
    );
    assert!(report.dependency_graph["pkg.worker"].is_empty());
}

#[test]
fn test_known_local_and_package_map_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_source(
        root,
        "main.py",
        "import shared_lib\nimport internal_tool\nimport PIL\nimport pillow\n",
    );

    let mut config = Config {
        root: root.to_path_buf(),
        known_local: IndexSet::from(["internal_tool".to_owned()]),
        ..Default::default()
    };
    config
        .package_map
        .insert("shared_lib".to_owned(), "shared-library".to_owned());
    config
        .package_map
        .insert("pillow".to_owned(), "pillow".to_owned());

    let report = scan_with(config);

    assert_eq!(report.third_party, strings(&["PIL", "pillow", "shared_lib"]));
    // Pillow and pillow are the same distribution
    assert_eq!(
        report.third_party_packages,
        strings(&["Pillow", "shared-library"])
    );
    assert!(report.local_modules.contains(&"internal_tool".to_owned()));
}

#[cfg(unix)]
#[test]
fn test_symlinked_and_dangling_sources() {
    use std::os::unix::fs::symlink;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("src");
    write_source(temp_dir.path(), "shared/helpers.py", "import requests\n");
    write_source(&root, "main.py", "import helpers\n");
    symlink(
        temp_dir.path().join("shared/helpers.py"),
        root.join("helpers.py"),
    )
    .unwrap();
    symlink(root.join("gone.py"), root.join("ghost.py")).unwrap();

    let report = scan(&root);

    assert_eq!(report.third_party_packages, strings(&["requests"]));
    assert_eq!(report.dependency_graph["main"], strings(&["helpers"]));
    assert!(report.file_imports["ghost.py"].is_empty());
    assert_eq!(
        report.parse_errors.keys().collect::<Vec<_>>(),
        vec!["ghost.py"]
    );
    assert!(report.parse_errors["ghost.py"].contains("Failed to read"));
    assert!(!report.local_modules.contains(&"ghost".to_owned()));
}

#[test]
fn test_missing_root_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let scanner = DependencyScanner::new(Config {
        root: temp_dir.path().join("missing"),
        ..Default::default()
    })
    .unwrap();
    assert!(scanner.scan().is_err());
}

fn depscan() -> Command {
    Command::new(env!("CARGO_BIN_EXE_depscan"))
}

fn cycle_project() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("src");
    write_source(&root, "a.py", "import b\nimport requests\n");
    write_source(&root, "b.py", "import a\nimport yaml\n");
    (temp_dir, root)
}

#[test]
fn test_cli_writes_outputs() {
    let (temp_dir, root) = cycle_project();
    let output_dir = temp_dir.path().join("out");

    let output = depscan()
        .arg(&root)
        .arg("--output-dir")
        .arg(&output_dir)
        .current_dir(temp_dir.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "depscan failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let requirements = fs::read_to_string(output_dir.join("requirements.txt")).unwrap();
    assert_eq!(requirements, "PyYAML\nrequests\n");

    let json = fs::read_to_string(output_dir.join("dependency_report.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value["circular_dependencies"],
        serde_json::json!([["a", "b", "a"]])
    );
    assert_eq!(value["largest_cycle_size"], serde_json::json!(2));
    assert_eq!(
        value["dependency_graph"],
        serde_json::json!({ "a": ["b"], "b": ["a"] })
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Third-party packages (2): PyYAML, requests"));
    assert!(stdout.contains("  a -> b -> a"));
}

#[test]
fn test_cli_fail_on_cycles_without_writing() {
    let (temp_dir, root) = cycle_project();
    let output_dir = temp_dir.path().join("out");

    let output = depscan()
        .arg(&root)
        .arg("-o")
        .arg(&output_dir)
        .arg("--no-write")
        .arg("--fail-on-cycles")
        .current_dir(temp_dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(!output_dir.exists());
    assert!(String::from_utf8_lossy(&output.stderr).contains("circular dependencies"));
}

#[test]
fn test_cli_reads_project_config() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("service");
    write_source(&root, "main.py", "import vendored\nimport flask\n");
    fs::write(
        root.join("depscan.toml"),
        "known-local = [\"vendored\"]\nexclude = [\"build\"]\n",
    )
    .unwrap();
    write_source(&root, "build/gen.py", "import grpc\n");

    let output = depscan()
        .arg(&root)
        .arg("--no-write")
        .current_dir(temp_dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Third-party packages (1): flask"));
    assert!(stdout.contains("No circular dependencies found"));
}
