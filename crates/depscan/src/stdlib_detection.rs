//! Standard library detection utilities
//!
//! This module provides a single source of truth for determining whether an import
//! belongs to the interpreter itself (a compiled-in builtin module) or to the Python
//! standard library.

use ruff_python_stdlib::sys;

/// Modules compiled into the CPython interpreter, as listed by `sys.builtin_module_names`
/// on a Linux build of CPython 3.10-3.13.
pub const BUILTIN_MODULES: &[&str] = &[
    "_abc",
    "_ast",
    "_codecs",
    "_collections",
    "_functools",
    "_imp",
    "_io",
    "_locale",
    "_operator",
    "_signal",
    "_sre",
    "_stat",
    "_string",
    "_symtable",
    "_thread",
    "_tokenize",
    "_tracemalloc",
    "_typing",
    "_warnings",
    "_weakref",
    "atexit",
    "builtins",
    "errno",
    "faulthandler",
    "gc",
    "itertools",
    "marshal",
    "posix",
    "pwd",
    "sys",
    "time",
    "xxsubtype",
];

/// Check if a module name refers to a module compiled into the interpreter
///
/// Submodules are matched through their top-level package.
pub fn is_builtin_module(module_name: &str) -> bool {
    let top_level = module_name.split('.').next().unwrap_or(module_name);
    BUILTIN_MODULES.contains(&top_level)
}

/// Check if a module name represents a Python standard library module
///
/// This uses ruff's comprehensive stdlib database and handles both direct
/// matches and submodules (e.g., both "os" and "os.path" are recognized).
///
/// # Arguments
/// * `module_name` - The module name to check
/// * `python_version` - The Python minor version as a u8 (e.g., 10 for Python 3.10)
pub fn is_stdlib_module(module_name: &str, python_version: u8) -> bool {
    // __future__ is not part of ruff's is_known_standard_library
    if module_name == "__future__" {
        return true;
    }

    if sys::is_known_standard_library(python_version, module_name) {
        return true;
    }

    // Check if it's a submodule of a stdlib module
    if let Some(top_level) = module_name.split('.').next() {
        sys::is_known_standard_library(python_version, top_level)
    } else {
        false
    }
}
