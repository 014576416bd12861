//! Static name tables consumed by the classifier
//!
//! The tables are built once from the configuration and passed by reference; nothing
//! here is global state.

use anyhow::Result;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    config::Config,
    stdlib_detection::{is_builtin_module, is_stdlib_module},
};

/// Import names whose distribution is published under a different name
pub const DEFAULT_PACKAGE_MAP: &[(&str, &str)] = &[
    ("Crypto", "pycryptodome"),
    ("Levenshtein", "python-Levenshtein"),
    ("MySQLdb", "mysqlclient"),
    ("OpenSSL", "pyOpenSSL"),
    ("PIL", "Pillow"),
    ("attr", "attrs"),
    ("bs4", "beautifulsoup4"),
    ("cv2", "opencv-python"),
    ("dateutil", "python-dateutil"),
    ("docx", "python-docx"),
    ("dotenv", "python-dotenv"),
    ("fitz", "PyMuPDF"),
    ("git", "GitPython"),
    ("jose", "python-jose"),
    ("jwt", "PyJWT"),
    ("magic", "python-magic"),
    ("multipart", "python-multipart"),
    ("pptx", "python-pptx"),
    ("serial", "pyserial"),
    ("skimage", "scikit-image"),
    ("sklearn", "scikit-learn"),
    ("socks", "PySocks"),
    ("telegram", "python-telegram-bot"),
    ("usb", "pyusb"),
    ("websocket", "websocket-client"),
    ("win32api", "pywin32"),
    ("yaml", "PyYAML"),
    ("zmq", "pyzmq"),
];

#[derive(Debug, Clone)]
pub struct NameTables {
    python_version: u8,
    extra_builtins: FxHashSet<String>,
    extra_stdlib: FxHashSet<String>,
    package_map: FxHashMap<String, String>,
}

impl NameTables {
    /// Default tables for the given Python minor version
    pub fn new(python_version: u8) -> Self {
        let package_map = DEFAULT_PACKAGE_MAP
            .iter()
            .map(|(import_name, distribution)| {
                ((*import_name).to_owned(), (*distribution).to_owned())
            })
            .collect();

        Self {
            python_version,
            extra_builtins: FxHashSet::default(),
            extra_stdlib: FxHashSet::default(),
            package_map,
        }
    }

    /// Default tables extended with the configured names and package overrides
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut tables = Self::new(config.python_version()?);
        for name in &config.extra_builtins {
            tables.insert_builtin(name);
        }
        for name in &config.extra_stdlib {
            tables.insert_stdlib(name);
        }
        for (import_name, distribution) in &config.package_map {
            tables.insert_package(import_name, distribution);
        }
        Ok(tables)
    }

    pub fn insert_builtin(&mut self, name: &str) {
        self.extra_builtins.insert(name.to_owned());
    }

    pub fn insert_stdlib(&mut self, name: &str) {
        self.extra_stdlib.insert(name.to_owned());
    }

    pub fn insert_package(&mut self, import_name: &str, distribution: &str) {
        self.package_map
            .insert(import_name.to_owned(), distribution.to_owned());
    }

    pub fn python_version(&self) -> u8 {
        self.python_version
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        is_builtin_module(name) || self.extra_builtins.contains(root_segment(name))
    }

    pub fn is_stdlib(&self, name: &str) -> bool {
        is_stdlib_module(name, self.python_version)
            || self.extra_stdlib.contains(root_segment(name))
    }

    /// Distribution name for an import name; unmapped names are returned unchanged
    pub fn package_name<'a>(&'a self, import_name: &'a str) -> &'a str {
        self.package_map
            .get(import_name)
            .map_or(import_name, String::as_str)
    }
}

fn root_segment(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}
