use std::path::PathBuf;

use crate::visitors::FileImports;

/// A source file after import extraction
#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// Path relative to the scan root
    pub path: PathBuf,
    /// Owning module, `None` for a top-level `__init__.py`
    pub module_id: Option<String>,
    pub imports: FileImports,
}

/// A file that could not be read or parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub message: String,
}
