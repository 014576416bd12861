//! Import classification
//!
//! Every import root is labelled builtin, stdlib, local or third-party. The checks run
//! in that order, so a local module that shadows a stdlib name is still reported as
//! stdlib.

use std::fmt;

use crate::{module_catalog::ModuleCatalog, tables::NameTables};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportClass {
    Builtin,
    Stdlib,
    Local,
    ThirdParty,
}

impl ImportClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::Stdlib => "stdlib",
            Self::Local => "local",
            Self::ThirdParty => "third_party",
        }
    }
}

impl fmt::Display for ImportClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    catalog: &'a ModuleCatalog,
    tables: &'a NameTables,
}

impl<'a> Classifier<'a> {
    pub fn new(catalog: &'a ModuleCatalog, tables: &'a NameTables) -> Self {
        Self { catalog, tables }
    }

    pub fn classify(&self, name: &str) -> ImportClass {
        if self.tables.is_builtin(name) {
            ImportClass::Builtin
        } else if self.tables.is_stdlib(name) {
            ImportClass::Stdlib
        } else if self.catalog.is_local(name) {
            ImportClass::Local
        } else {
            ImportClass::ThirdParty
        }
    }

    /// Distribution name of a third-party import root
    pub fn package_name<'n>(&self, name: &'n str) -> &'n str
    where
        'a: 'n,
    {
        self.tables.package_name(name)
    }

    pub fn catalog(&self) -> &'a ModuleCatalog {
        self.catalog
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::module_catalog::CatalogOptions;

    fn catalog(files: &[&str]) -> ModuleCatalog {
        let options = CatalogOptions {
            bare_module_aliases: true,
            ..Default::default()
        };
        ModuleCatalog::from_source_files(files.iter().map(PathBuf::from), &options)
    }

    #[test]
    fn test_classification_order() {
        let catalog = catalog(&["app/__init__.py", "app/models.py"]);
        let tables = NameTables::new(10);
        let classifier = Classifier::new(&catalog, &tables);

        assert_eq!(classifier.classify("sys"), ImportClass::Builtin);
        assert_eq!(classifier.classify("os"), ImportClass::Stdlib);
        assert_eq!(classifier.classify("__future__"), ImportClass::Stdlib);
        assert_eq!(classifier.classify("app"), ImportClass::Local);
        assert_eq!(classifier.classify("models"), ImportClass::Local);
        assert_eq!(classifier.classify("requests"), ImportClass::ThirdParty);
    }

    #[test]
    fn test_stdlib_takes_precedence_over_local() {
        // A project file named like a stdlib module
        let catalog = catalog(&["logging.py", "tools/json.py"]);
        let tables = NameTables::new(10);
        let classifier = Classifier::new(&catalog, &tables);

        assert!(catalog.is_local("logging"));
        assert!(catalog.is_local("json"));
        assert_eq!(classifier.classify("logging"), ImportClass::Stdlib);
        assert_eq!(classifier.classify("json"), ImportClass::Stdlib);
    }

    #[test]
    fn test_builtin_takes_precedence_over_stdlib() {
        let catalog = catalog(&[]);
        let mut tables = NameTables::new(10);
        tables.insert_stdlib("sys");
        let classifier = Classifier::new(&catalog, &tables);
        assert_eq!(classifier.classify("sys"), ImportClass::Builtin);
    }

    #[test]
    fn test_every_catalog_name_classifies_as_local() {
        let catalog = catalog(&[
            "service/__init__.py",
            "service/api/__init__.py",
            "service/api/routes.py",
            "service/storage/backend.py",
            "cli.py",
        ]);
        let tables = NameTables::new(10);
        let classifier = Classifier::new(&catalog, &tables);

        assert!(!catalog.local_modules().is_empty());
        for name in catalog.local_modules() {
            assert_eq!(
                classifier.classify(name),
                ImportClass::Local,
                "{name} should be local"
            );
        }
    }

    #[test]
    fn test_package_name_mapping() {
        let catalog = catalog(&[]);
        let mut tables = NameTables::new(10);
        tables.insert_package("internal_sdk", "acme-sdk");
        let classifier = Classifier::new(&catalog, &tables);

        assert_eq!(classifier.package_name("PIL"), "Pillow");
        assert_eq!(classifier.package_name("internal_sdk"), "acme-sdk");
        assert_eq!(classifier.package_name("requests"), "requests");
    }

    #[test]
    fn test_display() {
        assert_eq!(ImportClass::ThirdParty.to_string(), "third_party");
        assert_eq!(ImportClass::Builtin.to_string(), "builtin");
    }
}
