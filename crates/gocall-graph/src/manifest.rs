//! `go.mod` discovery.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::GraphError;

/// File name of the module manifest.
pub const MANIFEST_FILE: &str = "go.mod";

/// The module a project tree belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleManifest {
    path: Utf8PathBuf,
    module: String,
}

impl ModuleManifest {
    /// Creates a manifest record for `module` declared in the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, module: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            module: module.into(),
        }
    }

    /// Finds the nearest `go.mod` in `start` or its ancestors and reads its
    /// module path.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ManifestNotFound`] when no ancestor has a
    /// manifest and [`GraphError::ManifestInvalid`] when the nearest one
    /// cannot be read or lacks a `module` directive.
    pub fn discover(start: &Utf8Path) -> Result<Self, GraphError> {
        let path = start
            .ancestors()
            .map(|dir| dir.join(MANIFEST_FILE))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| GraphError::manifest_not_found(start))?;
        let contents =
            fs::read_to_string(&path).map_err(|_| GraphError::manifest_invalid(path.clone()))?;
        let module = parse_module_directive(&contents)
            .ok_or_else(|| GraphError::manifest_invalid(path.clone()))?;
        Ok(Self { path, module })
    }

    /// Path of the manifest file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Directory holding the manifest; import paths are relative to it.
    #[must_use]
    pub fn module_root(&self) -> &Utf8Path {
        self.path.parent().unwrap_or_else(|| Utf8Path::new(""))
    }

    /// Declared module path.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Returns whether `import_path` names the module or one of its packages.
    #[must_use]
    pub fn owns(&self, import_path: &str) -> bool {
        import_path == self.module
            || import_path
                .strip_prefix(self.module.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Import path of the package stored in `dir`.
    ///
    /// Directories outside the module root map to the module path itself.
    #[must_use]
    pub fn import_path_for(&self, dir: &Utf8Path) -> String {
        match dir.strip_prefix(self.module_root()) {
            Ok(relative) if !relative.as_str().is_empty() => {
                let segments: Vec<&str> = relative.components().map(|c| c.as_str()).collect();
                format!("{}/{}", self.module, segments.join("/"))
            }
            _ => self.module.clone(),
        }
    }
}

/// Extracts the module path from `go.mod` contents.
///
/// Comments are ignored and quoted paths are unquoted.
#[must_use]
pub fn parse_module_directive(contents: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let code = line.split("//").next().unwrap_or_default().trim();
        let rest = code.strip_prefix("module")?;
        if !rest.starts_with([' ', '\t']) {
            return None;
        }
        let module = rest.trim().trim_matches(|c| c == '"' || c == '`');
        (!module.is_empty()).then(|| module.to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("module example.com/shop\n\ngo 1.22\n", Some("example.com/shop"))]
    #[case("// header\nmodule \"example.com/quoted\" // trailing\n", Some("example.com/quoted"))]
    #[case("go 1.22\n", None)]
    #[case("module\n", None)]
    #[case("modules example.com/x\n", None)]
    fn module_directive_is_parsed(#[case] contents: &str, #[case] expected: Option<&str>) {
        assert_eq!(parse_module_directive(contents).as_deref(), expected);
    }

    #[rstest]
    #[case("example.com/shop", true)]
    #[case("example.com/shop/internal/store", true)]
    #[case("example.com/shopping", false)]
    #[case("fmt", false)]
    fn ownership_respects_path_boundaries(#[case] import_path: &str, #[case] expected: bool) {
        let manifest = ModuleManifest::new("/src/shop/go.mod", "example.com/shop");
        assert_eq!(manifest.owns(import_path), expected);
    }

    #[rstest]
    #[case("/src/shop", "example.com/shop")]
    #[case("/src/shop/internal/store", "example.com/shop/internal/store")]
    #[case("/elsewhere", "example.com/shop")]
    fn import_paths_follow_directories(#[case] dir: &str, #[case] expected: &str) {
        let manifest = ModuleManifest::new("/src/shop/go.mod", "example.com/shop");
        assert_eq!(manifest.import_path_for(Utf8Path::new(dir)), expected);
    }
}
