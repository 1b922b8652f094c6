//! Function descriptors and canonical identities.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use gocall_syntax::{FunctionDecl, Parameter};

/// Canonical identity of a function or method.
///
/// Renders as `package/Receiver.name` for methods and `package.name` for
/// free functions. `package` is the declared package name, or the full
/// import path when several directories declare that name, so
/// `cmd/a` and `cmd/b` yield `example.com/app/cmd/a.main` and
/// `example.com/app/cmd/b.main`. The same constructor is used when indexing
/// declarations and when resolving calls, so both sides always agree on the
/// key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId {
    package: String,
    receiver: Option<String>,
    name: String,
}

impl FunctionId {
    /// Creates the identity of `name` declared in `package`, optionally on
    /// `receiver`.
    #[must_use]
    pub fn new(package: impl Into<String>, receiver: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            receiver: receiver.filter(|r| !r.is_empty()).map(str::to_owned),
            name: name.into(),
        }
    }

    /// Identity of a free function.
    #[must_use]
    pub fn function(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(package, None, name)
    }

    /// Identity of a method.
    #[must_use]
    pub fn method(
        package: impl Into<String>,
        receiver: &str,
        name: impl Into<String>,
    ) -> Self {
        Self::new(package, Some(receiver), name)
    }

    /// Owning package qualifier.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Receiver type for methods.
    #[must_use]
    pub fn receiver(&self) -> Option<&str> {
        self.receiver.as_deref()
    }

    /// Declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without the package: `Receiver.name` or `name`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.receiver.as_ref().map_or_else(
            || self.name.clone(),
            |receiver| format!("{receiver}.{}", self.name),
        )
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Some(receiver) => write!(f, "{}/{receiver}.{}", self.package, self.name),
            None => write!(f, "{}.{}", self.package, self.name),
        }
    }
}

/// Everything known about one declared function or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    /// Canonical identity.
    pub id: FunctionId,
    /// Import path of the owning package.
    pub package_path: String,
    /// File holding the declaration.
    pub file: Utf8PathBuf,
    /// First line of the declaration (one-based).
    pub start_line: u32,
    /// Last line of the declaration (one-based, inclusive).
    pub end_line: u32,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Result types in declaration order.
    pub returns: Vec<String>,
    /// Whether the declaration has a body.
    pub has_body: bool,
}

impl FunctionDescriptor {
    /// Builds a descriptor for a declaration found in `file`.
    #[must_use]
    pub fn from_decl(
        package: &str,
        package_path: impl Into<String>,
        file: impl Into<Utf8PathBuf>,
        decl: FunctionDecl,
    ) -> Self {
        Self {
            id: FunctionId::new(package, decl.receiver.as_deref(), decl.name),
            package_path: package_path.into(),
            file: file.into(),
            start_line: decl.start_line,
            end_line: decl.end_line,
            parameters: decl.parameters,
            returns: decl.returns,
            has_body: decl.has_body,
        }
    }

    /// Canonical identity.
    #[must_use]
    pub const fn id(&self) -> &FunctionId {
        &self.id
    }

    /// Owning package qualifier.
    #[must_use]
    pub fn package(&self) -> &str {
        self.id.package()
    }

    /// Receiver type for methods.
    #[must_use]
    pub fn receiver(&self) -> Option<&str> {
        self.id.receiver()
    }

    /// Declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// File holding the declaration.
    #[must_use]
    pub fn file(&self) -> &Utf8Path {
        &self.file
    }

    /// Whether `line` falls within the declaration.
    #[must_use]
    pub const fn spans(&self, line: u32) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    /// Parameters rendered as `name type`, or just `type` when unnamed.
    #[must_use]
    pub fn parameter_texts(&self) -> Vec<String> {
        self.parameters
            .iter()
            .map(|parameter| {
                if parameter.name.is_empty() {
                    parameter.type_text.clone()
                } else {
                    format!("{} {}", parameter.name, parameter.type_text)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FunctionId::function("main", "run"), "main.run")]
    #[case(FunctionId::method("x", "Worker", "Run"), "x/Worker.Run")]
    #[case(FunctionId::new("y", Some(""), "Run"), "y.Run")]
    fn identities_render_canonically(#[case] id: FunctionId, #[case] expected: &str) {
        assert_eq!(id.to_string(), expected);
    }

    #[test]
    fn same_receiver_in_different_packages_stays_distinct() {
        let x = FunctionId::method("x", "Worker", "Run");
        let y = FunctionId::method("y", "Worker", "Run");
        assert_ne!(x, y);
        assert_eq!(x.qualified_name(), y.qualified_name());
    }

    #[test]
    fn descriptor_copies_declaration_facts() {
        let decl = FunctionDecl {
            name: "Save".to_owned(),
            receiver: Some("Store".to_owned()),
            parameters: vec![Parameter::new("ctx", "context.Context"), Parameter::new("", "int")],
            returns: vec!["error".to_owned()],
            start_line: 10,
            end_line: 20,
            has_body: true,
        };
        let descriptor =
            FunctionDescriptor::from_decl("store", "example.com/shop/store", "/p/store.go", decl);

        assert_eq!(descriptor.id().to_string(), "store/Store.Save");
        assert_eq!(descriptor.package_path, "example.com/shop/store");
        assert_eq!(
            descriptor.parameter_texts(),
            vec!["ctx context.Context".to_owned(), "int".to_owned()]
        );
        assert!(descriptor.spans(10));
        assert!(descriptor.spans(20));
        assert!(!descriptor.spans(21));
    }
}
