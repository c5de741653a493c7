//! Syntactic name resolution against a unit's imports.
//!
//! The rewrite runs before attribution, so annotation and parameter types are
//! matched by what the unit imports rather than by resolved symbols.

use crate::domain::ast::{CompilationUnit, Expr};

#[derive(Debug, Default, Clone)]
pub struct ImportScope {
    package: String,
    single: Vec<String>,
    on_demand: Vec<String>,
}

impl ImportScope {
    pub fn from_unit(unit: &CompilationUnit) -> Self {
        let mut scope = ImportScope {
            package: unit.package.clone().unwrap_or_default(),
            ..Self::default()
        };
        for import in unit.imports.iter().filter(|i| !i.is_static) {
            match import.on_demand_package() {
                Some(pkg) => scope.on_demand.push(pkg.to_string()),
                None => scope.single.push(import.path.clone()),
            }
        }
        scope
    }

    /// Does the annotation/type name written as `name` denote `qualified`?
    pub fn matches(&self, name: &Expr, qualified: &str) -> bool {
        let Some(written) = name.dotted_name() else {
            return false;
        };
        if written.contains('.') {
            return written == qualified;
        }
        let (pkg, simple) = match qualified.rsplit_once('.') {
            Some(split) => split,
            None => return written == qualified,
        };
        written == simple
            && (self.single.iter().any(|s| s == qualified)
                || self.on_demand.iter().any(|p| p == pkg)
                || self.package == pkg)
    }

    /// Qualify a bare type name through its single-type import.
    pub fn qualify(&self, ty: &Expr) -> Expr {
        if let Some(simple) = ty.as_ident() {
            let suffix = format!(".{}", simple);
            if let Some(path) = self.single.iter().find(|s| s.ends_with(&suffix)) {
                return Expr::dotted(path);
            }
        }
        ty.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::Import;

    fn unit(package: &str, imports: &[&str]) -> CompilationUnit {
        CompilationUnit {
            package: Some(package.to_string()),
            imports: imports.iter().map(|p| Import::new(*p)).collect(),
            types: vec![],
        }
    }

    #[test]
    fn test_simple_name_through_single_import() {
        let scope = ImportScope::from_unit(&unit("com.demo", &["org.junit.jupiter.api.Test"]));
        assert!(scope.matches(&Expr::ident("Test"), "org.junit.jupiter.api.Test"));
        assert!(!scope.matches(&Expr::ident("Test"), "org.junit.Test"));
    }

    #[test]
    fn test_simple_name_through_on_demand_import() {
        let scope = ImportScope::from_unit(&unit("com.demo", &["org.junit.*"]));
        assert!(scope.matches(&Expr::ident("Before"), "org.junit.Before"));
        assert!(!scope.matches(&Expr::ident("Before"), "org.junit.jupiter.api.BeforeEach"));
    }

    #[test]
    fn test_same_package_and_qualified_names() {
        let scope = ImportScope::from_unit(&unit("com.alibaba.testable.annotation", &[]));
        assert!(scope.matches(
            &Expr::ident("TestableInject"),
            "com.alibaba.testable.annotation.TestableInject"
        ));
        let other = ImportScope::from_unit(&unit("com.demo", &[]));
        assert!(other.matches(&Expr::dotted("org.junit.Before"), "org.junit.Before"));
        assert!(!other.matches(&Expr::dotted("junit.Before"), "org.junit.Before"));
        assert!(!other.matches(&Expr::ident("Before"), "org.junit.Before"));
    }

    #[test]
    fn test_static_imports_ignored() {
        let mut u = unit("com.demo", &[]);
        u.imports.push(Import { path: "org.junit.Assert.*".to_string(), is_static: true });
        let scope = ImportScope::from_unit(&u);
        assert!(!scope.matches(&Expr::ident("assertEquals"), "org.junit.Assert.assertEquals"));
    }

    #[test]
    fn test_qualify() {
        let scope = ImportScope::from_unit(&unit("com.demo", &["java.util.List"]));
        assert_eq!(scope.qualify(&Expr::ident("List")), Expr::dotted("java.util.List"));
        assert_eq!(scope.qualify(&Expr::ident("String")), Expr::ident("String"));
    }
}
