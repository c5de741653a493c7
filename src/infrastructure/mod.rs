// Infrastructure implementations for the test-class rewriter.

use crate::domain::ast::CompilationUnit;
use crate::ports::UnitExporter;
use std::path::Path;

pub mod concurrency;
pub mod manifest_resolver;
pub mod shadow_store;
pub mod unit_loader;

pub use manifest_resolver::ManifestShadowResolver;
pub use shadow_store::MemoryShadowResolver;
pub use unit_loader::UnitLoader;

/// Writes the rewritten tree back in its JSON wire form.
pub struct JsonExporter;

impl UnitExporter for JsonExporter {
    fn export(&self, unit: &CompilationUnit, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(unit)?;
        std::fs::write(path, json)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::{ClassDecl, Expr, Member, VarDecl};
    use tempfile::tempdir;

    #[test]
    fn test_json_export_reloads() {
        let mut class = ClassDecl::new("DemoTest");
        class.members.push(Member::Field(VarDecl::new(Expr::ident("Demo$$Testable"), "d", None)));
        let unit = CompilationUnit {
            package: Some("p".to_string()),
            imports: vec![],
            types: vec![class],
        };

        let dir = tempdir().unwrap();
        let path = dir.path().join("DemoTest.json");
        JsonExporter.export(&unit, &path).unwrap();
        assert_eq!(UnitLoader::load_file(&path).unwrap(), unit);
    }
}
