use crate::domain::ast::CompilationUnit;
use crate::error::ResolveResult;
use std::path::Path;

pub mod java_exporter;

/// Reads the stubborn field names off the compiled companion shadow type of
/// `package.class_name`. Implementations must be thread-safe (Send + Sync).
pub trait ShadowTypeResolver: Send + Sync {
    fn lookup(&self, package: &str, class_name: &str) -> ResolveResult<Vec<String>>;
}

pub trait UnitExporter: Send + Sync {
    fn export(&self, unit: &CompilationUnit, path: &Path) -> std::io::Result<()>;
    /// File extension of the exported form, without the dot.
    fn extension(&self) -> &'static str;
}
