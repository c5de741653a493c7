use crate::domain::ast::CompilationUnit;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub struct UnitLoader;

impl UnitLoader {
    /// Load one JSON-serialised compilation unit.
    pub fn load_file(path: &Path) -> Result<CompilationUnit> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read unit {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid syntax tree in {}", path.display()))
    }

    /// Load every `*.json` unit under `dir`, recursively.
    /// Returns (file path, unit) pairs sorted by path.
    pub fn load_dir(dir: &Path) -> Result<Vec<(String, CompilationUnit)>> {
        let mut units = Vec::new();
        Self::collect_recursive(dir, &mut units)?;
        units.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(units)
    }

    fn collect_recursive(dir: &Path, out: &mut Vec<(String, CompilationUnit)>) -> Result<()> {
        if dir.ends_with("target") || dir.ends_with(".git") {
            return Ok(());
        }
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)
            .with_context(|| format!("Failed to list {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_dir() {
                Self::collect_recursive(&path, out)?;
            } else if path.extension().is_some_and(|ext| ext == "json") {
                let unit = Self::load_file(&path)?;
                out.push((path.display().to_string(), unit));
            }
        }
        Ok(())
    }
}
