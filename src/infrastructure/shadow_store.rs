use crate::domain::shadow::ShadowTypeName;
use crate::error::{ResolveError, ResolveResult};
use crate::ports::ShadowTypeResolver;
use dashmap::DashMap;

// ============================================================================
// MemoryShadowResolver - in-process registry of shadow types
// ============================================================================

/// Shadow types registered in memory, keyed by qualified shadow type name.
/// Used when the generator runs in the same process, and as a test double.
pub struct MemoryShadowResolver {
    suffix: String,
    pub stubborn_fields: DashMap<String, Vec<String>>,
}

impl MemoryShadowResolver {
    pub fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            stubborn_fields: DashMap::new(),
        }
    }

    pub fn register(&self, package: &str, class_name: &str, fields: &[&str]) {
        let key = ShadowTypeName::new(package, class_name, &self.suffix).qualified();
        self.stubborn_fields
            .insert(key, fields.iter().map(|f| f.to_string()).collect());
    }
}

impl ShadowTypeResolver for MemoryShadowResolver {
    fn lookup(&self, package: &str, class_name: &str) -> ResolveResult<Vec<String>> {
        let type_name = ShadowTypeName::new(package, class_name, &self.suffix).qualified();
        self.stubborn_fields
            .get(&type_name)
            .map(|r| r.clone())
            .ok_or(ResolveError::NotFound { type_name })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
