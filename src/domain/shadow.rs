//! Shadow-Type Field Query
//!
//! One lookup per test-class unit against the companion shadow type
//! (`<Class><suffix>`) for the fields that need setter-routed writes.

use crate::error::{ResolveError, ResolveResult};
use crate::ports::ShadowTypeResolver;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Qualified name of a companion shadow type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShadowTypeName {
    pub package: String,
    pub simple_name: String,
}

impl ShadowTypeName {
    pub fn new(package: &str, class_name: &str, suffix: &str) -> Self {
        Self {
            package: package.to_string(),
            simple_name: format!("{}{}", class_name, suffix),
        }
    }

    /// `com.example.Demo$$Testable`, or `Demo$$Testable` in the default package.
    pub fn qualified(&self) -> String {
        if self.package.is_empty() {
            self.simple_name.clone()
        } else {
            format!("{}.{}", self.package, self.simple_name)
        }
    }

    /// Package segments as directories.
    pub fn package_path(&self) -> std::path::PathBuf {
        self.package.split('.').filter(|s| !s.is_empty()).collect()
    }
}

/// Fetch the stubborn field names of `package.class_name`'s shadow type.
///
/// Never fails: a missing or broken shadow type (including a resolver that
/// panics) is logged and yields an empty list.
pub fn query_stubborn_fields(
    resolver: &dyn ShadowTypeResolver,
    package: &str,
    class_name: &str,
    suffix: &str,
) -> Vec<String> {
    match lookup_guarded(resolver, package, class_name, suffix) {
        Ok(fields) => {
            debug!(class = class_name, count = fields.len(), "stubborn fields resolved");
            fields
        }
        Err(e) => {
            warn!(class = class_name, "no stubborn fields: {}", e);
            Vec::new()
        }
    }
}

/// `resolver.lookup` with a panic turned into `ResolveError::Panicked`.
fn lookup_guarded(
    resolver: &dyn ShadowTypeResolver,
    package: &str,
    class_name: &str,
    suffix: &str,
) -> ResolveResult<Vec<String>> {
    panic::catch_unwind(AssertUnwindSafe(|| resolver.lookup(package, class_name))).unwrap_or_else(
        |payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ResolveError::Panicked {
                type_name: ShadowTypeName::new(package, class_name, suffix).qualified(),
                message,
            })
        },
    )
}
