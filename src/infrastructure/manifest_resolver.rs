use crate::domain::shadow::ShadowTypeName;
use crate::error::{ResolveError, ResolveResult};
use crate::ports::ShadowTypeResolver;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Descriptor emitted next to a compiled shadow type:
/// `{"type": "com.demo.Demo$$Testable", "accessors": {"stubbornField": ["count"]}}`
#[derive(Debug, Deserialize)]
struct ShadowManifest {
    #[serde(rename = "type")]
    type_name: Option<String>,
    #[serde(default)]
    accessors: HashMap<String, Value>,
}

/// Resolves shadow types from descriptors under one or more output roots,
/// searched in order like a classpath.
pub struct ManifestShadowResolver {
    roots: Vec<PathBuf>,
    suffix: String,
    accessor: String,
}

impl ManifestShadowResolver {
    pub fn new(roots: Vec<PathBuf>, suffix: &str, accessor: &str) -> Self {
        Self {
            roots,
            suffix: suffix.to_string(),
            accessor: accessor.to_string(),
        }
    }

    /// Relative location of a shadow type's descriptor: `com/demo/Demo$$Testable.json`.
    pub fn descriptor_path(name: &ShadowTypeName) -> PathBuf {
        name.package_path().join(format!("{}.json", name.simple_name))
    }

    fn locate(&self, name: &ShadowTypeName) -> Option<PathBuf> {
        let relative = Self::descriptor_path(name);
        self.roots
            .iter()
            .map(|root| root.join(&relative))
            .find(|candidate| candidate.is_file())
    }

    fn read_fields(&self, path: &Path, type_name: &str) -> ResolveResult<Vec<String>> {
        let content = fs::read_to_string(path).map_err(|source| ResolveError::Io {
            type_name: type_name.to_string(),
            source,
        })?;
        let manifest: ShadowManifest =
            serde_json::from_str(&content).map_err(|e| ResolveError::Malformed {
                type_name: type_name.to_string(),
                reason: e.to_string(),
            })?;

        if let Some(declared) = &manifest.type_name {
            if declared != type_name {
                return Err(ResolveError::Malformed {
                    type_name: type_name.to_string(),
                    reason: format!("descriptor declares type {}", declared),
                });
            }
        }

        let value = manifest
            .accessors
            .get(&self.accessor)
            .ok_or_else(|| ResolveError::MissingAccessor {
                type_name: type_name.to_string(),
                accessor: self.accessor.clone(),
            })?;

        let malformed = || ResolveError::Malformed {
            type_name: type_name.to_string(),
            reason: format!("accessor {} does not return a string array", self.accessor),
        };
        value
            .as_array()
            .ok_or_else(malformed)?
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(malformed))
            .collect()
    }
}

impl ShadowTypeResolver for ManifestShadowResolver {
    fn lookup(&self, package: &str, class_name: &str) -> ResolveResult<Vec<String>> {
        let name = ShadowTypeName::new(package, class_name, &self.suffix);
        let type_name = name.qualified();
        let path = self
            .locate(&name)
            .ok_or_else(|| ResolveError::NotFound { type_name: type_name.clone() })?;
        self.read_fields(&path, &type_name)
    }
}
