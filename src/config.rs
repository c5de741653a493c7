//! Rewrite configuration.
//!
//! Every naming convention shared with the shadow-type generator and the
//! runtime mock registry lives here, so a project can align the rewriter with
//! its own toolchain through a `testable.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Appended to the class-under-test name to form the test-double type.
    pub testable_suffix: String,
    /// Appended to a stubborn field name to form its setter.
    pub setter_suffix: String,
    /// Static accessor on the shadow type listing the stubborn fields.
    pub stubborn_field_accessor: String,
    /// Name of the synthesized before-each method.
    pub setup_method_name: String,
    /// Stripped from a test class name to find the class under test.
    pub test_class_suffix: String,
    pub inject_markers: Vec<String>,
    pub junit4_before_each: String,
    pub junit5_before_each: String,
    /// Any of these on a method switches the unit to the newer framework.
    pub junit5_tests: Vec<String>,
    pub registry_method: String,
    pub registry_key_type: String,
    pub registry_value_type: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            testable_suffix: "$$Testable".to_string(),
            setter_suffix: "$$set".to_string(),
            stubborn_field_accessor: "stubbornField".to_string(),
            setup_method_name: "testableSetup".to_string(),
            test_class_suffix: "Test".to_string(),
            inject_markers: vec![
                "com.alibaba.testable.annotation.TestableInject".to_string(),
                "com.alibaba.testable.core.annotation.TestableMock".to_string(),
            ],
            junit4_before_each: "org.junit.Before".to_string(),
            junit5_before_each: "org.junit.jupiter.api.BeforeEach".to_string(),
            junit5_tests: vec![
                "org.junit.jupiter.api.Test".to_string(),
                "org.junit.jupiter.api.RepeatedTest".to_string(),
                "org.junit.jupiter.api.TestFactory".to_string(),
                "org.junit.jupiter.api.TestTemplate".to_string(),
                "org.junit.jupiter.params.ParameterizedTest".to_string(),
            ],
            registry_method: "n.e.a".to_string(),
            registry_key_type: "n.e.k".to_string(),
            registry_value_type: "n.e.v".to_string(),
        }
    }
}

impl RewriteConfig {
    /// Load a TOML config; keys left out keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: RewriteConfig = toml::from_str(content)?;
        if config.testable_suffix.is_empty() {
            anyhow::bail!("testable_suffix must not be empty");
        }
        Ok(config)
    }

    /// `Demo` -> `Demo$$Testable`
    pub fn testable_type_name(&self, class_name: &str) -> String {
        format!("{}{}", class_name, self.testable_suffix)
    }

    /// `count` -> `count$$set`
    pub fn setter_name(&self, field: &str) -> String {
        format!("{}{}", field, self.setter_suffix)
    }

    /// `DemoServiceTest` -> `DemoService`
    pub fn class_under_test(&self, test_class: &str) -> Option<String> {
        test_class
            .strip_suffix(self.test_class_suffix.as_str())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RewriteConfig::from_toml(
            r#"
setup_method_name = "mockSetup"
inject_markers = ["com.example.Mock", "com.example.Inject"]
"#,
        )
        .unwrap();
        assert_eq!(config.setup_method_name, "mockSetup");
        assert_eq!(config.inject_markers.len(), 2);
        assert_eq!(config.testable_suffix, "$$Testable");
        assert_eq!(config.junit4_before_each, "org.junit.Before");
        assert_eq!(config.junit5_tests.len(), 5);
    }

    #[test]
    fn test_default_markers() {
        let config = RewriteConfig::default();
        assert!(config
            .inject_markers
            .iter()
            .any(|m| m == "com.alibaba.testable.core.annotation.TestableMock"));
        assert!(config.junit5_tests.iter().any(|m| m == "org.junit.jupiter.api.Test"));
        assert!(config
            .junit5_tests
            .iter()
            .any(|m| m == "org.junit.jupiter.params.ParameterizedTest"));
    }

    #[test]
    fn test_empty_suffix_rejected() {
        assert!(RewriteConfig::from_toml("testable_suffix = \"\"").is_err());
    }

    #[test]
    fn test_naming_helpers() {
        let config = RewriteConfig::default();
        assert_eq!(config.testable_type_name("Demo"), "Demo$$Testable");
        assert_eq!(config.setter_name("count"), "count$$set");
        assert_eq!(config.class_under_test("DemoServiceTest").as_deref(), Some("DemoService"));
        assert_eq!(config.class_under_test("Test"), None);
        assert_eq!(config.class_under_test("DemoSpec"), None);
    }
}
