//! Traversal State
//!
//! Mutable accumulator threaded by `&mut` through the single rewrite pass of
//! one test-class unit.

use crate::config::RewriteConfig;
use crate::domain::ast::Expr;
use std::collections::HashSet;
use tracing::warn;

/// Test framework whose before-each marker the synthesized setup carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestFramework {
    #[default]
    JUnit4,
    JUnit5,
}

impl TestFramework {
    pub fn before_each_marker<'c>(&self, config: &'c RewriteConfig) -> &'c str {
        match self {
            TestFramework::JUnit4 => &config.junit4_before_each,
            TestFramework::JUnit5 => &config.junit5_before_each,
        }
    }
}

/// A test method to be registered as a mock, keyed by its signature.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectMethod {
    pub name: String,
    /// Class token of the return type (`String.class`).
    pub return_type: Expr,
    /// Class tokens of the parameter types, in declared order.
    pub param_types: Vec<Expr>,
}

/// Per-class output collected for the setup synthesizer.
#[derive(Debug, Default)]
pub struct ClassScope {
    pub inject_methods: Vec<InjectMethod>,
    pub setup_method: Option<String>,
}

#[derive(Debug, Default)]
pub struct TraversalState {
    /// Variables whose declared type was redirected, in declaration order.
    pub tracked_instances: Vec<String>,
    pub stubborn_fields: HashSet<String>,
    pub inject_methods: Vec<InjectMethod>,
    pub setup_method: Option<String>,
    pub framework: TestFramework,
}

impl TraversalState {
    pub fn new(stubborn_fields: Vec<String>) -> Self {
        Self {
            stubborn_fields: stubborn_fields.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn track_instance(&mut self, name: &str) {
        if !self.is_tracked(name) {
            self.tracked_instances.push(name.to_string());
        }
    }

    pub fn is_tracked(&self, name: &str) -> bool {
        self.tracked_instances.iter().any(|n| n == name)
    }

    pub fn is_stubborn(&self, field: &str) -> bool {
        self.stubborn_fields.contains(field)
    }

    pub fn record_inject(&mut self, method: InjectMethod) {
        self.inject_methods.push(method);
    }

    /// First before-each method of a class wins.
    pub fn capture_setup(&mut self, method_name: &str) {
        match &self.setup_method {
            None => self.setup_method = Some(method_name.to_string()),
            Some(existing) if existing == method_name => {}
            Some(existing) => {
                warn!(
                    kept = existing.as_str(),
                    ignored = method_name,
                    "multiple before-each methods, only the first is chained"
                );
            }
        }
    }

    /// Latches for the rest of the unit.
    pub fn observe_newer_framework(&mut self) {
        self.framework = TestFramework::JUnit5;
    }

    /// Stash the enclosing class's pending output before visiting a nested class.
    pub fn enter_class(&mut self) -> ClassScope {
        self.take_class_output()
    }

    /// Restore the enclosing class's pending output.
    pub fn leave_class(&mut self, outer: ClassScope) {
        self.inject_methods = outer.inject_methods;
        self.setup_method = outer.setup_method;
    }

    pub fn take_class_output(&mut self) -> ClassScope {
        ClassScope {
            inject_methods: std::mem::take(&mut self.inject_methods),
            setup_method: self.setup_method.take(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_is_idempotent_and_ordered() {
        let mut state = TraversalState::new(vec![]);
        state.track_instance("b");
        state.track_instance("a");
        state.track_instance("b");
        assert_eq!(state.tracked_instances, vec!["b", "a"]);
        assert!(state.is_tracked("a"));
        assert!(!state.is_tracked("c"));
    }

    #[test]
    fn test_framework_latch() {
        let config = RewriteConfig::default();
        let mut state = TraversalState::new(vec![]);
        assert_eq!(state.framework, TestFramework::JUnit4);
        assert_eq!(state.framework.before_each_marker(&config), "org.junit.Before");
        state.observe_newer_framework();
        state.observe_newer_framework();
        assert_eq!(state.framework, TestFramework::JUnit5);
        assert_eq!(
            state.framework.before_each_marker(&config),
            "org.junit.jupiter.api.BeforeEach"
        );
    }

    #[test]
    fn test_first_setup_capture_wins() {
        let mut state = TraversalState::new(vec![]);
        state.capture_setup("init");
        state.capture_setup("other");
        assert_eq!(state.setup_method.as_deref(), Some("init"));
    }

    #[test]
    fn test_class_scope_stash_and_restore() {
        let mut state = TraversalState::new(vec!["count".to_string()]);
        state.capture_setup("outerSetup");
        state.record_inject(InjectMethod {
            name: "outer".to_string(),
            return_type: Expr::class_lit(Expr::ident("String")),
            param_types: vec![],
        });

        let outer = state.enter_class();
        assert!(state.inject_methods.is_empty());
        assert!(state.setup_method.is_none());
        state.capture_setup("innerSetup");
        let inner = state.take_class_output();
        assert_eq!(inner.setup_method.as_deref(), Some("innerSetup"));
        state.leave_class(outer);

        assert_eq!(state.setup_method.as_deref(), Some("outerSetup"));
        assert_eq!(state.inject_methods.len(), 1);
        assert!(state.is_stubborn("count"));
    }
}
