//! Test-Class Rewriter
//!
//! Single depth-first pass over one test-class unit:
//! - declarations: variables declared with the class under test are redirected to its
//!   test-double type and tracked by name;
//! - constructions: `new C(...)` constructs the test-double type instead;
//! - stubborn writes: `v.f = x` on a tracked `v` with stubborn `f` becomes `v.f$$set(x)`;
//! - annotations: method annotations feed inject descriptors, the captured setup
//!   method and the framework latch;
//! - setup: after a class's members are visited its setup method is appended.

use crate::config::RewriteConfig;
use crate::domain::ast::{
    Block, ClassDecl, ClassKind, CompilationUnit, Expr, LambdaBody, Member, MethodDecl,
    PrimitiveType, Stmt, VarDecl,
};
use crate::domain::imports::ImportScope;
use crate::domain::setup::synthesize_setup;
use crate::domain::shadow::query_stubborn_fields;
use crate::domain::state::{InjectMethod, TestFramework, TraversalState};
use crate::ports::ShadowTypeResolver;
use tracing::{debug, info};

/// Outcome of one rewrite pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewriteSummary {
    pub class_under_test: String,
    pub tracked_instances: Vec<String>,
    pub stubborn_fields: usize,
    pub redirected_declarations: usize,
    pub redirected_constructions: usize,
    pub stubborn_writes: usize,
    pub inject_methods: usize,
    pub setup_methods: usize,
    pub framework: TestFramework,
}

/// Rewrites one test-class unit. Built fresh per unit; `rewrite` consumes it.
pub struct TestClassRewriter<'c> {
    config: &'c RewriteConfig,
    class_under_test: String,
    testable_type: String,
    state: TraversalState,
}

impl<'c> TestClassRewriter<'c> {
    /// Runs the shadow-type field query for `package.class_under_test`.
    pub fn new(
        config: &'c RewriteConfig,
        resolver: &dyn ShadowTypeResolver,
        package: &str,
        class_under_test: &str,
    ) -> Self {
        let stubborn_fields =
            query_stubborn_fields(resolver, package, class_under_test, &config.testable_suffix);
        Self::with_stubborn_fields(config, class_under_test, stubborn_fields)
    }

    pub fn with_stubborn_fields(
        config: &'c RewriteConfig,
        class_under_test: &str,
        stubborn_fields: Vec<String>,
    ) -> Self {
        Self {
            config,
            class_under_test: class_under_test.to_string(),
            testable_type: config.testable_type_name(class_under_test),
            state: TraversalState::new(stubborn_fields),
        }
    }

    /// Rewrite `unit` in place.
    pub fn rewrite(self, unit: &mut CompilationUnit) -> RewriteSummary {
        let TestClassRewriter { config, class_under_test, testable_type, mut state } = self;
        let imports = ImportScope::from_unit(unit);
        let mut pass = Pass {
            config,
            class_under_test: &class_under_test,
            testable_type: &testable_type,
            imports: &imports,
            summary: RewriteSummary::default(),
        };

        for class in unit.types.iter_mut() {
            pass.visit_class(class, &mut state);
        }

        let summary = RewriteSummary {
            class_under_test: class_under_test.clone(),
            tracked_instances: state.tracked_instances,
            stubborn_fields: state.stubborn_fields.len(),
            framework: state.framework,
            ..pass.summary
        };
        info!(
            class = class_under_test.as_str(),
            declarations = summary.redirected_declarations,
            constructions = summary.redirected_constructions,
            stubborn_writes = summary.stubborn_writes,
            inject_methods = summary.inject_methods,
            framework = ?summary.framework,
            "test class rewritten"
        );
        summary
    }
}

struct Pass<'a> {
    config: &'a RewriteConfig,
    class_under_test: &'a str,
    testable_type: &'a str,
    imports: &'a ImportScope,
    summary: RewriteSummary,
}

impl Pass<'_> {
    fn visit_class(&mut self, class: &mut ClassDecl, state: &mut TraversalState) {
        let outer = state.enter_class();
        for member in class.members.iter_mut() {
            self.visit_member(member, state);
        }

        let scope = state.take_class_output();
        if class.kind == ClassKind::Class {
            self.summary.inject_methods += scope.inject_methods.len();
            debug!(
                class = class.name.as_str(),
                registrations = scope.inject_methods.len(),
                chained = ?scope.setup_method,
                "synthesizing setup method"
            );
            let setup = synthesize_setup(self.config, state.framework, scope);
            class.members.push(Member::Method(setup));
            self.summary.setup_methods += 1;
        }
        state.leave_class(outer);
    }

    /// Anonymous bodies are rewritten but contribute nothing to a setup method.
    fn visit_anonymous_body(&mut self, members: &mut [Member], state: &mut TraversalState) {
        let outer = state.enter_class();
        for member in members.iter_mut() {
            self.visit_member(member, state);
        }
        let dropped = state.take_class_output();
        if !dropped.inject_methods.is_empty() {
            debug!(count = dropped.inject_methods.len(), "ignoring inject methods of anonymous class");
        }
        state.leave_class(outer);
    }

    fn visit_member(&mut self, member: &mut Member, state: &mut TraversalState) {
        match member {
            Member::Field(var) => self.visit_var(var, state),
            Member::Method(method) => self.visit_method(method, state),
            Member::Class(class) => self.visit_class(class, state),
            Member::Initializer { body, .. } => self.visit_block(body, state),
        }
    }

    // Annotation harvesting.
    fn visit_method(&mut self, method: &mut MethodDecl, state: &mut TraversalState) {
        let annotations = std::mem::take(&mut method.modifiers.annotations);
        let mut kept = Vec::with_capacity(annotations.len());
        for annotation in annotations {
            let name = &annotation.name;
            let mut strip = false;

            if self.config.inject_markers.iter().any(|m| self.imports.matches(name, m)) {
                let descriptor = self.inject_descriptor(method);
                debug!(method = method.name.as_str(), "inject method recorded");
                state.record_inject(descriptor);
            }
            if self.imports.matches(name, &self.config.junit4_before_each) {
                state.capture_setup(&method.name);
                strip = true;
            } else if self.imports.matches(name, &self.config.junit5_before_each) {
                state.capture_setup(&method.name);
            }
            if self.config.junit5_tests.iter().any(|m| self.imports.matches(name, m)) {
                state.observe_newer_framework();
            }

            if !strip {
                kept.push(annotation);
            }
        }
        method.modifiers.annotations = kept;

        for param in method.params.iter_mut() {
            self.visit_var(param, state);
        }
        if let Some(body) = &mut method.body {
            self.visit_block(body, state);
        }
    }

    fn inject_descriptor(&self, method: &MethodDecl) -> InjectMethod {
        let return_type = method
            .return_type
            .clone()
            .unwrap_or(Expr::Primitive(PrimitiveType::Void));
        InjectMethod {
            name: method.name.clone(),
            return_type: self.class_token(&return_type),
            param_types: method
                .params
                .iter()
                .filter_map(|p| p.var_type.as_ref())
                .map(|ty| self.class_token(ty))
                .collect(),
        }
    }

    /// `T.class` for a declared type, with type arguments erased.
    fn class_token(&self, ty: &Expr) -> Expr {
        Expr::class_lit(self.erase(ty))
    }

    fn erase(&self, ty: &Expr) -> Expr {
        match ty {
            Expr::TypeApply { base, .. } => self.erase(base),
            Expr::ArrayType(inner) => Expr::ArrayType(Box::new(self.erase(inner))),
            other => self.imports.qualify(other),
        }
    }

    // Declaration redirection.
    fn visit_var(&mut self, var: &mut VarDecl, state: &mut TraversalState) {
        if let Some(init) = &mut var.init {
            self.visit_expr(init, state);
        }
        let redirect = var.var_type.as_ref().and_then(Expr::as_ident) == Some(self.class_under_test);
        if redirect {
            var.var_type = Some(Expr::ident(self.testable_type));
            state.track_instance(&var.name);
            self.summary.redirected_declarations += 1;
            debug!(variable = var.name.as_str(), "declaration redirected to test double");
        }
    }

    fn visit_block(&mut self, block: &mut Block, state: &mut TraversalState) {
        for stmt in block.stmts.iter_mut() {
            self.visit_stmt(stmt, state);
        }
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt, state: &mut TraversalState) {
        match stmt {
            Stmt::LocalVar(var) => self.visit_var(var, state),
            Stmt::LocalClass(class) => self.visit_class(class, state),
            Stmt::Expr(expr) => self.visit_exec(expr, state),
            Stmt::Block(block) => self.visit_block(block, state),
            Stmt::If { cond, then, otherwise } => {
                self.visit_expr(cond, state);
                self.visit_stmt(then, state);
                if let Some(otherwise) = otherwise {
                    self.visit_stmt(otherwise, state);
                }
            }
            Stmt::While { cond, body } => {
                self.visit_expr(cond, state);
                self.visit_stmt(body, state);
            }
            Stmt::DoWhile { body, cond } => {
                self.visit_stmt(body, state);
                self.visit_expr(cond, state);
            }
            Stmt::For { init, cond, update, body } => {
                for s in init.iter_mut() {
                    self.visit_stmt(s, state);
                }
                if let Some(cond) = cond {
                    self.visit_expr(cond, state);
                }
                // update clauses are expression statements
                for u in update.iter_mut() {
                    self.visit_exec(u, state);
                }
                self.visit_stmt(body, state);
            }
            Stmt::ForEach { var, iterable, body } => {
                self.visit_var(var, state);
                self.visit_expr(iterable, state);
                self.visit_stmt(body, state);
            }
            Stmt::Switch { selector, cases } => {
                self.visit_expr(selector, state);
                for case in cases.iter_mut() {
                    for label in case.labels.iter_mut() {
                        self.visit_expr(label, state);
                    }
                    for s in case.body.iter_mut() {
                        self.visit_stmt(s, state);
                    }
                }
            }
            Stmt::Return(Some(expr)) | Stmt::Throw(expr) => self.visit_expr(expr, state),
            Stmt::Try { resources, body, catches, finally } => {
                for resource in resources.iter_mut() {
                    self.visit_var(resource, state);
                }
                self.visit_block(body, state);
                for catch in catches.iter_mut() {
                    self.visit_var(&mut catch.param, state);
                    self.visit_block(&mut catch.body, state);
                }
                if let Some(finally) = finally {
                    self.visit_block(finally, state);
                }
            }
            Stmt::Synchronized { lock, body } => {
                self.visit_expr(lock, state);
                self.visit_block(body, state);
            }
            Stmt::Labeled { body, .. } => self.visit_stmt(body, state),
            Stmt::Return(None) | Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty => {}
        }
    }

    // Stubborn write routing, then the usual descent into the (possibly replaced) expression.
    fn visit_exec(&mut self, expr: &mut Expr, state: &mut TraversalState) {
        let taken = std::mem::replace(expr, Expr::This);
        *expr = match taken {
            Expr::Assign { lhs, rhs } => match *lhs {
                Expr::Select { target, name }
                    if target.as_ident().is_some_and(|v| state.is_tracked(v))
                        && state.is_stubborn(&name) =>
                {
                    let setter = self.config.setter_name(&name);
                    debug!(field = name.as_str(), setter = setter.as_str(), "stubborn field write routed to setter");
                    self.summary.stubborn_writes += 1;
                    Expr::call(Expr::select(*target, setter), vec![*rhs])
                }
                lhs => Expr::Assign { lhs: Box::new(lhs), rhs },
            },
            other => other,
        };
        self.visit_expr(expr, state);
    }

    fn visit_expr(&mut self, expr: &mut Expr, state: &mut TraversalState) {
        match expr {
            Expr::Select { target, .. } => self.visit_expr(target, state),
            Expr::ArrayType(inner) | Expr::ClassLit(inner) | Expr::Parens(inner) => {
                self.visit_expr(inner, state)
            }
            Expr::TypeApply { base, args } => {
                self.visit_expr(base, state);
                for arg in args.iter_mut() {
                    self.visit_expr(arg, state);
                }
            }
            Expr::Assign { lhs, rhs }
            | Expr::CompoundAssign { lhs, rhs, .. }
            | Expr::Binary { lhs, rhs, .. } => {
                self.visit_expr(lhs, state);
                self.visit_expr(rhs, state);
            }
            Expr::Unary { operand, .. } => self.visit_expr(operand, state),
            Expr::Call { method, args } => {
                self.visit_expr(method, state);
                for arg in args.iter_mut() {
                    self.visit_expr(arg, state);
                }
            }
            Expr::New { outer, class, args, body } => {
                if let Some(outer) = outer {
                    self.visit_expr(outer, state);
                }
                for arg in args.iter_mut() {
                    self.visit_expr(arg, state);
                }
                if let Some(members) = body {
                    self.visit_anonymous_body(members, state);
                }
                self.redirect_construction(class);
            }
            Expr::NewArray { elem_type, dims, init } => {
                if let Some(elem_type) = elem_type {
                    self.visit_expr(elem_type, state);
                }
                for dim in dims.iter_mut() {
                    self.visit_expr(dim, state);
                }
                for e in init.iter_mut().flatten() {
                    self.visit_expr(e, state);
                }
            }
            Expr::Cast { ty, expr } | Expr::InstanceOf { expr, ty } => {
                self.visit_expr(ty, state);
                self.visit_expr(expr, state);
            }
            Expr::Conditional { cond, then, otherwise } => {
                self.visit_expr(cond, state);
                self.visit_expr(then, state);
                self.visit_expr(otherwise, state);
            }
            Expr::Index { array, index } => {
                self.visit_expr(array, state);
                self.visit_expr(index, state);
            }
            Expr::Lambda { params, body } => {
                for param in params.iter_mut() {
                    self.visit_var(param, state);
                }
                match body {
                    LambdaBody::Expr(e) => self.visit_expr(e, state),
                    LambdaBody::Block(block) => self.visit_block(block, state),
                }
            }
            Expr::MethodRef { target, .. } => self.visit_expr(target, state),
            Expr::Ident(_) | Expr::Literal(_) | Expr::This | Expr::Primitive(_) => {}
        }
    }

    // Bare or qualified `C` becomes `C$$Testable`, keeping any qualifier.
    fn redirect_construction(&mut self, class: &mut Expr) {
        if class.simple_name() != Some(self.class_under_test) {
            return;
        }
        match class {
            Expr::Select { name, .. } => *name = self.testable_type.to_string(),
            other => *other = Expr::ident(self.testable_type),
        }
        self.summary.redirected_constructions += 1;
        debug!(class = self.class_under_test, "construction redirected to test double");
    }
}
