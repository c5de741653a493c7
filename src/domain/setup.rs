//! Setup Synthesizer
//!
//! Builds the before-each method that registers every inject method of a
//! class into the mock registry and then chains the user's own setup.

use crate::config::RewriteConfig;
use crate::domain::ast::{
    Annotation, Block, Expr, MethodDecl, Modifier, Modifiers, PrimitiveType, Stmt,
};
use crate::domain::state::{ClassScope, InjectMethod, TestFramework};

/// `public void testableSetup() { ... }` carrying the framework's before-each marker.
pub fn synthesize_setup(
    config: &RewriteConfig,
    framework: TestFramework,
    scope: ClassScope,
) -> MethodDecl {
    let mut stmts: Vec<Stmt> = scope
        .inject_methods
        .into_iter()
        .map(|m| Stmt::Expr(registration(config, m)))
        .collect();

    if let Some(setup) = scope.setup_method {
        stmts.push(Stmt::Expr(Expr::call(Expr::select(Expr::This, setup), vec![])));
    }

    MethodDecl {
        modifiers: Modifiers::flags(&[Modifier::Public])
            .with_annotation(Annotation::marker(framework.before_each_marker(config))),
        type_params: Vec::new(),
        return_type: Some(Expr::Primitive(PrimitiveType::Void)),
        name: config.setup_method_name.clone(),
        params: Vec::new(),
        throws: Vec::new(),
        body: Some(Block::new(stmts)),
    }
}

/// `registry(new Key(Ret.class, new Class[]{P.class}), new Value(this, "name"))`
fn registration(config: &RewriteConfig, method: InjectMethod) -> Expr {
    let param_types = Expr::NewArray {
        elem_type: Some(Box::new(Expr::ident("Class"))),
        dims: Vec::new(),
        init: Some(method.param_types),
    };
    let key = Expr::new_object(
        Expr::dotted(&config.registry_key_type),
        vec![method.return_type, param_types],
    );
    let value = Expr::new_object(
        Expr::dotted(&config.registry_value_type),
        vec![Expr::This, Expr::string(method.name)],
    );
    Expr::call(Expr::dotted(&config.registry_method), vec![key, value])
}
