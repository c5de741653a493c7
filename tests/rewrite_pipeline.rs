// End-to-end rewriting through the library: load, rewrite, export.

use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;
use testable_rewrite::application::{RewriteJob, RewriteUsecase};
use testable_rewrite::config::RewriteConfig;
use testable_rewrite::domain::ast::{
    Block, ClassDecl, CompilationUnit, Expr, Member, MethodDecl, PrimitiveType, Stmt, VarDecl,
};
use testable_rewrite::domain::state::TestFramework;
use testable_rewrite::infrastructure::{ManifestShadowResolver, MemoryShadowResolver, UnitLoader};
use testable_rewrite::ports::java_exporter::JavaSourceExporter;

const DEMO_TEST: &str = r#"{
    "package": "com.demo",
    "imports": [
        {"path": "com.alibaba.testable.annotation.TestableInject"},
        {"path": "org.junit.Test"}
    ],
    "types": [{
        "name": "DemoTest",
        "members": [
            {"method": {
                "modifiers": {"annotations": [{"name": {"ident": "TestableInject"}}]},
                "return_type": {"ident": "String"},
                "name": "foo",
                "body": {"stmts": [{"return": {"literal": {"string": "mocked"}}}]}
            }},
            {"method": {
                "modifiers": {"flags": ["public"], "annotations": [{"name": {"ident": "Test"}}]},
                "return_type": {"primitive": "void"},
                "name": "shouldCount",
                "body": {"stmts": [
                    {"local_var": {
                        "var_type": {"ident": "Demo"},
                        "name": "d",
                        "init": {"new": {"class": {"ident": "Demo"}}}
                    }},
                    {"expr": {"assign": {
                        "lhs": {"select": {"target": {"ident": "d"}, "name": "count"}},
                        "rhs": {"literal": {"int": 5}}
                    }}}
                ]}
            }}
        ]
    }]
}"#;

fn demo_job(config: &RewriteConfig) -> RewriteJob {
    let unit: CompilationUnit = serde_json::from_str(DEMO_TEST).unwrap();
    RewriteJob::from_unit("DemoTest.json", unit, config).unwrap()
}

#[test]
fn test_demo_scenario() {
    let config = RewriteConfig::default();
    let resolver = MemoryShadowResolver::new(&config.testable_suffix);
    resolver.register("com.demo", "Demo", &["count"]);
    let usecase = RewriteUsecase { resolver: &resolver, exporter: &JavaSourceExporter, config: &config };

    let mut job = demo_job(&config);
    let summary = usecase.rewrite(&mut job);

    assert_eq!(summary.class_under_test, "Demo");
    assert_eq!(summary.tracked_instances, vec!["d".to_string()]);
    assert_eq!(summary.stubborn_fields, 1);
    assert_eq!(summary.redirected_declarations, 1);
    assert_eq!(summary.redirected_constructions, 1);
    assert_eq!(summary.stubborn_writes, 1);
    assert_eq!(summary.inject_methods, 1);
    assert_eq!(summary.setup_methods, 1);
    assert_eq!(summary.framework, TestFramework::JUnit4);

    let source = JavaSourceExporter::to_source(&job.unit);
    assert!(source.contains("Demo$$Testable d = new Demo$$Testable();"), "{}", source);
    assert!(source.contains("d.count$$set(5);"), "{}", source);
    assert!(source.contains(
        "    @org.junit.Before\n    public void testableSetup() {\n        \
         n.e.a(new n.e.k(String.class, new Class[]{}), new n.e.v(this, \"foo\"));\n    }"
    ), "{}", source);

    // setup is the last member; the original methods keep their order
    let names: Vec<_> = job.unit.types[0].methods().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["foo", "shouldCount", "testableSetup"]);
}

#[test]
fn test_missing_shadow_type_leaves_writes_alone() {
    let config = RewriteConfig::default();
    let resolver = MemoryShadowResolver::new(&config.testable_suffix);
    let usecase = RewriteUsecase { resolver: &resolver, exporter: &JavaSourceExporter, config: &config };

    let mut job = demo_job(&config);
    let summary = usecase.rewrite(&mut job);

    assert_eq!(summary.stubborn_fields, 0);
    assert_eq!(summary.stubborn_writes, 0);
    let source = JavaSourceExporter::to_source(&job.unit);
    assert!(source.contains("Demo$$Testable d = new Demo$$Testable();"));
    assert!(source.contains("d.count = 5;"));
}

fn counting_unit(class_under_test: &str, var: &str) -> CompilationUnit {
    let mut method = MethodDecl::new("shouldCount", Expr::Primitive(PrimitiveType::Void));
    method.body = Some(Block::new(vec![
        Stmt::LocalVar(VarDecl::new(
            Expr::ident(class_under_test),
            var,
            Some(Expr::new_object(Expr::ident(class_under_test), vec![])),
        )),
        Stmt::Expr(Expr::assign(Expr::select(Expr::ident(var), "count"), Expr::int(1))),
    ]));
    let mut class = ClassDecl::new(format!("{}Test", class_under_test));
    class.members.push(Member::Method(method));
    CompilationUnit { package: Some("com.demo".to_string()), imports: vec![], types: vec![class] }
}

#[test]
fn test_parallel_units_do_not_share_state() {
    let config = RewriteConfig::default();
    let resolver = MemoryShadowResolver::new(&config.testable_suffix);
    let usecase = RewriteUsecase { resolver: &resolver, exporter: &JavaSourceExporter, config: &config };

    let mut jobs = Vec::new();
    for i in 0..16 {
        let class = format!("Svc{}", i);
        if i % 2 == 0 {
            resolver.register("com.demo", &class, &["count"]);
        }
        let unit = counting_unit(&class, &format!("v{}", i));
        jobs.push(RewriteJob::from_unit(&class, unit, &config).unwrap());
    }

    let summaries = usecase.rewrite_all(&mut jobs);
    assert_eq!(summaries.len(), 16);
    for (i, (job, summary)) in jobs.iter().zip(&summaries).enumerate() {
        assert_eq!(summary.class_under_test, format!("Svc{}", i));
        assert_eq!(summary.tracked_instances, vec![format!("v{}", i)]);
        assert_eq!(summary.stubborn_writes, usize::from(i % 2 == 0));

        let source = JavaSourceExporter::to_source(&job.unit);
        assert!(source.contains(&format!("Svc{0}$$Testable v{1} = new Svc{0}$$Testable();", i, i)));
    }
}

#[test]
fn test_manifest_pipeline_on_disk() {
    let config = RewriteConfig::default();
    let shadow_root = tempdir().unwrap();
    let descriptor_dir = shadow_root.path().join("com").join("demo");
    fs::create_dir_all(&descriptor_dir).unwrap();
    fs::write(
        descriptor_dir.join("Demo$$Testable.json"),
        r#"{"type": "com.demo.Demo$$Testable", "accessors": {"stubbornField": ["count"]}}"#,
    )
    .unwrap();

    let input = tempdir().unwrap();
    fs::create_dir_all(input.path().join("com/demo")).unwrap();
    fs::write(input.path().join("com/demo/DemoTest.json"), DEMO_TEST).unwrap();

    let resolver = ManifestShadowResolver::new(
        vec![shadow_root.path().to_path_buf()],
        &config.testable_suffix,
        &config.stubborn_field_accessor,
    );
    let usecase = RewriteUsecase { resolver: &resolver, exporter: &JavaSourceExporter, config: &config };

    let mut jobs: Vec<RewriteJob> = UnitLoader::load_dir(input.path())
        .unwrap()
        .into_iter()
        .map(|(source, unit)| RewriteJob::from_unit(&source, unit, &config).unwrap())
        .collect();
    let out = tempdir().unwrap();
    let written = usecase.run(&mut jobs, out.path()).unwrap();

    assert_eq!(written, vec![out.path().join("com/demo/DemoTest.java")]);
    let source = fs::read_to_string(&written[0]).unwrap();
    assert!(source.starts_with("package com.demo;\n"));
    assert!(source.contains("d.count$$set(5);"));
    assert!(source.contains("public void testableSetup()"));
}
