//! Java Source Exporter
//!
//! Prints a (rewritten) unit back as Java source for inspection and for
//! hosts that compile from text.

use crate::domain::ast::{
    Annotation, Block, ClassDecl, ClassKind, CompilationUnit, Expr, LambdaBody, Literal, Member,
    MethodDecl, Modifiers, Stmt, VarDecl,
};
use crate::ports::UnitExporter;
use std::path::Path;

pub struct JavaSourceExporter;

impl UnitExporter for JavaSourceExporter {
    fn export(&self, unit: &CompilationUnit, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, Self::to_source(unit))
    }

    fn extension(&self) -> &'static str {
        "java"
    }
}

impl JavaSourceExporter {
    pub fn to_source(unit: &CompilationUnit) -> String {
        let mut printer = Printer::default();
        printer.unit(unit);
        printer.out
    }

    pub fn expr_source(expr: &Expr) -> String {
        let mut printer = Printer::default();
        printer.expr(expr);
        printer.out
    }

    pub fn stmt_source(stmt: &Stmt) -> String {
        let mut printer = Printer::default();
        printer.stmt(stmt);
        printer.out.trim().to_string()
    }
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn line_start(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn newline(&mut self) {
        self.out.push('\n');
    }

    fn unit(&mut self, unit: &CompilationUnit) {
        if let Some(package) = &unit.package {
            self.push(&format!("package {};\n\n", package));
        }
        for import in &unit.imports {
            let kw = if import.is_static { "import static" } else { "import" };
            self.push(&format!("{} {};\n", kw, import.path));
        }
        if !unit.imports.is_empty() {
            self.newline();
        }
        for (i, class) in unit.types.iter().enumerate() {
            if i > 0 {
                self.newline();
            }
            self.class(class);
        }
    }

    fn modifiers(&mut self, modifiers: &Modifiers, inline: bool) {
        for annotation in &modifiers.annotations {
            self.annotation(annotation);
            if inline {
                self.push(" ");
            } else {
                self.newline();
                self.line_start();
            }
        }
        for flag in &modifiers.flags {
            self.push(flag.keyword());
            self.push(" ");
        }
    }

    fn annotation(&mut self, annotation: &Annotation) {
        self.push("@");
        self.expr(&annotation.name);
        if !annotation.args.is_empty() {
            self.push("(");
            self.comma_separated(&annotation.args);
            self.push(")");
        }
    }

    fn class(&mut self, class: &ClassDecl) {
        self.line_start();
        self.modifiers(&class.modifiers, false);
        let kw = match class.kind {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Enum => "enum",
            ClassKind::Annotation => "@interface",
        };
        self.push(&format!("{} {}", kw, class.name));
        if !class.type_params.is_empty() {
            self.push(&format!("<{}>", class.type_params.join(", ")));
        }
        if let Some(extends) = &class.extends {
            self.push(" extends ");
            self.expr(extends);
        }
        if !class.implements.is_empty() {
            self.push(" implements ");
            self.comma_separated(&class.implements);
        }
        self.push(" {");
        self.newline();
        self.members(&class.members);
        self.line_start();
        self.push("}");
        self.newline();
    }

    fn members(&mut self, members: &[Member]) {
        self.indent += 1;
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                self.newline();
            }
            match member {
                Member::Field(var) => {
                    self.line_start();
                    self.var(var, false);
                    self.push(";");
                    self.newline();
                }
                Member::Method(method) => self.method(method),
                Member::Class(class) => self.class(class),
                Member::Initializer { is_static, body } => {
                    self.line_start();
                    if *is_static {
                        self.push("static ");
                    }
                    self.block(body);
                    self.newline();
                }
            }
        }
        self.indent -= 1;
    }

    fn method(&mut self, method: &MethodDecl) {
        self.line_start();
        self.modifiers(&method.modifiers, false);
        if !method.type_params.is_empty() {
            self.push(&format!("<{}> ", method.type_params.join(", ")));
        }
        if let Some(ret) = &method.return_type {
            self.expr(ret);
            self.push(" ");
        }
        self.push(&method.name);
        self.push("(");
        for (i, param) in method.params.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.var(param, true);
        }
        self.push(")");
        if !method.throws.is_empty() {
            self.push(" throws ");
            self.comma_separated(&method.throws);
        }
        match &method.body {
            Some(body) => {
                self.push(" ");
                self.block(body);
            }
            None => self.push(";"),
        }
        self.newline();
    }

    fn var(&mut self, var: &VarDecl, inline: bool) {
        self.modifiers(&var.modifiers, inline);
        if let Some(ty) = &var.var_type {
            self.expr(ty);
            self.push(" ");
        }
        self.push(&var.name);
        if let Some(init) = &var.init {
            self.push(" = ");
            self.expr(init);
        }
    }

    fn block(&mut self, block: &Block) {
        self.push("{");
        self.newline();
        self.indent += 1;
        for stmt in &block.stmts {
            self.line_start();
            self.stmt(stmt);
            self.newline();
        }
        self.indent -= 1;
        self.line_start();
        self.push("}");
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::LocalVar(var) => {
                self.var(var, true);
                self.push(";");
            }
            Stmt::LocalClass(class) => {
                // class() starts its own line
                let trimmed = self.out.trim_end_matches(' ').len();
                self.out.truncate(trimmed);
                self.class(class);
                self.out.pop();
            }
            Stmt::Expr(expr) => {
                self.expr(expr);
                self.push(";");
            }
            Stmt::Block(block) => self.block(block),
            Stmt::If { cond, then, otherwise } => {
                self.push("if (");
                self.expr(cond);
                self.push(") ");
                self.stmt(then);
                if let Some(otherwise) = otherwise {
                    self.push(" else ");
                    self.stmt(otherwise);
                }
            }
            Stmt::While { cond, body } => {
                self.push("while (");
                self.expr(cond);
                self.push(") ");
                self.stmt(body);
            }
            Stmt::DoWhile { body, cond } => {
                self.push("do ");
                self.stmt(body);
                self.push(" while (");
                self.expr(cond);
                self.push(");");
            }
            Stmt::For { init, cond, update, body } => {
                self.push("for (");
                for (i, s) in init.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    match s {
                        Stmt::LocalVar(var) => self.var(var, true),
                        Stmt::Expr(e) => self.expr(e),
                        other => self.stmt(other),
                    }
                }
                self.push("; ");
                if let Some(cond) = cond {
                    self.expr(cond);
                }
                self.push("; ");
                self.comma_separated(update);
                self.push(") ");
                self.stmt(body);
            }
            Stmt::ForEach { var, iterable, body } => {
                self.push("for (");
                self.var(var, true);
                self.push(" : ");
                self.expr(iterable);
                self.push(") ");
                self.stmt(body);
            }
            Stmt::Switch { selector, cases } => {
                self.push("switch (");
                self.expr(selector);
                self.push(") {");
                self.newline();
                self.indent += 1;
                for case in cases {
                    self.line_start();
                    if case.labels.is_empty() {
                        self.push("default:");
                    } else {
                        self.push("case ");
                        self.comma_separated(&case.labels);
                        self.push(":");
                    }
                    self.newline();
                    self.indent += 1;
                    for s in &case.body {
                        self.line_start();
                        self.stmt(s);
                        self.newline();
                    }
                    self.indent -= 1;
                }
                self.indent -= 1;
                self.line_start();
                self.push("}");
            }
            Stmt::Return(expr) => {
                self.push("return");
                if let Some(expr) = expr {
                    self.push(" ");
                    self.expr(expr);
                }
                self.push(";");
            }
            Stmt::Throw(expr) => {
                self.push("throw ");
                self.expr(expr);
                self.push(";");
            }
            Stmt::Break(label) => self.jump("break", label.as_deref()),
            Stmt::Continue(label) => self.jump("continue", label.as_deref()),
            Stmt::Try { resources, body, catches, finally } => {
                self.push("try ");
                if !resources.is_empty() {
                    self.push("(");
                    for (i, r) in resources.iter().enumerate() {
                        if i > 0 {
                            self.push("; ");
                        }
                        self.var(r, true);
                    }
                    self.push(") ");
                }
                self.block(body);
                for catch in catches {
                    self.push(" catch (");
                    self.var(&catch.param, true);
                    self.push(") ");
                    self.block(&catch.body);
                }
                if let Some(finally) = finally {
                    self.push(" finally ");
                    self.block(finally);
                }
            }
            Stmt::Synchronized { lock, body } => {
                self.push("synchronized (");
                self.expr(lock);
                self.push(") ");
                self.block(body);
            }
            Stmt::Labeled { label, body } => {
                self.push(&format!("{}: ", label));
                self.stmt(body);
            }
            Stmt::Empty => self.push(";"),
        }
    }

    fn jump(&mut self, kw: &str, label: Option<&str>) {
        self.push(kw);
        if let Some(label) = label {
            self.push(" ");
            self.push(label);
        }
        self.push(";");
    }

    fn comma_separated(&mut self, exprs: &[Expr]) {
        for (i, e) in exprs.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.expr(e);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(name) => self.push(name),
            Expr::Select { target, name } => {
                self.expr(target);
                self.push(".");
                self.push(name);
            }
            Expr::Literal(lit) => self.literal(lit),
            Expr::This => self.push("this"),
            Expr::Primitive(p) => self.push(p.keyword()),
            Expr::ArrayType(inner) => {
                self.expr(inner);
                self.push("[]");
            }
            Expr::TypeApply { base, args } => {
                self.expr(base);
                self.push("<");
                self.comma_separated(args);
                self.push(">");
            }
            Expr::Assign { lhs, rhs } => self.binary(lhs, "=", rhs),
            Expr::CompoundAssign { op, lhs, rhs } | Expr::Binary { op, lhs, rhs } => {
                self.binary(lhs, op, rhs)
            }
            Expr::Unary { op, operand, postfix } => {
                if *postfix {
                    self.expr(operand);
                    self.push(op);
                } else {
                    self.push(op);
                    self.expr(operand);
                }
            }
            Expr::Call { method, args } => {
                self.expr(method);
                self.push("(");
                self.comma_separated(args);
                self.push(")");
            }
            Expr::New { outer, class, args, body } => {
                if let Some(outer) = outer {
                    self.expr(outer);
                    self.push(".");
                }
                self.push("new ");
                self.expr(class);
                self.push("(");
                self.comma_separated(args);
                self.push(")");
                if let Some(members) = body {
                    self.push(" {");
                    self.newline();
                    self.members(members);
                    self.line_start();
                    self.push("}");
                }
            }
            Expr::NewArray { elem_type, dims, init } => {
                self.push("new ");
                if let Some(elem_type) = elem_type {
                    self.expr(elem_type);
                }
                for dim in dims {
                    self.push("[");
                    self.expr(dim);
                    self.push("]");
                }
                if let Some(init) = init {
                    if dims.is_empty() {
                        self.push("[]");
                    }
                    self.push("{");
                    self.comma_separated(init);
                    self.push("}");
                }
            }
            Expr::ClassLit(ty) => {
                self.expr(ty);
                self.push(".class");
            }
            Expr::Cast { ty, expr } => {
                self.push("(");
                self.expr(ty);
                self.push(") ");
                self.expr(expr);
            }
            Expr::InstanceOf { expr, ty } => {
                self.expr(expr);
                self.push(" instanceof ");
                self.expr(ty);
            }
            Expr::Conditional { cond, then, otherwise } => {
                self.expr(cond);
                self.push(" ? ");
                self.expr(then);
                self.push(" : ");
                self.expr(otherwise);
            }
            Expr::Index { array, index } => {
                self.expr(array);
                self.push("[");
                self.expr(index);
                self.push("]");
            }
            Expr::Parens(inner) => {
                self.push("(");
                self.expr(inner);
                self.push(")");
            }
            Expr::Lambda { params, body } => {
                let typed = params.iter().any(|p| p.var_type.is_some());
                if params.len() == 1 && !typed {
                    self.push(&params[0].name);
                } else {
                    self.push("(");
                    for (i, p) in params.iter().enumerate() {
                        if i > 0 {
                            self.push(", ");
                        }
                        self.var(p, true);
                    }
                    self.push(")");
                }
                self.push(" -> ");
                match body {
                    LambdaBody::Expr(e) => self.expr(e),
                    LambdaBody::Block(block) => self.block(block),
                }
            }
            Expr::MethodRef { target, name } => {
                self.expr(target);
                self.push("::");
                self.push(name);
            }
        }
    }

    fn binary(&mut self, lhs: &Expr, op: &str, rhs: &Expr) {
        self.expr(lhs);
        self.push(&format!(" {} ", op));
        self.expr(rhs);
    }

    fn literal(&mut self, lit: &Literal) {
        let text = match lit {
            Literal::Int(v) => v.to_string(),
            Literal::Long(v) => format!("{}L", v),
            Literal::Double(v) if v.is_nan() => "Double.NaN".to_string(),
            Literal::Double(v) if v.is_infinite() && *v > 0.0 => "Double.POSITIVE_INFINITY".to_string(),
            Literal::Double(v) if v.is_infinite() => "Double.NEGATIVE_INFINITY".to_string(),
            Literal::Double(v) => format!("{:?}", v),
            Literal::Char(c) => format!("'{}'", escape(&c.to_string(), '\'')),
            Literal::String(s) => format!("\"{}\"", escape(s, '"')),
            Literal::Bool(b) => b.to_string(),
            Literal::Null => "null".to_string(),
        };
        self.push(&text);
    }
}

fn escape(s: &str, quote: char) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::{Import, Modifier, PrimitiveType};

    #[test]
    fn test_to_source() {
        let mut method = MethodDecl::new("testableSetup", Expr::Primitive(PrimitiveType::Void));
        method.modifiers = Modifiers::flags(&[Modifier::Public])
            .with_annotation(Annotation::marker("org.junit.Before"));
        method.body = Some(Block::new(vec![Stmt::Expr(Expr::call(
            Expr::select(Expr::This, "setup"),
            vec![],
        ))]));
        let mut class = ClassDecl::new("DemoTest");
        class.members = vec![
            Member::Field(VarDecl::new(
                Expr::ident("Demo$$Testable"),
                "d",
                Some(Expr::new_object(Expr::ident("Demo$$Testable"), vec![])),
            )),
            Member::Method(method),
        ];
        let unit = CompilationUnit {
            package: Some("com.demo".to_string()),
            imports: vec![Import::new("org.junit.Before")],
            types: vec![class],
        };

        let source = JavaSourceExporter::to_source(&unit);
        assert!(source.starts_with("package com.demo;\n\nimport org.junit.Before;\n"));
        assert!(source.contains("class DemoTest {"));
        assert!(source.contains("    Demo$$Testable d = new Demo$$Testable();"));
        assert!(source.contains("    @org.junit.Before\n    public void testableSetup() {"));
        assert!(source.contains("        this.setup();"));
    }

    #[test]
    fn test_expr_source() {
        let array = Expr::NewArray {
            elem_type: Some(Box::new(Expr::ident("Class"))),
            dims: vec![],
            init: Some(vec![Expr::class_lit(Expr::ident("String")), Expr::class_lit(Expr::Primitive(PrimitiveType::Int))]),
        };
        assert_eq!(JavaSourceExporter::expr_source(&array), "new Class[]{String.class, int.class}");

        let empty = Expr::NewArray {
            elem_type: Some(Box::new(Expr::ident("Class"))),
            dims: vec![],
            init: Some(vec![]),
        };
        assert_eq!(JavaSourceExporter::expr_source(&empty), "new Class[]{}");
        assert_eq!(
            JavaSourceExporter::expr_source(&Expr::string("say \"hi\"\n")),
            "\"say \\\"hi\\\"\\n\""
        );
    }

    #[test]
    fn test_double_literals_are_valid_java() {
        let print = |v: f64| JavaSourceExporter::expr_source(&Expr::Literal(Literal::Double(v)));
        assert_eq!(print(1.5), "1.5");
        assert_eq!(print(2.0), "2.0");
        assert_eq!(print(f64::NAN), "Double.NaN");
        assert_eq!(print(f64::INFINITY), "Double.POSITIVE_INFINITY");
        assert_eq!(print(f64::NEG_INFINITY), "Double.NEGATIVE_INFINITY");
    }

    #[test]
    fn test_stmt_source() {
        let stmt = Stmt::If {
            cond: Expr::Binary {
                op: "==".to_string(),
                lhs: Box::new(Expr::ident("x")),
                rhs: Box::new(Expr::int(1)),
            },
            then: Box::new(Stmt::Return(Some(Expr::Literal(Literal::Bool(true))))),
            otherwise: Some(Box::new(Stmt::Return(None))),
        };
        assert_eq!(
            JavaSourceExporter::stmt_source(&stmt),
            "if (x == 1) return true; else return;"
        );
    }
}
