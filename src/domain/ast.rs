// Syntax tree data structures for test-class rewriting.
// These types model a parsed, not-yet-attributed Java test unit. Types are
// expressions, the same way the host compiler represents them.

use serde::{Deserialize, Serialize};

/// One test-class source file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompilationUnit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<Import>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<ClassDecl>,
}

/// `import a.b.C;`, `import a.b.*;` or a static import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub path: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,
}

impl Import {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), is_static: false }
    }

    /// Package of an on-demand import (`a.b.*` -> `a.b`).
    pub fn on_demand_package(&self) -> Option<&str> {
        self.path.strip_suffix(".*")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Synchronized,
    Native,
    Transient,
    Volatile,
    Default,
}

impl Modifier {
    pub fn keyword(&self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Abstract => "abstract",
            Modifier::Synchronized => "synchronized",
            Modifier::Native => "native",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Modifiers {
    pub fn flags(flags: &[Modifier]) -> Self {
        Self { flags: flags.to_vec(), annotations: Vec::new() }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// `@Name` or `@Name(args)`. The name is an ident or a select path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: Expr,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Expr>,
}

impl Annotation {
    pub fn marker(name: &str) -> Self {
        Self { name: Expr::dotted(name), args: Vec::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub kind: ClassKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<Expr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<Expr>,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            modifiers: Modifiers::default(),
            kind: ClassKind::Class,
            name: name.into(),
            type_params: Vec::new(),
            extends: None,
            implements: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Member {
    Field(VarDecl),
    Method(MethodDecl),
    Class(ClassDecl),
    Initializer {
        #[serde(default)]
        is_static: bool,
        body: Block,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    /// Absent for constructors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<Expr>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<VarDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub throws: Vec<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Block>,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>, return_type: Expr) -> Self {
        Self {
            modifiers: Modifiers::default(),
            type_params: Vec::new(),
            return_type: Some(return_type),
            name: name.into(),
            params: Vec::new(),
            throws: Vec::new(),
            body: Some(Block::default()),
        }
    }

    pub fn has_annotation(&self, dotted: &str) -> bool {
        self.modifiers
            .annotations
            .iter()
            .any(|a| a.name.dotted_name().as_deref() == Some(dotted))
    }
}

/// Field, local, parameter, for-each, resource or lambda parameter binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Absent only for implicitly typed lambda parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var_type: Option<Expr>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<Expr>,
}

impl VarDecl {
    pub fn new(var_type: Expr, name: impl Into<String>, init: Option<Expr>) -> Self {
        Self { modifiers: Modifiers::default(), var_type: Some(var_type), name: name.into(), init }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// Empty for `default:`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Expr>,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub param: VarDecl,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    LocalVar(VarDecl),
    LocalClass(ClassDecl),
    /// Expression statement.
    Expr(Expr),
    Block(Block),
    If {
        cond: Expr,
        then: Box<Stmt>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        otherwise: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        #[serde(default)]
        init: Vec<Stmt>,
        #[serde(default)]
        cond: Option<Expr>,
        #[serde(default)]
        update: Vec<Expr>,
        body: Box<Stmt>,
    },
    ForEach {
        var: VarDecl,
        iterable: Expr,
        body: Box<Stmt>,
    },
    Switch {
        selector: Expr,
        #[serde(default)]
        cases: Vec<SwitchCase>,
    },
    Return(Option<Expr>),
    Throw(Expr),
    Break(Option<String>),
    Continue(Option<String>),
    Try {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        resources: Vec<VarDecl>,
        body: Block,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        catches: Vec<CatchClause>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        finally: Option<Block>,
    },
    Synchronized {
        lock: Expr,
        body: Block,
    },
    Labeled {
        label: String,
        body: Box<Stmt>,
    },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Int(i64),
    Long(i64),
    Double(f64),
    Char(char),
    String(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Void,
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn keyword(&self) -> &'static str {
        match self {
            PrimitiveType::Void => "void",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Ident(String),
    /// Field access or qualified name: `target.name`.
    Select {
        target: Box<Expr>,
        name: String,
    },
    Literal(Literal),
    This,
    Primitive(PrimitiveType),
    ArrayType(Box<Expr>),
    /// Parameterised type: `base<args>`.
    TypeApply {
        base: Box<Expr>,
        args: Vec<Expr>,
    },
    Assign {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    CompoundAssign {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Binary {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        postfix: bool,
    },
    /// Method invocation; `method` is an ident or a select.
    Call {
        method: Box<Expr>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Expr>,
    },
    New {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outer: Option<Box<Expr>>,
        class: Box<Expr>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Expr>,
        /// Anonymous class body.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<Vec<Member>>,
    },
    NewArray {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        elem_type: Option<Box<Expr>>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        dims: Vec<Expr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        init: Option<Vec<Expr>>,
    },
    /// `T.class`
    ClassLit(Box<Expr>),
    Cast {
        ty: Box<Expr>,
        expr: Box<Expr>,
    },
    InstanceOf {
        expr: Box<Expr>,
        ty: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Index {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    Parens(Box<Expr>),
    Lambda {
        #[serde(default)]
        params: Vec<VarDecl>,
        body: LambdaBody,
    },
    MethodRef {
        target: Box<Expr>,
        name: String,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn select(target: Expr, name: impl Into<String>) -> Self {
        Expr::Select { target: Box::new(target), name: name.into() }
    }

    /// Build an ident/select chain from a dotted name: `a.b.c`.
    pub fn dotted(name: &str) -> Self {
        let mut parts = name.split('.');
        let head = parts.next().unwrap_or_default();
        parts.fold(Expr::ident(head), |acc, part| Expr::select(acc, part))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }

    pub fn call(method: Expr, args: Vec<Expr>) -> Self {
        Expr::Call { method: Box::new(method), args }
    }

    pub fn new_object(class: Expr, args: Vec<Expr>) -> Self {
        Expr::New { outer: None, class: Box::new(class), args, body: None }
    }

    pub fn assign(lhs: Expr, rhs: Expr) -> Self {
        Expr::Assign { lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn class_lit(ty: Expr) -> Self {
        Expr::ClassLit(Box::new(ty))
    }

    /// Inverse of [`Expr::dotted`]: `Some("a.b.c")` for pure ident/select paths.
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            Expr::Ident(name) => Some(name.clone()),
            Expr::Select { target, name } => {
                target.dotted_name().map(|prefix| format!("{}.{}", prefix, name))
            }
            _ => None,
        }
    }

    /// Last segment of an ident or select path.
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            Expr::Select { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }
}
