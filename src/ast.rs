use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i32),
    Float(f32),
    Char(u16),
    Str(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    /// Prefix `++`
    Inc,
    /// Prefix `--`
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOp {
    Inc,
    Dec,
}

/// Base of a declared type, as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    Int,
    Float,
    Char,
    Bool,
    Void,
    Str,
    Named(String),
}

/// A declared type plus its array rank (0 for scalars, 1..=3 for arrays).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub base: TypeName,
    pub dims: usize,
}

impl TypeRef {
    pub fn scalar(base: TypeName) -> Self {
        TypeRef { base, dims: 0 }
    }

    pub fn is_array(&self) -> bool {
        self.dims > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Variable(String),
    Grouping(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Postfix(StepOp, Box<Expr>),
    /// `name = value`
    Assign(String, Box<Expr>),
    /// `object.field = value`
    MemberAssign(Box<Expr>, String, Box<Expr>),
    /// `array[i, j] = value`
    ArrayAssign(Box<Expr>, Vec<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    MemberAccess(Box<Expr>, String),
    StructNew(String, Vec<Expr>),
    ClassNew(String, Vec<Expr>),
    ArrayAccess(Box<Expr>, Vec<Expr>),
    ArrayLiteral(Vec<Expr>),
    ArrayNew(TypeName, Vec<Expr>),
}

impl Expr {
    /// Expressions whose value is never echoed as `Result:` by an
    /// expression statement.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            Expr::Assign(..)
                | Expr::MemberAssign(..)
                | Expr::ArrayAssign(..)
                | Expr::Postfix(..)
                | Expr::Unary(UnaryOp::Inc | UnaryOp::Dec, _)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub exported: bool,
    pub ty: TypeRef,
    pub name: String,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: TypeRef,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub exported: bool,
    pub ret: TypeRef,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

/// Shared shape of `struct` and `class` declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub exported: bool,
    pub name: String,
    pub fields: Vec<VarDecl>,
    pub methods: Vec<Rc<FnDecl>>,
    pub constructor: Option<Rc<FnDecl>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),
    Block(Vec<Stmt>),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    While(Expr, Box<Stmt>),
    Return(Option<Expr>),
    VarDecl(VarDecl),
    FunctionDecl(Rc<FnDecl>),
    StructDecl(Rc<TypeDecl>),
    ClassDecl(Rc<TypeDecl>),
    /// `import "path";` or `import as alias from "path";`
    Import {
        path: String,
        alias: Option<String>,
    },
}
