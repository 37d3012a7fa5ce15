//! carlos-par - AST Node Definitions
//!
//! This module contains every parse-tree node variant the Carlos analyzer
//! (`carlos-sem`) is documented to depend on. No lexer or parser lives in
//! this crate — these are the "opaque producer of tagged parse nodes"
//! types, made concrete enough to compile against.

use carlos_util::{Span, Symbol};

/// Parse-tree root: an ordered sequence of top-level statements.
#[derive(Debug, Clone)]
pub struct Ast {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// A statement, in the sense §4.4 dispatches on.
#[derive(Debug, Clone)]
pub enum Stmt {
    VarDecl(VarDecl),
    StructDecl(StructDecl),
    FunctionDecl(FunctionDecl),
    Increment(IncDecStmt),
    Decrement(IncDecStmt),
    Assignment(AssignmentStmt),
    Call(CallExpr),
    Break(Span),
    Return(ReturnStmt),
    If(IfStmt),
    While(WhileStmt),
    Repeat(RepeatStmt),
    ForRange(ForRangeStmt),
    ForOf(ForOfStmt),
}

/// `let`/`const` *name* `=` *expr* `;`
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub modifier: VarModifier,
    pub name: Symbol,
    pub initializer: Expr,
    pub span: Span,
}

/// Which keyword introduced a [`VarDecl`]; governs read-only status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarModifier {
    Let,
    Const,
}

/// A struct-type declaration: `struct Name { field: Type, ... }`
#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: Symbol,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

/// One field in a [`StructDecl`].
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: Symbol,
    pub type_expr: TypeExpr,
    pub span: Span,
}

/// A function declaration.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: Symbol,
    pub params: Vec<ParamDecl>,
    pub return_type: Option<TypeExpr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// One parameter in a [`FunctionDecl`].
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: Symbol,
    pub type_expr: TypeExpr,
    pub span: Span,
}

/// `v++` or `v--`.
#[derive(Debug, Clone)]
pub struct IncDecStmt {
    pub target: Expr,
    pub span: Span,
}

/// `v = e;`
#[derive(Debug, Clone)]
pub struct AssignmentStmt {
    pub target: Expr,
    pub source: Expr,
    pub span: Span,
}

/// `return e;` or `return;` (`value` is `None` for the short form).
#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// `if t {C}`, optionally followed by `else {A}` or `else if ...`.
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: Expr,
    pub consequent: Vec<Stmt>,
    pub alternative: Option<ElseBranch>,
    pub span: Span,
}

/// The trailing branch of an `if`. A brace-block gets its own child scope;
/// a trailing `if` (`else if ...`) reuses the current scope (§4.3).
#[derive(Debug, Clone)]
pub enum ElseBranch {
    Block(Vec<Stmt>),
    If(Box<IfStmt>),
}

/// `while t {B}`
#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `repeat n {B}`
#[derive(Debug, Clone)]
pub struct RepeatStmt {
    pub count: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `for i in a..<b {B}` or `for i in a...b {B}`.
#[derive(Debug, Clone)]
pub struct ForRangeStmt {
    pub iterator: Symbol,
    pub start: Expr,
    pub end: Expr,
    pub op: RangeOp,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Which range operator introduced a [`ForRangeStmt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    /// `..<` — half-open, excludes the end.
    HalfOpen,
    /// `...` — closed, includes the end.
    Closed,
}

/// `for i in c {B}`, iterating the elements of an array-typed `c`.
#[derive(Debug, Clone)]
pub struct ForOfStmt {
    pub iterator: Symbol,
    pub collection: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// An expression, in the sense §4.4 dispatches on.
#[derive(Debug, Clone)]
pub enum Expr {
    Bool(bool, Span),
    Int(i64, Span),
    Float(f64, Span),
    /// Raw spelling, including surrounding quotes (§4.4 "Literals").
    Str(Symbol, Span),
    Id(Symbol, Span),
    Conditional(Box<ConditionalExpr>),
    Binary(Box<BinaryExpr>),
    Unary(Box<UnaryExpr>),
    EmptyArray(Box<EmptyArrayExpr>),
    EmptyOptional(Box<EmptyOptionalExpr>),
    ArrayLiteral(ArrayLiteralExpr),
    Subscript(Box<SubscriptExpr>),
    Member(Box<MemberExpr>),
    Call(CallExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Bool(_, s) | Expr::Int(_, s) | Expr::Float(_, s) | Expr::Str(_, s) | Expr::Id(_, s) => *s,
            Expr::Conditional(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::EmptyArray(e) => e.span,
            Expr::EmptyOptional(e) => e.span,
            Expr::ArrayLiteral(e) => e.span,
            Expr::Subscript(e) => e.span,
            Expr::Member(e) => e.span,
            Expr::Call(e) => e.span,
        }
    }
}

/// `t ? c : a`
#[derive(Debug, Clone)]
pub struct ConditionalExpr {
    pub test: Expr,
    pub consequent: Expr,
    pub alternative: Expr,
    pub span: Span,
}

/// A binary expression. `op` is one of the pre-interned `OP_*` symbols
/// in `carlos_util::symbol` (`??`, `||`, `&&`, bitwise, comparison, shift,
/// additive, multiplicative, `**`).
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: Symbol,
    pub left: Expr,
    pub right: Expr,
    pub span: Span,
}

/// A unary expression: `-x`, `!x`, `#x` (length), or `some x`.
#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: Symbol,
    pub operand: Expr,
    pub span: Span,
}

/// `[](of T)`
#[derive(Debug, Clone)]
pub struct EmptyArrayExpr {
    pub element_type: TypeExpr,
    pub span: Span,
}

/// `no T`
#[derive(Debug, Clone)]
pub struct EmptyOptionalExpr {
    pub base_type: TypeExpr,
    pub span: Span,
}

/// `[e1, e2, ..., en]`. There is no empty-literal form.
#[derive(Debug, Clone)]
pub struct ArrayLiteralExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

/// `a[i]`
#[derive(Debug, Clone)]
pub struct SubscriptExpr {
    pub array: Expr,
    pub index: Expr,
    pub span: Span,
}

/// `obj.f` or `obj?.f`.
#[derive(Debug, Clone)]
pub struct MemberExpr {
    pub object: Expr,
    pub field: Symbol,
    pub optional_chain: bool,
    pub span: Span,
}

/// `c(args...)`, either a constructor call (`c` names a struct type) or
/// an ordinary call (`c` is function-typed) — disambiguated during
/// analysis, not here.
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Expr,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// A type expression, resolved by the analyzer per §4.4 "Type expressions".
#[derive(Debug, Clone)]
pub enum TypeExpr {
    /// A bare identifier — a primitive or struct type name.
    Id(Symbol, Span),
    /// `T?`
    Optional(Box<TypeExpr>, Span),
    /// `[T]`
    Array(Box<TypeExpr>, Span),
    /// `(T1, T2, ...) -> R`
    Function(Vec<TypeExpr>, Box<TypeExpr>, Span),
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Id(_, s) => *s,
            TypeExpr::Optional(_, s) => *s,
            TypeExpr::Array(_, s) => *s,
            TypeExpr::Function(_, _, s) => *s,
        }
    }
}
