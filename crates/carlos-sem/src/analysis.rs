//! The analyzer: walks a `carlos_par::ast::Ast` and produces a resolved
//! [`crate::ast::Program`], or the first [`AnalysisError`] it hits (§4.4).
//!
//! Analysis is single-pass and fails fast — the first rejected construct
//! stops the walk and is returned, there is no error recovery or multiple
//! diagnostics per run (§9 "Fail-fast, not accumulate-and-report").

use crate::ast::*;
use crate::entity::{Entity, FunctionData, VariableData};
use crate::error::AnalysisError;
use crate::prelude::Prelude;
use crate::scope::Context;
use crate::types::{Field, StructTypeData, Type, Types};
use carlos_par::ast as pt;
use carlos_util::symbol::*;
use carlos_util::{DefIdGenerator, Handler, Span, Symbol};
use std::rc::Rc;
use tracing::{debug, trace};

/// Which standard-library bindings a fresh [`Analyzer`] should seed its
/// root context with (§4.7 "Configuration").
#[derive(Debug, Clone, Copy, Default)]
pub enum PreludeOption {
    /// `\u{3c0}`, `print`, and the math functions (§4.5).
    #[default]
    Standard,
    /// No standard-library names at all.
    Empty,
}

/// Drives semantic analysis of one program. Owns the canonical [`Types`]
/// and [`DefIdGenerator`] for the run, so every type and entity minted
/// while walking the tree shares one identity domain (§5).
pub struct Analyzer {
    types: Types,
    ids: DefIdGenerator,
    handler: Handler,
    root: Rc<Context>,
}

impl Analyzer {
    /// Builds an analyzer configured with `prelude` and reporting through
    /// `handler`. Each call mints its own [`Types`]/[`DefIdGenerator`]
    /// pair, so two `Analyzer`s never share type identity even if built
    /// from the same `PreludeOption`.
    pub fn new(handler: Handler, prelude: PreludeOption) -> Self {
        let types = Types::new();
        let ids = DefIdGenerator::new();
        let prelude = match prelude {
            PreludeOption::Standard => Prelude::standard(&types, &ids),
            PreludeOption::Empty => Prelude::empty(),
        };
        let root = Context::root_with_prelude(&prelude);
        Self {
            types,
            ids,
            handler,
            root,
        }
    }

    /// Convenience constructor: the standard prelude, diagnostics reported
    /// through a fresh non-panicking [`Handler`].
    pub fn with_standard_prelude() -> Self {
        Self::new(Handler::new(), PreludeOption::Standard)
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Analyzes a complete program. Returns the first semantic error hit,
    /// if any, with no partial result.
    pub fn analyze(&self, ast: &pt::Ast) -> Result<Program, AnalysisError> {
        debug!(statements = ast.statements.len(), "starting analysis");
        let statements = self.analyze_stmts(&ast.statements, &self.root)?;
        debug!("analysis completed with no errors");
        Ok(Program { statements })
    }

    fn err(&self, message: impl Into<String>, span: Span) -> AnalysisError {
        let message = message.into();
        trace!(%message, "rejecting program");
        self.handler
            .build_error(span, message.clone())
            .emit(&self.handler);
        AnalysisError::new(message, span)
    }

    fn already_declared(&self, name: Symbol, span: Span) -> AnalysisError {
        self.err(format!("Identifier {} already declared", name.as_str()), span)
    }

    fn not_declared(&self, name: Symbol, span: Span) -> AnalysisError {
        self.err(format!("Identifier {} not declared", name.as_str()), span)
    }

    fn not_assignable(&self, source: &Type, target: &Type, span: Span) -> AnalysisError {
        self.err(
            format!(
                "Cannot assign a {} to a {}",
                source.description(),
                target.description()
            ),
            span,
        )
    }

    fn expect_boolean(&self, ty: &Type, span: Span) -> Result<(), AnalysisError> {
        if ty.is_boolean() {
            Ok(())
        } else {
            Err(self.err("boolean expected", span))
        }
    }

    fn expect_int(&self, ty: &Type, span: Span) -> Result<(), AnalysisError> {
        if ty.is_int() {
            Ok(())
        } else {
            Err(self.err("int expected", span))
        }
    }

    fn expect_numeric(&self, ty: &Type, span: Span) -> Result<(), AnalysisError> {
        if ty.is_numeric() {
            Ok(())
        } else {
            Err(self.err("number expected", span))
        }
    }

    fn expect_numeric_or_string(&self, ty: &Type, span: Span) -> Result<(), AnalysisError> {
        if ty.is_numeric_or_string() {
            Ok(())
        } else {
            Err(self.err("number or string expected", span))
        }
    }

    fn expect_same_type(&self, a: &Type, b: &Type, span: Span) -> Result<(), AnalysisError> {
        if a.equivalent_to(b) {
            Ok(())
        } else {
            Err(self.err("Operands do not have the same type", span))
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn analyze_stmts(
        &self,
        stmts: &[pt::Stmt],
        ctx: &Rc<Context>,
    ) -> Result<Vec<Stmt>, AnalysisError> {
        stmts.iter().map(|s| self.analyze_stmt(s, ctx)).collect()
    }

    fn analyze_stmt(&self, stmt: &pt::Stmt, ctx: &Rc<Context>) -> Result<Stmt, AnalysisError> {
        match stmt {
            pt::Stmt::VarDecl(d) => self.analyze_var_decl(d, ctx),
            pt::Stmt::StructDecl(d) => self.analyze_struct_decl(d, ctx),
            pt::Stmt::FunctionDecl(d) => self.analyze_function_decl(d, ctx),
            pt::Stmt::Increment(s) => {
                let target = self.analyze_expr(&s.target, ctx)?;
                self.expect_int(&target.ty(), s.span)?;
                Ok(Stmt::Increment(target))
            }
            pt::Stmt::Decrement(s) => {
                let target = self.analyze_expr(&s.target, ctx)?;
                self.expect_int(&target.ty(), s.span)?;
                Ok(Stmt::Decrement(target))
            }
            pt::Stmt::Assignment(s) => self.analyze_assignment(s, ctx),
            pt::Stmt::Call(call) => Ok(Stmt::Call(self.analyze_call(call, ctx)?)),
            pt::Stmt::Break(span) => {
                if !ctx.in_loop() {
                    return Err(self.err("Break can only appear in a loop", *span));
                }
                Ok(Stmt::Break)
            }
            pt::Stmt::Return(r) => self.analyze_return(r, ctx),
            pt::Stmt::If(s) => Ok(Stmt::If(self.analyze_if(s, ctx)?)),
            pt::Stmt::While(s) => self.analyze_while(s, ctx),
            pt::Stmt::Repeat(s) => self.analyze_repeat(s, ctx),
            pt::Stmt::ForRange(s) => self.analyze_for_range(s, ctx),
            pt::Stmt::ForOf(s) => self.analyze_for_of(s, ctx),
        }
    }

    fn analyze_var_decl(&self, d: &pt::VarDecl, ctx: &Rc<Context>) -> Result<Stmt, AnalysisError> {
        let initializer = self.analyze_expr(&d.initializer, ctx)?;
        let read_only = d.modifier == pt::VarModifier::Const;
        let variable = Rc::new(VariableData {
            id: self.ids.next(),
            name: d.name,
            read_only,
            var_type: initializer.ty(),
        });
        ctx.add(d.name, Entity::Variable(variable.clone()))
            .map_err(|_| self.already_declared(d.name, d.span))?;
        Ok(Stmt::VariableDeclaration(VariableDeclaration {
            variable,
            initializer,
        }))
    }

    fn analyze_struct_decl(
        &self,
        d: &pt::StructDecl,
        ctx: &Rc<Context>,
    ) -> Result<Stmt, AnalysisError> {
        let struct_type = match self.types.new_struct(self.ids.next(), d.name) {
            Type::Struct(s) => s,
            _ => unreachable!("Types::new_struct always returns Type::Struct"),
        };
        // Bind the name before resolving field types, so a field can refer
        // back to this struct through an array or optional wrapper.
        ctx.add(d.name, Entity::Type(Type::Struct(struct_type.clone())))
            .map_err(|_| self.already_declared(d.name, d.span))?;

        let mut fields = Vec::with_capacity(d.fields.len());
        for field_decl in &d.fields {
            if fields.iter().any(|f: &Field| f.name == field_decl.name) {
                return Err(self.err("Fields must be distinct", field_decl.span));
            }
            let field_type = self.resolve_type_expr(&field_decl.type_expr, ctx)?;
            if let Type::Struct(inner) = &field_type {
                if Rc::ptr_eq(inner, &struct_type) {
                    return Err(self.err("Struct cannot be recursive", field_decl.span));
                }
            }
            fields.push(Field {
                name: field_decl.name,
                field_type,
            });
        }
        struct_type.set_fields(fields);
        Ok(Stmt::StructDeclaration(StructDeclaration { struct_type }))
    }

    fn analyze_function_decl(
        &self,
        d: &pt::FunctionDecl,
        ctx: &Rc<Context>,
    ) -> Result<Stmt, AnalysisError> {
        let mut param_types = Vec::with_capacity(d.params.len());
        for p in &d.params {
            param_types.push(self.resolve_type_expr(&p.type_expr, ctx)?);
        }
        let return_type = match &d.return_type {
            Some(te) => self.resolve_type_expr(te, ctx)?,
            None => self.types.void(),
        };
        let func_type = Rc::new(crate::types::FunctionType {
            params: param_types.clone(),
            return_type,
            variadic: false,
        });
        let function = Rc::new(FunctionData {
            id: self.ids.next(),
            name: d.name,
            func_type,
        });
        ctx.add(d.name, Entity::Function(function.clone()))
            .map_err(|_| self.already_declared(d.name, d.span))?;

        let body_ctx = ctx.new_child(Some(false), Some(Some(function.clone())));
        let mut params = Vec::with_capacity(d.params.len());
        for (p, ty) in d.params.iter().zip(param_types.into_iter()) {
            let var = Rc::new(VariableData {
                id: self.ids.next(),
                name: p.name,
                read_only: false,
                var_type: ty,
            });
            body_ctx
                .add(p.name, Entity::Variable(var.clone()))
                .map_err(|_| self.already_declared(p.name, p.span))?;
            params.push(var);
        }
        let body = self.analyze_stmts(&d.body, &body_ctx)?;
        Ok(Stmt::FunctionDeclaration(FunctionDeclaration {
            function,
            params,
            body,
        }))
    }

    fn analyze_assignment(
        &self,
        s: &pt::AssignmentStmt,
        ctx: &Rc<Context>,
    ) -> Result<Stmt, AnalysisError> {
        let target = self.analyze_expr(&s.target, ctx)?;
        let source = self.analyze_expr(&s.source, ctx)?;
        if let Expr::Variable(v) = &target {
            if v.read_only {
                return Err(self.err(
                    format!("Cannot assign to constant {}", v.name.as_str()),
                    s.span,
                ));
            }
        }
        if !source.ty().assignable_to(&target.ty()) {
            return Err(self.not_assignable(&source.ty(), &target.ty(), s.span));
        }
        Ok(Stmt::Assignment(Assignment { target, source }))
    }

    fn analyze_return(&self, r: &pt::ReturnStmt, ctx: &Rc<Context>) -> Result<Stmt, AnalysisError> {
        let function = ctx
            .enclosing_function()
            .ok_or_else(|| self.err("Return can only appear in a function", r.span))?;
        let return_type = &function.func_type.return_type;
        match &r.value {
            Some(value_expr) => {
                if return_type.equivalent_to(&self.types.void()) {
                    return Err(self.err("Cannot return a value from this function", r.span));
                }
                let value = self.analyze_expr(value_expr, ctx)?;
                if !value.ty().assignable_to(return_type) {
                    return Err(self.not_assignable(&value.ty(), return_type, r.span));
                }
                Ok(Stmt::Return(Some(value)))
            }
            None => {
                if !return_type.equivalent_to(&self.types.void()) {
                    return Err(self.err("Something should be returned here", r.span));
                }
                Ok(Stmt::Return(None))
            }
        }
    }

    fn analyze_if(&self, s: &pt::IfStmt, ctx: &Rc<Context>) -> Result<IfStmt, AnalysisError> {
        let condition = self.analyze_expr(&s.condition, ctx)?;
        self.expect_boolean(&condition.ty(), s.condition.span())?;
        let cons_ctx = ctx.new_child(None, None);
        let consequent = self.analyze_stmts(&s.consequent, &cons_ctx)?;
        let alternative = match &s.alternative {
            None => None,
            Some(pt::ElseBranch::Block(stmts)) => {
                let alt_ctx = ctx.new_child(None, None);
                Some(ElseBranch::Block(self.analyze_stmts(stmts, &alt_ctx)?))
            }
            // A trailing `else if` reuses the current scope rather than
            // opening a child of it (§4.3): it is not itself a block.
            Some(pt::ElseBranch::If(inner)) => {
                Some(ElseBranch::If(Box::new(self.analyze_if(inner, ctx)?)))
            }
        };
        Ok(IfStmt {
            condition,
            consequent,
            alternative,
        })
    }

    fn analyze_while(&self, s: &pt::WhileStmt, ctx: &Rc<Context>) -> Result<Stmt, AnalysisError> {
        let condition = self.analyze_expr(&s.condition, ctx)?;
        self.expect_boolean(&condition.ty(), s.condition.span())?;
        let body_ctx = ctx.new_child(Some(true), None);
        let body = self.analyze_stmts(&s.body, &body_ctx)?;
        Ok(Stmt::While(WhileStmt { condition, body }))
    }

    fn analyze_repeat(&self, s: &pt::RepeatStmt, ctx: &Rc<Context>) -> Result<Stmt, AnalysisError> {
        let count = self.analyze_expr(&s.count, ctx)?;
        self.expect_int(&count.ty(), s.count.span())?;
        let body_ctx = ctx.new_child(Some(true), None);
        let body = self.analyze_stmts(&s.body, &body_ctx)?;
        Ok(Stmt::Repeat(RepeatStmt { count, body }))
    }

    fn analyze_for_range(
        &self,
        s: &pt::ForRangeStmt,
        ctx: &Rc<Context>,
    ) -> Result<Stmt, AnalysisError> {
        let start = self.analyze_expr(&s.start, ctx)?;
        self.expect_int(&start.ty(), s.start.span())?;
        let end = self.analyze_expr(&s.end, ctx)?;
        self.expect_int(&end.ty(), s.end.span())?;
        let body_ctx = ctx.new_child(Some(true), None);
        let iterator = Rc::new(VariableData {
            id: self.ids.next(),
            name: s.iterator,
            read_only: true,
            var_type: self.types.int(),
        });
        body_ctx
            .add(s.iterator, Entity::Variable(iterator.clone()))
            .map_err(|_| self.already_declared(s.iterator, s.span))?;
        let body = self.analyze_stmts(&s.body, &body_ctx)?;
        Ok(Stmt::ForRange(ForRangeStmt {
            iterator,
            start,
            end,
            op: s.op,
            body,
        }))
    }

    fn analyze_for_of(&self, s: &pt::ForOfStmt, ctx: &Rc<Context>) -> Result<Stmt, AnalysisError> {
        let collection = self.analyze_expr(&s.collection, ctx)?;
        let base = collection
            .ty()
            .as_array_base()
            .cloned()
            .ok_or_else(|| self.err("array expected", s.collection.span()))?;
        let body_ctx = ctx.new_child(Some(true), None);
        let iterator = Rc::new(VariableData {
            id: self.ids.next(),
            name: s.iterator,
            read_only: true,
            var_type: base,
        });
        body_ctx
            .add(s.iterator, Entity::Variable(iterator.clone()))
            .map_err(|_| self.already_declared(s.iterator, s.span))?;
        let body = self.analyze_stmts(&s.body, &body_ctx)?;
        Ok(Stmt::ForOf(ForOfStmt {
            iterator,
            collection,
            body,
        }))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn analyze_expr(&self, expr: &pt::Expr, ctx: &Rc<Context>) -> Result<Expr, AnalysisError> {
        match expr {
            pt::Expr::Bool(v, _) => Ok(Expr::Bool {
                value: *v,
                ty: self.types.boolean(),
            }),
            pt::Expr::Int(v, _) => Ok(Expr::Int {
                value: *v,
                ty: self.types.int(),
            }),
            pt::Expr::Float(v, _) => Ok(Expr::Float {
                value: *v,
                ty: self.types.float(),
            }),
            pt::Expr::Str(s, _) => Ok(Expr::Str {
                value: *s,
                ty: self.types.string(),
            }),
            pt::Expr::Id(name, span) => {
                let entity = ctx
                    .lookup(*name)
                    .map_err(|_| self.not_declared(*name, *span))?;
                Ok(self.expr_from_entity(entity))
            }
            pt::Expr::Conditional(c) => self.analyze_conditional(c, ctx),
            pt::Expr::Binary(b) => self.analyze_binary(b, ctx),
            pt::Expr::Unary(u) => self.analyze_unary(u, ctx),
            pt::Expr::EmptyArray(e) => {
                let element_type = self.resolve_type_expr(&e.element_type, ctx)?;
                let ty = self.types.array(element_type.clone());
                Ok(Expr::EmptyArray { element_type, ty })
            }
            pt::Expr::EmptyOptional(e) => {
                let base_type = self.resolve_type_expr(&e.base_type, ctx)?;
                let ty = self.types.optional(base_type.clone());
                Ok(Expr::EmptyOptional { base_type, ty })
            }
            pt::Expr::ArrayLiteral(e) => self.analyze_array_literal(e, ctx),
            pt::Expr::Subscript(e) => self.analyze_subscript(e, ctx),
            pt::Expr::Member(e) => self.analyze_member(e, ctx),
            pt::Expr::Call(c) => Ok(Expr::Call(Box::new(self.analyze_call(c, ctx)?))),
        }
    }

    fn expr_from_entity(&self, entity: Entity) -> Expr {
        match entity {
            Entity::Variable(v) => Expr::Variable(v),
            Entity::Function(f) => Expr::Function(f),
            Entity::Type(t) => Expr::TypeValue {
                referenced: t,
                ty: self.types.type_of_types(),
            },
        }
    }

    fn analyze_conditional(
        &self,
        c: &pt::ConditionalExpr,
        ctx: &Rc<Context>,
    ) -> Result<Expr, AnalysisError> {
        let test = self.analyze_expr(&c.test, ctx)?;
        self.expect_boolean(&test.ty(), c.test.span())?;
        let consequent = self.analyze_expr(&c.consequent, ctx)?;
        let alternative = self.analyze_expr(&c.alternative, ctx)?;
        self.expect_same_type(&consequent.ty(), &alternative.ty(), c.span)?;
        let ty = consequent.ty();
        Ok(Expr::Conditional(Box::new(ConditionalExpr {
            test,
            consequent,
            alternative,
            ty,
        })))
    }

    fn analyze_binary(&self, b: &pt::BinaryExpr, ctx: &Rc<Context>) -> Result<Expr, AnalysisError> {
        let left = self.analyze_expr(&b.left, ctx)?;
        let right = self.analyze_expr(&b.right, ctx)?;
        let op = b.op;

        let ty = if op == OP_UNWRAP_ELSE {
            let base = left
                .ty()
                .as_optional_base()
                .cloned()
                .ok_or_else(|| self.err("Optional expected", b.left.span()))?;
            if !right.ty().assignable_to(&base) {
                return Err(self.not_assignable(&right.ty(), &base, b.right.span()));
            }
            left.ty()
        } else if op == OP_OR || op == OP_AND {
            self.expect_boolean(&left.ty(), b.left.span())?;
            self.expect_boolean(&right.ty(), b.right.span())?;
            self.types.boolean()
        } else if op == OP_BIT_AND || op == OP_BIT_OR || op == OP_BIT_XOR {
            self.expect_int(&left.ty(), b.left.span())?;
            self.expect_int(&right.ty(), b.right.span())?;
            self.types.int()
        } else if op == OP_LT || op == OP_LE || op == OP_GT || op == OP_GE {
            self.expect_same_type(&left.ty(), &right.ty(), b.span)?;
            self.expect_numeric_or_string(&left.ty(), b.left.span())?;
            self.types.boolean()
        } else if op == OP_EQ || op == OP_NE {
            self.expect_same_type(&left.ty(), &right.ty(), b.span)?;
            self.types.boolean()
        } else if op == OP_SHL || op == OP_SHR {
            self.expect_int(&left.ty(), b.left.span())?;
            self.expect_int(&right.ty(), b.right.span())?;
            self.types.int()
        } else if op == OP_ADD {
            self.expect_same_type(&left.ty(), &right.ty(), b.span)?;
            self.expect_numeric_or_string(&left.ty(), b.left.span())?;
            left.ty()
        } else if op == OP_SUB || op == OP_MUL || op == OP_DIV || op == OP_REM || op == OP_POW {
            self.expect_same_type(&left.ty(), &right.ty(), b.span)?;
            self.expect_numeric(&left.ty(), b.left.span())?;
            left.ty()
        } else {
            return Err(self.err(format!("Unknown operator {}", op.as_str()), b.span));
        };

        Ok(Expr::Binary(Box::new(BinaryExpr {
            op,
            left,
            right,
            ty,
        })))
    }

    fn analyze_unary(&self, u: &pt::UnaryExpr, ctx: &Rc<Context>) -> Result<Expr, AnalysisError> {
        let operand = self.analyze_expr(&u.operand, ctx)?;
        let op = u.op;

        let ty = if op == OP_NEG {
            self.expect_numeric(&operand.ty(), u.operand.span())?;
            operand.ty()
        } else if op == OP_NOT {
            self.expect_boolean(&operand.ty(), u.operand.span())?;
            self.types.boolean()
        } else if op == OP_LEN {
            if operand.ty().as_array_base().is_none() {
                return Err(self.err("array expected", u.operand.span()));
            }
            self.types.int()
        } else if op == KW_SOME {
            self.types.optional(operand.ty())
        } else {
            return Err(self.err(format!("Unknown operator {}", op.as_str()), u.span));
        };

        Ok(Expr::Unary(Box::new(UnaryExpr { op, operand, ty })))
    }

    fn analyze_array_literal(
        &self,
        e: &pt::ArrayLiteralExpr,
        ctx: &Rc<Context>,
    ) -> Result<Expr, AnalysisError> {
        let mut elements = Vec::with_capacity(e.elements.len());
        for el in &e.elements {
            elements.push(self.analyze_expr(el, ctx)?);
        }
        let element_type = elements
            .first()
            .map(Expr::ty)
            .ok_or_else(|| self.err("Array literal must not be empty", e.span))?;
        for el in &elements[1..] {
            self.expect_same_type(&el.ty(), &element_type, e.span)?;
        }
        let ty = self.types.array(element_type);
        Ok(Expr::ArrayLiteral { elements, ty })
    }

    fn analyze_subscript(
        &self,
        e: &pt::SubscriptExpr,
        ctx: &Rc<Context>,
    ) -> Result<Expr, AnalysisError> {
        let array = self.analyze_expr(&e.array, ctx)?;
        let ty = array
            .ty()
            .as_array_base()
            .cloned()
            .ok_or_else(|| self.err("array expected", e.array.span()))?;
        let index = self.analyze_expr(&e.index, ctx)?;
        self.expect_int(&index.ty(), e.index.span())?;
        Ok(Expr::Subscript(Box::new(SubscriptExpr {
            array,
            index,
            ty,
        })))
    }

    fn analyze_member(&self, e: &pt::MemberExpr, ctx: &Rc<Context>) -> Result<Expr, AnalysisError> {
        let object = self.analyze_expr(&e.object, ctx)?;
        let struct_type = self.expect_struct_type(&object.ty(), e.optional_chain, e.object.span())?;
        let field = struct_type
            .field(e.field)
            .ok_or_else(|| self.err("No such field", e.span))?;
        let ty = if e.optional_chain {
            self.types.optional(field.field_type)
        } else {
            field.field_type
        };
        Ok(Expr::Member(Box::new(MemberExpr {
            object,
            field: e.field,
            optional_chain: e.optional_chain,
            ty,
        })))
    }

    /// Resolves the struct being accessed through `.`/`?.`. For `?.`, the
    /// object must be `S?` for some struct `S`; for plain `.`, it must be
    /// `S` directly. Both failures are worded "Struct expected" — wording
    /// it "Optional expected" for the `?.` case, as an earlier version of
    /// this check did, is wrong: the object not being a struct is the
    /// actual problem whether or not it was wrapped in an optional (§7, §9).
    fn expect_struct_type(
        &self,
        ty: &Type,
        optional_chain: bool,
        span: Span,
    ) -> Result<Rc<StructTypeData>, AnalysisError> {
        let candidate = if optional_chain {
            ty.as_optional_base().cloned()
        } else {
            Some(ty.clone())
        };
        candidate
            .and_then(|t| t.as_struct().cloned())
            .ok_or_else(|| self.err("Struct expected", span))
    }

    fn analyze_call(&self, call: &pt::CallExpr, ctx: &Rc<Context>) -> Result<CallExpr, AnalysisError> {
        let callee = self.analyze_expr(&call.callee, ctx)?;
        match &callee {
            Expr::TypeValue {
                referenced: Type::Struct(s),
                ..
            } => self.analyze_constructor_call(s.clone(), call, ctx),
            _ => self.analyze_function_call(callee, call, ctx),
        }
    }

    fn analyze_constructor_call(
        &self,
        struct_type: Rc<StructTypeData>,
        call: &pt::CallExpr,
        ctx: &Rc<Context>,
    ) -> Result<CallExpr, AnalysisError> {
        let field_types: Vec<Type> = struct_type
            .fields
            .borrow()
            .iter()
            .map(|f| f.field_type.clone())
            .collect();
        if call.args.len() != field_types.len() {
            return Err(self.err(
                format!(
                    "{} argument(s) required but {} passed",
                    field_types.len(),
                    call.args.len()
                ),
                call.span,
            ));
        }
        let mut args = Vec::with_capacity(call.args.len());
        for (arg_expr, field_type) in call.args.iter().zip(field_types.iter()) {
            let arg = self.analyze_expr(arg_expr, ctx)?;
            if !arg.ty().assignable_to(field_type) {
                return Err(self.not_assignable(&arg.ty(), field_type, arg_expr.span()));
            }
            args.push(arg);
        }
        Ok(CallExpr {
            target: CallTarget::Constructor(struct_type.clone()),
            args,
            ty: Type::Struct(struct_type),
        })
    }

    fn analyze_function_call(
        &self,
        callee: Expr,
        call: &pt::CallExpr,
        ctx: &Rc<Context>,
    ) -> Result<CallExpr, AnalysisError> {
        let func_type = callee.ty().as_function().cloned().ok_or_else(|| {
            self.err(
                format!("{} is not callable", callee.ty().description()),
                call.span,
            )
        })?;
        let mut args = Vec::with_capacity(call.args.len());
        if func_type.variadic {
            let param_type = &func_type.params[0];
            for arg_expr in &call.args {
                let arg = self.analyze_expr(arg_expr, ctx)?;
                if !arg.ty().assignable_to(param_type) {
                    return Err(self.not_assignable(&arg.ty(), param_type, arg_expr.span()));
                }
                args.push(arg);
            }
        } else {
            if call.args.len() != func_type.params.len() {
                return Err(self.err(
                    format!(
                        "{} argument(s) required but {} passed",
                        func_type.params.len(),
                        call.args.len()
                    ),
                    call.span,
                ));
            }
            for (arg_expr, param_type) in call.args.iter().zip(func_type.params.iter()) {
                let arg = self.analyze_expr(arg_expr, ctx)?;
                if !arg.ty().assignable_to(param_type) {
                    return Err(self.not_assignable(&arg.ty(), param_type, arg_expr.span()));
                }
                args.push(arg);
            }
        }
        let ty = func_type.return_type.clone();
        Ok(CallExpr {
            target: CallTarget::Function(callee),
            args,
            ty,
        })
    }

    // ------------------------------------------------------------------
    // Type expressions
    // ------------------------------------------------------------------

    fn resolve_type_expr(&self, te: &pt::TypeExpr, ctx: &Rc<Context>) -> Result<Type, AnalysisError> {
        match te {
            pt::TypeExpr::Id(name, span) => {
                if let Some(primitive) = self.types.by_name(name.as_str()) {
                    return Ok(primitive);
                }
                let entity = ctx
                    .lookup(*name)
                    .map_err(|_| self.not_declared(*name, *span))?;
                entity
                    .as_type()
                    .cloned()
                    .ok_or_else(|| self.err("Type expected", *span))
            }
            pt::TypeExpr::Optional(inner, _) => {
                Ok(self.types.optional(self.resolve_type_expr(inner, ctx)?))
            }
            pt::TypeExpr::Array(inner, _) => {
                Ok(self.types.array(self.resolve_type_expr(inner, ctx)?))
            }
            pt::TypeExpr::Function(params, ret, _) => {
                let params = params
                    .iter()
                    .map(|p| self.resolve_type_expr(p, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                let return_type = self.resolve_type_expr(ret, ctx)?;
                Ok(self.types.function(params, return_type))
            }
        }
    }
}
