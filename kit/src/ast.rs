//! AST node types and the index arena that owns them.
//!
//! Every node is reached through [`ExprId`] or [`StmtId`] rather than a raw
//! pointer into a bump-allocated block chain: the two index types are
//! distinct, so a function expecting a statement index can never be handed
//! an expression index by accident. The arena backing both is just two
//! `Vec`s, freed together for free when an [`Ast`] drops.

use qak_core::{Arena, ArenaIndex, Span};

use crate::token::TokenType;

macro_rules! arena_index {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(u32);

        impl ArenaIndex for $name {
            fn from_index(index: u32) -> Self {
                $name(index)
            }

            fn index(self) -> u32 {
                self.0
            }
        }
    };
}

arena_index!(ExprId);
arena_index!(StmtId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeSpecifier {
    pub span: Span,
    pub name: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameter {
    pub span: Span,
    pub name: Span,
    pub type_spec: TypeSpecifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableAccess {
    pub span: Span,
    pub name: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    pub span: Span,
    pub name: Span,
    pub type_spec: Option<TypeSpecifier>,
    pub initializer: Option<ExprId>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Function {
    pub span: Span,
    pub name: Span,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeSpecifier>,
    pub body: Vec<StmtId>,
}

/// A single expression node. Every variant's `span` covers its full
/// textual extent, including its children.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expression {
    Ternary {
        span: Span,
        condition: ExprId,
        true_value: ExprId,
        false_value: ExprId,
    },
    Binary {
        span: Span,
        op: Span,
        op_type: TokenType,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        span: Span,
        op: Span,
        op_type: TokenType,
        operand: ExprId,
    },
    Literal {
        span: Span,
        literal_type: TokenType,
        value: Span,
    },
    VariableAccess(VariableAccess),
    FunctionCall {
        span: Span,
        target: VariableAccess,
        arguments: Vec<ExprId>,
    },
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Ternary { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Literal { span, .. }
            | Expression::FunctionCall { span, .. } => *span,
            Expression::VariableAccess(access) => access.span,
        }
    }
}

/// A single statement node. `Expression` is included as the open sum's
/// catch-all: any expression used in statement position.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Statement {
    Variable(Variable),
    While {
        span: Span,
        condition: ExprId,
        body: Vec<StmtId>,
    },
    If {
        span: Span,
        condition: ExprId,
        true_block: Vec<StmtId>,
        false_block: Vec<StmtId>,
    },
    Return {
        span: Span,
        value: Option<ExprId>,
    },
    Expression {
        span: Span,
        expr: ExprId,
    },
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Variable(variable) => variable.span,
            Statement::While { span, .. }
            | Statement::If { span, .. }
            | Statement::Return { span, .. }
            | Statement::Expression { span, .. } => *span,
        }
    }
}

/// The parse root. `variables` duplicates every module-level `Variable`
/// statement — the same node is reachable both directly here and through
/// `statements`, matching the source-of-truth relationship in the original
/// grammar where a module-level `var` is simultaneously a declaration and
/// an executable statement.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Module {
    pub span: Span,
    pub name: Span,
    pub variables: Vec<Variable>,
    pub functions: Vec<Function>,
    pub statements: Vec<StmtId>,
}

/// Owns every expression and statement node produced by a single parse,
/// plus the `Module` root that references them by index.
#[derive(Debug, Clone)]
pub struct Ast {
    exprs: Arena<Expression, ExprId>,
    stmts: Arena<Statement, StmtId>,
    pub module: Module,
}

impl Ast {
    pub(crate) fn new(exprs: Arena<Expression, ExprId>, stmts: Arena<Statement, StmtId>, module: Module) -> Self {
        Self { exprs, stmts, module }
    }

    pub fn expr(&self, id: ExprId) -> &Expression {
        self.exprs.get(id)
    }

    pub fn stmt(&self, id: StmtId) -> &Statement {
        self.stmts.get(id)
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

/// Builder-side arena pair, kept separate from `Ast` so the parser can
/// allocate freely and only assemble the final `Module` once parsing
/// succeeds.
#[derive(Debug, Default)]
pub(crate) struct AstBuilder {
    pub(crate) exprs: Arena<Expression, ExprId>,
    pub(crate) stmts: Arena<Statement, StmtId>,
}

impl AstBuilder {
    pub(crate) fn new() -> Self {
        Self {
            exprs: Arena::new(),
            stmts: Arena::new(),
        }
    }

    pub(crate) fn alloc_expr(&mut self, expr: Expression) -> ExprId {
        self.exprs.alloc(expr)
    }

    pub(crate) fn alloc_stmt(&mut self, stmt: Statement) -> StmtId {
        self.stmts.alloc(stmt)
    }

    pub(crate) fn finish(self, module: Module) -> Ast {
        Ast::new(self.exprs, self.stmts, module)
    }
}
