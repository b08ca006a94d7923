//! Indented textual dumps of tokens, diagnostics, and the AST. A debug aid,
//! not a serialization format — shape and wording may change freely.

use std::fmt::Write as _;

use qak_core::Source;

use crate::ast::{Ast, Expression, Function, Statement, Variable};
use crate::token::Token;

const INDENT: &str = "  ";

pub fn print_tokens(source: &Source, tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let _ = writeln!(
            out,
            "{:?} '{}' [{}:{}]",
            token.token_type,
            source.text(token.span),
            token.span.start,
            token.span.end
        );
    }
    out
}

pub fn print_ast(source: &Source, ast: &Ast) -> String {
    let mut out = String::new();
    print_module(&mut out, source, ast, 0);
    out
}

fn write_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn print_module(out: &mut String, source: &Source, ast: &Ast, depth: usize) {
    let module = &ast.module;
    write_indent(out, depth);
    let _ = writeln!(out, "Module '{}'", source.text(module.name));
    for variable in &module.variables {
        print_variable(out, source, ast, variable, depth + 1);
    }
    for function in &module.functions {
        print_function(out, source, ast, function, depth + 1);
    }
    for stmt_id in &module.statements {
        print_statement(out, source, ast, ast.stmt(*stmt_id), depth + 1);
    }
}

fn print_function(out: &mut String, source: &Source, ast: &Ast, function: &Function, depth: usize) {
    write_indent(out, depth);
    let _ = writeln!(out, "Function '{}'", source.text(function.name));
    for parameter in &function.parameters {
        write_indent(out, depth + 1);
        let _ = writeln!(
            out,
            "Parameter '{}': '{}'",
            source.text(parameter.name),
            source.text(parameter.type_spec.name)
        );
    }
    if let Some(return_type) = function.return_type {
        write_indent(out, depth + 1);
        let _ = writeln!(out, "ReturnType '{}'", source.text(return_type.name));
    }
    for stmt_id in &function.body {
        print_statement(out, source, ast, ast.stmt(*stmt_id), depth + 1);
    }
}

fn print_variable(out: &mut String, source: &Source, ast: &Ast, variable: &Variable, depth: usize) {
    write_indent(out, depth);
    let _ = writeln!(out, "Variable '{}'", source.text(variable.name));
    if let Some(type_spec) = variable.type_spec {
        write_indent(out, depth + 1);
        let _ = writeln!(out, "Type '{}'", source.text(type_spec.name));
    }
    if let Some(initializer) = variable.initializer {
        print_expression(out, source, ast, ast.expr(initializer), depth + 1);
    }
}

fn print_statement(out: &mut String, source: &Source, ast: &Ast, statement: &Statement, depth: usize) {
    match statement {
        Statement::Variable(variable) => print_variable(out, source, ast, variable, depth),
        Statement::While { condition, body, .. } => {
            write_indent(out, depth);
            let _ = writeln!(out, "While");
            print_expression(out, source, ast, ast.expr(*condition), depth + 1);
            for stmt_id in body {
                print_statement(out, source, ast, ast.stmt(*stmt_id), depth + 1);
            }
        }
        Statement::If {
            condition,
            true_block,
            false_block,
            ..
        } => {
            write_indent(out, depth);
            let _ = writeln!(out, "If");
            print_expression(out, source, ast, ast.expr(*condition), depth + 1);
            for stmt_id in true_block {
                print_statement(out, source, ast, ast.stmt(*stmt_id), depth + 1);
            }
            if !false_block.is_empty() {
                write_indent(out, depth);
                let _ = writeln!(out, "Else");
                for stmt_id in false_block {
                    print_statement(out, source, ast, ast.stmt(*stmt_id), depth + 1);
                }
            }
        }
        Statement::Return { value, .. } => {
            write_indent(out, depth);
            let _ = writeln!(out, "Return");
            if let Some(value) = value {
                print_expression(out, source, ast, ast.expr(*value), depth + 1);
            }
        }
        Statement::Expression { expr, .. } => print_expression(out, source, ast, ast.expr(*expr), depth),
    }
}

fn print_expression(out: &mut String, source: &Source, ast: &Ast, expression: &Expression, depth: usize) {
    write_indent(out, depth);
    match expression {
        Expression::Ternary {
            condition,
            true_value,
            false_value,
            ..
        } => {
            let _ = writeln!(out, "Ternary");
            print_expression(out, source, ast, ast.expr(*condition), depth + 1);
            print_expression(out, source, ast, ast.expr(*true_value), depth + 1);
            print_expression(out, source, ast, ast.expr(*false_value), depth + 1);
        }
        Expression::Binary {
            op_type, left, right, ..
        } => {
            let _ = writeln!(out, "Binary {op_type:?}");
            print_expression(out, source, ast, ast.expr(*left), depth + 1);
            print_expression(out, source, ast, ast.expr(*right), depth + 1);
        }
        Expression::Unary { op_type, operand, .. } => {
            let _ = writeln!(out, "Unary {op_type:?}");
            print_expression(out, source, ast, ast.expr(*operand), depth + 1);
        }
        Expression::Literal { literal_type, value, .. } => {
            let _ = writeln!(out, "Literal {literal_type:?} '{}'", source.text(*value));
        }
        Expression::VariableAccess(access) => {
            let _ = writeln!(out, "VariableAccess '{}'", source.text(access.name));
        }
        Expression::FunctionCall { target, arguments, .. } => {
            let _ = writeln!(out, "FunctionCall '{}'", source.text(target.name));
            for argument in arguments {
                print_expression(out, source, ast, ast.expr(*argument), depth + 1);
            }
        }
    }
}
