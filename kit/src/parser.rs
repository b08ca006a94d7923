//! A Pratt-style recursive-descent parser with explicit operator-precedence
//! climbing.
//!
//! `parse` drives the tokenizer first: if tokenizing reported any
//! diagnostic, parsing never starts. Parsing itself stops at the first
//! unrecoverable mismatch — there is no error recovery — leaving every
//! diagnostic raised up to that point in the sink.

use qak_core::{DiagnosticSink, ParseConfig, RecursionGuard, Source, Span};

use crate::ast::{Ast, AstBuilder, Expression, ExprId, Function, Module, Parameter, Statement, StmtId, TypeSpecifier, Variable, VariableAccess};
use crate::stream::TokenStream;
use crate::token::{Token, TokenType};
use crate::tokenizer::tokenize;

/// Precedence levels 0 (loosest) through 5 (tightest), per spec: each level
/// is left-associative and falls through to the next-tighter level on its
/// left and right operands.
const PRECEDENCE_LEVELS: [&[TokenType]; 6] = [
    &[TokenType::Assignment],
    &[TokenType::Or, TokenType::And, TokenType::Xor],
    &[TokenType::Equal, TokenType::NotEqual],
    &[
        TokenType::Less,
        TokenType::LessEqual,
        TokenType::Greater,
        TokenType::GreaterEqual,
    ],
    &[TokenType::Plus, TokenType::Minus],
    &[TokenType::ForwardSlash, TokenType::Asterisk, TokenType::Percentage],
];

/// Runs the full tokenize-then-parse pipeline over `source`, returning the
/// resulting AST or `None` if tokenizing reported an error or parsing
/// failed. Every diagnostic raised along the way ends up in `diagnostics`.
pub fn parse(source: &Source, config: ParseConfig, diagnostics: &mut DiagnosticSink) -> Option<Ast> {
    let tokens = tokenize(source, diagnostics);
    if diagnostics.has_errors() {
        return None;
    }
    parse_tokens(source, &tokens, config, diagnostics)
}

/// Parses an already-tokenized source. Callers that need to keep the token
/// vector around after parsing (the embedding API's `CompiledModule::tokens`)
/// tokenize once themselves and call this directly instead of `parse`.
pub fn parse_tokens(source: &Source, tokens: &[Token], config: ParseConfig, diagnostics: &mut DiagnosticSink) -> Option<Ast> {
    if tokens.len() > config.max_tokens {
        let line_number = source.last_line_number();
        let line = source.line(line_number);
        diagnostics.push(
            Span::new(line.end, line_number, line.end, line_number),
            format!(
                "token limit exceeded: consumed {} > limit {}",
                tokens.len(),
                config.max_tokens
            ),
        );
        return None;
    }

    let mut parser = Parser {
        source,
        stream: TokenStream::new(tokens),
        diagnostics,
        config,
        recursion: RecursionGuard::new(),
        ast: AstBuilder::new(),
    };
    parser.parse_module()
}

struct Parser<'s, 't, 'd> {
    source: &'s Source,
    stream: TokenStream<'t>,
    diagnostics: &'d mut DiagnosticSink,
    config: ParseConfig,
    recursion: RecursionGuard,
    ast: AstBuilder,
}

impl Parser<'_, '_, '_> {
    fn current_span(&self) -> Span {
        self.stream
            .peek()
            .map(|t| t.span)
            .unwrap_or_else(|| self.stream.eof_span(self.source))
    }

    fn enter_recursion(&mut self) -> Option<()> {
        match self.recursion.enter(self.config.max_recursion_depth) {
            Ok(()) => Some(()),
            Err(err) => {
                let span = self.current_span();
                self.diagnostics.push(span, err.to_string());
                None
            }
        }
    }

    fn exit_recursion(&mut self) {
        self.recursion.exit();
    }

    fn parse_module(&mut self) -> Option<Ast> {
        let start = self.current_span();
        self.stream.expect_text("module", self.source, self.diagnostics)?;
        let name = self.stream.expect(TokenType::Identifier, self.source, self.diagnostics)?.span;

        let mut variables = Vec::new();
        let mut functions = Vec::new();
        let mut statements = Vec::new();
        let mut end = name;

        while self.stream.has_more() {
            if self.stream.match_text(self.source, "fun", false) {
                let function = self.parse_function()?;
                end = function.span;
                functions.push(function);
            } else {
                let (stmt_id, stmt_span) = self.parse_statement()?;
                end = stmt_span;
                if let Statement::Variable(variable) = self.ast.stmts.get(stmt_id) {
                    variables.push(*variable);
                }
                statements.push(stmt_id);
            }
        }

        let module = Module {
            span: start.to(end),
            name,
            variables,
            functions,
            statements,
        };
        Some(std::mem::take(&mut self.ast).finish(module))
    }

    fn parse_function(&mut self) -> Option<Function> {
        self.enter_recursion()?;
        let start = self.current_span();
        self.stream.expect_text("fun", self.source, self.diagnostics)?;
        let name = self.stream.expect(TokenType::Identifier, self.source, self.diagnostics)?.span;
        self.stream.expect(TokenType::LeftParenthesis, self.source, self.diagnostics)?;

        let mut parameters = Vec::new();
        if !self.stream.match_type(TokenType::RightParenthesis, false) {
            loop {
                parameters.push(self.parse_parameter()?);
                if !self.stream.match_type(TokenType::Comma, true) {
                    break;
                }
            }
        }
        self.stream.expect(TokenType::RightParenthesis, self.source, self.diagnostics)?;

        let return_type = if self.stream.match_type(TokenType::Colon, true) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let mut body = Vec::new();
        while self.stream.has_more() && !self.stream.match_text(self.source, "end", false) {
            let (stmt_id, _) = self.parse_statement()?;
            body.push(stmt_id);
        }
        let end_token = self.stream.expect_text("end", self.source, self.diagnostics)?;
        self.exit_recursion();

        Some(Function {
            span: start.to(end_token.span),
            name,
            parameters,
            return_type,
            body,
        })
    }

    fn parse_parameter(&mut self) -> Option<Parameter> {
        let name_token = self.stream.expect(TokenType::Identifier, self.source, self.diagnostics)?;
        self.stream.expect(TokenType::Colon, self.source, self.diagnostics)?;
        let type_spec = self.parse_type()?;
        Some(Parameter {
            span: name_token.span.to(type_spec.span),
            name: name_token.span,
            type_spec,
        })
    }

    fn parse_type(&mut self) -> Option<TypeSpecifier> {
        let token = self.stream.expect(TokenType::Identifier, self.source, self.diagnostics)?;
        Some(TypeSpecifier {
            span: token.span,
            name: token.span,
        })
    }

    fn parse_statement(&mut self) -> Option<(StmtId, Span)> {
        if self.stream.match_text(self.source, "var", false) {
            return self.parse_variable_statement();
        }
        if self.stream.match_text(self.source, "while", false) {
            return self.parse_while();
        }
        if self.stream.match_text(self.source, "if", false) {
            return self.parse_if();
        }
        if self.stream.match_text(self.source, "return", false) {
            return self.parse_return();
        }
        self.parse_expression_statement()
    }

    fn parse_variable_statement(&mut self) -> Option<(StmtId, Span)> {
        let start = self.current_span();
        self.stream.expect_text("var", self.source, self.diagnostics)?;
        let name_token = self.stream.expect(TokenType::Identifier, self.source, self.diagnostics)?;
        let mut end = name_token.span;

        let type_spec = if self.stream.match_type(TokenType::Colon, true) {
            let type_spec = self.parse_type()?;
            end = type_spec.span;
            Some(type_spec)
        } else {
            None
        };

        let initializer = if self.stream.match_type(TokenType::Assignment, true) {
            let expr_id = self.parse_expression()?;
            end = self.ast.exprs.get(expr_id).span();
            Some(expr_id)
        } else {
            None
        };

        let span = start.to(end);
        let variable = Variable {
            span,
            name: name_token.span,
            type_spec,
            initializer,
        };
        let id = self.ast.alloc_stmt(Statement::Variable(variable));
        Some((id, span))
    }

    fn parse_while(&mut self) -> Option<(StmtId, Span)> {
        self.enter_recursion()?;
        let start = self.current_span();
        self.stream.expect_text("while", self.source, self.diagnostics)?;
        let condition = self.parse_expression()?;

        let mut body = Vec::new();
        while self.stream.has_more() && !self.stream.match_text(self.source, "end", false) {
            let (stmt_id, _) = self.parse_statement()?;
            body.push(stmt_id);
        }
        let end_token = self.stream.expect_text("end", self.source, self.diagnostics)?;
        self.exit_recursion();

        let span = start.to(end_token.span);
        let id = self.ast.alloc_stmt(Statement::While { span, condition, body });
        Some((id, span))
    }

    fn parse_if(&mut self) -> Option<(StmtId, Span)> {
        self.enter_recursion()?;
        let start = self.current_span();
        self.stream.expect_text("if", self.source, self.diagnostics)?;
        let condition = self.parse_expression()?;

        let mut true_block = Vec::new();
        while self.stream.has_more()
            && !self.stream.match_text(self.source, "end", false)
            && !self.stream.match_text(self.source, "else", false)
        {
            let (stmt_id, _) = self.parse_statement()?;
            true_block.push(stmt_id);
        }

        let mut false_block = Vec::new();
        if self.stream.match_text(self.source, "else", true) {
            while self.stream.has_more() && !self.stream.match_text(self.source, "end", false) {
                let (stmt_id, _) = self.parse_statement()?;
                false_block.push(stmt_id);
            }
        }

        let end_token = self.stream.expect_text("end", self.source, self.diagnostics)?;
        self.exit_recursion();

        let span = start.to(end_token.span);
        let id = self.ast.alloc_stmt(Statement::If {
            span,
            condition,
            true_block,
            false_block,
        });
        Some((id, span))
    }

    fn parse_return(&mut self) -> Option<(StmtId, Span)> {
        let start = self.current_span();
        self.stream.expect_text("return", self.source, self.diagnostics)?;

        let mut end = start;
        let value = if self.at_statement_boundary() {
            None
        } else {
            let expr_id = self.parse_expression()?;
            end = self.ast.exprs.get(expr_id).span();
            Some(expr_id)
        };

        let span = start.to(end);
        let id = self.ast.alloc_stmt(Statement::Return { span, value });
        Some((id, span))
    }

    fn at_statement_boundary(&self) -> bool {
        match self.stream.peek() {
            None => true,
            Some(token) => {
                let text = self.source.text(token.span);
                text == "end" || text == "else"
            }
        }
    }

    fn parse_expression_statement(&mut self) -> Option<(StmtId, Span)> {
        let expr_id = self.parse_expression()?;
        let span = self.ast.exprs.get(expr_id).span();
        let id = self.ast.alloc_stmt(Statement::Expression { span, expr: expr_id });
        Some((id, span))
    }

    fn parse_expression(&mut self) -> Option<ExprId> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Option<ExprId> {
        self.enter_recursion()?;
        let condition = self.parse_binary(0)?;
        let result = if self.stream.match_type(TokenType::QuestionMark, true) {
            let true_value = self.parse_ternary()?;
            self.stream.expect(TokenType::Colon, self.source, self.diagnostics)?;
            let false_value = self.parse_ternary()?;
            let span = self
                .ast
                .exprs
                .get(condition)
                .span()
                .to(self.ast.exprs.get(false_value).span());
            Some(self.ast.alloc_expr(Expression::Ternary {
                span,
                condition,
                true_value,
                false_value,
            }))
        } else {
            Some(condition)
        };
        self.exit_recursion();
        result
    }

    fn parse_binary(&mut self, level: usize) -> Option<ExprId> {
        let Some(operators) = PRECEDENCE_LEVELS.get(level) else {
            return self.parse_unary();
        };
        self.enter_recursion()?;
        let mut left = self.parse_binary(level + 1)?;
        while let Some(token) = self.stream.peek() {
            if !operators.contains(&token.token_type) {
                break;
            }
            self.stream.consume();
            let right = self.parse_binary(level + 1)?;
            let span = self.ast.exprs.get(left).span().to(self.ast.exprs.get(right).span());
            left = self.ast.alloc_expr(Expression::Binary {
                span,
                op: token.span,
                op_type: token.token_type,
                left,
                right,
            });
        }
        self.exit_recursion();
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<ExprId> {
        self.enter_recursion()?;
        let result = self.parse_unary_inner();
        self.exit_recursion();
        result
    }

    fn parse_unary_inner(&mut self) -> Option<ExprId> {
        if let Some(token) = self.stream.peek() {
            if matches!(token.token_type, TokenType::Not | TokenType::Plus | TokenType::Minus) {
                self.stream.consume();
                let operand = self.parse_unary()?;
                let span = token.span.to(self.ast.exprs.get(operand).span());
                return Some(self.ast.alloc_expr(Expression::Unary {
                    span,
                    op: token.span,
                    op_type: token.token_type,
                    operand,
                }));
            }
            if token.token_type == TokenType::LeftParenthesis {
                self.stream.consume();
                let inner = self.parse_expression()?;
                self.stream.expect(TokenType::RightParenthesis, self.source, self.diagnostics)?;
                return Some(inner);
            }
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Option<ExprId> {
        let Some(token) = self.stream.peek() else {
            let span = self.stream.eof_span(self.source);
            self.diagnostics
                .push(span, "Expected an expression, but reached the end of the source.");
            return None;
        };

        match token.token_type {
            TokenType::BooleanLiteral
            | TokenType::DoubleLiteral
            | TokenType::FloatLiteral
            | TokenType::LongLiteral
            | TokenType::IntegerLiteral
            | TokenType::ShortLiteral
            | TokenType::ByteLiteral
            | TokenType::CharacterLiteral
            | TokenType::StringLiteral
            | TokenType::NothingLiteral => {
                self.stream.consume();
                Some(self.ast.alloc_expr(Expression::Literal {
                    span: token.span,
                    literal_type: token.token_type,
                    value: token.span,
                }))
            }
            TokenType::Identifier => {
                self.stream.consume();
                if self.stream.match_type(TokenType::LeftParenthesis, true) {
                    let mut arguments = Vec::new();
                    if !self.stream.match_type(TokenType::RightParenthesis, false) {
                        loop {
                            arguments.push(self.parse_expression()?);
                            if !self.stream.match_type(TokenType::Comma, true) {
                                break;
                            }
                        }
                    }
                    let close = self.stream.expect(TokenType::RightParenthesis, self.source, self.diagnostics)?;
                    let target = VariableAccess {
                        span: token.span,
                        name: token.span,
                    };
                    Some(self.ast.alloc_expr(Expression::FunctionCall {
                        span: token.span.to(close.span),
                        target,
                        arguments,
                    }))
                } else {
                    Some(self.ast.alloc_expr(Expression::VariableAccess(VariableAccess {
                        span: token.span,
                        name: token.span,
                    })))
                }
            }
            _ => {
                self.stream.consume();
                self.diagnostics.push(
                    token.span,
                    format!("Expected an expression, but got '{}'.", self.source.text(token.span)),
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qak_core::Source;

    fn parse_ok(src: &str) -> Ast {
        let source = Source::new("<test>", src.as_bytes().to_vec());
        let mut diagnostics = DiagnosticSink::new();
        let ast = parse(&source, ParseConfig::default(), &mut diagnostics);
        assert!(!diagnostics.has_errors(), "{:?}", diagnostics.as_slice());
        ast.unwrap()
    }

    fn parse_err(src: &str) -> DiagnosticSink {
        let source = Source::new("<test>", src.as_bytes().to_vec());
        let mut diagnostics = DiagnosticSink::new();
        let ast = parse(&source, ParseConfig::default(), &mut diagnostics);
        assert!(ast.is_none());
        diagnostics
    }

    #[test]
    fn s2_empty_whitespace_module_reports_one_diagnostic() {
        let diagnostics = parse_err("  \n\t\n");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.as_slice()[0].message.contains("module"));
    }

    #[test]
    fn s3_bare_number_reports_missing_module() {
        let diagnostics = parse_err("123");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn s4_minimal_module_has_empty_children() {
        let source = Source::new("<test>", b"module m".to_vec());
        let mut diagnostics = DiagnosticSink::new();
        let ast = parse(&source, ParseConfig::default(), &mut diagnostics).unwrap();
        assert_eq!(source.text(ast.module.name), "m");
        assert!(ast.module.variables.is_empty());
        assert!(ast.module.functions.is_empty());
        assert!(ast.module.statements.is_empty());
    }

    #[test]
    fn s5_variable_with_binary_initializer() {
        let source = Source::new("<test>", b"module m var x: int = 1 + 2".to_vec());
        let mut diagnostics = DiagnosticSink::new();
        let ast = parse(&source, ParseConfig::default(), &mut diagnostics).unwrap();
        assert_eq!(ast.module.variables.len(), 1);
        let variable = &ast.module.variables[0];
        let type_spec = variable.type_spec.unwrap();
        assert_eq!(source.text(type_spec.name), "int");
        let Expression::Binary { op_type, left, right, .. } = ast.expr(variable.initializer.unwrap()) else {
            panic!("expected binary operation");
        };
        assert_eq!(*op_type, TokenType::Plus);
        let Expression::Literal { value, .. } = ast.expr(*left) else {
            panic!("expected literal");
        };
        assert_eq!(source.text(*value), "1");
        let Expression::Literal { value, .. } = ast.expr(*right) else {
            panic!("expected literal");
        };
        assert_eq!(source.text(*value), "2");
    }

    #[test]
    fn s6_operator_precedence_binds_multiplication_tighter_than_addition() {
        let source = Source::new("<test>", b"module m 1 + 2 * 3".to_vec());
        let mut diagnostics = DiagnosticSink::new();
        let ast = parse(&source, ParseConfig::default(), &mut diagnostics).unwrap();
        assert_eq!(ast.module.statements.len(), 1);
        let Statement::Expression { expr, .. } = ast.stmt(ast.module.statements[0]) else {
            panic!("expected expression statement");
        };
        let Expression::Binary { op_type, right, .. } = ast.expr(*expr) else {
            panic!("expected binary operation");
        };
        assert_eq!(*op_type, TokenType::Plus);
        assert!(matches!(
            ast.expr(*right),
            Expression::Binary {
                op_type: TokenType::Asterisk,
                ..
            }
        ));
    }

    #[test]
    fn s7_unterminated_string_reports_diagnostic() {
        let diagnostics = parse_err("module m var s = \"abc");
        assert!(diagnostics.as_slice().iter().any(|d| d.message.contains("not closed")));
    }

    #[test]
    fn while_loop_parses_condition_and_body() {
        let ast = parse_ok("module m while x var y = 1 end");
        assert_eq!(ast.module.statements.len(), 1);
        assert!(matches!(ast.stmt(ast.module.statements[0]), Statement::While { .. }));
    }

    #[test]
    fn if_else_parses_both_blocks() {
        let source = Source::new("<test>", b"module m if true var a = 1 else var b = 2 end".to_vec());
        let mut diagnostics = DiagnosticSink::new();
        let ast = parse(&source, ParseConfig::default(), &mut diagnostics).unwrap();
        let Statement::If {
            true_block, false_block, ..
        } = ast.stmt(ast.module.statements[0])
        else {
            panic!("expected if statement");
        };
        assert_eq!(true_block.len(), 1);
        assert_eq!(false_block.len(), 1);
    }

    #[test]
    fn bare_return_at_end_of_block_has_no_value() {
        let ast = parse_ok("module m fun f() return end");
        let function = &ast.module.functions[0];
        let Statement::Return { value, .. } = ast.stmt(function.body[0]) else {
            panic!("expected return statement");
        };
        assert!(value.is_none());
    }

    #[test]
    fn return_with_expression_captures_value() {
        let ast = parse_ok("module m fun f() return 1 end");
        let function = &ast.module.functions[0];
        let Statement::Return { value, .. } = ast.stmt(function.body[0]) else {
            panic!("expected return statement");
        };
        assert!(value.is_some());
    }

    #[test]
    fn function_call_parses_target_and_arguments() {
        let ast = parse_ok("module m foo(1, 2)");
        let Statement::Expression { expr, .. } = ast.stmt(ast.module.statements[0]) else {
            panic!("expected expression statement");
        };
        let Expression::FunctionCall { target, arguments, .. } = ast.expr(*expr) else {
            panic!("expected function call");
        };
        assert!(ast.expr_count() > 0);
        assert_eq!(arguments.len(), 2);
        assert_eq!(target.name, target.span);
    }

    #[test]
    fn ternary_is_right_associative_and_looser_than_binary() {
        let ast = parse_ok("module m true ? 1 : false ? 2 : 3");
        let Statement::Expression { expr, .. } = ast.stmt(ast.module.statements[0]) else {
            panic!("expected expression statement");
        };
        assert!(matches!(ast.expr(*expr), Expression::Ternary { .. }));
    }

    #[test]
    fn unary_prefixes_nest_inside_out() {
        let ast = parse_ok("module m !!true");
        let Statement::Expression { expr, .. } = ast.stmt(ast.module.statements[0]) else {
            panic!("expected expression statement");
        };
        let Expression::Unary { operand, .. } = ast.expr(*expr) else {
            panic!("expected unary operation");
        };
        assert!(matches!(ast.expr(*operand), Expression::Unary { .. }));
    }

    #[test]
    fn parenthesised_expression_resets_precedence() {
        let ast = parse_ok("module m (1 + 2) * 3");
        let Statement::Expression { expr, .. } = ast.stmt(ast.module.statements[0]) else {
            panic!("expected expression statement");
        };
        let Expression::Binary {
            op_type: TokenType::Asterisk,
            left,
            ..
        } = ast.expr(*expr)
        else {
            panic!("expected multiplication at the top");
        };
        assert!(matches!(
            ast.expr(*left),
            Expression::Binary {
                op_type: TokenType::Plus,
                ..
            }
        ));
    }

    #[test]
    fn span_containment_holds_for_variable_initializer() {
        let source = Source::new("<test>", b"module m var x = 1 + 2".to_vec());
        let mut diagnostics = DiagnosticSink::new();
        let ast = parse(&source, ParseConfig::default(), &mut diagnostics).unwrap();
        let variable = &ast.module.variables[0];
        let initializer = ast.expr(variable.initializer.unwrap());
        assert!(initializer.span().is_contained_in(variable.span));
    }

    #[test]
    fn pathological_nesting_hits_recursion_limit_instead_of_overflowing() {
        let mut src = "module m ".to_string();
        for _ in 0..1000 {
            src.push('(');
        }
        src.push('1');
        for _ in 0..1000 {
            src.push(')');
        }
        let source = Source::new("<test>", src.as_bytes().to_vec());
        let mut diagnostics = DiagnosticSink::new();
        let ast = parse(&source, ParseConfig::default(), &mut diagnostics);
        assert!(ast.is_none());
        assert!(diagnostics.has_errors());
    }
}
