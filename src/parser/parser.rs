use std::rc::Rc;

use crate::automaton::{AutomatonState, HeadOp, NextStateName, Transition};
use crate::error::{Result, TheoryLispError};
use crate::lexer::{Token, TokenKind};
use crate::parser::expr::{Arg, Expr, ExprKind};
use crate::runtime::Value;

/// Recursive-descent parser over a token stream, producing
/// [`Expr`] nodes directly rather than an intermediate AST.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Parser {
        Parser { tokens, current: 0 }
    }

    /// Parses every top-level expression up to `Eof`.
    pub fn parse_program(&mut self) -> Result<Vec<Rc<Expr>>> {
        let mut program = Vec::new();
        while !self.is_at_end() {
            program.push(self.parse_expr()?);
        }
        Ok(program)
    }

    /// Parses exactly one expression starting at the current position.
    /// Used by the `parse` macro-time builtin.
    pub fn parse_one(&mut self) -> Result<Rc<Expr>> {
        self.parse_expr()
    }

    /// How many tokens [`parse_one`] consumed. Used by the caller to
    /// advance a shared token stream past what was parsed.
    pub fn consumed(&self) -> usize {
        self.current
    }

    fn parse_expr(&mut self) -> Result<Rc<Expr>> {
        let (line, column) = self.position();
        match &self.peek().kind {
            TokenKind::Integer(n) => {
                let n = *n;
                self.advance();
                Ok(Expr::new(line, column, ExprKind::DataLiteral(Value::Integer(n))))
            }
            TokenKind::Real(r) => {
                let r = *r;
                self.advance();
                Ok(Expr::new(line, column, ExprKind::DataLiteral(Value::Real(r))))
            }
            TokenKind::String(s) => {
                let s = s.clone();
                self.advance();
                Ok(Expr::new(line, column, ExprKind::DataLiteral(Value::Str(s))))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::new(line, column, ExprKind::DataLiteral(Value::Boolean(true))))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::new(line, column, ExprKind::DataLiteral(Value::Boolean(false))))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::new(line, column, ExprKind::DataLiteral(Value::Null)))
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(Expr::new(line, column, ExprKind::Identifier(name)))
            }
            TokenKind::Percent => {
                self.advance();
                let inner = self.parse_expr()?;
                Ok(Expr::new(line, column, ExprKind::Expanded(inner)))
            }
            TokenKind::LeftCurly => self.parse_pn_block(),
            TokenKind::LeftParen => self.parse_paren_form(),
            other => Err(self.syntax_error(format!("unexpected token {}", describe(other)))),
        }
    }

    fn parse_paren_form(&mut self) -> Result<Rc<Expr>> {
        let (line, column) = self.position();
        self.consume(&TokenKind::LeftParen, "(")?;
        let kind = match &self.peek().kind {
            TokenKind::Let => self.parse_let()?,
            TokenKind::Lambda => self.parse_lambda()?,
            TokenKind::If => self.parse_if()?,
            TokenKind::Cond => self.parse_cond()?,
            TokenKind::Define => self.parse_define()?,
            TokenKind::Set => self.parse_set()?,
            TokenKind::Try => self.parse_try()?,
            TokenKind::Automaton => self.parse_automaton()?,
            _ => {
                let proc = self.parse_expr()?;
                let mut args = Vec::new();
                while !self.check(&TokenKind::RightParen) {
                    args.push(self.parse_arg()?);
                }
                ExprKind::Evaluation { proc, args }
            }
        };
        self.consume(&TokenKind::RightParen, ")")?;
        Ok(Expr::new(line, column, kind))
    }

    fn parse_arg(&mut self) -> Result<Arg> {
        if self.check(&TokenKind::Percent) {
            self.advance();
            let expr = self.parse_expr()?;
            Ok(Arg { expr, expanded: true })
        } else {
            Ok(Arg { expr: self.parse_expr()?, expanded: false })
        }
    }

    fn parse_let(&mut self) -> Result<ExprKind> {
        self.advance();
        self.consume(&TokenKind::LeftParen, "(")?;
        let mut bindings = Vec::new();
        while !self.check(&TokenKind::RightParen) {
            self.consume(&TokenKind::LeftParen, "(")?;
            let name = self.consume_identifier()?;
            let value = self.parse_expr()?;
            self.consume(&TokenKind::RightParen, ")")?;
            bindings.push((name, value));
        }
        self.consume(&TokenKind::RightParen, ")")?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RightParen) {
            body.push(self.parse_expr()?);
        }
        Ok(ExprKind::Let { bindings, body })
    }

    fn parse_lambda(&mut self) -> Result<ExprKind> {
        self.advance();
        let explicit_arity = self.parse_optional_backslash_arity()?;
        let captures = self.parse_optional_captures()?;
        let (params, variadic) = self.parse_params()?;
        let body = self.parse_expr()?;
        let pn_arity = explicit_arity.unwrap_or(params.len());
        Ok(ExprKind::Lambda { params, variadic, pn_arity, captures, body })
    }

    fn parse_if(&mut self) -> Result<ExprKind> {
        self.advance();
        let cond = self.parse_expr()?;
        let then_branch = self.parse_expr()?;
        let else_branch = self.parse_expr()?;
        Ok(ExprKind::If { cond, then_branch, else_branch })
    }

    fn parse_cond(&mut self) -> Result<ExprKind> {
        self.advance();
        let mut clauses = Vec::new();
        while !self.check(&TokenKind::RightParen) {
            self.consume(&TokenKind::LeftParen, "(")?;
            let test = self.parse_expr()?;
            let result = self.parse_expr()?;
            self.consume(&TokenKind::RightParen, ")")?;
            clauses.push((test, result));
        }
        Ok(ExprKind::Cond(clauses))
    }

    fn parse_define(&mut self) -> Result<ExprKind> {
        self.advance();
        let name = self.consume_identifier()?;
        let value = self.parse_expr()?;
        Ok(ExprKind::Definition { name, value })
    }

    fn parse_set(&mut self) -> Result<ExprKind> {
        self.advance();
        let name = self.consume_identifier()?;
        let value = self.parse_expr()?;
        Ok(ExprKind::Set { name, value })
    }

    fn parse_try(&mut self) -> Result<ExprKind> {
        self.advance();
        let body = self.parse_expr()?;
        self.consume(&TokenKind::LeftParen, "(")?;
        self.consume(&TokenKind::Catch, "catch")?;
        self.consume(&TokenKind::LeftParen, "(")?;
        let exception_name = self.consume_identifier()?;
        self.consume(&TokenKind::RightParen, ")")?;
        let handler = self.parse_expr()?;
        self.consume(&TokenKind::RightParen, ")")?;
        Ok(ExprKind::TryCatch { body, exception_name, handler })
    }

    fn parse_automaton(&mut self) -> Result<ExprKind> {
        self.advance();
        let number_of_tapes = self
            .parse_optional_backslash_arity()?
            .ok_or_else(|| self.syntax_error("automaton requires \\N tape count".to_string()))?;
        let captures = self.parse_optional_captures()?;
        let mut states = Vec::new();
        while !self.check(&TokenKind::RightParen) {
            states.push(self.parse_automaton_state(number_of_tapes)?);
        }
        Ok(ExprKind::Automaton {
            number_of_tapes,
            captures,
            states,
            compiled: std::cell::RefCell::new(None),
        })
    }

    fn parse_automaton_state(&mut self, number_of_tapes: usize) -> Result<AutomatonState> {
        self.consume(&TokenKind::LeftParen, "(")?;
        let name = self.consume_identifier()?;
        let base_machine = if self.check(&TokenKind::Colon) {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.consume(&TokenKind::LeftParen, "(")?;
        let mut transitions = Vec::new();
        while !self.check(&TokenKind::RightParen) {
            transitions.push(self.parse_transition(number_of_tapes)?);
        }
        self.consume(&TokenKind::RightParen, ")")?;
        let state_output = if !self.check(&TokenKind::RightParen) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.consume(&TokenKind::RightParen, ")")?;
        Ok(AutomatonState { name, base_machine, state_output, transitions })
    }

    fn parse_transition(&mut self, number_of_tapes: usize) -> Result<Transition> {
        self.consume(&TokenKind::LeftParen, "(")?;
        let condition = self.parse_expr()?;
        let mut head_ops = Vec::with_capacity(number_of_tapes);
        for _ in 0..number_of_tapes {
            head_ops.push(self.parse_head_op()?);
        }
        let next_state = self.parse_next_state_name()?;
        let output = if !self.check(&TokenKind::RightParen) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.consume(&TokenKind::RightParen, ")")?;
        Ok(Transition { condition, head_ops, output, next_state })
    }

    fn parse_head_op(&mut self) -> Result<HeadOp> {
        match &self.peek().kind {
            TokenKind::MoveRight => {
                self.advance();
                Ok(HeadOp::MoveRight)
            }
            TokenKind::MoveLeft => {
                self.advance();
                Ok(HeadOp::MoveLeft)
            }
            TokenKind::Nop => {
                self.advance();
                Ok(HeadOp::Nop)
            }
            _ => Ok(HeadOp::Write(self.parse_expr()?)),
        }
    }

    fn parse_next_state_name(&mut self) -> Result<NextStateName> {
        match &self.peek().kind {
            TokenKind::SelfState => {
                self.advance();
                Ok(NextStateName::SelfState)
            }
            TokenKind::NextState => {
                self.advance();
                Ok(NextStateName::Next)
            }
            TokenKind::HaltState => {
                self.advance();
                Ok(NextStateName::Halt)
            }
            TokenKind::AcceptState => {
                self.advance();
                Ok(NextStateName::Accept)
            }
            TokenKind::RejectState => {
                self.advance();
                Ok(NextStateName::Reject)
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(NextStateName::Named(name))
            }
            other => Err(self.syntax_error(format!("expected a next-state name, found {}", describe(other)))),
        }
    }

    fn parse_pn_block(&mut self) -> Result<Rc<Expr>> {
        let (line, column) = self.position();
        self.consume(&TokenKind::LeftCurly, "{")?;
        let captures = self.parse_optional_captures()?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RightCurly) {
            body.push(self.parse_expr()?);
        }
        self.consume(&TokenKind::RightCurly, "}")?;
        Ok(Expr::new(line, column, ExprKind::PnBlock { captures, body }))
    }

    fn parse_optional_backslash_arity(&mut self) -> Result<Option<usize>> {
        if self.check(&TokenKind::Backslash) {
            self.advance();
            match &self.peek().kind {
                TokenKind::Integer(n) if *n >= 0 => {
                    let n = *n as usize;
                    self.advance();
                    Ok(Some(n))
                }
                other => Err(self.syntax_error(format!(
                    "expected a non-negative integer after '\\', found {}",
                    describe(other)
                ))),
            }
        } else {
            Ok(None)
        }
    }

    fn parse_optional_captures(&mut self) -> Result<Vec<String>> {
        if !self.check(&TokenKind::LeftBracket) {
            return Ok(Vec::new());
        }
        self.advance();
        let mut names = Vec::new();
        while !self.check(&TokenKind::RightBracket) {
            names.push(self.consume_identifier()?);
        }
        self.consume(&TokenKind::RightBracket, "]")?;
        Ok(names)
    }

    /// Parses a parameter list: zero or more identifiers, followed
    /// optionally by one or more `.` (`Nop`) tokens marking the remainder
    /// as variadic (covers both `(a b . rest)` and the `(...)` convention).
    fn parse_params(&mut self) -> Result<(Vec<String>, bool)> {
        self.consume(&TokenKind::LeftParen, "(")?;
        let mut params = Vec::new();
        let mut variadic = false;
        loop {
            match &self.peek().kind {
                TokenKind::Identifier(name) => {
                    let name = name.clone();
                    self.advance();
                    params.push(name);
                }
                TokenKind::Nop => {
                    variadic = true;
                    while self.check(&TokenKind::Nop) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
        self.consume(&TokenKind::RightParen, ")")?;
        Ok((params, variadic))
    }

    fn consume_identifier(&mut self) -> Result<String> {
        match &self.peek().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(self.syntax_error(format!("expected an identifier, found {}", describe(other)))),
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn position(&self) -> (usize, usize) {
        (self.peek().line, self.peek().column)
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.tokens[self.current - 1].clone()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn consume(&mut self, kind: &TokenKind, what: &str) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.syntax_error(format!("expected '{}', found {}", what, describe(&self.peek().kind))))
        }
    }

    fn syntax_error(&self, message: String) -> TheoryLispError {
        let token = self.peek();
        TheoryLispError::syntax(token.line, token.column, message)
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Eof => "end of file".to_string(),
        TokenKind::Identifier(name) => format!("identifier '{name}'"),
        other => format!("{other:?}"),
    }
}
