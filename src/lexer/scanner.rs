use super::token::{Token, TokenKind};
use crate::error::{Result, TheoryLispError};

/// Scanner for Theory Lisp source text.
pub struct Scanner {
    /// Source code as a character vector.
    source: Vec<char>,
    /// Accumulated tokens.
    tokens: Vec<Token>,
    /// Start position of the token currently being scanned.
    start: usize,
    /// Current position in source.
    current: usize,
    /// Current line number (1-indexed).
    line: usize,
    /// Current column number (1-indexed).
    column: usize,
}

impl Scanner {
    /// Creates a new scanner over the given source text.
    pub fn new(source: &str) -> Self {
        Scanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
        }
    }

    /// Scans the entire source and returns the resulting token stream,
    /// terminated by a trailing [`TokenKind::Eof`].
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, String::new(), self.line, self.column));

        Ok(self.tokens.clone())
    }

    fn scan_token(&mut self) -> Result<()> {
        let c = self.advance();

        match c {
            ' ' | '\r' | '\t' => {}
            '\n' => {
                self.line += 1;
                self.column = 1;
            }

            ';' => self.skip_line_comment(),

            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '[' => self.add_token(TokenKind::LeftBracket),
            ']' => self.add_token(TokenKind::RightBracket),
            '{' => self.add_token(TokenKind::LeftCurly),
            '}' => self.add_token(TokenKind::RightCurly),

            '%' => self.add_token(TokenKind::Percent),
            '\\' => self.add_token(TokenKind::Backslash),
            ':' => self.add_token(TokenKind::Colon),

            '-' => {
                if self.match_char('>') {
                    self.add_token(TokenKind::MoveRight);
                } else if self.peek().is_ascii_digit() {
                    self.scan_number()?;
                } else {
                    self.scan_identifier_or_keyword()?;
                }
            }
            '<' => {
                if self.match_char('-') {
                    self.add_token(TokenKind::MoveLeft);
                } else {
                    self.scan_identifier_or_keyword()?;
                }
            }
            '.' => {
                if self.peek().is_ascii_digit() {
                    self.scan_number()?;
                } else {
                    self.add_token(TokenKind::Nop);
                }
            }

            '#' => self.scan_hash_literal()?,

            '"' => self.scan_string()?,

            c if c.is_ascii_digit() => self.scan_number()?,

            c if Self::starts_identifier(c) => self.scan_identifier_or_keyword()?,

            _ => {
                return Err(TheoryLispError::syntax(
                    self.line,
                    self.column,
                    format!("unexpected character '{c}'"),
                ));
            }
        }

        Ok(())
    }

    fn starts_identifier(c: char) -> bool {
        c.is_alphabetic()
            || matches!(
                c,
                '_' | '?' | '!' | '$' | '+' | '*' | '/' | '=' | '<' | '>' | '&'
            )
    }

    fn continues_identifier(c: char) -> bool {
        c.is_alphanumeric() || Self::starts_identifier(c) || c == '-'
    }

    fn skip_line_comment(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    fn scan_hash_literal(&mut self) -> Result<()> {
        match self.peek() {
            't' => {
                self.advance();
                self.add_token(TokenKind::True);
                Ok(())
            }
            'f' => {
                self.advance();
                self.add_token(TokenKind::False);
                Ok(())
            }
            other => Err(TheoryLispError::syntax(
                self.line,
                self.column,
                format!("unexpected character '{other}' after '#'"),
            )),
        }
    }

    fn scan_string(&mut self) -> Result<()> {
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != '"' {
            let c = self.advance();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            }
            value.push(c);
        }

        if self.is_at_end() {
            return Err(TheoryLispError::syntax(
                self.line,
                self.column,
                "unterminated string",
            ));
        }

        self.advance();
        self.add_token(TokenKind::String(value));
        Ok(())
    }

    fn scan_number(&mut self) -> Result<()> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let mut is_real = false;
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            is_real = true;
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        if matches!(self.peek(), 'e' | 'E')
            && (self.peek_next().is_ascii_digit()
                || (matches!(self.peek_next(), '+' | '-')))
        {
            is_real = true;
            self.advance();
            if matches!(self.peek(), '+' | '-') {
                self.advance();
            }
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();

        if is_real {
            let value: f64 = text.parse().map_err(|_| {
                TheoryLispError::syntax(self.line, self.column, format!("invalid real: {text}"))
            })?;
            self.add_token(TokenKind::Real(value));
        } else {
            let value: i64 = text.parse().map_err(|_| {
                TheoryLispError::syntax(self.line, self.column, format!("invalid integer: {text}"))
            })?;
            self.add_token(TokenKind::Integer(value));
        }

        Ok(())
    }

    fn scan_identifier_or_keyword(&mut self) -> Result<()> {
        while Self::continues_identifier(self.peek()) {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();

        let kind = match text.as_str() {
            "let" => TokenKind::Let,
            "lambda" => TokenKind::Lambda,
            "if" => TokenKind::If,
            "cond" => TokenKind::Cond,
            "define" => TokenKind::Define,
            "set!" => TokenKind::Set,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "automaton" => TokenKind::Automaton,
            "null" => TokenKind::Null,
            "self" => TokenKind::SelfState,
            "next" => TokenKind::NextState,
            "halt" => TokenKind::HaltState,
            "accept" => TokenKind::AcceptState,
            "reject" => TokenKind::RejectState,
            _ => TokenKind::Identifier(text),
        };

        self.add_token(kind);
        Ok(())
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        self.column += 1;
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            '\0'
        } else {
            self.source[self.current + 1]
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            false
        } else {
            self.current += 1;
            self.column += 1;
            true
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(kind, lexeme, self.line, self.column));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_simple_call() {
        let mut scanner = Scanner::new("(+ 1 2)");
        let tokens = scanner.scan_tokens().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::LeftParen);
        assert_eq!(tokens[1].kind, TokenKind::Identifier("+".to_string()));
        assert_eq!(tokens[2].kind, TokenKind::Integer(1));
        assert_eq!(tokens[3].kind, TokenKind::Integer(2));
        assert_eq!(tokens[4].kind, TokenKind::RightParen);
        assert_eq!(tokens[5].kind, TokenKind::Eof);
    }

    #[test]
    fn scans_pn_block_positional_refs() {
        let mut scanner = Scanner::new("{+ $1 $2}");
        let tokens = scanner.scan_tokens().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::LeftCurly);
        assert_eq!(tokens[2].kind, TokenKind::Identifier("$1".to_string()));
        assert_eq!(tokens[3].kind, TokenKind::Identifier("$2".to_string()));
        assert_eq!(tokens[4].kind, TokenKind::RightCurly);
    }

    #[test]
    fn scans_head_operations() {
        let mut scanner = Scanner::new("-> <- .");
        let tokens = scanner.scan_tokens().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::MoveRight);
        assert_eq!(tokens[1].kind, TokenKind::MoveLeft);
        assert_eq!(tokens[2].kind, TokenKind::Nop);
    }

    #[test]
    fn scans_booleans_and_null() {
        let mut scanner = Scanner::new("#t #f null");
        let tokens = scanner.scan_tokens().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::True);
        assert_eq!(tokens[1].kind, TokenKind::False);
        assert_eq!(tokens[2].kind, TokenKind::Null);
    }

    #[test]
    fn scans_real_and_rational_looking_numbers() {
        let mut scanner = Scanner::new("3.5 -2 7");
        let tokens = scanner.scan_tokens().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Real(3.5));
        assert_eq!(tokens[1].kind, TokenKind::Integer(-2));
        assert_eq!(tokens[2].kind, TokenKind::Integer(7));
    }

    #[test]
    fn skips_comments() {
        let mut scanner = Scanner::new("; comment\n(+ 1 2)");
        let tokens = scanner.scan_tokens().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::LeftParen);
    }

    #[test]
    fn rejects_unterminated_string() {
        let mut scanner = Scanner::new("\"abc");
        assert!(scanner.scan_tokens().is_err());
    }
}
