//! Tokenizer for trigger condition expressions

use crate::error::ParseError;

/// Token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Path pattern, possibly containing `*` / `?` wildcards.
    /// Quoted patterns reach the parser unchanged and are never
    /// interpreted as keywords.
    Pattern(String),

    // Operators
    And,
    Or,
    Not,

    // Delimiters
    LParen,
    RParen,
    /// Separates a pattern from its prescale factor
    Slash,

    Eof,
}

/// Token with position information
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}

/// Characters that terminate an unquoted pattern token
fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '(' | ')' | '/' | '&' | '|' | '!' | '"' | '\'')
}

/// Lexer for condition expressions
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get next token
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();

        let line = self.line;
        let column = self.column;

        let Some(ch) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, line, column));
        };

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '/' => TokenKind::Slash,
            '!' => TokenKind::Not,
            '&' => {
                if self.match_char('&') {
                    TokenKind::And
                } else {
                    return Err(ParseError::syntax("expected '&&'", line, column));
                }
            }
            '|' => {
                if self.match_char('|') {
                    TokenKind::Or
                } else {
                    return Err(ParseError::syntax("expected '||'", line, column));
                }
            }
            '"' | '\'' => self.quoted_pattern(ch, line, column)?,
            _ => self.word(ch),
        };

        Ok(Token::new(kind, line, column))
    }

    fn advance(&mut self) -> Option<char> {
        let result = self.chars.next();
        if let Some(ch) = result {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        result
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Quoted pattern: the quotes escape reserved keywords, so a path
    /// literally named `OR` can still be referenced as `"OR"`
    fn quoted_pattern(
        &mut self,
        quote: char,
        line: usize,
        column: usize,
    ) -> Result<TokenKind, ParseError> {
        let mut value = String::new();
        loop {
            match self.advance() {
                Some(ch) if ch == quote => break,
                Some(ch) => value.push(ch),
                None => {
                    return Err(ParseError::syntax(
                        "unterminated quoted pattern",
                        line,
                        column,
                    ));
                }
            }
        }
        Ok(TokenKind::Pattern(value))
    }

    /// Unquoted word: either a reserved keyword or a path pattern
    fn word(&mut self, first: char) -> TokenKind {
        let mut value = String::from(first);
        while let Some(ch) = self.peek_char() {
            if is_delimiter(ch) {
                break;
            }
            value.push(ch);
            self.advance();
        }

        // keywords are matched as whole tokens, case-sensitive
        match value.as_str() {
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            _ => TokenKind::Pattern(value),
        }
    }
}
