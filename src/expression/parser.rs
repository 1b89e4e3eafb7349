//! Recursive-descent parser for trigger conditions
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr      := or_expr
//! or_expr   := and_expr ( OR and_expr )*
//! and_expr  := not_expr ( AND not_expr )*
//! not_expr  := NOT not_expr | atom
//! atom      := '(' or_expr ')' | path_term
//! path_term := PATTERN ( '/' FACTOR )?
//! ```
//!
//! Both operator spellings are accepted (`AND`/`&&`, `OR`/`||`,
//! `NOT`/`!`); binary operators are left-associative.

use crate::error::ParseError;
use crate::expression::lexer::{Lexer, Token, TokenKind};
use crate::expression::tree::{Expression, PathLeaf};

/// Parse a condition string into an [`Expression`] tree.
pub fn parse(text: &str) -> Result<Expression, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyExpression);
    }
    let mut parser = Parser::new(Lexer::new(text))?;
    let expr = parser.parse_or()?;
    parser.expect_eof()?;
    Ok(expr)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    fn new(mut lexer: Lexer<'a>) -> Result<Self, ParseError> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::syntax(message, self.current.line, self.current.column)
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        if self.current.kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.error(format!("unexpected trailing {:?}", self.current.kind)))
        }
    }

    fn parse_or(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_and()?;
        while self.current.kind == TokenKind::Or {
            self.advance()?;
            let right = self.parse_and()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_not()?;
        while self.current.kind == TokenKind::And {
            self.advance()?;
            let right = self.parse_not()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expression, ParseError> {
        if self.current.kind == TokenKind::Not {
            self.advance()?;
            let inner = self.parse_not()?;
            return Ok(Expression::Not(Box::new(inner)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expression, ParseError> {
        match self.current.kind.clone() {
            TokenKind::LParen => {
                self.advance()?;
                let inner = self.parse_or()?;
                if self.current.kind != TokenKind::RParen {
                    return Err(self.error("expected ')'"));
                }
                self.advance()?;
                Ok(inner)
            }
            TokenKind::Pattern(pattern) => {
                self.advance()?;
                let prescale = self.parse_prescale()?;
                let leaf = PathLeaf::new(pattern, prescale)
                    .map_err(|e| self.error(format!("invalid pattern: {}", e)))?;
                Ok(Expression::Path(leaf))
            }
            other => Err(self.error(format!("expected pattern or '(', got {:?}", other))),
        }
    }

    fn parse_prescale(&mut self) -> Result<u32, ParseError> {
        if self.current.kind != TokenKind::Slash {
            return Ok(1);
        }
        self.advance()?;
        let TokenKind::Pattern(digits) = self.current.kind.clone() else {
            return Err(self.error("expected prescale factor after '/'"));
        };
        let factor: u32 = digits
            .parse()
            .map_err(|_| self.error(format!("invalid prescale factor '{}'", digits)))?;
        if factor == 0 {
            return Err(self.error("prescale factor must be at least 1"));
        }
        self.advance()?;
        Ok(factor)
    }
}
