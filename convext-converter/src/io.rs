//! Token reader/writer contract

use convext_core::{Token, TokenKind};

/// Read access to the token the host has already positioned on.
/// Converters never advance the reader.
pub trait TokenReader {
    fn token(&self) -> Option<&Token>;

    fn token_kind(&self) -> TokenKind {
        self.token().map_or(TokenKind::None, Token::kind)
    }
}

/// Sink for tokens emitted by a converter
pub trait TokenWriter {
    fn write_token(&mut self, token: Token);

    fn write_integer(&mut self, value: i64) {
        self.write_token(Token::Integer(value));
    }

    fn write_string(&mut self, value: &str) {
        self.write_token(Token::String(value.to_string()));
    }

    fn write_null(&mut self) {
        self.write_token(Token::Null);
    }
}

/// Forward-only cursor over a token sequence.
///
/// Starts positioned on the first token; `advance` moves to the next one and
/// leaves the cursor on `TokenKind::None` once the sequence is exhausted.
#[derive(Debug, Clone, Default)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn single(token: Token) -> Self {
        Self::new(vec![token])
    }

    pub fn advance(&mut self) -> bool {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        self.pos < self.tokens.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

impl TokenReader for TokenCursor {
    fn token(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }
}

/// Collects written tokens in order
#[derive(Debug, Clone, Default)]
pub struct TokenBuffer {
    tokens: Vec<Token>,
}

impl TokenBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// The only token written, or `None` if zero or several were written
    pub fn into_single(mut self) -> Option<Token> {
        if self.tokens.len() == 1 {
            self.tokens.pop()
        } else {
            None
        }
    }
}

impl TokenWriter for TokenBuffer {
    fn write_token(&mut self, token: Token) {
        self.tokens.push(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_walk() {
        let mut cursor = TokenCursor::new(vec![Token::StartArray, Token::Integer(1), Token::EndArray]);
        assert_eq!(cursor.token_kind(), TokenKind::StartArray);
        assert!(cursor.advance());
        assert_eq!(cursor.token(), Some(&Token::Integer(1)));
        assert!(cursor.advance());
        assert!(!cursor.advance());
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.token_kind(), TokenKind::None);
        assert!(!cursor.advance());
    }

    #[test]
    fn test_empty_cursor() {
        let cursor = TokenCursor::default();
        assert_eq!(cursor.token_kind(), TokenKind::None);
    }

    #[test]
    fn test_buffer_helpers() {
        let mut buf = TokenBuffer::new();
        buf.write_integer(3754);
        buf.write_string("x");
        buf.write_null();
        assert_eq!(
            buf.tokens(),
            &[Token::Integer(3754), Token::String("x".into()), Token::Null]
        );
        assert_eq!(buf.into_single(), None);

        let mut buf = TokenBuffer::new();
        buf.write_integer(0);
        assert_eq!(buf.into_single(), Some(Token::Integer(0)));
    }
}
