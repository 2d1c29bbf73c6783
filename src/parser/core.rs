use super::*;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut tokens = tokens;
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let offset = tokens.last().map(|t| t.offset + t.lexeme.len()).unwrap_or(0);
            let line = tokens.last().map(|t| t.line).unwrap_or(1);
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                offset,
                line,
                col: 0,
            });
        }
        Parser { tokens, pos: 0 }
    }

    pub(super) fn error(&self, msg: impl Into<String>) -> ParseError {
        let tok = self.current();
        ParseError::Error {
            msg: msg.into(),
            line: tok.line,
            col: tok.col,
        }
    }

    pub(super) fn current(&self) -> &Token {
        self.peek(0)
    }

    // The token list always ends with Eof, so lookahead past the end sticks there.
    pub(super) fn peek(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(super) fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    pub(super) fn check_exact(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    pub(super) fn is_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    pub(super) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn expect_exact(&mut self, kind: &TokenKind, msg: &str) -> Result<Token, ParseError> {
        if self.check_exact(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("{}, found '{}'", msg, self.current().lexeme)))
        }
    }

    pub(super) fn expect_ident(&mut self, msg: &str) -> Result<String, ParseError> {
        match &self.current().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error(format!("{}, found '{}'", msg, self.current().lexeme))),
        }
    }
}
