use super::*;

impl Parser {
    pub(super) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match &self.current().kind {
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::If => self.parse_if(),
            TokenKind::Return => self.parse_return(),
            TokenKind::LBrace => {
                self.advance();
                Ok(Stmt::Block(self.parse_block_body()?))
            }
            _ => self.parse_expr_stmt(),
        }
    }

    /// Statements up to and including the closing `}`.
    pub(super) fn parse_block_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        while !self.check_exact(&TokenKind::RBrace) && !self.is_eof() {
            stmts.push(self.parse_declaration()?);
        }
        self.expect_exact(&TokenKind::RBrace, "Expected '}' after block")?;
        Ok(stmts)
    }

    fn parse_expr_stmt(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expr()?;
        self.expect_exact(&TokenKind::Semicolon, "Expected ';' after expression")?;
        Ok(Stmt::Expression(expr))
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // consume 'return'
        let value = if self.check_exact(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_exact(&TokenKind::Semicolon, "Expected ';' after return value")?;
        Ok(Stmt::Return(value))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // consume 'if'
        self.expect_exact(&TokenKind::LParen, "Expected '(' after 'if'")?;
        let cond = self.parse_expr()?;
        self.expect_exact(&TokenKind::RParen, "Expected ')' after if condition")?;
        let then_branch = self.parse_statement()?;
        let else_branch = if self.match_token(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If(cond, Box::new(then_branch), else_branch))
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // consume 'while'
        self.expect_exact(&TokenKind::LParen, "Expected '(' after 'while'")?;
        let cond = self.parse_expr()?;
        self.expect_exact(&TokenKind::RParen, "Expected ')' after while condition")?;
        let body = self.parse_statement()?;
        Ok(Stmt::While(cond, Box::new(body)))
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // consume 'for'
        self.expect_exact(&TokenKind::LParen, "Expected '(' after 'for'")?;

        let init = if self.match_token(&TokenKind::Semicolon) {
            None
        } else if self.at_primitive_type() || self.at_named_declaration() {
            Some(Box::new(self.parse_typed_declaration(false)?))
        } else {
            Some(Box::new(self.parse_expr_stmt()?))
        };

        let cond = if self.check_exact(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_exact(&TokenKind::Semicolon, "Expected ';' after loop condition")?;

        let step = if self.check_exact(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_exact(&TokenKind::RParen, "Expected ')' after for clauses")?;

        let body = self.parse_statement()?;
        Ok(Stmt::For {
            init,
            cond,
            step,
            body: Box::new(body),
        })
    }
}
