use super::*;

impl Parser {
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_or()?;

        if self.check_exact(&TokenKind::Assign) {
            let eq = self.advance();
            let value = Box::new(self.parse_assignment()?);
            return match target {
                Expr::Variable(name) => Ok(Expr::Assign(name, value)),
                Expr::ArrayAccess(array, indices) => Ok(Expr::ArrayAssign(array, indices, value)),
                Expr::MemberAccess(object, member) => Ok(Expr::MemberAssign(object, member, value)),
                _ => Err(ParseError::Error {
                    msg: "Invalid assignment target".to_string(),
                    line: eq.line,
                    col: eq.col,
                }),
            };
        }

        Ok(target)
    }

    fn parse_binary_level(
        &mut self,
        ops: &[(TokenKind, BinOp)],
        next: fn(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let mut left = next(self)?;

        'outer: loop {
            for (kind, op) in ops {
                if self.check_exact(kind) {
                    self.advance();
                    let right = next(self)?;
                    left = Expr::Binary(*op, Box::new(left), Box::new(right));
                    continue 'outer;
                }
            }
            break;
        }

        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&[(TokenKind::OrOr, BinOp::Or)], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&[(TokenKind::AndAnd, BinOp::And)], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            &[(TokenKind::Eq, BinOp::Eq), (TokenKind::Neq, BinOp::Neq)],
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            &[
                (TokenKind::Lt, BinOp::Lt),
                (TokenKind::Gt, BinOp::Gt),
                (TokenKind::Lte, BinOp::Lte),
                (TokenKind::Gte, BinOp::Gte),
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            &[(TokenKind::Plus, BinOp::Add), (TokenKind::Minus, BinOp::Sub)],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            &[
                (TokenKind::Star, BinOp::Mul),
                (TokenKind::Slash, BinOp::Div),
                (TokenKind::Percent, BinOp::Mod),
            ],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match &self.current().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::PlusPlus => UnaryOp::Inc,
            TokenKind::MinusMinus => UnaryOp::Dec,
            _ => return self.parse_postfix(),
        };
        let tok = self.advance();

        if matches!(op, UnaryOp::Neg | UnaryOp::Plus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary(op, Box::new(operand)));
        }

        let target = self.parse_postfix()?;
        if !matches!(target, Expr::Variable(_) | Expr::ArrayAccess(..)) {
            return Err(ParseError::Error {
                msg: format!("Invalid target for prefix {} operator", tok.lexeme),
                line: tok.line,
                col: tok.col,
            });
        }
        Ok(Expr::Unary(op, Box::new(target)))
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match &self.current().kind {
                TokenKind::LParen => {
                    if !matches!(expr, Expr::Variable(_) | Expr::MemberAccess(..)) {
                        return Err(self.error("Invalid function call target"));
                    }
                    self.advance();
                    let args = self.parse_expr_list(&TokenKind::RParen)?;
                    self.expect_exact(&TokenKind::RParen, "Expected ')' after arguments")?;
                    expr = Expr::Call(Box::new(expr), args);
                }
                TokenKind::LBracket => {
                    self.advance();
                    let indices = self.parse_expr_list(&TokenKind::RBracket)?;
                    if indices.is_empty() {
                        return Err(self.error("Expected array index"));
                    }
                    self.expect_exact(&TokenKind::RBracket, "Expected ']' after array index")?;
                    expr = Expr::ArrayAccess(Box::new(expr), indices);
                }
                TokenKind::Dot => {
                    self.advance();
                    let member = self.expect_ident("Expected member name after '.'")?;
                    expr = Expr::MemberAccess(Box::new(expr), member);
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.check_exact(&TokenKind::PlusPlus) {
                        StepOp::Inc
                    } else {
                        StepOp::Dec
                    };
                    if !matches!(expr, Expr::Variable(_) | Expr::ArrayAccess(..)) {
                        return Err(self.error(format!(
                            "Invalid target for {} operator",
                            self.current().lexeme
                        )));
                    }
                    self.advance();
                    return Ok(Expr::Postfix(op, Box::new(expr)));
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Comma-separated expressions, stopping before `close`.
    fn parse_expr_list(&mut self, close: &TokenKind) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        if self.check_exact(close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expr()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Int(i) => Ok(Expr::Literal(Literal::Int(i))),
            TokenKind::Float(f) => Ok(Expr::Literal(Literal::Float(f))),
            TokenKind::Char(c) => Ok(Expr::Literal(Literal::Char(c))),
            TokenKind::Str(s) => Ok(Expr::Literal(Literal::Str(s))),
            TokenKind::Bool(b) => Ok(Expr::Literal(Literal::Bool(b))),
            TokenKind::Null => Ok(Expr::Literal(Literal::Null)),
            TokenKind::Ident(name) => Ok(Expr::Variable(name)),
            TokenKind::New => self.parse_new(),
            TokenKind::LBrace => {
                let elements = self.parse_expr_list(&TokenKind::RBrace)?;
                self.expect_exact(&TokenKind::RBrace, "Expected '}' after array literal")?;
                Ok(Expr::ArrayLiteral(elements))
            }
            TokenKind::LParen => {
                let inner = self.parse_expr()?;
                self.expect_exact(&TokenKind::RParen, "Expected ')' after expression")?;
                Ok(Expr::Grouping(Box::new(inner)))
            }
            _ => Err(ParseError::Error {
                msg: format!("Unexpected token '{}'", tok.lexeme),
                line: tok.line,
                col: tok.col,
            }),
        }
    }

    /// `new T[d1, d2]` or `new Name(args)`; `new` is already consumed.
    fn parse_new(&mut self) -> Result<Expr, ParseError> {
        let ty = self.parse_type_name()?;

        if self.match_token(&TokenKind::LBracket) {
            let dims = self.parse_expr_list(&TokenKind::RBracket)?;
            if dims.is_empty() || dims.len() > 3 {
                return Err(self.error("Array creation takes 1 to 3 dimensions"));
            }
            self.expect_exact(&TokenKind::RBracket, "Expected ']' after array dimensions")?;
            return Ok(Expr::ArrayNew(ty, dims));
        }

        match ty {
            TypeName::Named(name) if self.check_exact(&TokenKind::LParen) => {
                self.advance();
                let args = self.parse_expr_list(&TokenKind::RParen)?;
                self.expect_exact(&TokenKind::RParen, "Expected ')' after constructor arguments")?;
                // Struct or class is decided at runtime.
                Ok(Expr::StructNew(name, args))
            }
            _ => Err(self.error("Expected '[' or '(' after type in new expression")),
        }
    }
}
